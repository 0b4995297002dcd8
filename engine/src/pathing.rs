use glam::{ivec2, IVec2};
use util::{astar_path, VecExt};

use crate::Map;

/// Neighbor scan order for path search: west, south, east, north.
const SEARCH_DIRS: [IVec2; 4] =
    [ivec2(-1, 0), ivec2(0, 1), ivec2(1, 0), ivec2(0, -1)];

/// Shortest four-way walk from `start` to `goal`.
///
/// The returned steps exclude `start` and end at `goal`. The goal cell is
/// always allowed as the last step even if something is standing on it, so
/// monsters can path into the player. Returns an empty path when there is
/// no way through.
pub fn find_path(map: &Map, start: IVec2, goal: IVec2) -> Vec<IVec2> {
    astar_path(
        &start,
        &goal,
        move |&p| {
            SEARCH_DIRS
                .into_iter()
                .map(move |d| p + d)
                .filter(move |&n| {
                    map.in_bounds(n) && (n == goal || map.is_passable(n))
                })
        },
        |a, b| (*b - *a).taxi_len() as usize,
    )
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;
    use crate::map::tests::{add_wall, open_map};

    #[test]
    fn same_cell() {
        let map = open_map(5, 5, ivec2(4, 4));
        assert!(find_path(&map, ivec2(1, 1), ivec2(1, 1)).is_empty());
    }

    #[test]
    fn straight_path() {
        let map = open_map(10, 10, ivec2(9, 9));
        assert_eq!(
            find_path(&map, ivec2(0, 0), ivec2(3, 0)),
            vec![ivec2(1, 0), ivec2(2, 0), ivec2(3, 0)]
        );
    }

    #[test]
    fn enclosed_goal() {
        let mut map = open_map(10, 10, ivec2(9, 9));
        for d in SEARCH_DIRS {
            add_wall(&mut map, ivec2(5, 5) + d);
        }
        assert!(find_path(&map, ivec2(0, 0), ivec2(5, 5)).is_empty());
    }

    #[test]
    fn goes_around_walls() {
        let mut map = open_map(6, 6, ivec2(5, 5));
        for y in 0..4 {
            add_wall(&mut map, ivec2(2, y));
        }
        let path = find_path(&map, ivec2(0, 0), ivec2(4, 0));
        assert_eq!(path.len(), 12);
        assert_eq!(path.last(), Some(&ivec2(4, 0)));
        for w in path.windows(2) {
            assert!((w[1] - w[0]).is_adjacent());
            assert!(map.is_passable(w[1]) || w[1] == ivec2(4, 0));
        }
    }

    #[test]
    fn occupied_goal_is_reachable() {
        // The player stands on the goal.
        let map = open_map(6, 6, ivec2(3, 3));
        let path = find_path(&map, ivec2(0, 3), ivec2(3, 3));
        assert_eq!(path, vec![ivec2(1, 3), ivec2(2, 3), ivec2(3, 3)]);
    }
}
