use std::hash::Hash;

use crate::{HashMap, HashSet};

struct Node<T> {
    pos: T,
    parent: Option<usize>,
    g: usize,
    f: usize,
}

/// A* search from `start` to `goal` on a unit-cost graph.
///
/// Returns the steps of the path after `start` up to and including `goal`,
/// or an empty vector when the goal can't be reached or when start and goal
/// are the same. The open list is a plain vector scanned for the lowest
/// f-score, the earliest inserted node wins ties. A node already in the open
/// list is only updated when the new path to it is strictly shorter.
pub fn astar_path<T, I>(
    start: &T,
    goal: &T,
    mut neighbors: impl FnMut(&T) -> I,
    mut heuristic: impl FnMut(&T, &T) -> usize,
) -> Vec<T>
where
    T: Clone + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    if start == goal {
        return Vec::new();
    }

    let mut nodes = vec![Node {
        pos: start.clone(),
        parent: None,
        g: 0,
        f: heuristic(start, goal),
    }];
    let mut open: Vec<usize> = vec![0];
    let mut in_open: HashMap<T, usize> = HashMap::default();
    in_open.insert(start.clone(), 0);
    let mut closed: HashSet<T> = HashSet::default();

    while !open.is_empty() {
        let mut best = 0;
        for i in 1..open.len() {
            if nodes[open[i]].f < nodes[open[best]].f {
                best = i;
            }
        }
        let current = open.remove(best);
        let pos = nodes[current].pos.clone();
        in_open.remove(&pos);

        if &pos == goal {
            let mut path = Vec::new();
            let mut i = current;
            while let Some(parent) = nodes[i].parent {
                path.push(nodes[i].pos.clone());
                i = parent;
            }
            path.reverse();
            return path;
        }

        closed.insert(pos.clone());
        let g = nodes[current].g + 1;

        for n in neighbors(&pos) {
            if closed.contains(&n) {
                continue;
            }

            if let Some(&existing) = in_open.get(&n) {
                if g < nodes[existing].g {
                    let h = nodes[existing].f - nodes[existing].g;
                    nodes[existing].g = g;
                    nodes[existing].f = g + h;
                    nodes[existing].parent = Some(current);
                }
                continue;
            }

            let f = g + heuristic(&n, goal);
            nodes.push(Node {
                pos: n.clone(),
                parent: Some(current),
                g,
                f,
            });
            let idx = nodes.len() - 1;
            open.push(idx);
            in_open.insert(n, idx);
        }
    }

    Vec::new()
}
