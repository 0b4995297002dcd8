//! Smooth movement of things between cells.

use glam::Vec2;
use util::IndexMap;

use crate::ThingId;

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Animation {
    pub start: Vec2,
    pub end: Vec2,
    pub start_ms: f64,
    pub duration_ms: f64,
    /// Interpolated position as of the last update.
    pub pos: Vec2,
    pub done: bool,
}

impl Animation {
    pub fn new(start: Vec2, end: Vec2, start_ms: f64, duration_ms: f64) -> Self {
        Animation {
            start,
            end,
            start_ms,
            duration_ms,
            pos: start,
            done: false,
        }
    }

    /// Elapsed fraction of the animation at the given time, in [0, 1].
    pub fn fraction(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn update(&mut self, now_ms: f64) {
        let t = self.fraction(now_ms);
        self.pos = self.start.lerp(self.end, t);
        self.done = t >= 1.0;
    }
}

/// Active animations, at most one per thing.
#[derive(Clone, Default, Debug)]
pub struct Animations {
    table: IndexMap<ThingId, Animation>,
}

impl Animations {
    /// Start animating a thing, replacing any animation it already has.
    pub fn insert(
        &mut self,
        id: ThingId,
        start: Vec2,
        end: Vec2,
        now_ms: f64,
        duration_ms: f64,
    ) {
        self.table
            .insert(id, Animation::new(start, end, now_ms, duration_ms));
    }

    pub fn update(&mut self, now_ms: f64) {
        for anim in self.table.values_mut() {
            anim.update(now_ms);
        }
    }

    /// Drawing position override for an animated thing.
    pub fn position(&self, id: ThingId) -> Option<Vec2> {
        self.table.get(&id).map(|a| a.pos)
    }

    pub fn remove(&mut self, id: ThingId) -> Option<Animation> {
        self.table.shift_remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Visit every animation once, dropping the finished ones as they go
    /// past.
    pub fn process_done(&mut self) -> ProcessDone<'_> {
        ProcessDone {
            table: &mut self.table,
            cursor: 0,
        }
    }
}

/// Iterator from [`Animations::process_done`].
///
/// Animations that are not yet done stay in the table when the iterator is
/// dropped early.
pub struct ProcessDone<'a> {
    table: &'a mut IndexMap<ThingId, Animation>,
    cursor: usize,
}

impl Iterator for ProcessDone<'_> {
    type Item = (ThingId, Animation);

    fn next(&mut self) -> Option<Self::Item> {
        let (&id, &anim) = self.table.get_index(self.cursor)?;
        if anim.done {
            self.table.shift_remove_index(self.cursor);
        } else {
            self.cursor += 1;
        }
        Some((id, anim))
    }
}
