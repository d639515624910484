// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear-scan backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::Aabb2D;

/// Flat vector of boxes indexed by slot; every query scans all of them.
///
/// Cheap to update and hard to get wrong, which makes it a good fit for a few
/// dozen entries and a reference when checking the other backends.
#[derive(Clone)]
pub struct FlatVec<T> {
    slots: Vec<Option<Aabb2D<T>>>,
}

impl<T> Default for FlatVec<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: Debug> Debug for FlatVec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let live = self.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &self.slots.len())
            .field("live_slots", &live)
            .finish_non_exhaustive()
    }
}

impl<T: Copy + PartialOrd + Debug> Backend<T> for FlatVec<T> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.slots.len() <= slot {
            self.slots.resize(slot + 1, None);
        }
        self.slots[slot] = Some(aabb);
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D<T>) {
        self.insert(slot, aabb);
    }

    fn remove(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = None;
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
    }

    fn visit_point<F: FnMut(usize)>(&self, x: T, y: T, mut f: F) {
        for (i, aabb) in self.slots.iter().enumerate() {
            if let Some(aabb) = aabb
                && aabb.contains_point(x, y)
            {
                f(i);
            }
        }
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, mut f: F) {
        for (i, aabb) in self.slots.iter().enumerate() {
            if let Some(aabb) = aabb
                && aabb.overlaps(&rect)
            {
                f(i);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn removed_slots_stop_matching() {
        let mut flat = FlatVec::default();
        flat.insert(0, Aabb2D::new(0.0, 0.0, 10.0, 10.0));
        flat.insert(3, Aabb2D::new(5.0, 5.0, 15.0, 15.0));
        assert_eq!(flat.query_point(6.0, 6.0), vec![0, 3]);

        flat.remove(0);
        assert_eq!(flat.query_point(6.0, 6.0), vec![3]);

        // Removing an unknown slot is a no-op.
        flat.remove(42);
        assert_eq!(flat.query_rect(Aabb2D::new(0.0, 0.0, 100.0, 100.0)), vec![3]);
    }
}
