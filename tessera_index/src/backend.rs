// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The trait every spatial strategy implements.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::types::Aabb2D;

/// Spatial structure behind an [`IndexGeneric`][crate::IndexGeneric].
///
/// Backends only see dense slot numbers; payloads and keys live in the index.
/// A slot is inserted at most once before it is removed again.
pub trait Backend<T: Copy + PartialOrd + Debug> {
    /// Start tracking `slot` with the given box.
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>);

    /// Move an already tracked slot to a new box.
    fn update(&mut self, slot: usize, aabb: Aabb2D<T>);

    /// Stop tracking `slot`. Unknown slots are ignored.
    fn remove(&mut self, slot: usize);

    /// Forget every slot.
    fn clear(&mut self);

    /// Call `f` for every slot whose box contains the point.
    fn visit_point<F: FnMut(usize)>(&self, x: T, y: T, f: F);

    /// Call `f` for every slot whose box overlaps `rect`, edges included.
    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, f: F);

    /// Collect [`visit_point`][Backend::visit_point] into a vector.
    fn query_point(&self, x: T, y: T) -> Vec<usize> {
        let mut out = Vec::new();
        self.visit_point(x, y, |i| out.push(i));
        out
    }

    /// Collect [`visit_rect`][Backend::visit_rect] into a vector.
    fn query_rect(&self, rect: Aabb2D<T>) -> Vec<usize> {
        let mut out = Vec::new();
        self.visit_rect(rect, |i| out.push(i));
        out
    }
}
