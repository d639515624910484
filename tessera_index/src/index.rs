// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::backends::{FlatVec, RTree};
use crate::types::{Aabb2D, Scalar};

/// Generational handle for entries.
///
/// A key stays valid until its entry is removed. After that the slot may be
/// reused, but the old key keeps failing lookups because its generation no
/// longer matches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are 32-bit; more than u32::MAX live entries is unsupported."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Slot<T, P> {
    generation: u32,
    entry: Option<(Aabb2D<T>, P)>,
}

/// A generic AABB index parameterized by a spatial backend.
///
/// Changes reach the backend immediately: a query issued right after
/// [`insert`](Self::insert), [`update`](Self::update) or
/// [`remove`](Self::remove) sees the new state.
#[derive(Debug)]
pub struct IndexGeneric<T: Copy + PartialOrd + Debug, P: Copy + Debug, B: Backend<T>> {
    slots: Vec<Slot<T, P>>,
    free_list: Vec<usize>,
    len: usize,
    backend: B,
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::with_backend(B::default())
    }
}

impl<T, P, B> Default for IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T>,
{
    /// Create an empty index using an explicit backend instance.
    pub fn with_backend(backend: B) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            backend,
        }
    }

    /// Reserve space for at least `n` more entries.
    pub fn reserve(&mut self, n: usize) {
        self.slots.reserve(n);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The backend, for diagnostics.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Insert a new AABB with payload. Returns a stable handle `Key`.
    pub fn insert(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        let idx = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some((aabb, payload));
            idx
        } else {
            self.slots.push(Slot {
                generation: 1,
                entry: Some((aabb, payload)),
            });
            self.slots.len() - 1
        };
        self.len += 1;
        self.backend.insert(idx, aabb);
        Key::new(idx, self.slots[idx].generation)
    }

    /// Move an existing entry. Returns `false` for stale keys.
    pub fn update(&mut self, key: Key, aabb: Aabb2D<T>) -> bool {
        let Some((current, _)) = self.entry_mut(key) else {
            return false;
        };
        *current = aabb;
        self.backend.update(key.idx(), aabb);
        true
    }

    /// Remove an entry and return its payload. Stale keys return `None`.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        let (_, payload) = self.entry_mut(key).copied()?;
        self.slots[key.idx()].entry = None;
        self.free_list.push(key.idx());
        self.len -= 1;
        self.backend.remove(key.idx());
        Some(payload)
    }

    /// Look up the box and payload behind a key.
    pub fn get(&self, key: Key) -> Option<(Aabb2D<T>, P)> {
        let slot = self.slots.get(key.idx())?;
        if slot.generation != key.1 {
            return None;
        }
        slot.entry
    }

    /// Whether `key` refers to a live entry.
    pub fn contains_key(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    /// Remove every entry. Outstanding keys become stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            slot.entry = None;
            self.free_list.push(idx);
        }
        self.len = 0;
        self.backend.clear();
    }

    /// Query for entries whose AABB contains the point.
    pub fn query_point(&self, x: T, y: T) -> impl Iterator<Item = (Key, P)> + '_ {
        let mut out = Vec::new();
        self.visit_point(x, y, |k, p| out.push((k, p)));
        out.into_iter()
    }

    /// Visit entries whose AABB contains the point (does not allocate result storage).
    ///
    /// Calls `f(key, payload)` for each match. The order is backend-dependent.
    pub fn visit_point<F: FnMut(Key, P)>(&self, x: T, y: T, mut f: F) {
        self.backend.visit_point(x, y, |i| self.emit(i, &mut f));
    }

    /// Query for entries whose AABB intersects the given rectangle.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> impl Iterator<Item = (Key, P)> + '_ {
        let mut out = Vec::new();
        self.visit_rect(rect, |k, p| out.push((k, p)));
        out.into_iter()
    }

    /// Visit entries whose AABB intersects the given rectangle (does not allocate result storage).
    ///
    /// Edges are inclusive and zero-area rectangles are valid queries.
    pub fn visit_rect<F: FnMut(Key, P)>(&self, rect: Aabb2D<T>, mut f: F) {
        self.backend.visit_rect(rect, |i| self.emit(i, &mut f));
    }

    fn emit<F: FnMut(Key, P)>(&self, idx: usize, f: &mut F) {
        if let Some(slot) = self.slots.get(idx)
            && let Some((_, payload)) = slot.entry
        {
            f(Key::new(idx, slot.generation), payload);
        }
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut (Aabb2D<T>, P)> {
        let slot = self.slots.get_mut(key.idx())?;
        if slot.generation != key.1 {
            return None;
        }
        slot.entry.as_mut()
    }
}

/// Default index using a flat vector backend.
pub type Index<T, P> = IndexGeneric<T, P, FlatVec<T>>;

impl<T: Scalar, P: Copy + Debug> Index<T, P> {
    /// Create an R-tree-backed index.
    pub fn with_rtree() -> IndexGeneric<T, P, RTree<T>> {
        IndexGeneric::with_backend(RTree::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn changes_are_visible_immediately() {
        let mut idx: Index<i64, u32> = Index::new();
        let k1 = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
        assert_eq!(idx.query_point(6, 6).count(), 1);

        assert!(idx.update(k1, Aabb2D::new(20, 0, 30, 10)));
        assert_eq!(idx.query_point(6, 6).count(), 0);
        let hits: Vec<_> = idx.query_point(25, 5).collect();
        assert_eq!(hits, vec![(k1, 1)]);

        assert_eq!(idx.remove(k1), Some(1));
        assert!(idx.is_empty());
        assert_eq!(idx.query_point(25, 5).count(), 0);
    }

    #[test]
    fn stale_keys_are_ignored_after_slot_reuse() {
        let mut idx = Index::<f64, u32>::with_rtree();
        let old = idx.insert(Aabb2D::new(0.0, 0.0, 1.0, 1.0), 7);
        assert_eq!(idx.remove(old), Some(7));

        let new = idx.insert(Aabb2D::new(5.0, 5.0, 6.0, 6.0), 8);
        assert_ne!(old, new, "reused slot must carry a new generation");
        assert_eq!(idx.remove(old), None);
        assert!(!idx.update(old, Aabb2D::new(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(idx.get(new), Some((Aabb2D::new(5.0, 5.0, 6.0, 6.0), 8)));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn churn_does_not_duplicate_payloads() {
        let mut idx = Index::<f64, u32>::with_rtree();
        let mut key = idx.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), 3);
        for i in 0..20 {
            let offset = f64::from(i);
            idx.remove(key);
            key = idx.insert(Aabb2D::new(offset, 0.0, offset + 10.0, 10.0), 3);
        }
        let hits: Vec<_> = idx.query_rect(Aabb2D::new(0.0, 0.0, 100.0, 100.0)).collect();
        assert_eq!(hits, vec![(key, 3)]);
        assert_eq!(idx.backend().len(), 1);
    }

    #[test]
    fn clear_invalidates_keys() {
        let mut idx: Index<i64, u32> = Index::new();
        let k = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
        idx.clear();
        assert!(!idx.contains_key(k));
        let k2 = idx.insert(Aabb2D::new(0, 0, 10, 10), 2);
        assert_ne!(k, k2);
        assert_eq!(idx.query_point(1, 1).map(|(_, p)| p).collect::<Vec<_>>(), vec![2]);
    }
}
