// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree backend with quadratic splits.
//!
//! A Guttman-style R-tree: entries live in leaves with at most
//! [`MAX_ENTRIES`] boxes, inner nodes store the union of their children, and
//! insertion descends along the child needing the least area enlargement.
//! Overflowing nodes are split with the quadratic seed heuristic. Removal
//! condenses underfull nodes and re-inserts their orphaned entries, so the
//! tree stays balanced under the remove-then-insert churn a scene graph
//! produces when it invalidates a subtree.
//!
//! Every slot remembers the leaf that holds it, which makes removal a walk up
//! the parent chain instead of a search.

use alloc::vec::Vec;
use core::fmt::Debug;

use smallvec::{SmallVec, smallvec};

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar};

/// Maximum number of entries in a node before it splits.
pub const MAX_ENTRIES: usize = 8;
/// Minimum number of entries in a non-root node before it is condensed.
pub const MIN_ENTRIES: usize = 3;

type Entries = SmallVec<[usize; MAX_ENTRIES + 1]>;

#[derive(Clone, Debug)]
struct Node<T> {
    bbox: Aabb2D<T>,
    parent: Option<usize>,
    leaf: bool,
    /// Slot numbers for leaves, node indices for inner nodes.
    entries: Entries,
}

#[derive(Clone, Copy, Debug)]
struct SlotEntry<T> {
    aabb: Aabb2D<T>,
    leaf: usize,
}

/// R-tree over boxes with scalar coordinates `T`.
pub struct RTree<T: Scalar> {
    nodes: Vec<Option<Node<T>>>,
    free_nodes: Vec<usize>,
    root: Option<usize>,
    slots: Vec<Option<SlotEntry<T>>>,
    len: usize,
}

/// R-tree over `f32` coordinates.
pub type RTreeF32 = RTree<f32>;
/// R-tree over `f64` coordinates.
pub type RTreeF64 = RTree<f64>;
/// R-tree over `i64` coordinates.
pub type RTreeI64 = RTree<i64>;

impl<T: Scalar> Default for RTree<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free_nodes: Vec::new(),
            root: None,
            slots: Vec::new(),
            len: 0,
        }
    }
}

impl<T: Scalar> Debug for RTree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let live_nodes = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("RTree")
            .field("len", &self.len)
            .field("nodes", &live_nodes)
            .field("height", &self.height())
            .field("root_bbox", &self.root.map(|r| self.node(r).bbox))
            .finish_non_exhaustive()
    }
}

impl<T: Scalar> RTree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree stores no slots.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels, counting the leaf level. Zero for an empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(n) = current {
            height += 1;
            let node = self.node(n);
            current = if node.leaf {
                None
            } else {
                node.entries.first().copied()
            };
        }
        height
    }

    fn node(&self, idx: usize) -> &Node<T> {
        self.nodes[idx]
            .as_ref()
            .expect("rtree invariant violated: dangling node index")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        self.nodes[idx]
            .as_mut()
            .expect("rtree invariant violated: dangling node index")
    }

    fn slot(&self, slot: usize) -> &SlotEntry<T> {
        self.slots[slot]
            .as_ref()
            .expect("rtree invariant violated: leaf references vacant slot")
    }

    fn alloc_node(&mut self, node: Node<T>) -> usize {
        if let Some(idx) = self.free_nodes.pop() {
            self.nodes[idx] = Some(node);
            idx
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.nodes[idx] = None;
        self.free_nodes.push(idx);
    }

    fn entry_bbox(&self, leaf: bool, entry: usize) -> Aabb2D<T> {
        if leaf {
            self.slot(entry).aabb
        } else {
            self.node(entry).bbox
        }
    }

    fn recompute_bbox(&mut self, idx: usize) {
        let node = self.node(idx);
        let bbox = node
            .entries
            .iter()
            .map(|&e| self.entry_bbox(node.leaf, e))
            .reduce(|acc, b| acc.union(&b));
        if let Some(bbox) = bbox {
            self.node_mut(idx).bbox = bbox;
        }
    }

    fn choose_leaf(&self, root: usize, aabb: &Aabb2D<T>) -> usize {
        let mut current = root;
        loop {
            let node = self.node(current);
            if node.leaf {
                return current;
            }
            let mut best: Option<(usize, T::Acc, T::Acc)> = None;
            for &child in &node.entries {
                let bbox = self.node(child).bbox;
                let grow = bbox.enlargement(aabb);
                let area = bbox.area();
                let better = match best {
                    None => true,
                    Some((_, best_grow, best_area)) => {
                        grow < best_grow || (grow == best_grow && area < best_area)
                    }
                };
                if better {
                    best = Some((child, grow, area));
                }
            }
            let Some((child, _, _)) = best else {
                unreachable!("inner node without children");
            };
            current = child;
        }
    }

    /// Walk from `start` to the root, splitting overflowing nodes and
    /// refreshing bounding boxes.
    fn adjust_upward(&mut self, start: usize) {
        let mut current = Some(start);
        while let Some(idx) = current {
            if self.node(idx).entries.len() > MAX_ENTRIES {
                let sibling = self.split(idx);
                match self.node(idx).parent {
                    Some(parent) => {
                        self.node_mut(parent).entries.push(sibling);
                        self.node_mut(sibling).parent = Some(parent);
                    }
                    None => {
                        let bbox = self.node(idx).bbox.union(&self.node(sibling).bbox);
                        let root = self.alloc_node(Node {
                            bbox,
                            parent: None,
                            leaf: false,
                            entries: smallvec![idx, sibling],
                        });
                        self.node_mut(idx).parent = Some(root);
                        self.node_mut(sibling).parent = Some(root);
                        self.root = Some(root);
                    }
                }
            } else {
                self.recompute_bbox(idx);
            }
            current = self.node(idx).parent;
        }
    }

    /// Quadratic split: `idx` keeps one group, the returned new node holds the other.
    fn split(&mut self, idx: usize) -> usize {
        let leaf = self.node(idx).leaf;
        let mut rest: Vec<(usize, Aabb2D<T>)> = self
            .node(idx)
            .entries
            .iter()
            .map(|&e| (e, self.entry_bbox(leaf, e)))
            .collect();

        // Seeds: the pair wasting the most area when grouped together.
        let (mut seed_a, mut seed_b) = (0, 1);
        let mut worst: Option<T::Acc> = None;
        for i in 0..rest.len() {
            for j in i + 1..rest.len() {
                let (a, b) = (rest[i].1, rest[j].1);
                let waste = a.union(&b).area() - a.area() - b.area();
                if worst.is_none_or(|w| waste > w) {
                    worst = Some(waste);
                    seed_a = i;
                    seed_b = j;
                }
            }
        }
        // Remove the higher index first so the lower one stays valid.
        let (b_entry, b_box) = rest.swap_remove(seed_b);
        let (a_entry, a_box) = rest.swap_remove(seed_a);
        let mut group_a: Entries = smallvec![a_entry];
        let mut group_b: Entries = smallvec![b_entry];
        let (mut box_a, mut box_b) = (a_box, b_box);

        while !rest.is_empty() {
            if group_a.len() + rest.len() == MIN_ENTRIES {
                for (e, bbox) in rest.drain(..) {
                    group_a.push(e);
                    box_a = box_a.union(&bbox);
                }
                break;
            }
            if group_b.len() + rest.len() == MIN_ENTRIES {
                for (e, bbox) in rest.drain(..) {
                    group_b.push(e);
                    box_b = box_b.union(&bbox);
                }
                break;
            }

            // Next: the entry with the strongest preference for one group.
            let mut pick = 0;
            let mut strongest: Option<T::Acc> = None;
            for (k, (_, bbox)) in rest.iter().enumerate() {
                let grow_a = box_a.enlargement(bbox);
                let grow_b = box_b.enlargement(bbox);
                let diff = if grow_a > grow_b {
                    grow_a - grow_b
                } else {
                    grow_b - grow_a
                };
                if strongest.is_none_or(|s| diff > s) {
                    strongest = Some(diff);
                    pick = k;
                }
            }
            let (e, bbox) = rest.swap_remove(pick);
            let grow_a = box_a.enlargement(&bbox);
            let grow_b = box_b.enlargement(&bbox);
            let to_a = if grow_a != grow_b {
                grow_a < grow_b
            } else if box_a.area() != box_b.area() {
                box_a.area() < box_b.area()
            } else {
                group_a.len() <= group_b.len()
            };
            if to_a {
                group_a.push(e);
                box_a = box_a.union(&bbox);
            } else {
                group_b.push(e);
                box_b = box_b.union(&bbox);
            }
        }

        let parent = self.node(idx).parent;
        {
            let node = self.node_mut(idx);
            node.entries = group_a;
            node.bbox = box_a;
        }
        let moved = group_b.clone();
        let sibling = self.alloc_node(Node {
            bbox: box_b,
            parent,
            leaf,
            entries: group_b,
        });
        for e in moved {
            if leaf {
                if let Some(slot) = self.slots[e].as_mut() {
                    slot.leaf = sibling;
                }
            } else {
                self.node_mut(e).parent = Some(sibling);
            }
        }
        sibling
    }

    /// Free the subtree under `idx` and collect its slots for re-insertion.
    fn collect_and_free(&mut self, idx: usize, orphans: &mut Vec<(usize, Aabb2D<T>)>) {
        let mut stack: Vec<usize> = alloc::vec![idx];
        while let Some(n) = stack.pop() {
            let Some(node) = self.nodes[n].take() else {
                continue;
            };
            self.free_nodes.push(n);
            if !node.leaf {
                stack.extend(node.entries.iter().copied());
                continue;
            }
            for slot in node.entries {
                if let Some(entry) = self.slots[slot].take() {
                    orphans.push((slot, entry.aabb));
                    self.len -= 1;
                }
            }
        }
    }

    fn condense(&mut self, start: usize) {
        let mut orphans = Vec::new();
        let mut current = start;
        while let Some(parent) = self.node(current).parent {
            if self.node(current).entries.len() < MIN_ENTRIES {
                let siblings = &mut self.node_mut(parent).entries;
                if let Some(pos) = siblings.iter().position(|&c| c == current) {
                    siblings.swap_remove(pos);
                }
                self.collect_and_free(current, &mut orphans);
            } else {
                self.recompute_bbox(current);
            }
            current = parent;
        }

        // Shorten the tree while the root is empty or a single-child inner node.
        while let Some(root) = self.root {
            let node = self.node(root);
            if node.entries.is_empty() {
                self.free_node(root);
                self.root = None;
            } else if !node.leaf && node.entries.len() == 1 {
                let child = node.entries[0];
                self.free_node(root);
                self.node_mut(child).parent = None;
                self.root = Some(child);
            } else {
                self.recompute_bbox(root);
                break;
            }
        }

        for (slot, aabb) in orphans {
            self.insert(slot, aabb);
        }
    }
}

impl<T: Scalar> Backend<T> for RTree<T> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        if self.slots[slot].is_some() {
            self.remove(slot);
        }
        self.len += 1;

        let Some(root) = self.root else {
            let leaf = self.alloc_node(Node {
                bbox: aabb,
                parent: None,
                leaf: true,
                entries: smallvec![slot],
            });
            self.root = Some(leaf);
            self.slots[slot] = Some(SlotEntry { aabb, leaf });
            return;
        };

        let leaf = self.choose_leaf(root, &aabb);
        self.node_mut(leaf).entries.push(slot);
        self.slots[slot] = Some(SlotEntry { aabb, leaf });
        self.adjust_upward(leaf);
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D<T>) {
        let fits_leaf = match self.slots.get(slot).and_then(|s| s.as_ref()) {
            Some(entry) if entry.aabb == aabb => return,
            Some(entry) => self.node(entry.leaf).bbox.contains(&aabb),
            None => false,
        };
        if fits_leaf {
            // Ancestors still cover the box, if a little loosely.
            if let Some(entry) = self.slots[slot].as_mut() {
                entry.aabb = aabb;
            }
        } else {
            self.insert(slot, aabb);
        }
    }

    fn remove(&mut self, slot: usize) {
        let Some(entry) = self.slots.get_mut(slot).and_then(Option::take) else {
            return;
        };
        self.len -= 1;
        let entries = &mut self.node_mut(entry.leaf).entries;
        if let Some(pos) = entries.iter().position(|&s| s == slot) {
            entries.swap_remove(pos);
        }
        self.condense(entry.leaf);
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.free_nodes.clear();
        self.slots.clear();
        self.root = None;
        self.len = 0;
    }

    fn visit_point<F: FnMut(usize)>(&self, x: T, y: T, mut f: F) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack: SmallVec<[usize; 32]> = smallvec![root];
        while let Some(n) = stack.pop() {
            let node = self.node(n);
            if !node.bbox.contains_point(x, y) {
                continue;
            }
            if node.leaf {
                for &slot in &node.entries {
                    if self.slot(slot).aabb.contains_point(x, y) {
                        f(slot);
                    }
                }
            } else {
                stack.extend(node.entries.iter().copied());
            }
        }
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, mut f: F) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack: SmallVec<[usize; 32]> = smallvec![root];
        while let Some(n) = stack.pop() {
            let node = self.node(n);
            if !node.bbox.overlaps(&rect) {
                continue;
            }
            if node.leaf {
                for &slot in &node.entries {
                    if self.slot(slot).aabb.overlaps(&rect) {
                        f(slot);
                    }
                }
            } else {
                stack.extend(node.entries.iter().copied());
            }
        }
    }
}
