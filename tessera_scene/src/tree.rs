// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node arena: hierarchy, resolved geometry and the spatial index.
//!
//! Every mutation re-resolves the affected subtree before returning and
//! writes the new bounds to the spatial index, so readers never observe
//! stale geometry and there is no separate commit step.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Size};
use tessera_index::backends::RTree;
use tessera_index::{Backend, IndexGeneric, Key};
use tessera_text::{Font, TextHit, TextLayout, TextMeasure};

use crate::error::{Result, SceneError};
use crate::layout::{self, Resolved};
use crate::style::{Color, Style};
use crate::types::{BoxNode, Content, Corner, Length, NodeId};
use crate::util::rect_to_aabb;

/// Position of a node in paint order.
///
/// Nodes paint in ascending key order: shallower before deeper, and among
/// equal depths earlier siblings first. Hit testing picks the greatest key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaintKey {
    /// Distance from the root, which has depth `0`.
    pub depth: u32,
    /// Position among the parent's children.
    pub sibling_index: usize,
}

#[derive(Clone, Debug)]
struct TextCache {
    layout: TextLayout,
    wrap: Option<f64>,
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: u32,
    config: BoxNode,
    resolved: Option<Resolved>,
    text: Option<TextCache>,
    index_key: Option<Key>,
}

impl Node {
    fn new(generation: u32, config: BoxNode, parent: Option<NodeId>, depth: u32) -> Self {
        Self {
            generation,
            parent,
            children: Vec::new(),
            depth,
            config,
            resolved: None,
            text: None,
            index_key: None,
        }
    }
}

fn rejected(op: &str, err: SceneError) -> SceneError {
    log::warn!("{op} rejected: {err}");
    err
}

/// A tree of boxes with resolved geometry and a spatial index over it.
///
/// The tree always has exactly one root, created with the tree and never
/// removed. The backend `B` answers point and rectangle queries; the default
/// is an R-tree.
pub struct Tree<B: Backend<f64> = RTree<f64>> {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
    index: IndexGeneric<f64, NodeId, B>,
    measure: Box<dyn TextMeasure>,
}

impl<B: Backend<f64>> fmt::Debug for Tree<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("len", &self.len())
            .field("indexed", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl Tree {
    /// Create a tree holding only `root`, indexed by an R-tree.
    ///
    /// `measure` sizes text for layout. The root may not use percentages or
    /// anchors, as there is nothing to take them relative to.
    pub fn new(root: BoxNode, measure: impl TextMeasure + 'static) -> Result<Self> {
        Self::with_backend(RTree::default(), root, measure)
    }
}

impl<B: Backend<f64>> Tree<B> {
    /// Create a tree holding only `root` over a specific index backend.
    pub fn with_backend(
        backend: B,
        root: BoxNode,
        measure: impl TextMeasure + 'static,
    ) -> Result<Self> {
        root.validate()
            .and_then(|()| root.validate_root())
            .map_err(|e| rejected("root", e))?;
        let mut tree = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 1),
            index: IndexGeneric::with_backend(backend),
            measure: Box::new(measure),
        };
        tree.root = tree.alloc(root, None, 0);
        tree.refresh(tree.root);
        Ok(tree)
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Always `false`: the root cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The measurer text is laid out with.
    pub fn measure(&self) -> &dyn TextMeasure {
        &*self.measure
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Add `node` as the last child of `parent`.
    pub fn insert(&mut self, parent: NodeId, node: BoxNode) -> Result<NodeId> {
        let depth = self.check(parent)?.depth + 1;
        node.validate().map_err(|e| rejected("insert", e))?;
        let id = self.alloc(node, Some(parent), depth);
        self.node_mut(parent).children.push(id);
        log::debug!(
            "inserted {id:?} {:?} under {parent:?}",
            self.node(id).config.label
        );
        self.refresh(id);
        Ok(id)
    }

    /// Remove `id` and its whole subtree.
    ///
    /// Ids of removed nodes stay invalid even after their slots are reused.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;
        if id == self.root {
            return Err(rejected(
                "remove",
                SceneError::InvalidHierarchy("the root cannot be removed"),
            ));
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let subtree = self.subtree(id);
        for &n in &subtree {
            if let Some(key) = self.node(n).index_key {
                self.index.remove(key);
            }
            self.nodes[n.idx()] = None;
            self.free_list.push(n.idx());
        }
        log::debug!("removed {id:?} and {} descendants", subtree.len() - 1);
        Ok(())
    }

    /// Move `id` to the end of `new_parent`'s children.
    ///
    /// Fails without changes when `id` is the root or `new_parent` is `id`
    /// or one of its descendants.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<()> {
        self.check(id)?;
        self.check(new_parent)?;
        if id == self.root {
            return Err(rejected(
                "reparent",
                SceneError::InvalidHierarchy("the root cannot be reparented"),
            ));
        }
        if self.is_ancestor_or_self(id, new_parent) {
            return Err(rejected(
                "reparent",
                SceneError::InvalidHierarchy("a node cannot move under itself"),
            ));
        }
        if let Some(old) = self.node(id).parent {
            self.unlink_parent(id, old);
        }
        self.link_parent(id, new_parent);
        for n in self.subtree(id) {
            let parent = self.node(n).parent.expect("moved nodes have a parent");
            self.node_mut(n).depth = self.node(parent).depth + 1;
        }
        log::debug!("reparented {id:?} under {new_parent:?}");
        self.refresh(id);
        Ok(())
    }

    /// Pin the `source` point of `id` to the `target` point of `parent`'s
    /// content box, reparenting first when needed.
    ///
    /// The node then follows `parent` as it resizes.
    pub fn attach_to(
        &mut self,
        id: NodeId,
        parent: NodeId,
        source: Corner,
        target: Corner,
    ) -> Result<()> {
        self.check(id)?;
        self.check(parent)?;
        if self.node(id).parent != Some(parent) {
            self.reparent(id, parent)?;
        }
        let (ox, oy) = source.fractions();
        let (ax, ay) = target.fractions();
        self.update_config(id, |n| {
            n.origin_x = Some(ox);
            n.origin_y = Some(oy);
            n.anchor_x = Some(ax);
            n.anchor_y = Some(ay);
        })
    }

    /// Set the position in the parent's content box.
    pub fn set_position(
        &mut self,
        id: NodeId,
        x: impl Into<Length>,
        y: impl Into<Length>,
    ) -> Result<()> {
        let (x, y) = (x.into(), y.into());
        self.update_config(id, |n| {
            n.x = x;
            n.y = y;
        })
    }

    /// Set the border-box size.
    pub fn set_size(
        &mut self,
        id: NodeId,
        width: impl Into<Length>,
        height: impl Into<Length>,
    ) -> Result<()> {
        let (width, height) = (width.into(), height.into());
        self.update_config(id, |n| {
            n.width = width;
            n.height = height;
        })
    }

    /// Set the origin fractions that the position refers to.
    pub fn set_origin(&mut self, id: NodeId, ox: f64, oy: f64) -> Result<()> {
        self.update_config(id, |n| {
            n.origin_x = Some(ox);
            n.origin_y = Some(oy);
        })
    }

    /// Set or clear the anchor fractions per axis.
    pub fn set_anchor(&mut self, id: NodeId, ax: Option<f64>, ay: Option<f64>) -> Result<()> {
        self.update_config(id, |n| {
            n.anchor_x = ax;
            n.anchor_y = ay;
        })
    }

    /// Replace the style.
    pub fn set_style(&mut self, id: NodeId, style: Style) -> Result<()> {
        self.update_config(id, |n| n.style = style)
    }

    /// Replace what the node draws.
    pub fn set_content(&mut self, id: NodeId, content: Content) -> Result<()> {
        self.update_config(id, |n| n.content = content)
    }

    /// Replace the text of a label or paragraph.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        self.check_text(id, "set_text")?;
        let text = text.into();
        self.update_config(id, |n| {
            if let Content::Label { text: t, .. } | Content::Paragraph { text: t, .. } =
                &mut n.content
            {
                *t = text;
            }
        })
    }

    /// Replace the font of a label or paragraph.
    pub fn set_font(&mut self, id: NodeId, font: Font) -> Result<()> {
        self.check_text(id, "set_font")?;
        self.update_config(id, |n| {
            if let Content::Label { font: f, .. } | Content::Paragraph { font: f, .. } =
                &mut n.content
            {
                *f = font;
            }
        })
    }

    /// Rename the node. Geometry is unaffected.
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> Result<()> {
        self.check(id)?;
        self.node_mut(id).config.label = label.into();
        Ok(())
    }

    /// Re-resolve the subtree at `id` and refresh its index entries.
    ///
    /// Mutations already do this; hosts call it after changing something the
    /// tree cannot see, such as the measurer's fonts.
    pub fn invalidate(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;
        for n in self.subtree(id) {
            self.node_mut(n).text = None;
        }
        self.refresh(id);
        Ok(())
    }

    /// The node's current configuration.
    pub fn config(&self, id: NodeId) -> Result<&BoxNode> {
        Ok(&self.check(id)?.config)
    }

    /// Border box in scene coordinates.
    pub fn global_bounds(&self, id: NodeId) -> Result<Rect> {
        Ok(self.resolved(id)?.bounds)
    }

    /// Padding-shrunk box in scene coordinates; children lay out in it.
    pub fn content_bounds(&self, id: NodeId) -> Result<Rect> {
        Ok(self.resolved(id)?.content)
    }

    /// Resolved `x`/`y` in pixels relative to the parent's content box,
    /// before margin and origin offsets.
    pub fn local_position(&self, id: NodeId) -> Result<Point> {
        Ok(self.resolved(id)?.position)
    }

    /// Distance from the root.
    pub fn depth(&self, id: NodeId) -> Result<u32> {
        Ok(self.check(id)?.depth)
    }

    /// Get the parent of a node, if any.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        self.node(id).parent
    }

    /// Get the children of a node, or an empty slice if the node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        &self.node(id).children
    }

    /// Position among the parent's children; `0` for the root.
    pub fn sibling_index(&self, id: NodeId) -> Result<usize> {
        self.check(id)?;
        Ok(self.sibling_index_of(id))
    }

    /// The node's position in paint order.
    pub fn paint_key(&self, id: NodeId) -> Result<PaintKey> {
        self.check(id)?;
        Ok(self.paint_key_of(id))
    }

    /// `id` and all of its descendants in pre-order.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.check(id)?;
        Ok(self.subtree(id))
    }

    /// Get the next node in depth-first traversal order.
    ///
    /// Returns `None` past the last node or if `current` is stale.
    pub fn next_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        if let Some(&first_child) = self.node(current).children.first() {
            return Some(first_child);
        }
        let mut node = current;
        while let Some(parent) = self.node(node).parent {
            if let Some(next) = self.sibling_at(node, 1) {
                return Some(next);
            }
            node = parent;
        }
        None
    }

    /// Get the previous node in depth-first traversal order.
    ///
    /// Returns `None` before the root or if `current` is stale.
    pub fn prev_depth_first(&self, current: NodeId) -> Option<NodeId> {
        if !self.is_alive(current) {
            return None;
        }
        let Some(mut node) = self.sibling_at(current, -1) else {
            return self.node(current).parent;
        };
        while let Some(&last) = self.node(node).children.last() {
            node = last;
        }
        Some(node)
    }

    /// Live nodes whose bounds overlap `rect` (edges inclusive), in paint order.
    pub fn intersect_rect(&self, rect: Rect) -> Vec<NodeId> {
        let mut hits: Vec<NodeId> = self
            .index
            .query_rect(rect_to_aabb(rect))
            .map(|(_, id)| id)
            .collect();
        self.sort_paint_order(&mut hits);
        hits
    }

    /// Live nodes whose bounds contain `point` (edges inclusive), in paint order.
    pub fn containing_point(&self, point: Point) -> Vec<NodeId> {
        let mut hits: Vec<NodeId> = self
            .index
            .query_point(point.x, point.y)
            .map(|(_, id)| id)
            .collect();
        self.sort_paint_order(&mut hits);
        hits
    }

    /// The topmost node under `point`. The root is never picked.
    pub fn hit_test_point(&self, point: Point) -> Option<NodeId> {
        self.containing_point(point)
            .into_iter()
            .rfind(|&id| id != self.root)
    }

    /// The wrapped layout of a paragraph node.
    pub fn text_layout(&self, id: NodeId) -> Result<Option<&TextLayout>> {
        Ok(self.check(id)?.text.as_ref().map(|c| &c.layout))
    }

    /// Find the line, word and character of a paragraph under a scene point.
    ///
    /// Accounts for the content box, text alignment and vertical alignment
    /// the same way painting does. `None` for nodes without a paragraph.
    pub fn hit_text(&self, id: NodeId, point: Point) -> Result<Option<TextHit>> {
        let node = self.check(id)?;
        let (Some(cache), Some(resolved)) = (&node.text, &node.resolved) else {
            return Ok(None);
        };
        let content = resolved.content;
        let style = &node.config.style;
        let top = content.y0
            + style
                .vertical_align
                .offset(content.height(), cache.layout.height());
        Ok(Some(cache.layout.hit_test_aligned(
            point.x - content.x0,
            point.y - top,
            style.text_align,
            content.width(),
        )))
    }

    /// The background that shows through `id`: its own, else the nearest
    /// ancestor's, else `fallback`.
    pub fn effective_background(&self, id: NodeId, fallback: Color) -> Color {
        let mut current = Some(id).filter(|&id| self.is_alive(id));
        while let Some(n) = current {
            let node = self.node(n);
            if let Some(color) = node.config.style.background_color {
                return color;
            }
            current = node.parent;
        }
        fallback
    }

    // Internals shared with painting.

    pub(crate) fn resolved_node(&self, id: NodeId) -> Result<(&BoxNode, Resolved)> {
        let node = self.check(id)?;
        Ok((&node.config, self.resolved(id)?))
    }

    fn check(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .filter(|n| n.generation == id.1)
            .ok_or(SceneError::NotFound(id))
    }

    fn check_text(&self, id: NodeId, op: &str) -> Result<()> {
        match self.check(id)?.config.content {
            Content::Plain => Err(rejected(op, SceneError::InvalidNode("node has no text"))),
            _ => Ok(()),
        }
    }

    fn resolved(&self, id: NodeId) -> Result<Resolved> {
        Ok(self
            .check(id)?
            .resolved
            .expect("live nodes are resolved between mutations"))
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()]
            .as_ref()
            .expect("dangling NodeId (node was removed)")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()]
            .as_mut()
            .expect("dangling NodeId (node was removed)")
    }

    fn alloc(&mut self, config: BoxNode, parent: Option<NodeId>, depth: u32) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, config, parent, depth));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes
                .push(Some(Node::new(generation, config, parent, depth)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let idx = idx as u32;
        NodeId::new(idx, generation)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.node(n).parent;
        }
        false
    }

    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.node(n).children.iter().rev());
        }
        out
    }

    fn sibling_at(&self, id: NodeId, step: isize) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let siblings = &self.node(parent).children;
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos.checked_add_signed(step)?).copied()
    }

    fn sibling_index_of(&self, id: NodeId) -> usize {
        self.node(id)
            .parent
            .and_then(|p| self.node(p).children.iter().position(|&c| c == id))
            .unwrap_or(0)
    }

    fn paint_key_of(&self, id: NodeId) -> PaintKey {
        PaintKey {
            depth: self.node(id).depth,
            sibling_index: self.sibling_index_of(id),
        }
    }

    fn sort_paint_order(&self, ids: &mut [NodeId]) {
        ids.sort_by_cached_key(|&id| (self.paint_key_of(id), id.0));
    }

    /// Clone the configuration, apply `f`, and commit it if it validates.
    fn update_config(&mut self, id: NodeId, f: impl FnOnce(&mut BoxNode)) -> Result<()> {
        let node = self.check(id)?;
        let mut config = node.config.clone();
        f(&mut config);
        config.validate()
            .and_then(|()| match node.parent {
                None => config.validate_root(),
                Some(_) => Ok(()),
            })
            .map_err(|e| rejected("update", e))?;
        if config == node.config {
            return Ok(());
        }
        let content_changed = config.content != node.config.content;
        let node = self.node_mut(id);
        node.config = config;
        if content_changed {
            node.text = None;
        }
        self.refresh(id);
        Ok(())
    }

    /// Drop the resolved geometry of the subtree at `id`, resolve it again
    /// and reinsert it into the index.
    fn refresh(&mut self, id: NodeId) {
        let subtree = self.subtree(id);
        for &n in &subtree {
            let key = {
                let node = self.node_mut(n);
                node.resolved = None;
                node.index_key.take()
            };
            if let Some(key) = key {
                self.index.remove(key);
            }
        }
        // Children come before their parents here; each resolution pulls in
        // its unresolved ancestors first.
        for &n in subtree.iter().rev() {
            self.ensure_resolved(n);
            let bounds = self.resolved_bounds(n);
            let key = self.index.insert(rect_to_aabb(bounds), n);
            self.node_mut(n).index_key = Some(key);
        }
        log::trace!("resolved {} nodes under {id:?}", subtree.len());
    }

    fn resolved_bounds(&self, id: NodeId) -> Rect {
        self.node(id)
            .resolved
            .expect("ensure_resolved fills the cache")
            .bounds
    }

    fn ensure_resolved(&mut self, id: NodeId) {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(n) = current {
            let node = self.node(n);
            if node.resolved.is_some() {
                break;
            }
            chain.push(n);
            current = node.parent;
        }
        for n in chain.into_iter().rev() {
            self.resolve_one(n);
        }
    }

    /// Resolve one node whose parent is already resolved.
    fn resolve_one(&mut self, id: NodeId) {
        let node = self.node(id);
        let parent_content = node
            .parent
            .and_then(|p| self.node(p).resolved)
            .map(|r| r.content);
        let wrap = layout::content_width(&node.config, parent_content);
        let stale = match (&node.config.content, &node.text) {
            (Content::Paragraph { .. }, Some(cache)) => cache.wrap != wrap,
            (Content::Paragraph { .. }, None) => true,
            _ => false,
        };
        if stale && let Content::Paragraph { text, font } = &node.config.content {
            let layout = TextLayout::new(text, font, wrap, &*self.measure);
            self.node_mut(id).text = Some(TextCache { layout, wrap });
        }

        let node = self.node(id);
        let measure = &*self.measure;
        let resolved = layout::resolve(&node.config, parent_content, || {
            match (&node.config.content, &node.text) {
                (Content::Label { text, font }, _) => {
                    let size = measure.measure(text, font);
                    Size::new(size.width, size.height)
                }
                (Content::Paragraph { .. }, Some(cache)) => {
                    Size::new(cache.layout.width(), cache.layout.height())
                }
                _ => Size::ZERO,
            }
        });
        self.node_mut(id).resolved = Some(resolved);
    }
}
