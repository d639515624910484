// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene: a tree under a canvas-sized root, a scrollable viewport and
//! pointer routing.

use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};
use tessera_index::Backend;
use tessera_index::backends::RTree;
use tessera_text::TextMeasure;

use crate::error::{Result, SceneError};
use crate::pointer::{PointerDispatch, PointerEvent, PointerRouter, PointerState};
use crate::render::Renderer;
use crate::style::{Color, Style};
use crate::tree::Tree;
use crate::types::{BoxNode, NodeId};

/// Settings for a new [`Scene`].
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
    /// Color the canvas is cleared to before every render.
    pub clear_color: Color,
    /// Style of the root box.
    pub root_style: Style,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            clear_color: Color::BLACK,
            root_style: Style::default(),
        }
    }
}

fn check_size(width: f64, height: f64) -> Result<()> {
    if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidNode(
            "canvas size must be finite and non-negative",
        ))
    }
}

/// A canvas-sized root box, the tree beneath it, a viewport and a pointer router.
///
/// ```
/// use tessera_scene::{BoxNode, PointerEvent, RecordingRenderer, Scene, SceneConfig};
/// use tessera_text::FixedAdvance;
///
/// let mut scene = Scene::new(SceneConfig::default(), FixedAdvance::new(8.0)).unwrap();
/// let card = scene.add_child(BoxNode::new("card", 100.0, 100.0, 50.0, 50.0)).unwrap();
///
/// // Drag the card by 20px to the right.
/// scene.pointer_down(PointerEvent::new(110.0, 110.0));
/// scene.pointer_move(PointerEvent::new(130.0, 110.0));
/// scene.pointer_up(PointerEvent::new(130.0, 110.0));
/// assert_eq!(scene.tree().global_bounds(card).unwrap().x0, 120.0);
///
/// let mut renderer = RecordingRenderer::default();
/// assert_eq!(scene.render(&mut renderer), 2);
/// ```
pub struct Scene<B: Backend<f64> = RTree<f64>> {
    tree: Tree<B>,
    viewport_origin: Point,
    size: Size,
    clear_color: Color,
    router: PointerRouter,
}

impl<B: Backend<f64>> core::fmt::Debug for Scene<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scene")
            .field("tree", &self.tree)
            .field("viewport", &self.viewport())
            .field("pointer", &self.router.state())
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Create a scene indexed by an R-tree.
    pub fn new(config: SceneConfig, measure: impl TextMeasure + 'static) -> Result<Self> {
        Self::with_backend(RTree::default(), config, measure)
    }
}

impl<B: Backend<f64>> Scene<B> {
    /// Create a scene over a specific index backend.
    pub fn with_backend(
        backend: B,
        config: SceneConfig,
        measure: impl TextMeasure + 'static,
    ) -> Result<Self> {
        check_size(config.width, config.height)?;
        let root = BoxNode::new("root", 0.0, 0.0, config.width, config.height)
            .with_style(config.root_style);
        let tree = Tree::with_backend(backend, root, measure)?;
        Ok(Self {
            tree,
            viewport_origin: Point::ZERO,
            size: Size::new(config.width, config.height),
            clear_color: config.clear_color,
            router: PointerRouter::default(),
        })
    }

    /// The root box.
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// The tree, for queries.
    pub fn tree(&self) -> &Tree<B> {
        &self.tree
    }

    /// The tree, for mutations.
    pub fn tree_mut(&mut self) -> &mut Tree<B> {
        &mut self.tree
    }

    /// Add `node` as the last child of the root.
    pub fn add_child(&mut self, node: BoxNode) -> Result<NodeId> {
        self.tree.insert(self.tree.root(), node)
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Resize the canvas and the root box with it.
    ///
    /// Percentage and anchored descendants follow.
    pub fn set_size(&mut self, width: f64, height: f64) -> Result<()> {
        check_size(width, height)?;
        self.tree.set_size(self.tree.root(), width, height)?;
        self.size = Size::new(width, height);
        log::debug!("scene resized to {width}x{height}");
        Ok(())
    }

    /// Scroll so that scene point `origin` is at the canvas' top-left corner.
    pub fn scroll_to(&mut self, origin: Point) {
        self.viewport_origin = origin;
    }

    /// Shift the viewport by `delta`.
    pub fn scroll_by(&mut self, delta: Vec2) {
        self.viewport_origin += delta;
    }

    /// The scene point at the canvas' top-left corner.
    pub fn viewport_origin(&self) -> Point {
        self.viewport_origin
    }

    /// The visible part of the scene.
    pub fn viewport(&self) -> Rect {
        Rect::from_origin_size(self.viewport_origin, self.size)
    }

    /// Color the canvas is cleared to.
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Change the clear color.
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Nodes overlapping the viewport, in paint order.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        self.tree.intersect_rect(self.viewport())
    }

    /// Paint every node overlapping the viewport and return how many were painted.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) -> usize {
        renderer.clear(self.clear_color);
        let visible = self.visible_nodes();
        renderer.save();
        renderer.translate(-self.viewport_origin.to_vec2());
        let painted = visible
            .iter()
            .filter(|&&id| self.tree.paint(id, &mut *renderer, self.clear_color).is_ok())
            .count();
        renderer.restore();
        log::trace!("painted {painted} of {} visible nodes", visible.len());
        painted
    }

    /// Convert a canvas-local pointer position to scene coordinates when
    /// `apply_viewport_offset` is set, else return it unchanged.
    pub fn local_point_from_event(
        &self,
        event: &PointerEvent,
        apply_viewport_offset: bool,
    ) -> Point {
        if apply_viewport_offset {
            event.position + self.viewport_origin.to_vec2()
        } else {
            event.position
        }
    }

    /// The topmost pickable node under a canvas-local position.
    pub fn hit_test(&self, canvas_point: Point) -> Option<NodeId> {
        self.tree.hit_test_point(canvas_point + self.viewport_origin.to_vec2())
    }

    /// The router's state.
    pub fn pointer_state(&self) -> PointerState {
        self.router.state()
    }

    /// The pointer moved over the canvas.
    ///
    /// While a node is captured it is moved by the pointer delta; anchored
    /// axes stay pinned.
    pub fn pointer_move(&mut self, event: PointerEvent) -> Vec<PointerDispatch> {
        let (event, hit) = self.route(event);
        let mut out = Vec::new();
        if let Some(drag) = self.router.on_move(hit, event, &mut out) {
            // Failures are logged by the tree; the node keeps its place.
            let _ = self
                .tree
                .set_position(drag.node, drag.position.x, drag.position.y);
        }
        out
    }

    /// A button was pressed over the canvas.
    pub fn pointer_down(&mut self, event: PointerEvent) -> Vec<PointerDispatch> {
        let (event, hit) = self.route(event);
        let start = hit
            .and_then(|id| self.tree.local_position(id).ok())
            .unwrap_or(Point::ZERO);
        let mut out = Vec::new();
        self.router.on_down(hit, event, start, &mut out);
        out
    }

    /// A button was released over the canvas.
    pub fn pointer_up(&mut self, event: PointerEvent) -> Vec<PointerDispatch> {
        let (event, hit) = self.route(event);
        let mut out = Vec::new();
        self.router.on_up(hit, event, &mut out);
        out
    }

    /// The pointer left the canvas.
    pub fn pointer_leave(&mut self, event: PointerEvent) -> Vec<PointerDispatch> {
        let (event, _) = self.route(event);
        let mut out = Vec::new();
        self.router.on_leave(event, &mut out);
        out
    }

    /// Move `event` into scene coordinates and hit test it.
    fn route(&mut self, event: PointerEvent) -> (PointerEvent, Option<NodeId>) {
        if let Some(node) = self.router.state().node()
            && !self.tree.is_alive(node)
        {
            log::debug!("pointer target {node:?} was removed");
            self.router.reset();
        }
        let event = PointerEvent {
            position: self.local_point_from_event(&event, true),
            ..event
        };
        (event, self.tree.hit_test_point(event.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use tessera_index::backends::FlatVec;
    use tessera_text::{FixedAdvance, Font};

    use crate::pointer::PointerEventKind::{Down, Move, Out, Over, Up};
    use crate::pointer::PointerEventKind;
    use crate::render::{DrawCommand, RecordingRenderer};
    use crate::types::Length;

    fn scene(w: f64, h: f64) -> Scene {
        let config = SceneConfig {
            width: w,
            height: h,
            ..SceneConfig::default()
        };
        Scene::new(config, FixedAdvance::new(10.0)).unwrap()
    }

    fn kinds(out: &[PointerDispatch]) -> Vec<(PointerEventKind, NodeId)> {
        out.iter().map(|d| (d.kind, d.node)).collect()
    }

    fn fills(commands: &[DrawCommand]) -> Vec<Rect> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn renders_visible_nodes_in_paint_order() {
        let mut s = scene(100.0, 100.0);
        let a = s.add_child(BoxNode::new("a", 10.0, 10.0, 30.0, 30.0)).unwrap();
        s.add_child(BoxNode::new("b", 20.0, 20.0, 30.0, 30.0)).unwrap();
        s.tree_mut()
            .insert(a, BoxNode::new("a1", 0.0, 0.0, 5.0, 5.0))
            .unwrap();
        s.add_child(BoxNode::new("far", 500.0, 500.0, 5.0, 5.0)).unwrap();

        let mut r = RecordingRenderer::default();
        assert_eq!(s.render(&mut r), 4);
        assert_eq!(r.commands()[0], DrawCommand::Clear(Color::BLACK));
        assert_eq!(
            fills(r.commands()),
            vec![
                Rect::new(0.0, 0.0, 100.0, 100.0),
                Rect::new(10.0, 10.0, 40.0, 40.0),
                Rect::new(20.0, 20.0, 50.0, 50.0),
                Rect::new(10.0, 10.0, 15.0, 15.0),
            ]
        );
        assert_eq!(r.commands().last(), Some(&DrawCommand::Restore));
    }

    #[test]
    fn scrolling_culls_and_translates() {
        let mut s = scene(100.0, 100.0);
        s.add_child(BoxNode::new("near", 10.0, 10.0, 10.0, 10.0)).unwrap();
        let far = s
            .add_child(BoxNode::new("far", 300.0, 300.0, 10.0, 10.0))
            .unwrap();
        s.scroll_to(Point::new(250.0, 250.0));
        assert_eq!(s.visible_nodes(), vec![far]);

        let mut r = RecordingRenderer::default();
        assert_eq!(s.render(&mut r), 1);
        assert!(
            r.commands()
                .contains(&DrawCommand::Translate(Vec2::new(-250.0, -250.0)))
        );
        // Canvas (55, 55) is scene (305, 305).
        assert_eq!(s.hit_test(Point::new(55.0, 55.0)), Some(far));
        let ev = PointerEvent::new(55.0, 55.0);
        assert_eq!(s.local_point_from_event(&ev, true), Point::new(305.0, 305.0));
        assert_eq!(s.local_point_from_event(&ev, false), Point::new(55.0, 55.0));
    }

    #[test]
    fn resize_moves_anchored_children() {
        let mut s = scene(200.0, 200.0);
        let badge = s
            .add_child(BoxNode::new("badge", 0.0, 0.0, 10.0, 10.0).with_anchor(1.0, 1.0))
            .unwrap();
        let half = s
            .add_child(BoxNode {
                width: Length::Percent(50.0),
                height: Length::Px(10.0),
                ..BoxNode::default()
            })
            .unwrap();
        s.set_size(400.0, 300.0).unwrap();
        assert_eq!(s.size(), Size::new(400.0, 300.0));
        assert_eq!(
            s.tree().global_bounds(badge).unwrap().origin(),
            Point::new(390.0, 290.0)
        );
        assert_eq!(s.tree().global_bounds(half).unwrap().width(), 200.0);
        assert!(s.set_size(f64::NAN, 1.0).is_err());
        assert_eq!(s.size(), Size::new(400.0, 300.0));
    }

    #[test]
    fn overlapping_deeper_node_wins_hover() {
        let mut s = scene(100.0, 100.0);
        let a = s.add_child(BoxNode::new("a", 10.0, 10.0, 50.0, 50.0)).unwrap();
        let b = s
            .tree_mut()
            .insert(
                a,
                BoxNode {
                    width: Length::Percent(100.0),
                    height: Length::Percent(100.0),
                    ..BoxNode::default()
                },
            )
            .unwrap();
        let out = s.pointer_move(PointerEvent::new(30.0, 30.0));
        assert_eq!(kinds(&out), vec![(Over, b), (Move, b)]);
        assert!(!out.iter().any(|d| d.node == a));
        // The root is painted but never hovered.
        let out = s.pointer_move(PointerEvent::new(90.0, 90.0));
        assert_eq!(kinds(&out), vec![(Out, b)]);
        assert_eq!(s.pointer_state(), PointerState::Idle);
    }

    #[test]
    fn drag_repositions_in_pixels() {
        let mut s = scene(200.0, 200.0);
        let card = s
            .add_child(BoxNode {
                x: Length::Percent(50.0),
                ..BoxNode::new("card", 0.0, 20.0, 40.0, 40.0)
            })
            .unwrap();
        // 50% of 200 minus own width: x = 60.
        assert_eq!(s.tree().global_bounds(card).unwrap().x0, 60.0);

        let down = s.pointer_down(PointerEvent::new(70.0, 30.0));
        assert_eq!(kinds(&down), vec![(Over, card), (Down, card)]);
        let moved = s.pointer_move(PointerEvent::new(80.0, 35.0));
        assert_eq!(kinds(&moved), vec![(Move, card)]);
        assert_eq!(
            s.tree().global_bounds(card).unwrap(),
            Rect::new(70.0, 25.0, 110.0, 65.0)
        );
        assert_eq!(s.tree().config(card).unwrap().x, Length::Px(70.0));

        let up = s.pointer_up(PointerEvent::new(80.0, 35.0));
        assert_eq!(kinds(&up), vec![(Up, card)]);
        assert_eq!(s.pointer_state(), PointerState::Hovering(card));
    }

    #[test]
    fn removed_capture_is_dropped() {
        let mut s = scene(100.0, 100.0);
        let a = s.add_child(BoxNode::new("a", 0.0, 0.0, 50.0, 50.0)).unwrap();
        s.pointer_down(PointerEvent::new(5.0, 5.0));
        s.tree_mut().remove(a).unwrap();
        let out = s.pointer_move(PointerEvent::new(6.0, 6.0));
        assert!(out.is_empty());
        assert_eq!(s.pointer_state(), PointerState::Idle);
    }

    #[test]
    fn paragraph_in_scene_over_flat_backend() {
        let mut s = Scene::with_backend(
            FlatVec::default(),
            SceneConfig {
                width: 100.0,
                height: 100.0,
                ..SceneConfig::default()
            },
            FixedAdvance::new(10.0),
        )
        .unwrap();
        let p = s
            .add_child(BoxNode::paragraph(
                "p",
                "one two three",
                Font::new(10.0, "mono"),
                Length::Percent(50.0),
            ))
            .unwrap();
        assert_eq!(s.tree().global_bounds(p).unwrap().height(), 30.0);
        let hit = s.tree().hit_text(p, Point::new(15.0, 25.0)).unwrap().unwrap();
        assert_eq!((hit.line, hit.word, hit.character), (Some(2), Some(0), Some(1)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SceneConfig {
            width: -1.0,
            ..SceneConfig::default()
        };
        assert!(Scene::new(config, FixedAdvance::new(1.0)).is_err());
    }
}
