// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer routing: hover transitions, presses and drag capture.
//!
//! [`PointerRouter`] is a pure state machine. It is fed the topmost node
//! under the pointer and appends the resulting [`PointerDispatch`]es to a
//! caller-provided buffer; it never touches the tree, so handlers run by the
//! host after a call returns cannot re-enter routing.
//!
//! ## Minimal example
//!
//! ```
//! use tessera_scene::{PointerEvent, PointerEventKind, PointerRouter};
//! # use tessera_scene::{BoxNode, Scene, SceneConfig};
//! # use tessera_text::FixedAdvance;
//! # let mut scene = Scene::new(SceneConfig::default(), FixedAdvance::new(8.0)).unwrap();
//! # let a = scene.add_child(BoxNode::new("a", 0.0, 0.0, 50.0, 50.0)).unwrap();
//!
//! let mut router = PointerRouter::default();
//! let mut out = Vec::new();
//! router.on_move(Some(a), PointerEvent::new(10.0, 10.0), &mut out);
//! let kinds: Vec<_> = out.iter().map(|d| d.kind).collect();
//! assert_eq!(kinds, [PointerEventKind::Over, PointerEventKind::Move]);
//! ```

use alloc::vec::Vec;

use kurbo::{Point, Vec2};

use crate::types::NodeId;

bitflags::bitflags! {
    /// Keyboard modifiers held during a pointer event.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Control.
        const CONTROL = 1 << 1;
        /// Alt / Option.
        const ALT = 1 << 2;
        /// Meta / Command / Windows.
        const META = 1 << 3;
    }
}

/// A pointer sample in canvas-local coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointerEvent {
    /// Position relative to the canvas' top-left corner.
    pub position: Point,
    /// Modifiers held at the time.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// An event at `(x, y)` with no modifiers.
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            modifiers: Modifiers::empty(),
        }
    }

    /// Replace the modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// What happened to a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// The pointer entered the node.
    Over,
    /// The pointer left the node.
    Out,
    /// The pointer moved over, or while dragging, the node.
    Move,
    /// A button was pressed on the node.
    Down,
    /// A button was released; goes to the dragged node if any.
    Up,
}

/// One event to deliver to one node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerDispatch {
    /// Target node.
    pub node: NodeId,
    /// Event kind.
    pub kind: PointerEventKind,
    /// Pointer position as given to the router.
    pub position: Point,
    /// Modifiers of the originating event.
    pub modifiers: Modifiers,
}

/// Router state.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum PointerState {
    /// Not over any pickable node.
    #[default]
    Idle,
    /// Over this node.
    Hovering(NodeId),
    /// A press on `node` is held.
    Dragging {
        /// The captured node.
        node: NodeId,
        /// Its local position when the press started.
        start: Point,
        /// Where the press started.
        press: Point,
    },
}

impl PointerState {
    /// The hovered or captured node.
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            Self::Idle => None,
            Self::Hovering(node) | Self::Dragging { node, .. } => Some(node),
        }
    }
}

/// Where a drag wants the captured node to be.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragUpdate {
    /// The captured node.
    pub node: NodeId,
    /// Its new local position.
    pub position: Point,
}

/// Hover and drag state machine.
#[derive(Clone, Debug, Default)]
pub struct PointerRouter {
    state: PointerState,
}

impl PointerRouter {
    /// The current state.
    pub fn state(&self) -> PointerState {
        self.state
    }

    /// Forget any hover or capture without emitting events.
    pub fn reset(&mut self) {
        self.state = PointerState::Idle;
    }

    /// The pointer moved; `hit` is the topmost node under it.
    ///
    /// While dragging, the captured node gets the `Move` regardless of `hit`
    /// and the returned update says where to put it.
    pub fn on_move(
        &mut self,
        hit: Option<NodeId>,
        event: PointerEvent,
        out: &mut Vec<PointerDispatch>,
    ) -> Option<DragUpdate> {
        if let PointerState::Dragging { node, start, press } = self.state {
            push(out, node, PointerEventKind::Move, event);
            let delta: Vec2 = event.position - press;
            return Some(DragUpdate {
                node,
                position: start + delta,
            });
        }
        self.hover_to(hit, event, out);
        if let Some(node) = hit {
            push(out, node, PointerEventKind::Move, event);
        }
        None
    }

    /// A button was pressed; `start` is the hit node's local position.
    ///
    /// Presses over nothing, or while a press is already held, are ignored.
    pub fn on_down(
        &mut self,
        hit: Option<NodeId>,
        event: PointerEvent,
        start: Point,
        out: &mut Vec<PointerDispatch>,
    ) {
        if matches!(self.state, PointerState::Dragging { .. }) {
            return;
        }
        self.hover_to(hit, event, out);
        let Some(node) = hit else {
            return;
        };
        push(out, node, PointerEventKind::Down, event);
        self.state = PointerState::Dragging {
            node,
            start,
            press: event.position,
        };
        log::debug!("pointer captured {node:?}");
    }

    /// A button was released.
    pub fn on_up(
        &mut self,
        hit: Option<NodeId>,
        event: PointerEvent,
        out: &mut Vec<PointerDispatch>,
    ) {
        if let PointerState::Dragging { node, .. } = self.state {
            push(out, node, PointerEventKind::Up, event);
            self.state = PointerState::Hovering(node);
            log::debug!("pointer released {node:?}");
            self.hover_to(hit, event, out);
        } else {
            self.hover_to(hit, event, out);
            if let Some(node) = hit {
                push(out, node, PointerEventKind::Up, event);
            }
        }
    }

    /// The pointer left the canvas.
    pub fn on_leave(&mut self, event: PointerEvent, out: &mut Vec<PointerDispatch>) {
        if let Some(node) = self.state.node() {
            push(out, node, PointerEventKind::Out, event);
        }
        self.state = PointerState::Idle;
    }

    fn hover_to(
        &mut self,
        hit: Option<NodeId>,
        event: PointerEvent,
        out: &mut Vec<PointerDispatch>,
    ) {
        let current = self.state.node();
        if current == hit {
            return;
        }
        if let Some(old) = current {
            push(out, old, PointerEventKind::Out, event);
        }
        if let Some(new) = hit {
            push(out, new, PointerEventKind::Over, event);
        }
        log::debug!("pointer hover {current:?} -> {hit:?}");
        self.state = hit.map_or(PointerState::Idle, PointerState::Hovering);
    }
}

fn push(
    out: &mut Vec<PointerDispatch>,
    node: NodeId,
    kind: PointerEventKind,
    event: PointerEvent,
) {
    out.push(PointerDispatch {
        node,
        kind,
        position: event.position,
        modifiers: event.modifiers,
    });
}

#[cfg(test)]
mod tests {
    use super::PointerEventKind::{Down, Move, Out, Over, Up};
    use super::*;
    use alloc::vec;

    const A: NodeId = NodeId::new(1, 1);
    const B: NodeId = NodeId::new(2, 1);

    fn kinds(out: &[PointerDispatch]) -> Vec<(PointerEventKind, NodeId)> {
        out.iter().map(|d| (d.kind, d.node)).collect()
    }

    #[test]
    fn hover_transitions() {
        let mut r = PointerRouter::default();
        let mut out = Vec::new();
        r.on_move(Some(A), PointerEvent::new(1.0, 1.0), &mut out);
        r.on_move(Some(A), PointerEvent::new(2.0, 1.0), &mut out);
        r.on_move(Some(B), PointerEvent::new(3.0, 1.0), &mut out);
        r.on_move(None, PointerEvent::new(9.0, 9.0), &mut out);
        assert_eq!(
            kinds(&out),
            vec![
                (Over, A),
                (Move, A),
                (Move, A),
                (Out, A),
                (Over, B),
                (Move, B),
                (Out, B),
            ]
        );
        assert_eq!(r.state(), PointerState::Idle);
    }

    #[test]
    fn drag_captures_and_reports_positions() {
        let mut r = PointerRouter::default();
        let mut out = Vec::new();
        r.on_down(
            Some(A),
            PointerEvent::new(10.0, 10.0),
            Point::new(100.0, 50.0),
            &mut out,
        );
        assert_eq!(kinds(&out), vec![(Over, A), (Down, A)]);
        out.clear();

        // Moving over another node keeps the capture.
        let update = r.on_move(Some(B), PointerEvent::new(15.0, 7.0), &mut out);
        assert_eq!(
            update,
            Some(DragUpdate {
                node: A,
                position: Point::new(105.0, 47.0)
            })
        );
        assert_eq!(kinds(&out), vec![(Move, A)]);
        out.clear();

        // Released over B: Up to the captured node, then hover moves to B.
        r.on_up(Some(B), PointerEvent::new(15.0, 7.0), &mut out);
        assert_eq!(kinds(&out), vec![(Up, A), (Out, A), (Over, B)]);
        assert_eq!(r.state(), PointerState::Hovering(B));
    }

    #[test]
    fn press_over_nothing_is_ignored() {
        let mut r = PointerRouter::default();
        let mut out = Vec::new();
        r.on_down(None, PointerEvent::new(0.0, 0.0), Point::ZERO, &mut out);
        assert!(out.is_empty());
        assert_eq!(r.state(), PointerState::Idle);
        r.on_up(None, PointerEvent::new(0.0, 0.0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn up_without_drag_goes_to_hit() {
        let mut r = PointerRouter::default();
        let mut out = Vec::new();
        r.on_up(Some(B), PointerEvent::new(0.0, 0.0), &mut out);
        assert_eq!(kinds(&out), vec![(Over, B), (Up, B)]);
    }

    #[test]
    fn leave_sends_out_and_idles() {
        let mut r = PointerRouter::default();
        let mut out = Vec::new();
        let ev = PointerEvent::new(1.0, 1.0).with_modifiers(Modifiers::SHIFT | Modifiers::ALT);
        r.on_down(Some(A), ev, Point::ZERO, &mut out);
        out.clear();
        r.on_leave(ev, &mut out);
        assert_eq!(kinds(&out), vec![(Out, A)]);
        assert!(out[0].modifiers.contains(Modifiers::ALT));
        assert_eq!(r.state(), PointerState::Idle);
        out.clear();
        r.on_leave(ev, &mut out);
        assert!(out.is_empty());
    }
}
