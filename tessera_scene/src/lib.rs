// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessera Scene: a retained-mode 2D scene graph.
//!
//! - [`Tree`]: an arena of boxes ([`BoxNode`]) with generational ids. Geometry
//!   is given in pixels, percentages of the parent's content box or as
//!   anchors, and is resolved to scene-space rectangles on every mutation.
//! - A spatial index from `tessera_index`, kept in sync with the resolved
//!   bounds, answers viewport culling and hit testing.
//! - [`Scene`]: a canvas-sized root, a scrollable viewport, a render pass
//!   over an abstract [`Renderer`], and pointer routing through
//!   [`PointerRouter`].
//!
//! Text nodes are laid out with `tessera_text`: labels are measured as a
//! single line, paragraphs wrap to their content width and grow to fit.
//!
//! ## Paint order
//!
//! Nodes paint by ascending [`PaintKey`]: depth first, then position among
//! siblings. Hit testing returns the node with the greatest key under the
//! point; the root is painted but never picked.
//!
//! ## Minimal example
//!
//! ```rust
//! use tessera_scene::kurbo::{Point, Rect};
//! use tessera_scene::{BoxNode, Length, RecordingRenderer, Scene, SceneConfig};
//! use tessera_text::{FixedAdvance, Font};
//!
//! let config = SceneConfig { width: 200.0, height: 200.0, ..SceneConfig::default() };
//! let mut scene = Scene::new(config, FixedAdvance::new(8.0)).unwrap();
//!
//! let panel = scene
//!     .add_child(BoxNode {
//!         width: Length::Percent(50.0),
//!         height: Length::Percent(100.0),
//!         ..BoxNode::default()
//!     })
//!     .unwrap();
//! let badge = scene
//!     .tree_mut()
//!     .insert(panel, BoxNode::new("badge", 0.0, 0.0, 10.0, 10.0).with_anchor(1.0, 1.0))
//!     .unwrap();
//! assert_eq!(
//!     scene.tree().global_bounds(badge).unwrap(),
//!     Rect::new(90.0, 190.0, 100.0, 200.0)
//! );
//!
//! // Wrapped text sized to its lines.
//! let font = Font::new(10.0, "mono");
//! let text = scene
//!     .add_child(BoxNode::paragraph("p", "hello wide world", font, 64.0).at(110.0, 0.0))
//!     .unwrap();
//! assert_eq!(scene.tree().global_bounds(text).unwrap().height(), 30.0);
//!
//! assert_eq!(scene.hit_test(Point::new(95.0, 195.0)), Some(badge));
//!
//! let mut renderer = RecordingRenderer::default();
//! assert_eq!(scene.render(&mut renderer), 4);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub use kurbo;

mod error;
mod layout;
mod pointer;
mod render;
mod scene;
mod style;
mod tree;
mod types;
mod util;

pub use error::{Result, SceneError};
pub use pointer::{
    DragUpdate, Modifiers, PointerDispatch, PointerEvent, PointerEventKind, PointerRouter,
    PointerState,
};
pub use render::{DrawCommand, RecordingRenderer, Renderer, TextBaseline};
pub use scene::{Scene, SceneConfig};
pub use style::{Color, Style};
pub use tessera_text::{TextAlign, VerticalAlign};
pub use tree::{PaintKey, Tree};
pub use types::{BoxNode, Content, Corner, Length, NodeId};
