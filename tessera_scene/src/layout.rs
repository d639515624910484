// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution of a node's geometry against its parent's content box.
//!
//! Per axis, with `dim` the parent content box extent on that axis:
//!
//! - size: `Px(v)` is `v`; `Percent(p)` is `p / 100 * dim - 2 * margin`;
//!   `Auto` is the intrinsic content size plus padding on both sides.
//! - position: `Px(v)` is `v`; `Percent(p)` is `p / 100 * dim - size`;
//!   `Auto` is `0`. The margin is added and `size * origin` subtracted, and
//!   the result is relative to the parent content box origin.
//! - anchored axis: the origin point sits at `anchor * dim` from the parent
//!   content box origin; position and margin are ignored.
//!
//! The root has no parent: it is resolved against an empty box at `(0, 0)`
//! and rejects percentages and anchors up front.

use kurbo::{Point, Rect, Size};

use crate::types::{BoxNode, Length};

/// Cached output of resolving one node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Resolved {
    /// `x`/`y` in pixels, before margin and origin offsets. This is the
    /// value that keeps the node in place when written back as `Px`.
    pub(crate) position: Point,
    /// Border box in scene coordinates.
    pub(crate) bounds: Rect,
    /// Bounds shrunk by padding.
    pub(crate) content: Rect,
}

fn resolve_size(len: Length, parent_dim: f64, margin: f64) -> Option<f64> {
    match len {
        Length::Px(v) => Some(v),
        Length::Percent(p) => Some(p / 100.0 * parent_dim - 2.0 * margin),
        Length::Auto => None,
    }
}

fn resolve_position(len: Length, parent_dim: f64, size: f64) -> f64 {
    match len {
        Length::Px(v) => v,
        Length::Percent(p) => p / 100.0 * parent_dim - size,
        Length::Auto => 0.0,
    }
}

/// Start of the node's box on one axis, relative to the parent content origin.
fn place(
    position: f64,
    anchor: Option<f64>,
    origin: f64,
    size: f64,
    margin: f64,
    parent_dim: f64,
) -> f64 {
    let origin_offset = size * origin;
    match anchor {
        Some(anchor) => anchor * parent_dim - origin_offset,
        None => position + margin - origin_offset,
    }
}

/// Width of the node's content box when its width does not depend on content.
///
/// This is the width text wraps to.
pub(crate) fn content_width(node: &BoxNode, parent_content: Option<Rect>) -> Option<f64> {
    let parent = parent_content.unwrap_or(Rect::ZERO);
    resolve_size(node.width, parent.width(), node.style.h_margin)
        .map(|w| w - 2.0 * node.style.h_padding)
}

/// Resolve `node` inside `parent_content` (`None` for the root).
///
/// `intrinsic` returns the content size and is only called when a size is `Auto`.
pub(crate) fn resolve(
    node: &BoxNode,
    parent_content: Option<Rect>,
    intrinsic: impl FnOnce() -> Size,
) -> Resolved {
    let parent = parent_content.unwrap_or(Rect::ZERO);
    let style = &node.style;
    let (h_pad, v_pad) = (style.h_padding, style.v_padding);

    let fixed_width = resolve_size(node.width, parent.width(), style.h_margin);
    let fixed_height = resolve_size(node.height, parent.height(), style.v_margin);
    let (width, height) = match (fixed_width, fixed_height) {
        (Some(w), Some(h)) => (w, h),
        (w, h) => {
            let measured = intrinsic();
            (
                w.unwrap_or(measured.width + 2.0 * h_pad),
                h.unwrap_or(measured.height + 2.0 * v_pad),
            )
        }
    };

    let position = Point::new(
        resolve_position(node.x, parent.width(), width),
        resolve_position(node.y, parent.height(), height),
    );
    let (origin_x, origin_y) = node.origin();
    let x0 = parent.x0
        + place(
            position.x,
            node.anchor_x,
            origin_x,
            width,
            style.h_margin,
            parent.width(),
        );
    let y0 = parent.y0
        + place(
            position.y,
            node.anchor_y,
            origin_y,
            height,
            style.v_margin,
            parent.height(),
        );

    let bounds = Rect::new(x0, y0, x0 + width, y0 + height);
    Resolved {
        position,
        bounds,
        content: shrink(bounds, h_pad, v_pad),
    }
}

/// Shrink by padding on every side, collapsing to the center line instead of inverting.
fn shrink(rect: Rect, h: f64, v: f64) -> Rect {
    let x0 = rect.x0 + h;
    let y0 = rect.y0 + v;
    let x1 = (rect.x1 - h).max(x0.min(rect.center().x));
    let y1 = (rect.y1 - v).max(y0.min(rect.center().y));
    Rect::new(x0.min(x1), y0.min(y1), x1, y1)
}
