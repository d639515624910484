// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: node identifiers, lengths, and node configuration.

use alloc::string::String;

use tessera_text::Font;

use crate::error::{Result, SceneError};
use crate::style::Style;

/// Identifier for a node in the tree (generational).
///
/// Ids of removed nodes never become valid again, even when their slot is
/// reused: lookups with a stale id fail with [`SceneError::NotFound`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// One geometry value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Length {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the parent's content box on the same axis.
    Percent(f64),
    /// Intrinsic: measured text for text nodes, zero for plain boxes.
    /// Positions treat it as zero.
    Auto,
}

impl Default for Length {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl From<f64> for Length {
    fn from(px: f64) -> Self {
        Self::Px(px)
    }
}

impl Length {
    /// Whether the value depends on a parent.
    pub fn is_percent(self) -> bool {
        matches!(self, Self::Percent(_))
    }

    fn is_finite(self) -> bool {
        match self {
            Self::Px(v) | Self::Percent(v) => v.is_finite(),
            Self::Auto => true,
        }
    }
}

/// Named points of a box, as `(x, y)` fractions of its size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    /// `(0.5, 0.5)`
    Center,
    /// `(0, 0)`
    TopLeft,
    /// `(0.5, 0)`
    TopCenter,
    /// `(1, 0)`
    TopRight,
    /// `(1, 0.5)`
    RightCenter,
    /// `(1, 1)`
    BottomRight,
    /// `(0.5, 1)`
    BottomCenter,
    /// `(0, 1)`
    BottomLeft,
    /// `(0, 0.5)`
    LeftCenter,
}

impl Corner {
    /// The corner as fractions of a box's width and height.
    pub const fn fractions(self) -> (f64, f64) {
        match self {
            Self::Center => (0.5, 0.5),
            Self::TopLeft => (0.0, 0.0),
            Self::TopCenter => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::RightCenter => (1.0, 0.5),
            Self::BottomRight => (1.0, 1.0),
            Self::BottomCenter => (0.5, 1.0),
            Self::BottomLeft => (0.0, 1.0),
            Self::LeftCenter => (0.0, 0.5),
        }
    }
}

/// What a node draws inside its content box.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    /// Background and border only.
    Plain,
    /// One line of text, never wrapped.
    Label {
        /// The text.
        text: String,
        /// Its font.
        font: Font,
    },
    /// Text wrapped to the content box width.
    Paragraph {
        /// The text; `'\n'` forces a line break.
        text: String,
        /// Its font.
        font: Font,
    },
}

impl Content {
    /// The text and font of text content.
    pub fn text(&self) -> Option<(&str, &Font)> {
        match self {
            Self::Plain => None,
            Self::Label { text, font } | Self::Paragraph { text, font } => Some((text, font)),
        }
    }
}

/// Configuration of one node, consumed by [`Tree::insert`](crate::Tree::insert).
///
/// Fields are public and default to a plain, zero-sized box at the parent's
/// content origin, so struct update syntax covers most construction:
///
/// ```
/// use tessera_scene::{BoxNode, Length, Style};
///
/// let node = BoxNode {
///     width: Length::Percent(50.0),
///     height: Length::Px(20.0),
///     style: Style { h_padding: 4.0, ..Style::default() },
///     ..BoxNode::default()
/// };
/// assert_eq!(node.x, Length::Px(0.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BoxNode {
    /// Diagnostic name; need not be unique.
    pub label: String,
    /// Horizontal position in the parent's content box.
    pub x: Length,
    /// Vertical position in the parent's content box.
    pub y: Length,
    /// Border-box width.
    pub width: Length,
    /// Border-box height.
    pub height: Length,
    /// Horizontal fraction of the node's own box that `x` refers to.
    /// Defaults to the anchor fraction when anchored, else `0`.
    pub origin_x: Option<f64>,
    /// Vertical counterpart of `origin_x`.
    pub origin_y: Option<f64>,
    /// Pins the origin to this fraction of the parent's content width,
    /// overriding `x`.
    pub anchor_x: Option<f64>,
    /// Vertical counterpart of `anchor_x`.
    pub anchor_y: Option<f64>,
    /// Visual style.
    pub style: Style,
    /// What the node draws.
    pub content: Content,
}

impl Default for BoxNode {
    fn default() -> Self {
        Self {
            label: String::new(),
            x: Length::Px(0.0),
            y: Length::Px(0.0),
            width: Length::Px(0.0),
            height: Length::Px(0.0),
            origin_x: None,
            origin_y: None,
            anchor_x: None,
            anchor_y: None,
            style: Style::default(),
            content: Content::Plain,
        }
    }
}

impl BoxNode {
    /// A plain box.
    pub fn new(
        label: impl Into<String>,
        x: impl Into<Length>,
        y: impl Into<Length>,
        width: impl Into<Length>,
        height: impl Into<Length>,
    ) -> Self {
        Self {
            label: label.into(),
            x: x.into(),
            y: y.into(),
            width: width.into(),
            height: height.into(),
            ..Self::default()
        }
    }

    /// A single-line text box sized to its text.
    pub fn text(label: impl Into<String>, text: impl Into<String>, font: Font) -> Self {
        Self {
            label: label.into(),
            width: Length::Auto,
            height: Length::Auto,
            content: Content::Label {
                text: text.into(),
                font,
            },
            ..Self::default()
        }
    }

    /// A wrapped text box of the given width whose height follows its lines.
    pub fn paragraph(
        label: impl Into<String>,
        text: impl Into<String>,
        font: Font,
        width: impl Into<Length>,
    ) -> Self {
        Self {
            label: label.into(),
            width: width.into(),
            height: Length::Auto,
            content: Content::Paragraph {
                text: text.into(),
                font,
            },
            ..Self::default()
        }
    }

    /// Replace the position.
    #[must_use]
    pub fn at(mut self, x: impl Into<Length>, y: impl Into<Length>) -> Self {
        self.x = x.into();
        self.y = y.into();
        self
    }

    /// Replace the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set both origin fractions.
    #[must_use]
    pub fn with_origin(mut self, ox: f64, oy: f64) -> Self {
        self.origin_x = Some(ox);
        self.origin_y = Some(oy);
        self
    }

    /// Set both anchor fractions.
    #[must_use]
    pub fn with_anchor(mut self, ax: f64, ay: f64) -> Self {
        self.anchor_x = Some(ax);
        self.anchor_y = Some(ay);
        self
    }

    /// Effective origin fractions.
    pub fn origin(&self) -> (f64, f64) {
        (
            self.origin_x.or(self.anchor_x).unwrap_or(0.0),
            self.origin_y.or(self.anchor_y).unwrap_or(0.0),
        )
    }

    /// Check values that make sense for any node.
    pub fn validate(&self) -> Result<()> {
        self.style.validate()?;
        if ![self.x, self.y, self.width, self.height]
            .iter()
            .all(|l| l.is_finite())
        {
            return Err(SceneError::InvalidNode("geometry must be finite"));
        }
        if [self.width, self.height]
            .iter()
            .any(|l| matches!(l, Length::Px(v) if *v < 0.0))
        {
            return Err(SceneError::InvalidNode("sizes must not be negative"));
        }
        let fractions = [self.origin_x, self.origin_y, self.anchor_x, self.anchor_y];
        if fractions
            .iter()
            .flatten()
            .any(|f| !(0.0..=1.0).contains(f))
        {
            return Err(SceneError::InvalidNode(
                "origin and anchor fractions must be within 0..=1",
            ));
        }
        if let Some((_, font)) = self.content.text()
            && !(font.size.is_finite() && font.size > 0.0)
        {
            return Err(SceneError::InvalidNode("font size must be positive"));
        }
        Ok(())
    }

    /// Additional checks for the parentless root.
    pub(crate) fn validate_root(&self) -> Result<()> {
        if [self.x, self.y, self.width, self.height]
            .iter()
            .any(|l| l.is_percent())
        {
            return Err(SceneError::PreconditionViolated(
                "the root has no parent to take percentages of",
            ));
        }
        if self.anchor_x.is_some() || self.anchor_y.is_some() {
            return Err(SceneError::PreconditionViolated(
                "the root has no parent to anchor to",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_defaults_to_anchor() {
        let node = BoxNode::default().with_anchor(1.0, 0.5);
        assert_eq!(node.origin(), (1.0, 0.5));

        let explicit = node.with_origin(0.0, 0.0);
        assert_eq!(explicit.origin(), (0.0, 0.0));

        assert_eq!(BoxNode::default().origin(), (0.0, 0.0));
    }

    #[test]
    fn validation() {
        assert!(BoxNode::default().validate().is_ok());
        assert!(
            BoxNode::new("n", 0.0, 0.0, -1.0, 5.0)
                .validate()
                .is_err()
        );
        assert!(
            BoxNode::new("n", f64::NAN, 0.0, 1.0, 5.0)
                .validate()
                .is_err()
        );
        assert!(BoxNode::default().with_anchor(1.5, 0.0).validate().is_err());
        assert!(
            BoxNode::text("t", "hi", Font::new(0.0, "sans-serif"))
                .validate()
                .is_err()
        );
        // Percent sizes may go negative after margins; only literals are checked.
        let pct = BoxNode {
            width: Length::Percent(-10.0),
            ..BoxNode::default()
        };
        assert!(pct.validate().is_ok());
    }

    #[test]
    fn root_rejects_parent_relative_geometry() {
        let pct = BoxNode {
            width: Length::Percent(50.0),
            ..BoxNode::default()
        };
        assert!(matches!(
            pct.validate_root(),
            Err(SceneError::PreconditionViolated(_))
        ));
        assert!(
            BoxNode::default()
                .with_anchor(0.0, 0.0)
                .validate_root()
                .is_err()
        );
        assert!(BoxNode::new("root", 0.0, 0.0, 10.0, 10.0).validate_root().is_ok());
    }

    #[test]
    fn corner_fractions() {
        assert_eq!(Corner::Center.fractions(), (0.5, 0.5));
        assert_eq!(Corner::BottomLeft.fractions(), (0.0, 1.0));
        assert_eq!(Corner::RightCenter.fractions(), (1.0, 0.5));
    }
}
