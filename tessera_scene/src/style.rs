// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors and per-node visual style.

use tessera_text::{TextAlign, VerticalAlign};

use crate::error::{Result, SceneError};

/// 8-bit RGBA color, handed to the renderer unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque mid gray.
    pub const GRAY: Self = Self::rgb(128, 128, 128);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 128, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// A color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with another alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Visual and spacing attributes of one node.
///
/// Padding shrinks the node's content box, which is what children and text
/// lay out in. Margin is applied to the node itself: it offsets its position
/// and, for percentage sizes, is taken off both sides.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    /// Stroke width of the border. Zero draws no border.
    pub border_width: f64,
    /// Border stroke color.
    pub border_color: Color,
    /// Background fill; `None` shows the nearest ancestor's background.
    pub background_color: Option<Color>,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f64,
    /// Horizontal padding on each side.
    pub h_padding: f64,
    /// Vertical padding on each side.
    pub v_padding: f64,
    /// Horizontal margin.
    pub h_margin: f64,
    /// Vertical margin.
    pub v_margin: f64,
    /// Horizontal text placement in the content box.
    pub text_align: TextAlign,
    /// Vertical text placement in the content box.
    pub vertical_align: VerticalAlign,
    /// Text fill color.
    pub text_color: Color,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            border_width: 0.0,
            border_color: Color::WHITE,
            background_color: Some(Color::BLACK),
            alpha: 1.0,
            h_padding: 0.0,
            v_padding: 0.0,
            h_margin: 0.0,
            v_margin: 0.0,
            text_align: TextAlign::Left,
            vertical_align: VerticalAlign::Top,
            text_color: Color::WHITE,
        }
    }
}

impl Style {
    /// Check that every width is finite and non-negative and alpha is in range.
    pub fn validate(&self) -> Result<()> {
        let spacing = [
            (self.border_width, "border width must be finite and non-negative"),
            (self.h_padding, "horizontal padding must be finite and non-negative"),
            (self.v_padding, "vertical padding must be finite and non-negative"),
            (self.h_margin, "horizontal margin must be finite and non-negative"),
            (self.v_margin, "vertical margin must be finite and non-negative"),
        ];
        for (value, reason) in spacing {
            if !value.is_finite() || value < 0.0 {
                return Err(SceneError::InvalidNode(reason));
            }
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(SceneError::InvalidNode("alpha must be within 0..=1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let style = Style::default();
        assert_eq!(style.validate(), Ok(()));
        assert_eq!(style.background_color, Some(Color::BLACK));
        assert_eq!(style.border_color, Color::WHITE);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad_alpha = Style {
            alpha: 1.5,
            ..Style::default()
        };
        assert!(matches!(
            bad_alpha.validate(),
            Err(SceneError::InvalidNode(_))
        ));

        let nan_alpha = Style {
            alpha: f64::NAN,
            ..Style::default()
        };
        assert!(nan_alpha.validate().is_err());

        let negative_padding = Style {
            h_padding: -1.0,
            ..Style::default()
        };
        assert!(negative_padding.validate().is_err());

        let infinite_border = Style {
            border_width: f64::INFINITY,
            ..Style::default()
        };
        assert!(infinite_border.validate().is_err());
    }
}
