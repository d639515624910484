// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fonts and text measurement.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;
use unicode_segmentation::UnicodeSegmentation;

/// Font weight/slant variant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Upright, regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
    /// Italic slant.
    Italic,
}

/// A font request: size in pixels, family name and style.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Size in pixels. Also the height of every measured run.
    pub size: f64,
    /// Family name as understood by the renderer, e.g. `sans-serif`.
    pub family: String,
    /// Weight/slant variant.
    pub style: FontStyle,
}

impl Font {
    /// A normal-style font of the given size and family.
    pub fn new(size: f64, family: impl Into<String>) -> Self {
        Self {
            size,
            family: family.into(),
            style: FontStyle::Normal,
        }
    }

    /// The same font in another style.
    #[must_use]
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(12.0, "sans-serif")
    }
}

/// CSS-like shorthand, e.g. `bold 14px monospace`.
impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            FontStyle::Normal => {}
            FontStyle::Bold => f.write_str("bold ")?,
            FontStyle::Italic => f.write_str("italic ")?,
        }
        write!(f, "{}px {}", self.size, self.family)
    }
}

/// Measured extent of a run of text.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TextSize {
    /// Advance width.
    pub width: f64,
    /// Line height.
    pub height: f64,
}

/// Something that can measure text, typically the drawing backend.
pub trait TextMeasure {
    /// Measure `text` as a single line set in `font`.
    fn measure(&self, text: &str, font: &Font) -> TextSize;
}

impl<M: TextMeasure + ?Sized> TextMeasure for &M {
    fn measure(&self, text: &str, font: &Font) -> TextSize {
        (**self).measure(text, font)
    }
}

impl<M: TextMeasure + ?Sized> TextMeasure for Box<M> {
    fn measure(&self, text: &str, font: &Font) -> TextSize {
        (**self).measure(text, font)
    }
}

/// Monospace measurer: every grapheme cluster advances by the same amount.
///
/// Runs are `font.size` tall. Deterministic, so it is what headless hosts and
/// tests measure with.
///
/// ```
/// use tessera_text::{FixedAdvance, Font, TextMeasure};
///
/// let m = FixedAdvance::new(7.0);
/// let size = m.measure("héllo", &Font::new(14.0, "monospace"));
/// assert_eq!(size.width, 35.0);
/// assert_eq!(size.height, 14.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedAdvance {
    /// Advance of one grapheme cluster.
    pub advance: f64,
}

impl FixedAdvance {
    /// A measurer with the given per-grapheme advance.
    pub const fn new(advance: f64) -> Self {
        Self { advance }
    }
}

impl TextMeasure for FixedAdvance {
    #[allow(
        clippy::cast_precision_loss,
        reason = "Grapheme counts of a single run are far below 2^52."
    )]
    fn measure(&self, text: &str, font: &Font) -> TextSize {
        TextSize {
            width: text.graphemes(true).count() as f64 * self.advance,
            height: font.size,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: String,
    size_bits: u64,
    family: String,
    style: FontStyle,
}

/// Memoizes another measurer.
///
/// Layout measures every word and every character, and paragraphs are laid
/// out again whenever their box moves or resizes, so repeated runs are common.
pub struct CachedMeasure<M> {
    inner: M,
    cache: RefCell<HashMap<MeasureKey, TextSize>>,
}

impl<M> CachedMeasure<M> {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// The wrapped measurer.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Number of cached runs.
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// Drop every cached measurement, e.g. after fonts finished loading.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<M> fmt::Debug for CachedMeasure<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedMeasure")
            .field("cached", &self.len())
            .finish_non_exhaustive()
    }
}

impl<M: TextMeasure> TextMeasure for CachedMeasure<M> {
    fn measure(&self, text: &str, font: &Font) -> TextSize {
        let key = MeasureKey {
            text: text.to_string(),
            size_bits: font.size.to_bits(),
            family: font.family.clone(),
            style: font.style,
        };
        if let Some(size) = self.cache.borrow().get(&key) {
            return *size;
        }
        let size = self.inner.measure(text, font);
        self.cache.borrow_mut().insert(key, size);
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use core::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
    }

    impl TextMeasure for Counting {
        fn measure(&self, text: &str, font: &Font) -> TextSize {
            self.calls.set(self.calls.get() + 1);
            FixedAdvance::new(5.0).measure(text, font)
        }
    }

    #[test]
    fn cache_hits_skip_the_inner_measurer() {
        let cached = CachedMeasure::new(Counting {
            calls: Cell::new(0),
        });
        let font = Font::default();
        let a = cached.measure("hello", &font);
        let b = cached.measure("hello", &font);
        assert_eq!(a, b);
        assert_eq!(cached.inner().calls.get(), 1);

        // A different size is a different key.
        cached.measure("hello", &Font::new(20.0, "sans-serif"));
        assert_eq!(cached.inner().calls.get(), 2);
        assert_eq!(cached.len(), 2);

        cached.clear();
        assert!(cached.is_empty());
        cached.measure("hello", &font);
        assert_eq!(cached.inner().calls.get(), 3);
    }

    #[test]
    fn combining_marks_are_one_grapheme() {
        let m = FixedAdvance::new(10.0);
        let size = m.measure("e\u{301}", &Font::default());
        assert_eq!(size.width, 10.0);
    }

    #[test]
    fn font_shorthand() {
        let font = Font::new(14.0, "monospace").with_style(FontStyle::Bold);
        assert_eq!(format!("{font}"), "bold 14px monospace");
        assert_eq!(format!("{}", Font::default()), "12px sans-serif");
    }
}
