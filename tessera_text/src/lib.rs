// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessera Text: word-wrapping text layout with hit-testing.
//!
//! Text is split into hard lines at `'\n'`, each line into word-boundary
//! segments (Unicode word segmentation), and each segment into grapheme
//! clusters. Every segment and cluster is measured through [`TextMeasure`],
//! which the drawing backend implements; [`FixedAdvance`] is a deterministic
//! monospace stand-in and [`CachedMeasure`] memoizes a slower measurer.
//!
//! The resulting [`TextLayout`] answers "which line, word and character is
//! under this point" through [`TextLayout::hit_test`].
//!
//! ```rust
//! use tessera_text::{CachedMeasure, FixedAdvance, Font, TextLayout};
//!
//! let measure = CachedMeasure::new(FixedAdvance::new(8.0));
//! let font = Font::new(16.0, "monospace");
//! let layout = TextLayout::new("hello brave new world", &font, Some(100.0), &measure);
//!
//! // "hello brave " is 96 wide, so "new" starts the second line.
//! assert_eq!(layout.lines().len(), 2);
//! assert_eq!(layout.height(), 32.0);
//!
//! let hit = layout.hit_test(20.0, 20.0);
//! assert_eq!(hit.line, Some(1));
//! assert_eq!(hit.word, Some(0));
//! assert_eq!(hit.character, Some(2));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod layout;
mod measure;

pub use layout::{Character, Line, TextAlign, TextHit, TextLayout, VerticalAlign, Word};
pub use measure::{CachedMeasure, FixedAdvance, Font, FontStyle, TextMeasure, TextSize};
