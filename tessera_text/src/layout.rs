// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy word wrapping and hit-testing.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use unicode_segmentation::UnicodeSegmentation;

use crate::measure::{Font, TextMeasure};

/// Horizontal placement of each line inside its box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Flush with the left edge.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush with the right edge.
    Right,
}

impl TextAlign {
    /// Offset from the left edge for content `used` wide in `available` space.
    pub fn offset(self, available: f64, used: f64) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => (available - used) * 0.5,
            Self::Right => available - used,
        }
    }
}

/// Vertical placement of a text block inside its box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlign {
    /// Flush with the top edge.
    #[default]
    Top,
    /// Centered.
    Middle,
    /// Flush with the bottom edge.
    Bottom,
}

impl VerticalAlign {
    /// Offset from the top edge for content `used` tall in `available` space.
    pub fn offset(self, available: f64, used: f64) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Middle => (available - used) * 0.5,
            Self::Bottom => available - used,
        }
    }
}

/// One grapheme cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    /// The cluster's text.
    pub text: String,
    /// Measured advance.
    pub width: f64,
    /// Measured height.
    pub height: f64,
}

/// A word-boundary segment: a word, a run of whitespace, or punctuation.
#[derive(Clone, Debug, PartialEq)]
pub struct Word {
    /// The segment's text.
    pub text: String,
    /// Measured advance of the whole segment.
    pub width: f64,
    /// Measured height.
    pub height: f64,
    /// The segment's grapheme clusters in order.
    pub characters: Vec<Character>,
}

impl Word {
    fn measure<M: TextMeasure + ?Sized>(text: &str, font: &Font, measure: &M) -> Self {
        let size = measure.measure(text, font);
        let characters = text
            .graphemes(true)
            .map(|g| {
                let size = measure.measure(g, font);
                Character {
                    text: g.to_string(),
                    width: size.width,
                    height: size.height,
                }
            })
            .collect();
        Self {
            text: text.to_string(),
            width: size.width,
            height: size.height,
            characters,
        }
    }

    /// Whether the segment is only whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// One visual line.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// Segments on this line, left to right.
    pub words: Vec<Word>,
    /// Sum of the segment widths, trailing whitespace included.
    pub width: f64,
    /// Tallest segment, or the font size for an empty line.
    pub height: f64,
}

impl Line {
    fn from_words(words: Vec<Word>, font_size: f64) -> Self {
        let width = words.iter().map(|w| w.width).sum();
        let height = words
            .iter()
            .map(|w| w.height)
            .reduce(f64::max)
            .unwrap_or(font_size);
        Self {
            words,
            width,
            height,
        }
    }

    /// Width without trailing whitespace, used for alignment.
    pub fn content_width(&self) -> f64 {
        let trailing: f64 = self
            .words
            .iter()
            .rev()
            .take_while(|w| w.is_whitespace())
            .map(|w| w.width)
            .sum();
        self.width - trailing
    }
}

/// Result of [`TextLayout::hit_test`]; each level is set only when the point
/// falls inside it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TextHit {
    /// Index into [`TextLayout::lines`].
    pub line: Option<usize>,
    /// Index into that line's words.
    pub word: Option<usize>,
    /// Index into that word's characters.
    pub character: Option<usize>,
}

/// Text broken into lines, words and characters.
///
/// Hard breaks come from `'\n'`. Each line is segmented at Unicode word
/// boundaries, keeping whitespace and punctuation runs as segments of their
/// own, and then wrapped greedily: a segment that would cross the wrap width
/// moves to a new line unless it is the first on its line. Whitespace runs
/// take part like any other segment, so a line's [`Line::width`] stays within
/// the wrap width unless the line holds a single segment that is wider on its
/// own. Such a segment is never split.
///
/// ```
/// use tessera_text::{FixedAdvance, Font, TextLayout};
///
/// let measure = FixedAdvance::new(10.0);
/// let layout = TextLayout::new("a b", &Font::default(), Some(25.0), &measure);
/// assert_eq!(layout.lines().len(), 2);
/// assert_eq!(layout.lines()[1].words[0].text, "b");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayout {
    lines: Vec<Line>,
    font: Font,
    wrap_width: Option<f64>,
}

impl TextLayout {
    /// Lay out `text` in `font`, wrapping at `wrap_width`.
    ///
    /// `None`, a non-positive or a non-finite width disables wrapping.
    pub fn new<M: TextMeasure + ?Sized>(
        text: &str,
        font: &Font,
        wrap_width: Option<f64>,
        measure: &M,
    ) -> Self {
        let wrap_width = wrap_width.filter(|w| w.is_finite() && *w > 0.0);
        let mut lines = Vec::new();
        for raw in text.split('\n') {
            let words = raw
                .split_word_bounds()
                .map(|segment| Word::measure(segment, font, measure));
            wrap_into(&mut lines, words, wrap_width, font.size);
        }
        log::trace!(
            "laid out {} bytes into {} lines (wrap {:?})",
            text.len(),
            lines.len(),
            wrap_width
        );
        Self {
            lines,
            font: font.clone(),
            wrap_width,
        }
    }

    /// The laid out lines, top to bottom.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The font the layout was measured with.
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// The effective wrap width, `None` when unbounded.
    pub fn wrap_width(&self) -> Option<f64> {
        self.wrap_width
    }

    /// Widest line content.
    pub fn width(&self) -> f64 {
        self.lines
            .iter()
            .map(Line::content_width)
            .fold(0.0, f64::max)
    }

    /// Sum of the line heights.
    pub fn height(&self) -> f64 {
        self.lines.iter().map(|l| l.height).sum()
    }

    /// Find the line, word and character under a layout-local point.
    ///
    /// Lines are stacked from `y = 0` and words start at `x = 0`. Edges are
    /// inclusive and the first match wins.
    pub fn hit_test(&self, x: f64, y: f64) -> TextHit {
        self.hit_test_with(x, y, |_| 0.0)
    }

    /// Like [`hit_test`](Self::hit_test), with each line shifted by `align`
    /// inside a box `box_width` wide.
    pub fn hit_test_aligned(&self, x: f64, y: f64, align: TextAlign, box_width: f64) -> TextHit {
        self.hit_test_with(x, y, |line| align.offset(box_width, line.content_width()))
    }

    fn hit_test_with(&self, x: f64, y: f64, line_offset: impl Fn(&Line) -> f64) -> TextHit {
        let mut hit = TextHit::default();

        let mut line_y = 0.0;
        let Some((line_idx, line)) = self.lines.iter().enumerate().find(|(_, line)| {
            let inside = y >= line_y && y <= line_y + line.height;
            if !inside {
                line_y += line.height;
            }
            inside
        }) else {
            return hit;
        };
        hit.line = Some(line_idx);

        let within = |left: f64, width: f64, height: f64| {
            x >= left && x <= left + width && y >= line_y && y <= line_y + height
        };

        let mut word_x = line_offset(line);
        let Some((word_idx, word)) = line.words.iter().enumerate().find(|(_, word)| {
            let inside = within(word_x, word.width, word.height);
            if !inside {
                word_x += word.width;
            }
            inside
        }) else {
            return hit;
        };
        hit.word = Some(word_idx);

        let mut char_x = word_x;
        hit.character = word.characters.iter().position(|c| {
            let inside = within(char_x, c.width, c.height);
            if !inside {
                char_x += c.width;
            }
            inside
        });
        hit
    }
}

fn wrap_into(
    lines: &mut Vec<Line>,
    words: impl Iterator<Item = Word>,
    wrap_width: Option<f64>,
    font_size: f64,
) {
    let mut current: Vec<Word> = Vec::new();
    let mut x = 0.0;
    for word in words {
        if let Some(limit) = wrap_width
            && !current.is_empty()
            && x + word.width > limit
        {
            lines.push(Line::from_words(core::mem::take(&mut current), font_size));
            x = 0.0;
        }
        x += word.width;
        current.push(word);
    }
    lines.push(Line::from_words(current, font_size));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::FixedAdvance;
    use alloc::vec;

    const MONO: FixedAdvance = FixedAdvance::new(10.0);

    fn layout(text: &str, wrap: Option<f64>) -> TextLayout {
        TextLayout::new(text, &Font::default(), wrap, &MONO)
    }

    fn words_per_line(layout: &TextLayout) -> Vec<Vec<&str>> {
        layout
            .lines()
            .iter()
            .map(|l| l.words.iter().map(|w| w.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn two_words_wrap_onto_two_lines() {
        let l = layout("a b", Some(25.0));
        assert_eq!(words_per_line(&l), vec![vec!["a", " "], vec!["b"]]);
        assert_eq!(l.lines()[0].width, 20.0);
        assert_eq!(l.lines()[0].content_width(), 10.0);
        assert_eq!(l.height(), 24.0);
    }

    #[test]
    fn degenerate_wrap_widths_do_not_wrap() {
        for wrap in [None, Some(0.0), Some(-5.0), Some(f64::NAN), Some(f64::INFINITY)] {
            let l = layout("the quick brown fox", wrap);
            assert_eq!(l.lines().len(), 1, "wrap {wrap:?}");
            assert_eq!(l.wrap_width(), None);
        }
    }

    #[test]
    fn overlong_word_keeps_its_own_line() {
        let l = layout("hello world", Some(30.0));
        assert_eq!(
            words_per_line(&l),
            vec![vec!["hello"], vec![" "], vec!["world"]]
        );
        assert_eq!(l.width(), 50.0);
    }

    #[test]
    fn whitespace_that_crosses_the_wrap_width_starts_a_line() {
        let l = layout("ab cd", Some(25.0));
        assert_eq!(words_per_line(&l), vec![vec!["ab"], vec![" "], vec!["cd"]]);
        assert!(l.lines().iter().all(|line| line.width <= 25.0));
    }

    #[test]
    fn hard_breaks_and_empty_lines() {
        let l = layout("ab\n\ncd", None);
        assert_eq!(l.lines().len(), 3);
        assert!(l.lines()[1].words.is_empty());
        assert_eq!(l.lines()[1].height, 12.0);
        assert_eq!(l.height(), 36.0);
    }

    #[test]
    fn lines_never_exceed_wrap_unless_single_word() {
        let text = "Sphinx of black quartz, judge my vow. Pack my box with five dozen jugs!";
        for wrap in 1..=40 {
            let wrap = f64::from(wrap) * 5.0;
            let l = layout(text, Some(wrap));
            for line in l.lines() {
                assert!(
                    line.width <= wrap || line.words.len() == 1,
                    "line {:?} overflows {wrap}",
                    line.words.iter().map(|w| &w.text).collect::<Vec<_>>()
                );
            }
            // Nothing is lost or reordered.
            let joined: String = l
                .lines()
                .iter()
                .flat_map(|line| line.words.iter().map(|w| w.text.as_str()))
                .collect();
            assert_eq!(joined, text);
        }
    }

    #[test]
    fn hit_test_finds_line_word_and_character() {
        let l = layout("ab cd\nef", None);
        // Second character of "cd".
        let hit = l.hit_test(45.0, 5.0);
        assert_eq!(
            hit,
            TextHit {
                line: Some(0),
                word: Some(2),
                character: Some(1),
            }
        );
        // Shared edges go to the earlier match.
        let hit = l.hit_test(20.0, 12.0);
        assert_eq!(hit.line, Some(0));
        assert_eq!(hit.word, Some(0));
        assert_eq!(hit.character, Some(1));
        // Second line, past its last word.
        let hit = l.hit_test(35.0, 18.0);
        assert_eq!(hit.line, Some(1));
        assert_eq!(hit.word, None);
        assert_eq!(hit.character, None);
        // Below everything.
        assert_eq!(l.hit_test(5.0, 100.0), TextHit::default());
    }

    #[test]
    fn aligned_hit_test_shifts_lines() {
        let l = layout("ab cd", None);
        // Right aligned in 100: the 50 wide line spans 50..100.
        let hit = l.hit_test_aligned(95.0, 5.0, TextAlign::Right, 100.0);
        assert_eq!(hit.word, Some(2));
        assert_eq!(hit.character, Some(1));
        assert_eq!(l.hit_test_aligned(10.0, 5.0, TextAlign::Right, 100.0).word, None);
        // Centered: 25..75.
        let hit = l.hit_test_aligned(30.0, 5.0, TextAlign::Center, 100.0);
        assert_eq!(hit.word, Some(0));
        assert_eq!(hit.character, Some(0));
    }

    #[test]
    fn alignment_offsets() {
        assert_eq!(TextAlign::Left.offset(100.0, 40.0), 0.0);
        assert_eq!(TextAlign::Center.offset(100.0, 40.0), 30.0);
        assert_eq!(TextAlign::Right.offset(100.0, 40.0), 60.0);
        assert_eq!(VerticalAlign::Middle.offset(50.0, 20.0), 15.0);
        assert_eq!(VerticalAlign::Bottom.offset(50.0, 20.0), 30.0);
    }
}
