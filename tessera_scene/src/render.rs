// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing through an abstract 2D context.
//!
//! Each node paints in isolation: the context is saved, clipped to the node's
//! border box, drawn into and restored, so no state leaks between nodes.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};
use tessera_index::Backend;
use tessera_text::{Font, TextAlign};

use crate::error::Result;
use crate::style::Color;
use crate::tree::Tree;
use crate::types::{Content, NodeId};

/// Which part of the text `draw_text` positions at `y`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// The top of the line box.
    #[default]
    Top,
    /// The middle of the line box.
    Middle,
    /// The alphabetic baseline.
    Alphabetic,
    /// The bottom of the line box.
    Bottom,
}

/// A stateful 2D drawing context.
///
/// State set through the setters and `translate`/`clip` is pushed by `save`
/// and popped by `restore`. Text is measured by the tree's
/// [`TextMeasure`](tessera_text::TextMeasure), not by the renderer; hosts
/// drawing with real fonts give the tree a measurer backed by those fonts.
pub trait Renderer {
    /// Push the current state.
    fn save(&mut self);
    /// Pop the last pushed state.
    fn restore(&mut self);
    /// Shift subsequent drawing by `offset`.
    fn translate(&mut self, offset: Vec2);
    /// Intersect the clip with `rect`.
    fn clip(&mut self, rect: Rect);
    /// Fill the whole surface, ignoring clip and transform.
    fn clear(&mut self, color: Color);
    /// Fill `rect` with the fill color.
    fn fill_rect(&mut self, rect: Rect);
    /// Stroke `rect` with the stroke color and line width.
    fn stroke_rect(&mut self, rect: Rect);
    /// Stroke a straight line.
    fn line(&mut self, from: Point, to: Point);
    /// Set the fill color.
    fn set_fill_color(&mut self, color: Color);
    /// Set the stroke color.
    fn set_stroke_color(&mut self, color: Color);
    /// Set the stroke width.
    fn set_line_width(&mut self, width: f64);
    /// Set the global opacity.
    fn set_alpha(&mut self, alpha: f64);
    /// Set the font for `draw_text`.
    fn set_font(&mut self, font: &Font);
    /// Set the text fill color.
    fn set_text_color(&mut self, color: Color);
    /// Set which part of the text sits at the `x` passed to `draw_text`.
    fn set_text_align(&mut self, align: TextAlign);
    /// Set which part of the text sits at the `y` passed to `draw_text`.
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    /// Draw one run of text.
    fn draw_text(&mut self, text: &str, at: Point);
}

/// One call made on a [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs, reason = "Variants mirror the Renderer methods one to one.")]
pub enum DrawCommand {
    Save,
    Restore,
    Translate(Vec2),
    Clip(Rect),
    Clear(Color),
    FillRect(Rect),
    StrokeRect(Rect),
    Line(Point, Point),
    FillColor(Color),
    StrokeColor(Color),
    LineWidth(f64),
    Alpha(f64),
    Font(Font),
    TextColor(Color),
    TextAlign(TextAlign),
    TextBaseline(TextBaseline),
    Text(String, Point),
}

/// A renderer that records every call, for tests and headless hosts.
///
/// ```
/// use tessera_scene::{DrawCommand, RecordingRenderer, Renderer};
/// use tessera_scene::kurbo::Rect;
///
/// let mut r = RecordingRenderer::default();
/// r.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
/// assert_eq!(r.commands(), &[DrawCommand::FillRect(Rect::new(0.0, 0.0, 1.0, 1.0))]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        core::mem::take(&mut self.commands)
    }
}

impl Renderer for RecordingRenderer {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }
    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }
    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate(offset));
    }
    fn clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clip(rect));
    }
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }
    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::FillRect(rect));
    }
    fn stroke_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::StrokeRect(rect));
    }
    fn line(&mut self, from: Point, to: Point) {
        self.commands.push(DrawCommand::Line(from, to));
    }
    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::FillColor(color));
    }
    fn set_stroke_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::StrokeColor(color));
    }
    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::LineWidth(width));
    }
    fn set_alpha(&mut self, alpha: f64) {
        self.commands.push(DrawCommand::Alpha(alpha));
    }
    fn set_font(&mut self, font: &Font) {
        self.commands.push(DrawCommand::Font(font.clone()));
    }
    fn set_text_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::TextColor(color));
    }
    fn set_text_align(&mut self, align: TextAlign) {
        self.commands.push(DrawCommand::TextAlign(align));
    }
    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.commands.push(DrawCommand::TextBaseline(baseline));
    }
    fn draw_text(&mut self, text: &str, at: Point) {
        self.commands.push(DrawCommand::Text(text.to_string(), at));
    }
}

impl<B: Backend<f64>> Tree<B> {
    /// Paint one node, without its children, in scene coordinates.
    ///
    /// `fallback` shows through when neither the node nor any ancestor has a
    /// background.
    pub fn paint<R: Renderer + ?Sized>(
        &self,
        id: NodeId,
        renderer: &mut R,
        fallback: Color,
    ) -> Result<()> {
        let (config, resolved) = self.resolved_node(id)?;
        let style = &config.style;
        let bounds = resolved.bounds;
        let content = resolved.content;
        let half_border = style.border_width / 2.0;

        renderer.save();
        renderer.clip(bounds.inflate(half_border, half_border));
        renderer.set_alpha(style.alpha);
        renderer.set_fill_color(self.effective_background(id, fallback));
        renderer.fill_rect(bounds);
        if style.border_width > 0.0 {
            renderer.set_stroke_color(style.border_color);
            renderer.set_line_width(style.border_width);
            renderer.stroke_rect(bounds);
        }

        if let Some((text, font)) = config.content.text() {
            renderer.set_font(font);
            renderer.set_text_color(style.text_color);
            renderer.set_text_baseline(TextBaseline::Top);
            renderer.set_text_align(TextAlign::Left);
            match (&config.content, self.text_layout(id)?) {
                (Content::Paragraph { .. }, Some(layout)) => {
                    let mut y = content.y0
                        + style
                            .vertical_align
                            .offset(content.height(), layout.height());
                    for line in layout.lines() {
                        let mut x = content.x0
                            + style
                                .text_align
                                .offset(content.width(), line.content_width());
                        for word in &line.words {
                            if !word.is_whitespace() {
                                renderer.draw_text(&word.text, Point::new(x, y));
                            }
                            x += word.width;
                        }
                        y += line.height;
                    }
                }
                _ => {
                    let size = self.measure().measure(text, font);
                    let at = Point::new(
                        content.x0 + style.text_align.offset(content.width(), size.width),
                        content.y0
                            + style
                                .vertical_align
                                .offset(content.height(), size.height),
                    );
                    renderer.draw_text(text, at);
                }
            }
        }
        renderer.restore();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use tessera_text::{FixedAdvance, VerticalAlign};

    use crate::style::Style;
    use crate::types::BoxNode;

    fn tree() -> Tree {
        Tree::new(
            BoxNode::new("root", 0.0, 0.0, 200.0, 200.0),
            FixedAdvance::new(10.0),
        )
        .unwrap()
    }

    fn texts(commands: &[DrawCommand]) -> Vec<(&str, Point)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text(t, at) => Some((t.as_str(), *at)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plain_box_with_border() {
        let mut t = tree();
        let style = Style {
            border_width: 2.0,
            border_color: Color::RED,
            alpha: 0.5,
            ..Style::default()
        };
        let id = t
            .insert(
                t.root(),
                BoxNode::new("a", 10.0, 10.0, 20.0, 20.0).with_style(style),
            )
            .unwrap();
        let mut r = RecordingRenderer::default();
        t.paint(id, &mut r, Color::WHITE).unwrap();
        let bounds = Rect::new(10.0, 10.0, 30.0, 30.0);
        assert_eq!(
            r.commands(),
            &[
                DrawCommand::Save,
                DrawCommand::Clip(Rect::new(9.0, 9.0, 31.0, 31.0)),
                DrawCommand::Alpha(0.5),
                DrawCommand::FillColor(Color::BLACK),
                DrawCommand::FillRect(bounds),
                DrawCommand::StrokeColor(Color::RED),
                DrawCommand::LineWidth(2.0),
                DrawCommand::StrokeRect(bounds),
                DrawCommand::Restore,
            ]
        );
    }

    #[test]
    fn transparent_box_uses_ancestor_background() {
        let mut t = tree();
        let id = t
            .insert(
                t.root(),
                BoxNode::new("a", 0.0, 0.0, 5.0, 5.0).with_style(Style {
                    background_color: None,
                    ..Style::default()
                }),
            )
            .unwrap();
        t.set_style(
            t.root(),
            Style {
                background_color: Some(Color::BLUE),
                ..Style::default()
            },
        )
        .unwrap();
        let mut r = RecordingRenderer::default();
        t.paint(id, &mut r, Color::WHITE).unwrap();
        assert!(r.commands().contains(&DrawCommand::FillColor(Color::BLUE)));
    }

    #[test]
    fn centered_label() {
        let mut t = tree();
        let id = t
            .insert(
                t.root(),
                BoxNode {
                    width: 100.0.into(),
                    height: 40.0.into(),
                    style: Style {
                        text_align: TextAlign::Center,
                        vertical_align: VerticalAlign::Middle,
                        ..Style::default()
                    },
                    ..BoxNode::text("l", "hey", Font::new(10.0, "mono"))
                },
            )
            .unwrap();
        let mut r = RecordingRenderer::default();
        t.paint(id, &mut r, Color::WHITE).unwrap();
        // 30 wide, 10 tall in a 100 x 40 box.
        assert_eq!(texts(r.commands()), vec![("hey", Point::new(35.0, 15.0))]);
    }

    #[test]
    fn paragraph_draws_words_per_line() {
        let mut t = tree();
        let id = t
            .insert(
                t.root(),
                BoxNode {
                    style: Style {
                        h_padding: 5.0,
                        text_align: TextAlign::Right,
                        ..Style::default()
                    },
                    ..BoxNode::paragraph("p", "ab cd", Font::new(10.0, "mono"), 50.0)
                },
            )
            .unwrap();
        let mut r = RecordingRenderer::default();
        t.paint(id, &mut r, Color::WHITE).unwrap();
        // Content is 40 wide: "ab " fits and "cd" wraps. Both lines are
        // right-aligned on their visible width.
        assert_eq!(
            texts(r.commands()),
            vec![("ab", Point::new(25.0, 0.0)), ("cd", Point::new(25.0, 10.0))]
        );
        assert!(
            r.commands()
                .contains(&DrawCommand::TextAlign(TextAlign::Left))
        );
    }

    #[test]
    fn stale_node_is_an_error() {
        let mut t = tree();
        let id = t.insert(t.root(), BoxNode::default()).unwrap();
        t.remove(id).unwrap();
        let mut r = RecordingRenderer::default();
        assert!(t.paint(id, &mut r, Color::WHITE).is_err());
        assert!(r.commands().is_empty());
    }
}
