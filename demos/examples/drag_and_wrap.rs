// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless session: build a scene, drag a card with a scripted pointer,
//! hit test wrapped text and render to a logging backend.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p tessera_demos --example drag_and_wrap`

use tessera_index::backends::RTree;
use tessera_scene::kurbo::{Point, Rect, Vec2};
use tessera_scene::{
    BoxNode, Color, Corner, Length, PointerEvent, Renderer, Scene, SceneConfig, Style,
    TextAlign, TextBaseline,
};
use tessera_text::{CachedMeasure, FixedAdvance, Font};

/// Logs every draw call instead of rasterizing.
struct LogRenderer {
    depth: usize,
    calls: usize,
}

impl LogRenderer {
    fn new() -> Self {
        Self {
            depth: 0,
            calls: 0,
        }
    }

    fn log(&mut self, what: std::fmt::Arguments<'_>) {
        self.calls += 1;
        log::info!("{:indent$}{what}", "", indent = self.depth * 2);
    }
}

impl Renderer for LogRenderer {
    fn save(&mut self) {
        self.log(format_args!("save"));
        self.depth += 1;
    }
    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.log(format_args!("restore"));
    }
    fn translate(&mut self, offset: Vec2) {
        self.log(format_args!("translate {offset:?}"));
    }
    fn clip(&mut self, rect: Rect) {
        self.log(format_args!("clip {rect:?}"));
    }
    fn clear(&mut self, color: Color) {
        self.log(format_args!("clear {color:?}"));
    }
    fn fill_rect(&mut self, rect: Rect) {
        self.log(format_args!("fill {rect:?}"));
    }
    fn stroke_rect(&mut self, rect: Rect) {
        self.log(format_args!("stroke {rect:?}"));
    }
    fn line(&mut self, from: Point, to: Point) {
        self.log(format_args!("line {from:?} -> {to:?}"));
    }
    fn set_fill_color(&mut self, color: Color) {
        self.log(format_args!("fill color {color:?}"));
    }
    fn set_stroke_color(&mut self, color: Color) {
        self.log(format_args!("stroke color {color:?}"));
    }
    fn set_line_width(&mut self, width: f64) {
        self.log(format_args!("line width {width}"));
    }
    fn set_alpha(&mut self, alpha: f64) {
        self.log(format_args!("alpha {alpha}"));
    }
    fn set_font(&mut self, font: &Font) {
        self.log(format_args!("font {font}"));
    }
    fn set_text_color(&mut self, color: Color) {
        self.log(format_args!("text color {color:?}"));
    }
    fn set_text_align(&mut self, align: TextAlign) {
        self.log(format_args!("text align {align:?}"));
    }
    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.log(format_args!("text baseline {baseline:?}"));
    }
    fn draw_text(&mut self, text: &str, at: Point) {
        self.log(format_args!("text {text:?} at {at:?}"));
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SceneConfig {
        width: 320.0,
        height: 240.0,
        clear_color: Color::rgb(24, 24, 32),
        ..SceneConfig::default()
    };
    let mut scene = Scene::with_backend(
        RTree::default(),
        config,
        CachedMeasure::new(FixedAdvance::new(7.0)),
    )
    .expect("valid scene config");

    let card_style = Style {
        border_width: 2.0,
        background_color: Some(Color::rgb(40, 60, 90)),
        h_padding: 8.0,
        v_padding: 6.0,
        ..Style::default()
    };
    let card = scene
        .add_child(BoxNode::new("card", 20.0, 20.0, 140.0, 100.0).with_style(card_style))
        .expect("card");

    let body = scene
        .tree_mut()
        .insert(
            card,
            BoxNode {
                style: Style {
                    background_color: None,
                    text_align: TextAlign::Center,
                    ..Style::default()
                },
                ..BoxNode::paragraph(
                    "body",
                    "Drag me around,\nthe text wraps to the card.",
                    Font::new(12.0, "monospace"),
                    Length::Percent(100.0),
                )
            },
        )
        .expect("paragraph");

    let close = scene
        .tree_mut()
        .insert(card, BoxNode::text("close", "x", Font::new(10.0, "monospace")))
        .expect("label");
    scene
        .tree_mut()
        .attach_to(close, card, Corner::TopRight, Corner::TopRight)
        .expect("attach");

    // Press on the card, drag it 60px right and 40px down, release.
    let mut dispatches = scene.pointer_down(PointerEvent::new(30.0, 100.0));
    for step in 1..=4 {
        let offset = f64::from(step);
        dispatches.extend(scene.pointer_move(PointerEvent::new(
            30.0 + 15.0 * offset,
            100.0 + 10.0 * offset,
        )));
    }
    dispatches.extend(scene.pointer_up(PointerEvent::new(90.0, 140.0)));
    for d in &dispatches {
        log::info!("{:?} -> {:?} at {:?}", d.kind, d.node, d.position);
    }
    log::info!(
        "card now at {:?}",
        scene.tree().global_bounds(card).expect("live card")
    );

    let text_bounds = scene.tree().content_bounds(body).expect("live paragraph");
    let point = text_bounds.origin() + Vec2::new(text_bounds.width() / 2.0, 4.0);
    log::info!(
        "text under {point:?}: {:?}",
        scene.tree().hit_text(body, point).expect("live paragraph")
    );

    scene.set_size(480.0, 320.0).expect("resize");
    let mut renderer = LogRenderer::new();
    let painted = scene.render(&mut renderer);
    log::info!("painted {painted} nodes with {} calls", renderer.calls);
}
