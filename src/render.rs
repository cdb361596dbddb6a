//! Canvas 2D drawing for the two stacked layers: the scene (backdrop + bubbles)
//! and the effects layer (particles).

use std::f64::consts::TAU;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::assets::{Backdrop, BubbleSprite, ThemeArt, cover_rect};
use crate::error::GameError;
use crate::game::bubble::{Bubble, BubbleTuning};
use crate::game::particle::Particle;
use crate::game::{GameState, Viewport};

const CIRCLE_FILL: &str = "rgba(255, 255, 255, 0.5)";
const CIRCLE_STROKE: &str = "rgba(255, 255, 255, 0.8)";
const CIRCLE_LINE_WIDTH: f64 = 2.0;

pub struct Layer {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
}

impl Layer {
    pub fn from_canvas(canvas: HtmlCanvasElement, name: &'static str) -> Result<Self, GameError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(GameError::NoContext(name))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| GameError::NoContext(name))?;
        Ok(Self { canvas, ctx })
    }

    /// Size the backing store for `dpr` and map drawing units to CSS pixels.
    fn fit(&self, viewport: Viewport, dpr: f64) -> Result<(), JsValue> {
        self.canvas.set_width((viewport.width * dpr).round().max(0.0) as u32);
        self.canvas.set_height((viewport.height * dpr).round().max(0.0) as u32);
        let style = self.canvas.style();
        style.set_property("width", &format!("{}px", viewport.width))?;
        style.set_property("height", &format!("{}px", viewport.height))?;
        self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
    }
}

pub struct Renderer {
    scene: Layer,
    effects: Layer,
}

impl Renderer {
    pub fn new(scene: Layer, effects: Layer) -> Self {
        Self { scene, effects }
    }

    pub fn resize(&self, viewport: Viewport, dpr: f64) -> Result<(), JsValue> {
        self.scene.fit(viewport, dpr)?;
        self.effects.fit(viewport, dpr)
    }

    pub fn draw(&self, game: &GameState, art: &ThemeArt, viewport: Viewport) -> Result<(), JsValue> {
        let ctx = &self.scene.ctx;
        ctx.clear_rect(0.0, 0.0, viewport.width, viewport.height);
        draw_backdrop(ctx, &art.backdrop, viewport)?;
        let tuning = &game.config().bubbles;
        for bubble in game.bubbles() {
            draw_bubble(ctx, bubble, &art.sprite, tuning)?;
        }
        self.draw_particles(game.particles(), viewport)
    }

    fn draw_particles(&self, particles: &[Particle], viewport: Viewport) -> Result<(), JsValue> {
        let ctx = &self.effects.ctx;
        ctx.clear_rect(0.0, 0.0, viewport.width, viewport.height);
        for p in particles {
            ctx.set_global_alpha(p.life.clamp(0.0, 1.0));
            ctx.set_fill_style_str(&p.css_color());
            ctx.begin_path();
            ctx.arc(p.x, p.y, p.size, 0.0, TAU)?;
            ctx.fill();
        }
        ctx.set_global_alpha(1.0);
        Ok(())
    }
}

fn draw_backdrop(
    ctx: &CanvasRenderingContext2d,
    backdrop: &Backdrop,
    viewport: Viewport,
) -> Result<(), JsValue> {
    match backdrop {
        Backdrop::Image(img) => {
            let r = cover_rect(
                img.natural_width() as f64,
                img.natural_height() as f64,
                viewport.width,
                viewport.height,
            );
            ctx.draw_image_with_html_image_element_and_dw_and_dh(img, r.x, r.y, r.width, r.height)
        }
        Backdrop::Solid(color) => {
            ctx.set_fill_style_str(color);
            ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
            Ok(())
        }
    }
}

fn draw_bubble(
    ctx: &CanvasRenderingContext2d,
    bubble: &Bubble,
    sprite: &BubbleSprite,
    tuning: &BubbleTuning,
) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_global_alpha(bubble.opacity.clamp(0.0, 1.0));
    let drawn = draw_bubble_body(ctx, bubble, sprite, tuning);
    ctx.restore();
    drawn
}

fn draw_bubble_body(
    ctx: &CanvasRenderingContext2d,
    bubble: &Bubble,
    sprite: &BubbleSprite,
    tuning: &BubbleTuning,
) -> Result<(), JsValue> {
    ctx.translate(bubble.x, bubble.y)?;
    ctx.rotate(bubble.rotation)?;
    let size = bubble.draw_size(tuning);
    match sprite {
        BubbleSprite::Image(img) => {
            let half = size / 2.0;
            ctx.draw_image_with_html_image_element_and_dw_and_dh(img, -half, -half, size, size)
        }
        BubbleSprite::Circle => {
            ctx.set_fill_style_str(CIRCLE_FILL);
            ctx.begin_path();
            ctx.arc(0.0, 0.0, size / 2.0, 0.0, TAU)?;
            ctx.fill();
            ctx.set_stroke_style_str(CIRCLE_STROKE);
            ctx.set_line_width(CIRCLE_LINE_WIDTH);
            ctx.stroke();
            Ok(())
        }
    }
}
