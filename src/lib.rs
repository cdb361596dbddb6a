//! Bubble Pop core crate.
//!
//! Bubbles rise across a themed backdrop; click or tap to pop them. Gameplay
//! (entity stores, difficulty ramp, scoring, theme state) lives in [`game`] and
//! is plain Rust; [`render`], [`assets`] and [`audio`] wrap Canvas 2D, image
//! loading and the synthesized pop sound; the private `host` module wires it
//! all to the page and runs the animation loop started by `start_game()`.

use wasm_bindgen::prelude::*;

pub mod assets;
pub mod audio;
pub mod config;
pub mod error;
pub mod game;
mod host;
pub mod render;

pub use config::GameConfig;
pub use error::GameError;
pub use game::{GameState, Pop, Viewport};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // Ignore the error if a logger is already installed (e.g. module re-init).
    console_log::init_with_level(log::Level::Info).ok();
}

/// Boot the game with default tuning. Safe to call before the DOM has loaded.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    host::start_when_ready(GameConfig::default()).map_err(Into::into)
}

/// Boot with a JSON tuning override, e.g. `{"default_theme": "jungle"}`.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json).map_err(GameError::from)?;
    host::start_when_ready(config).map_err(Into::into)
}
