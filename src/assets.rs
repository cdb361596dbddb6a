//! Theme art: async image loading and the per-theme drawing strategies.
//!
//! Every theme starts on its fallback strategy (solid fill / drawn circle) so
//! the game can render immediately; each image is swapped in individually
//! once it finishes loading. A failed image keeps its fallback for the session.

use js_sys::Promise;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use crate::error::GameError;
use crate::game::theme::{THEMES, ThemeKey};

/// How the scene background is painted.
#[derive(Clone, Debug)]
pub enum Backdrop {
    Image(HtmlImageElement),
    Solid(&'static str),
}

/// How each bubble is painted.
#[derive(Clone, Debug, Default)]
pub enum BubbleSprite {
    Image(HtmlImageElement),
    #[default]
    Circle,
}

#[derive(Clone, Debug)]
pub struct ThemeArt {
    pub backdrop: Backdrop,
    pub sprite: BubbleSprite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtSlot {
    Background,
    Bubble,
}

/// Art for all themes, indexed by `ThemeKey`.
#[derive(Debug)]
pub struct Gallery {
    arts: Vec<ThemeArt>,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::fallbacks()
    }
}

impl Gallery {
    pub fn fallbacks() -> Self {
        Self {
            arts: ThemeKey::ALL
                .iter()
                .map(|key| ThemeArt {
                    backdrop: Backdrop::Solid(key.theme().fallback_color),
                    sprite: BubbleSprite::Circle,
                })
                .collect(),
        }
    }

    pub fn art(&self, key: ThemeKey) -> &ThemeArt {
        &self.arts[key.index()]
    }

    pub fn install(&mut self, key: ThemeKey, slot: ArtSlot, image: HtmlImageElement) {
        let art = &mut self.arts[key.index()];
        match slot {
            ArtSlot::Background => art.backdrop = Backdrop::Image(image),
            ArtSlot::Bubble => art.sprite = BubbleSprite::Image(image),
        }
    }
}

/// Every (theme, slot, path) the game wants loaded.
pub fn manifest() -> impl Iterator<Item = (ThemeKey, ArtSlot, &'static str)> {
    THEMES.iter().flat_map(|theme| {
        [
            (theme.key, ArtSlot::Background, theme.background),
            (theme.key, ArtSlot::Bubble, theme.bubble),
        ]
    })
}

/// Resolve once the browser has decoded `src`.
pub async fn load_image(src: &str) -> Result<HtmlImageElement, GameError> {
    let image = HtmlImageElement::new()?;
    let promise = Promise::new(&mut |resolve, reject| {
        image.set_onload(Some(&resolve));
        image.set_onerror(Some(&reject));
    });
    image.set_src(src);
    let outcome = JsFuture::from(promise).await;
    image.set_onload(None);
    image.set_onerror(None);
    outcome.map_err(|_| GameError::Js(format!("failed to load {}", src)))?;
    Ok(image)
}

/// Destination rect that covers `view` with an image of the given size,
/// preserving aspect ratio and centring the overflow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub fn cover_rect(image_w: f64, image_h: f64, view_w: f64, view_h: f64) -> CoverRect {
    if image_w <= 0.0 || image_h <= 0.0 || view_h <= 0.0 {
        return CoverRect {
            x: 0.0,
            y: 0.0,
            width: view_w,
            height: view_h,
        };
    }
    let image_ratio = image_w / image_h;
    if view_w / view_h > image_ratio {
        let height = view_w / image_ratio;
        CoverRect {
            x: 0.0,
            y: (view_h - height) / 2.0,
            width: view_w,
            height,
        }
    } else {
        let width = view_h * image_ratio;
        CoverRect {
            x: (view_w - width) / 2.0,
            y: 0.0,
            width,
            height: view_h,
        }
    }
}
