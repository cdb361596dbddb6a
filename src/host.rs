//! Browser host: owns the canvases, HUD elements, pop sound and the
//! requestAnimationFrame loop, and forwards DOM events into `GameState`.
//!
//! All mutable state sits in one thread-local `App`; it is touched only from
//! the frame callback and from synchronous event handlers, never re-entrantly.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlCanvasElement,
    KeyboardEvent, MouseEvent, TouchEvent, Window, window,
};

use crate::assets::{self, Gallery};
use crate::audio::PopSound;
use crate::config::GameConfig;
use crate::error::{GameError, js_to_string};
use crate::game::score::LocalStorageStore;
use crate::game::theme::{ThemeKey, ThemeMenu};
use crate::game::{GameState, Viewport};
use crate::render::{Layer, Renderer};

const GAME_CANVAS_ID: &str = "gameCanvas";
const PARTICLE_CANVAS_ID: &str = "particleCanvas";
const SCORE_ID: &str = "score-count";
const BEST_ID: &str = "score-best-count";
const THEME_LABEL_ID: &str = "theme-label";
const THEME_SELECTOR_ID: &str = "theme-selector";
const THEME_DROPDOWN_ID: &str = "theme-dropdown";
const THEME_OPTION_SELECTOR: &str = ".theme-option";
const UI_OVERLAY_SELECTOR: &str = "#ui-overlay";

/// DOM text/class targets plus the theme dropdown state. The core only writes
/// text content and CSS classes.
struct Hud {
    score: Element,
    best: Element,
    theme_label: Element,
    selector: Element,
    dropdown: Element,
    options: Vec<Element>,
    menu: ThemeMenu,
}

impl Hud {
    fn locate(doc: &Document) -> Result<Self, GameError> {
        let options = doc.query_selector_all(THEME_OPTION_SELECTOR)?;
        let options = (0..options.length())
            .filter_map(|i| options.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect();
        Ok(Self {
            score: element_by_id(doc, SCORE_ID)?,
            best: element_by_id(doc, BEST_ID)?,
            theme_label: element_by_id(doc, THEME_LABEL_ID)?,
            selector: element_by_id(doc, THEME_SELECTOR_ID)?,
            dropdown: element_by_id(doc, THEME_DROPDOWN_ID)?,
            options,
            menu: ThemeMenu::default(),
        })
    }

    fn show_score(&self, score: u32) {
        self.score.set_text_content(Some(&score.to_string()));
    }

    fn show_best(&self, best: u32) {
        self.best.set_text_content(Some(&best.to_string()));
    }

    fn show_theme(&self, key: ThemeKey) {
        self.theme_label.set_text_content(Some(key.theme().label));
        for opt in &self.options {
            let active = opt.get_attribute("data-theme").as_deref() == Some(key.as_str());
            set_class(opt, "active", active);
        }
    }

    fn show_menu(&self, open: bool) {
        set_class(&self.dropdown, "hidden", !open);
        set_class(&self.selector, "open", open);
    }

    fn toggle_menu(&mut self) {
        let open = self.menu.toggle();
        self.show_menu(open);
    }

    fn close_menu(&mut self) {
        self.menu.close();
        self.show_menu(false);
    }

    /// Outside click: only touches the DOM when the dropdown is open.
    fn dismiss_menu(&mut self) {
        if self.menu.is_open() {
            self.close_menu();
        }
    }
}

struct App {
    game: GameState,
    renderer: Renderer,
    gallery: Gallery,
    sound: Option<PopSound>,
    rng: SmallRng,
    hud: Hud,
    viewport: Viewport,
}

impl App {
    fn frame(&mut self, now_ms: f64) {
        self.game.advance(now_ms, self.viewport, &mut self.rng);
        let art = self.gallery.art(self.game.theme());
        if let Err(err) = self.renderer.draw(&self.game, art, self.viewport) {
            log::error!("draw failed: {}", js_to_string(&err));
        }
    }

    fn pointer_down(&mut self, x: f64, y: f64) {
        let Some(pop) = self.game.try_pop(x, y, &mut self.rng) else {
            return;
        };
        self.hud.show_score(pop.score.score);
        if let Some(best) = pop.score.new_high {
            self.hud.show_best(best);
        }
        if let Some(sound) = self.sound.as_mut() {
            sound.play();
        }
    }

    fn apply_theme(&mut self, key: ThemeKey) {
        self.game.set_theme(key);
        self.hud.show_theme(key);
        self.hud.close_menu();
        log::info!("theme -> {}", key);
    }

    fn resize(&mut self, viewport: Viewport, dpr: f64) {
        self.viewport = viewport;
        if let Err(err) = self.renderer.resize(viewport, dpr) {
            log::error!("resize failed: {}", js_to_string(&err));
        }
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn with_app<T>(f: impl FnOnce(&mut App) -> T) -> Option<T> {
    APP.with(|cell| {
        let mut slot = cell.try_borrow_mut().ok()?;
        slot.as_mut().map(f)
    })
}

/// Boot now if the DOM is parsed, otherwise on `DOMContentLoaded`.
pub(crate) fn start_when_ready(config: GameConfig) -> Result<(), GameError> {
    let win = window().ok_or(GameError::NoWindow)?;
    let doc = win.document().ok_or(GameError::NoDocument)?;
    if doc.ready_state() != "loading" {
        return boot(&win, &doc, config);
    }

    let mut pending = Some(config);
    let closure = Closure::wrap(Box::new(move |_evt: Event| {
        let Some(config) = pending.take() else {
            return;
        };
        let booted = window()
            .ok_or(GameError::NoWindow)
            .and_then(|win| {
                let doc = win.document().ok_or(GameError::NoDocument)?;
                boot(&win, &doc, config)
            });
        if let Err(err) = booted {
            log::error!("bubble pop failed to start: {}", err);
        }
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("DOMContentLoaded", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn boot(win: &Window, doc: &Document, config: GameConfig) -> Result<(), GameError> {
    if APP.with(|cell| cell.borrow().is_some()) {
        log::warn!("bubble pop already running");
        return Ok(());
    }

    let game_canvas = canvas_by_id(doc, GAME_CANVAS_ID)?;
    let particle_canvas = canvas_by_id(doc, PARTICLE_CANVAS_ID)?;
    let renderer = Renderer::new(
        Layer::from_canvas(game_canvas.clone(), GAME_CANVAS_ID)?,
        Layer::from_canvas(particle_canvas, PARTICLE_CANVAS_ID)?,
    );
    let viewport = viewport_of(win);
    renderer.resize(viewport, device_pixel_ratio(win))?;

    let hud = Hud::locate(doc)?;
    let mut rng = SmallRng::seed_from_u64(entropy_seed(win));
    let sound = match PopSound::init(&config.sound, &mut rng) {
        Ok(sound) => Some(sound),
        Err(err) => {
            log::warn!("Could not init pop sound: {}", err);
            None
        }
    };

    let store = LocalStorageStore::new(config.storage_key.clone());
    let game = GameState::new(config, Box::new(store));
    hud.show_score(game.score());
    hud.show_best(game.high_score());

    let mut app = App {
        game,
        renderer,
        gallery: Gallery::fallbacks(),
        sound,
        rng,
        hud,
        viewport,
    };
    let theme = app.game.theme();
    app.apply_theme(theme);

    install_listeners(win, doc, &game_canvas, &app.hud)?;
    APP.with(|cell| cell.replace(Some(app)));

    load_theme_art();
    start_loop();
    log::info!(
        "bubble pop started at {}x{}",
        viewport.width,
        viewport.height
    );
    Ok(())
}

/// Request every theme image at once; each lands in the gallery on its own.
fn load_theme_art() {
    for (key, slot, src) in assets::manifest() {
        spawn_local(async move {
            match assets::load_image(src).await {
                Ok(image) => {
                    with_app(|app| app.gallery.install(key, slot, image));
                }
                Err(err) => log::warn!("{} (keeping {} fallback)", err, key),
            }
        });
    }
}

fn install_listeners(
    win: &Window,
    doc: &Document,
    game_canvas: &HtmlCanvasElement,
    hud: &Hud,
) -> Result<(), GameError> {
    // Window resize: refit both layers.
    {
        let win_resize = win.clone();
        let closure = Closure::wrap(Box::new(move |_evt: Event| {
            let viewport = viewport_of(&win_resize);
            let dpr = device_pixel_ratio(&win_resize);
            with_app(|app| app.resize(viewport, dpr));
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Mouse popping
    {
        let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
            if in_ui_overlay(evt.target()) {
                return;
            }
            let (x, y) = (evt.client_x() as f64, evt.client_y() as f64);
            with_app(|app| app.pointer_down(x, y));
        }) as Box<dyn FnMut(_)>);
        game_canvas
            .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Touch popping (first touch point only); passive so scrolling is never blocked.
    {
        let closure = Closure::wrap(Box::new(move |evt: TouchEvent| {
            if in_ui_overlay(evt.target()) {
                return;
            }
            let Some(touch) = evt.touches().get(0) else {
                return;
            };
            let (x, y) = (touch.client_x() as f64, touch.client_y() as f64);
            with_app(|app| app.pointer_down(x, y));
        }) as Box<dyn FnMut(_)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        game_canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "touchstart",
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        closure.forget();
    }

    // Theme selector button toggles the dropdown.
    {
        let closure = Closure::wrap(Box::new(move |evt: Event| {
            evt.stop_propagation();
            with_app(|app| app.hud.toggle_menu());
        }) as Box<dyn FnMut(_)>);
        hud.selector
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Keyboard activation of the selector
    {
        let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
            let key = evt.key();
            if key == "Enter" || key == " " {
                evt.prevent_default();
                with_app(|app| app.hud.toggle_menu());
            }
        }) as Box<dyn FnMut(_)>);
        hud.selector
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Theme options
    for opt in &hud.options {
        let target = opt.clone();
        let closure = Closure::wrap(Box::new(move |evt: Event| {
            evt.stop_propagation();
            let Some(name) = target.get_attribute("data-theme") else {
                return;
            };
            match name.parse::<ThemeKey>() {
                Ok(key) => {
                    with_app(|app| app.apply_theme(key));
                }
                Err(err) => log::warn!("{}", err),
            }
        }) as Box<dyn FnMut(_)>);
        opt.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Any other click closes an open dropdown.
    {
        let closure = Closure::wrap(Box::new(move |_evt: Event| {
            with_app(|app| app.hud.dismiss_menu());
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_app(|app| app.frame(ts));
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(callback: &FrameCallback) {
    let Some(win) = window() else {
        return;
    };
    if let Some(closure) = callback.borrow().as_ref() {
        let _ = win.request_animation_frame(closure.as_ref().unchecked_ref());
    }
}

fn in_ui_overlay(target: Option<EventTarget>) -> bool {
    target
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(UI_OVERLAY_SELECTOR).ok().flatten())
        .is_some()
}

fn set_class(el: &Element, class: &str, on: bool) {
    if let Err(err) = el.class_list().toggle_with_force(class, on) {
        log::warn!("could not toggle `{}`: {}", class, js_to_string(&err));
    }
}

fn element_by_id(doc: &Document, id: &str) -> Result<Element, GameError> {
    doc.get_element_by_id(id)
        .ok_or_else(|| GameError::MissingElement(id.to_string()))
}

fn canvas_by_id(doc: &Document, id: &str) -> Result<HtmlCanvasElement, GameError> {
    element_by_id(doc, id)?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| GameError::MissingElement(format!("{} (canvas)", id)))
}

fn viewport_of(win: &Window) -> Viewport {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(dim(win.inner_width()), dim(win.inner_height()))
}

fn device_pixel_ratio(win: &Window) -> f64 {
    let dpr = win.device_pixel_ratio();
    if dpr > 0.0 { dpr } else { 1.0 }
}

/// Seed for the gameplay RNG; falls back to the frame clock without crypto.
fn entropy_seed(win: &Window) -> u64 {
    let mut bytes = [0u8; 8];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes),
        Err(err) => {
            log::warn!("no entropy source ({}); seeding from clock", err);
            win.performance().map(|p| p.now()).unwrap_or(0.0).to_bits()
        }
    }
}
