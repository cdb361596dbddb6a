//! Browser-free gameplay core: entity stores, difficulty, scoring and theme
//! selection, driven one frame at a time by the host loop.
//!
//! Nothing in here touches the DOM (except `score::LocalStorageStore`, which is
//! only constructed by the host), so the whole module runs under plain
//! `cargo test`.

pub mod bubble;
pub mod difficulty;
pub mod particle;
pub mod score;
pub mod theme;

use rand::Rng;

use crate::config::GameConfig;
use bubble::{Bubble, hit_test};
use difficulty::Difficulty;
use particle::Particle;
use score::{HighScoreStore, ScoreChange, Scoreboard};
use theme::ThemeKey;

/// Drawable area in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Responsive sprite scale: short side relative to `reference`.
    pub fn size_scale(&self, reference: f64) -> f64 {
        self.width.min(self.height) / reference
    }
}

/// Uniform draw between two bounds. Never panics: an empty range yields `lo`
/// and inverted bounds sample the same span from the other end.
pub(crate) fn between<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + rng.gen_range(0.0..1.0) * (hi - lo)
}

/// What a successful hit produced; the host turns it into DOM text and sound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pop {
    pub x: f64,
    pub y: f64,
    pub score: ScoreChange,
}

pub struct GameState {
    config: GameConfig,
    bubbles: Vec<Bubble>,
    particles: Vec<Particle>,
    scoreboard: Scoreboard,
    theme: ThemeKey,
    difficulty: Difficulty,
    last_spawn_ms: f64,
}

impl GameState {
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Self {
        let difficulty = config.difficulty.at(0);
        let theme = config.default_theme;
        Self {
            config,
            bubbles: Vec::new(),
            particles: Vec::new(),
            scoreboard: Scoreboard::new(store),
            theme,
            difficulty,
            last_spawn_ms: 0.0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn score(&self) -> u32 {
        self.scoreboard.score()
    }

    pub fn high_score(&self) -> u32 {
        self.scoreboard.high_score()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn theme(&self) -> ThemeKey {
        self.theme
    }

    /// In-flight bubbles keep their state; only the art they are drawn with changes.
    pub fn set_theme(&mut self, key: ThemeKey) {
        self.theme = key;
    }

    /// One full simulation frame: spawn timer, bubbles, then particles.
    pub fn advance<R: Rng + ?Sized>(&mut self, now_ms: f64, viewport: Viewport, rng: &mut R) {
        self.update_bubbles(now_ms, viewport, rng);
        self.update_particles();
    }

    pub fn update_bubbles<R: Rng + ?Sized>(&mut self, now_ms: f64, viewport: Viewport, rng: &mut R) {
        if now_ms - self.last_spawn_ms > self.difficulty.spawn_interval_ms {
            self.bubbles.push(Bubble::spawn(
                viewport,
                self.difficulty.speed_multiplier,
                &self.config.bubbles,
                rng,
            ));
            self.last_spawn_ms = now_ms;
        }

        let tuning = &self.config.bubbles;
        self.bubbles.retain_mut(|b| b.step(tuning));
    }

    pub fn update_particles(&mut self) {
        let gravity = self.config.particles.gravity;
        self.particles.retain_mut(|p| p.step(gravity));
    }

    /// Hit-test a pointer position and pop at most one bubble.
    pub fn try_pop<R: Rng + ?Sized>(&mut self, x: f64, y: f64, rng: &mut R) -> Option<Pop> {
        let idx = hit_test(&self.bubbles, x, y)?;
        let bubble = &mut self.bubbles[idx];
        bubble.pop();
        let (bx, by) = (bubble.x, bubble.y);

        let score = self.scoreboard.record_pop();
        self.difficulty = self.config.difficulty.at(score.score);
        particle::burst(&mut self.particles, bx, by, &self.config.particles, rng);

        Some(Pop { x: bx, y: by, score })
    }
}
