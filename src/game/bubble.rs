//! Rising bubbles: spawn, per-frame float/wobble, pop animation and hit testing.

use rand::Rng;
use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::Deserialize;

use super::{Viewport, between};

/// Bubble sizing / motion constants. Speeds are in CSS px per frame (~60fps).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct BubbleTuning {
    pub base_size: f64,
    /// ± fraction applied to `base_size`.
    pub size_variance: f64,
    /// Viewport short side that maps to a 1.0 size scale.
    pub reference_extent: f64,
    pub base_speed: f64,
    pub speed_jitter: f64,
    /// Horizontal drift per frame at the wobble peak.
    pub wobble_drift: f64,
    /// Pop progress added each frame once hit.
    pub pop_increment: f64,
    /// Fraction of size lost by the end of the pop animation.
    pub pop_shrink: f64,
}

impl Default for BubbleTuning {
    fn default() -> Self {
        Self {
            base_size: 60.0,
            size_variance: 0.25,
            reference_extent: 500.0,
            base_speed: 1.5,
            speed_jitter: 0.8,
            wobble_drift: 0.5,
            pop_increment: 0.08,
            pop_shrink: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bubble {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub speed: f64,
    pub wobble_phase: f64,
    pub wobble_speed: f64,
    /// Sampled at spawn; per-frame drift uses `BubbleTuning::wobble_drift`.
    pub wobble_amplitude: f64,
    pub opacity: f64,
    pub popping: bool,
    pub pop_progress: f64,
    pub rotation: f64,
}

impl Bubble {
    /// New bubble just below the bottom edge, sized for the viewport.
    pub fn spawn<R: Rng + ?Sized>(
        viewport: Viewport,
        speed_multiplier: f64,
        tuning: &BubbleTuning,
        rng: &mut R,
    ) -> Self {
        let scale = viewport.size_scale(tuning.reference_extent);
        let variance = 1.0 + between(rng, -tuning.size_variance, tuning.size_variance);
        let size = tuning.base_size * scale * variance;
        let span = (viewport.width - size).max(0.0);

        Self {
            x: rng.gen_range(0.0..1.0) * span + size / 2.0,
            y: viewport.height + size,
            size,
            speed: (tuning.base_speed + between(rng, 0.0, tuning.speed_jitter))
                * speed_multiplier
                * scale,
            wobble_phase: rng.gen_range(0.0..TAU),
            wobble_speed: rng.gen_range(0.02..0.04),
            wobble_amplitude: rng.gen_range(15.0..25.0),
            opacity: 1.0,
            popping: false,
            pop_progress: 0.0,
            rotation: rng.gen_range(-0.15..0.15),
        }
    }

    /// Advance one frame. Returns false once the bubble should be culled.
    pub fn step(&mut self, tuning: &BubbleTuning) -> bool {
        if self.popping {
            self.pop_progress += tuning.pop_increment;
            self.opacity = (1.0 - self.pop_progress).max(0.0);
            return self.pop_progress < 1.0;
        }

        self.y -= self.speed;
        self.wobble_phase += self.wobble_speed;
        self.x += self.wobble_phase.sin() * tuning.wobble_drift;

        self.y >= -self.size
    }

    pub fn pop(&mut self) {
        self.popping = true;
        self.pop_progress = 0.0;
    }

    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    /// Edge length to draw this frame (shrinks while popping).
    pub fn draw_size(&self, tuning: &BubbleTuning) -> f64 {
        if self.popping {
            self.size * (1.0 - self.pop_progress * tuning.pop_shrink)
        } else {
            self.size
        }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        let dx = px - self.x;
        let dy = py - self.y;
        (dx * dx + dy * dy).sqrt() < self.radius()
    }
}

/// Index of the topmost (last drawn) live bubble under the point, if any.
/// Bubbles already popping are not hittable.
pub fn hit_test(bubbles: &[Bubble], px: f64, py: f64) -> Option<usize> {
    bubbles
        .iter()
        .enumerate()
        .rev()
        .find(|(_, b)| !b.popping && b.contains(px, py))
        .map(|(i, _)| i)
}
