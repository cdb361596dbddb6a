//! Pop burst fragments.

use rand::Rng;
use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::Deserialize;

use super::between;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct ParticleTuning {
    pub burst_count: usize,
    /// Added to vertical velocity every frame.
    pub gravity: f64,
    /// Initial upward kick applied on top of the radial burst.
    pub lift: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub min_decay: f64,
    pub max_decay: f64,
    pub min_size: f64,
    pub max_size: f64,
    /// Hue window (degrees) for the cyan/blue spray.
    pub hue_min: f64,
    pub hue_max: f64,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            burst_count: 8,
            gravity: 0.05,
            lift: 1.0,
            min_speed: 1.0,
            max_speed: 4.0,
            min_decay: 0.02,
            max_decay: 0.05,
            min_size: 2.0,
            max_size: 6.0,
            hue_min: 180.0,
            hue_max: 240.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Remaining life, 1.0 at birth; doubles as draw alpha.
    pub life: f64,
    pub decay: f64,
    pub size: f64,
    pub hue: f64,
}

impl Particle {
    fn scatter<R: Rng + ?Sized>(x: f64, y: f64, tuning: &ParticleTuning, rng: &mut R) -> Self {
        let angle = rng.gen_range(0.0..TAU);
        let speed = between(rng, tuning.min_speed, tuning.max_speed);
        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed - tuning.lift,
            life: 1.0,
            decay: between(rng, tuning.min_decay, tuning.max_decay),
            size: between(rng, tuning.min_size, tuning.max_size),
            hue: between(rng, tuning.hue_min, tuning.hue_max),
        }
    }

    /// Integrate one frame. Returns false once life is spent.
    pub fn step(&mut self, gravity: f64) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += gravity;
        self.life -= self.decay;
        self.life > 0.0
    }

    pub fn css_color(&self) -> String {
        format!("hsl({:.1}, 80%, 70%)", self.hue)
    }
}

/// Append a full burst centred on (x, y).
pub fn burst<R: Rng + ?Sized>(
    into: &mut Vec<Particle>,
    x: f64,
    y: f64,
    tuning: &ParticleTuning,
    rng: &mut R,
) {
    into.reserve(tuning.burst_count);
    for _ in 0..tuning.burst_count {
        into.push(Particle::scatter(x, y, tuning, rng));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn burst_spawns_fixed_count_at_origin() {
        let mut rng = StdRng::seed_from_u64(11);
        let tuning = ParticleTuning::default();
        let mut particles = Vec::new();
        burst(&mut particles, 40.0, 80.0, &tuning, &mut rng);
        assert_eq!(particles.len(), 8);
        for p in &particles {
            assert_eq!((p.x, p.y), (40.0, 80.0));
            assert_eq!(p.life, 1.0);
            assert!(p.decay >= 0.02 && p.decay < 0.05);
            assert!(p.size >= 2.0 && p.size < 6.0);
            assert!(p.hue >= 180.0 && p.hue < 240.0);
            // radial speed in [1, 4) before the lift
            let speed = (p.vx * p.vx + (p.vy + 1.0) * (p.vy + 1.0)).sqrt();
            assert!(speed >= 1.0 - 1e-9 && speed < 4.0 + 1e-9);
        }
    }

    #[test]
    fn step_applies_velocity_then_gravity() {
        let mut p = Particle {
            x: 0.0,
            y: 0.0,
            vx: 2.0,
            vy: -1.0,
            life: 1.0,
            decay: 0.25,
            size: 3.0,
            hue: 200.0,
        };
        assert!(p.step(0.05));
        assert_eq!((p.x, p.y), (2.0, -1.0));
        assert!((p.vy - -0.95).abs() < 1e-12);
        assert_eq!(p.life, 0.75);
    }

    #[test]
    fn life_strictly_decreases_until_removed() {
        let mut rng = StdRng::seed_from_u64(5);
        let tuning = ParticleTuning::default();
        let mut particles = Vec::new();
        burst(&mut particles, 0.0, 0.0, &tuning, &mut rng);
        for mut p in particles {
            let mut frames = 0;
            loop {
                let before = p.life;
                let alive = p.step(tuning.gravity);
                frames += 1;
                assert!(p.life < before);
                if !alive {
                    assert!(p.life <= 0.0);
                    break;
                }
                assert!(p.life > 0.0);
            }
            // decay in [0.02, 0.05) bounds the lifetime to roughly 21..=50 frames.
            assert!((21..=51).contains(&frames), "frames {}", frames);
        }
    }

    #[test]
    fn css_color_is_hsl() {
        let p = Particle {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            life: 1.0,
            decay: 0.1,
            size: 1.0,
            hue: 200.0,
        };
        assert_eq!(p.css_color(), "hsl(200.0, 80%, 70%)");
    }
}
