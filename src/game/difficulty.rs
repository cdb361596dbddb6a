//! Difficulty ramp: spawn cadence and rise speed derived purely from score.

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Tunables for the difficulty curve. Every `points_per_step` pops the game
/// gets `factor` faster (speed) and `factor` denser (interval decay).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct DifficultyCurve {
    pub base_spawn_interval_ms: f64,
    pub min_spawn_interval_ms: f64,
    pub points_per_step: u32,
    pub factor: f64,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            base_spawn_interval_ms: 800.0,
            min_spawn_interval_ms: 250.0,
            points_per_step: 10,
            factor: 0.05,
        }
    }
}

/// Snapshot of the curve at a given score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Difficulty {
    pub step: u32,
    pub speed_multiplier: f64,
    pub spawn_interval_ms: f64,
}

impl DifficultyCurve {
    pub fn step(&self, score: u32) -> u32 {
        score / self.points_per_step.max(1)
    }

    pub fn at(&self, score: u32) -> Difficulty {
        let step = self.step(score);
        let decayed = self.base_spawn_interval_ms * (1.0 - self.factor).powi(step as i32);
        Difficulty {
            step,
            speed_multiplier: 1.0 + step as f64 * self.factor,
            spawn_interval_ms: decayed.max(self.min_spawn_interval_ms),
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        DifficultyCurve::default().at(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn score_zero_is_base_difficulty() {
        let d = DifficultyCurve::default().at(0);
        assert_eq!(d.step, 0);
        assert!(close(d.speed_multiplier, 1.0));
        assert!(close(d.spawn_interval_ms, 800.0));
    }

    #[test]
    fn step_changes_only_on_tens() {
        let curve = DifficultyCurve::default();
        assert_eq!(curve.at(9), curve.at(0));
        let d = curve.at(10);
        assert_eq!(d.step, 1);
        assert!(close(d.speed_multiplier, 1.05));
        assert!(close(d.spawn_interval_ms, 760.0));
        assert_eq!(curve.at(19), d);
    }

    #[test]
    fn score_hundred_matches_decay() {
        let d = DifficultyCurve::default().at(100);
        assert_eq!(d.step, 10);
        assert!(close(d.speed_multiplier, 1.5));
        assert!(close(d.spawn_interval_ms, 800.0 * 0.95f64.powi(10)));
        assert!((d.spawn_interval_ms - 478.99).abs() < 0.01);
    }

    #[test]
    fn interval_is_floored_and_speed_unbounded() {
        let curve = DifficultyCurve::default();
        let late = curve.at(10_000);
        assert!(close(late.spawn_interval_ms, 250.0));
        assert!(close(late.speed_multiplier, 1.0 + 1000.0 * 0.05));
        let mut prev = curve.at(0).spawn_interval_ms;
        for s in (0..2_000).step_by(10) {
            let cur = curve.at(s).spawn_interval_ms;
            assert!(cur <= prev);
            assert!(cur >= 250.0);
            prev = cur;
        }
    }
}
