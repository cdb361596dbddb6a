//! Game tuning. Defaults reproduce the shipped feel; with the `serde_json`
//! feature a page can override any subset via `start_game_with_config`.

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::audio::SoundTuning;
use crate::game::bubble::BubbleTuning;
use crate::game::difficulty::DifficultyCurve;
use crate::game::particle::ParticleTuning;
use crate::game::score::DEFAULT_STORAGE_KEY;
use crate::game::theme::ThemeKey;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct GameConfig {
    pub difficulty: DifficultyCurve,
    pub bubbles: BubbleTuning,
    pub particles: ParticleTuning,
    pub sound: SoundTuning,
    /// localStorage key holding the best score.
    pub storage_key: String,
    pub default_theme: ThemeKey,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: DifficultyCurve::default(),
            bubbles: BubbleTuning::default(),
            particles: ParticleTuning::default(),
            sound: SoundTuning::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_theme: ThemeKey::default(),
        }
    }
}

#[cfg(feature = "serde_json")]
impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_constants() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.storage_key, "bubblePop_highScore");
        assert_eq!(cfg.default_theme, ThemeKey::Sea);
        assert_eq!(cfg.difficulty.points_per_step, 10);
        assert_eq!(cfg.particles.burst_count, 8);
        assert_eq!(cfg.sound.voices, 10);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_overrides_merge_with_defaults() {
        let cfg = GameConfig::from_json(
            r#"{ "default_theme": "jungle", "difficulty": { "points_per_step": 5 } }"#,
        )
        .expect("valid config");
        assert_eq!(cfg.default_theme, ThemeKey::Jungle);
        assert_eq!(cfg.difficulty.points_per_step, 5);
        assert_eq!(cfg.difficulty.base_spawn_interval_ms, 800.0);
        assert_eq!(cfg.bubbles, BubbleTuning::default());

        assert!(GameConfig::from_json(r#"{ "default_theme": "lava" }"#).is_err());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn zero_width_ranges_from_json_still_play() {
        use crate::game::score::MemoryStore;
        use crate::game::{GameState, Viewport};
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let cfg = GameConfig::from_json(
            r#"{ "bubbles": { "speed_jitter": 0 },
                 "particles": { "min_decay": 0.03, "max_decay": 0.03 } }"#,
        )
        .expect("valid config");
        let mut game = GameState::new(cfg, Box::new(MemoryStore::default()));
        let mut rng = StdRng::seed_from_u64(11);
        game.advance(1_000.0, Viewport::new(640.0, 480.0), &mut rng);
        let b = game.bubbles()[0].clone();
        game.try_pop(b.x, b.y, &mut rng).expect("hit");
        assert_eq!(game.particles().len(), 8);
        assert!(game.particles().iter().all(|p| p.decay == 0.03));
    }
}
