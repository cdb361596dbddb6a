// Integration tests (native) for the `bubble-pop` crate.
// These tests avoid wasm-specific functionality and drive the gameplay core
// through its public API so they can run under `cargo test` on the host.

use bubble_pop::game::score::MemoryStore;
use bubble_pop::game::theme::ThemeKey;
use bubble_pop::{GameConfig, GameState, Viewport};
use rand::SeedableRng;
use rand::rngs::StdRng;

const VIEW: Viewport = Viewport {
    width: 1024.0,
    height: 768.0,
};

/// Spawn a fresh bubble (by advancing the clock past the interval) and pop it.
fn spawn_and_pop(game: &mut GameState, now: &mut f64, rng: &mut StdRng) -> bubble_pop::Pop {
    *now += game.difficulty().spawn_interval_ms + 1.0;
    game.advance(*now, VIEW, rng);
    let target = game
        .bubbles()
        .iter()
        .rev()
        .find(|b| !b.popping)
        .expect("a live bubble")
        .clone();
    game.try_pop(target.x, target.y, rng).expect("direct hit")
}

// Scenario: first pop sets and persists the best score; the tenth pop moves the
// spawn interval from 800ms to 760ms.
#[test]
fn first_ten_pops_ramp_difficulty_and_persist_best() {
    let store = MemoryStore::with_value(0);
    let mut game = GameState::new(GameConfig::default(), Box::new(store.clone()));
    let mut rng = StdRng::seed_from_u64(42);
    let mut now = 0.0;

    assert_eq!(game.score(), 0);
    assert_eq!(game.difficulty().spawn_interval_ms, 800.0);

    let first = spawn_and_pop(&mut game, &mut now, &mut rng);
    assert_eq!(first.score.score, 1);
    assert_eq!(first.score.new_high, Some(1));
    assert_eq!(game.high_score(), 1);
    assert_eq!(store.value(), Some(1));

    for expected in 2..=10u32 {
        let interval_before = game.difficulty().spawn_interval_ms;
        spawn_and_pop(&mut game, &mut now, &mut rng);
        assert_eq!(game.score(), expected);
        if expected < 10 {
            assert_eq!(game.difficulty().spawn_interval_ms, 800.0);
        } else {
            assert_eq!(interval_before, 800.0);
            assert!((game.difficulty().spawn_interval_ms - 760.0).abs() < 1e-9);
            assert!((game.difficulty().speed_multiplier - 1.05).abs() < 1e-12);
        }
    }
    assert_eq!(store.value(), Some(10));
    assert_eq!(store.writes(), 10);
}

#[test]
fn prior_best_is_kept_until_beaten() {
    let store = MemoryStore::with_value(3);
    let mut game = GameState::new(GameConfig::default(), Box::new(store.clone()));
    let mut rng = StdRng::seed_from_u64(8);
    let mut now = 0.0;

    for _ in 0..3 {
        let pop = spawn_and_pop(&mut game, &mut now, &mut rng);
        assert_eq!(pop.score.new_high, None);
        assert_eq!(game.high_score(), 3);
    }
    assert_eq!(store.writes(), 0);
    let pop = spawn_and_pop(&mut game, &mut now, &mut rng);
    assert_eq!(pop.score.new_high, Some(4));
    assert_eq!(store.value(), Some(4));
}

#[test]
fn long_session_stays_bounded() {
    let mut game = GameState::new(GameConfig::default(), Box::new(MemoryStore::default()));
    let mut rng = StdRng::seed_from_u64(99);
    let mut now = 0.0;
    // ~5 minutes at 60fps, popping whatever is on screen every 15 frames.
    for frame in 0..18_000u32 {
        now += 1000.0 / 60.0;
        game.advance(now, VIEW, &mut rng);
        if frame % 15 == 0 {
            if let Some(b) = game.bubbles().iter().rev().find(|b| !b.popping).cloned() {
                game.try_pop(b.x, b.y, &mut rng);
            }
        }
        assert!(game.particles().len() <= 8 * 4, "particles {}", game.particles().len());
        assert!(game.bubbles().len() < 200, "bubbles {}", game.bubbles().len());
    }
    assert!(game.score() > 0);
    assert!(game.difficulty().spawn_interval_ms >= 250.0);
}

#[test]
fn theme_switch_mid_game() {
    let mut game = GameState::new(GameConfig::default(), Box::new(MemoryStore::default()));
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(game.theme(), ThemeKey::Sea);
    game.advance(1_000.0, VIEW, &mut rng);
    let live = game.bubbles().len();
    game.set_theme("nightsky".parse().expect("known theme"));
    game.advance(1_001.0, VIEW, &mut rng);
    assert_eq!(game.theme(), ThemeKey::NightSky);
    assert_eq!(game.bubbles().len(), live);
}
