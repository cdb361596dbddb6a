//! Score keeping and the persisted best score.

use std::cell::Cell;
use std::rc::Rc;

pub const DEFAULT_STORAGE_KEY: &str = "bubblePop_highScore";

/// Durable home of the best score. Writes are fire-and-forget.
pub trait HighScoreStore {
    fn load(&self) -> Option<u32>;
    fn save(&mut self, high_score: u32);
}

/// `window.localStorage` under a single key, value stored as decimal text.
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl HighScoreStore for LocalStorageStore {
    fn load(&self) -> Option<u32> {
        let raw = Self::storage()?.get_item(&self.key).ok()??;
        Some(parse_stored(&raw))
    }

    fn save(&mut self, high_score: u32) {
        match Self::storage() {
            Some(storage) => {
                if storage.set_item(&self.key, &high_score.to_string()).is_err() {
                    log::warn!("could not persist high score under {}", self.key);
                }
            }
            None => log::warn!("local storage unavailable; high score not persisted"),
        }
    }
}

/// In-process store; clones share the same slot so tests can observe writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Rc<Cell<Option<u32>>>,
    writes: Rc<Cell<u32>>,
}

impl MemoryStore {
    pub fn with_value(value: u32) -> Self {
        let store = Self::default();
        store.slot.set(Some(value));
        store
    }

    pub fn value(&self) -> Option<u32> {
        self.slot.get()
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Option<u32> {
        self.slot.get()
    }

    fn save(&mut self, high_score: u32) {
        self.slot.set(Some(high_score));
        self.writes.set(self.writes.get() + 1);
    }
}

/// Lenient integer read: leading ASCII digits only, anything else reads as 0.
/// Oversized values saturate.
pub fn parse_stored(raw: &str) -> u32 {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}

/// Result of a single scored pop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreChange {
    pub score: u32,
    /// Set when this pop raised (and persisted) the best score.
    pub new_high: Option<u32>,
}

pub struct Scoreboard {
    score: u32,
    high_score: u32,
    store: Box<dyn HighScoreStore>,
}

impl Scoreboard {
    pub fn new(store: Box<dyn HighScoreStore>) -> Self {
        let high_score = store.load().unwrap_or(0);
        Self {
            score: 0,
            high_score,
            store,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn record_pop(&mut self) -> ScoreChange {
        self.score = self.score.saturating_add(1);
        let new_high = if self.score > self.high_score {
            self.high_score = self.score;
            self.store.save(self.high_score);
            log::debug!("new high score {}", self.high_score);
            Some(self.high_score)
        } else {
            None
        };
        ScoreChange {
            score: self.score,
            new_high,
        }
    }
}
