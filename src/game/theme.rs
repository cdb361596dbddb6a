//! Visual themes and the theme dropdown state.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(rename_all = "lowercase"))]
pub enum ThemeKey {
    #[default]
    Sea,
    NightSky,
    Jungle,
}

/// Static descriptor for one theme's art.
#[derive(Debug)]
pub struct Theme {
    pub key: ThemeKey,
    pub label: &'static str,
    pub background: &'static str,
    pub bubble: &'static str,
    /// Flat fill used while (or if) the background image is unavailable.
    pub fallback_color: &'static str,
}

pub static THEMES: [Theme; 3] = [
    Theme {
        key: ThemeKey::Sea,
        label: "🐚 Sea",
        background: "assets/Sea_Theme.png",
        bubble: "assets/Seashell_Bubble.png",
        fallback_color: "#1a6b8a",
    },
    Theme {
        key: ThemeKey::NightSky,
        label: "⭐ Night Sky",
        background: "assets/Nightsky_Theme.png",
        bubble: "assets/Star_Bubble.png",
        fallback_color: "#0a1628",
    },
    Theme {
        key: ThemeKey::Jungle,
        label: "🐻 Jungle",
        background: "assets/Jungle_Theme.png",
        bubble: "assets/Bear_Bubble.png",
        fallback_color: "#2d5a27",
    },
];

impl ThemeKey {
    pub const ALL: [ThemeKey; 3] = [ThemeKey::Sea, ThemeKey::NightSky, ThemeKey::Jungle];

    pub fn index(self) -> usize {
        match self {
            ThemeKey::Sea => 0,
            ThemeKey::NightSky => 1,
            ThemeKey::Jungle => 2,
        }
    }

    pub fn theme(self) -> &'static Theme {
        &THEMES[self.index()]
    }

    /// Value used in `data-theme` attributes.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKey::Sea => "sea",
            ThemeKey::NightSky => "nightsky",
            ThemeKey::Jungle => "jungle",
        }
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme `{}`", self.0)
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for ThemeKey {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

/// Open/closed state of the theme dropdown. Pure UI state; the host mirrors it
/// onto CSS classes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ThemeMenu {
    open: bool,
}

impl ThemeMenu {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Returns true if the menu was open (i.e. the DOM needs updating).
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_data_attribute() {
        for key in ThemeKey::ALL {
            assert_eq!(key.as_str().parse::<ThemeKey>(), Ok(key));
            assert_eq!(key.theme().key, key);
        }
        assert_eq!(
            "volcano".parse::<ThemeKey>(),
            Err(UnknownTheme("volcano".into()))
        );
        assert!("Sea".parse::<ThemeKey>().is_err());
    }

    #[test]
    fn every_theme_has_art_and_fallback() {
        for theme in &THEMES {
            assert!(theme.background.ends_with(".png"));
            assert!(theme.bubble.ends_with(".png"));
            assert!(theme.fallback_color.starts_with('#'));
            assert!(!theme.label.is_empty());
        }
        assert_eq!(ThemeKey::default(), ThemeKey::Sea);
    }

    #[test]
    fn menu_toggles_and_closes() {
        let mut menu = ThemeMenu::default();
        assert!(!menu.is_open());
        assert!(!menu.close());
        assert!(menu.toggle());
        assert!(menu.is_open());
        assert!(!menu.toggle());
        menu.toggle();
        assert!(menu.close());
        assert!(!menu.is_open());
    }
}
