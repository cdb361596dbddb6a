//! Startup / wiring errors surfaced across the JS boundary.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error)]
pub enum GameError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("missing element `{0}`")]
    MissingElement(String),
    #[error("2d context unavailable on `{0}`")]
    NoContext(&'static str),
    #[error("audio unavailable: {0}")]
    Audio(String),
    #[cfg(feature = "serde_json")]
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("js error: {0}")]
    Js(String),
}

impl From<JsValue> for GameError {
    fn from(value: JsValue) -> Self {
        GameError::Js(js_to_string(&value))
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort text for a thrown JS value (Error objects, strings, anything else).
pub(crate) fn js_to_string(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_missing_piece() {
        assert_eq!(
            GameError::MissingElement("score-count".into()).to_string(),
            "missing element `score-count`"
        );
        assert_eq!(
            GameError::NoContext("gameCanvas").to_string(),
            "2d context unavailable on `gameCanvas`"
        );
    }
}
