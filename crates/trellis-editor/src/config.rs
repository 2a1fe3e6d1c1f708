//! Editor settings.

use crate::error::EditorError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of undoable jobs kept; older ones are disposed.
    pub history_depth: usize,
    /// DUPLICATE selects the new copies instead of keeping the originals.
    pub duplicate_selects_copies: bool,
    /// PASTE drops into the single selected container when it can take
    /// the clipboard content, instead of next to it.
    pub paste_into_selection: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: 200,
            duplicate_selects_copies: true,
            paste_into_selection: false,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, EditorError> {
        let config: Self = serde_json::from_str(text)?;
        if config.history_depth == 0 {
            log::warn!("historyDepth 0 disables undo");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "historyDepth": 5 }"#).unwrap();
        assert_eq!(config.history_depth, 5);
        assert!(config.duplicate_selects_copies);
        assert!(!config.paste_into_selection);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = EditorConfig::from_json("{ historyDepth: }").unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }
}
