use crate::errors::{EditorError, EditorResult};
use folio_parser::ParseOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Editing session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Period of the autosave check
    #[serde(default = "default_autosave_interval_ms")]
    pub autosave_interval_ms: u64,

    /// Quiet period before a diagram is re-rendered
    #[serde(default = "default_diagram_debounce_ms")]
    pub diagram_debounce_ms: u64,

    /// Undo depth (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Keep an empty text block after a trailing non-text block
    #[serde(default = "default_true")]
    pub ensure_trailing_text: bool,

    #[serde(default)]
    pub parse: ParseOptions,
}

fn default_autosave_interval_ms() -> u64 {
    5000
}

fn default_diagram_debounce_ms() -> u64 {
    500
}

fn default_undo_levels() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl EditorConfig {
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    pub fn diagram_debounce(&self) -> Duration {
        Duration::from_millis(self.diagram_debounce_ms)
    }

    /// Reject values that cannot drive a session
    pub fn validate(&self) -> EditorResult<()> {
        if self.autosave_interval_ms == 0 {
            return Err(EditorError::InvalidConfig(
                "autosaveIntervalMs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_interval_ms: default_autosave_interval_ms(),
            diagram_debounce_ms: default_diagram_debounce_ms(),
            undo_levels: default_undo_levels(),
            ensure_trailing_text: default_true(),
            parse: ParseOptions::default(),
        }
    }
}
