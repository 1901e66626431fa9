use serde::{Deserialize, Serialize};

/// Fence delimiter of code and diagram blocks
pub const FENCE: &str = "```";

/// Knobs of the persisted text format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    /// Width used when an image reference has none (or an invalid one)
    #[serde(default = "default_image_width")]
    pub default_image_width: u32,

    #[serde(default = "default_iframe_width")]
    pub default_iframe_width: u32,

    #[serde(default = "default_iframe_height")]
    pub default_iframe_height: u32,

    /// Fence language tag that routes a fence to a diagram block
    #[serde(default = "default_diagram_language")]
    pub diagram_language: String,

    /// Language recorded for a fence without a tag
    #[serde(default = "default_code_language")]
    pub default_code_language: String,
}

fn default_image_width() -> u32 {
    600
}

fn default_iframe_width() -> u32 {
    560
}

fn default_iframe_height() -> u32 {
    315
}

fn default_diagram_language() -> String {
    "mermaid".to_string()
}

fn default_code_language() -> String {
    "text".to_string()
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_image_width: default_image_width(),
            default_iframe_width: default_iframe_width(),
            default_iframe_height: default_iframe_height(),
            diagram_language: default_diagram_language(),
            default_code_language: default_code_language(),
        }
    }
}
