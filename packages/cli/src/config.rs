use folio_parser::ParseOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Folio configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing documents
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Document file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Defaults applied when payload fields are missing
    #[serde(default)]
    pub parse: ParseOptions,
}

fn default_src_dir() -> String {
    ".".to_string()
}

fn default_extension() -> String {
    "md".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to source directory
    pub fn get_src_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.src_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            extension: default_extension(),
            parse: ParseOptions::default(),
        }
    }
}
