//! Global configuration types for Stackplan.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! plan save debounce window, the catalog source, and the default account.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.stackplan/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Quiet period after the last plan mutation before a save is issued.
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,

    /// YAML catalog replacing the built-in one.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Account used when none is given on the command line.
    #[serde(default = "default_account")]
    pub default_account: String,
}

fn default_save_debounce_ms() -> u64 {
    1_000
}

fn default_account() -> String {
    "local".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: default_save_debounce_ms(),
            catalog_path: None,
            default_account: default_account(),
        }
    }
}
