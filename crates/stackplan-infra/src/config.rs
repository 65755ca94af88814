//! Global configuration loader for Stackplan.
//!
//! Reads `config.toml` from the data directory (`~/.stackplan/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use stackplan_types::config::GlobalConfig;

/// Minimum save debounce window (safety floor).
pub const MIN_SAVE_DEBOUNCE_MS: u64 = 50;

/// Resolve the data directory.
///
/// `STACKPLAN_DATA_DIR` wins; otherwise `~/.stackplan`, or `./.stackplan`
/// when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STACKPLAN_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".stackplan")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - The debounce window is raised to [`MIN_SAVE_DEBOUNCE_MS`] if set lower.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => apply_floors(config),
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

fn apply_floors(mut config: GlobalConfig) -> GlobalConfig {
    if config.save_debounce_ms < MIN_SAVE_DEBOUNCE_MS {
        tracing::warn!(
            configured = config.save_debounce_ms,
            floor = MIN_SAVE_DEBOUNCE_MS,
            "save_debounce_ms below minimum, raising"
        );
        config.save_debounce_ms = MIN_SAVE_DEBOUNCE_MS;
    }
    config
}

/// Resolve a configured path relative to the data directory.
pub fn resolve_path(data_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.save_debounce_ms, 1_000);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.default_account, "local");
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
save_debounce_ms = 250
catalog_path = "catalog.yaml"
default_account = "alice"
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.save_debounce_ms, 250);
        assert_eq!(config.catalog_path, Some(PathBuf::from("catalog.yaml")));
        assert_eq!(config.default_account, "alice");
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.save_debounce_ms, 1_000);
    }

    #[tokio::test]
    async fn load_global_config_enforces_debounce_floor() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "save_debounce_ms = 0")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.save_debounce_ms, MIN_SAVE_DEBOUNCE_MS);
    }

    #[test]
    fn resolve_path_keeps_absolute() {
        let data_dir = Path::new("/data");
        assert_eq!(resolve_path(data_dir, Path::new("/etc/c.yaml")), PathBuf::from("/etc/c.yaml"));
        assert_eq!(resolve_path(data_dir, Path::new("c.yaml")), PathBuf::from("/data/c.yaml"));
    }
}
