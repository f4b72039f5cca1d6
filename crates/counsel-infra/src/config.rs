//! Global configuration loader for Counsel.
//!
//! Reads `config.toml` from the data directory (`~/.counsel/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use counsel_types::config::{GlobalConfig, TURN_TIMEOUT_FLOOR_MS};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "COUNSEL_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `COUNSEL_DATA_DIR` environment variable
/// 2. `~/.counsel`
pub fn resolve_data_dir() -> PathBuf {
    data_dir_from(std::env::var(DATA_DIR_ENV).ok())
}

fn data_dir_from(env_value: Option<String>) -> PathBuf {
    if let Some(dir) = env_value.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".counsel");
    }

    // Last resort: current directory
    PathBuf::from(".counsel")
}

/// SQLite URL for the database file inside `data_dir`.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join("counsel.db").display())
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file parses, returns it with the turn timeout raised to its floor.
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
        Ok(config) => enforce_floors(config),
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Raise values below their minimum, logging each adjustment.
pub fn enforce_floors(mut config: GlobalConfig) -> GlobalConfig {
    if config.turn_timeout_ms < TURN_TIMEOUT_FLOOR_MS {
        tracing::warn!(
            configured = config.turn_timeout_ms,
            floor = TURN_TIMEOUT_FLOOR_MS,
            "turn_timeout_ms below minimum, raising"
        );
        config.turn_timeout_ms = TURN_TIMEOUT_FLOOR_MS;
    }
    if config.default_owner_id.trim().is_empty() {
        tracing::warn!("default_owner_id is empty, using 'default_user'");
        config.default_owner_id = GlobalConfig::default().default_owner_id;
    }
    config
}
