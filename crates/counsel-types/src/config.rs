//! Global configuration types for Counsel.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls
//! turn timing, the default owner, and the advisor seed list.

use serde::{Deserialize, Serialize};

use std::time::Duration;

use crate::advisor::Advisor;

/// Lowest per-advisor timeout a config may request.
pub const TURN_TIMEOUT_FLOOR_MS: u64 = 100;

/// Top-level configuration for Counsel.
///
/// Loaded from `~/.counsel/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Per-advisor response timeout within a turn.
    #[serde(default = "default_turn_timeout_ms")]
    pub turn_timeout_ms: u64,

    /// Artificial delay inside the rule-based responder.
    #[serde(default)]
    pub simulated_latency_ms: u64,

    /// Owner assigned to conversations created without one.
    #[serde(default = "default_owner_id")]
    pub default_owner_id: String,

    /// Seed list used when the advisor table is empty. Empty means the
    /// built-in board.
    #[serde(default)]
    pub advisors: Vec<Advisor>,
}

fn default_turn_timeout_ms() -> u64 {
    30_000
}

fn default_owner_id() -> String {
    "default_user".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            turn_timeout_ms: default_turn_timeout_ms(),
            simulated_latency_ms: 0,
            default_owner_id: default_owner_id(),
            advisors: Vec::new(),
        }
    }
}

impl GlobalConfig {
    /// The per-advisor timeout, raised to [`TURN_TIMEOUT_FLOOR_MS`] if lower.
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms.max(TURN_TIMEOUT_FLOOR_MS))
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}
