//! Server configuration and its environment overrides.

use std::str::FromStr;
use std::time::Duration;

use chainforge_room::{RegistryConfig, SweepConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Address used when nothing else is configured.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Everything needed to start a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads overrides from the process environment.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `CHAINFORGE_BIND` | listen address |
    /// | `CHAINFORGE_ROWS` / `CHAINFORGE_COLS` | default board size |
    /// | `CHAINFORGE_SWEEP_SECS` | empty-room sweep interval, `0` disables |
    /// | `CHAINFORGE_MAX_PLAYERS` | seated players per room |
    ///
    /// Unset variables keep their defaults. Unparsable ones are logged and
    /// ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("CHAINFORGE_BIND") {
            let addr = addr.trim();
            if addr.is_empty() {
                warn!("CHAINFORGE_BIND is blank, keeping {}", config.bind_addr);
            } else {
                config.bind_addr = addr.to_string();
            }
        }

        let registry = &mut config.registry;
        if let Some(rows) = parse_var(&lookup, "CHAINFORGE_ROWS") {
            registry.default_board.rows = rows;
        }
        if let Some(cols) = parse_var(&lookup, "CHAINFORGE_COLS") {
            registry.default_board.cols = cols;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "CHAINFORGE_SWEEP_SECS") {
            registry.sweep = if secs == 0 {
                SweepConfig::disabled()
            } else {
                SweepConfig::every(Duration::from_secs(secs))
            };
        }
        if let Some(max) = parse_var(&lookup, "CHAINFORGE_MAX_PLAYERS") {
            registry.max_active_players = max;
        }

        config.registry = config.registry.validated();
        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}
