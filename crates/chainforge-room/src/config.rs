//! Registry and sweep configuration.

use std::time::Duration;

use chainforge_protocol::BoardConfig;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SweepConfig
// ---------------------------------------------------------------------------

/// When the registry looks for empty rooms to drop.
///
/// Rooms are also swept after every departure, so the periodic sweep only
/// catches rooms that emptied some other way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Time between sweeps. `Duration::ZERO` disables the periodic sweep.
    pub interval: Duration,
    /// Upper bound of a random delay added before the first sweep.
    pub initial_jitter: Duration,
}

impl SweepConfig {
    pub fn every(interval: Duration) -> Self {
        Self { interval, ..Default::default() }
    }

    pub fn disabled() -> Self {
        Self { interval: Duration::ZERO, initial_jitter: Duration::ZERO }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            initial_jitter: Duration::from_millis(500),
        }
    }
}

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room in one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Board used when a join creates a room without naming dimensions.
    pub default_board: BoardConfig,
    /// Seats per room. Spectators do not count.
    pub max_active_players: usize,
    pub sweep: SweepConfig,
    /// Capacity of the actor's command channel.
    pub channel_size: usize,
}

impl RegistryConfig {
    pub const DEFAULT_MAX_ACTIVE_PLAYERS: usize = 10;

    /// Fixes out-of-range values: a room needs at least two seats and the
    /// command channel at least one slot.
    pub fn validated(mut self) -> Self {
        self.default_board = self.default_board.validated();
        if self.max_active_players < 2 {
            tracing::warn!(
                max_active_players = self.max_active_players,
                "max_active_players below 2, raising"
            );
            self.max_active_players = 2;
        }
        if self.channel_size == 0 {
            tracing::warn!("channel_size of 0, using 1");
            self.channel_size = 1;
        }
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_board: BoardConfig::default(),
            max_active_players: Self::DEFAULT_MAX_ACTIVE_PLAYERS,
            sweep: SweepConfig::default(),
            channel_size: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config_default() {
        let config = RegistryConfig::default();
        assert_eq!(config.max_active_players, 10);
        assert_eq!((config.default_board.rows, config.default_board.cols), (6, 10));
        assert_eq!(config.sweep.interval, Duration::from_secs(60));
        assert_eq!(config.channel_size, 64);
    }

    #[test]
    fn test_validated_raises_floor_values() {
        let config = RegistryConfig {
            default_board: BoardConfig::new(0, 99),
            max_active_players: 1,
            channel_size: 0,
            ..Default::default()
        }
        .validated();
        assert_eq!(config.max_active_players, 2);
        assert_eq!(config.channel_size, 1);
        assert_eq!(config.default_board, BoardConfig::new(2, 32));
    }

    #[test]
    fn test_sweep_constructors() {
        assert!(SweepConfig::disabled().interval.is_zero());
        let every = SweepConfig::every(Duration::from_secs(5));
        assert_eq!(every.interval, Duration::from_secs(5));
        assert_eq!(every.initial_jitter, SweepConfig::default().initial_jitter);
    }
}
