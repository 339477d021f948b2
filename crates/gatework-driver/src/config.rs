//! Driver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration shared by the signal drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Capacity of each job's signal channel.
    #[serde(default = "default_signal_buffer")]
    pub signal_buffer: usize,

    /// Interval between constraint probe observations, in milliseconds.
    #[serde(default = "default_constraint_poll_ms")]
    pub constraint_poll_ms: u64,
}

fn default_signal_buffer() -> usize {
    64
}

fn default_constraint_poll_ms() -> u64 {
    1_000
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            signal_buffer: default_signal_buffer(),
            constraint_poll_ms: default_constraint_poll_ms(),
        }
    }
}

impl DriverConfig {
    /// Get the constraint poll interval as a Duration.
    ///
    /// Floored at one millisecond; tokio intervals panic on a zero
    /// period.
    pub fn constraint_poll(&self) -> Duration {
        Duration::from_millis(self.constraint_poll_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.signal_buffer, 64);
        assert_eq!(config.constraint_poll_ms, 1_000);
    }

    #[test]
    fn test_constraint_poll() {
        let config = DriverConfig {
            signal_buffer: 8,
            constraint_poll_ms: 250,
        };
        assert_eq!(config.constraint_poll(), Duration::from_millis(250));
    }

    #[test]
    fn test_zero_poll_interval_is_floored() {
        let config = DriverConfig {
            signal_buffer: 8,
            constraint_poll_ms: 0,
        };
        assert_eq!(config.constraint_poll(), Duration::from_millis(1));
    }

    #[test]
    fn test_config_serialization() {
        let config = DriverConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DriverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.signal_buffer, config.signal_buffer);
    }
}
