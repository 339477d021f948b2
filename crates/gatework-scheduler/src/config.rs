//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a periodic job scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Capacity of the control channel used by settle calls.
    #[serde(default = "default_control_buffer")]
    pub control_buffer: usize,
}

fn default_control_buffer() -> usize {
    8
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            control_buffer: default_control_buffer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.control_buffer, 8);
    }

    #[test]
    fn test_config_serialization() {
        let config = SchedulerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SchedulerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.control_buffer, config.control_buffer);
    }
}
