use serde::{Deserialize, Serialize};

pub const DEFAULT_SEND_RATE: u32 = 16;
pub const DEFAULT_TICK_RATE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicationConfig {
    /// Snapshots per second sent by the owner.
    pub send_rate: u32,
    /// Local simulation frames per second.
    pub tick_rate: u32,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            send_rate: DEFAULT_SEND_RATE,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

impl ReplicationConfig {
    /// Nominal time between two snapshots, used as the interpolation window.
    pub fn snapshot_interval(&self) -> f64 {
        1.0 / self.send_rate.max(1) as f64
    }

    pub fn tick_interval(&self) -> f64 {
        1.0 / self.tick_rate.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval() {
        let config = ReplicationConfig::default();
        assert_eq!(config.snapshot_interval(), 0.0625);
    }

    #[test]
    fn zero_rate_does_not_divide_by_zero() {
        let config = ReplicationConfig {
            send_rate: 0,
            tick_rate: 0,
        };
        assert_eq!(config.snapshot_interval(), 1.0);
        assert_eq!(config.tick_interval(), 1.0);
    }
}
