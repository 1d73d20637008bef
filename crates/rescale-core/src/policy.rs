//! Scaling policy: the immutable parameters of one control-loop run.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// How aggressively the autoscaler moves in each direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Moderate steps of one replica in both directions. Default.
    #[default]
    Balanced,
    /// Scale up by half again, scale down only when usage is very low.
    Performance,
    /// Scale up only under heavy load, scale down by a quarter.
    Efficiency,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::Balanced,
        Strategy::Performance,
        Strategy::Efficiency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::Performance => "performance",
            Strategy::Efficiency => "efficiency",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "balanced" => Ok(Strategy::Balanced),
            "performance" => Ok(Strategy::Performance),
            "efficiency" => Ok(Strategy::Efficiency),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Parameters for a single autoscaling run.
///
/// Built once at startup from CLI flags and `rescale.toml`, then shared
/// read-only with the control loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingPolicy {
    pub strategy: Strategy,
    /// CPU utilisation threshold, in percent.
    pub cpu_threshold: f64,
    /// Memory utilisation threshold, in percent.
    pub mem_threshold: f64,
    pub min_replicas: u32,
    pub max_replicas: u32,
    /// Pause between two ticks.
    pub tick_interval: Duration,
}

impl ScalingPolicy {
    pub const DEFAULT_THRESHOLD: f64 = 70.0;
    pub const DEFAULT_MIN_REPLICAS: u32 = 1;
    pub const DEFAULT_MAX_REPLICAS: u32 = 10;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    /// Check the invariants the control loop relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_replicas > self.max_replicas {
            return Err(ConfigError::InvalidBounds {
                min: self.min_replicas,
                max: self.max_replicas,
            });
        }
        for (name, value) in [("cpu", self.cpu_threshold), ("memory", self.mem_threshold)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}

impl Default for ScalingPolicy {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            cpu_threshold: Self::DEFAULT_THRESHOLD,
            mem_threshold: Self::DEFAULT_THRESHOLD,
            min_replicas: Self::DEFAULT_MIN_REPLICAS,
            max_replicas: Self::DEFAULT_MAX_REPLICAS,
            tick_interval: Self::DEFAULT_INTERVAL,
        }
    }
}

/// Parse a duration string like "250ms", "30s", "5m", or bare seconds.
pub fn parse_duration(s: &str) -> ConfigResult<Duration> {
    let s = s.trim();
    let invalid = || ConfigError::InvalidDuration(s.to_string());

    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim().parse::<u64>().map(Duration::from_millis).map_err(|_| invalid())
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| invalid())
    } else if let Some(mins) = s.strip_suffix('m') {
        let mins = mins.trim().parse::<u64>().map_err(|_| invalid())?;
        mins.checked_mul(60).map(Duration::from_secs).ok_or_else(invalid)
    } else {
        s.parse::<u64>().map(Duration::from_secs).map_err(|_| invalid())
    }
}
