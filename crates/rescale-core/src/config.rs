//! rescale.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigResult;
use crate::policy::{parse_duration, ScalingPolicy};

/// File name looked up in the project directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "rescale.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RescaleConfig {
    pub autoscale: Option<AutoscaleSection>,
    pub backend: Option<BackendSection>,
}

/// `[autoscale]`. Every field is optional so that CLI flags and built-in
/// defaults can fill the gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoscaleSection {
    pub strategy: Option<String>,
    pub cpu_threshold: Option<f64>,
    pub mem_threshold: Option<f64>,
    pub min_replicas: Option<u32>,
    pub max_replicas: Option<u32>,
    /// "30s", "5m", or bare seconds.
    pub interval: Option<String>,
    pub services: Option<Vec<String>>,
}

/// `[backend]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSection {
    /// Path or name of the docker binary.
    pub docker: Option<String>,
    /// Upper bound for a single discovery or sampling call.
    pub command_timeout: Option<String>,
    /// Upper bound for a `compose up --scale` call.
    pub scale_timeout: Option<String>,
}

impl RescaleConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RescaleConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// The `[autoscale]` section, or an empty one.
    pub fn autoscale(&self) -> AutoscaleSection {
        self.autoscale.clone().unwrap_or_default()
    }

    /// The `[backend]` section, or an empty one.
    pub fn backend(&self) -> BackendSection {
        self.backend.clone().unwrap_or_default()
    }
}

impl AutoscaleSection {
    /// Overlay `overrides` on top of `self`. Values set in `overrides` win.
    pub fn merge(self, overrides: AutoscaleSection) -> AutoscaleSection {
        AutoscaleSection {
            strategy: overrides.strategy.or(self.strategy),
            cpu_threshold: overrides.cpu_threshold.or(self.cpu_threshold),
            mem_threshold: overrides.mem_threshold.or(self.mem_threshold),
            min_replicas: overrides.min_replicas.or(self.min_replicas),
            max_replicas: overrides.max_replicas.or(self.max_replicas),
            interval: overrides.interval.or(self.interval),
            services: match overrides.services {
                Some(services) if !services.is_empty() => Some(services),
                _ => self.services,
            },
        }
    }

    /// Resolve into a validated policy, using defaults for unset fields.
    pub fn to_policy(&self) -> ConfigResult<ScalingPolicy> {
        let defaults = ScalingPolicy::default();
        let strategy = match &self.strategy {
            Some(name) => name.parse()?,
            None => defaults.strategy,
        };
        let tick_interval = match &self.interval {
            Some(interval) => parse_duration(interval)?,
            None => defaults.tick_interval,
        };

        let policy = ScalingPolicy {
            strategy,
            cpu_threshold: self.cpu_threshold.unwrap_or(defaults.cpu_threshold),
            mem_threshold: self.mem_threshold.unwrap_or(defaults.mem_threshold),
            min_replicas: self.min_replicas.unwrap_or(defaults.min_replicas),
            max_replicas: self.max_replicas.unwrap_or(defaults.max_replicas),
            tick_interval,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Target services; empty means every discovered service.
    pub fn service_names(&self) -> Vec<String> {
        self.services.clone().unwrap_or_default()
    }
}

impl BackendSection {
    pub fn merge(self, overrides: BackendSection) -> BackendSection {
        BackendSection {
            docker: overrides.docker.or(self.docker),
            command_timeout: overrides.command_timeout.or(self.command_timeout),
            scale_timeout: overrides.scale_timeout.or(self.scale_timeout),
        }
    }

    pub fn command_timeout(&self) -> ConfigResult<Option<Duration>> {
        self.command_timeout.as_deref().map(parse_duration).transpose()
    }

    pub fn scale_timeout(&self) -> ConfigResult<Option<Duration>> {
        self.scale_timeout.as_deref().map(parse_duration).transpose()
    }
}
