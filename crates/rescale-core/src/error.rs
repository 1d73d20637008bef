//! Configuration errors.

use thiserror::Error;

/// Result type alias for policy and configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors detected before the control loop starts. All of them are fatal.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown scaling strategy: {0} (expected balanced, performance or efficiency)")]
    UnknownStrategy(String),

    #[error("min replicas ({min}) is greater than max replicas ({max})")]
    InvalidBounds { min: u32, max: u32 },

    #[error("invalid {name} threshold: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("tick interval must be greater than zero")]
    InvalidInterval,

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("invalid scale specifier: {0}")]
    InvalidSpecifier(String),

    #[error("invalid scale specifier: can't parse replica value as int: {0}")]
    InvalidReplicaCount(String),
}
