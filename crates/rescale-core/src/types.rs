//! Shared types used across rescale crates.

use serde::{Deserialize, Serialize};

/// Name of a service as declared in the compose project.
pub type ServiceName = String;

/// Resource utilisation of one service, sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationSample {
    pub cpu_percent: f64,
    pub mem_percent: f64,
}

impl UtilizationSample {
    pub fn new(cpu_percent: f64, mem_percent: f64) -> Self {
        Self {
            cpu_percent,
            mem_percent,
        }
    }
}

/// Last known replica count of a monitored service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceScaleState {
    pub service: ServiceName,
    pub current_scale: u32,
}

impl ServiceScaleState {
    pub fn new(service: impl Into<ServiceName>, current_scale: u32) -> Self {
        Self {
            service: service.into(),
            current_scale,
        }
    }
}

/// Outcome of evaluating one service during one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingDecision {
    pub service: ServiceName,
    pub previous_scale: u32,
    /// Clamped target scale.
    pub target_scale: u32,
    /// Whether the backend accepted the new scale.
    pub applied: bool,
}

impl ScalingDecision {
    pub fn changed(&self) -> bool {
        self.previous_scale != self.target_scale
    }
}
