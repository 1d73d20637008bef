//! Collaborator interfaces consumed by the control loop.
//!
//! The loop never talks to the orchestrator directly. It reads utilisation
//! through a [`MetricsSampler`] and writes replica counts through an
//! [`Actuator`]; both are injected as trait objects.

use std::time::Duration;

use thiserror::Error;

use rescale_core::UtilizationSample;

pub type BoxFuture<'a, T> =
    std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Why a utilisation sample could not be taken.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("service not found: {0}")]
    NotFound(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed metrics: {0}")]
    Malformed(String),
}

/// Why the backend did not apply a new scale.
#[derive(Debug, Error)]
pub enum ActuateError {
    #[error("scale request rejected: {0}")]
    Rejected(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Supplies current resource utilisation for a named service.
///
/// Implementations must bound their own latency and report a
/// [`SampleError::Timeout`] instead of blocking indefinitely. A single call
/// covers every replica of the service; if only some replicas can be read
/// the implementation decides whether the remainder is representative.
pub trait MetricsSampler: Send + Sync {
    fn sample<'a>(
        &'a self,
        service: &'a str,
    ) -> BoxFuture<'a, Result<UtilizationSample, SampleError>>;
}

/// Applies a target replica count to a named service.
pub trait Actuator: Send + Sync {
    fn apply_scale<'a>(
        &'a self,
        service: &'a str,
        target: u32,
    ) -> BoxFuture<'a, Result<(), ActuateError>>;
}
