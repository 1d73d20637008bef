//! Utilisation-driven replica scaling.
//!
//! A [`ControlLoop`] periodically samples every tracked service through a
//! [`MetricsSampler`], asks the strategy engine for a desired replica
//! count, clamps it to the policy bounds, and hands changed targets to an
//! [`Actuator`].
//!
//! # Strategies
//!
//! ```text
//! balanced:     cpu > T || mem > T              → n + 1
//!               cpu < 0.7T && mem < 0.7T && n > min → n - 1
//!
//! performance:  cpu > T || mem > T              → floor(n * 1.5)
//!               cpu < 0.5T && mem < 0.5T && n > min → n - 1
//!
//! efficiency:   cpu > 1.2T || mem > 1.2T        → n + 1
//!               cpu < T || (mem < T && n > min) → floor(n * 0.75)
//! ```
//!
//! The result is always clamped to `[min_replicas, max_replicas]`, and the
//! actuator is only called when the clamped value differs from the current
//! scale.

pub mod backend;
pub mod bounds;
pub mod controller;
pub mod strategy;

pub use backend::{ActuateError, Actuator, BoxFuture, MetricsSampler, SampleError};
pub use bounds::clamp;
pub use controller::{resolve_targets, ControlLoop, EventCallback, LoopEvent, LoopState};
pub use strategy::decide;
