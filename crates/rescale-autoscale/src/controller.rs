//! Periodic control loop: sample, decide, clamp, actuate.
//!
//! The loop owns the per-service scale state exclusively. Services are
//! evaluated one after another within a tick, and a tick always runs to
//! completion: cancellation is only observed at the top of a tick and
//! before the inter-tick sleep.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use rescale_core::{
    ConfigError, ScalingDecision, ScalingPolicy, ServiceName, ServiceScaleState, Strategy,
    UtilizationSample,
};

use crate::backend::{Actuator, MetricsSampler};
use crate::bounds::clamp;
use crate::strategy::decide;

/// Lifecycle of a [`ControlLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Progress reported by the loop to its event sink.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    Started {
        strategy: Strategy,
        cpu_threshold: f64,
        mem_threshold: f64,
        min_replicas: u32,
        max_replicas: u32,
        interval: Duration,
        services: Vec<ServiceName>,
    },
    /// A requested service is not part of the discovered set.
    ServiceMissing { service: ServiceName },
    Sampled {
        service: ServiceName,
        current_scale: u32,
        sample: UtilizationSample,
    },
    /// The backend accepted a new scale.
    Scaled(ScalingDecision),
    SampleFailed { service: ServiceName, error: String },
    ScaleFailed {
        service: ServiceName,
        from: u32,
        to: u32,
        error: String,
    },
    Stopped,
}

/// Sink for [`LoopEvent`]s, typically rendering them for a terminal.
pub type EventCallback = Box<dyn Fn(&LoopEvent) + Send + Sync>;

/// Pick the services to track.
///
/// With no requested names every discovered service is tracked. Otherwise
/// only requested names that were discovered are kept; the unknown ones are
/// returned separately.
pub fn resolve_targets(
    discovered: Vec<ServiceScaleState>,
    requested: &[String],
) -> (BTreeMap<ServiceName, ServiceScaleState>, Vec<ServiceName>) {
    let mut available: BTreeMap<ServiceName, ServiceScaleState> = discovered
        .into_iter()
        .map(|state| (state.service.clone(), state))
        .collect();

    if requested.is_empty() {
        return (available, Vec::new());
    }

    let mut targets = BTreeMap::new();
    let mut missing = Vec::new();
    for name in requested {
        if targets.contains_key(name) {
            continue;
        }
        match available.remove(name) {
            Some(state) => {
                targets.insert(name.clone(), state);
            }
            None => {
                if !missing.contains(name) {
                    missing.push(name.clone());
                }
            }
        }
    }
    (targets, missing)
}

/// Drives autoscaling ticks for a fixed set of services.
pub struct ControlLoop {
    policy: ScalingPolicy,
    sampler: Arc<dyn MetricsSampler>,
    actuator: Arc<dyn Actuator>,
    /// Tracked services: name → last known scale.
    states: BTreeMap<ServiceName, ServiceScaleState>,
    state: LoopState,
    on_event: Option<EventCallback>,
}

impl ControlLoop {
    pub fn new(
        policy: ScalingPolicy,
        sampler: Arc<dyn MetricsSampler>,
        actuator: Arc<dyn Actuator>,
    ) -> Self {
        Self {
            policy,
            sampler,
            actuator,
            states: BTreeMap::new(),
            state: LoopState::Stopped,
            on_event: None,
        }
    }

    /// Set the sink that receives progress events.
    pub fn with_events(mut self, callback: EventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Tracked services in name order.
    pub fn services(&self) -> impl Iterator<Item = &ServiceScaleState> {
        self.states.values()
    }

    pub fn current_scale(&self, service: &str) -> Option<u32> {
        self.states.get(service).map(|s| s.current_scale)
    }

    /// Replace the tracked set. See [`resolve_targets`].
    pub fn track(&mut self, discovered: Vec<ServiceScaleState>, requested: &[String]) {
        let (targets, missing) = resolve_targets(discovered, requested);
        for service in missing {
            warn!(%service, "requested service not found in project, skipping");
            self.emit(&LoopEvent::ServiceMissing { service });
        }
        self.states = targets;
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Returns an error only for an invalid policy, in which case no tick
    /// is ever run.
    pub async fn run(
        &mut self,
        discovered: Vec<ServiceScaleState>,
        requested: &[String],
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), ConfigError> {
        if let Err(e) = self.policy.validate() {
            error!(error = %e, "invalid scaling policy");
            return Err(e);
        }

        self.track(discovered, requested);
        self.state = LoopState::Running;

        let services: Vec<ServiceName> = self.states.keys().cloned().collect();
        info!(
            strategy = %self.policy.strategy,
            cpu_threshold = self.policy.cpu_threshold,
            mem_threshold = self.policy.mem_threshold,
            min = self.policy.min_replicas,
            max = self.policy.max_replicas,
            interval_secs = self.policy.tick_interval.as_secs_f64(),
            services = ?services,
            "autoscaler started"
        );
        if services.is_empty() {
            warn!("no services to autoscale");
        }
        self.emit(&LoopEvent::Started {
            strategy: self.policy.strategy,
            cpu_threshold: self.policy.cpu_threshold,
            mem_threshold: self.policy.mem_threshold,
            min_replicas: self.policy.min_replicas,
            max_replicas: self.policy.max_replicas,
            interval: self.policy.tick_interval,
            services,
        });

        loop {
            if is_cancelled(&shutdown) {
                break;
            }

            self.tick().await;

            if is_cancelled(&shutdown) {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.policy.tick_interval) => {}
                // Re-checked at the top of the loop.
                _ = shutdown.changed() => {}
            }
        }

        self.state = LoopState::Stopped;
        info!("autoscaler stopped");
        self.emit(&LoopEvent::Stopped);
        Ok(())
    }

    /// Evaluate every tracked service once, in name order.
    ///
    /// Returns one decision per service that could be sampled.
    pub async fn tick(&mut self) -> Vec<ScalingDecision> {
        let names: Vec<ServiceName> = self.states.keys().cloned().collect();
        let mut decisions = Vec::with_capacity(names.len());

        for service in names {
            if let Some(decision) = self.evaluate(&service).await {
                decisions.push(decision);
            }
        }

        decisions
    }

    async fn evaluate(&mut self, service: &str) -> Option<ScalingDecision> {
        let current = self.states.get(service)?.current_scale;

        let sample = match self.sampler.sample(service).await {
            Ok(sample) => sample,
            Err(e) => {
                warn!(%service, error = %e, "failed to get resource usage, skipping");
                self.emit(&LoopEvent::SampleFailed {
                    service: service.to_string(),
                    error: e.to_string(),
                });
                return None;
            }
        };

        debug!(
            %service,
            replicas = current,
            cpu = sample.cpu_percent,
            mem = sample.mem_percent,
            "sampled"
        );
        self.emit(&LoopEvent::Sampled {
            service: service.to_string(),
            current_scale: current,
            sample,
        });

        let target = clamp(decide(current, &sample, &self.policy), &self.policy);
        let mut decision = ScalingDecision {
            service: service.to_string(),
            previous_scale: current,
            target_scale: target,
            applied: false,
        };
        if !decision.changed() {
            return Some(decision);
        }

        info!(%service, from = current, to = target, "scaling");
        match self.actuator.apply_scale(service, target).await {
            Ok(()) => {
                if let Some(state) = self.states.get_mut(service) {
                    state.current_scale = target;
                }
                decision.applied = true;
                self.emit(&LoopEvent::Scaled(decision.clone()));
            }
            Err(e) => {
                warn!(%service, from = current, to = target, error = %e, "scaling action failed");
                self.emit(&LoopEvent::ScaleFailed {
                    service: service.to_string(),
                    from: current,
                    to: target,
                    error: e.to_string(),
                });
            }
        }

        Some(decision)
    }

    fn emit(&self, event: &LoopEvent) {
        if let Some(ref callback) = self.on_event {
            callback(event);
        }
    }
}

/// `true` once a stop was requested or nobody can request one any more.
fn is_cancelled(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}
