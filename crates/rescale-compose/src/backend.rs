//! Discovery, sampling and scaling for one compose project.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info};

use rescale_autoscale::{ActuateError, Actuator, BoxFuture, MetricsSampler, SampleError};
use rescale_core::{ServiceScaleState, UtilizationSample};

use crate::command::DockerCli;
use crate::error::{ComposeError, ComposeResult};
use crate::project::ComposeProject;
use crate::stats::{average_utilization, parse_lines, parse_ps_output, parse_stats_lines, running_counts};

/// Talks to one compose project through the docker CLI.
#[derive(Debug, Clone)]
pub struct ComposeBackend {
    docker: DockerCli,
    project: ComposeProject,
    /// Bound for `compose up`, which may create containers or pull images.
    scale_timeout: Duration,
}

impl ComposeBackend {
    pub const DEFAULT_SCALE_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(docker: DockerCli, project: ComposeProject) -> Self {
        Self {
            docker,
            project,
            scale_timeout: Self::DEFAULT_SCALE_TIMEOUT,
        }
    }

    pub fn with_scale_timeout(mut self, timeout: Duration) -> Self {
        self.scale_timeout = timeout;
        self
    }

    pub fn docker(&self) -> &DockerCli {
        &self.docker
    }

    pub fn scale_timeout(&self) -> Duration {
        self.scale_timeout
    }

    /// Services declared in the project, in declaration order.
    pub async fn services(&self) -> ComposeResult<Vec<String>> {
        let out = self.compose(&["config", "--services"]).await?;
        Ok(parse_lines(&out))
    }

    /// Every declared service with its number of running containers.
    pub async fn discover(&self) -> ComposeResult<Vec<ServiceScaleState>> {
        let services = self.services().await?;
        let ps = self.compose(&["ps", "--format", "json"]).await?;
        let counts = running_counts(&parse_ps_output(&ps)?);

        let states: Vec<ServiceScaleState> = services
            .into_iter()
            .map(|service| {
                let scale = counts.get(&service).copied().unwrap_or(0);
                ServiceScaleState::new(service, scale)
            })
            .collect();

        debug!(services = states.len(), "discovered compose services");
        Ok(states)
    }

    /// Running container ids of one service.
    pub async fn container_ids(&self, service: &str) -> ComposeResult<Vec<String>> {
        let out = self.compose(&["ps", "-q", service]).await?;
        Ok(parse_lines(&out))
    }

    /// Average utilisation across the service's running containers.
    ///
    /// A service with no running containers reports zero usage, so the
    /// control loop still pulls it back up to `min_replicas`.
    pub async fn utilization(&self, service: &str) -> ComposeResult<UtilizationSample> {
        let ids = self.container_ids(service).await?;
        if ids.is_empty() {
            debug!(%service, "no running containers");
            return Ok(UtilizationSample::new(0.0, 0.0));
        }

        let mut args = vec![
            "stats".to_string(),
            "--no-stream".to_string(),
            "--format".to_string(),
            "{{json .}}".to_string(),
        ];
        args.extend(ids);
        let out = self.docker.run(&args).await?;

        let stats = parse_stats_lines(&out)?;
        average_utilization(&stats).ok_or_else(|| {
            ComposeError::Parse(format!("no readable stats for {service}"))
        })
    }

    /// Scale one service without touching its dependencies.
    pub async fn scale_service(&self, service: &str, replicas: u32) -> ComposeResult<()> {
        let mut targets = BTreeMap::new();
        targets.insert(service.to_string(), replicas);
        self.scale_services(&targets, true).await
    }

    /// Scale several services in a single `compose up`.
    ///
    /// Without `no_deps`, compose also starts services the targets depend on.
    pub async fn scale_services(
        &self,
        targets: &BTreeMap<String, u32>,
        no_deps: bool,
    ) -> ComposeResult<()> {
        if targets.is_empty() {
            return Ok(());
        }
        let mut args = self.project.compose_args();
        args.extend(scale_args(targets, no_deps));
        self.docker.run_with_timeout(&args, self.scale_timeout).await?;
        for (service, replicas) in targets {
            info!(%service, replicas, "scaled");
        }
        Ok(())
    }

    async fn compose(&self, args: &[&str]) -> ComposeResult<String> {
        self.compose_owned(args.iter().map(|a| a.to_string()).collect())
            .await
    }

    async fn compose_owned(&self, args: Vec<String>) -> ComposeResult<String> {
        let mut full = self.project.compose_args();
        full.extend(args);
        self.docker.run(&full).await
    }
}

/// `up -d --no-recreate [--no-deps] --scale a=1 … a …`
fn scale_args(targets: &BTreeMap<String, u32>, no_deps: bool) -> Vec<String> {
    let mut args = vec![
        "up".to_string(),
        "-d".to_string(),
        "--no-recreate".to_string(),
    ];
    if no_deps {
        args.push("--no-deps".to_string());
    }
    for (service, replicas) in targets {
        args.push("--scale".to_string());
        args.push(format!("{service}={replicas}"));
    }
    args.extend(targets.keys().cloned());
    args
}

impl MetricsSampler for ComposeBackend {
    fn sample<'a>(
        &'a self,
        service: &'a str,
    ) -> BoxFuture<'a, Result<UtilizationSample, SampleError>> {
        Box::pin(async move { self.utilization(service).await.map_err(SampleError::from) })
    }
}

impl Actuator for ComposeBackend {
    fn apply_scale<'a>(
        &'a self,
        service: &'a str,
        target: u32,
    ) -> BoxFuture<'a, Result<(), ActuateError>> {
        Box::pin(async move {
            self.scale_service(service, target)
                .await
                .map_err(ActuateError::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_args_single_service() {
        let targets = BTreeMap::from([("web".to_string(), 3)]);
        assert_eq!(
            scale_args(&targets, true),
            vec!["up", "-d", "--no-recreate", "--no-deps", "--scale", "web=3", "web"]
        );
    }

    #[test]
    fn scale_args_many_services_with_deps() {
        let targets = BTreeMap::from([("worker".to_string(), 0), ("api".to_string(), 2)]);
        assert_eq!(
            scale_args(&targets, false),
            vec![
                "up",
                "-d",
                "--no-recreate",
                "--scale",
                "api=2",
                "--scale",
                "worker=0",
                "api",
                "worker",
            ]
        );
    }

    #[test]
    fn compose_errors_map_to_sample_errors() {
        let err: SampleError = ComposeError::Parse("junk".to_string()).into();
        assert!(matches!(err, SampleError::Malformed(_)));

        let err: SampleError = ComposeError::Spawn {
            program: "docker".to_string(),
            reason: "not found".to_string(),
        }
        .into();
        assert!(matches!(err, SampleError::Unavailable(_)));
    }

    #[test]
    fn compose_errors_map_to_actuate_errors() {
        let err: ActuateError = ComposeError::Failed {
            command: "docker compose up".to_string(),
            code: 1,
            stderr: "no such service".to_string(),
        }
        .into();
        assert!(matches!(err, ActuateError::Rejected(msg) if msg.contains("no such service")));

        let err: ActuateError = ComposeError::Timeout {
            command: "docker compose up".to_string(),
            timeout: std::time::Duration::from_secs(1),
        }
        .into();
        assert!(matches!(err, ActuateError::Timeout(_)));
    }
}
