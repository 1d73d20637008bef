//! `rescale scale`: fixed replica counts, or the autoscaling loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio::sync::watch;
use tracing::{info, warn};

use rescale_autoscale::{ControlLoop, LoopEvent};
use rescale_compose::ComposeBackend;
use rescale_core::{parse_scale_specifiers, AutoscaleSection};

use super::{build_backend, load_config, progress};
use crate::GlobalArgs;

#[derive(Args, Debug)]
pub struct ScaleArgs {
    /// SERVICE=REPLICAS pairs, or service names with --auto
    pub args: Vec<String>,
    /// Keep adjusting replica counts from CPU and memory usage
    #[arg(long)]
    pub auto: bool,
    /// Don't start linked services (manual mode)
    #[arg(long)]
    pub no_deps: bool,
    /// Scaling strategy: balanced, performance or efficiency (default: balanced)
    #[arg(long)]
    pub strategy: Option<String>,
    /// CPU threshold percentage (default: 70)
    #[arg(long)]
    pub cpu_threshold: Option<f64>,
    /// Memory threshold percentage (default: 70)
    #[arg(long)]
    pub mem_threshold: Option<f64>,
    /// Minimum replicas per service (default: 1)
    #[arg(long)]
    pub min_replicas: Option<u32>,
    /// Maximum replicas per service (default: 10)
    #[arg(long)]
    pub max_replicas: Option<u32>,
    /// Seconds between checks (default: 30)
    #[arg(long)]
    pub interval: Option<u64>,
}

impl ScaleArgs {
    /// Flags as an `[autoscale]` overlay; unset flags stay `None`.
    pub fn to_section(&self) -> AutoscaleSection {
        AutoscaleSection {
            strategy: self.strategy.clone(),
            cpu_threshold: self.cpu_threshold,
            mem_threshold: self.mem_threshold,
            min_replicas: self.min_replicas,
            max_replicas: self.max_replicas,
            interval: self.interval.map(|secs| format!("{secs}s")),
            services: Some(self.args.clone()),
        }
    }
}

pub async fn run(global: &GlobalArgs, args: ScaleArgs) -> Result<()> {
    let config = load_config(global)?;
    let backend = build_backend(global, &config)?;

    if args.auto {
        let section = config.autoscale().merge(args.to_section());
        auto_scale(backend, section).await
    } else {
        manual_scale(&backend, &args).await
    }
}

async fn manual_scale(backend: &ComposeBackend, args: &ScaleArgs) -> Result<()> {
    if args.args.is_empty() {
        bail!("manual scaling requires at least one SERVICE=REPLICAS argument");
    }
    let targets = parse_scale_specifiers(&args.args)?;

    let known = backend
        .services()
        .await
        .context("failed to list compose services")?;
    check_known(&targets, &known)?;

    backend
        .scale_services(&targets, args.no_deps)
        .await
        .context("failed to scale services")?;

    for (service, replicas) in &targets {
        println!("✓ Scaled {service} to {replicas} replicas");
    }
    Ok(())
}

fn check_known(targets: &BTreeMap<String, u32>, known: &[String]) -> Result<()> {
    match targets.keys().find(|service| !known.contains(*service)) {
        Some(service) => bail!("no such service: {service}"),
        None => Ok(()),
    }
}

async fn auto_scale(backend: ComposeBackend, section: AutoscaleSection) -> Result<()> {
    let policy = section.to_policy().context("invalid autoscale settings")?;
    let requested = section.service_names();

    let discovered = backend
        .discover()
        .await
        .context("failed to discover compose services")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, stopping after the current tick");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Without a handler the loop runs until the process is killed.
                warn!(error = %e, "failed to install Ctrl-C handler");
                std::future::pending::<()>().await;
            }
        }
    });

    let backend = Arc::new(backend);
    let mut control = ControlLoop::new(policy, backend.clone(), backend).with_events(Box::new(
        |event: &LoopEvent| {
            for line in progress::render(event) {
                println!("{line}");
            }
        },
    ));

    control.run(discovered, &requested, shutdown_rx).await?;
    Ok(())
}
