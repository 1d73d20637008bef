//! Terminal rendering of control-loop events.

use rescale_autoscale::LoopEvent;

/// Human-readable lines for one event.
pub fn render(event: &LoopEvent) -> Vec<String> {
    match event {
        LoopEvent::Started {
            strategy,
            cpu_threshold,
            mem_threshold,
            min_replicas,
            max_replicas,
            interval,
            services,
        } => vec![
            format!("Starting auto-scaling with strategy: {strategy}"),
            format!("Thresholds: CPU {cpu_threshold:.1}%, Memory {mem_threshold:.1}%"),
            format!("Replica range: {min_replicas} - {max_replicas}"),
            format!("Check interval: {} seconds", format_secs(interval.as_secs_f64())),
            format!("Auto-scaling services: [{}]", services.join(", ")),
        ],
        LoopEvent::ServiceMissing { service } => {
            vec![format!("Warning: service {service} not found in project, skipping")]
        }
        LoopEvent::Sampled {
            service,
            current_scale,
            sample,
        } => vec![format!(
            "Service: {service}, Current replicas: {current_scale}, CPU: {:.1}%, Memory: {:.1}%",
            sample.cpu_percent, sample.mem_percent
        )],
        LoopEvent::Scaled(decision) => vec![format!(
            "Scaled {} from {} to {} replicas",
            decision.service, decision.previous_scale, decision.target_scale
        )],
        LoopEvent::SampleFailed { service, error } => {
            vec![format!("Warning: Failed to get resource usage for {service}: {error}")]
        }
        LoopEvent::ScaleFailed {
            service,
            from,
            to,
            error,
        } => vec![format!(
            "Warning: Failed to scale {service} from {from} to {to}: {error}"
        )],
        LoopEvent::Stopped => vec!["Auto-scaling stopped.".to_string()],
    }
}

/// Whole seconds without a fraction, anything else with one decimal.
fn format_secs(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{secs:.0}")
    } else {
        format!("{secs:.1}")
    }
}
