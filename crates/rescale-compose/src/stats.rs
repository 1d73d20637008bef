//! Parsers for `docker stats` and `docker compose ps` JSON output.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use rescale_core::UtilizationSample;

use crate::error::{ComposeError, ComposeResult};

/// One line of `docker stats --no-stream --format '{{json .}}'`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerStats {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "CPUPerc")]
    pub cpu_perc: String,
    #[serde(rename = "MemPerc")]
    pub mem_perc: String,
}

/// One container entry of `docker compose ps --format json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PsEntry {
    #[serde(rename = "Service")]
    pub service: String,
    #[serde(rename = "State", default)]
    pub state: String,
}

impl PsEntry {
    pub fn is_running(&self) -> bool {
        self.state.eq_ignore_ascii_case("running")
    }
}

/// Parse a percentage such as `"12.5%"` or `"--"`.
pub fn parse_percent(s: &str) -> Option<f64> {
    let value = s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Parse newline-delimited stats objects. Blank lines are ignored.
pub fn parse_stats_lines(output: &str) -> ComposeResult<Vec<ContainerStats>> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str::<ContainerStats>(line)
                .map_err(|e| ComposeError::Parse(format!("stats line {line:?}: {e}")))
        })
        .collect()
}

/// Average CPU and memory across containers.
///
/// Containers whose percentages cannot be parsed (e.g. `--` while a
/// container is starting) are skipped. Returns `None` when nothing usable
/// remains.
pub fn average_utilization(stats: &[ContainerStats]) -> Option<UtilizationSample> {
    let readings: Vec<(f64, f64)> = stats
        .iter()
        .filter_map(|s| match (parse_percent(&s.cpu_perc), parse_percent(&s.mem_perc)) {
            (Some(cpu), Some(mem)) => Some((cpu, mem)),
            _ => {
                debug!(container = %s.name, id = %s.id, "skipping unreadable stats");
                None
            }
        })
        .collect();

    if readings.is_empty() {
        return None;
    }

    let n = readings.len() as f64;
    let (cpu, mem) = readings
        .iter()
        .fold((0.0, 0.0), |(c, m), (cpu, mem)| (c + cpu, m + mem));
    Some(UtilizationSample::new(cpu / n, mem / n))
}

/// Parse `compose ps --format json`.
///
/// Older compose releases print a single JSON array, newer ones print one
/// object per line; both are accepted.
pub fn parse_ps_output(output: &str) -> ComposeResult<Vec<PsEntry>> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|e| ComposeError::Parse(format!("ps output: {e}")));
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str::<PsEntry>(line)
                .map_err(|e| ComposeError::Parse(format!("ps line {line:?}: {e}")))
        })
        .collect()
}

/// Running containers per service.
pub fn running_counts(entries: &[PsEntry]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.is_running()) {
        *counts.entry(entry.service.clone()).or_insert(0) += 1;
    }
    counts
}

/// Non-empty, trimmed lines (service names, container ids).
pub fn parse_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
