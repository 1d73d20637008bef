pub mod progress;
pub mod scale;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tracing::debug;

use rescale_compose::{ComposeBackend, ComposeProject, DockerCli};
use rescale_core::config::CONFIG_FILE_NAME;
use rescale_core::{BackendSection, RescaleConfig};

use crate::GlobalArgs;

/// Load rescale.toml.
///
/// An explicit `--config` must exist. Otherwise `rescale.toml` in the
/// project directory (or the working directory) is used when present.
pub fn load_config(global: &GlobalArgs) -> anyhow::Result<RescaleConfig> {
    if let Some(path) = &global.config {
        return RescaleConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()));
    }

    let candidate = default_config_path(global.project_directory.as_deref());
    if candidate.is_file() {
        debug!(path = %candidate.display(), "using project config");
        return RescaleConfig::from_file(&candidate)
            .with_context(|| format!("failed to load {}", candidate.display()));
    }

    Ok(RescaleConfig::default())
}

fn default_config_path(project_directory: Option<&Path>) -> PathBuf {
    project_directory
        .unwrap_or_else(|| Path::new("."))
        .join(CONFIG_FILE_NAME)
}

/// Build the compose backend from flags, falling back to `[backend]`.
pub fn build_backend(global: &GlobalArgs, config: &RescaleConfig) -> anyhow::Result<ComposeBackend> {
    let overrides = BackendSection {
        docker: global.docker.clone(),
        command_timeout: global.command_timeout.map(|secs| format!("{secs}s")),
        scale_timeout: global.scale_timeout.map(|secs| format!("{secs}s")),
    };
    let section = config.backend().merge(overrides);
    let timeout = section
        .command_timeout()?
        .unwrap_or(DockerCli::DEFAULT_TIMEOUT);
    if timeout == Duration::ZERO {
        anyhow::bail!("command timeout must be greater than zero");
    }
    let scale_timeout = section
        .scale_timeout()?
        .unwrap_or(ComposeBackend::DEFAULT_SCALE_TIMEOUT);
    if scale_timeout == Duration::ZERO {
        anyhow::bail!("scale timeout must be greater than zero");
    }

    let docker = DockerCli::resolve(section.docker.as_deref(), timeout);
    let project = ComposeProject {
        files: global.files.clone(),
        project_name: global.project_name.clone(),
        project_directory: global.project_directory.clone(),
    };
    let backend = ComposeBackend::new(docker, project).with_scale_timeout(scale_timeout);
    debug!(
        docker = backend.docker().program(),
        command_timeout_secs = backend.docker().timeout().as_secs_f64(),
        scale_timeout_secs = backend.scale_timeout().as_secs_f64(),
        "compose backend ready"
    );
    Ok(backend)
}
