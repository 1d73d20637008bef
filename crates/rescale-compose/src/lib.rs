//! Compose orchestration backend behind the autoscaler.
//!
//! Drives the external `docker` CLI for one compose project:
//!
//! 1. `compose config --services` + `compose ps --format json` to discover
//!    services and their running replica counts
//! 2. `compose ps -q SERVICE` + `stats --no-stream` to sample CPU/memory,
//!    averaged across the service's containers
//! 3. `compose up -d --no-recreate --scale SERVICE=N` to apply a new scale
//!
//! Discovery and sampling calls share a short timeout; `compose up` has its
//! own, longer one.

pub mod backend;
pub mod command;
pub mod error;
pub mod project;
pub mod stats;

pub use backend::ComposeBackend;
pub use command::DockerCli;
pub use error::{ComposeError, ComposeResult};
pub use project::ComposeProject;
