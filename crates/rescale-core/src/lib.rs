pub mod config;
pub mod error;
pub mod policy;
pub mod specifier;
pub mod types;

pub use config::{AutoscaleSection, BackendSection, RescaleConfig};
pub use error::{ConfigError, ConfigResult};
pub use policy::{parse_duration, ScalingPolicy, Strategy};
pub use specifier::parse_scale_specifiers;
pub use types::*;
