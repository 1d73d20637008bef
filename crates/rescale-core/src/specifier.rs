//! `SERVICE=REPLICAS` specifiers for manual scaling.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};
use crate::types::ServiceName;

/// Parse `SERVICE=REPLICAS` arguments into a map sorted by service name.
///
/// A service named twice keeps the last value.
pub fn parse_scale_specifiers<S: AsRef<str>>(
    args: &[S],
) -> ConfigResult<BTreeMap<ServiceName, u32>> {
    let mut replicas = BTreeMap::new();
    for arg in args {
        let arg = arg.as_ref();
        let (service, value) = arg
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidSpecifier(arg.to_string()))?;
        if service.is_empty() || value.is_empty() {
            return Err(ConfigError::InvalidSpecifier(arg.to_string()));
        }
        let count = value
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidReplicaCount(arg.to_string()))?;
        replicas.insert(service.to_string(), count);
    }
    Ok(replicas)
}
