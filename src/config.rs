//! Node configuration
//!
//! Defaults match a bridge running on the same host. A few values can be
//! overridden from the environment.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::gateway::{ModeCheck, TakeoffTimings};
use crate::sdk::BridgeConfig;

/// Bridge address, e.g. "192.168.1.20:9090"
pub const ENV_BRIDGE_ADDR: &str = "PILOT_BRIDGE_ADDR";
/// "strict" or "permissive"
pub const ENV_MODE_CHECK: &str = "PILOT_MODE_CHECK";
/// Service call timeout in milliseconds
pub const ENV_SERVICE_TIMEOUT_MS: &str = "PILOT_SERVICE_TIMEOUT_MS";

#[derive(Debug, Clone, Default)]
pub struct PilotConfig {
    pub bridge: BridgeConfig,
    pub takeoff: TakeoffTimings,
    pub mode_check: ModeCheck,
}

impl PilotConfig {
    /// Defaults overridden by any `PILOT_*` variables that are set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(address) = lookup(ENV_BRIDGE_ADDR) {
            config.bridge.address = address;
        }

        if let Some(check) = lookup(ENV_MODE_CHECK) {
            config.mode_check = check
                .parse()
                .with_context(|| format!("invalid {}", ENV_MODE_CHECK))?;
        }

        if let Some(ms) = lookup(ENV_SERVICE_TIMEOUT_MS) {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("invalid {}: '{}'", ENV_SERVICE_TIMEOUT_MS, ms))?;
            config.bridge.service_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}
