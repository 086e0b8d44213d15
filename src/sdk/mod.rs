//! Flight SDK Module
//!
//! The boundary to the vendor flight SDK. Everything above this module talks
//! to the autopilot through [`FlightSdk`]; [`SdkBridge`] implements it over a
//! TCP link to the process hosting the SDK.

mod bridge;
#[cfg(test)]
pub(crate) mod fake;

pub use bridge::{BridgeConfig, NotificationReceiver, SdkBridge};

use anyhow::Result;
use async_trait::async_trait;
use pilot_shared::DroneTask;

use crate::command::CommandVector;

/// Firmware identification returned by the version query service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroneVersion {
    pub version: u32,
    pub hardware: String,
}

/// Autopilot services and the setpoint channel
///
/// Service methods return the service's own `result` flag; `Err` means the
/// call itself did not complete.
#[async_trait]
pub trait FlightSdk: Send + Sync {
    /// Publish one generic setpoint. Best effort, no acknowledgment.
    async fn publish_setpoint(&self, command: CommandVector) -> Result<()>;

    async fn sdk_control_authority(&self, enable: bool) -> Result<bool>;

    async fn drone_task_control(&self, task: DroneTask) -> Result<bool>;

    async fn drone_arm_control(&self, arm: bool) -> Result<bool>;

    async fn query_drone_version(&self) -> Result<DroneVersion>;

    /// Latch the current position as the local frame origin
    async fn set_local_pos_ref(&self) -> Result<bool>;
}
