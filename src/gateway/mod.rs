//! Authority and task gateway
//!
//! Synchronous requests to the autopilot services: control authority, arming,
//! version query, and the takeoff / land / go-home mission tasks. Rejections
//! are logged and returned; nothing is retried here.

mod takeoff;

pub use takeoff::{ModeCheck, TakeoffPhase, TakeoffTimings};

use pilot_shared::DroneTask;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::PilotError;
use crate::sdk::{DroneVersion, FlightSdk};
use crate::telemetry::TelemetryCache;

pub struct Gateway {
    sdk: Arc<dyn FlightSdk>,
    telemetry: Arc<TelemetryCache>,
    timings: TakeoffTimings,
    mode_check: ModeCheck,
}

impl Gateway {
    pub fn new(
        sdk: Arc<dyn FlightSdk>,
        telemetry: Arc<TelemetryCache>,
        timings: TakeoffTimings,
        mode_check: ModeCheck,
    ) -> Self {
        Self {
            sdk,
            telemetry,
            timings,
            mode_check,
        }
    }

    /// Request control authority over the aircraft
    pub async fn obtain_control(&self) -> Result<(), PilotError> {
        let granted = self.sdk.sdk_control_authority(true).await;
        self.expect_success("obtain control", "authority denied", granted)?;
        info!("[GATEWAY] Control authority obtained");
        Ok(())
    }

    /// Hand control authority back to the remote controller
    pub async fn release_control(&self) -> Result<(), PilotError> {
        let released = self.sdk.sdk_control_authority(false).await;
        self.expect_success("release control", "authority release refused", released)?;
        info!("[GATEWAY] Control authority released");
        Ok(())
    }

    pub async fn arm(&self) -> Result<(), PilotError> {
        let armed = self.sdk.drone_arm_control(true).await;
        self.expect_success("arm", "arming refused", armed)
    }

    pub async fn disarm(&self) -> Result<(), PilotError> {
        let disarmed = self.sdk.drone_arm_control(false).await;
        self.expect_success("disarm", "disarming refused", disarmed)
    }

    pub async fn query_version(&self) -> Result<DroneVersion, PilotError> {
        match self.sdk.query_drone_version().await {
            Ok(version) => {
                info!(
                    "[GATEWAY] Autopilot {} firmware {:#010x}",
                    version.hardware, version.version
                );
                Ok(version)
            }
            Err(e) => {
                error!("[GATEWAY] Version query failed: {}", e);
                Err(PilotError::Sdk(e))
            }
        }
    }

    pub async fn land(&self) -> Result<(), PilotError> {
        self.request_task(DroneTask::Land, "land").await
    }

    pub async fn go_home(&self) -> Result<(), PilotError> {
        self.request_task(DroneTask::GoHome, "go home").await
    }

    async fn request_task(&self, task: DroneTask, operation: &'static str) -> Result<(), PilotError> {
        info!("[GATEWAY] Requesting task {}", task);
        let accepted = self.sdk.drone_task_control(task).await;
        self.expect_success(operation, &format!("task {} refused", task), accepted)
    }

    /// Map a service outcome onto the pilot error taxonomy, logging failures
    fn expect_success(
        &self,
        operation: &'static str,
        reason: &str,
        outcome: anyhow::Result<bool>,
    ) -> Result<(), PilotError> {
        match outcome {
            Ok(true) => Ok(()),
            Ok(false) => {
                error!("[GATEWAY] {} failed: {}", operation, reason);
                Err(PilotError::Rejected {
                    operation,
                    reason: reason.to_string(),
                })
            }
            Err(e) => {
                error!("[GATEWAY] {} failed: {}", operation, e);
                Err(PilotError::Sdk(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::fake::{FakeSdk, SdkCall};

    fn gateway(sdk: Arc<FakeSdk>) -> Gateway {
        Gateway::new(
            sdk,
            Arc::new(TelemetryCache::new()),
            TakeoffTimings::default(),
            ModeCheck::default(),
        )
    }

    #[tokio::test]
    async fn test_obtain_control() {
        let sdk = Arc::new(FakeSdk::accepting());
        assert!(gateway(sdk.clone()).obtain_control().await.is_ok());
        assert_eq!(sdk.calls(), vec![SdkCall::ControlAuthority(true)]);

        let sdk = Arc::new(FakeSdk {
            authority: false,
            ..FakeSdk::accepting()
        });
        let err = gateway(sdk.clone()).obtain_control().await.unwrap_err();
        assert!(matches!(err, PilotError::Rejected { operation: "obtain control", .. }));
        assert_eq!(sdk.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_release_control() {
        let sdk = Arc::new(FakeSdk::accepting());
        assert!(gateway(sdk.clone()).release_control().await.is_ok());
        assert_eq!(sdk.calls(), vec![SdkCall::ControlAuthority(false)]);
    }

    #[tokio::test]
    async fn test_land() {
        let sdk = Arc::new(FakeSdk::accepting());
        assert!(gateway(sdk.clone()).land().await.is_ok());
        assert_eq!(sdk.calls(), vec![SdkCall::TaskControl(DroneTask::Land)]);

        let sdk = Arc::new(FakeSdk {
            land: false,
            ..FakeSdk::accepting()
        });
        let err = gateway(sdk.clone()).land().await.unwrap_err();
        assert!(matches!(err, PilotError::Rejected { operation: "land", .. }));
        // No retry
        assert_eq!(sdk.calls(), vec![SdkCall::TaskControl(DroneTask::Land)]);
    }

    #[tokio::test]
    async fn test_go_home() {
        let sdk = Arc::new(FakeSdk::accepting());
        assert!(gateway(sdk.clone()).go_home().await.is_ok());
        assert_eq!(sdk.calls(), vec![SdkCall::TaskControl(DroneTask::GoHome)]);
    }

    #[tokio::test]
    async fn test_arm_and_disarm() {
        let sdk = Arc::new(FakeSdk::accepting());
        let gw = gateway(sdk.clone());
        assert!(gw.arm().await.is_ok());
        assert!(gw.disarm().await.is_ok());
        assert_eq!(
            sdk.calls(),
            vec![SdkCall::ArmControl(true), SdkCall::ArmControl(false)]
        );

        let sdk = Arc::new(FakeSdk {
            arm: false,
            ..FakeSdk::accepting()
        });
        assert!(matches!(
            gateway(sdk).arm().await,
            Err(PilotError::Rejected { operation: "arm", .. })
        ));
    }

    #[tokio::test]
    async fn test_query_version() {
        let sdk = Arc::new(FakeSdk::accepting());
        let version = gateway(sdk).query_version().await.unwrap();
        assert_eq!(version.hardware, "M100");
    }
}
