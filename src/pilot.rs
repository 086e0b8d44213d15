//! Pilot facade
//!
//! Single entry point for callers: owns the telemetry cache and the task that
//! feeds it, and forwards commands to the dispatcher and the gateway.

use nalgebra::Vector3;
use pilot_shared::{DisplayMode, FlightStatus};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::abort::AbortSignal;
use crate::command::CommandDispatcher;
use crate::config::PilotConfig;
use crate::error::PilotError;
use crate::gateway::Gateway;
use crate::sdk::{DroneVersion, FlightSdk, NotificationReceiver};
use crate::telemetry::{
    sample_from_notification, EulerAngles, GpsFix, ImuSample, TelemetryCache,
};

pub struct Pilot {
    telemetry: Arc<TelemetryCache>,
    commands: CommandDispatcher,
    gateway: Gateway,
    /// Drains the notification stream into `telemetry`; aborted on drop
    subscription: JoinHandle<()>,
}

impl Pilot {
    /// Wire a pilot to an SDK and the notification stream belonging to it
    pub fn new(
        sdk: Arc<dyn FlightSdk>,
        notifications: NotificationReceiver,
        config: &PilotConfig,
    ) -> Self {
        let telemetry = Arc::new(TelemetryCache::new());
        let subscription = tokio::spawn(feed_telemetry(notifications, telemetry.clone()));

        Self {
            commands: CommandDispatcher::new(sdk.clone()),
            gateway: Gateway::new(sdk, telemetry.clone(), config.takeoff, config.mode_check),
            telemetry,
            subscription,
        }
    }

    pub async fn obtain_control(&self) -> Result<(), PilotError> {
        self.gateway.obtain_control().await
    }

    pub async fn release_control(&self) -> Result<(), PilotError> {
        self.gateway.release_control().await
    }

    pub async fn arm(&self) -> Result<(), PilotError> {
        self.gateway.arm().await
    }

    pub async fn disarm(&self) -> Result<(), PilotError> {
        self.gateway.disarm().await
    }

    pub async fn query_version(&self) -> Result<DroneVersion, PilotError> {
        self.gateway.query_version().await
    }

    /// Take off and wait until the aircraft has settled in the air
    pub async fn takeoff(&self) -> Result<(), PilotError> {
        self.gateway.takeoff(AbortSignal::never()).await
    }

    /// [`Pilot::takeoff`] that gives up as soon as `abort` fires
    pub async fn takeoff_with_abort(&self, abort: AbortSignal) -> Result<(), PilotError> {
        self.gateway.takeoff(abort).await
    }

    pub async fn land(&self) -> Result<(), PilotError> {
        self.gateway.land().await
    }

    pub async fn go_home(&self) -> Result<(), PilotError> {
        self.gateway.go_home().await
    }

    pub async fn set_horizontal_position(&self, x: f32, y: f32) {
        self.commands.set_horizontal_position(x, y).await;
    }

    pub async fn set_horizontal_velocity(&self, vx: f32, vy: f32) {
        self.commands.set_horizontal_velocity(vx, vy).await;
    }

    pub async fn set_vertical_position(&self, h: f32) {
        self.commands.set_vertical_position(h).await;
    }

    pub async fn set_vertical_velocity(&self, v: f32) {
        self.commands.set_vertical_velocity(v).await;
    }

    pub async fn set_yaw(&self, yaw: f32) {
        self.commands.set_yaw(yaw).await;
    }

    pub async fn attitude(&self) -> EulerAngles {
        self.telemetry.attitude().await
    }

    pub async fn gps_position(&self) -> GpsFix {
        self.telemetry.gps().await
    }

    /// Local position relative to the origin latched at takeoff
    pub async fn position(&self) -> Vector3<f64> {
        self.telemetry.local_position().await
    }

    pub async fn imu(&self) -> ImuSample {
        self.telemetry.imu().await
    }

    pub async fn linear_acceleration(&self) -> Vector3<f64> {
        self.telemetry.linear_acceleration().await
    }

    pub async fn angular_velocity(&self) -> Vector3<f64> {
        self.telemetry.angular_velocity().await
    }

    pub async fn velocity(&self) -> Vector3<f64> {
        self.telemetry.velocity().await
    }

    pub async fn height(&self) -> f32 {
        self.telemetry.height().await
    }

    pub async fn flight_status(&self) -> FlightStatus {
        self.telemetry.flight_status().await
    }

    pub async fn display_mode(&self) -> DisplayMode {
        self.telemetry.display_mode().await
    }
}

impl Drop for Pilot {
    fn drop(&mut self) {
        self.subscription.abort();
    }
}

async fn feed_telemetry(mut notifications: NotificationReceiver, telemetry: Arc<TelemetryCache>) {
    while let Some(notification) = notifications.recv().await {
        match sample_from_notification(&notification) {
            Some(sample) => telemetry.update(sample).await,
            None => debug!("[PILOT] Ignoring empty notification"),
        }
    }
    info!("[PILOT] Notification stream closed");
}
