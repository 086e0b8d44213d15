//! Telemetry Cache
//!
//! Holds the latest sample of every subscribed channel. Each slot has its own
//! lock; no cross-channel atomicity is offered.

use nalgebra::Vector3;
use pilot_shared::{DisplayMode, FlightStatus};
use tokio::sync::{Notify, RwLock};
use tokio::time::Instant;
use tracing::trace;

use super::sample::{EulerAngles, GpsFix, ImuSample, TelemetryChannel, TelemetrySample};
use crate::abort::AbortSignal;

/// How a [`TelemetryCache::wait_for`] call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Predicate held for the observed status and mode
    Satisfied(FlightStatus, DisplayMode),
    /// Deadline passed; carries the last observed status and mode
    Expired(FlightStatus, DisplayMode),
    /// The abort signal fired first
    Aborted,
}

/// Latest-value store for autopilot telemetry
pub struct TelemetryCache {
    attitude: RwLock<EulerAngles>,
    gps: RwLock<GpsFix>,
    local_position: RwLock<Vector3<f64>>,
    imu: RwLock<ImuSample>,
    velocity: RwLock<Vector3<f64>>,
    height: RwLock<f32>,
    flight_status: RwLock<FlightStatus>,
    display_mode: RwLock<DisplayMode>,
    /// Woken on every flight status or display mode update
    state_changed: Notify,
}

impl TelemetryCache {
    pub fn new() -> Self {
        Self {
            attitude: RwLock::new(EulerAngles::default()),
            gps: RwLock::new(GpsFix::default()),
            local_position: RwLock::new(Vector3::zeros()),
            imu: RwLock::new(ImuSample::default()),
            velocity: RwLock::new(Vector3::zeros()),
            height: RwLock::new(0.0),
            flight_status: RwLock::new(FlightStatus::default()),
            display_mode: RwLock::new(DisplayMode::default()),
            state_changed: Notify::new(),
        }
    }

    /// Replace the slot for the sample's channel
    pub async fn update(&self, sample: TelemetrySample) {
        trace!("[TELEMETRY] {:?}", sample);
        match sample {
            TelemetrySample::Attitude(v) => *self.attitude.write().await = v,
            TelemetrySample::Gps(v) => *self.gps.write().await = v,
            TelemetrySample::LocalPosition(v) => *self.local_position.write().await = v,
            TelemetrySample::Imu(v) => *self.imu.write().await = v,
            TelemetrySample::Velocity(v) => *self.velocity.write().await = v,
            TelemetrySample::Height(v) => *self.height.write().await = v,
            TelemetrySample::FlightStatus(v) => {
                *self.flight_status.write().await = v;
                self.state_changed.notify_waiters();
            }
            TelemetrySample::DisplayMode(v) => {
                *self.display_mode.write().await = v;
                self.state_changed.notify_waiters();
            }
        }
    }

    /// Latest sample of a channel, or its zero value if none has arrived
    pub async fn read(&self, channel: TelemetryChannel) -> TelemetrySample {
        match channel {
            TelemetryChannel::Attitude => TelemetrySample::Attitude(self.attitude().await),
            TelemetryChannel::Gps => TelemetrySample::Gps(self.gps().await),
            TelemetryChannel::LocalPosition => {
                TelemetrySample::LocalPosition(self.local_position().await)
            }
            TelemetryChannel::Imu => TelemetrySample::Imu(self.imu().await),
            TelemetryChannel::Velocity => TelemetrySample::Velocity(self.velocity().await),
            TelemetryChannel::Height => TelemetrySample::Height(self.height().await),
            TelemetryChannel::FlightStatus => {
                TelemetrySample::FlightStatus(self.flight_status().await)
            }
            TelemetryChannel::DisplayMode => TelemetrySample::DisplayMode(self.display_mode().await),
        }
    }

    pub async fn attitude(&self) -> EulerAngles {
        *self.attitude.read().await
    }

    pub async fn gps(&self) -> GpsFix {
        *self.gps.read().await
    }

    pub async fn local_position(&self) -> Vector3<f64> {
        *self.local_position.read().await
    }

    pub async fn imu(&self) -> ImuSample {
        *self.imu.read().await
    }

    pub async fn linear_acceleration(&self) -> Vector3<f64> {
        self.imu.read().await.linear_acceleration
    }

    pub async fn angular_velocity(&self) -> Vector3<f64> {
        self.imu.read().await.angular_velocity
    }

    pub async fn velocity(&self) -> Vector3<f64> {
        *self.velocity.read().await
    }

    pub async fn height(&self) -> f32 {
        *self.height.read().await
    }

    pub async fn flight_status(&self) -> FlightStatus {
        *self.flight_status.read().await
    }

    pub async fn display_mode(&self) -> DisplayMode {
        *self.display_mode.read().await
    }

    pub async fn flight_state(&self) -> (FlightStatus, DisplayMode) {
        (self.flight_status().await, self.display_mode().await)
    }

    /// Wait until `predicate` holds for the current flight status and display
    /// mode, the deadline passes, or `abort` fires.
    ///
    /// The predicate is re-evaluated on every status or mode update, not on a
    /// fixed interval.
    pub async fn wait_for<F>(
        &self,
        deadline: Instant,
        abort: &mut AbortSignal,
        predicate: F,
    ) -> WaitOutcome
    where
        F: Fn(FlightStatus, DisplayMode) -> bool,
    {
        loop {
            // Register before sampling so an update between the read and the
            // select is not lost.
            let notified = self.state_changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let (status, mode) = self.flight_state().await;
            if predicate(status, mode) {
                return WaitOutcome::Satisfied(status, mode);
            }

            tokio::select! {
                _ = abort.aborted() => return WaitOutcome::Aborted,
                _ = tokio::time::sleep_until(deadline) => {
                    let (status, mode) = self.flight_state().await;
                    if predicate(status, mode) {
                        return WaitOutcome::Satisfied(status, mode);
                    }
                    return WaitOutcome::Expired(status, mode);
                }
                _ = &mut notified => {}
            }
        }
    }
}

impl Default for TelemetryCache {
    fn default() -> Self {
        Self::new()
    }
}
