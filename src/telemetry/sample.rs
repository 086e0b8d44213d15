//! Telemetry sample types

use nalgebra::Vector3;
use pilot_shared::{DisplayMode, FlightStatus};

/// Roll, pitch and yaw in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Latest GPS fix
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Inertial measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// m/s^2
    pub linear_acceleration: Vector3<f64>,
    /// rad/s
    pub angular_velocity: Vector3<f64>,
}

impl Default for ImuSample {
    fn default() -> Self {
        Self {
            linear_acceleration: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

/// One cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryChannel {
    Attitude,
    Gps,
    LocalPosition,
    Imu,
    Velocity,
    Height,
    FlightStatus,
    DisplayMode,
}

impl TelemetryChannel {
    pub const ALL: [TelemetryChannel; 8] = [
        TelemetryChannel::Attitude,
        TelemetryChannel::Gps,
        TelemetryChannel::LocalPosition,
        TelemetryChannel::Imu,
        TelemetryChannel::Velocity,
        TelemetryChannel::Height,
        TelemetryChannel::FlightStatus,
        TelemetryChannel::DisplayMode,
    ];
}

/// A sample for exactly one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetrySample {
    Attitude(EulerAngles),
    Gps(GpsFix),
    LocalPosition(Vector3<f64>),
    Imu(ImuSample),
    Velocity(Vector3<f64>),
    Height(f32),
    FlightStatus(FlightStatus),
    DisplayMode(DisplayMode),
}

impl TelemetrySample {
    pub fn channel(&self) -> TelemetryChannel {
        match self {
            TelemetrySample::Attitude(_) => TelemetryChannel::Attitude,
            TelemetrySample::Gps(_) => TelemetryChannel::Gps,
            TelemetrySample::LocalPosition(_) => TelemetryChannel::LocalPosition,
            TelemetrySample::Imu(_) => TelemetryChannel::Imu,
            TelemetrySample::Velocity(_) => TelemetryChannel::Velocity,
            TelemetrySample::Height(_) => TelemetryChannel::Height,
            TelemetrySample::FlightStatus(_) => TelemetryChannel::FlightStatus,
            TelemetrySample::DisplayMode(_) => TelemetryChannel::DisplayMode,
        }
    }

    /// Zero value held by a slot before its first notification
    pub fn initial(channel: TelemetryChannel) -> Self {
        match channel {
            TelemetryChannel::Attitude => TelemetrySample::Attitude(EulerAngles::default()),
            TelemetryChannel::Gps => TelemetrySample::Gps(GpsFix::default()),
            TelemetryChannel::LocalPosition => TelemetrySample::LocalPosition(Vector3::zeros()),
            TelemetryChannel::Imu => TelemetrySample::Imu(ImuSample::default()),
            TelemetryChannel::Velocity => TelemetrySample::Velocity(Vector3::zeros()),
            TelemetryChannel::Height => TelemetrySample::Height(0.0),
            TelemetryChannel::FlightStatus => TelemetrySample::FlightStatus(FlightStatus::default()),
            TelemetryChannel::DisplayMode => TelemetrySample::DisplayMode(DisplayMode::default()),
        }
    }
}
