//! Telemetry Module
//!
//! Latest-value cache for autopilot telemetry and the decoding of bridge
//! notifications into cache samples.

mod cache;
mod notification;
mod sample;

pub use cache::{TelemetryCache, WaitOutcome};
pub use notification::{quaternion_to_rpy, sample_from_notification};
pub use sample::{EulerAngles, GpsFix, ImuSample, TelemetryChannel, TelemetrySample};
