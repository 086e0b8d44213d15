//! Pilot shared protocol types
//!
//! Wire messages, frame codec and autopilot enumerations used by the pilot
//! node and by the bridge process that hosts the vendor flight SDK.

pub mod autopilot;
pub mod codec;
pub mod proto;

use std::time::{SystemTime, UNIX_EPOCH};

pub use autopilot::{ControlFlags, DisplayMode, DroneTask, FlightStatus};
pub use proto::*;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Timing parameters for the takeoff sequence and the bridge
pub mod timing {
    /// Motors must be spinning this long after the takeoff sequence starts
    pub const MOTOR_SPIN_TIMEOUT_MS: u64 = 5_000;

    /// Aircraft must be airborne this long after the motors spin up
    pub const AIRBORNE_TIMEOUT_MS: u64 = 20_000;

    /// Upper bound on waiting for the takeoff mode to hand over
    pub const MODE_SETTLE_TIMEOUT_MS: u64 = 20_000;

    /// Service call response timeout
    pub const SERVICE_TIMEOUT_MS: u64 = 3_000;

    /// Initial bridge reconnect delay
    pub const RECONNECT_DELAY_MS: u64 = 1_000;

    /// Reconnect backoff ceiling
    pub const MAX_RECONNECT_DELAY_MS: u64 = 30_000;
}

impl Envelope {
    /// Wrap a payload with the given sequence number and the current time
    pub fn new(sequence_id: u64, payload: envelope::Payload) -> Self {
        Self {
            sequence_id,
            timestamp_ms: now_ms(),
            payload: Some(payload),
        }
    }
}

impl ServiceRequest {
    pub fn new(call_id: u64, call: service_request::Call) -> Self {
        Self {
            call_id,
            call: Some(call),
        }
    }
}

impl ServiceResponse {
    /// Plain success/failure reply
    pub fn result(call_id: u64, result: bool) -> Self {
        Self {
            call_id,
            result,
            version: 0,
            hardware: String::new(),
        }
    }
}

impl TelemetryNotification {
    pub fn new(kind: telemetry_notification::Kind) -> Self {
        Self { kind: Some(kind) }
    }
}
