//! Bridge wire messages
//!
//! Hand-written prost messages exchanged between the pilot node and the
//! process hosting the vendor flight SDK. Field tags are part of the wire
//! contract; never renumber them.

use prost::Message;

/// Top-level frame payload
#[derive(Clone, PartialEq, Message)]
pub struct Envelope {
    #[prost(uint64, tag = "1")]
    pub sequence_id: u64,

    #[prost(uint64, tag = "2")]
    pub timestamp_ms: u64,

    #[prost(oneof = "envelope::Payload", tags = "3, 4, 5, 6")]
    pub payload: Option<envelope::Payload>,
}

pub mod envelope {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "3")]
        Setpoint(super::Setpoint),

        #[prost(message, tag = "4")]
        ServiceRequest(super::ServiceRequest),

        #[prost(message, tag = "5")]
        ServiceResponse(super::ServiceResponse),

        #[prost(message, tag = "6")]
        Telemetry(super::TelemetryNotification),
    }
}

/// Generic flight control setpoint: four axes followed by the flag byte
#[derive(Clone, PartialEq, Message)]
pub struct Setpoint {
    #[prost(float, repeated, tag = "1")]
    pub axes: Vec<f32>,
}

/// Synchronous service call, answered by a [`ServiceResponse`] with the same `call_id`
#[derive(Clone, PartialEq, Message)]
pub struct ServiceRequest {
    #[prost(uint64, tag = "1")]
    pub call_id: u64,

    #[prost(oneof = "service_request::Call", tags = "2, 3, 4, 5, 6")]
    pub call: Option<service_request::Call>,
}

pub mod service_request {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Call {
        #[prost(message, tag = "2")]
        ControlAuthority(super::ControlAuthorityRequest),

        #[prost(message, tag = "3")]
        TaskControl(super::TaskControlRequest),

        #[prost(message, tag = "4")]
        ArmControl(super::ArmControlRequest),

        #[prost(message, tag = "5")]
        QueryVersion(super::QueryVersionRequest),

        #[prost(message, tag = "6")]
        SetLocalPosRef(super::SetLocalPosRefRequest),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct ControlAuthorityRequest {
    #[prost(bool, tag = "1")]
    pub enable: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct TaskControlRequest {
    #[prost(uint32, tag = "1")]
    pub task: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct ArmControlRequest {
    #[prost(bool, tag = "1")]
    pub arm: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct QueryVersionRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct SetLocalPosRefRequest {}

/// Reply to a [`ServiceRequest`]
///
/// `version` and `hardware` are only filled in for version queries.
#[derive(Clone, PartialEq, Message)]
pub struct ServiceResponse {
    #[prost(uint64, tag = "1")]
    pub call_id: u64,

    #[prost(bool, tag = "2")]
    pub result: bool,

    #[prost(uint32, tag = "3")]
    pub version: u32,

    #[prost(string, tag = "4")]
    pub hardware: String,
}

/// Asynchronous telemetry pushed by the SDK, one channel per message
#[derive(Clone, PartialEq, Message)]
pub struct TelemetryNotification {
    #[prost(oneof = "telemetry_notification::Kind", tags = "1, 2, 3, 4, 5, 6, 7, 8")]
    pub kind: Option<telemetry_notification::Kind>,
}

pub mod telemetry_notification {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        /// Body attitude, FLU relative to ENU
        #[prost(message, tag = "1")]
        Attitude(super::Quaternion),

        #[prost(message, tag = "2")]
        Gps(super::NavSatFix),

        #[prost(message, tag = "3")]
        LocalPosition(super::Point),

        #[prost(uint32, tag = "4")]
        FlightStatus(u32),

        #[prost(uint32, tag = "5")]
        DisplayMode(u32),

        #[prost(message, tag = "6")]
        Imu(super::Imu),

        #[prost(message, tag = "7")]
        Velocity(super::Vector3),

        #[prost(float, tag = "8")]
        Height(f32),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct Quaternion {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub z: f64,
    #[prost(double, tag = "4")]
    pub w: f64,
}

#[derive(Clone, PartialEq, Message)]
pub struct NavSatFix {
    /// Degrees
    #[prost(double, tag = "1")]
    pub latitude: f64,
    /// Degrees
    #[prost(double, tag = "2")]
    pub longitude: f64,
    /// Meters above the WGS84 ellipsoid
    #[prost(double, tag = "3")]
    pub altitude: f64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Point {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub z: f64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Vector3 {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub z: f64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Imu {
    #[prost(message, optional, tag = "1")]
    pub linear_acceleration: Option<Vector3>,

    #[prost(message, optional, tag = "2")]
    pub angular_velocity: Option<Vector3>,
}
