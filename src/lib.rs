//! Pilot node
//!
//! Adapter between a DJI-style flight SDK and callers that want to take off,
//! land, send position/velocity/yaw setpoints and read back telemetry.

pub mod abort;
pub mod command;
pub mod config;
pub mod error;
pub mod gateway;
pub mod pilot;
pub mod sdk;
pub mod telemetry;

pub use abort::{abort_pair, AbortHandle, AbortSignal};
pub use config::PilotConfig;
pub use error::PilotError;
pub use pilot::Pilot;
