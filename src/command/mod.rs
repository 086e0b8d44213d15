//! Setpoint commands for the flight controller
//!
//! This module handles:
//! - Building the generic axis vector and mode byte for each intent
//! - Publishing it to the flight-controller setpoint channel

mod dispatcher;
mod setpoint;

pub use dispatcher::CommandDispatcher;
pub use setpoint::CommandVector;
