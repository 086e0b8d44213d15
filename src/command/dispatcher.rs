//! Command dispatcher - turns setpoint intents into published commands

use std::sync::Arc;
use tracing::{debug, warn};

use super::setpoint::CommandVector;
use crate::sdk::FlightSdk;

/// Publishes setpoints to the flight controller
///
/// Every send is fire-and-forget: nothing is acknowledged and a failed
/// publish is only logged.
pub struct CommandDispatcher {
    sdk: Arc<dyn FlightSdk>,
}

impl CommandDispatcher {
    pub fn new(sdk: Arc<dyn FlightSdk>) -> Self {
        Self { sdk }
    }

    pub async fn set_horizontal_position(&self, x: f32, y: f32) {
        self.publish(CommandVector::horizontal_position(x, y)).await;
    }

    pub async fn set_horizontal_velocity(&self, vx: f32, vy: f32) {
        self.publish(CommandVector::horizontal_velocity(vx, vy)).await;
    }

    pub async fn set_vertical_position(&self, h: f32) {
        self.publish(CommandVector::vertical_position(h)).await;
    }

    pub async fn set_vertical_velocity(&self, v: f32) {
        self.publish(CommandVector::vertical_velocity(v)).await;
    }

    pub async fn set_yaw(&self, yaw: f32) {
        self.publish(CommandVector::yaw(yaw)).await;
    }

    async fn publish(&self, command: CommandVector) {
        debug!(
            "[CMD] Setpoint axes={:?} flags={:#04x}",
            command.axes,
            command.flags.bits()
        );

        if let Err(e) = self.sdk.publish_setpoint(command).await {
            warn!("[CMD] Setpoint dropped: {}", e);
        }
    }
}
