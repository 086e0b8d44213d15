//! Generic setpoint construction

use pilot_shared::{ControlFlags, Setpoint};

/// Four control axes plus the mode byte interpreting them
///
/// The system does not check that exactly one horizontal and one vertical
/// mode is set; the named constructors always produce a coherent pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandVector {
    pub axes: [f32; 4],
    pub flags: ControlFlags,
}

impl CommandVector {
    /// Body-frame position offset `(x, y)` in meters, holding altitude
    pub fn horizontal_position(x: f32, y: f32) -> Self {
        Self {
            axes: [x, y, 0.0, 0.0],
            flags: ControlFlags::HORIZONTAL_POSITION
                | ControlFlags::VERTICAL_POSITION
                | ControlFlags::YAW_ANGLE
                | ControlFlags::HORIZONTAL_BODY
                | ControlFlags::STABLE_ENABLE,
        }
    }

    /// Body-frame horizontal velocity `(vx, vy)` in m/s
    pub fn horizontal_velocity(vx: f32, vy: f32) -> Self {
        Self {
            axes: [vx, vy, 0.0, 0.0],
            flags: ControlFlags::HORIZONTAL_VELOCITY
                | ControlFlags::VERTICAL_VELOCITY
                | ControlFlags::YAW_ANGLE
                | ControlFlags::HORIZONTAL_BODY
                | ControlFlags::STABLE_ENABLE,
        }
    }

    /// Height `h` in meters
    pub fn vertical_position(h: f32) -> Self {
        Self {
            axes: [0.0, 0.0, h, 0.0],
            flags: ControlFlags::HORIZONTAL_POSITION
                | ControlFlags::VERTICAL_POSITION
                | ControlFlags::YAW_ANGLE
                | ControlFlags::HORIZONTAL_BODY
                | ControlFlags::STABLE_ENABLE,
        }
    }

    /// Climb rate `v` in m/s, holding horizontal position
    pub fn vertical_velocity(v: f32) -> Self {
        Self {
            axes: [0.0, 0.0, v, 0.0],
            flags: ControlFlags::HORIZONTAL_POSITION
                | ControlFlags::VERTICAL_VELOCITY
                | ControlFlags::YAW_ANGLE
                | ControlFlags::HORIZONTAL_BODY
                | ControlFlags::STABLE_ENABLE,
        }
    }

    /// Yaw angle in the fourth axis
    pub fn yaw(yaw: f32) -> Self {
        Self {
            axes: [0.0, 0.0, 0.0, yaw],
            flags: ControlFlags::HORIZONTAL_VELOCITY
                | ControlFlags::VERTICAL_VELOCITY
                | ControlFlags::YAW_ANGLE
                | ControlFlags::HORIZONTAL_BODY
                | ControlFlags::STABLE_ENABLE,
        }
    }

    /// Wire layout: the four axes followed by the flag byte as a float
    pub fn to_axes(&self) -> [f32; 5] {
        let [a0, a1, a2, a3] = self.axes;
        [a0, a1, a2, a3, f32::from(self.flags.bits())]
    }
}

impl From<CommandVector> for Setpoint {
    fn from(cmd: CommandVector) -> Self {
        Setpoint {
            axes: cmd.to_axes().to_vec(),
        }
    }
}
