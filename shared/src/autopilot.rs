//! Autopilot enumerations
//!
//! Numeric values follow the vendor SDK; they travel as `u32` on the bridge.

use std::fmt;
use std::ops::BitOr;

/// Ground/air state reported by the autopilot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightStatus {
    /// Motors stopped
    #[default]
    Stopped,
    /// On the ground
    OnGround,
    /// Airborne
    InAir,
    /// Value this crate does not know about
    Unknown(u32),
}

impl From<u32> for FlightStatus {
    fn from(raw: u32) -> Self {
        match raw {
            0 => Self::Stopped,
            1 => Self::OnGround,
            2 => Self::InAir,
            other => Self::Unknown(other),
        }
    }
}

impl From<FlightStatus> for u32 {
    fn from(status: FlightStatus) -> Self {
        match status {
            FlightStatus::Stopped => 0,
            FlightStatus::OnGround => 1,
            FlightStatus::InAir => 2,
            FlightStatus::Unknown(raw) => raw,
        }
    }
}

/// Autopilot operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Manual,
    Attitude,
    PGps,
    HotpointMode,
    AssistedTakeoff,
    AutoTakeoff,
    AutoLanding,
    NaviGoHome,
    NaviSdkCtrl,
    ForceAutoLanding,
    SearchMode,
    EngineStart,
    Unknown(u32),
}

impl DisplayMode {
    /// Assisted or automatic takeoff in progress
    pub fn is_takeoff(self) -> bool {
        matches!(self, Self::AssistedTakeoff | Self::AutoTakeoff)
    }
}

impl From<u32> for DisplayMode {
    fn from(raw: u32) -> Self {
        match raw {
            0 => Self::Manual,
            1 => Self::Attitude,
            6 => Self::PGps,
            9 => Self::HotpointMode,
            10 => Self::AssistedTakeoff,
            11 => Self::AutoTakeoff,
            12 => Self::AutoLanding,
            15 => Self::NaviGoHome,
            17 => Self::NaviSdkCtrl,
            33 => Self::ForceAutoLanding,
            40 => Self::SearchMode,
            41 => Self::EngineStart,
            other => Self::Unknown(other),
        }
    }
}

impl From<DisplayMode> for u32 {
    fn from(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Manual => 0,
            DisplayMode::Attitude => 1,
            DisplayMode::PGps => 6,
            DisplayMode::HotpointMode => 9,
            DisplayMode::AssistedTakeoff => 10,
            DisplayMode::AutoTakeoff => 11,
            DisplayMode::AutoLanding => 12,
            DisplayMode::NaviGoHome => 15,
            DisplayMode::NaviSdkCtrl => 17,
            DisplayMode::ForceAutoLanding => 33,
            DisplayMode::SearchMode => 40,
            DisplayMode::EngineStart => 41,
            DisplayMode::Unknown(raw) => raw,
        }
    }
}

/// Mission task codes accepted by the task control service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DroneTask {
    GoHome = 1,
    Takeoff = 4,
    Land = 6,
}

impl fmt::Display for DroneTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DroneTask::GoHome => write!(f, "GO_HOME"),
            DroneTask::Takeoff => write!(f, "TAKEOFF"),
            DroneTask::Land => write!(f, "LAND"),
        }
    }
}

/// Mode byte of a generic setpoint
///
/// Several members are zero (angle, vertical velocity, yaw angle, ground
/// frame, stable disabled): they are the default of their group and only
/// document intent when or-ed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlFlags(u8);

impl ControlFlags {
    pub const HORIZONTAL_ANGLE: Self = Self(0x00);
    pub const HORIZONTAL_VELOCITY: Self = Self(0x40);
    pub const HORIZONTAL_POSITION: Self = Self(0x80);

    pub const VERTICAL_VELOCITY: Self = Self(0x00);
    pub const VERTICAL_POSITION: Self = Self(0x10);
    pub const VERTICAL_THRUST: Self = Self(0x20);

    pub const YAW_ANGLE: Self = Self(0x00);
    pub const YAW_RATE: Self = Self(0x08);

    pub const HORIZONTAL_GROUND: Self = Self(0x00);
    pub const HORIZONTAL_BODY: Self = Self(0x02);

    pub const STABLE_DISABLE: Self = Self(0x00);
    pub const STABLE_ENABLE: Self = Self(0x01);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ControlFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
