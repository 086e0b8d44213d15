//! Takeoff sequence
//!
//! The one genuinely sequential protocol in the node:
//!
//! ```text
//! RequestLocalOriginRef -> RequestTakeoffTask -> AwaitMotorSpin
//!     -> AwaitAirborne -> AwaitModeStabilize -> VerifyFinalMode
//! ```
//!
//! Every await phase re-checks the cached flight status and display mode on
//! each update and gives up at its deadline or when the caller aborts.

use pilot_shared::{timing, DisplayMode, DroneTask, FlightStatus};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::Gateway;
use crate::abort::AbortSignal;
use crate::error::PilotError;
use crate::telemetry::WaitOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeoffPhase {
    RequestLocalOriginRef,
    RequestTakeoffTask,
    AwaitMotorSpin,
    AwaitAirborne,
    AwaitModeStabilize,
    VerifyFinalMode,
}

impl fmt::Display for TakeoffPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TakeoffPhase::RequestLocalOriginRef => "requesting local position reference",
            TakeoffPhase::RequestTakeoffTask => "requesting takeoff task",
            TakeoffPhase::AwaitMotorSpin => "waiting for motors to spin",
            TakeoffPhase::AwaitAirborne => "waiting to leave the ground",
            TakeoffPhase::AwaitModeStabilize => "waiting for takeoff mode to finish",
            TakeoffPhase::VerifyFinalMode => "verifying final mode",
        };
        f.write_str(text)
    }
}

/// Deadlines of the await phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeoffTimings {
    /// Measured from the moment the local origin reference is accepted
    pub motor_spin: Duration,
    /// Measured from motor spin-up
    pub airborne: Duration,
    /// Measured from leaving the ground; expiry is not an error
    pub mode_settle: Duration,
}

impl Default for TakeoffTimings {
    fn default() -> Self {
        Self {
            motor_spin: Duration::from_millis(timing::MOTOR_SPIN_TIMEOUT_MS),
            airborne: Duration::from_millis(timing::AIRBORNE_TIMEOUT_MS),
            mode_settle: Duration::from_millis(timing::MODE_SETTLE_TIMEOUT_MS),
        }
    }
}

/// Acceptance rule for the display mode at the end of takeoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeCheck {
    /// Only P-GPS or attitude mode count as a successful takeoff
    #[default]
    Strict,
    /// Accept any final mode. Matches the vendor sample check
    /// `mode != P_GPS || mode != ATTITUDE`, which holds for every mode.
    Permissive,
}

impl ModeCheck {
    pub fn accepts(self, mode: DisplayMode) -> bool {
        match self {
            ModeCheck::Strict => matches!(mode, DisplayMode::PGps | DisplayMode::Attitude),
            ModeCheck::Permissive => true,
        }
    }
}

impl FromStr for ModeCheck {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(ModeCheck::Strict),
            "permissive" => Ok(ModeCheck::Permissive),
            other => Err(anyhow::anyhow!("unknown mode check '{}'", other)),
        }
    }
}

fn motors_spinning(status: FlightStatus, mode: DisplayMode) -> bool {
    mode == DisplayMode::EngineStart || mode.is_takeoff() || status == FlightStatus::InAir
}

fn airborne(status: FlightStatus, mode: DisplayMode) -> bool {
    status == FlightStatus::InAir && mode.is_takeoff()
}

impl Gateway {
    /// Run the full takeoff sequence
    ///
    /// Blocks the calling task for at most the sum of the phase deadlines.
    /// `abort` ends any await phase early with [`PilotError::Cancelled`].
    pub async fn takeoff(&self, mut abort: AbortSignal) -> Result<(), PilotError> {
        let origin = self.sdk.set_local_pos_ref().await;
        self.expect_success(
            "set local position reference",
            "GPS health insufficient, no local frame reference for height",
            origin,
        )?;

        // Motor-spin budget starts once the origin is latched
        let started = Instant::now();

        let accepted = self.sdk.drone_task_control(DroneTask::Takeoff).await;
        self.expect_success("takeoff", "takeoff task refused", accepted)?;

        self.await_phase(
            TakeoffPhase::AwaitMotorSpin,
            started + self.timings.motor_spin,
            self.timings.motor_spin,
            &mut abort,
            motors_spinning,
        )
        .await?;
        info!("[TAKEOFF] Motors spinning...");

        let spun_up = Instant::now();
        self.await_phase(
            TakeoffPhase::AwaitAirborne,
            spun_up + self.timings.airborne,
            self.timings.airborne,
            &mut abort,
            airborne,
        )
        .await?;
        info!("[TAKEOFF] Ascending...");

        let lifted = Instant::now();
        let settled = self
            .telemetry
            .wait_for(lifted + self.timings.mode_settle, &mut abort, |_, mode| {
                !mode.is_takeoff()
            })
            .await;
        match settled {
            WaitOutcome::Satisfied(..) => {}
            WaitOutcome::Expired(_, mode) => {
                warn!("[TAKEOFF] Still in {:?} after {:?}", mode, self.timings.mode_settle);
            }
            WaitOutcome::Aborted => {
                return Err(self.aborted(TakeoffPhase::AwaitModeStabilize));
            }
        }

        let mode = self.telemetry.display_mode().await;
        if self.mode_check.accepts(mode) {
            info!("[TAKEOFF] Successful takeoff! ({:?})", mode);
            Ok(())
        } else {
            error!(
                "[TAKEOFF] Takeoff finished, but the aircraft is in unexpected mode {:?}. Manual intervention required.",
                mode
            );
            Err(PilotError::UnexpectedMode(mode))
        }
    }

    async fn await_phase(
        &self,
        phase: TakeoffPhase,
        deadline: Instant,
        budget: Duration,
        abort: &mut AbortSignal,
        predicate: fn(FlightStatus, DisplayMode) -> bool,
    ) -> Result<(), PilotError> {
        match self.telemetry.wait_for(deadline, abort, predicate).await {
            WaitOutcome::Satisfied(..) => Ok(()),
            WaitOutcome::Expired(status, mode) => {
                match phase {
                    TakeoffPhase::AwaitMotorSpin => {
                        error!("[TAKEOFF] Takeoff failed. Motors are not spinning.")
                    }
                    _ => error!(
                        "[TAKEOFF] Takeoff failed. Aircraft is still on the ground, but the motors are spinning."
                    ),
                }
                error!("[TAKEOFF] Last seen status={:?} mode={:?}", status, mode);
                Err(PilotError::Timeout {
                    phase,
                    waited: budget,
                })
            }
            WaitOutcome::Aborted => Err(self.aborted(phase)),
        }
    }

    fn aborted(&self, phase: TakeoffPhase) -> PilotError {
        warn!("[TAKEOFF] Aborted while {}", phase);
        PilotError::Cancelled(phase)
    }
}
