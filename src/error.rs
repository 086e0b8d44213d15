//! Pilot error type

use pilot_shared::DisplayMode;
use std::time::Duration;
use thiserror::Error;

use crate::gateway::TakeoffPhase;

/// Why a pilot operation failed
#[derive(Error, Debug)]
pub enum PilotError {
    /// The autopilot answered the request with failure
    #[error("{operation} rejected: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    /// An expected status transition did not happen in time
    #[error("takeoff failed while {phase}: no transition within {waited:?}")]
    Timeout { phase: TakeoffPhase, waited: Duration },

    /// Takeoff finished in a mode that needs manual intervention
    #[error("takeoff finished in unexpected mode {0:?}")]
    UnexpectedMode(DisplayMode),

    /// The caller aborted the sequence
    #[error("takeoff aborted while {0}")]
    Cancelled(TakeoffPhase),

    /// The request never got an answer from the SDK
    #[error("SDK call failed: {0}")]
    Sdk(#[from] anyhow::Error),
}
