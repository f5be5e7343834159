//! # Calibrator module
//!
//! Derives the per-joint offsets which zero the leader arm against the follower arm's current
//! pose.
//!
//! For a follower reading `q` (radians) the offset of joint `i` is `-wrap(q[i])`, where `wrap`
//! maps an angle into `[-pi, pi)`, rounded to the configured precision. Mapping the leader
//! reading through a record holding these offsets then gives zero at the captured pose.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;
use util::maths::{round_dp, wrap_to_pi};

use crate::{error::CalibError, record::JointSign};

pub use params::*;
pub use state::*;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest number of decimal places offsets can be rounded to.
///
/// An `f64` carries 15 to 17 significant digits, beyond this rounding has no effect.
pub const MAX_PRECISION: u32 = 15;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Result of a calibration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationOutput {
    /// Offset of each joint.
    ///
    /// Units: radians
    pub offsets: Vec<f64>,

    /// Leader joint positions at the captured pose once calibrated, always zero.
    ///
    /// Units: radians
    pub start_joints: Vec<f64>,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Compute the offsets which zero the leader against the given follower joint angles.
///
/// `current_joints` are in radians and may lie outside `[-pi, pi)`. Offsets are rounded to
/// `precision` decimal places.
///
/// Returns `MissingCalibrationInput` if `current_joints` is empty, and `InvalidPrecision` if
/// `precision` is above [`MAX_PRECISION`].
pub fn compute_offsets(
    arm: &str,
    current_joints: &[f64],
    precision: u32,
) -> Result<CalibrationOutput, CalibError> {
    if current_joints.is_empty() {
        return Err(CalibError::MissingCalibrationInput {
            arm: arm.to_string(),
        });
    }

    check_precision(precision)?;

    let offsets = current_joints
        .iter()
        .map(|q| round_dp(-wrap_to_pi(*q), precision))
        .collect();

    Ok(CalibrationOutput {
        offsets,
        start_joints: vec![0.0; current_joints.len()],
    })
}

/// Check that offsets can be rounded to the given number of decimal places.
pub fn check_precision(precision: u32) -> Result<(), CalibError> {
    if precision > MAX_PRECISION {
        return Err(CalibError::InvalidPrecision {
            precision,
            max: MAX_PRECISION,
        });
    }

    Ok(())
}

/// Determine a joint's sign from a small motion of both arms.
///
/// The sign is negative only when both arms moved and moved in opposite directions.
pub fn detect_sign(follower_delta: f64, leader_delta: f64) -> JointSign {
    let both_moved = follower_delta != 0.0 && leader_delta != 0.0;

    if both_moved && (follower_delta > 0.0) != (leader_delta > 0.0) {
        JointSign::Negative
    } else {
        JointSign::Positive
    }
}
