//! # Calibration errors

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;
use thiserror::Error;

use crate::record::RecordError;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while calibrating, mapping or persisting an arm's calibration.
///
/// Every variant carries enough context (arm name, joint index, field) to diagnose the problem
/// without re-running the operation.
#[derive(Debug, Error)]
pub enum CalibError {
    #[error(
        "No current joint baseline is available for arm `{arm}`, capture the follower pose \
         before calibrating"
    )]
    MissingCalibrationInput { arm: String },

    #[error("Malformed calibration record for arm `{arm}`, field `{field}`: {reason}")]
    MalformedRecord {
        arm: String,
        field: &'static str,
        reason: String,
    },

    #[error("Joint index {index} is out of range for arm `{arm}` which has {num_joints} joints")]
    IndexOutOfRange {
        arm: String,
        index: usize,
        num_joints: usize,
    },

    #[error("Telemetry from the follower arm at `{endpoint}` is unavailable: {reason}")]
    TelemetryUnavailable { endpoint: String, reason: String },

    #[error("Cannot round offsets to {precision} decimal places, at most {max} are supported")]
    InvalidPrecision { precision: u32, max: u32 },

    #[error("Arm `{0}` is not present in the offsets store")]
    UnknownArm(String),

    #[error("The offsets document could not be parsed: {0}")]
    InvalidDocument(String),

    #[error("Unsupported offsets store format for {0:?}, expected a .toml or .json file")]
    UnsupportedFormat(PathBuf),

    #[error("Cannot access the offsets store at {0:?}: {1}")]
    StoreIo(PathBuf, std::io::Error),

    #[error("Cannot serialize the offsets store: {0}")]
    Serialize(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CalibError {
    /// Lift a record validation error into a `MalformedRecord` for the given arm.
    pub fn malformed(arm: &str, err: RecordError) -> Self {
        CalibError::MalformedRecord {
            arm: arm.to_string(),
            field: err.field,
            reason: err.reason,
        }
    }

    /// Build a `TelemetryUnavailable` error for the given endpoint.
    pub fn telemetry<R: ToString>(endpoint: &str, reason: R) -> Self {
        CalibError::TelemetryUnavailable {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}
