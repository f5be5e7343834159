//! Parameters structure for the Calibrator

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the Calibrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibratorParams {
    /// Number of decimal places offsets are rounded to.
    pub precision: u32,

    /// Number of joint state snapshots averaged into one calibration input.
    pub num_samples: usize,

    /// Time between two snapshots.
    ///
    /// Units: seconds
    pub sample_period_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for CalibratorParams {
    fn default() -> Self {
        Self {
            precision: 6,
            num_samples: 1,
            sample_period_s: 0.05,
        }
    }
}
