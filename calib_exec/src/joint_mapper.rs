//! # Joint mapper
//!
//! Applies an arm's calibration record to raw leader readings.
//!
//! For joint `i` with sign `s` and offset `o` the calibrated value of a raw reading `r` is
//! `s * r - o`, and the raw reading is recovered from a calibrated value `c` as `s * (c + o)`.
//! Readings, offsets and calibrated values are all in the record's units.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use util::maths::{rms, wrap_to_pi};

use crate::{error::CalibError, record::OffsetRecord};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Maps readings through the record of a single arm.
#[derive(Debug, Clone, Copy)]
pub struct JointMapper<'a> {
    arm: &'a str,
    record: &'a OffsetRecord,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<'a> JointMapper<'a> {
    pub fn new(arm: &'a str, record: &'a OffsetRecord) -> Self {
        Self { arm, record }
    }

    /// Map a raw reading of the joint at `joint_index` into the calibrated frame.
    pub fn map(&self, raw_value: f64, joint_index: usize) -> Result<f64, CalibError> {
        let (sign, offset) = self.joint(joint_index)?;

        Ok(sign * raw_value - offset)
    }

    /// Recover the raw reading of the joint at `joint_index` from a calibrated value.
    pub fn unmap(&self, calibrated_value: f64, joint_index: usize) -> Result<f64, CalibError> {
        let (sign, offset) = self.joint(joint_index)?;

        Ok(sign * (calibrated_value + offset))
    }

    /// Map a full set of raw readings, one per joint.
    pub fn map_all(&self, raw_values: &[f64]) -> Result<Vec<f64>, CalibError> {
        self.check_len(raw_values.len())?;

        raw_values
            .iter()
            .enumerate()
            .map(|(i, r)| self.map(*r, i))
            .collect()
    }

    /// Recover a full set of raw readings from calibrated values, one per joint.
    pub fn unmap_all(&self, calibrated_values: &[f64]) -> Result<Vec<f64>, CalibError> {
        self.check_len(calibrated_values.len())?;

        calibrated_values
            .iter()
            .enumerate()
            .map(|(i, c)| self.unmap(*c, i))
            .collect()
    }

    /// Difference between a reference pose and the calibrated raw readings, per joint.
    ///
    /// Each residual is wrapped onto half a turn either side of zero, in the record's units.
    pub fn residuals(&self, reference: &[f64], raw_values: &[f64]) -> Result<Vec<f64>, CalibError> {
        self.check_len(reference.len())?;
        let calibrated = self.map_all(raw_values)?;

        let units = self.record.units();

        Ok(reference
            .iter()
            .zip(calibrated.iter())
            .map(|(r, c)| units.from_rad(wrap_to_pi(units.to_rad(r - c))))
            .collect())
    }

    /// Root mean square of the [`residuals`](Self::residuals).
    pub fn rms_error(&self, reference: &[f64], raw_values: &[f64]) -> Result<f64, CalibError> {
        let residuals = self.residuals(reference, raw_values)?;

        // Records always have at least one joint so the residuals are never empty
        Ok(rms(&residuals).unwrap_or(0.0))
    }

    fn joint(&self, joint_index: usize) -> Result<(f64, f64), CalibError> {
        match (
            self.record.signs().get(joint_index),
            self.record.offsets().get(joint_index),
        ) {
            (Some(s), Some(o)) => Ok((s.as_f64(), *o)),
            _ => Err(CalibError::IndexOutOfRange {
                arm: self.arm.to_string(),
                index: joint_index,
                num_joints: self.record.num_joints(),
            }),
        }
    }

    fn check_len(&self, len: usize) -> Result<(), CalibError> {
        if len == self.record.num_joints() {
            Ok(())
        } else {
            Err(CalibError::MalformedRecord {
                arm: self.arm.to_string(),
                field: "joint_ids",
                reason: format!(
                    "the record has {} joints but {} values were given",
                    self.record.num_joints(),
                    len
                ),
            })
        }
    }
}
