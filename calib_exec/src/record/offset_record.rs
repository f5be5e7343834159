//! Persisted calibration for a single arm

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;
use std::collections::HashSet;

use super::{AngleUnit, JointSign, RecordError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Calibration of one physical arm.
///
/// Holds one identifier, offset and sign per joint, in joint order. The joint vectors are only
/// reachable through methods which validate them, so a constructed record always satisfies:
///
/// - `joint_ids`, `offsets` and `signs` have the same non-zero length,
/// - `joint_ids` are unique,
/// - every offset is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffsetRecord {
    joint_ids: Vec<u32>,

    offsets: Vec<f64>,

    signs: Vec<JointSign>,

    units: AngleUnit,

    /// Substring identifying the leader arm's serial port.
    pub connection_hint: String,

    /// Network location of the follower arm's telemetry server.
    pub endpoint_address: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OffsetRecord {
    /// Create a new record, validating the joint vectors.
    ///
    /// Connection details start empty and can be set directly on the returned record.
    pub fn new(
        joint_ids: Vec<u32>,
        offsets: Vec<f64>,
        signs: Vec<JointSign>,
        units: AngleUnit,
    ) -> Result<Self, RecordError> {
        if joint_ids.is_empty() {
            return Err(RecordError::new("joint_ids", "a record needs at least one joint"));
        }

        let mut seen = HashSet::with_capacity(joint_ids.len());
        if let Some(dup) = joint_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(RecordError::new(
                "joint_ids",
                format!("joint id {} appears more than once", dup),
            ));
        }

        check_offsets(&offsets, joint_ids.len())?;
        check_signs(&signs, joint_ids.len())?;

        Ok(Self {
            joint_ids,
            offsets,
            signs,
            units,
            connection_hint: String::new(),
            endpoint_address: String::new(),
        })
    }

    /// Set the connection details of the record, consuming and returning it.
    pub fn with_connection<H, E>(mut self, connection_hint: H, endpoint_address: E) -> Self
    where
        H: Into<String>,
        E: Into<String>,
    {
        self.connection_hint = connection_hint.into();
        self.endpoint_address = endpoint_address.into();
        self
    }

    pub fn joint_ids(&self) -> &[u32] {
        &self.joint_ids
    }

    /// Offsets in the record's units.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn signs(&self) -> &[JointSign] {
        &self.signs
    }

    pub fn units(&self) -> AngleUnit {
        self.units
    }

    pub fn num_joints(&self) -> usize {
        self.joint_ids.len()
    }

    /// Replace the offsets, which must be in the record's units.
    ///
    /// On error the record is left unchanged.
    pub fn set_offsets(&mut self, offsets: Vec<f64>) -> Result<(), RecordError> {
        check_offsets(&offsets, self.num_joints())?;
        self.offsets = offsets;
        Ok(())
    }

    /// Replace the signs.
    ///
    /// On error the record is left unchanged.
    pub fn set_signs(&mut self, signs: Vec<JointSign>) -> Result<(), RecordError> {
        check_signs(&signs, self.num_joints())?;
        self.signs = signs;
        Ok(())
    }

    /// Return a copy of this record with the offsets expressed in another unit.
    pub fn with_units(&self, units: AngleUnit) -> Self {
        let offsets = self
            .offsets
            .iter()
            .map(|o| self.units.convert(*o, units))
            .collect();

        Self {
            offsets,
            units,
            ..self.clone()
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_offsets(offsets: &[f64], num_joints: usize) -> Result<(), RecordError> {
    if offsets.len() != num_joints {
        return Err(RecordError::new(
            "offsets",
            format!("expected {} offsets, found {}", num_joints, offsets.len()),
        ));
    }

    match offsets.iter().position(|o| !o.is_finite()) {
        Some(i) => Err(RecordError::new(
            "offsets",
            format!("offset {} is not finite ({})", i, offsets[i]),
        )),
        None => Ok(()),
    }
}

fn check_signs(signs: &[JointSign], num_joints: usize) -> Result<(), RecordError> {
    if signs.len() != num_joints {
        return Err(RecordError::new(
            "signs",
            format!("expected {} signs, found {}", num_joints, signs.len()),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn six_joint_record() -> OffsetRecord {
        OffsetRecord::new(
            (1..=6).collect(),
            vec![0.0; 6],
            vec![JointSign::Positive; 6],
            AngleUnit::Rad,
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = OffsetRecord::new(
            vec![1, 2, 3],
            vec![0.0, 0.0],
            vec![JointSign::Positive; 3],
            AngleUnit::Deg,
        )
        .unwrap_err();
        assert_eq!(err.field, "offsets");

        let err = OffsetRecord::new(
            vec![1, 2],
            vec![0.0, 0.0],
            vec![JointSign::Positive; 3],
            AngleUnit::Deg,
        )
        .unwrap_err();
        assert_eq!(err.field, "signs");
    }

    #[test]
    fn test_new_rejects_bad_ids_and_offsets() {
        let err = OffsetRecord::new(vec![], vec![], vec![], AngleUnit::Deg).unwrap_err();
        assert_eq!(err.field, "joint_ids");

        let err = OffsetRecord::new(
            vec![1, 2, 1],
            vec![0.0; 3],
            vec![JointSign::Positive; 3],
            AngleUnit::Deg,
        )
        .unwrap_err();
        assert_eq!(err.field, "joint_ids");

        let err = OffsetRecord::new(
            vec![1, 2],
            vec![0.0, f64::NAN],
            vec![JointSign::Positive; 2],
            AngleUnit::Deg,
        )
        .unwrap_err();
        assert_eq!(err.field, "offsets");
    }

    #[test]
    fn test_setters_validate_without_mutation() {
        let mut record = six_joint_record();

        assert!(record.set_offsets(vec![1.0; 5]).is_err());
        assert!(record.set_offsets(vec![f64::INFINITY; 6]).is_err());
        assert!(record.set_signs(vec![JointSign::Negative; 7]).is_err());
        assert_eq!(record, six_joint_record());

        record.set_offsets(vec![0.5; 6]).unwrap();
        record.set_signs(vec![JointSign::Negative; 6]).unwrap();
        assert_eq!(record.offsets(), &[0.5; 6][..]);
        assert_eq!(record.signs(), &[JointSign::Negative; 6][..]);
        assert_eq!(record.joint_ids(), &[1, 2, 3, 4, 5, 6][..]);
    }

    #[test]
    fn test_with_units() {
        let mut record = six_joint_record().with_connection("FT7WBG6", "tcp://192.168.1.10:5010");
        record
            .set_offsets(vec![
                std::f64::consts::PI,
                0.0,
                0.0,
                0.0,
                0.0,
                -std::f64::consts::FRAC_PI_2,
            ])
            .unwrap();

        let deg = record.with_units(AngleUnit::Deg);
        assert_eq!(deg.units(), AngleUnit::Deg);
        assert!((deg.offsets()[0] - 180.0).abs() < 1e-9);
        assert!((deg.offsets()[5] + 90.0).abs() < 1e-9);
        assert_eq!(deg.connection_hint, "FT7WBG6");

        let ticks = deg.with_units(AngleUnit::Ticks);
        assert!((ticks.offsets()[0] - 2048.0).abs() < 1e-9);

        // The source record is untouched
        assert_eq!(record.units(), AngleUnit::Rad);
    }
}
