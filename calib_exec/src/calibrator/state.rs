//! Implementations for the Calibrator state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, info};
use std::thread;

// Internal
use super::{compute_offsets, detect_sign, CalibrationOutput, CalibratorParams};
use crate::{
    error::CalibError,
    record::{JointSign, OffsetRecord},
    telemetry::{JointTelemetry, ScopedSession},
};
use util::{
    maths::{mean_columns, round_dp, wrap_to_pi},
    time::seconds_to_std,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Calibrator state.
///
/// Owns the telemetry capability used to read the follower arm.
pub struct Calibrator<T: JointTelemetry> {
    telemetry: T,

    params: CalibratorParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T: JointTelemetry> Calibrator<T> {
    pub fn new(telemetry: T, params: CalibratorParams) -> Self {
        Self { telemetry, params }
    }

    /// Read the follower's joint angles from the given endpoint.
    ///
    /// `num_samples` snapshots are read `sample_period_s` apart within a single telemetry session
    /// and averaged per joint. The session is released before returning, on success or failure.
    pub fn acquire(&mut self, endpoint: &str) -> Result<Vec<f64>, CalibError> {
        let num_samples = self.params.num_samples.max(1);
        let period = seconds_to_std(self.params.sample_period_s);

        let mut session = ScopedSession::open(&mut self.telemetry, endpoint)?;

        let mut samples = Vec::with_capacity(num_samples);
        for i in 0..num_samples {
            if i > 0 {
                thread::sleep(period);
            }
            samples.push(session.get_joint_angles()?);
        }

        session.finish()?;

        debug!("Acquired {} sample(s) from {}", samples.len(), endpoint);

        mean_columns(&samples).ok_or_else(|| {
            CalibError::telemetry(endpoint, "the number of joints changed between samples")
        })
    }

    /// Calibrate the record against the given follower joint angles.
    ///
    /// Only the record's offsets are replaced, converted into the record's units and rounded to
    /// the configured precision. On any error the record is left unchanged.
    pub fn apply(
        &self,
        arm: &str,
        record: &mut OffsetRecord,
        current_joints: &[f64],
    ) -> Result<CalibrationOutput, CalibError> {
        if current_joints.is_empty() {
            return Err(CalibError::MissingCalibrationInput {
                arm: arm.to_string(),
            });
        }

        if let Some(i) = current_joints.iter().position(|q| !q.is_finite()) {
            return Err(CalibError::telemetry(
                &record.endpoint_address,
                format!("joint {} reported a non-finite angle ({})", i, current_joints[i]),
            ));
        }

        if current_joints.len() != record.num_joints() {
            return Err(CalibError::MalformedRecord {
                arm: arm.to_string(),
                field: "offsets",
                reason: format!(
                    "the record has {} joints but {} joint angles were given",
                    record.num_joints(),
                    current_joints.len()
                ),
            });
        }

        let output = compute_offsets(arm, current_joints, self.params.precision)?;

        // Convert before rounding so the record holds the offsets at full precision in its units
        let units = record.units();
        let offsets = current_joints
            .iter()
            .map(|q| round_dp(units.from_rad(-wrap_to_pi(*q)), self.params.precision))
            .collect();

        record
            .set_offsets(offsets)
            .map_err(|e| CalibError::malformed(arm, e))?;

        info!(
            "Calibrated arm `{}`, offsets ({}): {:?}",
            arm,
            units,
            record.offsets()
        );

        Ok(output)
    }

    /// Acquire the follower's joint angles from the record's endpoint and calibrate the record
    /// against them.
    pub fn calibrate(
        &mut self,
        arm: &str,
        record: &mut OffsetRecord,
    ) -> Result<CalibrationOutput, CalibError> {
        let endpoint = record.endpoint_address.clone();
        let current_joints = self.acquire(&endpoint)?;

        self.apply(arm, record, &current_joints)
    }

    /// Determine the sign of each joint from snapshots of both arms taken before and after each
    /// joint was nudged.
    ///
    /// Follower snapshots are in radians. Leader snapshots may be in any unit as only the
    /// direction of their motion is used.
    pub fn detect_signs(
        &self,
        arm: &str,
        follower_before: &[f64],
        follower_after: &[f64],
        leader_before: &[f64],
        leader_after: &[f64],
    ) -> Result<Vec<JointSign>, CalibError> {
        let n = follower_before.len();

        if [follower_after.len(), leader_before.len(), leader_after.len()]
            .iter()
            .any(|l| *l != n)
        {
            return Err(CalibError::MalformedRecord {
                arm: arm.to_string(),
                field: "signs",
                reason: String::from("nudge snapshots differ in length"),
            });
        }

        let signs: Vec<JointSign> = (0..n)
            .map(|i| {
                detect_sign(
                    wrap_to_pi(follower_after[i] - follower_before[i]),
                    leader_after[i] - leader_before[i],
                )
            })
            .collect();

        debug!("Detected signs for arm `{}`: {:?}", arm, signs);

        Ok(signs)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::AngleUnit;
    use crate::telemetry::test::FakeTelemetry;
    use std::f64::consts::PI;

    fn record(units: AngleUnit) -> OffsetRecord {
        OffsetRecord::new(
            (1..=6).collect(),
            vec![1.0; 6],
            vec![
                JointSign::Positive,
                JointSign::Negative,
                JointSign::Positive,
                JointSign::Positive,
                JointSign::Positive,
                JointSign::Negative,
            ],
            units,
        )
        .unwrap()
        .with_connection("FT7WBG6", "fake://left")
    }

    fn params(num_samples: usize) -> CalibratorParams {
        CalibratorParams {
            num_samples,
            sample_period_s: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_replaces_only_offsets() {
        let calib = Calibrator::new(FakeTelemetry::fixed(vec![]), params(1));
        let mut rec = record(AngleUnit::Rad);
        let before = rec.clone();

        let out = calib
            .apply("left", &mut rec, &[PI, 0.0, 0.0, 0.0, 0.0, -PI / 2.0])
            .unwrap();

        assert_eq!(out.start_joints, vec![0.0; 6]);
        assert_eq!(rec.offsets(), &[3.141593, 0.0, 0.0, 0.0, 0.0, 1.570796][..]);
        assert_eq!(rec.signs(), before.signs());
        assert_eq!(rec.joint_ids(), before.joint_ids());
        assert_eq!(rec.endpoint_address, before.endpoint_address);
    }

    #[test]
    fn test_apply_converts_to_record_units() {
        let calib = Calibrator::new(FakeTelemetry::fixed(vec![]), params(1));

        let mut rec = record(AngleUnit::Deg);
        calib
            .apply("left", &mut rec, &[PI / 2.0, 0.0, 0.0, 0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(rec.offsets()[0], -90.0);

        let mut rec = record(AngleUnit::Ticks);
        calib
            .apply("left", &mut rec, &[-PI / 2.0, 0.0, 0.0, 0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(rec.offsets()[0], 1024.0);
    }

    #[test]
    fn test_apply_errors_leave_record_unchanged() {
        let calib = Calibrator::new(FakeTelemetry::fixed(vec![]), params(1));
        let mut rec = record(AngleUnit::Rad);
        let before = rec.clone();

        match calib.apply("left", &mut rec, &[]) {
            Err(CalibError::MissingCalibrationInput { arm }) => assert_eq!(arm, "left"),
            r => panic!("Expected MissingCalibrationInput, got {:?}", r),
        }

        match calib.apply("left", &mut rec, &[0.0; 5]) {
            Err(CalibError::MalformedRecord { field, .. }) => assert_eq!(field, "offsets"),
            r => panic!("Expected MalformedRecord, got {:?}", r),
        }

        match calib.apply("left", &mut rec, &[0.0, 0.0, f64::INFINITY, 0.0, 0.0, 0.0]) {
            Err(CalibError::TelemetryUnavailable { endpoint, .. }) => {
                assert_eq!(endpoint, "fake://left")
            }
            r => panic!("Expected TelemetryUnavailable, got {:?}", r),
        }

        assert_eq!(rec, before);
    }

    #[test]
    fn test_apply_rejects_precision_out_of_range() {
        let calib = Calibrator::new(
            FakeTelemetry::fixed(vec![]),
            CalibratorParams {
                precision: 400,
                ..params(1)
            },
        );
        let mut rec = record(AngleUnit::Deg);
        let before = rec.clone();

        match calib.apply("left", &mut rec, &[0.5; 6]) {
            Err(CalibError::InvalidPrecision { precision, .. }) => assert_eq!(precision, 400),
            r => panic!("Expected InvalidPrecision, got {:?}", r),
        }
        assert_eq!(rec, before);
        assert!(rec.offsets().iter().all(|o| o.is_finite()));
    }

    #[test]
    fn test_acquire_averages_samples() {
        let telem = FakeTelemetry::new(vec![
            Ok(vec![0.1, 1.0]),
            Ok(vec![0.3, 2.0]),
            Ok(vec![0.2, 3.0]),
        ]);
        let log = telem.log.clone();
        let mut calib = Calibrator::new(telem, params(3));

        let q = calib.acquire("fake://left").unwrap();
        assert!((q[0] - 0.2).abs() < 1e-12);
        assert!((q[1] - 2.0).abs() < 1e-12);

        let log = log.borrow();
        assert_eq!((log.connects, log.reads, log.closes), (1, 3, 1));
    }

    #[test]
    fn test_acquire_releases_session_on_failure() {
        let telem = FakeTelemetry::new(vec![
            Ok(vec![0.1, 1.0]),
            Err(String::from("protective stop")),
        ]);
        let log = telem.log.clone();
        let mut calib = Calibrator::new(telem, params(3));

        match calib.acquire("fake://left") {
            Err(CalibError::TelemetryUnavailable { reason, .. }) => {
                assert_eq!(reason, "protective stop")
            }
            r => panic!("Expected TelemetryUnavailable, got {:?}", r),
        }

        let log = log.borrow();
        assert_eq!((log.reads, log.closes), (2, 1));
    }

    #[test]
    fn test_acquire_rejects_changing_joint_count() {
        let telem = FakeTelemetry::new(vec![Ok(vec![0.1, 1.0]), Ok(vec![0.1])]);
        let mut calib = Calibrator::new(telem, params(2));

        assert!(matches!(
            calib.acquire("fake://left"),
            Err(CalibError::TelemetryUnavailable { .. })
        ));
    }

    #[test]
    fn test_calibrate_from_record_endpoint() {
        let telem = FakeTelemetry::fixed(vec![0.0, 0.0, 0.0, 0.0, 0.0, 2.5 * PI]);
        let mut calib = Calibrator::new(telem, params(1));
        let mut rec = record(AngleUnit::Rad);

        let out = calib.calibrate("left", &mut rec).unwrap();
        assert_eq!(out.offsets[..5], [0.0; 5]);
        assert_eq!(rec.offsets()[5], -1.570796);
    }

    #[test]
    fn test_calibrate_without_joints_keeps_record() {
        let mut calib = Calibrator::new(FakeTelemetry::fixed(vec![]), params(1));
        let mut rec = record(AngleUnit::Deg);
        let before = rec.clone();

        match calib.calibrate("left", &mut rec) {
            Err(CalibError::MissingCalibrationInput { .. }) => (),
            r => panic!("Expected MissingCalibrationInput, got {:?}", r),
        }
        assert_eq!(rec, before);
    }

    #[test]
    fn test_detect_signs() {
        let calib = Calibrator::new(FakeTelemetry::fixed(vec![]), params(1));

        let signs = calib
            .detect_signs(
                "left",
                &[0.0, 0.0, PI - 0.01],
                &[0.03, 0.03, -PI + 0.02],
                &[2048.0, 1000.0, 10.0],
                &[2070.0, 980.0, 30.0],
            )
            .unwrap();
        assert_eq!(
            signs,
            vec![JointSign::Positive, JointSign::Negative, JointSign::Positive]
        );

        assert!(calib
            .detect_signs("left", &[0.0], &[0.0, 1.0], &[0.0], &[0.0])
            .is_err());
    }
}
