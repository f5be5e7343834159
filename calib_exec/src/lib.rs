//! # Calibration library.
//!
//! Maintains the per-joint sign and offset which map GELLO leader arm readings onto the joint
//! frame of a UR5 follower arm, and allows the executables in this crate to derive, persist and
//! apply that mapping.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Calibrator - derives offsets from the follower arm's current pose
pub mod calibrator;

/// Errors shared by all calibration modules
pub mod error;

/// Joint mapper - applies a calibration record to raw readings
pub mod joint_mapper;

/// Parameters for the calibration executables
pub mod params;

/// Calibration data model
pub mod record;

/// Persistence of calibration records keyed by arm name
pub mod store;

/// Follower arm telemetry capability and the network client implementing it
pub mod telemetry;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use error::CalibError;
