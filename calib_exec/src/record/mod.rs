//! # Calibration record module
//!
//! The persisted calibration of a single physical arm, and the unit and sign types it is built
//! from.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod offset_record;
mod sign;
mod units;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use offset_record::*;
pub use sign::*;
pub use units::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A validation failure of a record's fields.
///
/// Records do not know which arm they belong to, so this error is lifted into a
/// [`crate::CalibError::MalformedRecord`] by the owner of the record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("field `{field}`: {reason}")]
pub struct RecordError {
    /// Name of the offending field as it appears in the persisted document
    pub field: &'static str,

    /// Description of the problem
    pub reason: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RecordError {
    pub fn new<R: Into<String>>(field: &'static str, reason: R) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
