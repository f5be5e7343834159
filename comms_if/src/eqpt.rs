//! # Equipment Interface
//!
//! This module defines the interface structures which are sent between the calibration tools and
//! equipment servers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// UR5 follower arm telemetry
pub mod ur;
