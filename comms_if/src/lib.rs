//! # Communications interface crate.
//!
//! Provides the messages and network helpers used to talk to the follower
//! arm's telemetry server.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Request and response definitions for equipment (the UR5 telemetry bridge)
pub mod eqpt;

/// Network module
pub mod net;
