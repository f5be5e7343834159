//! # UR5 Telemetry Messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of joints reported by a UR5 controller.
pub const NUM_UR_JOINTS: usize = 6;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the follower arm's actual joint positions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JointState {
    /// Actual joint positions, base first.
    ///
    /// Units: radians
    pub q_rad: Vec<f64>,

    /// Time at which the controller reported the positions.
    pub timestamp: DateTime<Utc>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Request sent by a telemetry client to the telemetry server.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrTelemRequest {
    /// Read the current joint positions
    JointState,

    /// Check that the server is alive
    Ping,
}

/// Response from the telemetry server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum UrTelemResponse {
    /// The current joint positions
    JointState(JointState),

    /// Reply to a `Ping`
    Pong,

    /// The server could not read the controller, with the reason
    Unavailable(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointState {
    /// Create a new joint state stamped with the current time.
    pub fn now(q_rad: Vec<f64>) -> Self {
        Self {
            q_rad,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_response_json() {
        let q_rad = vec![0.0, -1.57, 1.57, 0.0, 0.0, 0.0];
        let resp = UrTelemResponse::JointState(JointState::now(q_rad));

        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.starts_with("{\"JointState\""));

        let back: UrTelemResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resp);

        let req: UrTelemRequest = serde_json::from_str("\"JointState\"").unwrap();
        assert_eq!(req, UrTelemRequest::JointState);
    }
}
