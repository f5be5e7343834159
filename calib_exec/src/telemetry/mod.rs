//! # Telemetry module
//!
//! The capability used to read the follower arm's current joint angles. The calibrator is given
//! an implementation of [`JointTelemetry`] at construction, the executables use
//! [`UrTelemClient`] and the tests use an in-memory fake.
//!
//! A session opened through [`JointTelemetry::connect`] must be released as soon as the reading
//! has been made. [`ScopedSession`] guarantees this by closing the session when it is dropped.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod ur_client;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{trace, warn};

use crate::error::CalibError;

pub use ur_client::*;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can open telemetry sessions to a follower arm.
pub trait JointTelemetry {
    type Session: TelemetrySession;

    /// Open a session to the arm at the given endpoint.
    fn connect(&mut self, endpoint: &str) -> Result<Self::Session, CalibError>;
}

/// An open telemetry session.
pub trait TelemetrySession {
    /// Read the arm's current joint angles, in radians, base joint first.
    fn get_joint_angles(&mut self) -> Result<Vec<f64>, CalibError>;

    /// Release the session. Called exactly once per session by [`ScopedSession`].
    fn close(&mut self) -> Result<(), CalibError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A telemetry session which is closed when it goes out of scope.
pub struct ScopedSession<S: TelemetrySession> {
    session: Option<S>,
    endpoint: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<S: TelemetrySession> ScopedSession<S> {
    /// Connect to the endpoint and wrap the resulting session.
    pub fn open<T>(telemetry: &mut T, endpoint: &str) -> Result<Self, CalibError>
    where
        T: JointTelemetry<Session = S>,
    {
        let session = telemetry.connect(endpoint)?;

        trace!("Telemetry session to {} opened", endpoint);

        Ok(Self {
            session: Some(session),
            endpoint: endpoint.to_string(),
        })
    }

    /// Read the arm's joint angles.
    ///
    /// Non-finite angles are reported as `TelemetryUnavailable`.
    pub fn get_joint_angles(&mut self) -> Result<Vec<f64>, CalibError> {
        let session = match self.session.as_mut() {
            Some(s) => s,
            None => return Err(CalibError::telemetry(&self.endpoint, "session already closed")),
        };

        let angles = session.get_joint_angles()?;

        if let Some(i) = angles.iter().position(|a| !a.is_finite()) {
            return Err(CalibError::telemetry(
                &self.endpoint,
                format!("joint {} reported a non-finite angle ({})", i, angles[i]),
            ));
        }

        Ok(angles)
    }

    /// Close the session now, reporting any error raised while closing.
    pub fn finish(mut self) -> Result<(), CalibError> {
        self.close_inner()
    }

    fn close_inner(&mut self) -> Result<(), CalibError> {
        match self.session.take() {
            Some(mut s) => {
                trace!("Telemetry session to {} closed", self.endpoint);
                s.close()
            }
            None => Ok(()),
        }
    }
}

impl<S: TelemetrySession> Drop for ScopedSession<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close_inner() {
            warn!("Failed to close telemetry session to {}: {}", self.endpoint, e);
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Open a session, read the joint angles once, and close the session.
pub fn read_joint_angles<T: JointTelemetry>(
    telemetry: &mut T,
    endpoint: &str,
) -> Result<Vec<f64>, CalibError> {
    let mut session = ScopedSession::open(telemetry, endpoint)?;
    let angles = session.get_joint_angles()?;
    session.finish()?;

    Ok(angles)
}
