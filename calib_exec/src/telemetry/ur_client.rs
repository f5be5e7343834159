//! # UR5 telemetry client
//!
//! Reads the follower arm's joint state from a UR5 telemetry server over a ZMQ request socket.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::ur::{UrTelemRequest, UrTelemResponse},
    net::{self, zmq, SocketOptions},
};
use log::debug;

use super::{JointTelemetry, TelemetrySession};
use crate::error::CalibError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Opens telemetry sessions to UR5 telemetry servers.
pub struct UrTelemClient {
    ctx: zmq::Context,

    socket_options: SocketOptions,
}

/// A request socket connected to one telemetry server.
pub struct UrTelemSession {
    socket: zmq::Socket,

    endpoint: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl UrTelemClient {
    /// Create a new client.
    ///
    /// The socket options should include send and receive timeouts, otherwise a missing server
    /// blocks the client forever.
    pub fn new(socket_options: SocketOptions) -> Self {
        Self {
            ctx: zmq::Context::new(),
            socket_options: SocketOptions {
                bind: false,
                ..socket_options
            },
        }
    }
}

impl JointTelemetry for UrTelemClient {
    type Session = UrTelemSession;

    /// Connect to the server and check it is responding.
    fn connect(&mut self, endpoint: &str) -> Result<UrTelemSession, CalibError> {
        let socket = net::open_socket(&self.ctx, zmq::REQ, &self.socket_options, endpoint)
            .map_err(|e| CalibError::telemetry(endpoint, e))?;

        // ZMQ connects lazily, so ping the server to find out if anything is there
        match net::request(&socket, &UrTelemRequest::Ping) {
            Ok(UrTelemResponse::Pong) => (),
            Ok(r) => {
                return Err(CalibError::telemetry(
                    endpoint,
                    format!("unexpected reply to ping: {:?}", r),
                ))
            }
            Err(e) => return Err(CalibError::telemetry(endpoint, e)),
        }

        debug!("Connected to UR telemetry server at {}", endpoint);

        Ok(UrTelemSession {
            socket,
            endpoint: endpoint.to_string(),
        })
    }
}

impl TelemetrySession for UrTelemSession {
    fn get_joint_angles(&mut self) -> Result<Vec<f64>, CalibError> {
        let response = net::request(&self.socket, &UrTelemRequest::JointState)
            .map_err(|e| CalibError::telemetry(&self.endpoint, e))?;

        match response {
            UrTelemResponse::JointState(js) => {
                debug!("Joint state at {}: {:?}", js.timestamp, js.q_rad);
                Ok(js.q_rad)
            }
            UrTelemResponse::Unavailable(reason) => {
                Err(CalibError::telemetry(&self.endpoint, reason))
            }
            r => Err(CalibError::telemetry(
                &self.endpoint,
                format!("unexpected reply to joint state request: {:?}", r),
            )),
        }
    }

    fn close(&mut self) -> Result<(), CalibError> {
        self.socket
            .disconnect(&self.endpoint)
            .map_err(|e| CalibError::telemetry(&self.endpoint, e))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::ur::JointState;
    use crate::telemetry::read_joint_angles;

    #[test]
    fn test_read_from_server() {
        let endpoint = "tcp://127.0.0.1:58321";
        let ctx = zmq::Context::new();
        let server = net::open_socket(&ctx, zmq::REP, &SocketOptions::server(), endpoint).unwrap();

        let handle = std::thread::spawn(move || {
            for _ in 0..2 {
                let response = match net::recv_json(&server).unwrap() {
                    UrTelemRequest::Ping => UrTelemResponse::Pong,
                    UrTelemRequest::JointState => {
                        UrTelemResponse::JointState(JointState::now(vec![0.5; 6]))
                    }
                };
                net::send_json(&server, &response).unwrap();
            }
        });

        let mut client = UrTelemClient::new(SocketOptions::client(2000));
        assert_eq!(read_joint_angles(&mut client, endpoint).unwrap(), vec![0.5; 6]);

        handle.join().unwrap();
    }

    #[test]
    fn test_connect_without_server() {
        let mut client = UrTelemClient::new(SocketOptions::client(50));

        match client.connect("tcp://127.0.0.1:58322") {
            Err(CalibError::TelemetryUnavailable { endpoint, .. }) => {
                assert_eq!(endpoint, "tcp://127.0.0.1:58322")
            }
            Err(e) => panic!("Expected TelemetryUnavailable, got {}", e),
            Ok(_) => panic!("Expected the connection to fail"),
        }
    }
}
