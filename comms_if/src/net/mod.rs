//! # Network Module
//!
//! This module provides networking abstractions over ZMQ, the networking library chosen for the
//! software. Messages are exchanged as JSON strings.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use zmq::{Context, Socket, SocketType};

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| NetError::SocketOptionError(stringify!($opt).into(), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Represents options which can be set on a socket.
///
/// Most options here correspond to those found in the
/// [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt) documentation. All times are in
/// milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketOptions {

    /// Indicates if the socket should bind itself to the endpoint. Servers should have this value
    /// set as `true`, clients should have it set as `false`.
    ///
    /// The default value is `false`.
    pub bind: bool,

    /// `ZMQ_REQ_CORRELATE`: Match replies with requests
    pub req_correlate: bool,

    /// `ZMQ_REQ_RELAXED`: relax strict alternation between request and reply
    pub req_relaxed: bool,

    /// `ZMQ_LINGER`: Set linger period for socket shutdown
    pub linger: i32,

    /// `ZMQ_CONNECT_TIMEOUT`: Set `connect()` timeout
    pub connect_timeout: i32,

    /// `ZMQ_RCVTIMEO`: Maximum time before a recv operation returns with `EAGAIN`
    pub recv_timeout: i32,

    /// `ZMQ_SNDTIMEO`: Maximum time before a send operation returns with `EAGAIN`
    pub send_timeout: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum NetError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Could not connect the socket to {0}: {1}")]
    CouldNotConnect(String, zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(String, zmq::Error),

    #[error("Could not send the message: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message: {0}")]
    RecvError(zmq::Error),

    #[error("Recieved a message which is not valid UTF-8")]
    NonUtf8Message,

    #[error("Could not serialize the message: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the message: {0}")]
    DeserializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SocketOptions {
    /// Options for a client request socket which gives up after the given timeout.
    pub fn client(timeout_ms: i32) -> Self {
        Self {
            connect_timeout: timeout_ms,
            recv_timeout: timeout_ms,
            send_timeout: timeout_ms,
            linger: 0,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        }
    }

    /// Options for a server reply socket.
    pub fn server() -> Self {
        Self {
            bind: true,
            ..Default::default()
        }
    }

    /// Set these options on the given socket.
    pub fn set(&self, socket: &Socket) -> Result<(), NetError> {

        // Set all the socket options, we use a macro here to make the error handling nice and
        // easy
        set_sockopts!(
            socket,
            (set_connect_timeout, self.connect_timeout),
            (set_linger, self.linger),
            (set_rcvtimeo, self.recv_timeout),
            (set_sndtimeo, self.send_timeout)
        );

        // If the socket is a req type set the req-specific options
        if let Ok(SocketType::REQ) = socket.get_socket_type() {
            set_sockopts!(
                socket,
                (set_req_correlate, self.req_correlate),
                (set_req_relaxed, self.req_relaxed)
            );
        }

        Ok(())
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        // Defaults for sockopts taken from http://api.zeromq.org/4-2:zmq-setsockopt
        Self {
            bind: false,
            connect_timeout: 0,
            linger: 30_000,
            recv_timeout: -1,
            req_correlate: false,
            req_relaxed: false,
            send_timeout: -1
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create a socket, set its options and connect or bind it to the endpoint.
///
/// ## Arguments
/// - `ctx`: the zmq context which will be used to create the socket
/// - `socket_type`: the type of zmq socket to create
/// - `socket_options`: a [`SocketOptions`] struct specifying how to configure the socket
/// - `endpoint`: a zmq endpoint string, such as `"tcp://192.168.1.211:5010"`
pub fn open_socket(
    ctx: &Context,
    socket_type: SocketType,
    socket_options: &SocketOptions,
    endpoint: &str
) -> Result<Socket, NetError> {
    let socket = ctx.socket(socket_type)
        .map_err(NetError::CreateSocketError)?;

    socket_options.set(&socket)?;

    match socket_options.bind {
        false => socket.connect(endpoint),
        true => socket.bind(endpoint)
    }.map_err(|e| NetError::CouldNotConnect(endpoint.to_string(), e))?;

    Ok(socket)
}

/// Serialize a message to JSON and send it on the socket.
pub fn send_json<T: Serialize>(socket: &Socket, message: &T) -> Result<(), NetError> {
    let msg_str = serde_json::to_string(message)
        .map_err(NetError::SerializationError)?;

    trace!("Sending {}", msg_str);

    socket.send(msg_str.as_str(), 0)
        .map_err(NetError::SendError)
}

/// Recieve a JSON message from the socket and deserialize it.
pub fn recv_json<T: DeserializeOwned>(socket: &Socket) -> Result<T, NetError> {
    let msg = socket.recv_msg(0)
        .map_err(NetError::RecvError)?;

    let msg_str = msg.as_str().ok_or(NetError::NonUtf8Message)?;

    trace!("Recieved {}", msg_str);

    serde_json::from_str(msg_str)
        .map_err(NetError::DeserializeError)
}

/// Send a request and wait for the response, within the socket's timeouts.
pub fn request<Q, R>(socket: &Socket, request: &Q) -> Result<R, NetError>
where
    Q: Serialize,
    R: DeserializeOwned
{
    send_json(socket, request)?;
    recv_json(socket)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::ur::{JointState, UrTelemRequest, UrTelemResponse};

    #[test]
    fn test_request_response() {
        let ctx = Context::new();
        let endpoint = "inproc://net_test_request_response";

        let server = open_socket(&ctx, zmq::REP, &SocketOptions::server(), endpoint).unwrap();
        let client = open_socket(&ctx, zmq::REQ, &SocketOptions::client(1000), endpoint).unwrap();

        let handle = std::thread::spawn(move || {
            let req: UrTelemRequest = recv_json(&server).unwrap();
            assert_eq!(req, UrTelemRequest::Ping);
            send_json(&server, &UrTelemResponse::Pong).unwrap();

            let req: UrTelemRequest = recv_json(&server).unwrap();
            assert_eq!(req, UrTelemRequest::JointState);
            send_json(
                &server,
                &UrTelemResponse::JointState(JointState::now(vec![0.1; 6]))
            ).unwrap();
        });

        let pong: UrTelemResponse = request(&client, &UrTelemRequest::Ping).unwrap();
        assert_eq!(pong, UrTelemResponse::Pong);

        match request(&client, &UrTelemRequest::JointState).unwrap() {
            UrTelemResponse::JointState(js) => assert_eq!(js.q_rad, vec![0.1; 6]),
            r => panic!("Unexpected response {:?}", r),
        }

        handle.join().unwrap();
    }

    #[test]
    fn test_request_times_out_without_server() {
        let ctx = Context::new();
        let client = open_socket(
            &ctx,
            zmq::REQ,
            &SocketOptions::client(50),
            "tcp://127.0.0.1:59999"
        ).unwrap();

        let result: Result<UrTelemResponse, _> = request(&client, &UrTelemRequest::JointState);
        assert!(result.is_err());
    }

    #[test]
    fn test_socket_options_partial_defaults() {
        let opts: SocketOptions = serde_json::from_str("{\"recv_timeout\": 250}").unwrap();
        assert_eq!(opts.recv_timeout, 250);
        assert_eq!(opts.linger, 30_000);
        assert!(!opts.bind);
    }
}
