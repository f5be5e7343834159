//! Simulated UR5 telemetry server for bench testing the calibration tools.
//!
//! Replies to every joint state request with a fixed pose.
//!
//! ```text
//! test_telem_server --endpoint tcp://*:5010 --q-rad 0.0,-1.57,1.57,0.0,1.57,3.2
//! ```

use comms_if::{
    eqpt::ur::{JointState, UrTelemRequest, UrTelemResponse, NUM_UR_JOINTS},
    net::{self, SocketOptions},
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "test_telem_server", about = "Simulated UR5 joint telemetry server")]
struct Opts {
    /// Endpoint to bind the reply socket to
    #[structopt(long, default_value = "tcp://*:5010")]
    endpoint: String,

    /// Joint positions to report, in radians
    #[structopt(long, use_delimiter = true, allow_hyphen_values = true)]
    q_rad: Vec<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::from_args();

    let q_rad = if opts.q_rad.is_empty() {
        vec![0.0; NUM_UR_JOINTS]
    } else {
        opts.q_rad
    };

    // Create the context for zmq
    let ctx = net::zmq::Context::new();

    let socket = net::open_socket(&ctx, net::zmq::REP, &SocketOptions::server(), &opts.endpoint)?;

    println!("Telemetry server running on {}, reporting {:?}", opts.endpoint, q_rad);

    // Respond to client requests
    loop {
        let response = match net::recv_json::<UrTelemRequest>(&socket) {
            Ok(UrTelemRequest::JointState) => {
                UrTelemResponse::JointState(JointState::now(q_rad.clone()))
            }
            Ok(UrTelemRequest::Ping) => UrTelemResponse::Pong,
            Err(e) => {
                println!("Invalid request: {}", e);
                UrTelemResponse::Unavailable(e.to_string())
            }
        };

        net::send_json(&socket, &response)?;
    }
}
