//! # Joint Reading Executable
//!
//! Reads the UR5 follower's current joint angles and shows them in the frame of an arm's
//! calibration. When a leader reading is given it is mapped through the arm's record and compared
//! against the follower pose.
//!
//! ```text
//! read_joints left --leader 3072,2048,2048,1024,2048,0
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use calib_lib::{
    joint_mapper::JointMapper,
    params::CalibExecParams,
    record::AngleUnit,
    store::OffsetStore,
    telemetry::{read_joint_angles, UrTelemClient},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "read_joints", about = "Read the UR5 follower joints of a GELLO arm")]
struct Opts {
    /// Name of the arm, as it appears in the offsets store
    arm: String,

    /// Offsets store to use instead of the one in the parameters
    #[structopt(long, parse(from_os_str))]
    store: Option<PathBuf>,

    /// Follower endpoint to use instead of the one in the arm's record
    #[structopt(long)]
    endpoint: Option<String>,

    /// Print the reading as JSON
    #[structopt(long)]
    json: bool,

    /// Raw leader reading to compare against the follower, in the record's units
    #[structopt(long, use_delimiter = true, allow_hyphen_values = true)]
    leader: Vec<f64>,

    /// Parameter file, relative to the params directory
    #[structopt(long, default_value = "calib_exec.toml")]
    params: String,
}

#[derive(Debug, Serialize)]
struct JointsReport<'a> {
    arm: &'a str,
    endpoint: &'a str,
    units: AngleUnit,

    /// Follower joints in radians
    follower_rad: Vec<f64>,

    /// Follower joints in the record's units
    follower: Vec<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    leader: Option<LeaderReport>,
}

#[derive(Debug, Serialize)]
struct LeaderReport {
    raw: Vec<f64>,
    calibrated: Vec<f64>,
    residuals: Vec<f64>,
    rms_error: f64,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("read_joints", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Info, &session).wrap_err("Failed to initialise logging")?;

    info!("GELLO Joint Reader\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: CalibExecParams =
        util::params::load(&opts.params).wrap_err("Could not load calibration parameters")?;

    let store_path = match opts.store {
        Some(ref p) => p.clone(),
        None => params.store_path_in(
            &host::get_sw_root().wrap_err("The GELLO_SW_ROOT environment variable is not set")?,
        ),
    };

    let store = OffsetStore::load(&store_path)
        .wrap_err_with(|| format!("Could not load the offsets store {:?}", store_path))?;
    let record = store.get(&opts.arm)?;

    let endpoint = opts
        .endpoint
        .clone()
        .unwrap_or_else(|| record.endpoint_address.clone());

    // ---- READ ----

    let mut telemetry = UrTelemClient::new(params.telem_socket.clone());
    let follower_rad = read_joint_angles(&mut telemetry, &endpoint)
        .wrap_err_with(|| format!("Could not read the follower joints of arm `{}`", opts.arm))?;

    let units = record.units();
    let follower: Vec<f64> = follower_rad.iter().map(|q| units.from_rad(*q)).collect();

    let leader = if opts.leader.is_empty() {
        None
    } else {
        let mapper = JointMapper::new(&opts.arm, record);

        Some(LeaderReport {
            calibrated: mapper.map_all(&opts.leader)?,
            residuals: mapper.residuals(&follower, &opts.leader)?,
            rms_error: mapper.rms_error(&follower, &opts.leader)?,
            raw: opts.leader.clone(),
        })
    };

    let report = JointsReport {
        arm: &opts.arm,
        endpoint: &endpoint,
        units,
        follower_rad,
        follower,
        leader,
    };

    // ---- OUTPUT ----

    if opts.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).wrap_err("Could not serialize the reading")?
        );
    } else {
        println!("arm              = {}", report.arm);
        println!("endpoint         = {}", report.endpoint);
        println!("follower (rad)   = {:?}", report.follower_rad);
        println!("follower ({})   = {:?}", units, report.follower);

        if let Some(ref l) = report.leader {
            println!("leader raw       = {:?}", l.raw);
            println!("leader calibrated = {:?}", l.calibrated);
            println!("residuals        = {:?}", l.residuals);
            println!("rms error        = {:.6} {}", l.rms_error, units);
        }
    }

    session
        .save_json(format!("{}_joints.json", opts.arm), &report)
        .wrap_err("Could not save the joint reading")?;

    Ok(())
}
