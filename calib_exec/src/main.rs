//! # Calibration Executable
//!
//! Zeroes a GELLO leader arm against the current pose of its UR5 follower and writes the new
//! offsets into the offsets store.
//!
//! ```text
//! calib_exec left --samples 10
//! calib_exec right --signs 1,1,-1,1,1,1 --dry-run
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::info;
use serde::Serialize;
use std::convert::TryFrom;
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use calib_lib::{
    calibrator::{check_precision, Calibrator},
    params::CalibExecParams,
    record::{AngleUnit, JointSign},
    store::OffsetStore,
    telemetry::UrTelemClient,
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
#[structopt(name = "calib_exec", about = "Calibrate a GELLO arm against its UR5 follower")]
struct Opts {
    /// Name of the arm to calibrate, as it appears in the offsets store
    arm: String,

    /// Offsets store to use instead of the one in the parameters
    #[structopt(long, parse(from_os_str))]
    store: Option<PathBuf>,

    /// Number of decimal places to round the offsets to
    #[structopt(long)]
    precision: Option<u32>,

    /// Number of follower snapshots to average
    #[structopt(long)]
    samples: Option<usize>,

    /// Replace the arm's joint signs, one 1 or -1 per joint
    #[structopt(long, use_delimiter = true, allow_hyphen_values = true)]
    signs: Vec<i64>,

    /// Compute and report the offsets without writing the store
    #[structopt(long)]
    dry_run: bool,

    /// Parameter file, relative to the params directory
    #[structopt(long, default_value = "calib_exec.toml")]
    params: String,
}

/// Report of a calibration saved into the session directory.
#[derive(Debug, Serialize)]
struct CalibReport<'a> {
    arm: &'a str,
    endpoint: &'a str,
    units: AngleUnit,
    offsets: &'a [f64],
    offsets_rad: &'a [f64],
    signs: &'a [JointSign],
    start_joints: &'a [f64],
    dry_run: bool,
    backup: Option<PathBuf>,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("calib_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("GELLO Calibration Executable\n");
    info!(
        "Running on: {}",
        host::get_hostname().unwrap_or_else(|| String::from("<unknown host>"))
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let mut params: CalibExecParams =
        util::params::load(&opts.params).wrap_err("Could not load calibration parameters")?;

    if let Some(p) = opts.precision {
        params.calibrator.precision = p;
    }
    if let Some(n) = opts.samples {
        params.calibrator.num_samples = n;
    }

    check_precision(params.calibrator.precision).wrap_err("Invalid calibration precision")?;

    let store_path = match opts.store {
        Some(ref p) => p.clone(),
        None => params.store_path_in(
            &host::get_sw_root().wrap_err("The GELLO_SW_ROOT environment variable is not set")?,
        ),
    };

    info!("Parameters loaded, using offsets store {:?}", store_path);

    // ---- LOAD RECORD ----

    let mut store = OffsetStore::load(&store_path)
        .wrap_err_with(|| format!("Could not load the offsets store {:?}", store_path))?;

    let mut record = store.get(&opts.arm)?.clone();

    if !opts.signs.is_empty() {
        let signs = opts
            .signs
            .iter()
            .map(|s| JointSign::try_from(*s))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| eyre!("Invalid --signs: {}", e))?;

        record
            .set_signs(signs)
            .map_err(|e| calib_lib::CalibError::malformed(&opts.arm, e))
            .wrap_err("Could not apply the signs given with --signs")?;

        info!("Using signs {:?}", record.signs());
    }

    // ---- CALIBRATE ----

    let telemetry = UrTelemClient::new(params.telem_socket.clone());
    let mut calibrator = Calibrator::new(telemetry, params.calibrator.clone());

    info!(
        "Reading {} sample(s) from the follower at {}",
        params.calibrator.num_samples, record.endpoint_address
    );

    let output = calibrator
        .calibrate(&opts.arm, &mut record)
        .wrap_err_with(|| format!("Failed to calibrate arm `{}`", opts.arm))?;

    println!("arm          = {}", opts.arm);
    println!("units        = {}", record.units());
    println!("offsets      = {:?}", record.offsets());
    println!("offsets_rad  = {:?}", output.offsets);
    println!(
        "signs        = {:?}",
        record.signs().iter().map(|s| s.as_i64()).collect::<Vec<_>>()
    );
    println!("start_joints = {:?}", output.start_joints);

    // ---- SAVE ----

    let backup = if opts.dry_run {
        info!("Dry run, the offsets store has not been modified");
        None
    } else {
        store.insert(opts.arm.as_str(), record.clone());
        store
            .save(&store_path)
            .wrap_err_with(|| format!("Could not save the offsets store {:?}", store_path))?
    };

    let report = CalibReport {
        arm: &opts.arm,
        endpoint: &record.endpoint_address,
        units: record.units(),
        offsets: record.offsets(),
        offsets_rad: &output.offsets,
        signs: record.signs(),
        start_joints: &output.start_joints,
        dry_run: opts.dry_run,
        backup,
    };

    let report_path = session
        .save_json(format!("{}_calibration.json", opts.arm), &report)
        .wrap_err("Could not save the calibration report")?;

    info!("Calibration report saved to {:?}", report_path);

    Ok(())
}
