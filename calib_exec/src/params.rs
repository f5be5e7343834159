//! # Calibration Executable Parameters
//!
//! Parameters shared by the calibration executables, loaded from `calib_exec.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::net::SocketOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::calibrator::CalibratorParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibExecParams {
    /// Path to the offsets store, relative to the software root unless absolute
    pub store_path: PathBuf,

    /// Calibrator parameters
    #[serde(default)]
    pub calibrator: CalibratorParams,

    /// Options for the follower telemetry request socket
    #[serde(default = "default_telem_socket")]
    pub telem_socket: SocketOptions,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CalibExecParams {
    /// Resolve the store path against the given software root.
    pub fn store_path_in(&self, sw_root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            sw_root.join(&self.store_path)
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_telem_socket() -> SocketOptions {
    SocketOptions::client(1000)
}
