//! # Offsets store
//!
//! An explicit map from arm name to [`OffsetRecord`], loaded from and saved to a TOML or JSON
//! document. The document format is chosen from the file extension.
//!
//! Saving keeps a timestamped backup of the document being replaced and writes the new document
//! through a temporary sibling file, so a failed save never leaves a partially written store.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::Utc;
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fs;
use std::path::{Path, PathBuf};

use util::session::TIMESTAMP_FORMAT;

use crate::{
    error::CalibError,
    record::{AngleUnit, JointSign, OffsetRecord},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Calibration records keyed by arm name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetStore {
    records: BTreeMap<String, OffsetRecord>,
}

/// A record as it appears in a document, before validation.
///
/// All fields except `units` are required, but are optional here so that a missing field can be
/// reported against the arm it belongs to. Signs are kept untyped so that any value other than
/// `1` or `-1` is reported the same way.
#[derive(Debug, Deserialize)]
struct RecordDoc {
    joint_ids: Option<Vec<u32>>,
    offsets: Option<Vec<f64>>,
    signs: Option<Vec<serde_json::Value>>,

    #[serde(default)]
    units: AngleUnit,

    connection_hint: Option<String>,
    endpoint_address: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Serialization format of an offsets document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Toml,
    Json,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StoreFormat {
    /// Determine the format of the document at the given path from its extension.
    pub fn from_path(path: &Path) -> Result<Self, CalibError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(StoreFormat::Toml),
            Some("json") => Ok(StoreFormat::Json),
            _ => Err(CalibError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl OffsetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the record of the given arm.
    pub fn get(&self, arm: &str) -> Result<&OffsetRecord, CalibError> {
        self.records
            .get(arm)
            .ok_or_else(|| CalibError::UnknownArm(arm.to_string()))
    }

    /// Get a mutable reference to the record of the given arm.
    pub fn get_mut(&mut self, arm: &str) -> Result<&mut OffsetRecord, CalibError> {
        self.records
            .get_mut(arm)
            .ok_or_else(|| CalibError::UnknownArm(arm.to_string()))
    }

    /// Insert or replace the record of an arm, returning the previous record if there was one.
    pub fn insert<A: Into<String>>(
        &mut self,
        arm: A,
        record: OffsetRecord,
    ) -> Option<OffsetRecord> {
        self.records.insert(arm.into(), record)
    }

    pub fn remove(&mut self, arm: &str) -> Option<OffsetRecord> {
        self.records.remove(arm)
    }

    /// Names of all arms in the store, in sorted order.
    pub fn arm_names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse a store from a document in the given format.
    ///
    /// Every record is validated, the first invalid record is reported as a `MalformedRecord`.
    pub fn from_str(contents: &str, format: StoreFormat) -> Result<Self, CalibError> {
        let docs: BTreeMap<String, RecordDoc> = match format {
            StoreFormat::Toml => {
                toml::from_str(contents).map_err(|e| CalibError::InvalidDocument(e.to_string()))?
            }
            StoreFormat::Json => serde_json::from_str(contents)
                .map_err(|e| CalibError::InvalidDocument(e.to_string()))?,
        };

        let mut records = BTreeMap::new();
        for (arm, doc) in docs {
            let record = doc.into_record(&arm)?;
            records.insert(arm, record);
        }

        Ok(Self { records })
    }

    /// Serialize the store into a document in the given format.
    pub fn to_string(&self, format: StoreFormat) -> Result<String, CalibError> {
        match format {
            StoreFormat::Toml => toml::to_string_pretty(&self.records)
                .map_err(|e| CalibError::Serialize(e.to_string())),
            StoreFormat::Json => serde_json::to_string_pretty(&self.records)
                .map_err(|e| CalibError::Serialize(e.to_string())),
        }
    }

    /// Load the store from the document at the given path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CalibError> {
        let path = path.as_ref();
        let format = StoreFormat::from_path(path)?;

        let contents =
            fs::read_to_string(path).map_err(|e| CalibError::StoreIo(path.to_path_buf(), e))?;

        let store = Self::from_str(&contents, format)?;

        debug!("Loaded {} arm record(s) from {:?}", store.len(), path);

        Ok(store)
    }

    /// Save the store to the document at the given path.
    ///
    /// If a document already exists at the path it is first copied to
    /// `<path>.bak.<YYYYmmdd_HHMMSS>`, and the path of that backup is returned.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<Option<PathBuf>, CalibError> {
        let path = path.as_ref();
        let format = StoreFormat::from_path(path)?;
        let contents = self.to_string(format)?;

        let backup = if path.exists() {
            let backup_path = sibling_path(
                path,
                &format!(".bak.{}", Utc::now().format(TIMESTAMP_FORMAT)),
            );
            fs::copy(path, &backup_path)
                .map_err(|e| CalibError::StoreIo(backup_path.clone(), e))?;
            info!("Backed up previous offsets store to {:?}", backup_path);
            Some(backup_path)
        } else {
            None
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| CalibError::StoreIo(parent.to_path_buf(), e))?;
            }
        }

        let tmp_path = sibling_path(path, ".tmp");
        fs::write(&tmp_path, contents).map_err(|e| CalibError::StoreIo(tmp_path.clone(), e))?;
        fs::rename(&tmp_path, path).map_err(|e| CalibError::StoreIo(path.to_path_buf(), e))?;

        info!("Saved {} arm record(s) to {:?}", self.len(), path);

        Ok(backup)
    }
}

impl RecordDoc {
    /// Validate the document fields and build a record for the given arm.
    fn into_record(self, arm: &str) -> Result<OffsetRecord, CalibError> {
        let missing = |field: &'static str| CalibError::MalformedRecord {
            arm: arm.to_string(),
            field,
            reason: String::from("field is missing"),
        };

        let joint_ids = self.joint_ids.ok_or_else(|| missing("joint_ids"))?;
        let offsets = self.offsets.ok_or_else(|| missing("offsets"))?;
        let raw_signs = self.signs.ok_or_else(|| missing("signs"))?;
        let connection_hint = self.connection_hint.ok_or_else(|| missing("connection_hint"))?;
        let endpoint_address = self
            .endpoint_address
            .ok_or_else(|| missing("endpoint_address"))?;

        let signs = raw_signs
            .iter()
            .map(sign_from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| CalibError::MalformedRecord {
                arm: arm.to_string(),
                field: "signs",
                reason,
            })?;

        OffsetRecord::new(joint_ids, offsets, signs, self.units)
            .map(|r| r.with_connection(connection_hint, endpoint_address))
            .map_err(|e| CalibError::malformed(arm, e))
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Read a sign from a document value, accepting the numbers `1` and `-1` as integers or floats.
fn sign_from_value(value: &serde_json::Value) -> Result<JointSign, String> {
    if let Some(i) = value.as_i64() {
        return JointSign::try_from(i);
    }

    match value.as_f64() {
        Some(f) if f == 1.0 => Ok(JointSign::Positive),
        Some(f) if f == -1.0 => Ok(JointSign::Negative),
        _ => Err(format!("sign must be 1 or -1, found {}", value)),
    }
}

/// Append a suffix to the full file name of a path.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
