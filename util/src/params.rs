//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::{fs::read_to_string, path::{Path, PathBuf}};
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (GELLO_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot read the parameter file {0:?}: {1}")]
    DeserialiseError(PathBuf, toml::de::Error)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the path of a parameter file.
///
/// The file path is relative to the "$GELLO_SW_ROOT/params" directory
pub fn get_path(param_file_path: &str) -> Result<PathBuf, LoadError> {
    let mut path = crate::host::get_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    Ok(path)
}

/// Load a parameter file
///
/// The file path is relative to the "$GELLO_SW_ROOT/params" directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    load_from_path(get_path(param_file_path)?)
}

/// Load a parameter file from an explicit path.
pub fn load_from_path<P, Q>(path: Q) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    Q: AsRef<Path>
{
    let path = path.as_ref();

    // Load the file into a string
    let params_str = read_to_string(path)
        .map_err(|e| LoadError::FileLoadError(path.to_path_buf(), e))?;

    // Parse the string into the parameter struct
    toml::from_str(params_str.as_str())
        .map_err(|e| LoadError::DeserialiseError(path.to_path_buf(), e))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct TestParams {
        name: String,
        precision: u32,
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("gello_util_params_{}_{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_from_path() {
        let path = temp_file("ok.toml", "name = \"left\"\nprecision = 6\n");

        let params: TestParams = load_from_path(&path).unwrap();
        assert_eq!(params, TestParams { name: "left".into(), precision: 6 });

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_path_errors() {
        let missing = std::env::temp_dir().join("gello_util_params_does_not_exist.toml");
        match load_from_path::<TestParams, _>(&missing) {
            Err(LoadError::FileLoadError(p, _)) => assert_eq!(p, missing),
            _ => panic!("Expected a file load error"),
        }

        let path = temp_file("bad.toml", "name = 3\n");
        match load_from_path::<TestParams, _>(&path) {
            Err(LoadError::DeserialiseError(_, _)) => (),
            _ => panic!("Expected a deserialise error"),
        }
        std::fs::remove_file(path).ok();
    }
}
