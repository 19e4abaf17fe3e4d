pub mod walker;

pub use walker::{find_package_files, PackageWalker};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::errors::{Error, IoResultExt, Result};

/// Read and deserialize a protocol file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).with_path(path)?;
    serde_json::from_str(&contents).map_err(|source| Error::json(path, source))
}

/// Serialize `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value).map_err(|source| Error::json(path, source))?;
    json.push('\n');
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    fs::write(path, json).with_path(path)
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_path(path)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).with_path(path)?;
    }
    Ok(())
}
