use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::SeedprobeConfig;
use crate::errors::{Error, IoResultExt, Result};

pub const CONFIG_FILE_NAME: &str = ".seedprobe.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Read a config file into a string
pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Pure function to parse and validate config from TOML string
pub fn parse_and_validate_config(contents: &str) -> std::result::Result<SeedprobeConfig, String> {
    let config = toml::from_str::<SeedprobeConfig>(contents)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))?;
    config.validate()?;
    Ok(config)
}

/// Try loading a discovered config; problems are logged, never fatal
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<SeedprobeConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{} ({}). Using defaults.", e, config_path.display());
            None
        }
    }
}

/// Handle file read errors with appropriate logging
pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Directory ancestors of `start`, itself included, up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Discover `.seedprobe.toml` from the working directory upwards
pub fn load_config() -> SeedprobeConfig {
    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            return SeedprobeConfig::default();
        }
    };
    discover_config(current)
}

pub(crate) fn discover_config(start: PathBuf) -> SeedprobeConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            SeedprobeConfig::default()
        })
}

/// Load an explicitly requested config file; any problem is fatal
pub fn load_config_from(path: &Path) -> Result<SeedprobeConfig> {
    let contents = read_config_file(path).with_path(path)?;
    let config = parse_and_validate_config(&contents).map_err(Error::Config)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}
