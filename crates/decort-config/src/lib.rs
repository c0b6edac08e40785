//! Provider configuration for the DECORT controller client
//!
//! Options are read from a `provider "decort" { ... }` KDL block, from
//! `DECORT_*` environment variables, or set programmatically, then validated
//! into a [`ValidatedConfig`] before any network I/O happens.

pub mod authenticator;
pub mod error;
pub mod provider;
pub mod validate;

pub use authenticator::Authenticator;
pub use error::*;
pub use provider::{DEFAULT_REQUEST_TIMEOUT_SECS, ProviderConfig};
pub use validate::{Credentials, ValidatedConfig};

use std::path::PathBuf;

/// Environment variable that points directly at a config file.
pub const ENV_CONFIG_PATH: &str = "DECORT_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["decort.local.kdl", "decort.kdl"];

/// Global config directory (`~/.config/decort`)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("decort"))
}

/// Locate the provider config file.
///
/// Search order:
/// 1. `DECORT_CONFIG_PATH` (direct path)
/// 2. current directory: decort.local.kdl, decort.kdl
/// 3. `./.decort/` with the same names
/// 4. `~/.config/decort/decort.kdl`
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "{} points at a missing file: {}",
            ENV_CONFIG_PATH,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let local_dir = current_dir.join(".decort");
    if local_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = local_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("decort.kdl");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}
