// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Read a configuration file and return the raw model.
///
/// This only performs TOML deserialization; it does **not** validate. Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    load_from_str(&contents)
}

/// Parse a configuration from TOML text without validating it.
pub fn load_from_str(contents: &str) -> Result<RawConfigFile> {
    let raw: RawConfigFile = toml::from_str(contents)?;
    Ok(raw)
}

/// Load a configuration file and validate it.
///
/// This is the recommended entry point:
/// - reads TOML, applying serde defaults;
/// - checks namespaces (non-empty, no duplicates), `jobs >= 1`, and that
///   `final_steps` is non-empty;
/// - converts `[run.config]` values for step constructors.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(path)?;
    ConfigFile::try_from(raw)
}
