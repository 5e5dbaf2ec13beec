// src/config/mod.rs

//! TOML configuration for a runner and a run request.
//!
//! - [`model`] holds the raw serde model and the validated [`ConfigFile`].
//! - [`loader`] reads and validates config files.
//! - [`validate`] implements the raw → validated conversion.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{ConfigFile, RawConfigFile, RunSection, RunnerSection};
