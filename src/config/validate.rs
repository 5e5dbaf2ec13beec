// src/config/validate.rs

use std::collections::BTreeSet;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, StepdagError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = StepdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(raw: &RawConfigFile) -> Result<()> {
    validate_runner_section(raw)?;
    validate_run_section(raw)?;
    Ok(())
}

fn validate_runner_section(raw: &RawConfigFile) -> Result<()> {
    if raw.runner.namespaces.is_empty() {
        return Err(StepdagError::ConfigError(
            "[runner].namespaces must list at least one namespace".to_string(),
        ));
    }

    let mut seen = BTreeSet::new();
    for namespace in &raw.runner.namespaces {
        if namespace.is_empty() {
            return Err(StepdagError::ConfigError(
                "[runner].namespaces must not contain empty entries".to_string(),
            ));
        }
        if !seen.insert(namespace.as_str()) {
            return Err(StepdagError::ConfigError(format!(
                "namespace '{namespace}' is listed twice in [runner].namespaces"
            )));
        }
    }

    if raw.runner.jobs == 0 {
        return Err(StepdagError::ConfigError(
            "[runner].jobs must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_run_section(raw: &RawConfigFile) -> Result<()> {
    if raw.run.final_steps.is_empty() {
        return Err(StepdagError::ConfigError(
            "[run].final_steps must name at least one step".to_string(),
        ));
    }
    Ok(())
}
