// src/types.rs

use serde::Deserialize;
use serde_json::Value;

/// Timestamp reported by steps via `last_run_time`, in milliseconds since the
/// Unix epoch.
///
/// Comparisons use strict `>`: a step whose timestamp equals the newest
/// timestamp among its inputs is considered stale.
pub type RunTimestamp = i64;

/// Current wall-clock time as a [`RunTimestamp`].
///
/// Step implementations that stamp their own completion time can use this;
/// the core itself never assigns timestamps on a step's behalf.
pub fn current_timestamp() -> RunTimestamp {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Declared shape of a dependency or production value.
///
/// Kinds are diagnostic: a produced value that does not match its declared
/// kind is logged as a warning when merged, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Any,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl Default for ValueKind {
    fn default() -> Self {
        ValueKind::Any
    }
}

impl ValueKind {
    /// Whether `value` has this declared shape.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::Any => true,
            ValueKind::Bool => value.is_boolean(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            ValueKind::Float => value.is_f64(),
            ValueKind::String => value.is_string(),
            ValueKind::Array => value.is_array(),
            ValueKind::Object => value.is_object(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Any => "any",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}
