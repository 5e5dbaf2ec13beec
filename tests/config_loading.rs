// tests/config_loading.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;

use serde_json::json;

use stepdag::config::{load_from_str, ConfigFile};
use stepdag::StepdagError;

type TestResult = Result<(), Box<dyn Error>>;

fn validate(contents: &str) -> stepdag::Result<ConfigFile> {
    ConfigFile::try_from(load_from_str(contents)?)
}

#[test]
fn a_full_config_parses_and_validates() -> TestResult {
    init_tracing();

    let cfg = validate(
        r#"
        [runner]
        namespaces = ["app::steps", "app::extra"]
        jobs = 4

        [run]
        final_steps = ["app::steps::Publish"]

        [run.config]
        out_dir = "/tmp/out"
        attempts = 3
        flags = ["fast", "quiet"]

        [run.config.limits]
        cpu = 2
        "#,
    )?;

    assert_eq!(cfg.namespaces, vec!["app::steps", "app::extra"]);
    assert_eq!(cfg.jobs, 4);
    assert_eq!(cfg.final_steps, vec!["app::steps::Publish"]);

    assert_eq!(cfg.config.get("out_dir"), Some(&json!("/tmp/out")));
    assert_eq!(cfg.config.get("attempts"), Some(&json!(3)));
    assert_eq!(cfg.config.get("flags"), Some(&json!(["fast", "quiet"])));
    assert_eq!(cfg.config.get("limits"), Some(&json!({ "cpu": 2 })));

    let request = cfg.run_request();
    assert_eq!(request.final_steps, cfg.final_steps);
    assert_eq!(request.config, cfg.config);

    Ok(())
}

#[test]
fn jobs_default_to_one() -> TestResult {
    init_tracing();

    let cfg = validate(
        r#"
        [runner]
        namespaces = ["app::steps"]

        [run]
        final_steps = ["app::steps::Publish"]
        "#,
    )?;

    assert_eq!(cfg.jobs, 1);
    Ok(())
}

#[test]
fn zero_jobs_are_rejected() {
    init_tracing();

    let err = validate(
        r#"
        [runner]
        namespaces = ["app::steps"]
        jobs = 0

        [run]
        final_steps = ["app::steps::Publish"]
        "#,
    )
    .unwrap_err();

    assert!(matches!(err, StepdagError::ConfigError(_)), "{err}");
    assert!(err.to_string().contains("jobs"));
}

#[test]
fn missing_namespaces_are_rejected() {
    init_tracing();

    let err = validate(
        r#"
        [run]
        final_steps = ["app::steps::Publish"]
        "#,
    )
    .unwrap_err();

    assert!(matches!(err, StepdagError::ConfigError(_)), "{err}");
    assert!(err.to_string().contains("namespaces"));
}

#[test]
fn duplicate_namespaces_are_rejected() {
    init_tracing();

    let err = validate(
        r#"
        [runner]
        namespaces = ["app::steps", "app::steps"]

        [run]
        final_steps = ["app::steps::Publish"]
        "#,
    )
    .unwrap_err();

    assert!(matches!(err, StepdagError::ConfigError(_)), "{err}");
    assert!(err.to_string().contains("twice"));
}

#[test]
fn empty_final_steps_are_rejected() {
    init_tracing();

    let err = validate(
        r#"
        [runner]
        namespaces = ["app::steps"]
        "#,
    )
    .unwrap_err();

    assert!(matches!(err, StepdagError::ConfigError(_)), "{err}");
    assert!(err.to_string().contains("final_steps"));
}

#[test]
fn invalid_toml_is_a_parse_error() {
    init_tracing();

    let err = load_from_str("this is not toml [").unwrap_err();
    assert!(matches!(err, StepdagError::TomlError(_)));
}
