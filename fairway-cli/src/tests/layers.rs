//! Configuration layering tests for the harvest command.

use super::*;
use camino::Utf8PathBuf;
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;
use std::time::Duration;

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "retries": "many" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "years": [2022, 2023],
            "database": "from-file.db",
            "delay_ms": 2000,
        }),
        None,
    );
    composer.push_environment(json!({
        "database": "from-env.db",
        "retries": 4,
    }));
    composer.push_cli(json!({
        "delay_ms": 100,
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.options.years, vec![2022, 2023]);
    assert_eq!(config.database, Utf8PathBuf::from("from-env.db"));
    assert_eq!(config.fetcher.retry.attempts, 4);
    assert_eq!(config.options.delay, Duration::from_millis(100));
}

#[rstest]
fn merged_values_are_still_validated() {
    let mut composer = MergeComposer::new();
    composer.push_environment(json!({ "backoff_base": 0.25 }));

    let err = config_from_layers_for_test(composer.layers()).expect_err("backoff too small");
    match err {
        CliError::InvalidArgument { field, .. } => assert_eq!(field, ARG_BACKOFF_BASE),
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}
