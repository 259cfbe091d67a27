// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use rstest::rstest;

use super::*;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[rstest]
fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.source_dir, PathBuf::from("."));
    assert_eq!(settings.max_include_depth, 16);
    assert!(settings.default_environment().is_global());
}

#[rstest]
fn test_partial_yaml_keeps_defaults() {
    let settings = Settings::from_yaml("default_environment: dev.eu\n").unwrap();
    assert_eq!(settings.default_environment().canonical_form(), "dev.eu");
    assert_eq!(settings.poll_interval_ms, 2000);
    assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
}

#[rstest]
fn test_invalid_yaml_fails() {
    let err = Settings::from_yaml("max_include_depth: lots").unwrap_err();
    assert!(matches!(err, Error::InvalidSettings(_)));
}

#[rstest]
fn test_overrides_win() {
    let mut settings = Settings::from_yaml("source_dir: /etc/app\nmax_include_depth: 4\n").unwrap();
    settings
        .apply_overrides(lookup(&[
            (ENV_SOURCE_DIR, "/srv/config"),
            (ENV_DEFAULT_ENVIRONMENT, "prod"),
            (ENV_POLL_INTERVAL_MS, "250"),
        ]))
        .unwrap();

    assert_eq!(settings.source_dir, PathBuf::from("/srv/config"));
    assert_eq!(settings.default_environment, "prod");
    assert_eq!(settings.max_include_depth, 4);
    assert_eq!(settings.poll_interval(), Duration::from_millis(250));
}

#[rstest]
fn test_bad_numeric_override() {
    let mut settings = Settings::default();
    let err = settings
        .apply_overrides(lookup(&[(ENV_MAX_INCLUDE_DEPTH, "deep")]))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSettings(_)));
}

#[rstest]
fn test_file_settings_resolve_dir() {
    let tmp = tempfile::TempDir::new().unwrap();
    let file = tmp.path().join("confscope.yaml");
    std::fs::write(
        &file,
        format!("source_dir: {}\n", tmp.path().display()),
    )
    .unwrap();

    let mut settings = Settings::from_yaml(&std::fs::read_to_string(&file).unwrap()).unwrap();
    settings.apply_overrides(lookup(&[])).unwrap();
    let resolved = settings.resolved_source_dir().unwrap();
    assert_eq!(resolved, dunce::canonicalize(tmp.path()).unwrap());
}

#[rstest]
fn test_missing_source_dir() {
    let settings = Settings {
        source_dir: PathBuf::from("/definitely/not/here"),
        ..Default::default()
    };
    assert!(matches!(
        settings.resolved_source_dir(),
        Err(Error::ReadFailed { .. })
    ));
}
