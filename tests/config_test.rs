//! Integration tests for Settings loading with layered precedence.
//!
//! These tests pass an explicit global config path so the user's own
//! configuration never leaks in. Environment overrides are not exercised
//! here since tests run in parallel within one process.

use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use jtree::application::ApplicationError;
use jtree::config::{local_config_path, Settings};

#[rstest]
fn given_no_config_files_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();
    let settings =
        Settings::load_layers(Some(&dir.path().join("missing.toml")), Some(dir.path())).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.document.children_key, "children");
    assert!(settings.editing.enabled);
    assert!(!settings.template.strip_nested_flags);
}

#[rstest]
fn given_global_config_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("jtree.toml");
    fs::write(
        &global,
        r#"
[document]
children_key = "items"
pretty = false
"#,
    )
    .unwrap();

    let settings = Settings::load_layers(Some(&global), None).unwrap();

    assert_eq!(settings.document.children_key, "items");
    assert!(!settings.document.pretty);
    assert!(settings.editing.honor_read_only, "untouched keys keep defaults");
}

#[rstest]
fn given_local_config_when_load_then_wins_over_global() {
    let global_dir = TempDir::new().unwrap();
    let global = global_dir.path().join("jtree.toml");
    fs::write(
        &global,
        r#"
[template]
strip_nested_flags = true

[document]
children_key = "items"
"#,
    )
    .unwrap();

    let doc_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(doc_dir.path()),
        r#"
[document]
children_key = "nodes"

[editing]
honor_read_only = false
"#,
    )
    .unwrap();

    let settings = Settings::load_layers(Some(&global), Some(doc_dir.path())).unwrap();

    assert_eq!(settings.document.children_key, "nodes");
    assert!(settings.template.strip_nested_flags, "global value survives");
    assert!(!settings.editing.honor_read_only);
}

#[rstest]
fn given_empty_children_key_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "[document]\nchildren_key = \"\"\n",
    )
    .unwrap();

    let result = Settings::load_layers(None, Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[rstest]
fn given_malformed_toml_when_load_then_config_error_names_file() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[editing\nenabled = ").unwrap();

    let err = Settings::load_layers(None, Some(dir.path())).unwrap_err();

    assert!(err.to_string().contains(".jtree.toml"), "got: {err}");
}

#[rstest]
fn given_settings_when_rendered_then_toml_round_trips() {
    let mut settings = Settings::default();
    settings.editing.enabled = false;

    let text = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&text).unwrap();

    assert_eq!(parsed, settings);
}
