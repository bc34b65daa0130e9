//! Tests for EditingService and DocumentService working on files

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::{json, Value};
use tempfile::TempDir;

use jtree::application::ApplicationError;
use jtree::config::Settings;
use jtree::domain::{DomainError, NodePath};
use jtree::infrastructure::di::ServiceContainer;
use jtree::util::testing;

const PIPELINE: &str = r#"{
  "name": "pipeline",
  "children": [
    {
      "name": "Filter",
      "isTemplate": true,
      "isMandatory": true,
      "expr": "x > 0",
      "_widget_:expr": "QLineEdit",
      "_regexp_:expr": "[a-z]+ [<>=] [0-9]+"
    },
    {"name": "Comment", "isTemplate": true, "text": ""},
    {
      "name": "Filter",
      "expr": "a > 1",
      "enabled": true,
      "limit": 10,
      "_widget_:enabled": "QCheckBox",
      "_widget_:limit": "QSpinBox",
      "_valuemin_:limit": 1,
      "_valuemax_:limit": 100,
      "_readonly_:expr": true
    }
  ]
}
"#;

struct Workspace {
    _dir: TempDir,
    file: PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    testing::init_test_setup();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("pipeline.json");
    fs::write(&file, PIPELINE).unwrap();
    Workspace { _dir: dir, file }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn path(p: &str) -> NodePath {
    p.parse().unwrap()
}

// ============================================================
// Documents
// ============================================================

#[rstest]
fn given_document_when_loading_and_saving_then_content_is_preserved(workspace: Workspace) {
    let services = ServiceContainer::new(Settings::default());
    let tree = services.documents.load(&workspace.file).unwrap();
    assert_eq!(tree.len(), 4);

    services.documents.save(&workspace.file, &tree).unwrap();

    let original: Value = serde_json::from_str(PIPELINE).unwrap();
    assert_eq!(read_json(&workspace.file), original);
}

#[rstest]
fn given_empty_children_arrays_when_adding_elsewhere_then_untouched_nodes_kept(
    workspace: Workspace,
) {
    let doc = r#"{"name": "root", "children": [
        {"name": "Group", "children": [], "isTemplate": true},
        {"children": [], "name": "Group"}
    ]}"#;
    fs::write(&workspace.file, doc).unwrap();
    let services = ServiceContainer::new(Settings::default());
    let mut tree = services.documents.load(&workspace.file).unwrap();

    services
        .editing
        .add(&mut tree, &NodePath::root(), "Group")
        .unwrap();
    services.documents.save(&workspace.file, &tree).unwrap();

    let saved = read_json(&workspace.file);
    assert_eq!(saved["children"][0], json!({"name": "Group", "children": [], "isTemplate": true}));
    assert_eq!(saved["children"][1], json!({"children": [], "name": "Group"}));
    assert_eq!(saved["children"][2], json!({"name": "Group", "children": []}));
    let second_keys: Vec<_> = saved["children"][1]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(second_keys, vec!["children", "name"]);
}

#[rstest]
fn given_compact_setting_when_rendering_then_single_line() {
    let mut settings = Settings::default();
    settings.document.pretty = false;
    let services = ServiceContainer::new(settings);
    let tree = jtree::TreeArena::from_json(&json!({"name": "a"}), "children").unwrap();
    assert_eq!(services.documents.render(&tree).unwrap(), "{\"name\":\"a\"}\n");
}

#[rstest]
fn given_malformed_json_when_loading_then_operation_failed(workspace: Workspace) {
    fs::write(&workspace.file, "{ not json").unwrap();
    let services = ServiceContainer::new(Settings::default());
    let err = services.documents.load(&workspace.file).unwrap_err();
    assert!(
        matches!(&err, ApplicationError::OperationFailed { context, .. } if context.starts_with("parse document")),
        "unexpected error: {err}"
    );
}

#[rstest]
fn given_array_document_when_loading_then_invalid_document(workspace: Workspace) {
    fs::write(&workspace.file, "[1, 2]").unwrap();
    let services = ServiceContainer::new(Settings::default());
    assert!(matches!(
        services.documents.load(&workspace.file),
        Err(ApplicationError::Domain(DomainError::InvalidDocument { .. }))
    ));
}

#[rstest]
fn given_missing_file_when_loading_then_read_fails() {
    let dir = TempDir::new().unwrap();
    let services = ServiceContainer::new(Settings::default());
    let err = services
        .documents
        .load(&dir.path().join("absent.json"))
        .unwrap_err();
    assert!(err.to_string().contains("read document"));
}

// ============================================================
// Actions
// ============================================================

#[rstest]
fn given_root_when_listing_actions_then_add_entries(workspace: Workspace) {
    let services = ServiceContainer::new(Settings::default());
    let tree = services.documents.load(&workspace.file).unwrap();
    let entries = services.editing.actions(&tree, &NodePath::root()).unwrap();
    let labels: Vec<_> = entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["Add 'Filter'", "Add 'Comment'"]);
}

#[rstest]
fn given_editing_disabled_when_listing_actions_then_none(workspace: Workspace) {
    let mut settings = Settings::default();
    settings.editing.enabled = false;
    let services = ServiceContainer::new(settings);
    let tree = services.documents.load(&workspace.file).unwrap();
    assert!(services.editing.actions(&tree, &NodePath::root()).unwrap().is_empty());
}

#[rstest]
fn given_bad_path_when_listing_actions_then_invalid_path(workspace: Workspace) {
    let services = ServiceContainer::new(Settings::default());
    let tree = services.documents.load(&workspace.file).unwrap();
    assert!(matches!(
        services.editing.actions(&tree, &path("/7")),
        Err(ApplicationError::Domain(DomainError::InvalidPath { .. }))
    ));
}

// ============================================================
// Add / remove
// ============================================================

#[rstest]
fn given_template_name_when_adding_then_saved_document_has_live_copy(workspace: Workspace) {
    let services = ServiceContainer::new(Settings::default());
    let mut tree = services.documents.load(&workspace.file).unwrap();

    let added = services
        .editing
        .add(&mut tree, &NodePath::root(), "comment")
        .unwrap();
    assert_eq!(added, path("/3"));
    services.documents.save(&workspace.file, &tree).unwrap();

    let saved = read_json(&workspace.file);
    assert_eq!(saved["children"][3], json!({"name": "Comment", "text": ""}));
}

#[rstest]
fn given_unknown_template_when_adding_then_template_not_found(workspace: Workspace) {
    let services = ServiceContainer::new(Settings::default());
    let mut tree = services.documents.load(&workspace.file).unwrap();
    let err = services
        .editing
        .add(&mut tree, &NodePath::root(), "Sort")
        .unwrap_err();
    assert_eq!(err.to_string(), "no template 'Sort' under /");
}

#[rstest]
fn given_last_filter_when_removing_then_mandatory_violation(workspace: Workspace) {
    let services = ServiceContainer::new(Settings::default());
    let mut tree = services.documents.load(&workspace.file).unwrap();
    let err = services.editing.remove(&mut tree, &path("/2")).unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::MandatoryViolation { .. })
    ));
    assert_eq!(tree.len(), 4);
}

#[rstest]
fn given_second_filter_when_removing_first_then_allowed(workspace: Workspace) {
    let services = ServiceContainer::new(Settings::default());
    let mut tree = services.documents.load(&workspace.file).unwrap();
    services
        .editing
        .add(&mut tree, &NodePath::root(), "Filter")
        .unwrap();
    services.editing.remove(&mut tree, &path("/2")).unwrap();

    let entries = services.editing.actions(&tree, &path("/2")).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].label, "Remove 'Filter'");
    assert!(!entries[0].enabled);
}

#[rstest]
fn given_root_when_removing_then_invalid_operation(workspace: Workspace) {
    let services = ServiceContainer::new(Settings::default());
    let mut tree = services.documents.load(&workspace.file).unwrap();
    assert!(matches!(
        services.editing.remove(&mut tree, &NodePath::root()),
        Err(ApplicationError::InvalidOperation(_))
    ));
}

#[rstest]
fn given_editing_disabled_when_adding_then_rejected(workspace: Workspace) {
    let mut settings = Settings::default();
    settings.editing.enabled = false;
    let services = ServiceContainer::new(settings);
    let mut tree = services.documents.load(&workspace.file).unwrap();
    assert!(matches!(
        services.editing.add(&mut tree, &NodePath::root(), "Comment"),
        Err(ApplicationError::Domain(DomainError::EditingDisabled))
    ));
    assert_eq!(tree.len(), 4);
}

#[rstest]
fn given_deep_strip_setting_when_adding_then_nested_markers_removed() {
    let mut settings = Settings::default();
    settings.template.strip_nested_flags = true;
    let services = ServiceContainer::new(settings);
    let doc = json!({
        "name": "root",
        "children": [{"name": "Group", "isTemplate": true, "children": [{"name": "Item", "isTemplate": true}]}]
    });
    let mut tree = jtree::TreeArena::from_json(&doc, "children").unwrap();

    services
        .editing
        .add(&mut tree, &NodePath::root(), "group")
        .unwrap();

    let item = path("/1/0").resolve(&tree).unwrap();
    assert!(!tree.attributes(item).unwrap().is_template());
}

// ============================================================
// Field editing
// ============================================================

#[rstest]
#[case("limit", "250", json!(100))]
#[case("limit", "-3", json!(1))]
#[case("limit", "42", json!(42))]
#[case("enabled", "false", json!(false))]
#[case("note", "anything", json!("anything"))]
fn given_hinted_field_when_setting_then_value_is_converted(
    workspace: Workspace,
    #[case] field: &str,
    #[case] raw: &str,
    #[case] expected: Value,
) {
    let services = ServiceContainer::new(Settings::default());
    let mut tree = services.documents.load(&workspace.file).unwrap();
    let stored = services
        .editing
        .set(&mut tree, &path("/2"), field, raw)
        .unwrap();
    assert_eq!(stored, expected);

    let node = path("/2").resolve(&tree).unwrap();
    assert_eq!(tree.attributes(node).unwrap().get(field), Some(&expected));
}

#[rstest]
fn given_read_only_field_when_setting_then_refused(workspace: Workspace) {
    let services = ServiceContainer::new(Settings::default());
    let mut tree = services.documents.load(&workspace.file).unwrap();
    assert!(matches!(
        services.editing.set(&mut tree, &path("/2"), "expr", "b < 2"),
        Err(ApplicationError::Domain(DomainError::ReadOnlyField { .. }))
    ));
}

#[rstest]
fn given_read_only_not_honored_when_setting_then_allowed(workspace: Workspace) {
    let mut settings = Settings::default();
    settings.editing.honor_read_only = false;
    let services = ServiceContainer::new(settings);
    let mut tree = services.documents.load(&workspace.file).unwrap();
    let stored = services
        .editing
        .set(&mut tree, &path("/2"), "expr", "b < 2")
        .unwrap();
    assert_eq!(stored, json!("b < 2"));
}

#[rstest]
fn given_template_regexp_when_setting_on_copy_then_pattern_enforced(workspace: Workspace) {
    let services = ServiceContainer::new(Settings::default());
    let mut tree = services.documents.load(&workspace.file).unwrap();
    let copy = services
        .editing
        .add(&mut tree, &NodePath::root(), "Filter")
        .unwrap();

    assert!(matches!(
        services.editing.set(&mut tree, &copy, "expr", "1 + 1"),
        Err(ApplicationError::Domain(DomainError::RejectedValue { .. }))
    ));
    let stored = services
        .editing
        .set(&mut tree, &copy, "expr", "y = 3")
        .unwrap();
    assert_eq!(stored, json!("y = 3"));
}

#[rstest]
fn given_custom_settings_when_wiring_then_shared_with_services() {
    let mut settings = Settings::default();
    settings.document.children_key = "items".to_string();
    let services = ServiceContainer::new(settings);
    assert_eq!(services.settings.document.children_key, "items");
    assert_eq!(Arc::strong_count(&services.settings), 3);
}
