//! Manifest error-message and resolution integration tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rollout_core::{
    manifest::{self, MANIFEST_FILE},
    ConfigError, FunctionName, OptionValue, TriggerKind,
};

const FULL_MANIFEST: &str = r#"
project_id: acme-prod
region: europe-west1
functions:
  - name: users_created
    trigger: onCreate
    options: { documentPath: "users/{id}" }
    source: src/users/created.ts
  - name: nightly
    trigger: schedule
    options: { schedule: "every day 03:00", timeZone: Europe/Paris }
    region: us-east1
    runtime_options: { memory: 512MB, timeoutSeconds: 300 }
    source: src/jobs/nightly.ts
    output_dir: build/nightly
    aux_file: logger.js
  - name: broken
    trigger: onPigeon
    source: src/broken.ts
  - name: bad_v2
    trigger: topic
    options: { topic: orders, v2: true }
    source: src/orders.ts
"#;

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_manifest_returns_io_error() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let err = manifest::load_at(&root.path().join(MANIFEST_FILE)).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)), "got: {err}");
}

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let file = root.child(MANIFEST_FILE);
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = manifest::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains(MANIFEST_FILE));
}

#[test]
fn missing_project_id_is_fatal() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let file = root.child(MANIFEST_FILE);
    file.write_str("functions: []\n").expect("write");

    let err = manifest::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingProjectId), "got: {err}");
}

#[test]
fn duplicate_function_names_are_rejected() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let file = root.child(MANIFEST_FILE);
    file.write_str(
        "project_id: x\nfunctions:\n  - { name: a, trigger: onCall, source: a.ts }\n  - { name: a, trigger: onRequest, source: b.ts }\n",
    )
    .expect("write");

    let err = manifest::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateFunction(ref n) if n == "a"));
}

// ---------------------------------------------------------------------------
// 2. Resolution
// ---------------------------------------------------------------------------

#[test]
fn resolve_splits_valid_and_rejected_entries() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let file = root.child(MANIFEST_FILE);
    file.write_str(FULL_MANIFEST).expect("write");
    file.assert(predicate::path::exists());

    let project = manifest::load_at(file.path()).expect("load");
    let resolved = project.resolve();

    let names: Vec<_> = resolved.specs.iter().map(|s| s.function_name.0.as_str()).collect();
    assert_eq!(names, vec!["users_created", "nightly"]);

    assert_eq!(resolved.rejected.len(), 2);
    let (name, err) = &resolved.rejected[0];
    assert_eq!(name, &FunctionName::from("broken"));
    assert!(matches!(err, ConfigError::UnknownTrigger(kind) if kind == "onPigeon"));
    let (name, err) = &resolved.rejected[1];
    assert_eq!(name, &FunctionName::from("bad_v2"));
    assert!(matches!(err, ConfigError::InvalidV2Trigger { trigger: TriggerKind::Topic }));
}

#[test]
fn non_identifier_function_name_is_rejected_alone() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let file = root.child(MANIFEST_FILE);
    file.write_str(
        "project_id: x\nfunctions:\n  - { name: users-created, trigger: onCall, source: a.ts }\n  - { name: api, trigger: onRequest, source: b.ts }\n",
    )
    .expect("write");

    let resolved = manifest::load_at(file.path()).expect("load").resolve();
    assert_eq!(resolved.specs.len(), 1);
    assert_eq!(resolved.specs[0].function_name, FunctionName::from("api"));
    let (name, err) = &resolved.rejected[0];
    assert_eq!(name, &FunctionName::from("users-created"));
    assert!(matches!(err, ConfigError::InvalidFunctionName(n) if n == "users-created"));
    assert!(err.to_string().contains("not a valid JavaScript identifier"));
}

#[test]
fn resolve_applies_defaults_and_overrides() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let file = root.child(MANIFEST_FILE);
    file.write_str(FULL_MANIFEST).expect("write");

    let project = manifest::load_at(file.path()).expect("load");
    let resolved = project.resolve();

    let created = &resolved.specs[0];
    assert_eq!(created.trigger_kind, TriggerKind::OnCreate);
    assert_eq!(created.region, "europe-west1");
    assert_eq!(created.source_path, root.path().join("src/users/created.ts"));
    assert_eq!(
        created.output_dir,
        root.path().join("dist").join("functions").join("users_created")
    );
    assert!(created.runtime_options.is_none());
    assert!(created.cached_checksum.is_none());

    let nightly = &resolved.specs[1];
    assert_eq!(nightly.region, "us-east1");
    assert_eq!(nightly.output_dir, root.path().join("build/nightly"));
    assert_eq!(nightly.aux_file.as_deref(), Some(std::path::Path::new("logger.js")));
    let runtime = nightly.runtime_options.as_ref().expect("runtime options");
    assert_eq!(runtime["memory"], OptionValue::from("512MB"));
}
