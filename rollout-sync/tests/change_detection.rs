//! Checksum engine behaviour across builds: skip, force, persistence and
//! digest properties.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use proptest::prelude::*;
use tempfile::TempDir;

use rollout_core::{BuildArtifact, FunctionSpec, OptionMap, TriggerKind};
use rollout_sync::{
    change::artifact_checksum, check_for_changes, digest, persist_checksum, read_checksum,
    ChangeSignal,
};

fn built_function(tmp: &TempDir, name: &str, bundle: &str) -> (FunctionSpec, BuildArtifact) {
    let out = tmp.path().join("dist").join("functions").join(name);
    fs::create_dir_all(&out).expect("create output dir");
    let main = out.join("index.js");
    fs::write(&main, bundle).expect("write bundle");
    let spec = FunctionSpec {
        function_name: name.into(),
        trigger_kind: TriggerKind::OnCall,
        trigger_options: OptionMap::new(),
        region: "us-central1".into(),
        runtime_options: None,
        source_path: PathBuf::from("src").join(format!("{name}.ts")),
        output_dir: out.clone(),
        aux_file: None,
        environment: BTreeMap::from([("NODE_ENV".to_string(), "production".to_string())]),
        cached_checksum: None,
    };
    (
        spec,
        BuildArtifact {
            output_dir: out,
            main_file: main,
        },
    )
}

#[test]
fn second_identical_build_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let (spec, artifact) = built_function(&tmp, "checkout", "exports.a = 1;");

    let first = check_for_changes(&spec, &artifact, false);
    assert!(first.is_changed());
    persist_checksum(&spec.output_dir, first.checksum());

    let second = check_for_changes(&spec, &artifact, false);
    assert_eq!(
        second,
        ChangeSignal::Unchanged {
            checksum: first.checksum().unwrap().to_string()
        }
    );
}

#[test]
fn rebuilt_bundle_is_redeployed() {
    let tmp = TempDir::new().unwrap();
    let (spec, artifact) = built_function(&tmp, "checkout", "exports.a = 1;");
    let first = check_for_changes(&spec, &artifact, false);
    persist_checksum(&spec.output_dir, first.checksum());

    fs::write(&artifact.main_file, "exports.a = 2;").unwrap();
    let second = check_for_changes(&spec, &artifact, false);
    assert!(second.is_changed());
    assert_ne!(second.checksum(), first.checksum());
}

#[test]
fn force_always_redeploys() {
    let tmp = TempDir::new().unwrap();
    let (spec, artifact) = built_function(&tmp, "checkout", "exports.a = 1;");
    let first = check_for_changes(&spec, &artifact, false);
    persist_checksum(&spec.output_dir, first.checksum());

    assert!(check_for_changes(&spec, &artifact, true).is_changed());
}

#[test]
fn remote_baseline_skips_without_local_file() {
    let tmp = TempDir::new().unwrap();
    let (spec, artifact) = built_function(&tmp, "checkout", "exports.a = 1;");
    let digest = artifact_checksum(&spec, &artifact).unwrap();
    assert_eq!(read_checksum(&spec.output_dir), None);

    let spec = spec.with_cached_checksum(Some(digest));
    assert!(!check_for_changes(&spec, &artifact, false).is_changed());
}

#[test]
fn corrupt_local_checksum_forces_redeploy() {
    let tmp = TempDir::new().unwrap();
    let (spec, artifact) = built_function(&tmp, "checkout", "exports.a = 1;");
    fs::write(spec.output_dir.join(".rollout-checksum"), "garbage").unwrap();
    assert!(check_for_changes(&spec, &artifact, false).is_changed());
}

#[test]
fn unreadable_local_checksum_fails_open() {
    let tmp = TempDir::new().unwrap();
    let (spec, artifact) = built_function(&tmp, "checkout", "exports.a = 1;");
    // Present but not a readable file.
    fs::create_dir(spec.output_dir.join(".rollout-checksum")).unwrap();

    assert_eq!(read_checksum(&spec.output_dir), None);
    let signal = check_for_changes(&spec, &artifact, false);
    assert!(signal.is_changed());
    assert_eq!(
        signal.checksum(),
        Some(artifact_checksum(&spec, &artifact).unwrap().as_str())
    );
}

#[test]
fn functions_keep_separate_checksum_files() {
    let tmp = TempDir::new().unwrap();
    let (a, a_artifact) = built_function(&tmp, "a", "exports.a = 1;");
    let (b, _) = built_function(&tmp, "b", "exports.b = 1;");
    let signal = check_for_changes(&a, &a_artifact, false);
    persist_checksum(&a.output_dir, signal.checksum());
    assert!(read_checksum(&a.output_dir).is_some());
    assert_eq!(read_checksum(&b.output_dir), None);
}

fn env_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::btree_map("[A-Z_]{1,8}", "[a-z0-9]{0,8}", 0..8)
        .prop_map(|map| map.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// Digest is independent of environment insertion order.
    #[test]
    fn digest_ignores_environment_order(
        pairs in env_pairs(),
        bundle in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let forward: HashMap<String, String> = pairs.iter().cloned().collect();
        let mut reversed_pairs = pairs.clone();
        reversed_pairs.reverse();
        let reversed: Vec<(String, String)> = reversed_pairs;

        let a = digest::compute(&bundle, None, &forward);
        let b = digest::compute(&bundle, None, reversed.iter().map(|(k, v)| (k, v)));
        prop_assert_eq!(a, b);
    }

    /// Recomputing over identical inputs is stable.
    #[test]
    fn digest_is_idempotent(
        pairs in env_pairs(),
        bundle in proptest::collection::vec(any::<u8>(), 0..64),
        aux in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..16)),
    ) {
        let env: BTreeMap<String, String> = pairs.into_iter().collect();
        prop_assert_eq!(
            digest::compute(&bundle, aux.as_deref(), &env),
            digest::compute(&bundle, aux.as_deref(), &env)
        );
    }
}
