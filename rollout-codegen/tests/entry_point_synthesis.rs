//! End-to-end entry-point synthesis from manifest-shaped specs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rstest::rstest;

use rollout_codegen::{SynthError, Synthesizer};
use rollout_core::{ConfigError, FunctionSpec, OptionMap, OptionValue, TriggerKind};

fn spec(name: &str, kind: TriggerKind, options: &[(&str, OptionValue)]) -> FunctionSpec {
    FunctionSpec {
        function_name: name.into(),
        trigger_kind: kind,
        trigger_options: options
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
        region: "us-central1".to_string(),
        runtime_options: None,
        source_path: PathBuf::from("/repo/apps/functions/src").join(format!("{name}.ts")),
        output_dir: PathBuf::from("/repo/dist/functions").join(name),
        aux_file: None,
        environment: BTreeMap::new(),
        cached_checksum: None,
    }
}

#[test]
fn users_created_chains_region_document_and_on_create() {
    let synth = Synthesizer::new().expect("synthesizer");
    let source = synth
        .synthesize(&spec(
            "users_created",
            TriggerKind::OnCreate,
            &[("documentPath", "users/{id}".into())],
        ))
        .expect("synthesize");

    let expected = r#"export const users_created = functions
  .region("us-central1")
  .firestore.document("users/{id}")
  .onCreate(handler);"#;
    assert!(source.contains(expected), "got:\n{source}");
    assert!(source.contains(r#"import handler from "/repo/apps/functions/src/users_created.ts";"#));
}

#[test]
fn runtime_options_chain_before_region() {
    let synth = Synthesizer::new().expect("synthesizer");
    let mut s = spec(
        "nightly",
        TriggerKind::Schedule,
        &[("schedule", "every day 03:00".into()), ("timeZone", "UTC".into())],
    );
    let mut runtime = OptionMap::new();
    runtime.insert("memory".into(), "512MB".into());
    runtime.insert("timeoutSeconds".into(), 540i64.into());
    runtime.insert(
        "secrets".into(),
        OptionValue::Array(vec!["STRIPE_KEY".into(), "SENTRY_DSN".into()]),
    );
    s.runtime_options = Some(runtime);

    let source = synth.synthesize(&s).expect("synthesize");
    let expected = r#"export const nightly = functions
  .runWith({ memory: "512MB", secrets: ["STRIPE_KEY", "SENTRY_DSN"], timeoutSeconds: 540 })
  .region("us-central1")
  .pubsub.schedule("every day 03:00")
  .timeZone("UTC")
  .onRun(handler);"#;
    assert!(source.contains(expected), "got:\n{source}");
}

#[rstest]
#[case(TriggerKind::OnObjectArchive, ".storage.object()\n  .onArchive(handler);")]
#[case(TriggerKind::OnObjectDelete, ".storage.object()\n  .onDelete(handler);")]
#[case(TriggerKind::OnObjectFinalize, ".storage.object()\n  .onFinalize(handler);")]
#[case(TriggerKind::OnObjectMetadataUpdate, ".storage.object()\n  .onMetadataUpdate(handler);")]
#[case(TriggerKind::OnCall, ".https\n  .onCall(handler);")]
#[case(TriggerKind::OnRequest, ".https\n  .onRequest(handler);")]
fn optionless_triggers_render_their_terminator(#[case] kind: TriggerKind, #[case] tail: &str) {
    let synth = Synthesizer::new().expect("synthesizer");
    let source = synth.synthesize(&spec("f", kind, &[])).expect("synthesize");
    assert!(source.contains(tail), "{kind}: got:\n{source}");
}

#[test]
fn v2_with_schedule_is_a_configuration_error() {
    let synth = Synthesizer::new().expect("synthesizer");
    let err = synth
        .synthesize(&spec(
            "cron",
            TriggerKind::Schedule,
            &[("schedule", "every 1 hours".into()), ("v2", true.into())],
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        SynthError::Config(ConfigError::InvalidV2Trigger { .. })
    ));
}

#[test]
fn v2_on_call_strips_bookkeeping_and_unsupported_values() {
    let synth = Synthesizer::new().expect("synthesizer");
    let source = synth
        .synthesize(&spec(
            "callable",
            TriggerKind::OnCall,
            &[
                ("v2", true.into()),
                ("outputDir", "dist/callable".into()),
                ("onEvent", OptionValue::Unsupported),
                ("cors", OptionValue::Array(vec!["https://a.dev".into(), "https://b.dev".into()])),
            ],
        ))
        .expect("synthesize");
    assert!(source.contains(
        r#"export const callable = onCall({ cors: ["https://a.dev", "https://b.dev"], region: "us-central1" }, handler);"#
    ), "got:\n{source}");
}
