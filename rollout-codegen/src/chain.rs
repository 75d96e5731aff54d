//! Trigger binding expressions.
//!
//! v1 bindings are a method chain off the `functions` namespace:
//!
//! ```text
//! functions
//!   [.runWith({ ...runtime })]
//!   .region("<region>")
//!   .<family builder>            https | firestore.document(..) | database.ref(..)
//!                                storage[.bucket(..)].object() | pubsub.schedule(..) | pubsub.topic(..)
//!   [.timeZone("<tz>")]          schedule only
//!   .<verb>(handler)
//! ```
//!
//! v2 bindings are a single factory call: `<verb>({ ...options }, handler)`.

use rollout_core::{
    options::get_str, ConfigError, FunctionSpec, OptionMap, OptionValue, TriggerFamily,
    TriggerKind, TriggerVersion,
};

use crate::literal::{quote, render_object, strip_bookkeeping};

/// Identifier the user's handler is imported as.
pub const HANDLER_IDENT: &str = "handler";

/// Fully-resolved binding for one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// `functions.….<verb>(handler)`
    Chained { expression: String },
    /// `<factory>({…}, handler)`
    Direct { factory: &'static str, options: String },
}

/// Build the binding for `spec`, validating version and required options.
pub fn binding(spec: &FunctionSpec) -> Result<Binding, ConfigError> {
    match spec.trigger_kind.resolve_version(&spec.trigger_options)? {
        TriggerVersion::V1 => Ok(Binding::Chained {
            expression: chain_expression(&v1_segments(spec)?),
        }),
        TriggerVersion::V2 => Ok(Binding::Direct {
            factory: spec.trigger_kind.verb(),
            options: render_object(&v2_options(spec)),
        }),
    }
}

/// Chain segments after `functions`, without leading dots.
pub fn v1_segments(spec: &FunctionSpec) -> Result<Vec<String>, ConfigError> {
    let kind = spec.trigger_kind;
    let options = &spec.trigger_options;
    let mut segments = Vec::new();

    if let Some(runtime) = &spec.runtime_options {
        segments.push(format!(
            "runWith({})",
            render_object(&strip_bookkeeping(runtime))
        ));
    }
    segments.push(format!("region({})", quote(&spec.region)));

    match kind.family() {
        TriggerFamily::Https => segments.push("https".to_string()),
        TriggerFamily::Document => {
            let path = required(kind, options, "documentPath")?;
            segments.push(format!("firestore.document({})", quote(path)));
        }
        TriggerFamily::Ref => {
            let path = required(kind, options, "refPath")?;
            segments.push(format!("database.ref({})", quote(path)));
        }
        TriggerFamily::Object => match get_str(options, "bucket") {
            Some(bucket) => segments.push(format!("storage.bucket({}).object()", quote(bucket))),
            None => segments.push("storage.object()".to_string()),
        },
        TriggerFamily::Schedule => {
            let schedule = required(kind, options, "schedule")?;
            segments.push(format!("pubsub.schedule({})", quote(schedule)));
            if let Some(tz) = get_str(options, "timeZone") {
                segments.push(format!("timeZone({})", quote(tz)));
            }
        }
        TriggerFamily::Topic => {
            let topic = required(kind, options, "topic")?;
            segments.push(format!("pubsub.topic({})", quote(topic)));
        }
    }

    segments.push(format!("{}({HANDLER_IDENT})", kind.verb()));
    Ok(segments)
}

/// Options literal for a v2 HTTP binding: region, then runtime options, then
/// trigger options, later sources winning.
pub fn v2_options(spec: &FunctionSpec) -> OptionMap {
    let mut merged = OptionMap::new();
    merged.insert(
        "region".to_string(),
        OptionValue::String(spec.region.clone()),
    );
    if let Some(runtime) = &spec.runtime_options {
        merged.extend(strip_bookkeeping(runtime));
    }
    merged.extend(strip_bookkeeping(&spec.trigger_options));
    merged
}

fn chain_expression(segments: &[String]) -> String {
    let mut expression = String::from("functions");
    for segment in segments {
        expression.push_str("\n  .");
        expression.push_str(segment);
    }
    expression
}

fn required<'a>(
    trigger: TriggerKind,
    options: &'a OptionMap,
    option: &'static str,
) -> Result<&'a str, ConfigError> {
    get_str(options, option).ok_or(ConfigError::MissingTriggerOption { trigger, option })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
