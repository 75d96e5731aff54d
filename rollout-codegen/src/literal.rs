//! Options → object-literal renderer.
//!
//! Strings are JSON-quoted, numbers and booleans render verbatim, arrays and
//! objects recurse. [`OptionValue::Unsupported`] has no literal form and is
//! dropped: its key disappears from objects and its slot from arrays.

use rollout_core::{is_js_identifier, OptionMap, OptionValue};

/// Deployment bookkeeping keys that never reach the platform.
pub const BOOKKEEPING_KEYS: &[&str] = &[
    "v2",
    "version",
    "sourcePath",
    "outputDir",
    "outputPath",
    "auxFile",
    "checksum",
    "force",
    "dryRun",
    "debug",
    "tmpDir",
    "envFile",
];

/// Copy of `options` without [`BOOKKEEPING_KEYS`].
pub fn strip_bookkeeping(options: &OptionMap) -> OptionMap {
    options
        .iter()
        .filter(|(key, _)| !BOOKKEEPING_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Render `map` as `{ key: value, ... }`; an empty map renders as `{}`.
pub fn render_object(map: &OptionMap) -> String {
    let fields: Vec<String> = map
        .iter()
        .filter_map(|(key, value)| {
            render_value(value).map(|rendered| format!("{}: {rendered}", render_key(key)))
        })
        .collect();
    if fields.is_empty() {
        return "{}".to_string();
    }
    format!("{{ {} }}", fields.join(", "))
}

/// Render one value, or `None` when it has no literal form.
pub fn render_value(value: &OptionValue) -> Option<String> {
    match value {
        OptionValue::String(s) => Some(quote(s)),
        OptionValue::Number(n) => Some(n.to_string()),
        OptionValue::Bool(b) => Some(b.to_string()),
        OptionValue::Array(items) => {
            let rendered: Vec<String> = items.iter().filter_map(render_value).collect();
            Some(format!("[{}]", rendered.join(", ")))
        }
        OptionValue::Object(map) => Some(render_object(map)),
        OptionValue::Unsupported => None,
    }
}

/// Double-quoted string literal with JSON escaping.
pub fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

fn render_key(key: &str) -> String {
    if is_js_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}
