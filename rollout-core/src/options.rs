//! Typed trigger/runtime option values.
//!
//! Manifest options arrive as arbitrary YAML. They are folded into a closed
//! [`OptionValue`] so the literal renderer matches on variants instead of
//! inspecting types at runtime. Anything that has no literal form (YAML
//! `null`, for instance) becomes [`OptionValue::Unsupported`].

use std::collections::BTreeMap;

use serde::Deserialize;

/// Ordered option map; ordering keeps rendered literals deterministic.
pub type OptionMap = BTreeMap<String, OptionValue>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum OptionValue {
    String(String),
    /// Kept as the parsed number so it renders exactly as written.
    Number(serde_json::Number),
    Bool(bool),
    Array(Vec<OptionValue>),
    Object(OptionMap),
    Unsupported,
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for OptionValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => OptionValue::String(s),
            serde_json::Value::Number(n) => OptionValue::Number(n),
            serde_json::Value::Bool(b) => OptionValue::Bool(b),
            serde_json::Value::Array(items) => {
                OptionValue::Array(items.into_iter().map(OptionValue::from).collect())
            }
            serde_json::Value::Object(map) => OptionValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, OptionValue::from(v)))
                    .collect(),
            ),
            serde_json::Value::Null => OptionValue::Unsupported,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_owned())
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Number(n.into())
    }
}

/// String value stored under `key`, if any.
pub fn get_str<'a>(options: &'a OptionMap, key: &str) -> Option<&'a str> {
    options.get(key).and_then(OptionValue::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_folds_into_typed_values() {
        let map: OptionMap = serde_yaml::from_str(
            "memory: 256MB\ntimeoutSeconds: 60\nminInstances: 0.5\ninvoker: [public, admin]\nnested: { enabled: true }\nempty: ~\n",
        )
        .unwrap();

        assert_eq!(map["memory"], OptionValue::from("256MB"));
        assert!(matches!(map["timeoutSeconds"], OptionValue::Number(ref n) if n.to_string() == "60"));
        assert!(matches!(map["minInstances"], OptionValue::Number(ref n) if n.to_string() == "0.5"));
        assert_eq!(
            map["invoker"],
            OptionValue::Array(vec!["public".into(), "admin".into()])
        );
        assert!(matches!(map["nested"], OptionValue::Object(ref inner) if inner["enabled"] == OptionValue::Bool(true)));
        assert_eq!(map["empty"], OptionValue::Unsupported);
    }

    #[test]
    fn get_str_ignores_non_strings() {
        let mut map = OptionMap::new();
        map.insert("topic".into(), "orders".into());
        map.insert("retries".into(), 3i64.into());
        assert_eq!(get_str(&map, "topic"), Some("orders"));
        assert_eq!(get_str(&map, "retries"), None);
        assert_eq!(get_str(&map, "missing"), None);
    }
}
