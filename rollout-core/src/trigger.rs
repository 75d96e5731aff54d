//! Trigger kinds and the kind → verb table.
//!
//! | Kind                         | Family   | Verb               |
//! |------------------------------|----------|--------------------|
//! | `onCall`                     | Https    | `onCall`           |
//! | `onRequest`                  | Https    | `onRequest`        |
//! | `onCreate` / `onRefCreate`   | Document / Ref | `onCreate`   |
//! | `onUpdate` / `onRefUpdate`   | Document / Ref | `onUpdate`   |
//! | `onDelete` / `onRefDelete`   | Document / Ref | `onDelete`   |
//! | `onWrite` / `onRefWrite`     | Document / Ref | `onWrite`    |
//! | `onObjectArchive`            | Object   | `onArchive`        |
//! | `onObjectDelete`             | Object   | `onDelete`         |
//! | `onObjectFinalize`           | Object   | `onFinalize`       |
//! | `onObjectMetadataUpdate`     | Object   | `onMetadataUpdate` |
//! | `schedule`                   | Schedule | `onRun`            |
//! | `topic`                      | Topic    | `onRun`            |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::options::{OptionMap, OptionValue};

/// Every trigger a function can be registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerKind {
    OnCall,
    OnRequest,
    OnCreate,
    OnUpdate,
    OnDelete,
    OnWrite,
    OnRefCreate,
    OnRefUpdate,
    OnRefDelete,
    OnRefWrite,
    OnObjectArchive,
    OnObjectDelete,
    OnObjectFinalize,
    OnObjectMetadataUpdate,
    Schedule,
    Topic,
}

/// Builder family a trigger hangs off in the v1 chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerFamily {
    Https,
    Document,
    Ref,
    Object,
    Schedule,
    Topic,
}

/// Platform API generation of the binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerVersion {
    #[default]
    V1,
    V2,
}

impl TriggerKind {
    /// All trigger variants in a stable order.
    pub fn all() -> &'static [TriggerKind] {
        &[
            TriggerKind::OnCall,
            TriggerKind::OnRequest,
            TriggerKind::OnCreate,
            TriggerKind::OnUpdate,
            TriggerKind::OnDelete,
            TriggerKind::OnWrite,
            TriggerKind::OnRefCreate,
            TriggerKind::OnRefUpdate,
            TriggerKind::OnRefDelete,
            TriggerKind::OnRefWrite,
            TriggerKind::OnObjectArchive,
            TriggerKind::OnObjectDelete,
            TriggerKind::OnObjectFinalize,
            TriggerKind::OnObjectMetadataUpdate,
            TriggerKind::Schedule,
            TriggerKind::Topic,
        ]
    }

    /// Manifest spelling of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            TriggerKind::OnCall => "onCall",
            TriggerKind::OnRequest => "onRequest",
            TriggerKind::OnCreate => "onCreate",
            TriggerKind::OnUpdate => "onUpdate",
            TriggerKind::OnDelete => "onDelete",
            TriggerKind::OnWrite => "onWrite",
            TriggerKind::OnRefCreate => "onRefCreate",
            TriggerKind::OnRefUpdate => "onRefUpdate",
            TriggerKind::OnRefDelete => "onRefDelete",
            TriggerKind::OnRefWrite => "onRefWrite",
            TriggerKind::OnObjectArchive => "onObjectArchive",
            TriggerKind::OnObjectDelete => "onObjectDelete",
            TriggerKind::OnObjectFinalize => "onObjectFinalize",
            TriggerKind::OnObjectMetadataUpdate => "onObjectMetadataUpdate",
            TriggerKind::Schedule => "schedule",
            TriggerKind::Topic => "topic",
        }
    }

    /// Terminator call that binds the handler.
    pub fn verb(&self) -> &'static str {
        match self {
            TriggerKind::OnCall => "onCall",
            TriggerKind::OnRequest => "onRequest",
            TriggerKind::OnCreate | TriggerKind::OnRefCreate => "onCreate",
            TriggerKind::OnUpdate | TriggerKind::OnRefUpdate => "onUpdate",
            TriggerKind::OnDelete | TriggerKind::OnRefDelete => "onDelete",
            TriggerKind::OnWrite | TriggerKind::OnRefWrite => "onWrite",
            TriggerKind::OnObjectArchive => "onArchive",
            TriggerKind::OnObjectDelete => "onDelete",
            TriggerKind::OnObjectFinalize => "onFinalize",
            TriggerKind::OnObjectMetadataUpdate => "onMetadataUpdate",
            TriggerKind::Schedule | TriggerKind::Topic => "onRun",
        }
    }

    pub fn family(&self) -> TriggerFamily {
        match self {
            TriggerKind::OnCall | TriggerKind::OnRequest => TriggerFamily::Https,
            TriggerKind::OnCreate
            | TriggerKind::OnUpdate
            | TriggerKind::OnDelete
            | TriggerKind::OnWrite => TriggerFamily::Document,
            TriggerKind::OnRefCreate
            | TriggerKind::OnRefUpdate
            | TriggerKind::OnRefDelete
            | TriggerKind::OnRefWrite => TriggerFamily::Ref,
            TriggerKind::OnObjectArchive
            | TriggerKind::OnObjectDelete
            | TriggerKind::OnObjectFinalize
            | TriggerKind::OnObjectMetadataUpdate => TriggerFamily::Object,
            TriggerKind::Schedule => TriggerFamily::Schedule,
            TriggerKind::Topic => TriggerFamily::Topic,
        }
    }

    /// Only the HTTP family has a v2 binding.
    pub fn supports_v2(&self) -> bool {
        self.family() == TriggerFamily::Https
    }

    /// Determine the binding version declared in `options` and validate it
    /// against this kind.
    ///
    /// `v2: true` or `version: "v2"` select v2; anything else is v1.
    pub fn resolve_version(&self, options: &OptionMap) -> Result<TriggerVersion, ConfigError> {
        let flag = matches!(options.get("v2"), Some(OptionValue::Bool(true)));
        let named = matches!(options.get("version"), Some(OptionValue::String(v)) if v == "v2");
        if !(flag || named) {
            return Ok(TriggerVersion::V1);
        }
        if !self.supports_v2() {
            return Err(ConfigError::InvalidV2Trigger { trigger: *self });
        }
        Ok(TriggerVersion::V2)
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TriggerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ConfigError::UnknownTrigger(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TriggerKind::OnCall, "onCall")]
    #[case(TriggerKind::OnRequest, "onRequest")]
    #[case(TriggerKind::OnCreate, "onCreate")]
    #[case(TriggerKind::OnRefCreate, "onCreate")]
    #[case(TriggerKind::OnUpdate, "onUpdate")]
    #[case(TriggerKind::OnRefUpdate, "onUpdate")]
    #[case(TriggerKind::OnDelete, "onDelete")]
    #[case(TriggerKind::OnRefDelete, "onDelete")]
    #[case(TriggerKind::OnWrite, "onWrite")]
    #[case(TriggerKind::OnRefWrite, "onWrite")]
    #[case(TriggerKind::OnObjectArchive, "onArchive")]
    #[case(TriggerKind::OnObjectDelete, "onDelete")]
    #[case(TriggerKind::OnObjectFinalize, "onFinalize")]
    #[case(TriggerKind::OnObjectMetadataUpdate, "onMetadataUpdate")]
    #[case(TriggerKind::Schedule, "onRun")]
    #[case(TriggerKind::Topic, "onRun")]
    fn verb_table(#[case] kind: TriggerKind, #[case] verb: &str) {
        assert_eq!(kind.verb(), verb);
    }

    #[test]
    fn every_kind_round_trips_through_its_name() {
        for kind in TriggerKind::all() {
            let parsed: TriggerKind = kind.name().parse().expect("parse");
            assert_eq!(parsed, *kind);
        }
        assert_eq!(TriggerKind::all().len(), 16);
    }

    #[test]
    fn unknown_kind_is_config_error() {
        let err = "onPigeon".parse::<TriggerKind>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTrigger(ref name) if name == "onPigeon"));
    }

    #[test]
    fn serde_name_matches_display() {
        let yaml = serde_yaml::to_string(&TriggerKind::OnObjectMetadataUpdate).unwrap();
        assert_eq!(yaml.trim(), "onObjectMetadataUpdate");
    }

    #[test]
    fn v2_rejected_outside_https() {
        let mut options = OptionMap::new();
        options.insert("v2".into(), OptionValue::Bool(true));
        let err = TriggerKind::Schedule.resolve_version(&options).unwrap_err();
        assert!(err.to_string().contains("invalid deploy function for https v2"));
        assert_eq!(
            TriggerKind::OnCall.resolve_version(&options).unwrap(),
            TriggerVersion::V2
        );
    }

    #[test]
    fn version_string_selects_v2() {
        let mut options = OptionMap::new();
        options.insert("version".into(), OptionValue::String("v2".into()));
        assert_eq!(
            TriggerKind::OnRequest.resolve_version(&options).unwrap(),
            TriggerVersion::V2
        );
        assert_eq!(
            TriggerKind::OnRequest.resolve_version(&OptionMap::new()).unwrap(),
            TriggerVersion::V1
        );
    }
}
