//! Content digest used for change detection.
//!
//! `digest = sha256(artifact ‖ auxiliary ‖ serialized environment)`, hex encoded.
//! The environment is serialized as `key=value` pairs sorted by key with no
//! separator, so the digest never depends on map insertion order.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Deterministic environment serialization: sorted `key=value` pairs, concatenated.
pub fn serialize_environment<'a, I>(env: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let sorted: BTreeMap<&str, &str> = env
        .into_iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    sorted
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect()
}

/// Hex SHA-256 over the artifact, optional auxiliary content and environment.
pub fn compute<'a, I>(artifact: &[u8], auxiliary: Option<&[u8]>, env: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut h = Sha256::new();
    h.update(artifact);
    if let Some(aux) = auxiliary {
        h.update(aux);
    }
    h.update(serialize_environment(env).as_bytes());
    hex::encode(h.finalize())
}
