//! Source hash tokens
//!
//! A source hash is an opaque, URL-safe token that round-trips the exact list
//! of highlight ids it was built from. It is not a digest: decoding recovers
//! the ids, which is how the updater learns what a note already contains.
//!
//! Encoding preserves order. Callers that want an order-independent token for
//! a logical set use [`canonical_ids`] first.

use base64::{engine::general_purpose, Engine as _};

use crate::error::HashError;

/// Encode a list of highlight ids into a token
pub fn encode<S: AsRef<str>>(ids: &[S]) -> String {
    let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
    // A list of strings always serializes
    let payload = serde_json::to_vec(&ids).unwrap_or_else(|_| b"[]".to_vec());
    general_purpose::URL_SAFE.encode(payload)
}

/// Decode a token back into the list of highlight ids it was built from
pub fn decode(token: &str) -> Result<Vec<String>, HashError> {
    let payload = general_purpose::URL_SAFE.decode(token.trim())?;
    let ids: Vec<String> = serde_json::from_slice(&payload)?;
    Ok(ids)
}

/// Sort ascending and drop duplicates so equal sets encode to equal tokens
pub fn canonical_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut ids: Vec<String> = ids.into_iter().map(Into::into).collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Encode the canonical form of a highlight id set
pub fn encode_set<I, S>(ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    encode(&canonical_ids(ids))
}
