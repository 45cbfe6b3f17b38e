//! Claim keys, token types and the ordered claim set.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::TokenError;

/// The closed set of claim names a token can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimKey {
    Uri,
    Type,
    SessionId,
    RemoteAddress,
    OriginStreamId,
    Expires,
    RequiredTag,
    Capabilities,
    ApplyTags,
}

impl ClaimKey {
    /// Wire name of the claim.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uri => "uri",
            Self::Type => "type",
            Self::SessionId => "sessionId",
            Self::RemoteAddress => "remoteAddress",
            Self::OriginStreamId => "originStreamId",
            Self::Expires => "expires",
            Self::RequiredTag => "requiredTag",
            Self::Capabilities => "capabilities",
            Self::ApplyTags => "applyTags",
        }
    }
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restriction on what a token may be used for (the `type` claim).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Authentication only.
    Auth,
    /// Streaming (viewing) only.
    Stream,
    /// Publishing only.
    Publish,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Stream => "stream",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefixes used by the derived `requiredTag` bindings.
pub mod tag_prefix {
    pub const CHANNEL_ID: &str = "channelId:";
    pub const CHANNEL_ALIAS: &str = "channelAlias:";
    pub const ROOM_ID: &str = "roomId:";
    pub const ROOM_ALIAS: &str = "roomAlias:";
}

/// Ordered mapping from claim name to value.
///
/// Insertion order is serialized as-is and therefore signed. Setting a key
/// that is already present replaces the value in place; the key keeps its
/// original position. Equality compares keys in order, so two sets holding
/// the same pairs in a different order are not equal.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ClaimSet {
    claims: Map<String, Value>,
}

impl PartialEq for ClaimSet {
    fn eq(&self, other: &Self) -> bool {
        self.claims.iter().eq(other.claims.iter())
    }
}

impl ClaimSet {
    /// Create an empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&mut self, key: ClaimKey, value: impl Into<Value>) {
        self.claims.insert(key.as_str().to_string(), value.into());
    }

    /// Get a claim value.
    pub fn get(&self, key: ClaimKey) -> Option<&Value> {
        self.claims.get(key.as_str())
    }

    /// Get a string-valued claim.
    pub fn get_str(&self, key: ClaimKey) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get a list-valued claim.
    pub fn get_list(&self, key: ClaimKey) -> Option<Vec<&str>> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
    }

    /// The `expires` claim in milliseconds since the Unix epoch.
    pub fn expires(&self) -> Option<i64> {
        self.get(ClaimKey::Expires).and_then(Value::as_i64)
    }

    pub fn contains(&self, key: ClaimKey) -> bool {
        self.claims.contains_key(key.as_str())
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Claim names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.claims.keys().map(String::as_str)
    }

    /// Compact JSON serialization in insertion order.
    pub fn to_json(&self) -> Result<String, TokenError> {
        Ok(serde_json::to_string(&self.claims)?)
    }

    /// Copy of this claim set with the non-empty list claims appended.
    pub(crate) fn with_lists(
        &self,
        capabilities: Option<&[String]>,
        apply_tags: Option<&[String]>,
    ) -> Self {
        let mut folded = self.clone();
        for (key, list) in [
            (ClaimKey::Capabilities, capabilities),
            (ClaimKey::ApplyTags, apply_tags),
        ] {
            if let Some(items) = list.filter(|items| !items.is_empty()) {
                folded.set(key, items.to_vec());
            }
        }
        folded
    }
}
