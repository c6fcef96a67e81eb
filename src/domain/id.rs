//! Node identifiers
//!
//! ID Format: `YYYYMMDDhhmmss` (14 digits, UTC), derived from the creation
//! instant at second resolution (e.g., `20250314093005`).
//!
//! IDs sort lexically in creation order. Two nodes created within the same
//! second receive the same ID; callers creating nodes in bulk must space them
//! out or supply their own IDs.
//!
//! IDs read from disk are treated as opaque strings and are never re-validated,
//! so hand-edited files with other ID shapes keep working.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// strftime pattern for generated IDs
const ID_FORMAT: &str = "%Y%m%d%H%M%S";


/// Identifier of a manufacturing node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generates an ID from the given instant
    pub fn generate(at: DateTime<Utc>) -> Self {
        Self(at.format(ID_FORMAT).to_string())
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
