//! Manufacturing node domain model
//!
//! A node is one addressable piece of a plant: a machine, a cell, a line.
//! It carries a title, a free-text description, the operations it performs and
//! its UNS (Unified Namespace) address such as `Site/Area/Line/Cell`.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::id::NodeId;

/// A manufacturing node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique ID, fixed at creation
    pub id: NodeId,

    /// Human-readable title, unique across the collection (case-insensitive)
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Operations performed at this node, in entry order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub operations: Vec<String>,

    /// Hierarchical UNS address
    #[serde(rename = "uns_address", default)]
    pub address: String,

    /// Creation timestamp, never changed by updates
    ///
    /// Timestamps keep the offset they were read with, so records written
    /// with a local offset round-trip unchanged.
    #[serde(serialize_with = "rfc3339")]
    pub created_at: DateTime<FixedOffset>,

    /// Last update timestamp
    #[serde(serialize_with = "rfc3339")]
    pub updated_at: DateTime<FixedOffset>,
}

fn rfc3339<S>(at: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Older files store a missing operation list as `null`
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Trims operation names and drops the empty ones
fn clean_operations<I, S>(operations: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    operations
        .into_iter()
        .map(Into::into)
        .map(|op| op.trim().to_string())
        .filter(|op| !op.is_empty())
        .collect()
}

impl Node {
    /// Creates a new node stamped with the current time
    pub fn create<I, S>(
        title: impl Into<String>,
        description: impl Into<String>,
        operations: I,
        address: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::create_at(title, description, operations, address, Utc::now())
    }

    /// Creates a new node as if created at `now`
    pub fn create_at<I, S>(
        title: impl Into<String>,
        description: impl Into<String>,
        operations: I,
        address: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: NodeId::generate(now),
            title: title.into(),
            description: description.into(),
            operations: clean_operations(operations),
            address: address.into(),
            created_at: now.fixed_offset(),
            updated_at: now.fixed_offset(),
        }
    }

    /// Builds the replacement for this node with new field values
    ///
    /// Keeps `id` and `created_at`, refreshes `updated_at`.
    pub fn revise<I, S>(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        operations: I,
        address: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: self.id.clone(),
            title: title.into(),
            description: description.into(),
            operations: clean_operations(operations),
            address: address.into(),
            created_at: self.created_at,
            updated_at: Utc::now().fixed_offset().max(self.created_at),
        }
    }

    /// Returns true if `title` equals this node's title, ignoring case
    pub fn title_matches(&self, title: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase()
    }
}
