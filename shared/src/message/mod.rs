//! Change notification types
//!
//! A [`ChangeEvent`] tells every open UI which resource changed so it can
//! reload. Events are published only after the change was persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource a change event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Settings,
    Images,
    Products,
}

impl ResourceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Images => "images",
            Self::Products => "products",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
    Reordered,
    SelectionChanged,
}

impl ChangeAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Reordered => "reordered",
            Self::SelectionChanged => "selection_changed",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change notification payload
///
/// `version` increases by one per resource for every published event,
/// so subscribers can drop stale or duplicated notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub resource: ResourceKind,
    pub action: ChangeAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub version: u64,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

impl ChangeEvent {
    /// Build an event with version 0; the bus stamps the real version on publish.
    pub fn new(resource: ResourceKind, action: ChangeAction, id: Option<String>) -> Self {
        Self {
            resource,
            action,
            id,
            version: 0,
            timestamp: crate::util::now_millis(),
        }
    }
}
