//! Project entity model
//!
//! Defines the Project record, its wire shape (camelCase JSON as served by the
//! REST API), and the fixed set of status values that back the board columns.
//! Deserialization applies the default values, so a partial wire payload
//! always normalizes into a complete record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Status of a project, one per board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Backlog,
    Todo,
    InProgress,
    Review,
    Done,
    Blocked,
}

impl ProjectStatus {
    /// All statuses, in board column order.
    pub const ALL: [ProjectStatus; 6] = [
        ProjectStatus::Backlog,
        ProjectStatus::Todo,
        ProjectStatus::InProgress,
        ProjectStatus::Review,
        ProjectStatus::Done,
        ProjectStatus::Blocked,
    ];

    /// Wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Backlog => "backlog",
            ProjectStatus::Todo => "todo",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Review => "review",
            ProjectStatus::Done => "done",
            ProjectStatus::Blocked => "blocked",
        }
    }

    /// Column title shown above this status on the board.
    pub fn title(&self) -> &'static str {
        match self {
            ProjectStatus::Backlog => "Backlog",
            ProjectStatus::Todo => "To Do",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Review => "Review",
            ProjectStatus::Done => "Done",
            ProjectStatus::Blocked => "Blocked",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Invalid status value: \"{}\". Valid values are: backlog, todo, in-progress, review, done, blocked.",
                    s
                ))
            })
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Backlog
    }
}

/// A project tracked on the board.
///
/// `id` is server-assigned and is the sole identity key; `order` defines the
/// position within the project's status column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_signed_on: Option<DateTime<Utc>>,
}

fn default_is_active() -> bool {
    true
}

impl Default for Project {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            description: String::new(),
            image_url: None,
            budget: 0.0,
            status: ProjectStatus::default(),
            order: 0,
            is_active: true,
            contract_signed_on: None,
        }
    }
}

impl Project {
    /// Create a new project with defaults applied.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the project has been assigned an identity by the server.
    pub fn has_id(&self) -> bool {
        self.id != 0
    }
}
