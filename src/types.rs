//! Core record types for the subtask tree.

use serde::{Deserialize, Serialize};

/// One checklist item belonging to a task, optionally nested under another
/// subtask via `parent_id`.
///
/// Sibling order within one `(task_id, parent_id)` group is `position`
/// ascending, ties broken by `created_at` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub task_id: String,
    /// Hierarchical parent, or `None` for a root-level item. A reference to
    /// a missing record is treated as root by the tree builder.
    pub parent_id: Option<String>,
    pub title: String,
    pub is_completed: bool,
    /// Sort key among siblings; reassigned on reorder.
    pub position: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A subtask with its children, for tree views.
///
/// `children` is derived in memory on every list change and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskNode {
    #[serde(flatten)]
    pub subtask: Subtask,
    pub children: Vec<SubtaskNode>,
}

/// Fields written when inserting a new subtask.
///
/// The store assigns `id`, `created_at`, and `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubtask {
    pub task_id: String,
    pub parent_id: Option<String>,
    pub title: String,
    pub position: i64,
}

/// Partial update of a single subtask; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubtaskPatch {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
    pub position: Option<i64>,
}

impl SubtaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_completed.is_none() && self.position.is_none()
    }

    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn completed(value: bool) -> Self {
        Self {
            is_completed: Some(value),
            ..Self::default()
        }
    }

    pub fn position(value: i64) -> Self {
        Self {
            position: Some(value),
            ..Self::default()
        }
    }
}
