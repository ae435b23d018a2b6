//! Error types for store and manager operations.

use std::fmt;
use thiserror::Error;

/// Failure reported by the record store.
///
/// Every backend failure (I/O, constraint violation, connectivity) collapses
/// into this one kind; the message carries the backend's description.
#[derive(Debug, Clone, Error)]
#[error("record store failure: {message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(err: impl fmt::Display) -> Self {
        Self {
            message: err.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::new(err)
    }
}

/// Errors surfaced by [`SubtaskManager`](crate::manager::SubtaskManager)
/// mutations.
#[derive(Debug, Error)]
pub enum SubtaskError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// `add` requires a non-blank title after trimming.
    #[error("subtask title must not be empty")]
    EmptyTitle,

    /// The requested parent's `parent_id` chain loops back on itself.
    #[error("parent {parent_id} is part of a cycle")]
    ParentCycle { parent_id: String },

    /// A mutation was requested before any task was loaded.
    #[error("no active task loaded")]
    NoActiveTask,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type SubtaskResult<T> = std::result::Result<T, SubtaskError>;
