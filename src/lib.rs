//! Subtask Tree Library
//!
//! Maintains a flat, position-ordered list of subtasks per task, derives a
//! nested tree view from it, and persists reordering through a pluggable
//! async record store.

pub mod error;
pub mod manager;
pub mod store;
pub mod tree;
pub mod types;

pub use error::{StoreError, SubtaskError};
pub use manager::SubtaskManager;
pub use store::{SqliteStore, SubtaskStore};
pub use tree::{build_tree, flatten_tree};
pub use types::{NewSubtask, Subtask, SubtaskNode, SubtaskPatch};
