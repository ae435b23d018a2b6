//! Record-store seam and backends.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StoreResult;
use crate::types::{NewSubtask, Subtask, SubtaskPatch};
use async_trait::async_trait;

/// Async CRUD contract over the `subtasks` table.
///
/// The shipped backend is [`SqliteStore`]; tests substitute recording or
/// failing implementations.
#[async_trait]
pub trait SubtaskStore: Send + Sync {
    /// All subtasks for a task, ordered by `position` ascending then
    /// `created_at` ascending.
    async fn list(&self, task_id: &str) -> StoreResult<Vec<Subtask>>;

    /// Insert a record and return it with its assigned id and timestamps.
    async fn insert(&self, new: NewSubtask) -> StoreResult<Subtask>;

    /// Apply a partial update to one record; untouched fields keep their
    /// values. `updated_at` is refreshed. Returns the stored record.
    async fn update(&self, id: &str, patch: SubtaskPatch) -> StoreResult<Subtask>;

    /// Atomically persist new `position` values for the given ids; either
    /// every position is written or none is.
    async fn update_positions(&self, updates: &[(String, i64)]) -> StoreResult<()>;

    /// Delete exactly the named record. Children are left in place.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
