//! SQLite-backed record store.

use super::{SubtaskStore, now_ms};
use crate::error::{StoreError, StoreResult};
use crate::types::{NewSubtask, Subtask, SubtaskPatch};
use async_trait::async_trait;
use rusqlite::{Connection, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Record store wrapping a SQLite connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // WAL keeps readers unblocked while the UI writes
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> StoreResult<()> {
        let mut conn = self.conn.lock().unwrap();
        embedded::migrations::runner()
            .run(&mut *conn)
            .map_err(StoreError::new)?;
        Ok(())
    }

    /// Run blocking rusqlite work off the async executor.
    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            f(&conn)
        })
        .await
        .map_err(StoreError::new)?
    }

    /// Like [`with_conn`](Self::with_conn), but mutable for transactions.
    async fn with_conn_mut<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().unwrap();
            f(&mut conn)
        })
        .await
        .map_err(StoreError::new)?
    }
}

const SELECT_COLUMNS: &str =
    "id, task_id, parent_id, title, is_completed, position, created_at, updated_at";

fn parse_subtask_row(row: &Row) -> rusqlite::Result<Subtask> {
    Ok(Subtask {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        parent_id: row.get("parent_id")?,
        title: row.get("title")?,
        is_completed: row.get("is_completed")?,
        position: row.get("position")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn get_subtask(conn: &Connection, id: &str) -> StoreResult<Subtask> {
    let mut stmt =
        conn.prepare(&format!("SELECT {SELECT_COLUMNS} FROM subtasks WHERE id = ?1"))?;
    let result = stmt.query_row(params![id], parse_subtask_row);
    match result {
        Ok(subtask) => Ok(subtask),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(StoreError::new(format!("no subtask with id {id}")))
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl SubtaskStore for SqliteStore {
    async fn list(&self, task_id: &str) -> StoreResult<Vec<Subtask>> {
        let task_id = task_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM subtasks
                 WHERE task_id = ?1
                 ORDER BY position ASC, created_at ASC"
            ))?;

            let subtasks = stmt
                .query_map(params![task_id], parse_subtask_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(subtasks)
        })
        .await
    }

    async fn insert(&self, new: NewSubtask) -> StoreResult<Subtask> {
        let id = Uuid::now_v7().to_string();
        let now = now_ms();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO subtasks (
                    id, task_id, parent_id, title, is_completed, position, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?6)",
                params![id, new.task_id, new.parent_id, new.title, new.position, now],
            )?;

            Ok(Subtask {
                id,
                task_id: new.task_id,
                parent_id: new.parent_id,
                title: new.title,
                is_completed: false,
                position: new.position,
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn update(&self, id: &str, patch: SubtaskPatch) -> StoreResult<Subtask> {
        let id = id.to_string();
        let now = now_ms();
        self.with_conn(move |conn| {
            let affected = conn.execute(
                "UPDATE subtasks SET
                    title = COALESCE(?2, title),
                    is_completed = COALESCE(?3, is_completed),
                    position = COALESCE(?4, position),
                    updated_at = ?5
                 WHERE id = ?1",
                params![id, patch.title, patch.is_completed, patch.position, now],
            )?;
            if affected == 0 {
                return Err(StoreError::new(format!("no subtask with id {id}")));
            }

            get_subtask(conn, &id)
        })
        .await
    }

    async fn update_positions(&self, updates: &[(String, i64)]) -> StoreResult<()> {
        let updates = updates.to_vec();
        let now = now_ms();
        self.with_conn_mut(move |conn| {
            let tx = conn.transaction()?;
            for (id, position) in &updates {
                tx.execute(
                    "UPDATE subtasks SET position = ?2, updated_at = ?3 WHERE id = ?1",
                    params![id, position, now],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let affected = conn.execute("DELETE FROM subtasks WHERE id = ?1", params![id])?;
            if affected == 0 {
                return Err(StoreError::new(format!("no subtask with id {id}")));
            }
            Ok(())
        })
        .await
    }
}
