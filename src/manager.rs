//! Flat-list + derived-tree state for one task's subtasks.

use crate::error::{SubtaskError, SubtaskResult};
use crate::store::SubtaskStore;
use crate::tree::{build_tree, chain_has_cycle};
use crate::types::{NewSubtask, Subtask, SubtaskNode, SubtaskPatch};
use tracing::{debug, warn};

/// Hook invoked when every subtask in the active list is complete.
pub type AllCompletedHook = Box<dyn Fn() + Send + Sync>;

/// Owns the flat, position-ordered subtask list for the active task plus the
/// tree derived from it. The two are recomputed together on every list
/// change, so the visible tree always reflects the latest known store state
/// after a mutation resolves.
///
/// One manager instance serves one task's view; operations take `&mut self`
/// and are awaited by the caller, so there is no internal locking.
pub struct SubtaskManager<S: SubtaskStore> {
    store: S,
    task_id: Option<String>,
    flat: Vec<Subtask>,
    tree: Vec<SubtaskNode>,
    loading: bool,
    was_all_completed: bool,
    on_all_completed: Option<AllCompletedHook>,
}

impl<S: SubtaskStore> SubtaskManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            task_id: None,
            flat: Vec::new(),
            tree: Vec::new(),
            loading: false,
            was_all_completed: false,
            on_all_completed: None,
        }
    }

    /// Register a hook fired once per transition into the all-complete state
    /// (non-empty list, every item completed). It re-fires on each re-entry,
    /// including right after a load that finds the list already complete.
    pub fn on_all_completed(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_all_completed = Some(Box::new(hook));
        self
    }

    /// The flat list in display order.
    pub fn flat(&self) -> &[Subtask] {
        &self.flat
    }

    /// The derived tree view.
    pub fn tree(&self) -> &[SubtaskNode] {
        &self.tree
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    /// Load the subtasks for `task_id`, replacing the visible state.
    ///
    /// `None` clears both views without touching the store. A fetch failure
    /// is logged and swallowed; the prior state stays visible and the caller
    /// decides whether to retry.
    pub async fn load(&mut self, task_id: Option<&str>) {
        let Some(task_id) = task_id else {
            self.task_id = None;
            self.replace_list(Vec::new());
            return;
        };

        self.task_id = Some(task_id.to_string());
        self.loading = true;
        match self.store.list(task_id).await {
            Ok(list) => self.replace_list(list),
            Err(err) => warn!(task_id, %err, "subtask fetch failed, keeping previous list"),
        }
        self.loading = false;
    }

    /// Re-fetch the active task's list from the store.
    pub async fn refetch(&mut self) {
        let task_id = self.task_id.clone();
        self.load(task_id.as_deref()).await;
    }

    /// Add a subtask at the end of its sibling group (root level when
    /// `parent_id` is `None`).
    ///
    /// The new position is one past the highest sibling position, or 0 for
    /// the first sibling. Returns the stored record with its assigned id and
    /// timestamps; the visible state is re-fetched afterward so it reflects
    /// the authoritative list.
    pub async fn add(&mut self, title: &str, parent_id: Option<&str>) -> SubtaskResult<Subtask> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SubtaskError::EmptyTitle);
        }
        let Some(task_id) = self.task_id.clone() else {
            return Err(SubtaskError::NoActiveTask);
        };
        if let Some(parent) = parent_id {
            if chain_has_cycle(&self.flat, parent) {
                return Err(SubtaskError::ParentCycle {
                    parent_id: parent.to_string(),
                });
            }
        }

        let position = next_sibling_position(&self.flat, parent_id);
        let inserted = self
            .store
            .insert(NewSubtask {
                task_id,
                parent_id: parent_id.map(str::to_string),
                title: title.to_string(),
                position,
            })
            .await?;
        debug!(id = %inserted.id, position, "subtask added");

        self.refetch().await;
        Ok(inserted)
    }

    /// Apply a partial update to one record, then re-fetch. An empty patch
    /// is a no-op.
    pub async fn update(&mut self, id: &str, patch: SubtaskPatch) -> SubtaskResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.store.update(id, patch).await?;
        self.refetch().await;
        Ok(())
    }

    /// Delete exactly the named record, then re-fetch.
    ///
    /// Children are not cascaded; their `parent_id` now points at a missing
    /// record, so the next tree build places them at root level.
    pub async fn delete(&mut self, id: &str) -> SubtaskResult<()> {
        self.store.delete(id).await?;
        self.refetch().await;
        Ok(())
    }

    /// Persist a caller-supplied reordering of the flat list.
    ///
    /// The new order is staged locally and each item's position set to its
    /// index, then written through one atomic store call. The visible state
    /// switches to the staged order only after that write succeeds; on
    /// failure the prior order stays visible and the error is returned.
    ///
    /// Ids not in the current list are ignored; current items missing from
    /// `new_order` keep their relative order at the end of the list.
    pub async fn reorder(&mut self, new_order: &[String]) -> SubtaskResult<()> {
        let mut staged: Vec<Subtask> = new_order
            .iter()
            .filter_map(|id| self.flat.iter().find(|s| &s.id == id).cloned())
            .collect();
        for subtask in &self.flat {
            if !new_order.contains(&subtask.id) {
                staged.push(subtask.clone());
            }
        }
        for (index, subtask) in staged.iter_mut().enumerate() {
            subtask.position = index as i64;
        }

        let updates: Vec<(String, i64)> = staged
            .iter()
            .map(|s| (s.id.clone(), s.position))
            .collect();
        self.store.update_positions(&updates).await?;
        debug!(count = updates.len(), "subtask order persisted");

        self.replace_list(staged);
        Ok(())
    }

    fn replace_list(&mut self, flat: Vec<Subtask>) {
        self.flat = flat;
        self.tree = build_tree(&self.flat);
        self.check_all_completed();
    }

    fn check_all_completed(&mut self) {
        let all = !self.flat.is_empty() && self.flat.iter().all(|s| s.is_completed);
        if all && !self.was_all_completed {
            if let Some(hook) = &self.on_all_completed {
                hook();
            }
        }
        self.was_all_completed = all;
    }
}

/// One past the highest position among siblings sharing `parent_id`, or 0
/// when the group is empty. Example: siblings at `[0, 2, 5]` yield 6.
fn next_sibling_position(flat: &[Subtask], parent_id: Option<&str>) -> i64 {
    flat.iter()
        .filter(|s| s.parent_id.as_deref() == parent_id)
        .map(|s| s.position)
        .max()
        .map_or(0, |max| max + 1)
}
