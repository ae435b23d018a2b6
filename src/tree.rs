//! Pure tree build/flatten operations over flat subtask lists.

use crate::types::{Subtask, SubtaskNode};
use std::collections::{HashMap, HashSet};

/// Build the nested view from a flat, position-ordered list.
///
/// Items whose `parent_id` is absent, or references an id not present in the
/// list, become roots in list order. Known parents receive their children in
/// list order, to arbitrary depth. Members of a `parent_id` cycle are
/// unreachable from any root and are omitted; cycles are rejected at the
/// mutation boundary before they can be stored.
pub fn build_tree(flat: &[Subtask]) -> Vec<SubtaskNode> {
    let ids: HashSet<&str> = flat.iter().map(|s| s.id.as_str()).collect();

    let mut children_of: HashMap<&str, Vec<&Subtask>> = HashMap::new();
    let mut roots: Vec<&Subtask> = Vec::new();
    for subtask in flat {
        match subtask.parent_id.as_deref().filter(|p| ids.contains(p)) {
            Some(parent) => children_of.entry(parent).or_default().push(subtask),
            None => roots.push(subtask),
        }
    }

    roots
        .into_iter()
        .map(|root| attach_children(root, &children_of))
        .collect()
}

fn attach_children(subtask: &Subtask, children_of: &HashMap<&str, Vec<&Subtask>>) -> SubtaskNode {
    let children = children_of
        .get(subtask.id.as_str())
        .map(|kids| {
            kids.iter()
                .map(|kid| attach_children(kid, children_of))
                .collect()
        })
        .unwrap_or_default();

    SubtaskNode {
        subtask: subtask.clone(),
        children,
    }
}

/// Flatten a tree back into a single list in pre-order (each node before its
/// children). Inverse of [`build_tree`] up to sibling-position normalization.
pub fn flatten_tree(tree: &[SubtaskNode]) -> Vec<Subtask> {
    let mut out = Vec::new();
    for node in tree {
        flatten_into(node, &mut out);
    }
    out
}

fn flatten_into(node: &SubtaskNode, out: &mut Vec<Subtask>) {
    out.push(node.subtask.clone());
    for child in &node.children {
        flatten_into(child, out);
    }
}

/// Walk the `parent_id` chain starting at `id`, reporting whether it loops
/// instead of terminating at a root or at an id missing from the list.
pub fn chain_has_cycle(flat: &[Subtask], id: &str) -> bool {
    let parents: HashMap<&str, Option<&str>> = flat
        .iter()
        .map(|s| (s.id.as_str(), s.parent_id.as_deref()))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = Some(id);
    while let Some(id) = current {
        if !seen.insert(id) {
            return true;
        }
        current = parents.get(id).copied().flatten();
    }
    false
}
