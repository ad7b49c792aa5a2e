//! Cell paths: the child indices leading from the top-most ancestor to a cell, joined by `.`.
//!
//! The root has the empty path. Two paths share a prefix exactly when the cells share the
//! corresponding ancestor, which is what nearest-common-ancestor lookups rely on.

use crate::{CellId, CellStore};

pub const SEPARATOR: char = '.';

pub fn create(store: &CellStore, cell: CellId) -> String {
    let mut indices = Vec::new();
    let mut current = cell;
    for _ in 0..=store.len() {
        let Some(parent) = store.parent(current) else {
            break;
        };
        indices.push(store.index_of(parent, current).unwrap_or(0));
        current = parent;
    }
    indices
        .iter()
        .rev()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// The path of the parent, or the empty path for top-level cells.
pub fn parent_path(path: &str) -> &str {
    path.rfind(SEPARATOR).map_or("", |i| &path[..i])
}

/// Walks `path` down from `root`.
pub fn resolve(store: &CellStore, root: CellId, path: &str) -> Option<CellId> {
    let mut current = root;
    if path.is_empty() {
        return Some(current);
    }
    for token in path.split(SEPARATOR) {
        let index = token.parse::<usize>().ok()?;
        current = store.child_at(current, index)?;
    }
    Some(current)
}
