//! Atomic, self-reversing document changes.
//!
//! [`Change::apply`] performs a change against a [`CellStore`] and returns the change that
//! reverts it. [`AtomicChange`] keeps both halves so an edit can be replayed in either direction
//! any number of times.

use crate::cell::CellId;
use crate::geometry::Geometry;
use crate::store::CellStore;
use crate::style::Style;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Root {
        root: Option<CellId>,
    },
    /// Moves `child` under `parent` at `index`, or out of the document when `parent` is `None`.
    Child {
        child: CellId,
        parent: Option<CellId>,
        index: usize,
    },
    Terminal {
        edge: CellId,
        terminal: Option<CellId>,
        source: bool,
    },
    Value {
        cell: CellId,
        value: Value,
    },
    Style {
        cell: CellId,
        style: Style,
    },
    Geometry {
        cell: CellId,
        geometry: Option<Geometry>,
    },
    Collapsed {
        cell: CellId,
        collapsed: bool,
    },
    Visible {
        cell: CellId,
        visible: bool,
    },
}

impl Change {
    /// Applies the change and returns its inverse.
    pub fn apply(&self, store: &mut CellStore) -> Change {
        match self {
            Change::Root { root } => Change::Root {
                root: store.set_root(*root),
            },
            Change::Child {
                child,
                parent,
                index,
            } => {
                let previous = store.parent(*child);
                let previous_index = previous
                    .and_then(|p| store.index_of(p, *child))
                    .unwrap_or(0);
                if parent.is_none() {
                    store.connect(*child, false);
                }
                store.parent_changed(*child, *parent, *index);
                if parent.is_some() {
                    store.connect(*child, true);
                }
                Change::Child {
                    child: *child,
                    parent: previous,
                    index: previous_index,
                }
            }
            Change::Terminal {
                edge,
                terminal,
                source,
            } => Change::Terminal {
                edge: *edge,
                terminal: store.set_terminal(*edge, *terminal, *source),
                source: *source,
            },
            Change::Value { cell, value } => Change::Value {
                cell: *cell,
                value: store.set_value(*cell, value.clone()),
            },
            Change::Style { cell, style } => Change::Style {
                cell: *cell,
                style: store.set_style(*cell, style.clone()),
            },
            Change::Geometry { cell, geometry } => Change::Geometry {
                cell: *cell,
                geometry: store.set_geometry(*cell, geometry.clone()),
            },
            Change::Collapsed { cell, collapsed } => Change::Collapsed {
                cell: *cell,
                collapsed: store.set_collapsed(*cell, *collapsed),
            },
            Change::Visible { cell, visible } => Change::Visible {
                cell: *cell,
                visible: store.set_visible(*cell, *visible),
            },
        }
    }

    /// The cell the change is about. Root changes have none.
    pub fn cell(&self) -> Option<CellId> {
        match self {
            Change::Root { .. } => None,
            Change::Child { child, .. } => Some(*child),
            Change::Terminal { edge, .. } => Some(*edge),
            Change::Value { cell, .. }
            | Change::Style { cell, .. }
            | Change::Geometry { cell, .. }
            | Change::Collapsed { cell, .. }
            | Change::Visible { cell, .. } => Some(*cell),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Change::Root { .. } => "root",
            Change::Child { .. } => "child",
            Change::Terminal { .. } => "terminal",
            Change::Value { .. } => "value",
            Change::Style { .. } => "style",
            Change::Geometry { .. } => "geometry",
            Change::Collapsed { .. } => "collapsed",
            Change::Visible { .. } => "visible",
        }
    }
}

/// An executed change together with the change that reverts it.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicChange {
    change: Change,
    inverse: Change,
}

impl AtomicChange {
    pub fn execute(change: Change, store: &mut CellStore) -> Self {
        let inverse = change.apply(store);
        Self { change, inverse }
    }

    /// The change as last applied in the forward direction.
    pub fn change(&self) -> &Change {
        &self.change
    }

    /// The change that restores the state before [`Self::change`].
    pub fn inverse(&self) -> &Change {
        &self.inverse
    }

    pub fn undo(&mut self, store: &mut CellStore) {
        self.change = self.inverse.apply(store);
    }

    pub fn redo(&mut self, store: &mut CellStore) {
        self.inverse = self.change.apply(store);
    }
}
