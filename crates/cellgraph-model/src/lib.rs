#![forbid(unsafe_code)]

//! Cell-graph document model.
//!
//! A document is a tree of cells (ownership) overlaid with a graph (edges connecting terminals).
//! All mutations go through [`Model`], which applies self-reversing [`Change`]s to a
//! [`CellStore`], groups them into [`Edit`]s per outermost transaction, and notifies listeners.
//! [`UndoManager`] keeps a bounded history of dispatched edits.

pub mod cell;
pub mod change;
pub mod edit;
pub mod error;
pub mod event;
pub mod geom;
pub mod geometry;
pub mod model;
pub mod path;
pub mod store;
pub mod style;
pub mod undo;

pub use cell::{Cell, CellId, CellKind};
pub use change::{AtomicChange, Change};
pub use edit::Edit;
pub use error::{Error, Result};
pub use event::{EventKind, ListenerId};
pub use geom::{Point, Rect, Vector};
pub use geometry::Geometry;
pub use model::{Model, ModelEvent, ModelOptions, Transaction};
pub use store::CellStore;
pub use style::Style;
pub use undo::{UndoEvent, UndoManager, UndoOptions};
