#![forbid(unsafe_code)]

//! Diagram documents with transactional edits, undo/redo and an incrementally validated view.
//!
//! [`Graph`] wires a [`Model`], a [`View`] and an [`UndoManager`] together. The underlying crates
//! are re-exported for direct use:
//! - [`model`]: cells, changes, edits, transactions and the undo history
//! - [`view`]: cell states, perimeters, edge styles and the view engine

pub mod config;
pub mod error;
pub mod graph;

pub use cellgraph_model as model;
pub use cellgraph_view as view;

pub use cellgraph_model::{
    Cell, CellId, CellKind, Edit, EventKind, Geometry, Model, ModelOptions, Point, Rect, Style,
    UndoManager, UndoOptions,
};
pub use cellgraph_view::{CellState, FunctionRegistry, View, ViewOptions};
pub use config::GraphConfig;
pub use error::{Error, Result};
pub use graph::Graph;
