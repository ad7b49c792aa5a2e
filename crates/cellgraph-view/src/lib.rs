#![forbid(unsafe_code)]

//! Incremental geometric view over a cellgraph document.
//!
//! [`View`] caches a [`CellState`] (absolute bounds, routed edge points, label and bounding box) for
//! every visible cell of a document read through [`CellSource`]. Model commits invalidate the
//! affected states; [`View::validate`] recomputes only what is invalid.

pub mod edge_style;
pub mod perimeter;
pub mod registry;
pub mod source;
pub mod state;
pub mod style;
pub mod text;
pub mod view;

pub use edge_style::{EdgeStyleFn, RouteContext};
pub use perimeter::PerimeterFn;
pub use registry::FunctionRegistry;
pub use source::CellSource;
pub use state::CellState;
pub use style::{BaseStyles, StyleResolver};
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};
pub use view::{ChildOffsetFn, View, ViewOptions};
