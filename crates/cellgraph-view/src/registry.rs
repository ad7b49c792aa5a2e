use crate::edge_style::{self, EdgeStyleFn};
use crate::perimeter::{self, PerimeterFn};
use indexmap::IndexMap;

/// Named perimeter and edge-style functions, looked up by the `perimeter`, `edgeStyle` and
/// `loopStyle` style values.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    perimeters: IndexMap<String, PerimeterFn>,
    edge_styles: IndexMap<String, EdgeStyleFn>,
}

impl FunctionRegistry {
    /// An empty registry. Every perimeter lookup misses, so floating ends attach at shape centres.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.add_perimeter(perimeter::RECTANGLE, perimeter::rectangle);
        reg.add_perimeter(perimeter::ELLIPSE, perimeter::ellipse);
        reg.add_perimeter(perimeter::RHOMBUS, perimeter::rhombus);
        reg.add_perimeter(perimeter::TRIANGLE, perimeter::triangle);
        reg.add_perimeter(perimeter::HEXAGON, perimeter::hexagon);
        reg.add_edge_style(edge_style::LOOP, edge_style::loop_style);
        reg
    }

    pub fn add_perimeter(&mut self, name: impl Into<String>, f: PerimeterFn) {
        self.perimeters.insert(name.into(), f);
    }

    pub fn add_edge_style(&mut self, name: impl Into<String>, f: EdgeStyleFn) {
        self.edge_styles.insert(name.into(), f);
    }

    pub fn perimeter(&self, name: &str) -> Option<PerimeterFn> {
        self.perimeters.get(name).copied()
    }

    pub fn edge_style(&self, name: &str) -> Option<EdgeStyleFn> {
        self.edge_styles.get(name).copied()
    }

    pub fn perimeter_names(&self) -> impl Iterator<Item = &str> {
        self.perimeters.keys().map(String::as_str)
    }

    pub fn edge_style_names(&self) -> impl Iterator<Item = &str> {
        self.edge_styles.keys().map(String::as_str)
    }
}
