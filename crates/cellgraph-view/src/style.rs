use cellgraph_model::style::keys;
use cellgraph_model::{CellKind, Style};

pub const DEFAULT_MARKERSIZE: f64 = 6.0;
pub const ARROW_WIDTH: f64 = 30.0;
pub const SHADOW_OFFSETX: f64 = 2.0;
pub const SHADOW_OFFSETY: f64 = 3.0;
pub const DEFAULT_FONTSIZE: f64 = 11.0;

pub const SHAPE_RECTANGLE: &str = "rectangle";
pub const SHAPE_ARROW: &str = "arrow";
pub const ARROW_CLASSIC: &str = "classic";

/// Produces the effective style of a cell from its own style.
pub trait StyleResolver {
    fn resolve(&self, kind: CellKind, style: &Style) -> Style;
}

/// Default vertex and edge styles with the cell's own values layered on top.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseStyles {
    pub vertex: Style,
    pub edge: Style,
}

impl Default for BaseStyles {
    fn default() -> Self {
        Self {
            vertex: Style::new()
                .with(keys::SHAPE, SHAPE_RECTANGLE)
                .with(keys::PERIMETER, crate::perimeter::RECTANGLE),
            edge: Style::new().with(keys::END_ARROW, ARROW_CLASSIC),
        }
    }
}

impl StyleResolver for BaseStyles {
    fn resolve(&self, kind: CellKind, style: &Style) -> Style {
        match kind {
            CellKind::Vertex => self.vertex.merged(style),
            CellKind::Edge => self.edge.merged(style),
            CellKind::Group => style.clone(),
        }
    }
}
