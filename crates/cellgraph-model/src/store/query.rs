use super::{CellStore, HashSet};
use crate::cell::{CellId, CellKind};

impl CellStore {
    /// Edges connected to `cell`, filtered by direction. Loops (source == target) are only
    /// returned when `include_loops` is set.
    pub fn edges_of(
        &self,
        cell: CellId,
        incoming: bool,
        outgoing: bool,
        include_loops: bool,
    ) -> Vec<CellId> {
        let mut out = Vec::new();
        for &edge in self.edges(cell) {
            let source = self.terminal(edge, true);
            let target = self.terminal(edge, false);
            let is_loop = source.is_some() && source == target;
            if (include_loops && is_loop)
                || (source != target
                    && ((incoming && target == Some(cell)) || (outgoing && source == Some(cell))))
            {
                out.push(edge);
            }
        }
        out
    }

    pub fn connections(&self, cell: CellId) -> Vec<CellId> {
        self.edges_of(cell, true, true, true)
    }

    pub fn incoming_edges(&self, cell: CellId) -> Vec<CellId> {
        self.edges_of(cell, true, false, false)
    }

    pub fn outgoing_edges(&self, cell: CellId) -> Vec<CellId> {
        self.edges_of(cell, false, true, false)
    }

    /// Number of edges leaving (`outgoing`) or entering `cell`, not counting `ignored`.
    pub fn directed_edge_count(&self, cell: CellId, outgoing: bool, ignored: Option<CellId>) -> usize {
        self.edges(cell)
            .iter()
            .filter(|&&e| Some(e) != ignored && self.terminal(e, outgoing) == Some(cell))
            .count()
    }

    /// Edges between `a` and `b`. When `directed`, only edges from `a` to `b`.
    pub fn edges_between(&self, a: CellId, b: CellId, directed: bool) -> Vec<CellId> {
        let scan = if self.edge_count(b) < self.edge_count(a) {
            b
        } else {
            a
        };
        let mut out = Vec::new();
        for &edge in self.edges(scan) {
            let source = self.terminal(edge, true);
            let target = self.terminal(edge, false);
            let forward = source == Some(a) && target == Some(b);
            let backward = source == Some(b) && target == Some(a);
            if forward || (!directed && backward) {
                out.push(edge);
            }
        }
        out
    }

    /// Terminals at the far end of `edges` as seen from `terminal`.
    pub fn opposites(
        &self,
        edges: &[CellId],
        terminal: CellId,
        sources: bool,
        targets: bool,
    ) -> Vec<CellId> {
        let mut out = Vec::new();
        for &edge in edges {
            let source = self.terminal(edge, true);
            let target = self.terminal(edge, false);
            if source == Some(terminal) && targets {
                if let Some(t) = target.filter(|t| *t != terminal) {
                    out.push(t);
                }
            } else if target == Some(terminal) && sources {
                if let Some(s) = source.filter(|s| *s != terminal) {
                    out.push(s);
                }
            }
        }
        out
    }

    pub fn child_cells(&self, parent: CellId, kind: Option<CellKind>) -> Vec<CellId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|c| kind.is_none() || self.kind(*c) == kind)
            .collect()
    }

    pub fn child_vertices(&self, parent: CellId) -> Vec<CellId> {
        self.child_cells(parent, Some(CellKind::Vertex))
    }

    pub fn child_edges(&self, parent: CellId) -> Vec<CellId> {
        self.child_cells(parent, Some(CellKind::Edge))
    }

    /// The cells of `cells` that have no ancestor in `cells`.
    pub fn topmost_cells(&self, cells: &[CellId]) -> Vec<CellId> {
        let set: HashSet<CellId> = cells.iter().copied().collect();
        cells
            .iter()
            .copied()
            .filter(|&c| !self.ancestors(c).any(|a| set.contains(&a)))
            .collect()
    }
}
