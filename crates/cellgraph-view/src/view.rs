//! Incremental cache of absolute cell geometry.
//!
//! The view keeps one [`CellState`] per visible cell. States are marked invalid by
//! [`View::invalidate`] (usually from [`View::process_edit`] after a model commit) and recomputed
//! lazily by [`View::validate`]. Validation of a state first validates the states it depends on: its
//! parent, and for edges the visible terminals.

use crate::edge_style::{self, EdgeStyleFn, RouteContext};
use crate::perimeter::PerimeterFn;
use crate::registry::FunctionRegistry;
use crate::source::CellSource;
use crate::state::CellState;
use crate::style::{
    ARROW_WIDTH, BaseStyles, DEFAULT_FONTSIZE, DEFAULT_MARKERSIZE, SHADOW_OFFSETX, SHADOW_OFFSETY,
    SHAPE_ARROW, StyleResolver,
};
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle};
use cellgraph_model::geom::{
    grow, is_finite_point, line_distance, point, rect, relative_ccw, segment_distance_sq, union,
    vector,
};
use cellgraph_model::style::keys;
use cellgraph_model::{CellId, Change, Edit, Geometry, Point, Rect, Style, Vector};
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub(crate) type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
pub(crate) type HashSet<K> = hashbrown::HashSet<K, FxBuildHasher>;

/// Extra offset added to the origin of a cell's children, e.g. for container title bars.
pub type ChildOffsetFn = fn(&dyn CellSource, CellId) -> Option<Vector>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewOptions {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    /// Edge style used for self loops without a `loopStyle`.
    pub default_loop_style: String,
    pub font_size: f64,
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            default_loop_style: edge_style::LOOP.to_string(),
            font_size: DEFAULT_FONTSIZE,
            char_width_factor: 0.6,
            line_height_factor: 1.2,
        }
    }
}

pub struct View {
    states: HashMap<CellId, CellState>,
    scale: f64,
    translate: Vector,
    current_root: Option<CellId>,
    graph_bounds: Rect,
    default_loop_style: String,
    text_style: TextStyle,
    registry: Arc<FunctionRegistry>,
    resolver: Box<dyn StyleResolver>,
    measurer: Box<dyn TextMeasurer>,
    child_offset: Option<ChildOffsetFn>,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("states", &self.states.len())
            .field("scale", &self.scale)
            .field("translate", &self.translate)
            .field("current_root", &self.current_root)
            .field("graph_bounds", &self.graph_bounds)
            .finish_non_exhaustive()
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        Self::with_options(ViewOptions::default())
    }

    pub fn with_options(options: ViewOptions) -> Self {
        Self {
            states: HashMap::default(),
            scale: valid_scale(options.scale).unwrap_or(1.0),
            translate: vector(options.translate_x, options.translate_y),
            current_root: None,
            graph_bounds: Rect::zero(),
            default_loop_style: options.default_loop_style,
            text_style: TextStyle {
                font_size: options.font_size,
            },
            registry: Arc::new(FunctionRegistry::with_defaults()),
            resolver: Box::new(BaseStyles::default()),
            measurer: Box::new(DeterministicTextMeasurer::new(
                options.char_width_factor,
                options.line_height_factor,
            )),
            child_offset: None,
        }
    }

    pub fn with_registry(mut self, registry: Arc<FunctionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_style_resolver(mut self, resolver: impl StyleResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_text_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    pub fn with_child_offset(mut self, f: ChildOffsetFn) -> Self {
        self.child_offset = Some(f);
        self
    }

    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> Vector {
        self.translate
    }

    pub fn current_root(&self) -> Option<CellId> {
        self.current_root
    }

    /// Bounding box of everything below the current root, as of the last [`View::validate`].
    pub fn graph_bounds(&self) -> Rect {
        self.graph_bounds
    }

    pub fn state(&self, cell: CellId) -> Option<&CellState> {
        self.states.get(&cell)
    }

    /// States of the given cells, skipping cells without one.
    pub fn states(&self, cells: &[CellId]) -> Vec<&CellState> {
        cells.iter().filter_map(|c| self.states.get(c)).collect()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Cells that have a state, in ascending id order.
    pub fn cells(&self) -> Vec<CellId> {
        let mut cells: Vec<CellId> = self.states.keys().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// Non-positive and non-finite scales are ignored.
    pub fn set_scale(&mut self, source: &dyn CellSource, scale: f64) {
        let Some(scale) = valid_scale(scale) else {
            tracing::debug!(scale, "ignoring invalid view scale");
            return;
        };
        if self.scale != scale {
            self.scale = scale;
            self.revalidate(source);
        }
    }

    pub fn set_translate(&mut self, source: &dyn CellSource, dx: f64, dy: f64) {
        let t = vector(dx, dy);
        if self.translate != t {
            self.translate = t;
            self.revalidate(source);
        }
    }

    pub fn scale_and_translate(&mut self, source: &dyn CellSource, scale: f64, dx: f64, dy: f64) {
        let scale = valid_scale(scale).unwrap_or(self.scale);
        let t = vector(dx, dy);
        if self.scale != scale || self.translate != t {
            self.scale = scale;
            self.translate = t;
            self.revalidate(source);
        }
    }

    /// Makes `root` the top of the displayed hierarchy and rebuilds all states. Returns the previous
    /// current root.
    pub fn set_current_root(
        &mut self,
        source: &dyn CellSource,
        root: Option<CellId>,
    ) -> Option<CellId> {
        let previous = std::mem::replace(&mut self.current_root, root);
        if previous != root {
            self.reload(source);
        }
        previous
    }

    /// Drops every state and validates from scratch.
    pub fn reload(&mut self, source: &dyn CellSource) {
        self.states.clear();
        self.validate(source);
    }

    pub fn revalidate(&mut self, source: &dyn CellSource) {
        self.invalidate(source, None);
        self.validate(source);
    }

    /// Removes the state of `cell`. With `recurse`, descendants are removed too, except below the
    /// current root unless `force` is set; otherwise the cell's subtree and edges are invalidated.
    pub fn clear(&mut self, source: &dyn CellSource, cell: CellId, force: bool, recurse: bool) {
        let mut visited: HashSet<CellId> = HashSet::default();
        let mut stack = vec![cell];
        while let Some(c) = stack.pop() {
            if !visited.insert(c) {
                continue;
            }
            self.states.remove(&c);
            if recurse && (force || Some(c) != self.current_root) {
                stack.extend(source.children(c).iter().rev().copied());
            } else {
                self.invalidate(source, Some(c));
            }
        }
    }

    /// Marks `cell` (the model root by default), its descendants and all connected edges invalid.
    ///
    /// Traversal stops at states that are already invalid, so invalidating twice costs nothing the
    /// second time. Cells without a state are traversed through.
    pub fn invalidate(&mut self, source: &dyn CellSource, cell: Option<CellId>) {
        let Some(cell) = cell.or_else(|| source.root()) else {
            return;
        };
        let mut visited: HashSet<CellId> = HashSet::default();
        let mut stack = vec![cell];
        while let Some(c) = stack.pop() {
            if !visited.insert(c) {
                continue;
            }
            if let Some(state) = self.states.get_mut(&c) {
                if state.invalid {
                    continue;
                }
                state.invalid = true;
            }
            // Edges are pushed first so they are visited after the subtree.
            stack.extend(source.edges(c).iter().rev().copied());
            stack.extend(source.children(c).iter().rev().copied());
        }
    }

    fn mark_invalid(&mut self, cell: CellId) {
        if let Some(state) = self.states.get_mut(&cell) {
            state.invalid = true;
        }
    }

    /// Invalidates or drops states touched by a dispatched edit.
    pub fn process_edit(&mut self, source: &dyn CellSource, edit: &Edit) {
        for change in edit.changes() {
            match change.change() {
                Change::Root { .. } => {
                    tracing::debug!("root changed, dropping all cell states");
                    self.states.clear();
                    self.current_root = None;
                }
                Change::Child { child, parent, .. } => {
                    let child = *child;
                    if source.parent(child).is_none() {
                        self.clear(source, child, true, true);
                        // The subtree is stateless now, so this reaches every edge that still
                        // routes to it from outside.
                        self.invalidate(source, Some(child));
                    } else {
                        self.invalidate(source, Some(child));
                    }
                    let previous = match change.inverse() {
                        Change::Child { parent, .. } => *parent,
                        _ => None,
                    };
                    if *parent != previous {
                        for p in [*parent, previous].into_iter().flatten() {
                            self.mark_invalid(p);
                        }
                    }
                }
                other => {
                    if let Some(cell) = other.cell() {
                        self.invalidate(source, Some(cell));
                    }
                }
            }
        }
    }

    /// Brings every state below the current root up to date and recomputes the graph bounds.
    pub fn validate(&mut self, source: &dyn CellSource) {
        let Some(root) = self.current_root.or_else(|| source.root()) else {
            self.states.clear();
            self.graph_bounds = Rect::zero();
            return;
        };

        let mut reached: HashSet<CellId> = HashSet::default();
        self.validate_cell(source, root, &mut reached);
        self.states.retain(|cell, _| reached.contains(cell));

        self.validate_cell_state(source, root, true);
        self.graph_bounds = self
            .bounding_box(source, root, true)
            .unwrap_or_else(Rect::zero);
    }

    /// Creates states for visible cells below `cell`. Invisible cells and the children of collapsed
    /// cells are not reached.
    fn validate_cell(&mut self, source: &dyn CellSource, cell: CellId, reached: &mut HashSet<CellId>) {
        let mut stack = vec![cell];
        while let Some(c) = stack.pop() {
            if !source.is_visible(c) || !reached.insert(c) {
                continue;
            }
            if !self.states.contains_key(&c) {
                let style = self.resolve_style(source, c);
                self.states.insert(c, CellState::new(c, style));
            }
            if !source.is_collapsed(c) || Some(c) == self.current_root {
                stack.extend(source.children(c).iter().rev().copied());
            }
        }
    }

    fn resolve_style(&self, source: &dyn CellSource, cell: CellId) -> Style {
        let own = source.style(cell).cloned().unwrap_or_default();
        match source.kind(cell) {
            Some(kind) => self.resolver.resolve(kind, &own),
            None => own,
        }
    }

    /// Recomputes the state of `cell` if it is invalid, after validating the states it depends on.
    /// With `recurse`, descends into the children afterwards.
    pub fn validate_cell_state(&mut self, source: &dyn CellSource, cell: CellId, recurse: bool) {
        let Some(state) = self.states.get_mut(&cell) else {
            return;
        };

        if state.invalid {
            state.invalid = false;
            tracing::trace!(cell = cell.index(), "validating cell state");

            if Some(cell) != self.current_root {
                if let Some(parent) = source.parent(cell) {
                    self.validate_cell_state(source, parent, false);
                }
            }

            let visible_source = self.visible_terminal(source, cell, true);
            let visible_target = self.visible_terminal(source, cell, false);
            for t in [visible_source, visible_target].into_iter().flatten() {
                self.validate_cell_state(source, t, false);
            }
            let visible_source = visible_source.filter(|t| self.states.contains_key(t));
            let visible_target = visible_target.filter(|t| self.states.contains_key(t));

            self.refresh(source, cell, visible_source, visible_target);
        }

        if recurse && self.states.contains_key(&cell) {
            for &child in source.children(cell) {
                self.validate_cell_state(source, child, true);
            }
        }
    }

    fn refresh(
        &mut self,
        source: &dyn CellSource,
        cell: CellId,
        visible_source: Option<CellId>,
        visible_target: Option<CellId>,
    ) {
        let Some(mut state) = self.states.remove(&cell) else {
            return;
        };
        state.visible_source = visible_source;
        state.visible_target = visible_target;

        if !self.update_cell_state(source, &mut state) {
            tracing::debug!(cell = cell.index(), "dropping edge without resolvable terminals");
            self.clear(source, cell, true, true);
            return;
        }
        if source.is_vertex(cell) || source.is_edge(cell) {
            self.update_label_bounds(source, &mut state);
            self.update_bounding_box(source, &mut state);
        }
        self.states.insert(cell, state);
    }

    /// Returns `false` when the state must be dropped.
    fn update_cell_state(&self, source: &dyn CellSource, state: &mut CellState) -> bool {
        let cell = state.cell;
        state.reset();
        state.style = self.resolve_style(source, cell);
        if Some(cell) == self.current_root {
            return true;
        }

        let is_edge = source.is_edge(cell);
        let parent_state = source.parent(cell).and_then(|p| self.states.get(&p));
        if let Some(ps) = parent_state {
            if Some(ps.cell) != self.current_root {
                state.origin += ps.origin.to_vector();
            }
        }
        if let Some(offset) = self.child_offset.and_then(|f| f(source, cell)) {
            state.origin += offset;
        }

        let geo = match source.geometry(cell) {
            Some(geo) => geo.clone(),
            None if is_edge => Geometry::relative(0.0, 0.0),
            None => return true,
        };

        if !is_edge {
            let offset = geo.offset.unwrap_or(point(0.0, 0.0));
            match parent_state {
                Some(ps) if geo.relative => {
                    if source.is_edge(ps.cell) {
                        let on_edge = self.point_on_edge(ps, Some(&geo));
                        state.origin.x += on_edge.x / self.scale - ps.origin.x - self.translate.x;
                        state.origin.y += on_edge.y / self.scale - ps.origin.y - self.translate.y;
                    } else {
                        state.origin.x += geo.x * ps.width() / self.scale + offset.x;
                        state.origin.y += geo.y * ps.height() / self.scale + offset.y;
                    }
                }
                _ => {
                    state.absolute_offset = point(self.scale * offset.x, self.scale * offset.y);
                    state.origin.x += geo.x;
                    state.origin.y += geo.y;
                }
            }
        }

        state.bounds = rect(
            self.scale * (self.translate.x + state.origin.x),
            self.scale * (self.translate.y + state.origin.y),
            self.scale * geo.width,
            self.scale * geo.height,
        );

        if source.is_vertex(cell) {
            update_vertex_label_offset(state);
        }
        if is_edge && !self.update_edge_state(source, state, &geo) {
            return false;
        }

        state.label = if state.style.bool_or(keys::NO_LABEL, false) {
            None
        } else {
            source.label(cell)
        };
        true
    }

    fn update_edge_state(&self, source: &dyn CellSource, state: &mut CellState, geo: &Geometry) -> bool {
        let src = state.visible_source.and_then(|c| self.states.get(&c));
        let trg = state.visible_target.and_then(|c| self.states.get(&c));

        if (src.is_none() && geo.terminal_point(true).is_none())
            || (trg.is_none() && geo.terminal_point(false).is_none())
        {
            return false;
        }

        let p0 = self.fixed_terminal_point(state, src, geo, true);
        let pe = self.fixed_terminal_point(state, trg, geo, false);

        let interior = {
            let ctx = RouteContext {
                edge: state,
                scale: self.scale,
                translate: self.translate,
                source_point: p0,
                target_point: pe,
            };
            let src_port = self.terminal_port(source, state, src, true);
            let trg_port = self.terminal_port(source, state, trg, false);
            match self.edge_style(state) {
                Some(f) => f(&ctx, src_port, trg_port, &geo.points),
                None => edge_style::pass_through(&ctx, src_port, trg_port, &geo.points),
            }
        };

        let mut pts: Vec<Option<Point>> = Vec::with_capacity(interior.len() + 2);
        pts.push(p0);
        pts.extend(interior.into_iter().map(Some));
        pts.push(pe);

        // The target end is resolved first so the source end can aim at it.
        let last = pts.len() - 1;
        if pts[last].is_none() {
            if let Some(trg) = trg {
                let pt = self.floating_terminal_point(source, state, &pts, trg, src, false);
                pts[last] = Some(pt);
            }
        }
        if pts[0].is_none() {
            if let Some(src) = src {
                let pt = self.floating_terminal_point(source, state, &pts, src, trg, true);
                pts[0] = Some(pt);
            }
        }

        let resolved: Vec<Point> = pts.iter().flatten().copied().collect();
        if resolved.len() < 2
            || resolved.len() != pts.len()
            || !resolved.iter().all(|p| is_finite_point(*p))
        {
            return false;
        }

        state.absolute_points = resolved;
        update_edge_bounds(state);
        state.absolute_offset = self.point_on_edge(state, Some(geo));
        true
    }

    fn fixed_terminal_point(
        &self,
        edge: &CellState,
        terminal: Option<&CellState>,
        geo: &Geometry,
        is_source: bool,
    ) -> Option<Point> {
        let pt = terminal.and_then(|t| self.connection_point(edge, t, is_source));
        if pt.is_some() || terminal.is_some() {
            return pt;
        }
        geo.terminal_point(is_source).map(|p| {
            point(
                self.scale * (self.translate.x + p.x + edge.origin.x),
                self.scale * (self.translate.y + p.y + edge.origin.y),
            )
        })
    }

    /// Point fixed by the `exitX/exitY` (source) or `entryX/entryY` (target) constraint.
    fn connection_point(&self, edge: &CellState, terminal: &CellState, is_source: bool) -> Option<Point> {
        let (kx, ky, kp) = if is_source {
            (keys::EXIT_X, keys::EXIT_Y, keys::EXIT_PERIMETER)
        } else {
            (keys::ENTRY_X, keys::ENTRY_Y, keys::ENTRY_PERIMETER)
        };
        let cx = edge.style.get_f64(kx)?;
        let cy = edge.style.get_f64(ky)?;
        let b = terminal.bounds;
        let pt = point(b.min_x() + cx * b.width(), b.min_y() + cy * b.height());
        if edge.style.bool_or(kp, true) {
            Some(self.perimeter_point(terminal, Some(pt), false, 0.0))
        } else {
            Some(pt)
        }
    }

    fn edge_style(&self, edge: &CellState) -> Option<EdgeStyleFn> {
        let is_loop = edge.visible_source.is_some() && edge.visible_source == edge.visible_target;
        let name = if is_loop {
            Some(
                edge.style
                    .get(keys::LOOP)
                    .unwrap_or(self.default_loop_style.as_str()),
            )
        } else if !edge.style.bool_or(keys::NO_EDGE_STYLE, false) {
            edge.style.get(keys::EDGE)
        } else {
            None
        }?;

        let f = self.registry.edge_style(name);
        if f.is_none() {
            tracing::debug!(name, "unknown edge style, routing through waypoints");
        }
        f
    }

    fn floating_terminal_point(
        &self,
        source: &dyn CellSource,
        edge: &CellState,
        pts: &[Option<Point>],
        start: &CellState,
        end: Option<&CellState>,
        is_source: bool,
    ) -> Point {
        let start = self
            .terminal_port(source, edge, Some(start), is_source)
            .unwrap_or(start);
        let next = next_point(pts, end, is_source);
        let spacing = if is_source {
            keys::SOURCE_PERIMETER_SPACING
        } else {
            keys::TARGET_PERIMETER_SPACING
        };
        let border =
            edge.style.f64_or(keys::PERIMETER_SPACING, 0.0) + edge.style.f64_or(spacing, 0.0);
        let orthogonal = edge.style.bool_or(keys::ORTHOGONAL, false);
        self.perimeter_point(start, next, orthogonal, border)
    }

    /// State of the port named by `sourcePort`/`targetPort` on `edge`, if it has one, else
    /// `terminal`.
    pub fn terminal_port<'a>(
        &'a self,
        source: &dyn CellSource,
        edge: &CellState,
        terminal: Option<&'a CellState>,
        is_source: bool,
    ) -> Option<&'a CellState> {
        let key = if is_source {
            keys::SOURCE_PORT
        } else {
            keys::TARGET_PORT
        };
        edge.style
            .get(key)
            .and_then(|id| source.cell_by_id(id))
            .and_then(|port| self.states.get(&port))
            .or(terminal)
    }

    pub fn perimeter_function(&self, state: &CellState) -> Option<PerimeterFn> {
        state
            .style
            .get(keys::PERIMETER)
            .and_then(|name| self.registry.perimeter(name))
    }

    /// Where a line from `next` towards the terminal meets its perimeter, grown by `border` plus the
    /// terminal's own perimeter spacing. Falls back to the terminal's centre.
    pub fn perimeter_point(
        &self,
        terminal: &CellState,
        next: Option<Point>,
        orthogonal: bool,
        border: f64,
    ) -> Point {
        let hit = match (self.perimeter_function(terminal), next) {
            (Some(f), Some(next)) => {
                let border = border + terminal.style.f64_or(keys::PERIMETER_SPACING, 0.0);
                let bounds = terminal.perimeter_bounds(border * self.scale);
                if bounds.width() > 0.0 || bounds.height() > 0.0 {
                    Some(f(bounds, Some(terminal), next, orthogonal))
                } else {
                    None
                }
            }
            _ => None,
        };
        hit.filter(|p| is_finite_point(*p))
            .unwrap_or_else(|| self.point_on_edge(terminal, None))
    }

    /// Terminal the edge is drawn to: the outermost invisible or collapsed ancestor of the model
    /// terminal below the current root, or `None` if that is a layer.
    pub fn visible_terminal(
        &self,
        source: &dyn CellSource,
        edge: CellId,
        is_source: bool,
    ) -> Option<CellId> {
        let mut result = source.terminal(edge, is_source);
        let mut best = result;
        let mut visited: HashSet<CellId> = HashSet::default();
        while let Some(r) = result {
            if Some(r) == self.current_root || !visited.insert(r) {
                break;
            }
            let best_hidden = best.is_some_and(|b| !source.is_visible(b));
            if best_hidden || source.is_collapsed(r) {
                best = Some(r);
            }
            result = source.parent(r);
        }
        best.filter(|b| !source.is_layer(*b))
    }

    /// Point at the relative position `geometry` along the routed edge of `state`. Without
    /// segments (vertices), the centre plus the geometry offset.
    pub fn point_on_edge(&self, state: &CellState, geometry: Option<&Geometry>) -> Point {
        let c = state.center();
        let (mut x, mut y) = (c.x, c.y);
        let relative = geometry.is_none_or(|g| g.relative);

        if !state.segments.is_empty() && relative {
            let pts = &state.absolute_points;
            let gx = geometry.map_or(0.0, |g| g.x / 2.0);
            let dist = (gx + 0.5) * state.length;

            let mut segment = state.segments[0];
            let mut length = 0.0;
            let mut index = 1;
            while dist > length + segment && index < pts.len() - 1 {
                length += segment;
                segment = state.segments[index];
                index += 1;
            }

            let factor = if segment == 0.0 {
                0.0
            } else {
                (dist - length) / segment
            };
            let p0 = pts[index - 1];
            let pe = pts[index];

            let gy = geometry.map_or(0.0, |g| g.y);
            let offset = geometry.and_then(|g| g.offset).unwrap_or(point(0.0, 0.0));
            let dx = pe.x - p0.x;
            let dy = pe.y - p0.y;
            let nx = if segment == 0.0 { 0.0 } else { dy / segment };
            let ny = if segment == 0.0 { 0.0 } else { dx / segment };

            x = p0.x + dx * factor + (nx * gy + offset.x) * self.scale;
            y = p0.y + dy * factor - (ny * gy - offset.y) * self.scale;
        } else if let Some(offset) = geometry.and_then(|g| g.offset) {
            x += offset.x;
            y += offset.y;
        }
        point(x, y)
    }

    /// Inverse of [`View::point_on_edge`]: the relative geometry position that places a label at
    /// `(x, y)` on the edge of `state`.
    pub fn relative_point(&self, source: &dyn CellSource, state: &CellState, x: f64, y: f64) -> Point {
        let pts = &state.absolute_points;
        let relative = source.geometry(state.cell).is_some_and(|g| g.relative);
        if !relative || pts.len() < 2 || state.length == 0.0 {
            return point(0.0, 0.0);
        }

        let p = point(x, y);
        let total = state.length;
        let segments = &state.segments;

        let mut p0 = pts[0];
        let mut min_dist = segment_distance_sq(p0, pts[1], p);
        let mut index = 0;
        let mut tmp = 0.0;
        let mut length = 0.0;
        for i in 2..pts.len() {
            tmp += segments[i - 2];
            let pe = pts[i];
            let dist = segment_distance_sq(p0, pe, p);
            if dist < min_dist {
                min_dist = dist;
                index = i - 1;
                length = tmp;
            }
            p0 = pe;
        }

        let seg = segments[index];
        let p0 = pts[index];
        let pe = pts[index + 1];

        // Length of the projection of `p` onto the segment, measured from `p0`.
        let xs = p0.x - pe.x;
        let ys = p0.y - pe.y;
        let px = xs - (x - pe.x);
        let py = ys - (y - pe.y);
        let dot = px * xs + py * ys;
        let proj_sq = if dot <= 0.0 {
            0.0
        } else {
            dot * dot / (xs * xs + ys * ys)
        };
        let projlen = proj_sq.sqrt().min(seg);

        let mut y_dist = line_distance(p0, pe, p);
        if relative_ccw(p0, pe, p) == -1 {
            y_dist = -y_dist;
        }

        point(
            (total / 2.0 - length - projlen) / total * -2.0,
            y_dist / self.scale,
        )
    }

    fn update_label_bounds(&self, source: &dyn CellSource, state: &mut CellState) {
        let overflow = state.style.get(keys::OVERFLOW).unwrap_or("");
        if overflow == "fill" {
            state.label_bounds = Some(state.bounds);
            return;
        }
        let Some(label) = state.label.as_deref().filter(|l| !l.is_empty()) else {
            state.label_bounds = None;
            return;
        };

        let style = TextStyle {
            font_size: state
                .style
                .f64_or(keys::FONT_SIZE, self.text_style.font_size),
        };
        let metrics = self.measurer.measure(label, &style);
        let w = metrics.width * self.scale;
        let h = metrics.height * self.scale;
        let anchor = if source.is_edge(state.cell) {
            state.absolute_offset
        } else {
            state.center() + state.absolute_offset.to_vector()
        };

        let mut bounds = rect(anchor.x - w / 2.0, anchor.y - h / 2.0, w, h);
        if overflow == "width" {
            bounds.origin.x = state.x();
            bounds.size.width = state.width();
        }
        state.label_bounds = Some(bounds);
    }

    fn update_bounding_box(&self, source: &dyn CellSource, state: &mut CellState) {
        let style = &state.style;
        let stroke = (style.f64_or(keys::STROKE_WIDTH, 1.0) * self.scale)
            .round()
            .max(1.0);
        let half_stroke = (stroke / 2.0).max(1.0);

        let mut bbox = if source.is_edge(state.cell) {
            let arrowed = style.contains(keys::START_ARROW) || style.contains(keys::END_ARROW);
            let marker = if arrowed {
                (DEFAULT_MARKERSIZE * self.scale).round()
            } else {
                0.0
            };
            let mut r = grow(&state.bounds, marker + half_stroke);
            if style.get(keys::SHAPE) == Some(SHAPE_ARROW) {
                r = grow(&r, ARROW_WIDTH / 2.0);
            }
            r
        } else {
            grow(&state.bounds, half_stroke)
        };

        if style.bool_or(keys::SHADOW, false) {
            bbox.size.width += SHADOW_OFFSETX;
            bbox.size.height += SHADOW_OFFSETY;
        }

        let rotation = style.f64_or(keys::ROTATION, 0.0);
        if rotation != 0.0 {
            bbox = union(&bbox, &rotated_bounds(&bbox, rotation));
        }

        if let Some(label) = state.label_bounds {
            bbox = union(&bbox, &label);
        }
        state.bounding_box = Some(bbox);
    }

    /// Cached bounding box of `cell`, unioned with its descendants' when `recurse` is set.
    pub fn bounding_box(&self, source: &dyn CellSource, cell: CellId, recurse: bool) -> Option<Rect> {
        let state = self.states.get(&cell)?;
        let mut bbox = state.bounding_box;
        if recurse {
            for &child in source.children(cell) {
                if let Some(b) = self.bounding_box(source, child, true) {
                    bbox = Some(match bbox {
                        Some(a) => union(&a, &b),
                        None => b,
                    });
                }
            }
        }
        bbox
    }

    /// Union of the cached bounding boxes of the given vertices and edges.
    pub fn bounding_box_of(&self, source: &dyn CellSource, cells: &[CellId]) -> Option<Rect> {
        self.union_of(source, cells, |s| s.bounding_box)
    }

    /// Union of the bounds of the given vertices and edges.
    pub fn bounds(&self, source: &dyn CellSource, cells: &[CellId]) -> Option<Rect> {
        self.union_of(source, cells, |s| Some(s.bounds))
    }

    fn union_of(
        &self,
        source: &dyn CellSource,
        cells: &[CellId],
        f: impl Fn(&CellState) -> Option<Rect>,
    ) -> Option<Rect> {
        cells
            .iter()
            .filter(|c| source.is_vertex(**c) || source.is_edge(**c))
            .filter_map(|c| self.states.get(c))
            .filter_map(f)
            .reduce(|a, b| union(&a, &b))
    }
}

fn valid_scale(scale: f64) -> Option<f64> {
    (scale.is_finite() && scale > 0.0).then_some(scale)
}

fn update_vertex_label_offset(state: &mut CellState) {
    let (w, h) = (state.width(), state.height());
    match state.style.get(keys::LABEL_POSITION) {
        Some("left") => state.absolute_offset.x -= w,
        Some("right") => state.absolute_offset.x += w,
        _ => {}
    }
    match state.style.get(keys::VERTICAL_LABEL_POSITION) {
        Some("top") => state.absolute_offset.y -= h,
        Some("bottom") => state.absolute_offset.y += h,
        _ => {}
    }
}

fn update_edge_bounds(state: &mut CellState) {
    let pts = &state.absolute_points;
    let (p0, pe) = (pts[0], pts[pts.len() - 1]);
    state.terminal_distance = if p0 != pe { (pe - p0).length() } else { 0.0 };

    let segments: Vec<f64> = pts.windows(2).map(|w| (w[1] - w[0]).length()).collect();
    state.length = segments.iter().sum();
    state.segments = segments;

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (p0.x, p0.y, p0.x, p0.y);
    for p in pts.iter().skip(1) {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    state.bounds = rect(min_x, min_y, (max_x - min_x).max(1.0), (max_y - min_y).max(1.0));
}

/// Next routed point after the terminal, or the opposite terminal's centre.
fn next_point(pts: &[Option<Point>], opposite: Option<&CellState>, is_source: bool) -> Option<Point> {
    let mut next = None;
    if pts.len() >= 2 {
        let index = if is_source { 1 } else { pts.len() - 2 };
        next = pts[index];
    }
    next.or_else(|| opposite.map(|o| o.center()))
}

/// Axis-aligned bounds of `r` rotated by `degrees` around its centre.
fn rotated_bounds(r: &Rect, degrees: f64) -> Rect {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let c = r.center();
    let corners = [
        point(r.min_x(), r.min_y()),
        point(r.max_x(), r.min_y()),
        point(r.max_x(), r.max_y()),
        point(r.min_x(), r.max_y()),
    ];
    let rotated = corners.map(|p| {
        let d = p - c;
        point(c.x + d.x * cos - d.y * sin, c.y + d.x * sin + d.y * cos)
    });
    let mut out = rect(rotated[0].x, rotated[0].y, 0.0, 0.0);
    for p in &rotated[1..] {
        out = union(&out, &rect(p.x, p.y, 0.0, 0.0));
    }
    out
}
