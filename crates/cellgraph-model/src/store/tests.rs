use super::*;

fn doc() -> (CellStore, CellId, CellId) {
    let mut store = CellStore::new();
    let root = store.create(Cell::group());
    let layer = store.create(Cell::group());
    store.insert(root, layer, 0);
    store.set_root(Some(root));
    (store, root, layer)
}

fn vertex(store: &mut CellStore, parent: CellId, x: f64, y: f64) -> CellId {
    let v = store.create(Cell::vertex(
        Value::Null,
        Geometry::new(x, y, 10.0, 10.0),
        Style::new(),
    ));
    let n = store.child_count(parent);
    store.parent_changed(v, Some(parent), n);
    v
}

fn edge(store: &mut CellStore, parent: CellId, source: CellId, target: CellId) -> CellId {
    let e = store.create(Cell::edge(Value::Null, Style::new()));
    let n = store.child_count(parent);
    store.parent_changed(e, Some(parent), n);
    store.set_terminal(e, Some(source), true);
    store.set_terminal(e, Some(target), false);
    e
}

#[test]
fn set_root_registers_ids_in_preorder() {
    let (store, root, layer) = doc();
    assert_eq!(store.id_of(root), Some("0"));
    assert_eq!(store.id_of(layer), Some("1"));
    assert_eq!(store.next_id(), 2);
    assert_eq!(store.cell_by_id("1"), Some(layer));
    assert!(store.is_layer(layer));
    assert!(!store.is_layer(root));
}

#[test]
fn colliding_ids_are_replaced_and_numeric_ids_bump_the_counter() {
    let (mut store, _, layer) = doc();
    let v = store.create(Cell::group().with_id("1"));
    store.parent_changed(v, Some(layer), 0);
    assert_eq!(store.id_of(v), Some("2"));
    assert_eq!(store.next_id(), 3);

    let w = store.create(Cell::group().with_id("42"));
    store.parent_changed(w, Some(layer), 1);
    assert_eq!(store.id_of(w), Some("42"));
    assert_eq!(store.next_id(), 43);

    store.parent_changed(w, None, 0);
    assert_eq!(store.cell_by_id("42"), None);
    assert_eq!(store.id_of(w), Some("42"));
    assert!(matches!(
        store.try_cell_by_id("42"),
        Err(Error::UnknownId { .. })
    ));
}

#[test]
fn ids_are_not_generated_when_disabled() {
    let mut store = CellStore::new();
    store.set_create_ids(false);
    let root = store.create(Cell::group());
    store.set_root(Some(root));
    assert_eq!(store.id_of(root), None);
}

#[test]
fn insert_clamps_the_index_and_moves_between_parents() {
    let (mut store, _, layer) = doc();
    let a = vertex(&mut store, layer, 0.0, 0.0);
    let b = vertex(&mut store, layer, 0.0, 0.0);
    let g = store.create(Cell::group());
    store.insert(g, a, 99);
    assert_eq!(store.children(g), &[a]);
    assert_eq!(store.children(layer), &[b]);
    assert_eq!(store.parent(a), Some(g));

    assert_eq!(store.remove(a), Some((g, 0)));
    assert_eq!(store.parent(a), None);
    assert!(store.children(g).is_empty());
}

#[test]
fn set_terminal_maintains_incident_lists() {
    let (mut store, _, layer) = doc();
    let a = vertex(&mut store, layer, 0.0, 0.0);
    let b = vertex(&mut store, layer, 0.0, 0.0);
    let e = edge(&mut store, layer, a, b);
    assert_eq!(store.edges(a), &[e]);
    assert_eq!(store.edges(b), &[e]);

    let previous = store.set_terminal(e, Some(b), true);
    assert_eq!(previous, Some(a));
    assert!(store.edges(a).is_empty());
    assert_eq!(store.edges(b), &[e]);

    store.set_terminal(e, None, true);
    assert_eq!(store.terminal(e, true), None);
    assert_eq!(store.edges(b), &[e]);

    store.set_terminal(e, None, false);
    assert!(store.edges(b).is_empty());
}

#[test]
fn disconnect_keeps_terminal_fields() {
    let (mut store, _, layer) = doc();
    let a = vertex(&mut store, layer, 0.0, 0.0);
    let b = vertex(&mut store, layer, 0.0, 0.0);
    let e = edge(&mut store, layer, a, b);

    store.connect(e, false);
    assert!(store.edges(a).is_empty());
    assert!(store.edges(b).is_empty());
    assert_eq!(store.terminal(e, true), Some(a));
    assert_eq!(store.terminal(e, false), Some(b));

    store.connect(e, true);
    assert_eq!(store.edges(a), &[e]);
    assert_eq!(store.edges(b), &[e]);
}

#[test]
fn loops_are_indexed_once() {
    let (mut store, _, layer) = doc();
    let a = vertex(&mut store, layer, 0.0, 0.0);
    let e = edge(&mut store, layer, a, a);
    assert_eq!(store.edges(a), &[e]);
    assert_eq!(store.edges_of(a, true, true, false), Vec::<CellId>::new());
    assert_eq!(store.connections(a), vec![e]);
}

#[test]
fn nearest_common_ancestor_uses_cell_paths() {
    let (mut store, root, layer) = doc();
    let g = vertex(&mut store, layer, 10.0, 20.0);
    let v1 = vertex(&mut store, g, 5.0, 5.0);
    let v2 = vertex(&mut store, g, 0.0, 0.0);
    let v3 = vertex(&mut store, layer, 0.0, 0.0);

    assert_eq!(path::create(&store, v2), "0.0.1");
    assert_eq!(path::resolve(&store, root, "0.0.1"), Some(v2));
    assert_eq!(store.nearest_common_ancestor(v1, v2), Some(g));
    assert_eq!(store.nearest_common_ancestor(v1, v3), Some(layer));
    assert_eq!(store.nearest_common_ancestor(v1, g), Some(g));

    let layer2 = store.create(Cell::group());
    store.parent_changed(layer2, Some(root), 1);
    let w = vertex(&mut store, layer2, 0.0, 0.0);
    assert_eq!(store.nearest_common_ancestor(v1, w), None);
}

#[test]
fn origin_sums_non_edge_ancestors() {
    let (mut store, _, layer) = doc();
    let g = vertex(&mut store, layer, 10.0, 20.0);
    let v = vertex(&mut store, g, 5.0, 5.0);
    assert_eq!(store.origin(Some(v)), point(15.0, 25.0));
    assert_eq!(store.origin(None), point(0.0, 0.0));
}

#[test]
fn clone_cells_restores_terminals_among_clones() {
    let (mut store, _, layer) = doc();
    let a = vertex(&mut store, layer, 0.0, 0.0);
    let b = vertex(&mut store, layer, 0.0, 0.0);
    let c = vertex(&mut store, layer, 0.0, 0.0);
    let e = edge(&mut store, layer, a, b);
    let f = edge(&mut store, layer, a, c);

    let clones = store.clone_cells(&[a, b, e, f], true);
    assert_eq!(clones.len(), 4);
    let (ca, cb, ce, cf) = (clones[0], clones[1], clones[2], clones[3]);
    assert_eq!(store.terminal(ce, true), Some(ca));
    assert_eq!(store.terminal(ce, false), Some(cb));
    assert_eq!(store.terminal(cf, true), Some(ca));
    assert_eq!(store.terminal(cf, false), None);
    assert_eq!(store.edges(ca), &[ce, cf]);
    assert_eq!(store.edges(a), &[e, f]);
    assert_eq!(store.parent(ca), None);
    assert_eq!(store.id_of(ca), None);
}

#[test]
fn edge_queries() {
    let (mut store, _, layer) = doc();
    let a = vertex(&mut store, layer, 0.0, 0.0);
    let b = vertex(&mut store, layer, 0.0, 0.0);
    let ab = edge(&mut store, layer, a, b);
    let ba = edge(&mut store, layer, b, a);

    assert_eq!(store.outgoing_edges(a), vec![ab]);
    assert_eq!(store.incoming_edges(a), vec![ba]);
    assert_eq!(store.edges_between(a, b, true), vec![ab]);
    assert_eq!(store.edges_between(a, b, false), vec![ab, ba]);
    assert_eq!(store.opposites(&[ab, ba], a, false, true), vec![b]);
    assert_eq!(store.opposites(&[ab, ba], a, true, true), vec![b, b]);
    assert_eq!(store.directed_edge_count(a, true, None), 1);
    assert_eq!(store.child_vertices(layer), vec![a, b]);
    assert_eq!(store.child_edges(layer), vec![ab, ba]);
    assert_eq!(store.topmost_cells(&[layer, a]), vec![layer]);
}
