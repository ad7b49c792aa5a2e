use cellgraph_model::{AtomicChange, Cell, CellId, CellStore, Change, Geometry, Style};
use serde_json::json;

struct Doc {
    store: CellStore,
    root: CellId,
    layer: CellId,
    a: CellId,
    b: CellId,
    e: CellId,
}

impl Doc {
    fn cells(&self) -> [CellId; 5] {
        [self.root, self.layer, self.a, self.b, self.e]
    }
}

fn doc() -> Doc {
    let mut store = CellStore::new();
    let root = store.create(Cell::group());
    let layer = store.create(Cell::group());
    store.insert(root, layer, 0);
    store.set_root(Some(root));
    let a = store.create(Cell::vertex(
        "a",
        Geometry::new(0.0, 0.0, 100.0, 40.0),
        Style::new(),
    ));
    let b = store.create(Cell::vertex(
        "b",
        Geometry::new(200.0, 0.0, 100.0, 40.0),
        Style::new(),
    ));
    let e = store.create(Cell::edge("e", Style::new()));
    for (i, c) in [a, b, e].into_iter().enumerate() {
        store.parent_changed(c, Some(layer), i);
    }
    store.set_terminal(e, Some(a), true);
    store.set_terminal(e, Some(b), false);
    Doc {
        store,
        root,
        layer,
        a,
        b,
        e,
    }
}

fn snapshot(doc: &Doc) -> String {
    let store = &doc.store;
    let mut out = format!("root={:?} next={}\n", store.root(), store.next_id());
    for c in doc.cells() {
        let cell = store.get(c).unwrap();
        let indexed = cell.id().and_then(|id| store.cell_by_id(id));
        out.push_str(&format!("{c:?} {cell:?} indexed={indexed:?}\n"));
    }
    out
}

fn assert_self_inverse(make: impl Fn(&Doc) -> Change) {
    let mut doc = doc();
    let change = make(&doc);
    let before = snapshot(&doc);

    let mut record = AtomicChange::execute(change.clone(), &mut doc.store);
    let after = snapshot(&doc);
    assert_ne!(before, after, "{change:?} did not change anything");

    record.undo(&mut doc.store);
    assert_eq!(snapshot(&doc), before, "undo of {change:?}");
    record.redo(&mut doc.store);
    assert_eq!(snapshot(&doc), after, "redo of {change:?}");
    record.undo(&mut doc.store);
    assert_eq!(snapshot(&doc), before, "second undo of {change:?}");

    let inverse = change.apply(&mut doc.store);
    inverse.apply(&mut doc.store);
    assert_eq!(snapshot(&doc), before, "apply twice of {change:?}");
}

#[test]
fn root_change_is_self_inverse() {
    assert_self_inverse(|_| Change::Root { root: None });
}

#[test]
fn child_removal_is_self_inverse() {
    assert_self_inverse(|d| Change::Child {
        child: d.a,
        parent: None,
        index: 0,
    });
    assert_self_inverse(|d| Change::Child {
        child: d.e,
        parent: None,
        index: 0,
    });
}

#[test]
fn child_reparent_is_self_inverse() {
    assert_self_inverse(|d| Change::Child {
        child: d.b,
        parent: Some(d.a),
        index: 0,
    });
    assert_self_inverse(|d| Change::Child {
        child: d.a,
        parent: Some(d.layer),
        index: 2,
    });
}

#[test]
fn terminal_change_is_self_inverse() {
    assert_self_inverse(|d| Change::Terminal {
        edge: d.e,
        terminal: Some(d.b),
        source: true,
    });
    assert_self_inverse(|d| Change::Terminal {
        edge: d.e,
        terminal: None,
        source: false,
    });
}

#[test]
fn attribute_changes_are_self_inverse() {
    assert_self_inverse(|d| Change::Value {
        cell: d.a,
        value: json!({ "label": "renamed" }),
    });
    assert_self_inverse(|d| Change::Style {
        cell: d.a,
        style: Style::parse("shape=ellipse;strokeWidth=3"),
    });
    assert_self_inverse(|d| Change::Geometry {
        cell: d.a,
        geometry: Some(Geometry::new(1.0, 2.0, 3.0, 4.0)),
    });
    assert_self_inverse(|d| Change::Geometry {
        cell: d.a,
        geometry: None,
    });
    assert_self_inverse(|d| Change::Collapsed {
        cell: d.a,
        collapsed: true,
    });
    assert_self_inverse(|d| Change::Visible {
        cell: d.a,
        visible: false,
    });
}

#[test]
fn removed_edges_leave_the_incident_lists() {
    let mut doc = doc();
    let record = AtomicChange::execute(
        Change::Child {
            child: doc.e,
            parent: None,
            index: 0,
        },
        &mut doc.store,
    );
    assert!(doc.store.edges(doc.a).is_empty());
    assert!(doc.store.edges(doc.b).is_empty());
    assert_eq!(doc.store.terminal(doc.e, true), Some(doc.a));
    assert_eq!(
        record.inverse(),
        &Change::Child {
            child: doc.e,
            parent: Some(doc.layer),
            index: 2,
        }
    );
}
