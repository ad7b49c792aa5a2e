use cellgraph_model::{Cell, CellId, Edit, EventKind, Geometry, Model, Style};
use std::cell::RefCell;
use std::rc::Rc;

fn model_with_vertex() -> (Model, CellId) {
    let mut model = Model::new();
    let layer = model.children(model.root().unwrap())[0];
    let a = model.create_cell(Cell::vertex(
        "A",
        Geometry::new(0.0, 0.0, 100.0, 40.0),
        Style::new(),
    ));
    model.add(layer, a, None);
    (model, a)
}

fn dispatched(model: &mut Model, kind: EventKind) -> Rc<RefCell<Vec<Edit>>> {
    let edits = Rc::new(RefCell::new(Vec::new()));
    let sink = edits.clone();
    model.add_listener(kind, move |_, event| {
        if let Some(edit) = event.edit() {
            sink.borrow_mut().push(edit.clone());
        }
    });
    edits
}

#[test]
fn nested_transaction_dispatches_one_edit_in_call_order() {
    let (mut model, a) = model_with_vertex();
    let changes = dispatched(&mut model, EventKind::Change);
    let undos = dispatched(&mut model, EventKind::Undo);

    model.begin_update();
    model.set_geometry(a, Geometry::new(10.0, 10.0, 100.0, 40.0));
    model.begin_update();
    model.set_style(a, Style::parse("shape=ellipse"));
    model.end_update();
    model.end_update();

    let changes = changes.borrow();
    assert_eq!(changes.len(), 1);
    let kinds: Vec<_> = changes[0]
        .changes()
        .iter()
        .map(|c| c.change().name())
        .collect();
    assert_eq!(kinds, vec!["geometry", "style"]);
    assert_eq!(*undos.borrow(), *changes);
}

#[test]
fn dispatch_waits_for_the_outermost_end_at_any_depth() {
    for depth in 1..=6 {
        let (mut model, a) = model_with_vertex();
        let changes = dispatched(&mut model, EventKind::Change);
        for level in 0..depth {
            model.begin_update();
            model.set_value(a, level);
        }
        for _ in 1..depth {
            model.end_update();
            assert!(changes.borrow().is_empty(), "dispatched early at depth {depth}");
        }
        model.end_update();
        let changes = changes.borrow();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].len(), depth);
    }
}

#[test]
fn unmatched_begin_never_dispatches() {
    let (mut model, a) = model_with_vertex();
    let changes = dispatched(&mut model, EventKind::Change);
    model.begin_update();
    model.set_value(a, "pending");
    assert!(changes.borrow().is_empty());
    assert_eq!(model.current_edit().len(), 1);
    assert_eq!(model.update_level(), 1);
}

#[test]
fn mutations_are_visible_before_commit() {
    let (mut model, a) = model_with_vertex();
    model.begin_update();
    model.set_geometry(a, Geometry::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(model.geometry(a).map(|g| g.x), Some(1.0));
    model.end_update();
}

#[test]
fn execute_listeners_see_each_change() {
    let (mut model, a) = model_with_vertex();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    model.add_listener(EventKind::Execute, move |_, event| {
        if let cellgraph_model::ModelEvent::Execute { change } = event {
            sink.borrow_mut().push(change.change().name());
        }
    });
    model.update(|m| {
        m.set_value(a, "x");
        m.set_collapsed(a, true);
    });
    assert_eq!(*seen.borrow(), vec!["value", "collapsed"]);
}
