use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Execute,
    BeginUpdate,
    EndUpdate,
    BeforeUndo,
    Change,
    Undo,
    Redo,
    Add,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Entry<F: ?Sized> {
    id: ListenerId,
    kind: EventKind,
    callback: Rc<RefCell<F>>,
}

/// Registered callbacks, invoked in registration order.
///
/// Callbacks are shared cells so the owner can fire events while handing itself to the callback.
/// A callback that is already running is skipped, so a listener never re-enters itself through the
/// events it causes.
pub(crate) struct Listeners<F: ?Sized> {
    next_id: u64,
    entries: Vec<Entry<F>>,
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<F: ?Sized> Listeners<F> {
    pub(crate) fn add(&mut self, kind: EventKind, callback: Rc<RefCell<F>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, kind, callback });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Snapshot of the callbacks registered for `kind`.
    pub(crate) fn matching(&self, kind: EventKind) -> Vec<Rc<RefCell<F>>> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.callback.clone())
            .collect()
    }

    pub(crate) fn has(&self, kind: EventKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<F: ?Sized> std::fmt::Debug for Listeners<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}
