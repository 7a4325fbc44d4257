use std::collections::VecDeque;

use tracing::debug;

use crate::ir::Snapshot;
use crate::store::GraphStore;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Linear snapshot history. `push` records the state *before* a mutation;
/// the first `undo` from the newest entry also records the state it leaves
/// so `redo` can return to it.
#[derive(Debug, Clone)]
pub struct EditHistory {
    entries: VecDeque<Snapshot>,
    cursor: isize,
    capacity: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: -1,
            capacity: capacity.max(1),
        }
    }

    /// Records the current (pre-mutation) state, dropping any redo branch.
    pub fn push(&mut self, store: &GraphStore) {
        self.entries.truncate((self.cursor + 1) as usize);
        self.entries.push_back(store.snapshot());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() as isize - 1;
    }

    pub fn undo(&mut self, store: &mut GraphStore) -> bool {
        if !self.can_undo() {
            return false;
        }
        if self.cursor == self.entries.len() as isize - 1 {
            self.entries.push_back(store.snapshot());
        }
        store.restore(&self.entries[self.cursor as usize]);
        self.cursor -= 1;
        debug!(cursor = self.cursor, entries = self.entries.len(), "undo");
        true
    }

    pub fn redo(&mut self, store: &mut GraphStore) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        store.restore(&self.entries[(self.cursor + 1) as usize]);
        debug!(cursor = self.cursor, entries = self.entries.len(), "redo");
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() as isize - 2
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Connection, ConnectionKind, Station};

    fn add(history: &mut EditHistory, store: &mut GraphStore, id: &str, to: Option<&str>) {
        history.push(store);
        let connections = to
            .map(|target| vec![Connection::new(id, target, ConnectionKind::Membership)])
            .unwrap_or_default();
        store.add_station(Station::new(id, id), connections).unwrap();
    }

    #[test]
    fn fresh_history_cannot_move() {
        let mut history = EditHistory::new();
        let mut store = GraphStore::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.undo(&mut store));
        assert!(!history.redo(&mut store));
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut history = EditHistory::new();
        let mut store = GraphStore::new();
        let empty = store.snapshot();
        add(&mut history, &mut store, "a", None);
        let after_a = store.snapshot();
        add(&mut history, &mut store, "b", Some("a"));
        let after_b = store.snapshot();

        assert!(history.undo(&mut store));
        assert_eq!(store.snapshot(), after_a);
        assert!(history.undo(&mut store));
        assert_eq!(store.snapshot(), empty);
        assert!(!history.can_undo());
        assert!(!history.undo(&mut store));

        assert!(history.redo(&mut store));
        assert_eq!(store.snapshot(), after_a);
        assert!(history.redo(&mut store));
        assert_eq!(store.snapshot(), after_b);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut store));

        assert!(history.undo(&mut store));
        assert_eq!(store.snapshot(), after_a);
    }

    #[test]
    fn new_action_after_undo_drops_redo_branch() {
        let mut history = EditHistory::new();
        let mut store = GraphStore::new();
        add(&mut history, &mut store, "a", None);
        add(&mut history, &mut store, "b", None);
        history.undo(&mut store);
        assert!(history.can_redo());

        add(&mut history, &mut store, "c", None);
        assert!(!history.can_redo());
        let after_c = store.snapshot();
        assert!(store.contains("c") && !store.contains("b"));

        history.undo(&mut store);
        assert!(!store.contains("c"));
        history.redo(&mut store);
        assert_eq!(store.snapshot(), after_c);
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut history = EditHistory::with_capacity(3);
        let mut store = GraphStore::new();
        for id in ["a", "b", "c", "d", "e"] {
            add(&mut history, &mut store, id, None);
        }
        assert_eq!(history.len(), 3);
        let mut undone = 0;
        while history.undo(&mut store) {
            undone += 1;
        }
        assert_eq!(undone, 3);
        // oldest surviving entry is the state before "c" was added
        assert_eq!(store.len(), 2);
    }
}
