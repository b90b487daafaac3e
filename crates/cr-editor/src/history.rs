//! Snapshot-based undo/redo log.
//!
//! Every structural mutation and every settled resize pushes a whole-scene
//! `Snapshot`. A cursor points at the snapshot matching the live scene;
//! undo/redo move the cursor and hand back the snapshot to apply. Applying
//! it to the scene is the caller's job.
//!
//! Recording after an undo discards the redo branch. The log keeps at most
//! `capacity` entries, evicting the oldest first.

use cr_core::Snapshot;
use std::collections::VecDeque;

pub struct HistoryLog {
    entries: VecDeque<Snapshot>,
    /// Cursor into `entries`; meaningful only when non-empty.
    index: usize,
    capacity: usize,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            index: 0,
            capacity,
        }
    }

    /// Append a snapshot after the cursor, dropping any redo branch.
    pub fn record(&mut self, snapshot: Snapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push_back(snapshot);
        self.index = self.entries.len() - 1;

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }
        self.index -= evicted;

        log::trace!(
            "history: recorded entry {} of {} (evicted {evicted})",
            self.index + 1,
            self.entries.len()
        );
    }

    /// Step back one entry. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward one entry. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
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

    /// Change the capacity. Shrinking evicts the oldest entries first and
    /// then the far end of the redo branch; the cursor entry always survives.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.entries.len() > self.capacity && self.index > 0 {
            self.entries.pop_front();
            self.index -= 1;
        }
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }
}
