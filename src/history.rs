//! History engine: snapshot-based undo/redo over the full design state.
//!
//! DESIGN
//! ======
//! History is a bounded linear list of immutable snapshots plus a cursor. The
//! first snapshot is the pre-edit baseline and is taken lazily, right before
//! the first mutation. Recording while the cursor is not at the end truncates
//! the redo branch. Exceeding the cap evicts the oldest snapshot.
//!
//! The history never mutates elements itself. The engine decides when to
//! record (once per discrete edit, once per finished gesture) and writes a
//! snapshot's deep copy back wholesale on undo/redo.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::doc::{DesignElement, DesignState};

/// Immutable, deep-copied capture of the design at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    state: DesignState,
    timestamp_ms: f64,
}

impl Snapshot {
    /// Capture a deep copy of `state`, stamped with the current time.
    #[must_use]
    pub fn capture(state: &DesignState) -> Self {
        Self { state: state.clone(), timestamp_ms: now_ms() }
    }

    #[must_use]
    pub fn state(&self) -> &DesignState {
        &self.state
    }

    #[must_use]
    pub fn elements(&self) -> &[DesignElement] {
        &self.state.elements
    }

    #[must_use]
    pub fn background_color(&self) -> &str {
        &self.state.background_color
    }

    /// Milliseconds since the Unix epoch when the snapshot was taken.
    #[must_use]
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }
}

/// Bounded undo/redo list with a cursor at the current snapshot.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    cursor: usize,
    cap: usize,
}

impl History {
    /// Create an empty history keeping at most `cap` snapshots (at least one).
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self { entries: VecDeque::new(), cursor: 0, cap: cap.max(1) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    /// Record `pre_mutation` as the baseline if no history exists yet.
    ///
    /// Returns whether a baseline was recorded.
    pub fn ensure_baseline(&mut self, pre_mutation: &DesignState) -> bool {
        if !self.entries.is_empty() {
            return false;
        }
        self.entries.push_back(Snapshot::capture(pre_mutation));
        self.cursor = 0;
        tracing::debug!(elements = pre_mutation.elements.len(), "history: baseline recorded");
        true
    }

    /// Record `state` as a new snapshot after the cursor.
    ///
    /// Discards any redo branch, evicts the oldest snapshot past the cap, and
    /// skips the write when `state` equals the snapshot at the cursor.
    /// Returns whether a snapshot was added.
    pub fn record(&mut self, state: &DesignState) -> bool {
        if self.current().is_some_and(|s| s.state == *state) {
            return false;
        }
        if !self.entries.is_empty() {
            let dropped = self.entries.len() - (self.cursor + 1);
            if dropped > 0 {
                tracing::debug!(dropped, "history: redo branch truncated");
            }
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(Snapshot::capture(state));
        while self.entries.len() > self.cap {
            self.entries.pop_front();
            tracing::debug!(cap = self.cap, "history: oldest snapshot evicted");
        }
        self.cursor = self.entries.len() - 1;
        true
    }

    /// Step back one snapshot. `None` at the baseline.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        tracing::debug!(cursor = self.cursor, len = self.entries.len(), "history: undo");
        self.entries.get(self.cursor)
    }

    /// Step forward one snapshot. `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        tracing::debug!(cursor = self.cursor, len = self.entries.len(), "history: redo");
        self.entries.get(self.cursor)
    }

    /// Drop every snapshot. The next mutation records a fresh baseline.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(crate::consts::HISTORY_CAP)
    }
}

/// Current wall-clock time in milliseconds.
#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Current wall-clock time in milliseconds.
#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0.0;
    };
    dur.as_secs_f64() * 1000.0
}
