//! Layer management: z-order swaps and the hidden/locked id sets.
//!
//! The element list's order is the paint order (later is on top). Hiding and
//! locking are id-set membership, never deletion, so an element keeps its
//! z-position while hidden.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use std::collections::HashSet;

use crate::doc::{DesignElement, ElementId};

/// Direction of a single-step z-order move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMove {
    /// Toward the top of the stack (later in paint order).
    Up,
    /// Toward the bottom of the stack.
    Down,
}

/// Swap an element with its neighbor in paint order.
///
/// Moving the top-most element up or the bottom-most down is a no-op.
/// Returns whether the order changed.
pub fn move_layer(elements: &mut [DesignElement], id: &ElementId, dir: LayerMove) -> bool {
    let Some(idx) = elements.iter().position(|e| &e.id == id) else {
        return false;
    };
    let neighbor = match dir {
        LayerMove::Up if idx + 1 < elements.len() => idx + 1,
        LayerMove::Down if idx > 0 => idx - 1,
        _ => return false,
    };
    elements.swap(idx, neighbor);
    true
}

/// Hidden and locked element ids for one editor session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSets {
    hidden: HashSet<ElementId>,
    locked: HashSet<ElementId>,
}

impl LayerSets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_hidden(&self, id: &ElementId) -> bool {
        self.hidden.contains(id)
    }

    #[must_use]
    pub fn is_locked(&self, id: &ElementId) -> bool {
        self.locked.contains(id)
    }

    #[must_use]
    pub fn hidden(&self) -> &HashSet<ElementId> {
        &self.hidden
    }

    #[must_use]
    pub fn locked(&self) -> &HashSet<ElementId> {
        &self.locked
    }

    /// Returns whether membership changed.
    pub fn set_hidden(&mut self, id: ElementId, hidden: bool) -> bool {
        set(&mut self.hidden, id, hidden)
    }

    /// Returns whether membership changed.
    pub fn set_locked(&mut self, id: ElementId, locked: bool) -> bool {
        set(&mut self.locked, id, locked)
    }

    /// Forget an id from both sets (after the element is deleted).
    pub fn evict(&mut self, id: &ElementId) {
        self.hidden.remove(id);
        self.locked.remove(id);
    }

    /// Drop ids that no longer name an element (after undo/redo).
    pub fn retain_existing(&mut self, elements: &[DesignElement]) {
        let live: HashSet<ElementId> = elements.iter().map(|e| e.id).collect();
        self.hidden.retain(|id| live.contains(id));
        self.locked.retain(|id| live.contains(id));
    }

    pub fn clear(&mut self) {
        self.hidden.clear();
        self.locked.clear();
    }
}

fn set(set: &mut HashSet<ElementId>, id: ElementId, on: bool) -> bool {
    if on { set.insert(id) } else { set.remove(&id) }
}
