//! Bounded undo history over whole-scene snapshots.
//!
//! Every committed mutation pushes a full clone of the scene; undo pops
//! the newest and hands back a clone of the one underneath. Linear,
//! undo-only: there is no redo stack. The document is small enough that
//! whole-document clones beat the bookkeeping of command objects.

use std::collections::VecDeque;

use crate::scene::Scene;

/// Maximum retained snapshots. Older states are silently evicted.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Default)]
pub struct History {
    snapshots: VecDeque<Scene>,
}

impl History {
    pub fn new() -> Self {
        History {
            snapshots: VecDeque::with_capacity(MAX_HISTORY),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Records the scene as the newest snapshot, evicting the oldest
    /// once the cap is reached.
    pub fn save_state(&mut self, scene: &Scene) {
        if self.snapshots.len() >= MAX_HISTORY {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(scene.clone());
    }

    /// Steps back one state. Returns the scene to restore, or `None`
    /// when only the baseline (or nothing) remains; the oldest snapshot
    /// is never popped, so the scene cannot be undone into nonexistence.
    pub fn restore(&mut self) -> Option<Scene> {
        if self.snapshots.len() < 2 {
            return None;
        }
        self.snapshots.pop_back();
        self.snapshots.back().cloned()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
