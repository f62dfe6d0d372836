//! Single-slot snapshot cell.
//!
//! Written by a platform callback thread, read by the query path. Each write
//! replaces the whole value; readers always get a complete copy.

use std::sync::RwLock;

/// Last-value-wins cell holding a `Copy` snapshot.
#[derive(Debug, Default)]
pub struct SnapshotCell<T: Copy> {
    slot: RwLock<T>,
}

impl<T: Copy> SnapshotCell<T> {
    /// Creates a cell holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            slot: RwLock::new(initial),
        }
    }

    /// Replaces the snapshot.
    pub fn store(&self, value: T) {
        // A poisoned lock still holds a whole snapshot; keep serving it.
        match self.slot.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    /// Returns a copy of the current snapshot.
    pub fn load(&self) -> T {
        match self.slot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Applies `f` to the current snapshot and stores the result.
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        match self.slot.write() {
            Ok(mut guard) => *guard = f(*guard),
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                *guard = f(*guard);
            }
        }
    }
}
