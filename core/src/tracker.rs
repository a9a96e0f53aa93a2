//! Familiar and equipment change tracking.
//!
//! KoLmafia re-logs the current familiar and outfit constantly. A
//! [`ChangeStack`] only records an entry when the state actually differs
//! from the one on top, so repeats collapse onto the existing change.

use crate::model::{EquipmentChange, FamiliarChange};

/// State whose sameness ignores the turn it was recorded on.
pub trait TrackedChange: Clone {
    fn same_state(&self, other: &Self) -> bool;
    fn turn(&self) -> u32;
}

impl TrackedChange for FamiliarChange {
    fn same_state(&self, other: &Self) -> bool {
        self.name == other.name
    }

    fn turn(&self) -> u32 {
        self.turn
    }
}

impl TrackedChange for EquipmentChange {
    fn same_state(&self, other: &Self) -> bool {
        self.equals_ignoring_turn(other)
    }

    fn turn(&self) -> u32 {
        self.turn
    }
}

/// LIFO of changes, never empty: the bottom is the sentinel it was seeded with.
#[derive(Debug, Clone)]
pub struct ChangeStack<T> {
    stack: Vec<T>,
}

impl<T: TrackedChange> ChangeStack<T> {
    pub fn new(sentinel: T) -> Self {
        Self {
            stack: vec![sentinel],
        }
    }

    pub fn current(&self) -> &T {
        // Seeded with a sentinel and never popped below it
        &self.stack[self.stack.len() - 1]
    }

    /// Push `change` unless it matches the current state. Returns whether it
    /// was pushed.
    pub fn push_if_changed(&mut self, change: T) -> bool {
        if self.current().same_state(&change) {
            return false;
        }
        self.stack.push(change);
        true
    }

    /// Drop the newest change, keeping the sentinel.
    pub fn pop(&mut self) -> Option<T> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Changes in push order, sentinel first.
    pub fn changes(&self) -> &[T] {
        &self.stack
    }
}

/// Rolling familiar and equipment state for one parse.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    pub familiars: ChangeStack<FamiliarChange>,
    pub equipment: ChangeStack<EquipmentChange>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self {
            familiars: ChangeStack::new(FamiliarChange::none()),
            equipment: ChangeStack::new(EquipmentChange::none(0)),
        }
    }

    pub fn current_familiar(&self) -> &FamiliarChange {
        self.familiars.current()
    }

    pub fn current_equipment(&self) -> &EquipmentChange {
        self.equipment.current()
    }

    pub fn change_familiar(&mut self, change: FamiliarChange) -> bool {
        let pushed = self.familiars.push_if_changed(change);
        if pushed {
            tracing::debug!(
                familiar = %self.current_familiar().name,
                turn = self.current_familiar().turn,
                "familiar changed"
            );
        }
        pushed
    }

    pub fn change_equipment(&mut self, change: EquipmentChange) -> bool {
        self.equipment.push_if_changed(change)
    }
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}
