//! Ordered, thread-safe collection of bound chords.
//!
//! Order is dispatch priority: [`ShortcutRegistry::dispatch`] walks the list
//! front to back. Every operation holds the registry lock for its whole
//! read-modify-write, and `dispatch` holds it while actions run, so actions
//! must not call back into the same registry.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use super::chord::{Chord, KeyEvent, Trigger};
use super::command::Command;

#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    chords: Mutex<Vec<Chord>>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Chord>> {
        self.chords.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `chord`, first removing any chord with the same trigger.
    ///
    /// Re-adding an existing trigger moves it to the lowest priority.
    pub fn add(&self, chord: Chord) {
        let mut chords = self.lock();
        chords.retain(|c| c != &chord);
        debug!(chord = ?chord, "shortcut added");
        chords.push(chord);
    }

    /// Removes the chord with this trigger. Returns `false` if there was none.
    pub fn remove(&self, trigger: &Trigger) -> bool {
        let mut chords = self.lock();
        let before = chords.len();
        chords.retain(|c| c.trigger() != trigger);
        before != chords.len()
    }

    /// Rebinds the chord at `old` to `new`, keeping its position.
    ///
    /// Any existing chord equal to `new` is removed first. If `old` is not
    /// registered, `new` is appended.
    pub fn replace(&self, old: &Trigger, new: Chord) {
        let mut chords = self.lock();
        chords.retain(|c| c != &new);
        match chords.iter().position(|c| c.trigger() == old) {
            Some(index) => chords[index] = new,
            None => chords.push(new),
        }
    }

    /// Removes every chord whose command satisfies `predicate`.
    pub fn remove_where(&self, predicate: impl Fn(Option<Command>) -> bool) -> usize {
        let mut chords = self.lock();
        let before = chords.len();
        chords.retain(|c| !predicate(c.command()));
        before - chords.len()
    }

    /// Runs the first matching chord whose action succeeds.
    ///
    /// Matching chords whose action fails are skipped. Returns `true` if an
    /// action handled the event.
    pub fn dispatch(&self, event: &KeyEvent) -> bool {
        let chords = self.lock();
        for chord in chords.iter().filter(|c| c.can_act(event)) {
            if chord.act() {
                debug!(chord = ?chord, "shortcut handled");
                return true;
            }
            trace!(chord = ?chord, "shortcut action declined, trying next");
        }
        false
    }

    /// Snapshot of the registered chords in priority order.
    pub fn chords(&self) -> Vec<Chord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
