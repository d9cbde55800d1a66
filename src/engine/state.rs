//! Reconciliation state machine.
//!
//! Replaces a pair of independent `needs_update`/`updating` flags with one
//! enum in one mutex, so a notification landing mid-attempt has its own
//! state and illegal flag combinations cannot exist.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Debounce state of the reconciliation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    /// Launch script matches the last observed endpoint set.
    Idle,
    /// The endpoint set changed since the last successful attempt.
    Dirty,
    /// An attempt is in flight.
    Reconciling,
    /// An attempt is in flight and the endpoint set changed under it.
    ReconcilingDirty,
}

/// Shared state cell exposing only the transitions the engine may make.
#[derive(Debug)]
pub struct StateCell {
    state: Mutex<ReconcileState>,
}

impl StateCell {
    /// A new cell starts dirty so the first tick generates a command.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ReconcileState::Dirty),
        }
    }

    /// Current state, for observation only.
    pub fn current(&self) -> ReconcileState {
        *self.lock()
    }

    /// Record an endpoint-set change. Monotonic: only ever moves toward
    /// dirty, whether or not an attempt is in flight.
    pub fn mark_dirty(&self) {
        let mut state = self.lock();
        *state = match *state {
            ReconcileState::Idle | ReconcileState::Dirty => ReconcileState::Dirty,
            ReconcileState::Reconciling | ReconcileState::ReconcilingDirty => {
                ReconcileState::ReconcilingDirty
            }
        };
    }

    /// Try to enter an attempt. Returns false when there is nothing to do or
    /// another attempt is already in flight.
    pub fn begin_attempt(&self) -> bool {
        let mut state = self.lock();
        match *state {
            ReconcileState::Dirty => {
                *state = ReconcileState::Reconciling;
                true
            }
            _ => false,
        }
    }

    /// Close an attempt. A failed attempt re-marks dirty so the next tick
    /// retries; changes observed mid-attempt stay dirty either way.
    pub fn finish_attempt(&self, success: bool) {
        let mut state = self.lock();
        *state = match (*state, success) {
            (ReconcileState::ReconcilingDirty, _) => ReconcileState::Dirty,
            (ReconcileState::Reconciling, true) => ReconcileState::Idle,
            (ReconcileState::Reconciling, false) => ReconcileState::Dirty,
            (other, _) => other,
        };
    }

    // A poisoned lock must not kill the reconcile loop; the state enum is
    // valid at every point a panic could have interrupted a holder.
    fn lock(&self) -> MutexGuard<'_, ReconcileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope guard that closes an attempt even when the attempt unwinds.
///
/// Dropping the guard without calling [`AttemptGuard::complete`] counts as a
/// failure, so the next tick retries.
pub struct AttemptGuard<'a> {
    cell: &'a StateCell,
    done: bool,
}

impl<'a> AttemptGuard<'a> {
    /// Guard an attempt that `begin_attempt` already admitted.
    pub fn new(cell: &'a StateCell) -> Self {
        Self { cell, done: false }
    }

    /// Close the attempt with an explicit outcome.
    pub fn complete(mut self, success: bool) {
        self.done = true;
        self.cell.finish_attempt(success);
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.cell.finish_attempt(false);
        }
    }
}
