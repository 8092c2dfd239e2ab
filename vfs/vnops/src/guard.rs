//! Busy accounting for a filesystem instance.
//!
//! Every vnop that touches instance state holds an [`EntryGuard`] for its
//! whole duration. Teardown flips the instance to tearing-down, after
//! which acquisitions fail, and then waits for the busy count to drain.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::{VnopError, VnopResult};

#[derive(Debug, Default)]
struct EntryState {
    busy: u64,
    tearing_down: bool,
}

/// Snapshot of the guard counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryStats {
    pub acquired: u64,
    pub released: u64,
    pub refused: u64,
}

#[derive(Debug, Default)]
pub(crate) struct EntryGate {
    state: Mutex<EntryState>,
    idle: Condvar,
    acquired: AtomicU64,
    released: AtomicU64,
    refused: AtomicU64,
}

impl EntryGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Take a busy token, or fail with [`VnopError::TearingDown`].
    pub(crate) fn enter(&self) -> VnopResult<EntryGuard<'_>> {
        let mut state = self.state.lock();
        // Count first, then back out: a refused entry still passed
        // through the counter exactly once.
        state.busy += 1;
        if state.tearing_down {
            state.busy -= 1;
            if state.busy == 0 {
                self.idle.notify_all();
            }
            drop(state);
            self.refused.fetch_add(1, Ordering::Relaxed);
            return Err(VnopError::TearingDown);
        }
        drop(state);
        self.acquired.fetch_add(1, Ordering::Relaxed);
        Ok(EntryGuard { gate: self })
    }

    fn exit(&self) {
        let mut state = self.state.lock();
        state.busy -= 1;
        if state.busy == 0 {
            self.idle.notify_all();
        }
        drop(state);
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn busy(&self) -> u64 {
        self.state.lock().busy
    }

    pub(crate) fn is_tearing_down(&self) -> bool {
        self.state.lock().tearing_down
    }

    /// Returns `false` if teardown had already begun.
    pub(crate) fn begin_teardown(&self) -> bool {
        let mut state = self.state.lock();
        !std::mem::replace(&mut state.tearing_down, true)
    }

    pub(crate) fn cancel_teardown(&self) {
        self.state.lock().tearing_down = false;
    }

    /// Block until no vnop is in flight. Returns `false` on timeout.
    pub(crate) fn wait_idle(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.state.lock();
        while state.busy > 0 {
            match deadline {
                Some(deadline) => {
                    if self.idle.wait_until(&mut state, deadline).timed_out() {
                        return state.busy == 0;
                    }
                }
                None => self.idle.wait(&mut state),
            }
        }
        true
    }

    pub(crate) fn stats(&self) -> EntryStats {
        EntryStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            refused: self.refused.load(Ordering::Relaxed),
        }
    }
}

/// Busy token on an instance. Released on drop.
#[must_use]
#[derive(Debug)]
pub struct EntryGuard<'a> {
    gate: &'a EntryGate,
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        self.gate.exit();
    }
}
