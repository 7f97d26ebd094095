use std::{
    sync::{Condvar, Mutex},
    time::{Duration, Instant},
};
use thiserror::Error;

/// The wait deadline elapsed before any result arrived.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no result arrived within {waited:?}")]
pub struct WaitTimeout {
    /// how long the caller actually waited
    pub waited: Duration,
}

/// A single-slot, write-once result cell.
///
/// Each probe invocation creates one, hands it (behind an `Arc`) to the
/// callback it registers with the runtime, and then blocks on
/// [`ResultCell::wait`] until the callback resolves the cell or the
/// deadline passes. The first [`ResultCell::resolve`] wins; later writes
/// are discarded.
///
/// ```
/// # use wtopo_core::ResultCell;
/// # use std::time::Duration;
/// let cell = ResultCell::new();
/// assert!(cell.resolve(17u64));
/// assert_eq!(cell.wait(Duration::from_millis(1)), Ok(17));
/// ```
#[derive(Debug)]
pub struct ResultCell<T> {
    slot: Mutex<Option<T>>,
    resolved: Condvar,
}

impl<T> Default for ResultCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            resolved: Condvar::new(),
        }
    }

    /// resolve the cell, waking every waiter
    ///
    /// Returns `false` when the cell already held a value; the new value
    /// is then discarded.
    pub fn resolve(&self, value: T) -> bool {
        let mut slot = self
            .slot
            .lock()
            .expect("Under no condition we expect the mutex to be poisoned");

        if slot.is_some() {
            return false;
        }

        *slot = Some(value);
        self.resolved.notify_all();
        true
    }

    pub fn is_resolved(&self) -> bool {
        self.slot
            .lock()
            .expect("Under no condition we expect the mutex to be poisoned")
            .is_some()
    }
}

impl<T: Clone> ResultCell<T> {
    /// block until the cell resolves, or until `timeout` elapses
    ///
    /// A remote side that never reports shows up as a [`WaitTimeout`]
    /// here instead of hanging the probe forever.
    pub fn wait(&self, timeout: Duration) -> Result<T, WaitTimeout> {
        let started = Instant::now();

        let slot = self
            .slot
            .lock()
            .expect("Under no condition we expect the mutex to be poisoned");
        let (slot, _timed_out) = self
            .resolved
            .wait_timeout_while(slot, timeout, |slot| slot.is_none())
            .expect("Under no condition we expect the mutex to be poisoned");

        match slot.as_ref() {
            Some(value) => Ok(value.clone()),
            None => Err(WaitTimeout {
                waited: started.elapsed(),
            }),
        }
    }
}
