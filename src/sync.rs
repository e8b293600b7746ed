//! The handful of coordination primitives the pipeline needs. Two
//! independent instances of [`SyncPrimitives`] exist in the running engine:
//! one carries the FFT handoff from `BufferManager` to the FFT worker, the
//! other carries the retune gate from the trigger/continuous path to the
//! retune worker. [`ShutdownSignal`] is the separate timed-wait primitive
//! the trigger worker sleeps on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

struct SyncState {
    ready: bool,
}

/// A condition variable, its mutex, and an `action_done` baton flag.
/// `action_done` is read by the audio thread on the hot path, so it is a
/// plain atomic rather than anything guarded by the mutex: the mutex only
/// protects the `ready` handoff bit the worker waits on.
pub struct SyncPrimitives {
    state: Mutex<SyncState>,
    condvar: Condvar,
    action_done: AtomicBool,
}

impl SyncPrimitives {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SyncState { ready: false }),
            condvar: Condvar::new(),
            action_done: AtomicBool::new(true),
        }
    }

    /// Audio-thread-safe acquire/release read of the baton flag.
    #[inline]
    pub fn action_done(&self) -> bool {
        self.action_done.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_action_done(&self, value: bool) {
        self.action_done.store(value, Ordering::Release);
    }

    /// Wakes the worker waiting in [`Self::wait_ready`]. Called by the
    /// publisher side (BufferManager, or the trigger/continuous-tuning
    /// signal into the retune worker). Never blocks.
    pub fn signal_ready(&self) {
        let mut state = self.state.lock().unwrap();
        state.ready = true;
        self.condvar.notify_one();
    }

    /// Blocks until either a publisher calls [`Self::signal_ready`] or
    /// `stop` is observed set. Returns `true` on a real wake, `false` on
    /// shutdown. A spurious wakeup is a no-op: the loop just re-checks both
    /// conditions and waits again.
    pub fn wait_ready(&self, stop: &AtomicBool) -> bool {
        let mut state = self.state.lock().unwrap();
        loop {
            if stop.load(Ordering::Acquire) {
                return false;
            }
            if state.ready {
                state.ready = false;
                return true;
            }
            state = self.condvar.wait(state).unwrap();
        }
    }

    /// Part of the shutdown sequence: wakes anyone parked in `wait_ready` so
    /// it can observe `stop` and exit.
    pub fn notify_shutdown(&self) {
        self.condvar.notify_all();
    }
}

impl Default for SyncPrimitives {
    fn default() -> Self {
        Self::new()
    }
}

/// Dedicated timed-wait primitive for the trigger worker, which sleeps for
/// `interval_ms` rather than waiting on a producer signal.
pub struct ShutdownSignal {
    state: Mutex<bool>,
    condvar: Condvar,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Sleeps up to `timeout`, returning early if shutdown is signalled.
    /// Returns `true` if shutdown was observed (either already set, or
    /// signalled during the sleep).
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let state = self.state.lock().unwrap();
        if *state {
            return true;
        }
        let (state, _) = self.condvar.wait_timeout(state, timeout).unwrap();
        *state
    }

    pub fn signal_shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        *state = true;
        self.condvar.notify_all();
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
