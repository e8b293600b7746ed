//! Triggered-mode retune timer.

use crate::params::SharedParameters;
use crate::sync::{ShutdownSignal, SyncPrimitives};
use crate::ConstructionError;
use log::{debug, trace};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A single worker sleeping on `interval_ms`. Dormant (but still running)
/// in continuous mode: it ticks regardless, but only signals the retune
/// worker when `continuous_tuning` is false, so it has no effect on steady
/// continuous-mode operation beyond existing as a thread.
pub struct TriggerManager {
    thread: JoinHandle<()>,
}

impl TriggerManager {
    pub fn spawn(
        params: Arc<SharedParameters>,
        tune_sp: Arc<SyncPrimitives>,
        shutdown: Arc<ShutdownSignal>,
    ) -> Result<Self, ConstructionError> {
        let thread = thread::Builder::new()
            .name("resynth-trigger".into())
            .spawn(move || trigger_worker(params, tune_sp, shutdown))
            .map_err(ConstructionError::ThreadSpawn)?;
        Ok(Self { thread })
    }

    pub fn join(self) {
        let _ = self.thread.join();
    }
}

fn trigger_worker(
    params: Arc<SharedParameters>,
    tune_sp: Arc<SyncPrimitives>,
    shutdown: Arc<ShutdownSignal>,
) {
    loop {
        let interval = Duration::from_millis(params.tune_interval_ms() as u64);
        if shutdown.wait_timeout(interval) {
            debug!("trigger worker exiting on shutdown");
            return;
        }
        if !params.continuous_tuning() {
            trace!("trigger tick: signalling retune worker");
            tune_sp.signal_ready();
        }
    }
}
