//! The pipeline controller: the single owning container that hands
//! non-owning references to each worker thread's closure and joins them
//! all before it drops. This is the crate's host-facing entry point.

use crate::constants::FFT_SIZE;
use crate::dsp::oscillator_bank::OscillatorBank;
use crate::dsp::peaks::BinMagMap;
use crate::dsp::ring_buffer::RingBuffer;
use crate::dsp::window::AnalysisWindow;
use crate::params::{FxParameters, SharedParameters};
use crate::pipeline::buffer_manager::BufferManager;
use crate::pipeline::calculation_engine::CalculationEngine;
use crate::pipeline::trigger_manager::TriggerManager;
use crate::sync::{ShutdownSignal, SyncPrimitives};
use crate::{AtomicScalar, ConstructionError, Scalar};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Realtime spectral resynthesis engine. One instance couples the audio
/// path, the FFT/peak-extraction path and the retuning path.
///
/// `process_chunk` is the only method meant to run on the host's realtime
/// audio thread; every other method expects to run off that thread.
pub struct ResynthEngine {
    buffer_manager: BufferManager,
    osc_bank: Arc<OscillatorBank>,
    params: Arc<SharedParameters>,
    sample_rate: Arc<AtomicScalar>,
    fft_sp: Arc<SyncPrimitives>,
    tune_sp: Arc<SyncPrimitives>,
    shutdown_signal: Arc<ShutdownSignal>,
    stop_workers: Arc<AtomicBool>,
    calc_engine: Option<CalculationEngine>,
    trigger: Option<TriggerManager>,
}

impl ResynthEngine {
    /// Constructs the engine at an assumed `44100` Hz; call
    /// [`Self::prepare_to_play`] once the host knows its real sample rate.
    pub fn new(initial: &FxParameters) -> Result<Self, ConstructionError> {
        Self::with_sample_rate(initial, 44_100.0)
    }

    pub fn with_sample_rate(
        initial: &FxParameters,
        sample_rate: Scalar,
    ) -> Result<Self, ConstructionError> {
        let params = Arc::new(SharedParameters::new(initial));
        let osc_bank = Arc::new(OscillatorBank::new(sample_rate));
        osc_bank.select_waveform(initial.waveform_selection);

        let ring = RingBuffer::new(FFT_SIZE, AnalysisWindow::default());
        let output_handle = ring.output_handle();
        let bin_mag = Arc::new(Mutex::new(BinMagMap::new(FFT_SIZE / 2)));

        let fft_sp = Arc::new(SyncPrimitives::new());
        let tune_sp = Arc::new(SyncPrimitives::new());
        let shutdown_signal = Arc::new(ShutdownSignal::new());
        let stop_workers = Arc::new(AtomicBool::new(false));
        let sample_rate_shared = Arc::new(AtomicScalar::new(sample_rate));

        let calc_engine = CalculationEngine::spawn(
            output_handle,
            Arc::clone(&bin_mag),
            Arc::clone(&osc_bank),
            Arc::clone(&params),
            Arc::clone(&sample_rate_shared),
            Arc::clone(&fft_sp),
            Arc::clone(&tune_sp),
            Arc::clone(&stop_workers),
        )?;

        let trigger = TriggerManager::spawn(
            Arc::clone(&params),
            Arc::clone(&tune_sp),
            Arc::clone(&shutdown_signal),
        )?;

        let buffer_manager = BufferManager::new(
            ring,
            Arc::clone(&osc_bank),
            Arc::clone(&params),
            Arc::clone(&fft_sp),
            sample_rate,
        );

        debug!("spectral resynthesis core constructed at {sample_rate} Hz");

        Ok(Self {
            buffer_manager,
            osc_bank,
            params,
            sample_rate: sample_rate_shared,
            fft_sp,
            tune_sp,
            shutdown_signal,
            stop_workers,
            calc_engine: Some(calc_engine),
            trigger: Some(trigger),
        })
    }

    /// Sets sampling frequency, clears the ring buffer, zeros oscillator
    /// phases, and re-arms the FFT/retune handoff gates. Must not be
    /// called from the audio callback.
    pub fn prepare_to_play(&mut self, sample_rate: Scalar) {
        debug!("prepare_to_play: {sample_rate} Hz");
        self.sample_rate.store(sample_rate, Ordering::Release);
        self.osc_bank.set_sample_rate(sample_rate);
        self.buffer_manager.set_sample_rate(sample_rate);
        self.buffer_manager.clear_ring();
        self.osc_bank.zero_phases();
        self.fft_sp.set_action_done(true);
        self.tune_sp.set_action_done(true);
    }

    /// Applies every field of `params`. Safe to call at any time; every
    /// out-of-range value is clamped rather than rejected.
    pub fn update_parameters(&self, params: &FxParameters) {
        self.params.apply(params);
        self.osc_bank.select_waveform(params.waveform_selection);
    }

    /// Replaces `samples` in place. Must run on the audio thread.
    pub fn process_chunk(&mut self, samples: &mut [Scalar]) {
        self.buffer_manager.process_chunk(samples);
    }

    /// Clears the ring, resets the oscillator bank to zero, and resets LPF
    /// state. Must not be called from the audio callback.
    pub fn reset(&mut self) {
        debug!("reset: clearing ring buffer and oscillator bank");
        self.buffer_manager.reset();
        self.osc_bank.reset();
    }
}

impl Drop for ResynthEngine {
    /// Sets the shared shutdown flag, wakes every worker's condition
    /// variable, and joins them all before any field is released.
    fn drop(&mut self) {
        debug!("shutting down: signalling and joining all worker threads");
        self.stop_workers.store(true, Ordering::Release);
        self.fft_sp.notify_shutdown();
        self.tune_sp.notify_shutdown();
        self.shutdown_signal.signal_shutdown();
        if let Some(engine) = self.calc_engine.take() {
            engine.join();
        }
        if let Some(trigger) = self.trigger.take() {
            trigger.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_and_tears_down_cleanly() {
        let engine = ResynthEngine::new(&FxParameters::default());
        assert!(engine.is_ok());
    }

    #[test]
    fn update_parameters_is_idempotent() {
        let mut engine = ResynthEngine::new(&FxParameters::default()).unwrap();
        let params = FxParameters {
            gain: 1.5,
            voices: 4,
            ..FxParameters::default()
        };
        engine.update_parameters(&params);
        engine.update_parameters(&params);
        let mut samples = vec![0.0; 64];
        engine.process_chunk(&mut samples);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut engine = ResynthEngine::new(&FxParameters::default()).unwrap();
        engine.reset();
        engine.reset();
    }

    #[test]
    fn voices_zero_is_silent() {
        let mut engine = ResynthEngine::new(&FxParameters::default()).unwrap();
        let params = FxParameters {
            voices: 0,
            ..FxParameters::default()
        };
        engine.update_parameters(&params);
        let mut samples = vec![0.1; 4096];
        engine.process_chunk(&mut samples);
        for &s in &samples[crate::constants::FFT_SIZE..] {
            assert!(s.abs() < 1e-3);
        }
    }
}
