//! FFT and retune worker threads.

use crate::constants::FFT_SIZE;
use crate::dsp::fft::fft_in_place;
use crate::dsp::oscillator_bank::OscillatorBank;
use crate::dsp::peaks::BinMagMap;
use crate::dsp::twiddle::TwiddleLut;
use crate::params::SharedParameters;
use crate::sync::SyncPrimitives;
use crate::{AtomicScalar, ConstructionError, Scalar};
use log::{debug, trace};
use num_complex::Complex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Owns the FFT and retune worker threads. Does not join on drop: the
/// pipeline controller performs one centralized shutdown sequence, so
/// callers must explicitly call [`CalculationEngine::join`] after
/// signalling shutdown.
pub struct CalculationEngine {
    fft_thread: JoinHandle<()>,
    retune_thread: JoinHandle<()>,
}

impl CalculationEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        output: Arc<Mutex<Vec<Complex<Scalar>>>>,
        bin_mag: Arc<Mutex<BinMagMap>>,
        osc_bank: Arc<OscillatorBank>,
        params: Arc<SharedParameters>,
        sample_rate: Arc<AtomicScalar>,
        fft_sp: Arc<SyncPrimitives>,
        tune_sp: Arc<SyncPrimitives>,
        stop: Arc<AtomicBool>,
    ) -> Result<Self, ConstructionError> {
        let fft_thread = {
            let params = Arc::clone(&params);
            let bin_mag = Arc::clone(&bin_mag);
            let fft_sp = Arc::clone(&fft_sp);
            let tune_sp = Arc::clone(&tune_sp);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("resynth-fft".into())
                .spawn(move || fft_worker(output, bin_mag, params, fft_sp, tune_sp, stop))
                .map_err(ConstructionError::ThreadSpawn)?
        };

        let retune_thread = thread::Builder::new()
            .name("resynth-retune".into())
            .spawn(move || retune_worker(bin_mag, osc_bank, params, sample_rate, tune_sp, stop))
            .map_err(ConstructionError::ThreadSpawn)?;

        Ok(Self {
            fft_thread,
            retune_thread,
        })
    }

    pub fn join(self) {
        let _ = self.fft_thread.join();
        let _ = self.retune_thread.join();
    }
}

/// **FFT worker loop.** Waits on `fft_sp`, transforms `out[]` in place,
/// extracts peaks, publishes them under `bin_mag`'s lock, and signals the
/// retune worker when in continuous mode.
fn fft_worker(
    output: Arc<Mutex<Vec<Complex<Scalar>>>>,
    bin_mag: Arc<Mutex<BinMagMap>>,
    params: Arc<SharedParameters>,
    fft_sp: Arc<SyncPrimitives>,
    tune_sp: Arc<SyncPrimitives>,
    stop: Arc<AtomicBool>,
) {
    let mut twiddles = TwiddleLut::<Scalar>::new();
    // A scratch map swapped into `bin_mag` under its lock each pass, so
    // publication never allocates.
    let mut scratch = BinMagMap::new(FFT_SIZE / 2);

    loop {
        if !fft_sp.wait_ready(&stop) {
            debug!("fft worker exiting on shutdown");
            return;
        }

        {
            let mut spectrum = output.lock().unwrap();
            fft_in_place(&mut spectrum, &mut twiddles);
            scratch.extract(
                &spectrum[..FFT_SIZE / 2],
                params.fft_threshold(),
                params.denormal_flush(),
            );
        }
        trace!("fft pass complete: {} peaks above threshold", scratch.entries().len());

        {
            let mut shared = bin_mag.lock().unwrap();
            shared.swap(&mut scratch);
        }

        if params.continuous_tuning() {
            tune_sp.signal_ready();
        }
        fft_sp.set_action_done(true);
    }
}

/// **Retune worker loop.** `freeze` makes this a no-op for the cycle
/// (parameters are left exactly as the last successful tuning pass set
/// them), while still releasing the gate so the next cycle isn't starved.
fn retune_worker(
    bin_mag: Arc<Mutex<BinMagMap>>,
    osc_bank: Arc<OscillatorBank>,
    params: Arc<SharedParameters>,
    sample_rate: Arc<AtomicScalar>,
    tune_sp: Arc<SyncPrimitives>,
    stop: Arc<AtomicBool>,
) {
    loop {
        if !tune_sp.wait_ready(&stop) {
            debug!("retune worker exiting on shutdown");
            return;
        }

        if params.freeze() {
            trace!("retune skipped: freeze is set");
            tune_sp.set_action_done(true);
            continue;
        }

        let delta_f = sample_rate.load(Ordering::Acquire) / FFT_SIZE as Scalar;
        {
            let map = bin_mag.lock().unwrap();
            osc_bank.tune_oscillators_to_fft(
                map.entries(),
                params.voices(),
                delta_f,
                params.frequency_offset(),
                params.glide_steps(),
            );
        }
        trace!("oscillator bank retuned from latest fft peaks");
        tune_sp.set_action_done(true);
    }
}
