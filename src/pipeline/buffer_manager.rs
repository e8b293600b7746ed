//! Audio-thread driver.

use crate::dsp::oscillator_bank::OscillatorBank;
use crate::dsp::ring_buffer::RingBuffer;
use crate::params::SharedParameters;
use crate::sync::SyncPrimitives;
use crate::Scalar;
use log::trace;
use std::sync::Arc;

pub struct BufferManager {
    ring: RingBuffer,
    osc_bank: Arc<OscillatorBank>,
    params: Arc<SharedParameters>,
    calc_sp: Arc<SyncPrimitives>,
    prev_out: Scalar,
    want_fft: bool,
    alpha: Scalar,
    cached_cutoff: Scalar,
    sample_rate: Scalar,
}

impl BufferManager {
    pub fn new(
        ring: RingBuffer,
        osc_bank: Arc<OscillatorBank>,
        params: Arc<SharedParameters>,
        calc_sp: Arc<SyncPrimitives>,
        sample_rate: Scalar,
    ) -> Self {
        let mut manager = Self {
            ring,
            osc_bank,
            params,
            calc_sp,
            prev_out: 0.0,
            want_fft: false,
            alpha: 0.0,
            // Forces the first process_chunk to compute alpha regardless of
            // the host's default cutoff.
            cached_cutoff: Scalar::NAN,
            sample_rate,
        };
        manager.update_alpha();
        manager
    }

    pub fn set_sample_rate(&mut self, sample_rate: Scalar) {
        self.sample_rate = sample_rate;
        self.cached_cutoff = Scalar::NAN;
        self.update_alpha();
    }

    /// Recomputes the one-pole lowpass coefficient `α = 1 - exp(-2π·cutoff
    /// / f_s)` only when `filter_cutoff` has actually changed since the
    /// last call.
    fn update_alpha(&mut self) {
        let cutoff = self.params.filter_cutoff();
        if cutoff != self.cached_cutoff {
            self.cached_cutoff = cutoff;
            let two_pi = std::f64::consts::TAU as Scalar;
            self.alpha = 1.0 - (-(two_pi * cutoff) / self.sample_rate).exp();
        }
    }

    /// `prepare_to_play`'s "clears buffers": the ring only. LPF state is
    /// left untouched, unlike the fuller `reset` below, which also resets
    /// LPF state.
    pub fn clear_ring(&mut self) {
        self.ring.clear();
        self.want_fft = false;
    }

    pub fn reset(&mut self) {
        self.clear_ring();
        self.prev_out = 0.0;
    }

    /// `process_chunk(samples[], len)`. `samples.len()` need not equal `N`;
    /// the ring buffer's own cursor decides when a wrap (and therefore an
    /// FFT handoff) occurs, independent of chunk boundaries.
    pub fn process_chunk(&mut self, samples: &mut [Scalar]) {
        self.update_alpha();
        let feedback = self.params.feedback();
        let gain = self.params.gain();
        let alpha = self.alpha;

        for sample in samples.iter_mut() {
            let prev = self.prev_out;
            self.ring.fill_input(*sample + feedback * prev);

            let osc_out = self.osc_bank.receive_output() * gain;
            self.prev_out = (1.0 - alpha) * prev + alpha * osc_out;
            *sample = self.prev_out;

            if self.ring.advance() {
                if self.want_fft {
                    // Previous wrap's snapshot was never published because the
                    // FFT worker was still busy; it is dropped, not queued.
                    trace!("fft snapshot skipped: previous analysis still running");
                }
                self.want_fft = true;
            }
            if self.want_fft && self.calc_sp.action_done() {
                self.calc_sp.set_action_done(false);
                self.ring.copy_to_output();
                self.calc_sp.signal_ready();
                self.want_fft = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FFT_SIZE;
    use crate::dsp::window::AnalysisWindow;
    use crate::params::FxParameters;

    fn test_manager() -> BufferManager {
        let ring = RingBuffer::new(FFT_SIZE, AnalysisWindow::Hann);
        let osc_bank = Arc::new(OscillatorBank::new(44_100.0));
        let params = Arc::new(SharedParameters::new(&FxParameters::default()));
        let calc_sp = Arc::new(SyncPrimitives::new());
        BufferManager::new(ring, osc_bank, params, calc_sp, 44_100.0)
    }

    #[test]
    fn output_sample_count_matches_input() {
        let mut manager = test_manager();
        let mut samples = vec![0.0; 2050];
        manager.process_chunk(&mut samples);
        assert_eq!(samples.len(), 2050);
    }

    #[test]
    fn silence_in_settles_to_silence() {
        let mut manager = test_manager();
        let mut samples = vec![0.0; FFT_SIZE * 3];
        manager.process_chunk(&mut samples);
        for &s in &samples[FFT_SIZE..] {
            assert!(s.abs() < 1e-6);
        }
    }

    #[test]
    fn short_chunk_does_not_request_fft() {
        let mut manager = test_manager();
        let mut samples = vec![0.0; FFT_SIZE / 4];
        manager.process_chunk(&mut samples);
        assert!(!manager.want_fft);
        assert!(manager.calc_sp.action_done());
    }
}
