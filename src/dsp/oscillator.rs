//! A single wavetable oscillator voice.

use crate::dsp::wavetable::WaveTable;
use crate::{AtomicScalar, Scalar};
use std::sync::atomic::Ordering;

/// One voice's state. Every field is an atomic so an `Arc<OscillatorBank>`
/// can be shared between the audio thread (reads/writes `phase`,
/// `increment`, `amplitude` every sample) and the retune worker (writes the
/// glide targets) without a mutex on the hot path. In practice the audio
/// thread's `step()` also advances `increment` and `amplitude` by their
/// glide deltas, so those three fields see writes from both sides: plain
/// acquire/release on each field individually is enough here, since nothing
/// needs a stronger fence across fields.
pub struct Oscillator {
    phase: AtomicScalar,
    increment: AtomicScalar,
    amplitude: AtomicScalar,
    inc_delta: AtomicScalar,
    amp_delta: AtomicScalar,
    inc_limit_lo: AtomicScalar,
    inc_limit_hi: AtomicScalar,
    amp_limit_lo: AtomicScalar,
    amp_limit_hi: AtomicScalar,
    sample_rate: AtomicScalar,
    nyquist: AtomicScalar,
    inv_sample_rate: AtomicScalar,
}

impl Oscillator {
    pub fn new(sample_rate: Scalar) -> Self {
        let osc = Self {
            phase: AtomicScalar::new(0.0),
            increment: AtomicScalar::new(0.0),
            amplitude: AtomicScalar::new(0.0),
            inc_delta: AtomicScalar::new(0.0),
            amp_delta: AtomicScalar::new(0.0),
            inc_limit_lo: AtomicScalar::new(0.0),
            inc_limit_hi: AtomicScalar::new(0.0),
            amp_limit_lo: AtomicScalar::new(0.0),
            amp_limit_hi: AtomicScalar::new(0.0),
            sample_rate: AtomicScalar::new(0.0),
            nyquist: AtomicScalar::new(0.0),
            inv_sample_rate: AtomicScalar::new(0.0),
        };
        osc.set_sample_rate(sample_rate);
        osc
    }

    pub fn set_sample_rate(&self, sample_rate: Scalar) {
        self.sample_rate.store(sample_rate, Ordering::Release);
        self.nyquist
            .store(sample_rate * 0.5, Ordering::Release);
        self.inv_sample_rate
            .store(1.0 / sample_rate, Ordering::Release);
    }

    /// Zeros only the phase, distinct from the fuller `reset()` below.
    pub fn zero_phase(&self) {
        self.phase.store(0.0, Ordering::Release);
    }

    /// Zeros phase, increment, amplitude and every glide parameter. Does
    /// not touch the cached sample-rate fields.
    pub fn reset(&self) {
        self.phase.store(0.0, Ordering::Release);
        self.increment.store(0.0, Ordering::Release);
        self.amplitude.store(0.0, Ordering::Release);
        self.inc_delta.store(0.0, Ordering::Release);
        self.amp_delta.store(0.0, Ordering::Release);
        self.inc_limit_lo.store(0.0, Ordering::Release);
        self.inc_limit_hi.store(0.0, Ordering::Release);
        self.amp_limit_lo.store(0.0, Ordering::Release);
        self.amp_limit_hi.store(0.0, Ordering::Release);
    }

    /// Audio-thread hot path. No allocation, no transcendentals beyond the
    /// precomputed table lookups.
    #[inline]
    pub fn step(&self, table: &WaveTable<Scalar>) -> Scalar {
        let internal_size = (table.len() - 1) as Scalar;

        let phase = self.phase.load(Ordering::Acquire);
        let idx = phase as usize;
        // SAFETY: phase stays in [0, internal_size) by the wrap below, and
        // the table equalizes table[W-1] == table[0], so idx+1 < W always.
        let a = unsafe { table.get_unchecked(idx) };
        let b = unsafe { table.get_unchecked(idx + 1) };
        let frac = phase - idx as Scalar;
        let sample = a + frac * (b - a);

        let increment = self.increment.load(Ordering::Acquire);
        let mut next_phase = phase + increment;
        if next_phase >= internal_size {
            next_phase -= internal_size;
        }
        self.phase.store(next_phase, Ordering::Release);

        let inc_delta = self.inc_delta.load(Ordering::Acquire);
        let amp_delta = self.amp_delta.load(Ordering::Acquire);
        let inc_lo = self.inc_limit_lo.load(Ordering::Acquire);
        let inc_hi = self.inc_limit_hi.load(Ordering::Acquire);
        let amp_lo = self.amp_limit_lo.load(Ordering::Acquire);
        let amp_hi = self.amp_limit_hi.load(Ordering::Acquire);

        let next_increment = (increment + inc_delta).clamp(inc_lo, inc_hi);
        let next_amplitude =
            (self.amplitude.load(Ordering::Acquire) + amp_delta).clamp(amp_lo, amp_hi);
        self.increment.store(next_increment, Ordering::Release);
        self.amplitude.store(next_amplitude, Ordering::Release);

        sample * next_amplitude
    }

    /// Retune operation, called from the analysis thread.
    /// `wavetable_internal_size` is `W - 1`, matching the
    /// wraparound-by-subtraction convention `step()` uses.
    pub fn tune_and_set_amp(
        &self,
        target_freq: Scalar,
        target_amp: Scalar,
        glide_steps: u16,
        wavetable_internal_size: Scalar,
    ) {
        let nyquist = self.nyquist.load(Ordering::Acquire);
        let f_target = target_freq.clamp(0.0, nyquist);
        let inv_sample_rate = self.inv_sample_rate.load(Ordering::Acquire);
        let inc_target = wavetable_internal_size * f_target * inv_sample_rate;

        // There is no separate "last commanded" slot distinct from the live
        // ramping value here: reading the live atomics as inc_prev/A_prev
        // is equivalent for a glide that has converged, and strictly safer
        // than a cached target when a retune arrives mid-glide.
        let inc_prev = self.increment.load(Ordering::Acquire);
        let amp_prev = self.amplitude.load(Ordering::Acquire);

        let inv_steps = 1.0 / (glide_steps.max(1) as Scalar);
        let inc_delta = (inc_target - inc_prev) * inv_steps;
        let amp_delta = (target_amp - amp_prev) * inv_steps;

        let (inc_lo, inc_hi) = if inc_target >= inc_prev {
            (inc_prev, inc_target)
        } else {
            (inc_target, inc_prev)
        };
        let (amp_lo, amp_hi) = if target_amp >= amp_prev {
            (amp_prev, target_amp)
        } else {
            (target_amp, amp_prev)
        };

        self.inc_delta.store(inc_delta, Ordering::Release);
        self.amp_delta.store(amp_delta, Ordering::Release);
        self.inc_limit_lo.store(inc_lo, Ordering::Release);
        self.inc_limit_hi.store(inc_hi, Ordering::Release);
        self.amp_limit_lo.store(amp_lo, Ordering::Release);
        self.amp_limit_hi.store(amp_hi, Ordering::Release);
    }

    #[inline]
    pub fn increment(&self) -> Scalar {
        self.increment.load(Ordering::Acquire)
    }

    #[inline]
    pub fn amplitude(&self) -> Scalar {
        self.amplitude.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn glide_converges_without_overshoot() {
        let table = WaveTable::<Scalar>::sine(256);
        let internal_size = (table.len() - 1) as Scalar;
        let osc = Oscillator::new(44_100.0);
        osc.tune_and_set_amp(440.0, 0.8, 64, internal_size);

        let target_inc = internal_size * 440.0 / 44_100.0;
        let mut max_inc_seen = 0.0;
        for _ in 0..64 {
            osc.step(&table);
            let inc = osc.increment();
            assert!(inc <= target_inc + 1e-6, "overshot increment: {inc} > {target_inc}");
            if inc > max_inc_seen {
                max_inc_seen = inc;
            }
        }
        assert!(approx_eq!(Scalar, osc.increment(), target_inc, epsilon = 1e-4));
        assert!(approx_eq!(Scalar, osc.amplitude(), 0.8, epsilon = 1e-4));
    }

    #[test]
    fn tune_to_silence_glides_down() {
        let table = WaveTable::<Scalar>::sine(256);
        let internal_size = (table.len() - 1) as Scalar;
        let osc = Oscillator::new(44_100.0);
        osc.tune_and_set_amp(1000.0, 1.0, 16, internal_size);
        for _ in 0..16 {
            osc.step(&table);
        }
        osc.tune_and_set_amp(0.0, 0.0, 16, internal_size);
        for _ in 0..16 {
            osc.step(&table);
        }
        assert!(approx_eq!(Scalar, osc.amplitude(), 0.0, epsilon = 1e-4));
    }
}
