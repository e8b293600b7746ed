//! `V_max` wavetable oscillators sharing a fixed set of precomputed tables.

use crate::constants::{AMPLITUDE_CORRECTION, MAX_VOICES, WAVETABLE_SIZE};
use crate::dsp::oscillator::Oscillator;
use crate::dsp::peaks::BinMag;
use crate::dsp::wavetable::WaveTable;
use crate::params::Waveform;
use crate::Scalar;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed array of `V_max` oscillators plus immutable copies of the four
/// standard wavetables. `select_waveform` swaps every oscillator's source
/// table by flipping one shared index rather than a per-oscillator
/// pointer, since a single call retunes every voice at once.
pub struct OscillatorBank {
    oscillators: Vec<Oscillator>,
    tables: [WaveTable<Scalar>; 4],
    waveform: AtomicUsize,
    wavetable_internal_size: Scalar,
}

impl OscillatorBank {
    pub fn new(sample_rate: Scalar) -> Self {
        let tables = [
            WaveTable::sine(WAVETABLE_SIZE),
            WaveTable::triangle(WAVETABLE_SIZE),
            WaveTable::saw(WAVETABLE_SIZE),
            WaveTable::square(WAVETABLE_SIZE),
        ];
        let oscillators = (0..MAX_VOICES).map(|_| Oscillator::new(sample_rate)).collect();
        Self {
            oscillators,
            tables,
            waveform: AtomicUsize::new(Waveform::Sine.table_index()),
            wavetable_internal_size: (WAVETABLE_SIZE - 1) as Scalar,
        }
    }

    pub fn set_sample_rate(&self, sample_rate: Scalar) {
        for osc in &self.oscillators {
            osc.set_sample_rate(sample_rate);
        }
    }

    pub fn reset(&self) {
        for osc in &self.oscillators {
            osc.reset();
        }
    }

    /// `prepare_to_play` only zeros phases, leaving glide state and
    /// amplitude/increment targets alone.
    pub fn zero_phases(&self) {
        for osc in &self.oscillators {
            osc.zero_phase();
        }
    }

    /// Parameter thread. Safe to call concurrently with `receive_output`:
    /// `step()` dereferences the selected table once per call and every
    /// table shares length `W` and interpolation invariants.
    pub fn select_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.table_index(), Ordering::Release);
    }

    fn current_table(&self) -> &WaveTable<Scalar> {
        &self.tables[self.waveform.load(Ordering::Acquire)]
    }

    /// Audio thread. Sums every voice's `step()` output, scaled by the
    /// bank's `2/N` amplitude correction. Never allocates, blocks, or calls
    /// a transcendental directly (the oscillators only read precomputed
    /// table values).
    pub fn receive_output(&self) -> Scalar {
        let table = self.current_table();
        let sum: Scalar = self.oscillators.iter().map(|osc| osc.step(table)).sum();
        sum * AMPLITUDE_CORRECTION
    }

    /// Analysis thread. The first `min(voices, V_max)` oscillators are
    /// tuned to the strongest `bin_mag` entries in order; the rest glide to
    /// silence rather than cutting abruptly. `delta_f` is `f_s / N`, the
    /// frequency spacing of one FFT bin.
    pub fn tune_oscillators_to_fft(
        &self,
        bin_mag: &[BinMag],
        voices: usize,
        delta_f: Scalar,
        freq_offset: Scalar,
        glide_steps: u16,
    ) {
        let active = voices.min(self.oscillators.len());
        for (i, osc) in self.oscillators.iter().enumerate() {
            if i < active {
                if let Some(bin) = bin_mag.get(i) {
                    let freq = bin.index as Scalar * delta_f + freq_offset;
                    let amp = bin.magnitude * AMPLITUDE_CORRECTION;
                    osc.tune_and_set_amp(freq, amp, glide_steps, self.wavetable_internal_size);
                    continue;
                }
            }
            osc.tune_and_set_amp(0.0, 0.0, glide_steps, self.wavetable_internal_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bins(mags: &[(usize, Scalar)]) -> Vec<BinMag> {
        mags.iter()
            .map(|&(index, magnitude)| BinMag { index, magnitude })
            .collect()
    }

    #[test]
    fn voice_cap_silences_excess_oscillators() {
        let bank = OscillatorBank::new(44_100.0);
        let bin_mag = bins(&[(4, 1.0), (8, 1.0), (12, 1.0), (16, 1.0)]);
        bank.tune_oscillators_to_fft(&bin_mag, 2, 44_100.0 / 1024.0, 0.0, 1);

        assert!(bank.oscillators[0].amplitude() > 0.0);
        assert!(bank.oscillators[1].amplitude() > 0.0);
        for osc in &bank.oscillators[2..] {
            assert_eq!(osc.amplitude(), 0.0);
        }
    }

    #[test]
    fn zero_voices_is_silent_after_one_glide_cycle() {
        let bank = OscillatorBank::new(44_100.0);
        let bin_mag = bins(&[(10, 1.0)]);
        bank.tune_oscillators_to_fft(&bin_mag, 0, 44_100.0 / 1024.0, 0.0, 1);
        for _ in 0..2 {
            bank.receive_output();
        }
        assert_eq!(bank.receive_output(), 0.0);
    }
}
