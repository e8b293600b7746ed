//! Host-facing configuration surface. This is the whole of the engine's
//! "parameter thread" API: the host builds an [`FxParameters`] from its own
//! UI/automation state and hands it wholesale to
//! [`crate::ResynthEngine::update_parameters`]. `nih_plug`'s
//! `Params`/`FloatParam` machinery lives in the host shell this crate treats
//! as an external collaborator, so it has no presence here.

use crate::constants::{DEFAULT_GLIDE_STEPS, MAX_VOICES};
use crate::{AtomicScalar, Scalar};
use log::warn;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};

/// Oscillator waveform, the concrete type behind `FxParameters.waveform_selection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Saw,
    Square,
}

impl Waveform {
    /// Index into the oscillator bank's fixed `[sine, triangle, saw, square]`
    /// table array.
    pub(crate) fn table_index(self) -> usize {
        match self {
            Waveform::Sine => 0,
            Waveform::Triangle => 1,
            Waveform::Saw => 2,
            Waveform::Square => 3,
        }
    }
}

/// Plain, host-supplied parameter snapshot. `update_parameters` ingests one
/// of these wholesale; nothing here is read directly by the audio/analysis
/// threads, which instead read the clamped, atomic mirror in
/// [`SharedParameters`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxParameters {
    pub waveform_selection: Waveform,
    pub filter_cutoff: Scalar,
    pub fft_threshold: Scalar,
    pub frequency_offset: Scalar,
    pub gain: Scalar,
    /// Self-referential feedback coefficient in `fill_input(x + feedback *
    /// prev_out)`. Clamped strictly below 1: the self-referential loop can
    /// diverge at feedback == 1.
    pub feedback: Scalar,
    pub glide_steps: u16,
    pub voices: usize,
    pub freeze: bool,
    pub continuous_tuning: bool,
    pub tune_interval_ms: u16,
    /// Optional denormal flush ahead of peak extraction. An implementation
    /// nicety, not load-bearing for correctness.
    pub denormal_flush: bool,
}

impl Default for FxParameters {
    fn default() -> Self {
        Self {
            waveform_selection: Waveform::Sine,
            filter_cutoff: 20_000.0,
            fft_threshold: 0.01,
            frequency_offset: 0.0,
            gain: 1.0,
            feedback: 0.0,
            glide_steps: DEFAULT_GLIDE_STEPS,
            voices: 8,
            freeze: false,
            continuous_tuning: true,
            tune_interval_ms: 100,
            denormal_flush: false,
        }
    }
}

impl FxParameters {
    /// Pure clamping of every field whose range doesn't depend on the
    /// sample rate. `filter_cutoff`'s `(0, f_s/2)` bound and
    /// `fft_threshold`'s `[ε, N/2]` bound need runtime context the caller
    /// doesn't have here; those are re-clamped where they're consumed
    /// (`BufferManager` and the FFT worker, respectively).
    pub fn sanitized(&self, max_voices: usize) -> Self {
        Self {
            waveform_selection: self.waveform_selection,
            filter_cutoff: self.filter_cutoff.max(Scalar::EPSILON),
            fft_threshold: self.fft_threshold.max(0.0),
            frequency_offset: self.frequency_offset,
            gain: self.gain.clamp(0.0, 2.0),
            // Strictly below 1, not the inclusive [0, 1] a naive reading
            // might allow: the self-referential feedback loop can diverge
            // at feedback == 1.
            feedback: self.feedback.clamp(0.0, 1.0 - Scalar::EPSILON),
            glide_steps: self.glide_steps.max(1),
            voices: self.voices.min(max_voices),
            freeze: self.freeze,
            continuous_tuning: self.continuous_tuning,
            tune_interval_ms: self.tune_interval_ms.clamp(1, 5000),
            denormal_flush: self.denormal_flush,
        }
    }
}

/// Atomic mirror of [`FxParameters`], published by `update_parameters` and
/// read field-by-field by the audio, FFT and retune workers. Waveform
/// selection is not mirrored here: it is published straight to the
/// oscillator bank's own atomic index by `ResynthEngine::update_parameters`,
/// since the bank is the only reader.
pub struct SharedParameters {
    filter_cutoff: AtomicScalar,
    fft_threshold: AtomicScalar,
    frequency_offset: AtomicScalar,
    gain: AtomicScalar,
    feedback: AtomicScalar,
    glide_steps: AtomicU16,
    voices: AtomicUsize,
    freeze: AtomicBool,
    continuous_tuning: AtomicBool,
    tune_interval_ms: AtomicU16,
    denormal_flush: AtomicBool,
}

impl SharedParameters {
    pub fn new(initial: &FxParameters) -> Self {
        let shared = Self {
            filter_cutoff: AtomicScalar::new(0.0),
            fft_threshold: AtomicScalar::new(0.0),
            frequency_offset: AtomicScalar::new(0.0),
            gain: AtomicScalar::new(1.0),
            feedback: AtomicScalar::new(0.0),
            glide_steps: AtomicU16::new(DEFAULT_GLIDE_STEPS),
            voices: AtomicUsize::new(0),
            freeze: AtomicBool::new(false),
            continuous_tuning: AtomicBool::new(true),
            tune_interval_ms: AtomicU16::new(100),
            denormal_flush: AtomicBool::new(false),
        };
        shared.apply(initial);
        shared
    }

    /// Clamps and publishes every field of `params`. Applying the same
    /// `params` twice in a row is a no-op on the stored values.
    pub fn apply(&self, params: &FxParameters) {
        let p = params.sanitized(MAX_VOICES);
        if p != *params {
            warn!("update_parameters: one or more fields were out of range and clamped");
        }
        self.filter_cutoff.store(p.filter_cutoff, Ordering::Relaxed);
        self.fft_threshold.store(p.fft_threshold, Ordering::Relaxed);
        self.frequency_offset
            .store(p.frequency_offset, Ordering::Relaxed);
        self.gain.store(p.gain, Ordering::Relaxed);
        self.feedback.store(p.feedback, Ordering::Relaxed);
        self.glide_steps.store(p.glide_steps, Ordering::Relaxed);
        self.voices.store(p.voices, Ordering::Relaxed);
        self.freeze.store(p.freeze, Ordering::Relaxed);
        self.continuous_tuning
            .store(p.continuous_tuning, Ordering::Relaxed);
        self.tune_interval_ms
            .store(p.tune_interval_ms, Ordering::Relaxed);
        self.denormal_flush
            .store(p.denormal_flush, Ordering::Relaxed);
    }

    #[inline]
    pub fn filter_cutoff(&self) -> Scalar {
        self.filter_cutoff.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn fft_threshold(&self) -> Scalar {
        self.fft_threshold.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn frequency_offset(&self) -> Scalar {
        self.frequency_offset.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn gain(&self) -> Scalar {
        self.gain.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn feedback(&self) -> Scalar {
        self.feedback.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn glide_steps(&self) -> u16 {
        self.glide_steps.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn voices(&self) -> usize {
        self.voices.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn freeze(&self) -> bool {
        self.freeze.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn continuous_tuning(&self) -> bool {
        self.continuous_tuning.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn tune_interval_ms(&self) -> u16 {
        self.tune_interval_ms.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn denormal_flush(&self) -> bool {
        self.denormal_flush.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_clamps_gain_and_feedback() {
        let p = FxParameters {
            gain: 10.0,
            feedback: 1.0,
            voices: 1000,
            glide_steps: 0,
            tune_interval_ms: 0,
            ..FxParameters::default()
        };
        let s = p.sanitized(MAX_VOICES);
        assert_eq!(s.gain, 2.0);
        assert!(s.feedback < 1.0);
        assert_eq!(s.voices, MAX_VOICES);
        assert_eq!(s.glide_steps, 1);
        assert_eq!(s.tune_interval_ms, 1);
    }

    #[test]
    fn apply_twice_is_idempotent() {
        let shared = SharedParameters::new(&FxParameters::default());
        let p = FxParameters {
            gain: 1.5,
            ..FxParameters::default()
        };
        shared.apply(&p);
        let first = shared.gain();
        shared.apply(&p);
        assert_eq!(first, shared.gain());
    }
}
