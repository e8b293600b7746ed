//! Compile-time sizes and tuning constants for the spectral resynthesis core.
//!
//! Variable FFT size at runtime is a non-goal of this engine: `FFT_SIZE`,
//! `WAVETABLE_SIZE` and `MAX_VOICES` are fixed at compile time.

use crate::Scalar;

/// FFT window size `N`. Must be a power of two.
pub const FFT_SIZE: usize = 1024;

/// Wavetable size `W`. Must be a power of two.
pub const WAVETABLE_SIZE: usize = 256;

/// Oscillator bank capacity `V_max`.
pub const MAX_VOICES: usize = 46;

/// Minimum magnitude a bin must clear to ever count as a peak, regardless of
/// the host's `fft_threshold` setting.
pub const MIN_GAIN_THRESHOLD: Scalar = 1e-6;

/// Oscillator-bank amplitude correction `2/N` applied both when summing the
/// bank's output (`receive_output`) and when mapping a bin magnitude to a
/// target amplitude (`tune_oscillators_to_fft`).
pub const AMPLITUDE_CORRECTION: Scalar = 2.0 / (FFT_SIZE as Scalar);

/// Default glide length in samples (~100 samples is a short click-suppression
/// ramp at 44.1 kHz).
pub const DEFAULT_GLIDE_STEPS: u16 = 100;

/// Empirical window-compensation constants restoring unity passband gain at
/// 50% overlap, treated as a per-window attribute rather than a global.
/// Hann's value (~1.2) is the commonly cited one; the others are picked on
/// the same basis (inverse of the window's average value at 50% overlap)
/// and are not load-bearing for correctness, only for level.
pub const HANN_WINDOW_COMPENSATION: Scalar = 1.2;
pub const HAMMING_WINDOW_COMPENSATION: Scalar = 1.1;
pub const BARTLETT_WINDOW_COMPENSATION: Scalar = 1.3;
