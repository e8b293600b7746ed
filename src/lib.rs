//! Realtime spectral resynthesis core.
//!
//! An input audio stream is windowed and Fourier-analyzed; the strongest
//! spectral peaks are mapped to a bank of wavetable oscillators whose summed
//! output replaces the input. This crate is the concurrent signal-processing
//! core only: it expects to be embedded in a host that delivers fixed-rate
//! sample chunks on a realtime thread and owns the parameter UI, MIDI
//! dispatch and state persistence.
//!
//! See [`ResynthEngine`] for the host-facing entry point.

pub mod constants;
mod dsp;
pub mod error;
pub mod params;
mod pipeline;
mod sync;

pub use error::ConstructionError;
pub use params::{FxParameters, Waveform};
pub use pipeline::ResynthEngine;

/// The sample scalar, chosen once at compile time. `f32` unless the `f64`
/// feature is enabled.
#[cfg(not(feature = "f64"))]
pub type Scalar = f32;
#[cfg(feature = "f64")]
pub type Scalar = f64;

#[cfg(not(feature = "f64"))]
pub(crate) type AtomicScalar = atomic_float::AtomicF32;
#[cfg(feature = "f64")]
pub(crate) type AtomicScalar = atomic_float::AtomicF64;

/// Bound shared by every precomputed-table and FFT primitive in `dsp`, so
/// that wavetables, windows, twiddle factors and the FFT itself are generic
/// over sample precision while the concurrency-heavy oscillator/pipeline
/// types above them commit to the concrete [`Scalar`].
pub trait Sample:
    num_traits::Float + std::fmt::Debug + Default + Send + Sync + 'static
{
}

impl<T> Sample for T where T: num_traits::Float + std::fmt::Debug + Default + Send + Sync + 'static
{}
