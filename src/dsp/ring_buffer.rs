//! Dual-array staging between the audio and analysis paths.
//!
//! The live input array and the output snapshot are split into two
//! differently-shared pieces rather than one `RingBuffer` struct shared
//! wholesale: `input` is touched every sample and is never shared past
//! this type, while `output` is the one piece the FFT worker also needs, so
//! only it is behind a `Mutex`, the narrowest possible shared surface rather
//! than a lock around the whole buffer.

use crate::dsp::window::AnalysisWindow;
use crate::dsp::wavetable::WaveTable;
use crate::Scalar;
use num_complex::Complex;
use std::sync::{Arc, Mutex};

pub struct RingBuffer {
    input: Vec<Scalar>,
    output: Arc<Mutex<Vec<Complex<Scalar>>>>,
    window: WaveTable<Scalar>,
    compensation: Scalar,
    cursor: usize,
    view_size: usize,
}

impl RingBuffer {
    pub fn new(size: usize, window: AnalysisWindow) -> Self {
        debug_assert!(size.is_power_of_two(), "ring buffer size must be a power of two");
        Self {
            input: vec![0.0; size],
            output: Arc::new(Mutex::new(vec![Complex::new(0.0, 0.0); size])),
            window: window.table(size),
            compensation: window.compensation(),
            cursor: 0,
            view_size: size / 2,
        }
    }

    /// A clone of the shared handle to `out[]`. Given to the FFT worker at
    /// construction; the audio thread never reads back through it.
    pub fn output_handle(&self) -> Arc<Mutex<Vec<Complex<Scalar>>>> {
        Arc::clone(&self.output)
    }

    /// `in[i] := x * window_compensation`. Single-writer, no sharing: the
    /// audio thread owns `RingBuffer` outright.
    #[inline]
    pub fn fill_input(&mut self, x: Scalar) {
        self.input[self.cursor] = x * self.compensation;
    }

    /// `i := (i + 1) mod N`; returns `true` once per `N/2` samples, the
    /// 50% overlap hop. Checking `cursor % view_size` rather than a single
    /// `== N/2` comparison makes this fire at both the N/2 point and the
    /// full wrap back to 0.
    #[inline]
    pub fn advance(&mut self) -> bool {
        self.cursor = (self.cursor + 1) % self.input.len();
        self.cursor % self.view_size == 0
    }

    /// Publishes a windowed snapshot of `in[]` into `out[]` under the lock.
    /// The only legal way to hand the analysis thread a stable view of the
    /// input.
    pub fn copy_to_output(&mut self) {
        let mut out = self.output.lock().unwrap();
        for k in 0..self.input.len() {
            out[k] = Complex::new(self.input[k] * self.window.get(k), 0.0);
        }
    }

    pub fn clear(&mut self) {
        self.input.iter_mut().for_each(|x| *x = 0.0);
        self.cursor = 0;
        let mut out = self.output.lock().unwrap();
        out.iter_mut().for_each(|c| *c = Complex::new(0.0, 0.0));
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_wraps_at_half_and_full_period() {
        let mut ring = RingBuffer::new(16, AnalysisWindow::Hann);
        let mut wraps = Vec::new();
        for i in 0..32 {
            if ring.advance() {
                wraps.push(i);
            }
        }
        assert_eq!(wraps, vec![7, 15, 23, 31]);
    }

    #[test]
    fn clear_zeroes_both_arrays_and_cursor() {
        let mut ring = RingBuffer::new(16, AnalysisWindow::Hann);
        for _ in 0..5 {
            ring.fill_input(1.0);
            ring.advance();
        }
        ring.copy_to_output();
        ring.clear();
        assert_eq!(ring.cursor, 0);
        assert!(ring.input.iter().all(|&x| x == 0.0));
        let out = ring.output.lock().unwrap();
        assert!(out.iter().all(|c| c.norm() == 0.0));
    }
}
