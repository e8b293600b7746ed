//! Precomputed complex exponentials for the FFT butterfly.

use crate::Sample;
use num_complex::Complex;

/// Ten immutable arrays of sizes `1, 2, 4, ..., 512`; array `i` holds
/// element `k` equal to `e^{-iπk/2^i}`. The butterfly at stage `s` (block
/// size `m = 2^s`) consumes `m/2 = 2^{s-1}` distinct twiddles, so it selects
/// array `s - 1`.
pub struct TwiddleLut<T: Sample> {
    arrays: [Vec<Complex<T>>; 10],
    stage: usize,
}

impl<T: Sample> TwiddleLut<T> {
    pub fn new() -> Self {
        let arrays = std::array::from_fn(|i| {
            let m = 1usize << i;
            let pi = T::from(std::f64::consts::PI).unwrap();
            let m_t = T::from(m).unwrap();
            (0..m)
                .map(|k| {
                    let angle = -pi * T::from(k).unwrap() / m_t;
                    Complex::new(angle.cos(), angle.sin())
                })
                .collect()
        });
        Self { arrays, stage: 0 }
    }

    /// Selects the array for butterfly stage `s` (1-indexed, `m = 2^s`),
    /// clamping into `[0, 9]`.
    #[inline]
    pub fn select_for_stage(&mut self, s: usize) {
        self.stage = s.saturating_sub(1).min(9);
    }

    /// Returns `arrays[stage][k]` without bounds checking. Caller must
    /// guarantee `k < m/2` for the currently selected stage.
    #[inline]
    pub unsafe fn get_unchecked(&self, k: usize) -> Complex<T> {
        *self.arrays[self.stage].get_unchecked(k)
    }

    #[inline]
    pub fn get(&self, k: usize) -> Complex<T> {
        self.arrays[self.stage][k]
    }
}

impl<T: Sample> Default for TwiddleLut<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn stage_one_is_the_conjugate_unit() {
        let mut lut = TwiddleLut::<f32>::new();
        lut.select_for_stage(1);
        let w = lut.get(0);
        assert!(approx_eq!(f32, w.re, 1.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, w.im, 0.0, epsilon = 1e-6));
    }

    #[test]
    fn higher_stage_matches_closed_form() {
        let mut lut = TwiddleLut::<f32>::new();
        lut.select_for_stage(4); // m = 16, array index 3, size 8
        for k in 0..8 {
            let expected_angle = -std::f32::consts::PI * k as f32 / 8.0;
            let w = lut.get(k);
            assert!(approx_eq!(f32, w.re, expected_angle.cos(), epsilon = 1e-6));
            assert!(approx_eq!(f32, w.im, expected_angle.sin(), epsilon = 1e-6));
        }
    }
}
