//! Threshold-and-sort peak extraction over the lower half-spectrum.

use crate::constants::MIN_GAIN_THRESHOLD;
use crate::Scalar;
use num_complex::Complex;

/// One `(bin index, magnitude)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinMag {
    pub index: usize,
    pub magnitude: Scalar,
}

/// Fixed-capacity, descending-by-magnitude map of the bins that cleared
/// threshold on the last [`BinMagMap::extract`] call. `entries[valid..]` is
/// left at its previous contents and must not be read; `entries()` only
/// ever exposes `entries[..valid]`.
pub struct BinMagMap {
    entries: Vec<BinMag>,
    valid: usize,
}

impl BinMagMap {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![
                BinMag {
                    index: 0,
                    magnitude: 0.0,
                };
                capacity
            ],
            valid: 0,
        }
    }

    /// Scans `spectrum[0..N/2)`, keeps bins whose magnitude clears
    /// `threshold` (itself clamped into `[ε, N/2]`), and sorts the kept
    /// bins by descending magnitude. Reuses its backing storage; no
    /// allocation after construction.
    pub fn extract(&mut self, spectrum: &[Complex<Scalar>], threshold: Scalar, denormal_flush: bool) {
        let threshold = threshold.clamp(MIN_GAIN_THRESHOLD, spectrum.len() as Scalar);
        self.valid = 0;
        for (k, bin) in spectrum.iter().enumerate() {
            let mut magnitude = bin.norm();
            if denormal_flush && magnitude != 0.0 && magnitude.abs() < Scalar::MIN_POSITIVE {
                magnitude = 0.0;
            }
            if magnitude >= threshold {
                self.entries[self.valid] = BinMag { index: k, magnitude };
                self.valid += 1;
            }
        }
        self.entries[..self.valid]
            .sort_unstable_by(|a, b| b.magnitude.partial_cmp(&a.magnitude).unwrap());
    }

    pub fn entries(&self) -> &[BinMag] {
        &self.entries[..self.valid]
    }

    pub fn swap(&mut self, other: &mut BinMagMap) {
        std::mem::swap(&mut self.entries, &mut other.entries);
        std::mem::swap(&mut self.valid, &mut other.valid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum_from_mags(mags: &[Scalar]) -> Vec<Complex<Scalar>> {
        mags.iter().map(|&m| Complex::new(m, 0.0)).collect()
    }

    #[test]
    fn respects_threshold_and_descending_order() {
        let spectrum = spectrum_from_mags(&[0.0, 0.02, 0.5, 0.001, 0.3]);
        let mut map = BinMagMap::new(spectrum.len());
        map.extract(&spectrum, 0.01, false);
        let entries: Vec<_> = map.entries().to_vec();
        assert!(entries.windows(2).all(|w| w[0].magnitude >= w[1].magnitude));
        assert!(entries.iter().all(|e| e.magnitude >= 0.01));
        assert_eq!(entries[0].index, 2);
    }

    #[test]
    fn threshold_floor_is_min_gain() {
        let spectrum = spectrum_from_mags(&[1e-9, 1e-5, 0.2]);
        let mut map = BinMagMap::new(spectrum.len());
        map.extract(&spectrum, 0.0, false);
        assert!(map.entries().iter().all(|e| e.magnitude >= MIN_GAIN_THRESHOLD));
    }
}
