//! Immutable precomputed periodic and windowing tables.

use crate::Sample;

/// Distinguishes the two families of table: *periodic* tables are filled
/// over one period `[0, 2π)` and are meant to be read back by an
/// oscillator; *windowing* tables are filled at the raw sample index
/// `0..S-1` and are meant to be multiplied elementwise against a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Periodic,
    Windowing,
}

/// A length-`S` array of `T`, `S` a power of two.
#[derive(Debug, Clone)]
pub struct WaveTable<T: Sample> {
    data: Vec<T>,
}

impl<T: Sample> WaveTable<T> {
    /// Builds a table of `size` entries by evaluating `f` at each index's
    /// generating argument, per `kind`.
    pub fn generate(size: usize, kind: TableKind, f: impl Fn(T) -> T) -> Self {
        debug_assert!(size.is_power_of_two(), "table size must be a power of two");
        let two_pi = T::from(std::f64::consts::TAU).unwrap();
        let size_t = T::from(size).unwrap();
        let data = (0..size)
            .map(|k| {
                let k_t = T::from(k).unwrap();
                let arg = match kind {
                    TableKind::Periodic => two_pi * k_t / size_t,
                    TableKind::Windowing => k_t,
                };
                f(arg)
            })
            .collect();
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bounds-checked read.
    #[inline]
    pub fn get(&self, idx: usize) -> T {
        self.data[idx]
    }

    /// Unchecked read for the oscillator hot path. Caller must guarantee
    /// `idx < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, idx: usize) -> T {
        *self.data.get_unchecked(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Writes `table[S-1] := table[0]`, letting an oscillator's linear
    /// interpolator address `table[idx+1]` at `idx = S-1` without a wrap
    /// branch. Must be called exactly once on any periodic table used as an
    /// oscillator source.
    pub fn equalize_end_and_begin(&mut self) {
        let last = self.data.len() - 1;
        self.data[last] = self.data[0];
    }
}

impl<T: Sample> WaveTable<T> {
    pub fn sine(size: usize) -> Self {
        let mut table = Self::generate(size, TableKind::Periodic, |theta| theta.sin());
        table.equalize_end_and_begin();
        table
    }

    pub fn square(size: usize) -> Self {
        let pi = T::from(std::f64::consts::PI).unwrap();
        let mut table = Self::generate(size, TableKind::Periodic, move |theta| {
            if theta < pi {
                -T::one()
            } else {
                T::one()
            }
        });
        table.equalize_end_and_begin();
        table
    }

    /// `θ/π - 1` over one period, the self-consistent member of the two
    /// variants a ramp like this can be built from (the other, `1 - 2θ/π`,
    /// runs from `1` down to `-3` rather than spanning `[-1, 1]`).
    pub fn saw(size: usize) -> Self {
        let pi = T::from(std::f64::consts::PI).unwrap();
        let mut table =
            Self::generate(size, TableKind::Periodic, move |theta| theta / pi - T::one());
        table.equalize_end_and_begin();
        table
    }

    /// Piecewise linear over quarters of `[0, 2π)`, peaks at `±1`.
    pub fn triangle(size: usize) -> Self {
        let pi = T::from(std::f64::consts::PI).unwrap();
        let quarter = pi / T::from(2.0).unwrap();
        let one = T::one();
        let three = T::from(3.0).unwrap();
        let mut table = Self::generate(size, TableKind::Periodic, move |theta| {
            let q = theta / quarter;
            if q < one {
                q
            } else if q < three {
                one - (q - one)
            } else {
                -one + (q - three)
            }
        });
        table.equalize_end_and_begin();
        table
    }

    pub fn hann(size: usize) -> Self {
        let denom = T::from(size - 1).unwrap();
        let two_pi = T::from(std::f64::consts::TAU).unwrap();
        let half = T::from(0.5).unwrap();
        Self::generate(size, TableKind::Windowing, move |k| {
            half * (T::one() - (two_pi * k / denom).cos())
        })
    }

    pub fn hamming(size: usize) -> Self {
        let denom = T::from(size - 1).unwrap();
        let two_pi = T::from(std::f64::consts::TAU).unwrap();
        let a0 = T::from(0.54).unwrap();
        let a1 = T::from(0.46).unwrap();
        Self::generate(size, TableKind::Windowing, move |k| {
            a0 - a1 * (two_pi * k / denom).cos()
        })
    }

    /// Symmetric triangular window, peak at the center: `1 - |2k/(S-1) - 1|`.
    pub fn bartlett(size: usize) -> Self {
        let denom = T::from(size - 1).unwrap();
        let two = T::from(2.0).unwrap();
        Self::generate(size, TableKind::Windowing, move |k| {
            T::one() - (two * k / denom - T::one()).abs()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn equalize_end_and_begin_is_bit_exact() {
        for size in [16usize, 32, 64, 256, 1024] {
            let table = WaveTable::<f32>::sine(size);
            assert_eq!(table.get(size - 1), table.get(0));
            let table = WaveTable::<f32>::saw(size);
            assert_eq!(table.get(size - 1), table.get(0));
        }
    }

    #[test]
    fn saw_spans_unit_range() {
        let table = WaveTable::<f32>::generate(256, TableKind::Periodic, |theta| {
            theta / std::f32::consts::PI - 1.0
        });
        let min = table.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = table.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(approx_eq!(f32, min, -1.0, epsilon = 1e-3));
        assert!(max <= 1.0 + 1e-3);
    }

    #[test]
    fn triangle_peaks_at_unity() {
        let table = WaveTable::<f32>::triangle(256);
        let max = table.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min = table.iter().cloned().fold(f32::INFINITY, f32::min);
        assert!(approx_eq!(f32, max, 1.0, epsilon = 1e-2));
        assert!(approx_eq!(f32, min, -1.0, epsilon = 1e-2));
    }

    #[test]
    fn hann_is_zero_at_edges() {
        let table = WaveTable::<f32>::hann(256);
        assert!(approx_eq!(f32, table.get(0), 0.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, table.get(255), 0.0, epsilon = 1e-6));
    }
}
