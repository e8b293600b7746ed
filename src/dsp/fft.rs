//! In-place radix-2 Cooley-Tukey FFT.

use crate::dsp::twiddle::TwiddleLut;
use crate::Sample;
use num_complex::Complex;

/// Performs the forward FFT of `data` in place. `data.len()` must be a
/// power of two; the caller (the FFT worker) owns a `TwiddleLut` sized for
/// the fixed window length and passes it in so the LUT is built once and
/// reused across analysis passes.
pub fn fft_in_place<T: Sample>(data: &mut [Complex<T>], twiddles: &mut TwiddleLut<T>) {
    let n = data.len();
    if n <= 1 {
        return;
    }
    debug_assert!(n.is_power_of_two(), "FFT size must be a power of two");

    bit_reverse_permute(data);

    let log2n = n.trailing_zeros() as usize;
    for s in 1..=log2n {
        let m = 1usize << s;
        let half_m = m / 2;
        twiddles.select_for_stage(s);
        let mut r = 0;
        while r < n {
            for k in 0..half_m {
                // SAFETY: k < half_m == m/2, the array selected for stage s.
                let twiddle = unsafe { twiddles.get_unchecked(k) };
                let top = r + k;
                let bottom = top + half_m;
                let tau = twiddle * data[bottom];
                data[bottom] = data[top] - tau;
                data[top] += tau;
            }
            r += m;
        }
    }
}

/// Swaps `data[j]` and `data[r]` wherever `j < r` and `r` is the bit
/// reversal of `j` over `log2(data.len())` bits.
fn bit_reverse_permute<T: Sample>(data: &mut [Complex<T>]) {
    let n = data.len();
    let bits = n.trailing_zeros();
    for j in 0..n {
        let mut r = 0usize;
        let mut v = j;
        for _ in 0..bits {
            r = (r << 1) | (v & 1);
            v >>= 1;
        }
        if j < r {
            data.swap(j, r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn sinusoid(n: usize, bin: usize) -> Vec<Complex<f32>> {
        (0..n)
            .map(|i| Complex::new((TAU * bin as f32 * i as f32 / n as f32).sin(), 0.0))
            .collect()
    }

    #[test]
    fn peak_bin_matches_input_frequency() {
        for n in [16usize, 32, 64, 128, 256, 512, 1024, 2048] {
            let bin = (n / 32).max(1);
            let mut data = sinusoid(n, bin);
            let mut twiddles = TwiddleLut::<f32>::new();
            fft_in_place(&mut data, &mut twiddles);

            let (peak_bin, _) = data[0..n / 2]
                .iter()
                .enumerate()
                .map(|(k, c)| (k, c.norm()))
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
                .unwrap();
            assert_eq!(peak_bin, bin, "n={n}");
        }
    }
}
