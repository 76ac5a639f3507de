//! Discrete linear convolution with `"full"` and `"same"` output modes.
//!
//! `convolve_full`  — length `n + m - 1`, matches `numpy.convolve(mode="full")`.
//! `convolve_same`  — length `n`, centred slice of the full result, matches
//!                    `scipy.signal.convolve(mode="same")`.
//!
//! Small problems are summed directly. Once `n × m` exceeds
//! [`DIRECT_LIMIT`] the product is formed in the frequency domain with a
//! single zero-padded FFT, which is what scipy's `method="auto"` picks for
//! the same sizes.
use rustfft::{num_complex::Complex, FftPlanner};

/// Above this many multiply-adds the FFT path is used.
pub const DIRECT_LIMIT: usize = 1 << 16;

/// Full linear convolution of `x` with `h`.
///
/// Returns an empty vector when either input is empty.
pub fn convolve_full(x: &[f64], h: &[f64]) -> Vec<f64> {
    if x.is_empty() || h.is_empty() {
        return vec![];
    }
    if x.len().saturating_mul(h.len()) <= DIRECT_LIMIT {
        direct_full(x, h)
    } else {
        fft_full(x, h)
    }
}

/// Same-length convolution, centred on `x`.
///
/// For a kernel of length `m` the output is `full[(m-1)/2 .. (m-1)/2 + n]`.
pub fn convolve_same(x: &[f64], h: &[f64]) -> Vec<f64> {
    let full = convolve_full(x, h);
    if full.is_empty() {
        return full;
    }
    let start = (h.len() - 1) / 2;
    full[start..start + x.len()].to_vec()
}

fn direct_full(x: &[f64], h: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0_f64; x.len() + h.len() - 1];
    for (i, &xi) in x.iter().enumerate() {
        if xi == 0.0 {
            continue;
        }
        for (j, &hj) in h.iter().enumerate() {
            out[i + j] += xi * hj;
        }
    }
    out
}

fn fft_full(x: &[f64], h: &[f64]) -> Vec<f64> {
    let n_out = x.len() + h.len() - 1;
    let n_fft = n_out.next_power_of_two();

    let mut planner: FftPlanner<f64> = FftPlanner::new();
    let fwd = planner.plan_fft_forward(n_fft);
    let inv = planner.plan_fft_inverse(n_fft);

    let mut xf = zero_padded(x, n_fft);
    let mut hf = zero_padded(h, n_fft);
    fwd.process(&mut xf);
    fwd.process(&mut hf);

    for (a, &b) in xf.iter_mut().zip(hf.iter()) {
        *a *= b;
    }
    inv.process(&mut xf);

    let inv_scale = 1.0 / n_fft as f64;
    xf[..n_out].iter().map(|c| c.re * inv_scale).collect()
}

fn zero_padded(x: &[f64], n_fft: usize) -> Vec<Complex<f64>> {
    x.iter()
        .map(|&v| Complex { re: v, im: 0.0 })
        .chain(std::iter::repeat(Complex::default()))
        .take(n_fft)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_matches_hand_computation() {
        let y = convolve_full(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]);
        assert_eq!(y, vec![0.0, 1.0, 2.5, 4.0, 1.5]);
    }

    #[test]
    fn same_is_centred() {
        // odd kernel: centre tap at index 1
        let y = convolve_same(&[0.0, 0.0, 1.0, 0.0, 0.0], &[1.0, 2.0, 3.0]);
        assert_eq!(y, vec![0.0, 1.0, 2.0, 3.0, 0.0]);
        // even kernel: scipy keeps full[(m-1)/2 ..]
        let y = convolve_same(&[0.0, 1.0, 0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(y, vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn empty_inputs() {
        assert!(convolve_full(&[], &[1.0]).is_empty());
        assert!(convolve_same(&[1.0, 2.0], &[]).is_empty());
    }

    #[test]
    fn fft_path_agrees_with_direct() {
        let x: Vec<f64> = (0..3000).map(|i| ((i * 7 % 13) as f64 - 6.0) * 0.1).collect();
        let h: Vec<f64> = (0..41).map(|i| (i as f64 * 0.3).cos()).collect();
        assert!(x.len() * h.len() > DIRECT_LIMIT);

        let fast = fft_full(&x, &h);
        let slow = direct_full(&x, &h);
        assert_eq!(fast.len(), slow.len());
        for (a, b) in fast.iter().zip(slow.iter()) {
            approx::assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }
}
