// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-point half-IMDCT computed by pre-rotation, complex FFT, and post-rotation.

use crate::dsp::cordic;
use crate::dsp::fft::{bit_reverse, fft, Complex};
use crate::dsp::math::cmul31;

/// The inverse MDCT for one transform size N = `2^bits`.
///
/// Computes the middle half of the inverse MDCT, excluding the parts that can be derived by
/// symmetry: N/2 input coefficients produce the N/2 output samples used by the windowed
/// overlap-add. The two reflected halves are reconstructed implicitly by the windowing step.
///
/// The two Q1.31 rotations each keep one bit of headroom, so the output carries a fixed gain
/// of -1/4 relative to the unnormalized mathematical transform. The windowed overlap-add is
/// polarity agnostic, so the sign cancels out of the reconstruction.
pub struct Imdct {
    bits: u32,
    tcos: Vec<i32>,
    tsin: Vec<i32>,
    z: Vec<Complex>,
}

impl Imdct {
    /// Instantiate the transform for size `N = 2^bits`. `bits` must be in 4..=13.
    pub fn new(bits: u32) -> Self {
        assert!(bits >= 4 && bits <= 13);

        let n = 1usize << bits;
        let n4 = n >> 2;

        let mut tcos = Vec::with_capacity(n4);
        let mut tsin = Vec::with_capacity(n4);

        // Twiddles at the angles (i + 0.125) * 2pi / N, negated for the rotation direction
        // used below.
        for i in 0..n4 as u32 {
            let alpha =
                (0xffff_ffffu32 >> bits).wrapping_mul(i).wrapping_add(0xffff_ffff >> (bits + 3));

            let (s, c) = cordic::sincos(alpha);
            tsin.push(s.wrapping_neg());
            tcos.push(c.wrapping_neg());
        }

        Imdct { bits, tcos, tsin, z: vec![Complex::default(); n4] }
    }

    /// The number of samples the transform spans: N.
    pub fn size(&self) -> usize {
        1 << self.bits
    }

    /// Compute the half inverse MDCT of `input` into `output`. Both must be N/2 long.
    pub fn imdct_half(&mut self, input: &[i32], output: &mut [i32]) {
        let n = 1usize << self.bits;
        let n2 = n >> 1;
        let n4 = n >> 2;
        let n8 = n >> 3;

        assert_eq!(input.len(), n2);
        assert_eq!(output.len(), n2);

        let revtab_shift = 14 - self.bits;

        let z = &mut self.z;
        let tcos = &self.tcos;
        let tsin = &self.tsin;

        // Pre rotation into split-radix permuted order.
        for k in 0..n4 {
            let j = bit_reverse(k) >> revtab_shift;

            let in1 = input[2 * k];
            let in2 = input[n2 - 1 - 2 * k];

            let (re, im) = cmul31(in2, in1, tcos[k], tsin[k]);
            z[j] = Complex { re, im };
        }

        fft(&mut z[..n4]);

        // Post rotation + reordering.
        for k in 0..n8 {
            let (r0, i1) =
                cmul31(z[n8 - k - 1].im, z[n8 - k - 1].re, tsin[n8 - k - 1], tcos[n8 - k - 1]);
            let (r1, i0) = cmul31(z[n8 + k].im, z[n8 + k].re, tsin[n8 + k], tcos[n8 + k]);

            z[n8 - k - 1] = Complex { re: r0, im: i0 };
            z[n8 + k] = Complex { re: r1, im: i1 };
        }

        for (k, zz) in z[..n4].iter().enumerate() {
            output[2 * k] = zz.re;
            output[2 * k + 1] = zz.im;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Imdct;
    use std::f64;

    /// The unnormalized mathematical half-IMDCT: the middle half of the full inverse MDCT.
    fn imdct_half_naive(input: &[i32], n: usize) -> Vec<f64> {
        let theta = 2.0 * f64::consts::PI / n as f64;

        (0..n / 2)
            .map(|j| {
                input
                    .iter()
                    .enumerate()
                    .map(|(k, &x)| {
                        let phase = theta * (j as f64 + 0.5 + n as f64 / 2.0) * (k as f64 + 0.5);
                        f64::from(x) * phase.cos()
                    })
                    .sum()
            })
            .collect()
    }

    fn test_coeffs(n2: usize, seed: u32) -> Vec<i32> {
        let mut state = seed;
        (0..n2)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                (state >> 8) as i32 - (1 << 23)
            })
            .collect()
    }

    #[test]
    fn verify_imdct_half_against_naive() {
        for &bits in &[5u32, 6, 8, 10] {
            let n = 1usize << bits;

            let input = test_coeffs(n / 2, 0x1234 + bits);
            let mut output = vec![0i32; n / 2];

            let mut imdct = Imdct::new(bits);
            imdct.imdct_half(&input, &mut output);

            let expected = imdct_half_naive(&input, n);

            let peak = expected.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
            let tol = (peak / 4.0) * 1e-4 + 64.0 * n as f64;

            // The fixed pipeline computes -1/4 of the unnormalized transform.
            for (j, (&got, &want)) in output.iter().zip(expected.iter()).enumerate() {
                let err = (f64::from(got) + want / 4.0).abs();
                assert!(
                    err < tol,
                    "bits={} j={}: got {} want {} (tol {})", bits, j, got, -want / 4.0, tol
                );
            }
        }
    }

    #[test]
    fn verify_imdct_linearity() {
        // Doubling the input doubles the output, within rounding.
        let bits = 7u32;
        let n = 1usize << bits;

        let input = test_coeffs(n / 2, 77);
        let halved: Vec<i32> = input.iter().map(|&v| v / 2).collect();

        let mut out_a = vec![0i32; n / 2];
        let mut out_b = vec![0i32; n / 2];

        let mut imdct = Imdct::new(bits);
        imdct.imdct_half(&input, &mut out_a);
        imdct.imdct_half(&halved, &mut out_b);

        for (&a, &b) in out_a.iter().zip(out_b.iter()) {
            assert!((i64::from(a) - 2 * i64::from(b)).abs() < 4096);
        }
    }
}
