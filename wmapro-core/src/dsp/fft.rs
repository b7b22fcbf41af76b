// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-point split-radix complex FFT for sizes 4 through 4096.
//!
//! With the input pre-permuted through [`bit_reverse`], [`fft`] computes the unnormalized
//! inverse DFT `X[k] = sum(x[n] * exp(2*pi*i*n*k/N))`. Twiddles are Q1.31; butterflies are
//! unscaled, so the caller is responsible for input headroom.

use lazy_static::lazy_static;

use crate::dsp::math::{mul31, xnprod31, xprod31};

/// A fixed-point complex number.
#[derive(Copy, Clone, Default, Debug)]
pub struct Complex {
    pub re: i32,
    pub im: i32,
}

/// The maximum supported FFT size.
pub const MAX_FFT_SIZE: usize = 4096;

/// cos(pi/8) in Q1.31.
const C_PI1_8: i32 = 0x7641af3d;
/// cos(2pi/8) = 1/sqrt(2) in Q1.31.
const C_PI2_8: i32 = 0x5a82799a;
/// cos(3pi/8) in Q1.31.
const C_PI3_8: i32 = 0x30fbc54d;

fn split_radix_permutation(i: usize, n: usize) -> i32 {
    if n <= 2 {
        return (i & 1) as i32;
    }

    let mut m = n >> 1;
    if i & m == 0 {
        return split_radix_permutation(i, m) * 2;
    }

    m >>= 1;
    // Inverse transform ordering.
    if i & m != 0 {
        split_radix_permutation(i, m) * 4 - 1
    }
    else {
        split_radix_permutation(i, m) * 4 + 1
    }
}

lazy_static! {
    /// Interleaved (sin, cos) pairs in Q1.31 for the angles `i * pi / 2048`, i = 0..=512,
    /// covering the first eighth of the circle. The twiddle pass walks it forward and then
    /// backward with swapped sin/cos roles to cover the first quarter.
    static ref SINCOS_LOOKUP0: [i32; 1026] = {
        let mut table = [0i32; 1026];
        for i in 0..=512usize {
            let angle = std::f64::consts::PI * (i as f64) / 2048.0;
            let s = (angle.sin() * 2147483648.0).round();
            let c = (angle.cos() * 2147483648.0).round();
            table[2 * i] = s.min(2147483647.0) as i32;
            table[2 * i + 1] = c.min(2147483647.0) as i32;
        }
        table
    };

    /// Split-radix input permutation for the maximum FFT size. Smaller sizes use the same
    /// table shifted down: `REVTAB[k] >> (12 - log2(n))`.
    static ref REVTAB: [u16; MAX_FFT_SIZE] = {
        let mut table = [0u16; MAX_FFT_SIZE];
        for i in 0..MAX_FFT_SIZE {
            let j = (-split_radix_permutation(i, MAX_FFT_SIZE)) as usize & (MAX_FFT_SIZE - 1);
            table[j] = i as u16;
        }
        table
    };
}

/// Input permutation for the maximum FFT size. For an FFT of `n` points, natural-order
/// element `k` belongs at index `bit_reverse(k) >> (12 - log2(n))`.
#[inline]
pub fn bit_reverse(k: usize) -> usize {
    usize::from(REVTAB[k])
}

#[inline(always)]
fn butterflies(z: &mut [Complex], zi: usize, n: usize, t1: i32, t2: i32, t5: i32, t6: i32) {
    {
        let temp1 = t5.wrapping_sub(t1);
        let temp2 = t5.wrapping_add(t1);
        let a0re = z[zi].re;
        let a1im = z[zi + n].im;
        z[zi + 2 * n].re = a0re.wrapping_sub(temp2);
        z[zi].re = a0re.wrapping_add(temp2);
        z[zi + 3 * n].im = a1im.wrapping_sub(temp1);
        z[zi + n].im = a1im.wrapping_add(temp1);
    }
    {
        let temp1 = t2.wrapping_sub(t6);
        let temp2 = t2.wrapping_add(t6);
        let a1re = z[zi + n].re;
        let a0im = z[zi].im;
        z[zi + 3 * n].re = a1re.wrapping_sub(temp1);
        z[zi + n].re = a1re.wrapping_add(temp1);
        z[zi + 2 * n].im = a0im.wrapping_sub(temp2);
        z[zi].im = a0im.wrapping_add(temp2);
    }
}

#[inline(always)]
fn transform(z: &mut [Complex], zi: usize, n: usize, wre: i32, wim: i32) {
    let (t1, t2) = xprod31(z[zi + 2 * n].re, z[zi + 2 * n].im, wre, wim);
    let (t5, t6) = xnprod31(z[zi + 3 * n].re, z[zi + 3 * n].im, wre, wim);
    butterflies(z, zi, n, t1, t2, t5, t6);
}

#[inline(always)]
fn transform_w01(z: &mut [Complex], zi: usize, n: usize, w: usize) {
    transform(z, zi, n, SINCOS_LOOKUP0[w], SINCOS_LOOKUP0[w + 1]);
}

#[inline(always)]
fn transform_w10(z: &mut [Complex], zi: usize, n: usize, w: usize) {
    transform(z, zi, n, SINCOS_LOOKUP0[w + 1], SINCOS_LOOKUP0[w]);
}

#[inline(always)]
fn transform_equal(z: &mut [Complex], zi: usize, n: usize) {
    let t2 = mul31(z[zi + 2 * n].re, C_PI2_8);
    let temp1 = mul31(z[zi + 2 * n].im, C_PI2_8);
    let temp2 = mul31(z[zi + 3 * n].re, C_PI2_8);
    let t5 = mul31(z[zi + 3 * n].im, C_PI2_8);

    let t1 = temp1.wrapping_add(t2);
    let t2 = temp1.wrapping_sub(t2);
    let t6 = temp2.wrapping_add(t5);
    let t5 = temp2.wrapping_sub(t5);

    butterflies(z, zi, n, t1, t2, t5, t6);
}

#[inline(always)]
fn transform_zero(z: &mut [Complex], zi: usize, n: usize) {
    let t1 = z[zi + 2 * n].re;
    let t2 = z[zi + 2 * n].im;
    let t5 = z[zi + 3 * n].re;
    let t6 = z[zi + 3 * n].im;
    butterflies(z, zi, n, t1, t2, t5, t6);
}

/// One split-radix twiddle pass over `z[0..4n]`, walking the sin/cos table forward through the
/// first eighth of the circle and then backward with swapped roles for the second.
fn pass(z: &mut [Complex], step: usize, n: usize) {
    let mut zi = 1;
    let mut w = step;

    // The first transform is twiddle free.
    transform_zero(z, 0, n);
    transform_w10(z, zi, n, w);
    w += step;

    loop {
        zi += 1;
        transform_w10(z, zi, n, w);
        w += step;
        zi += 1;
        transform_w10(z, zi, n, w);
        w += step;
        if w >= 1024 {
            break;
        }
    }

    while w > 0 {
        zi += 1;
        transform_w01(z, zi, n, w);
        w -= step;
        zi += 1;
        transform_w01(z, zi, n, w);
        w -= step;
    }
}

fn fft4(z: &mut [Complex]) {
    let t3 = z[0].re.wrapping_sub(z[1].re);
    let t1 = z[0].re.wrapping_add(z[1].re);
    let t8 = z[3].re.wrapping_sub(z[2].re);
    let t6 = z[3].re.wrapping_add(z[2].re);

    z[2].re = t1.wrapping_sub(t6);
    z[0].re = t1.wrapping_add(t6);

    let t4 = z[0].im.wrapping_sub(z[1].im);
    let t2 = z[0].im.wrapping_add(z[1].im);
    let t7 = z[2].im.wrapping_sub(z[3].im);
    let t5 = z[2].im.wrapping_add(z[3].im);

    z[3].im = t4.wrapping_sub(t8);
    z[1].im = t4.wrapping_add(t8);
    z[3].re = t3.wrapping_sub(t7);
    z[1].re = t3.wrapping_add(t7);
    z[2].im = t2.wrapping_sub(t5);
    z[0].im = t2.wrapping_add(t5);
}

fn fft8(z: &mut [Complex]) {
    fft4(z);

    let t1 = z[4].re.wrapping_add(z[5].re);
    z[5].re = z[4].re.wrapping_sub(z[5].re);
    let t2 = z[4].im.wrapping_add(z[5].im);
    z[5].im = z[4].im.wrapping_sub(z[5].im);
    let t3 = z[6].re.wrapping_add(z[7].re);
    z[7].re = z[6].re.wrapping_sub(z[7].re);
    let t4 = z[6].im.wrapping_add(z[7].im);
    z[7].im = z[6].im.wrapping_sub(z[7].im);

    let t8 = t3.wrapping_sub(t1);
    let t1 = t3.wrapping_add(t1);
    let t7 = t2.wrapping_sub(t4);
    let t2 = t2.wrapping_add(t4);

    z[4].re = z[0].re.wrapping_sub(t1);
    z[0].re = z[0].re.wrapping_add(t1);
    z[4].im = z[0].im.wrapping_sub(t2);
    z[0].im = z[0].im.wrapping_add(t2);
    z[6].re = z[2].re.wrapping_sub(t7);
    z[2].re = z[2].re.wrapping_add(t7);
    z[6].im = z[2].im.wrapping_sub(t8);
    z[2].im = z[2].im.wrapping_add(t8);

    transform_equal(z, 1, 2);
}

fn fft16(z: &mut [Complex]) {
    fft8(&mut z[..8]);
    fft4(&mut z[8..12]);
    fft4(&mut z[12..16]);

    transform_zero(z, 0, 4);
    transform_equal(z, 2, 4);
    transform(z, 1, 4, C_PI1_8, C_PI3_8);
    transform(z, 3, 4, C_PI3_8, C_PI1_8);
}

/// In-place FFT over a split-radix permuted input. The length of `z` must be a power of two
/// within 4..=4096.
pub fn fft(z: &mut [Complex]) {
    let n = z.len();
    debug_assert!(n.is_power_of_two());
    debug_assert!(n >= 4 && n <= MAX_FFT_SIZE);

    match n {
        4 => fft4(z),
        8 => fft8(z),
        16 => fft16(z),
        _ => {
            let n4 = n / 4;
            let (head, tail) = z.split_at_mut(2 * n4);
            fft(head);
            let (q2, q3) = tail.split_at_mut(n4);
            fft(q2);
            fft(q3);
            pass(z, 8192 / n, n4);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64;

    /// Compute a naive unnormalized inverse DFT in f64.
    fn idft_naive(x: &[Complex]) -> Vec<(f64, f64)> {
        let n = x.len();
        let theta = 2.0 * f64::consts::PI / n as f64;

        (0..n)
            .map(|k| {
                let mut re = 0.0;
                let mut im = 0.0;
                for (j, &x) in x.iter().enumerate() {
                    let w = theta * (k * j % n) as f64;
                    let (wre, wim) = (w.cos(), w.sin());
                    re += f64::from(x.re) * wre - f64::from(x.im) * wim;
                    im += f64::from(x.re) * wim + f64::from(x.im) * wre;
                }
                (re, im)
            })
            .collect()
    }

    /// Deterministic pseudo-random test signal.
    fn test_signal(n: usize, seed: u32) -> Vec<Complex> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                let re = (state >> 12) as i32 - (1 << 19);
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                let im = (state >> 12) as i32 - (1 << 19);
                Complex { re, im }
            })
            .collect()
    }

    fn permute(x: &[Complex]) -> Vec<Complex> {
        let bits = x.len().ilog2();
        let mut z = vec![Complex::default(); x.len()];
        for (k, &v) in x.iter().enumerate() {
            z[bit_reverse(k) >> (12 - bits)] = v;
        }
        z
    }

    #[test]
    fn verify_revtab_is_permutation() {
        let mut seen = [false; MAX_FFT_SIZE];
        for k in 0..MAX_FFT_SIZE {
            seen[bit_reverse(k)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn verify_revtab_known_values() {
        const EXPECTED: [usize; 16] =
            [0, 3072, 1536, 2816, 768, 3840, 1408, 2432, 384, 3456, 1920, 2752, 704, 3776, 1216, 2240];
        for (k, &e) in EXPECTED.iter().enumerate() {
            assert_eq!(bit_reverse(k), e);
        }
    }

    #[test]
    fn verify_fft_against_naive_idft() {
        for &n in &[4usize, 8, 16, 32, 64, 128, 256] {
            let x = test_signal(n, 0xc0de + n as u32);
            let expected = idft_naive(&x);

            let mut z = permute(&x);
            fft(&mut z);

            for (a, &(ere, eim)) in z.iter().zip(expected.iter()) {
                let tol = 32.0 * n as f64 + 1024.0;
                assert!(
                    (f64::from(a.re) - ere).abs() < tol,
                    "re mismatch at n={}: {} vs {}", n, a.re, ere
                );
                assert!(
                    (f64::from(a.im) - eim).abs() < tol,
                    "im mismatch at n={}: {} vs {}", n, a.im, eim
                );
            }
        }
    }

    #[test]
    fn verify_fft_impulse() {
        // An impulse at bin 0 transforms to a constant.
        for &n in &[64usize, 512, 2048, 4096] {
            let mut x = vec![Complex::default(); n];
            x[0] = Complex { re: 1 << 16, im: 0 };

            let mut z = permute(&x);
            fft(&mut z);

            for a in z.iter() {
                assert!((a.re - (1 << 16)).abs() <= 64, "impulse re at n={}", n);
                assert!(a.im.abs() <= 64, "impulse im at n={}", n);
            }
        }
    }
}
