// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inverse quantization: every scale factor band is rescaled by `10^(e/20)`, decomposed into
//! a table mantissa, a power of five, and a shift.

use wmapro_core::util::bits::ilog2;

use crate::decoder::WmaProDecoder;
use crate::tables::{QUANT_EXP2, QUANT_MANT_Q30};

/// 2/5 in Q0.32, used to fold negative powers of ten into the mantissa.
const Q32_TWO_FIFTHS: i64 = 0x6666_6666;

/// Exponents past this magnitude quantize to silence or saturation either way.
const MAX_EXPONENT: i32 = 399;

/// Rescale one band of Q32.32 coefficients into the IMDCT input.
///
/// The scalar is `10^(exp/20) * 2^-base`. With `exp = 20q + r`, it decomposes into
/// `QUANT_MANT_Q30[r] * 2^QUANT_EXP2[r] * 5^q * 2^q`, leaving a 64-bit multiply, an integer
/// power of five, and a shift per coefficient.
fn dequant_band(dst: &mut [i32], src: &[i64], exp: i32, base: i32) {
    let exp = exp.clamp(-MAX_EXPONENT, MAX_EXPONENT);
    let q = exp.div_euclid(20);
    let r = exp.rem_euclid(20) as usize;

    let mut mant = i64::from(QUANT_MANT_Q30[r]);
    let mut shift = base - i32::from(QUANT_EXP2[r]) - q;

    let five: i128 = if q > 0 {
        5i128.pow(q as u32)
    }
    else {
        // Negative powers of ten scale the mantissa down by 2/5 per step; the factored-out
        // powers of two migrate into the shift.
        shift -= q;
        for _ in 0..-q {
            mant = (mant * Q32_TWO_FIFTHS) >> 32;
        }
        1
    };

    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        let mut t = (i128::from(s) * i128::from(mant)) >> 31;
        t *= five;

        // With the exponent clamped, the left shift is bounded by 15 and cannot overflow the
        // 128-bit intermediate.
        let v = if shift >= 0 { t >> shift.min(127) } else { t << (-shift).min(16) };

        *d = v.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32;
    }
}

impl WmaProDecoder {
    /// Inverse quantize and rescale channel `c`'s coefficients into the shared spectrum
    /// scratch buffer, band by band.
    pub(crate) fn dequantize_channel(&mut self, c: usize) {
        // The rescale folds in the transform normalization so the windowed output lands at
        // Q27, ready for the final shift to 16-bit samples.
        let base = ilog2(self.subframe_len as u64) as i32 + self.bits_per_sample as i32;

        let quant_step = self.channel[c].quant_step;
        let step = self.channel[c].scale_factor_step;
        let max_sf = self.channel[c].max_scale_factor;
        let bank = self.channel[c].cur_sf_bank;

        let scratch = &mut self.scratch;
        let ch = &self.channel[c];

        for b in 0..self.num_bands {
            let start = usize::from(self.sfb_offsets[self.table_idx][b]);
            let end = usize::from(self.sfb_offsets[self.table_idx][b + 1]).min(self.subframe_len);

            if start >= end {
                continue;
            }

            let exp = quant_step - (max_sf - ch.saved_scale_factors[bank][b]) * step;

            dequant_band(&mut scratch[start..end], &ch.coeffs[start..end], exp, base);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The fixed-point scalar must track `10^(exp/20) * 2^(31 - base)` in f64.
    #[test]
    fn verify_dequant_scalar() {
        for exp in [-120i32, -40, -1, 0, 1, 19, 20, 45, 90, 110] {
            for base in [27i32, 30, 36] {
                let value = 1000i64 << 32;
                let mut out = [0i32; 1];

                dequant_band(&mut out, &[value], exp, base);

                let expected =
                    1000.0 * 10f64.powf(f64::from(exp) / 20.0) * 2f64.powi(31 - base);

                if expected >= f64::from(1 << 30) {
                    // Out of the representable range; saturation is checked separately.
                    continue;
                }

                let got = f64::from(out[0]);

                // Truncating arithmetic bounds the absolute error by a couple of steps; the
                // relative bound takes over once outputs are large.
                let rel = (got - expected).abs() / expected.max(1.0);
                assert!(
                    rel < 1e-4 || (got - expected).abs() <= 2.0,
                    "exp={} base={}: {} vs {}",
                    exp,
                    base,
                    got,
                    expected
                );
            }
        }
    }

    #[test]
    fn verify_dequant_saturates() {
        // A huge coefficient with a large positive exponent must clamp, not wrap.
        let value = i64::MAX / 2;
        let mut out = [0i32; 1];

        dequant_band(&mut out, &[value], 399, 7);
        assert_eq!(out[0], i32::MAX);

        dequant_band(&mut out, &[-value], 399, 7);
        assert_eq!(out[0], i32::MIN);
    }

    #[test]
    fn verify_dequant_zero_passthrough() {
        let mut out = [123i32; 4];
        dequant_band(&mut out, &[0, 0, 0, 0], 90, 27);
        assert_eq!(out, [0; 4]);
    }
}
