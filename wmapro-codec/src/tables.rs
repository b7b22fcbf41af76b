// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constant data: critical band edges, dequantizer mantissas, and the default decorrelation
//! matrices.

/// Bark scale critical band edges in Hz. The scale factor band layout for every block size is
/// derived from these at decoder init.
pub(crate) const CRITICAL_FREQS: [u16; 25] = [
    100, 200, 300, 400, 510, 630, 770, 920, 1080, 1270, 1480, 1720, 2000, 2320, 2700, 3150,
    3700, 4400, 5300, 6400, 7700, 9500, 12000, 15500, 24500,
];

/// Dequantizer mantissas: `10^(r/20) = QUANT_MANT_Q30[r] / 2^30 * 2^QUANT_EXP2[r]` for
/// r in 0..20, with the mantissa normalized to [1, 2).
pub(crate) const QUANT_MANT_Q30: [i32; 20] = [
    0x40000000, 0x47cf267e, 0x50923be4, 0x5a6703e0, 0x656ee3db,
    0x71cf5471, 0x7fb260b5, 0x47a39a83, 0x50615fa7, 0x5a303167,
    0x653160eb, 0x718a5017, 0x7f64f07d, 0x477828f1, 0x5030a10c,
    0x59f9802d, 0x64f40349, 0x71457597, 0x7f17af3b, 0x474cd1b8,
];

pub(crate) const QUANT_EXP2: [u8; 20] = [
    0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 3,
];

pub(crate) const DEF_DECORRELATION_3: [i32; 9] = [
    1239850262, 1239850262, 1239850262, 1518500250, 0, -1518500250,
    876706528, -1753413056, 876706528,
];

pub(crate) const DEF_DECORRELATION_4: [i32; 16] = [
    1073741824, 1073741824, 1073741824, 1073741824, 1402911301, 581104888,
    -581104888, -1402911301, 1073741824, -1073741824, -1073741824, 1073741824,
    581104888, -1402911301, 1402911301, -581104888,
];

pub(crate) const DEF_DECORRELATION_5: [i32; 25] = [
    960383883, 960383883, 960383883, 960383883, 960383883, 1291713465,
    798322825, 0, -798322825, -1291713465, 1098797103, -419703147,
    -1358187913, -419703147, 1098797103, 798322825, -1291713465, 0,
    1291713465, -798322825, 419703147, -1098797103, 1358187913, -1098797103,
    419703147,
];

pub(crate) const DEF_DECORRELATION_6: [i32; 36] = [
    876706528, 876706528, 876706528, 876706528, 876706528, 876706528,
    1197603389, 876706528, 320896861, -320896861, -876706528, -1197603389,
    1073741824, 0, -1073741824, -1073741824, 0, 1073741824,
    876706528, -876706528, -876706528, 876706528, 876706528, -876706528,
    619925131, -1239850262, 619925131, 619925131, -1239850262, 619925131,
    320896861, -876706528, 1197603389, -1197603389, 876706528, -320896861,
];

/// The built-in decorrelation matrix for a coupled group of `num_channels` channels, in
/// row-major Q1.31. Available for group sizes 3 through 6.
pub(crate) fn default_decorrelation_matrix(num_channels: usize) -> Option<&'static [i32]> {
    match num_channels {
        3 => Some(&DEF_DECORRELATION_3),
        4 => Some(&DEF_DECORRELATION_4),
        5 => Some(&DEF_DECORRELATION_5),
        6 => Some(&DEF_DECORRELATION_6),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_quant_mantissas() {
        for r in 0..20usize {
            let mant = QUANT_MANT_Q30[r];
            assert!(mant >= 1 << 30);

            let value = f64::from(mant) / f64::from(1 << 30) * f64::powi(2.0, i32::from(QUANT_EXP2[r]));
            let expected = 10f64.powf(r as f64 / 20.0);
            assert!((value - expected).abs() / expected < 1e-8, "r={}", r);
        }
    }

    #[test]
    fn verify_default_decorrelation_orthonormal() {
        for n in 3..=6usize {
            let m = default_decorrelation_matrix(n).unwrap();
            assert_eq!(m.len(), n * n);

            for a in 0..n {
                for b in 0..n {
                    let dot: f64 = (0..n)
                        .map(|k| {
                            let x = f64::from(m[a * n + k]) / 2147483648.0;
                            let y = f64::from(m[b * n + k]) / 2147483648.0;
                            x * y
                        })
                        .sum();

                    let expected = if a == b { 1.0 } else { 0.0 };
                    assert!((dot - expected).abs() < 1.0 / f64::from(1 << 20), "n={} {} {}", n, a, b);
                }
            }
        }
    }

    #[test]
    fn verify_unsupported_group_sizes() {
        assert!(default_decorrelation_matrix(2).is_none());
        assert!(default_decorrelation_matrix(7).is_none());
        assert!(default_decorrelation_matrix(8).is_none());
    }
}
