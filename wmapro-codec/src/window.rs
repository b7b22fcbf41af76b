// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sine windowing and the overlap-add with the previous block.

use wmapro_core::dsp::math::{xnprod31, xprod31};
use wmapro_core::util::bits::ilog2;

use crate::common::BLOCK_MIN_BITS;
use crate::decoder::WmaProDecoder;

/// Generate the Q1.31 sine half-window `sin((i + 0.5) * pi / (2 * len))`, rising across the
/// table. The overlap-add pairs entries from both ends, which covers the falling flank
/// implicitly.
pub(crate) fn sine_window(len: usize) -> Vec<i32> {
    (0..len)
        .map(|i| {
            let w = ((i as f64 + 0.5) * std::f64::consts::PI / (2.0 * len as f64)).sin();
            (w * 2147483648.0).round().min(2147483647.0) as i32
        })
        .collect()
}

/// Apply the MDCT window/overlap formula to `buf` in place, pairing samples from both edges.
fn overlap_add(buf: &mut [i32], win: &[i32]) {
    debug_assert_eq!(buf.len(), win.len());

    let len = buf.len();

    for i in 0..len / 2 {
        let j = len - 1 - i;

        let s0 = buf[i];
        let s1 = buf[j];
        let wi = win[i];
        let wj = win[j];

        buf[i] = xnprod31(s0, s1, wj, wi).0;
        buf[j] = xprod31(s0, s1, wi, wj).0;
    }
}

impl WmaProDecoder {
    /// Window the current block of every participating channel against the overlap tail of
    /// its previous block. The overlap length is the smaller of the two block lengths,
    /// centered on the block boundary.
    pub(crate) fn window(&mut self) {
        for i in 0..self.channels_for_cur_subframe {
            let c = self.channel_indexes_for_cur_subframe[i];

            let mut winlen = self.channel[c].prev_block_len;
            let mut start = self.samples_per_frame / 2 + self.cur_block_offset - winlen / 2;

            if self.subframe_len < winlen {
                start += (winlen - self.subframe_len) / 2;
                winlen = self.subframe_len;
            }

            let window = &self.windows[(ilog2(winlen as u64) - BLOCK_MIN_BITS) as usize];

            let ch = &mut self.channel[c];
            overlap_add(&mut ch.out[start..start + winlen], window);

            ch.prev_block_len = self.subframe_len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{overlap_add, sine_window};

    #[test]
    fn verify_sine_window_shape() {
        for &len in &[64usize, 512, 4096] {
            let win = sine_window(len);

            // Monotonic rise from near zero to near one.
            for i in 1..len {
                assert!(win[i] > win[i - 1]);
            }
            assert!(win[0] < 1 << 26);
            assert!(win[len - 1] > 2_147_000_000);

            // Power complementary across the table: w[i]^2 + w[len - 1 - i]^2 == 1.
            for i in 0..len {
                let a = f64::from(win[i]) / 2147483648.0;
                let b = f64::from(win[len - 1 - i]) / 2147483648.0;
                assert!((a * a + b * b - 1.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn verify_overlap_add_energy_preserving() {
        let len = 128usize;
        let win = sine_window(len);

        // A constant input: the rotation by the window pair must keep each output within the
        // input range.
        let mut buf = vec![1 << 26; len];
        overlap_add(&mut buf, &win);

        for &v in buf.iter() {
            assert!(v.abs() <= (3 << 25) + (1 << 20));
        }

        // The pairwise sum of squares is preserved by the rotation, within rounding.
        let input_energy = 2.0 * f64::powi(f64::from(1 << 26), 2);
        for i in 0..len / 2 {
            let a = f64::from(buf[i]);
            let b = f64::from(buf[len - 1 - i]);
            let energy = a * a + b * b;
            assert!((energy / input_energy - 1.0).abs() < 1e-4);
        }
    }
}
