// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel grouping and inverse channel decorrelation.

use log::warn;

use wmapro_core::dsp::math::{xnprod31, xprod31};
use wmapro_core::errors::{decode_error, Result};
use wmapro_core::io::{BitReaderLtr, ReadBitsLtr};

use crate::decoder::WmaProDecoder;
use crate::tables::default_decorrelation_matrix;

/// 1.0 in Q1.31, saturated.
const Q31_ONE: i32 = i32::MAX;
/// cos(pi/4) in Q1.31, matching the reference's 0.70703125 constant.
const Q31_COS_PI_4: i32 = 0x5a80_0000;
/// sqrt(2) as 181/128 in Q2.30, applied to bands a stereo pair leaves untransformed.
const Q30_SQRT_2: i64 = 0x5a80_0000;

impl WmaProDecoder {
    /// Calculate a decorrelation matrix from the rotation angles in the bitstream.
    fn decode_decorrelation_matrix(
        &mut self,
        bs: &mut BitReaderLtr<'_>,
        group: usize,
    ) -> Result<()> {
        let num_channels = self.chgroup[group].num_channels;
        let mut rotation_offset = [0usize; 64];

        self.chgroup[group].decorrelation_matrix = [0; 64];

        for rotation in rotation_offset.iter_mut().take(num_channels * (num_channels - 1) / 2) {
            *rotation = bs.read_bits_leq32(6)? as usize;
        }

        for i in 0..num_channels {
            self.chgroup[group].decorrelation_matrix[num_channels * i + i] =
                if bs.read_bool()? { Q31_ONE } else { -Q31_ONE };
        }

        // Build up the matrix as a sequence of Givens style two-row rotations through the
        // transmitted angles, quantized to multiples of pi/64.
        let mut offset = 0;

        for i in 1..num_channels {
            for x in 0..i {
                for y in 0..i + 1 {
                    let mat = &mut self.chgroup[group].decorrelation_matrix;
                    let v1 = mat[x * num_channels + y];
                    let v2 = mat[i * num_channels + y];

                    let n = rotation_offset[offset + x];

                    let (sinv, cosv) = if n < 32 {
                        (self.sin64[n], self.sin64[32 - n])
                    }
                    else {
                        (self.sin64[64 - n], -self.sin64[n - 32])
                    };

                    mat[x * num_channels + y] = xnprod31(v1, v2, sinv, cosv).0;
                    mat[i * num_channels + y] = xprod31(v1, v2, cosv, sinv).0;
                }
            }
            offset += i;
        }

        Ok(())
    }

    /// Decode channel transform parameters: the partition of the block's channels into groups
    /// and each group's decorrelation matrix and per-band enables.
    pub(crate) fn decode_channel_transform(&mut self, bs: &mut BitReaderLtr<'_>) -> Result<()> {
        self.num_chgroups = 0;

        // In the one channel case channel transforms are pointless.
        if self.num_channels == 1 {
            return Ok(());
        }

        if bs.read_bool()? {
            warn!("wmapro: unsupported channel transform bit");
            return decode_error("wmapro: unsupported channel transform bit");
        }

        let mut remaining_channels = self.channels_for_cur_subframe;

        while remaining_channels > 0 && self.num_chgroups < self.channels_for_cur_subframe {
            let g = self.num_chgroups;
            self.chgroup[g].num_channels = 0;
            self.chgroup[g].transform = false;

            // Decode the channel mask of the group.
            if remaining_channels > 2 {
                for i in 0..self.channels_for_cur_subframe {
                    let channel_idx = self.channel_indexes_for_cur_subframe[i];
                    if !self.channel[channel_idx].grouped && bs.read_bool()? {
                        let n = self.chgroup[g].num_channels;
                        self.chgroup[g].channels[n] = channel_idx;
                        self.chgroup[g].num_channels = n + 1;
                        self.channel[channel_idx].grouped = true;
                    }
                }
            }
            else {
                // The last one or two channels always form a group together.
                for i in 0..self.channels_for_cur_subframe {
                    let channel_idx = self.channel_indexes_for_cur_subframe[i];
                    if !self.channel[channel_idx].grouped {
                        let n = self.chgroup[g].num_channels;
                        self.chgroup[g].channels[n] = channel_idx;
                        self.chgroup[g].num_channels = n + 1;
                    }
                    self.channel[channel_idx].grouped = true;
                }
            }

            // Decode the transform type.
            let group_size = self.chgroup[g].num_channels;

            if group_size == 2 {
                if bs.read_bool()? {
                    if bs.read_bool()? {
                        warn!("wmapro: unsupported channel transform type");
                    }
                }
                else {
                    self.chgroup[g].transform = true;
                    let mat = &mut self.chgroup[g].decorrelation_matrix;
                    if self.num_channels == 2 {
                        mat[0] = Q31_ONE;
                        mat[1] = -Q31_ONE;
                        mat[2] = Q31_ONE;
                        mat[3] = Q31_ONE;
                    }
                    else {
                        mat[0] = Q31_COS_PI_4;
                        mat[1] = -Q31_COS_PI_4;
                        mat[2] = Q31_COS_PI_4;
                        mat[3] = Q31_COS_PI_4;
                    }
                }
            }
            else if group_size > 2 {
                if bs.read_bool()? {
                    self.chgroup[g].transform = true;

                    if bs.read_bool()? {
                        self.decode_decorrelation_matrix(bs, g)?;
                    }
                    else {
                        match default_decorrelation_matrix(group_size) {
                            Some(matrix) => {
                                for (row, chunk) in matrix.chunks_exact(group_size).enumerate() {
                                    let base = row * group_size;
                                    self.chgroup[g].decorrelation_matrix[base..base + group_size]
                                        .copy_from_slice(chunk);
                                }
                            }
                            None => {
                                // More than 6 coupled channels have no built-in matrix.
                                warn!("wmapro: coupled channels > 6");
                            }
                        }
                    }
                }
            }

            // Decode transform on / off per scale factor band.
            if self.chgroup[g].transform {
                if !bs.read_bool()? {
                    for b in 0..self.num_bands {
                        self.chgroup[g].transform_band[b] = bs.read_bool()?;
                    }
                }
                else {
                    for b in 0..self.num_bands {
                        self.chgroup[g].transform_band[b] = true;
                    }
                }
            }

            remaining_channels -= self.chgroup[g].num_channels;
            self.num_chgroups += 1;
        }

        Ok(())
    }

    /// Reconstruct the individual channel data by undoing the per-band channel transforms.
    pub(crate) fn inverse_channel_transform(&mut self) {
        for g in 0..self.num_chgroups {
            if !self.chgroup[g].transform {
                continue;
            }

            let group = self.chgroup[g];
            let num_channels = group.num_channels;

            for b in 0..self.num_bands {
                let start = usize::from(self.sfb_offsets[self.table_idx][b]);
                let end = usize::from(self.sfb_offsets[self.table_idx][b + 1]).min(self.subframe_len);

                if group.transform_band[b] {
                    // Multiply the coefficient vectors with the decorrelation matrix.
                    for y in start..end {
                        let mut data = [0i32; 8];
                        for (k, v) in data.iter_mut().enumerate().take(num_channels) {
                            *v = (self.channel[group.channels[k]].coeffs[y] >> 32) as i32;
                        }

                        for (row, &c) in group.channels.iter().enumerate().take(num_channels) {
                            let mut sum = 0i64;
                            for (k, &v) in data.iter().enumerate().take(num_channels) {
                                let m = group.decorrelation_matrix[row * num_channels + k];
                                sum = sum.wrapping_add(i64::from(v) * i64::from(m));
                            }
                            self.channel[c].coeffs[y] = sum.wrapping_shl(1);
                        }
                    }
                }
                else if self.num_channels == 2 {
                    // An untransformed band of a stereo pair carries M/S gain compensation.
                    for &c in group.channels.iter().take(2) {
                        for y in start..end {
                            let hi = self.channel[c].coeffs[y] >> 32;
                            let product = (i128::from(hi) * i128::from(Q30_SQRT_2)) << 2;
                            self.channel[c].coeffs[y] = product
                                .clamp(i128::from(i64::MIN), i128::from(i64::MAX))
                                as i64;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wmapro_core::io::{BitReaderLtr, BitWriterLtr};

    use crate::common::CodecParameters;
    use crate::decoder::WmaProDecoder;

    fn test_decoder(channels: u32) -> WmaProDecoder {
        let mut extra = [0u8; 18];
        extra[0] = 16;
        extra[2] = 0x3f;
        extra[14..16].copy_from_slice(&0x40u16.to_le_bytes());
        WmaProDecoder::try_new(&CodecParameters::new(44100, channels, 2048, &extra)).unwrap()
    }

    #[test]
    fn verify_custom_matrix_near_orthogonal() {
        let mut dec = test_decoder(5);
        let n = 5usize;

        dec.chgroup[0].num_channels = n;

        // Rotation indices spread over the quantized angle range, one sign bit per row.
        let mut bw = BitWriterLtr::new();
        let rotations = [3u32, 17, 45, 60, 9, 33, 21, 50, 12, 40];
        for &r in rotations.iter().take(n * (n - 1) / 2) {
            bw.put_bits(6, r);
        }
        for i in 0..n {
            bw.put_bits(1, (i & 1) as u32);
        }
        bw.put_bits(8, 0);

        let mut bs = BitReaderLtr::new(bw.bytes());
        dec.decode_decorrelation_matrix(&mut bs, 0).unwrap();

        let mat = &dec.chgroup[0].decorrelation_matrix;

        // Rows must be pairwise near-orthogonal within fixed-point rounding.
        for a in 0..n {
            for b in 0..n {
                if a == b {
                    continue;
                }
                let dot: f64 = (0..n)
                    .map(|k| {
                        let x = f64::from(mat[a * n + k]) / 2147483648.0;
                        let y = f64::from(mat[b * n + k]) / 2147483648.0;
                        x * y
                    })
                    .sum();
                assert!(dot.abs() < 1.0 / f64::from(1 << 20), "rows {} and {}: {}", a, b, dot);
            }
        }
    }

    #[test]
    fn verify_stereo_pair_grouping() {
        let mut dec = test_decoder(2);
        dec.channels_for_cur_subframe = 2;
        dec.channel_indexes_for_cur_subframe[0] = 0;
        dec.channel_indexes_for_cur_subframe[1] = 1;
        dec.num_bands = 4;

        // Forbidden bit clear, M/S transform selected, enabled on all bands.
        let mut bw = BitWriterLtr::new();
        bw.put_bits(1, 0);
        bw.put_bits(1, 0); // not identity: difference transform
        bw.put_bits(1, 1); // all bands
        bw.put_bits(8, 0);

        let mut bs = BitReaderLtr::new(bw.bytes());
        dec.decode_channel_transform(&mut bs).unwrap();

        assert_eq!(dec.num_chgroups, 1);
        assert_eq!(dec.chgroup[0].num_channels, 2);
        assert!(dec.chgroup[0].transform);
        assert!(dec.chgroup[0].transform_band[..4].iter().all(|&b| b));
        assert_eq!(dec.chgroup[0].decorrelation_matrix[1], -i32::MAX);
    }

    #[test]
    fn verify_forbidden_bit_rejected() {
        let mut dec = test_decoder(2);
        dec.channels_for_cur_subframe = 2;
        dec.channel_indexes_for_cur_subframe[0] = 0;
        dec.channel_indexes_for_cur_subframe[1] = 1;

        let mut bs = BitReaderLtr::new(&[0xff]);
        assert!(dec.decode_channel_transform(&mut bs).is_err());
    }

    #[test]
    fn verify_ms_inverse_transform() {
        let mut dec = test_decoder(2);
        dec.channels_for_cur_subframe = 2;
        dec.num_bands = 1;
        dec.table_idx = 0;
        dec.subframe_len = 4;
        dec.sfb_offsets[0][0] = 0;
        dec.sfb_offsets[0][1] = 4;

        dec.num_chgroups = 1;
        dec.chgroup[0].num_channels = 2;
        dec.chgroup[0].channels[0] = 0;
        dec.chgroup[0].channels[1] = 1;
        dec.chgroup[0].transform = true;
        dec.chgroup[0].transform_band[0] = true;
        dec.chgroup[0].decorrelation_matrix[0] = i32::MAX;
        dec.chgroup[0].decorrelation_matrix[1] = -i32::MAX;
        dec.chgroup[0].decorrelation_matrix[2] = i32::MAX;
        dec.chgroup[0].decorrelation_matrix[3] = i32::MAX;

        // Mid = 3, side = 1 in every slot.
        for y in 0..4 {
            dec.channel[0].coeffs[y] = 3i64 << 32;
            dec.channel[1].coeffs[y] = 1i64 << 32;
        }

        dec.inverse_channel_transform();

        for y in 0..4 {
            // L = mid - side, R = mid + side, within Q1.31 rounding of the saturated 1.0.
            let l = (dec.channel[0].coeffs[y] >> 32) as i32;
            let r = (dec.channel[1].coeffs[y] >> 32) as i32;
            assert!((l - 2).abs() <= 1, "l = {}", l);
            assert!((r - 4).abs() <= 1, "r = {}", r);
        }
    }
}
