// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-block decoding: the subframe header, quantizer parameters, coefficients, inverse
//! quantization, and the inverse transform.

use log::{debug, warn};

use wmapro_core::errors::{decode_error, Result};
use wmapro_core::io::{BitReaderLtr, ReadBitsLtr};
use wmapro_core::util::bits::ilog2;

use crate::common::{validate, BLOCK_MIN_BITS};
use crate::decoder::WmaProDecoder;

impl WmaProDecoder {
    /// Decode one block: the largest set of channels whose next subframes share the same
    /// offset and length.
    pub(crate) fn decode_subframe(&mut self, bs: &mut BitReaderLtr<'_>) -> Result<()> {
        let mut offset = self.samples_per_frame;
        let mut subframe_len = self.samples_per_frame;
        let mut total_samples = self.samples_per_frame * self.num_channels;

        // Reset channel context and find the next block offset and size: the next subframe of
        // the channel with the fewest decoded samples.
        for ch in self.channel.iter_mut() {
            ch.grouped = false;
            if offset > ch.decoded_samples {
                offset = ch.decoded_samples;
                subframe_len = ch.subframe_len[ch.cur_subframe];
            }
        }

        debug!("processing subframe with offset {} len {}", offset, subframe_len);

        // Collect all channels whose next subframe matches the block.
        self.channels_for_cur_subframe = 0;
        for c in 0..self.num_channels {
            let ch = &mut self.channel[c];

            // Subtract already processed samples.
            total_samples -= ch.decoded_samples;

            if offset == ch.decoded_samples
                && ch.cur_subframe < ch.num_subframes
                && subframe_len == ch.subframe_len[ch.cur_subframe]
            {
                total_samples -= subframe_len;
                ch.decoded_samples += subframe_len;
                self.channel_indexes_for_cur_subframe[self.channels_for_cur_subframe] = c;
                self.channels_for_cur_subframe += 1;
            }
        }

        // The frame is complete once the estimated block has been processed.
        if total_samples == 0 {
            self.parsed_all_subframes = true;
        }

        validate!(self.channels_for_cur_subframe > 0);

        // The block size selects the scale factor band layout, the transform, and the
        // subwoofer cutoff.
        self.table_idx = ilog2((self.samples_per_frame / subframe_len) as u64) as usize;
        self.num_bands = self.num_sfb[self.table_idx];
        let cur_subwoofer_cutoff = self.subwoofer_cutoffs[self.table_idx];

        self.subframe_len = subframe_len;
        self.cur_block_offset = offset;
        self.esc_len = ilog2((self.subframe_len - 1) as u64) + 1;

        // Skip fill bits if any.
        if bs.read_bool()? {
            let mut num_fill_bits = bs.read_bits_leq32(2)? as usize;
            if num_fill_bits == 0 {
                let len = bs.read_bits_leq32(4)?;
                num_fill_bits = bs.read_bits_leq32(len)? as usize + 1;
            }

            if bs.bits_read() as usize + num_fill_bits > self.num_saved_bits {
                return decode_error("wmapro: invalid number of fill bits");
            }

            bs.ignore_bits(num_fill_bits as u32)?;
        }

        if bs.read_bool()? {
            warn!("wmapro: reserved subframe bit set");
        }

        self.decode_channel_transform(bs)?;

        let mut transmit_coeffs = false;
        for i in 0..self.channels_for_cur_subframe {
            let c = self.channel_indexes_for_cur_subframe[i];
            self.channel[c].transmit_coefs = bs.read_bool()?;
            transmit_coeffs |= self.channel[c].transmit_coefs;
        }

        if transmit_coeffs {
            // Number of vector coded coefficients, either transmitted or the whole subframe.
            self.transmit_num_vec_coeffs = bs.read_bool()?;
            if self.transmit_num_vec_coeffs {
                let num_bits = ilog2(((self.subframe_len + 3) / 4) as u64) + 1;
                for i in 0..self.channels_for_cur_subframe {
                    let c = self.channel_indexes_for_cur_subframe[i];
                    let n = (bs.read_bits_leq32(num_bits)? as usize) << 2;
                    validate!(n <= self.subframe_len);
                    self.channel[c].num_vec_coeffs = n;
                }
            }
            else {
                for i in 0..self.channels_for_cur_subframe {
                    let c = self.channel_indexes_for_cur_subframe[i];
                    self.channel[c].num_vec_coeffs = self.subframe_len;
                }
            }

            let quant_step = self.decode_quant_step(bs)?;
            self.decode_quant_modifiers(bs, quant_step)?;
            self.decode_scale_factors(bs)?;
        }

        // Parse the coefficients of every participating channel.
        for i in 0..self.channels_for_cur_subframe {
            let c = self.channel_indexes_for_cur_subframe[i];
            if self.channel[c].transmit_coefs && (bs.bits_read() as usize) < self.num_saved_bits
            {
                self.decode_coeffs(bs, c)?;
            }
            else {
                for v in self.channel[c].coeffs[..subframe_len].iter_mut() {
                    *v = 0;
                }
            }
        }

        let ring_base = self.samples_per_frame / 2 + offset;

        if transmit_coeffs {
            self.inverse_channel_transform();

            // Reconstruct every channel of the block. Channels without coefficients of
            // their own may still have received content from the channel transform.
            for i in 0..self.channels_for_cur_subframe {
                let c = self.channel_indexes_for_cur_subframe[i];

                self.dequantize_channel(c);

                // Low-pass the subwoofer channel at its cutoff.
                if Some(c) == self.lfe_channel {
                    for v in self.scratch[cur_subwoofer_cutoff..subframe_len].iter_mut() {
                        *v = 0;
                    }
                }

                let size_idx = (ilog2(subframe_len as u64) - BLOCK_MIN_BITS) as usize;
                self.imdct[size_idx].imdct_half(
                    &self.scratch[..subframe_len],
                    &mut self.channel[c].out[ring_base..ring_base + subframe_len],
                );
            }
        }
        else {
            for i in 0..self.channels_for_cur_subframe {
                let c = self.channel_indexes_for_cur_subframe[i];
                for v in self.channel[c].out[ring_base..ring_base + subframe_len].iter_mut() {
                    *v = 0;
                }
            }
        }

        // Window and overlap-add.
        self.window();

        // Handled one subframe for every participating channel.
        for i in 0..self.channels_for_cur_subframe {
            let c = self.channel_indexes_for_cur_subframe[i];
            if self.channel[c].cur_subframe >= self.channel[c].num_subframes {
                return decode_error("wmapro: broken subframe");
            }
            self.channel[c].cur_subframe += 1;
        }

        Ok(())
    }

    /// Decode the shared quantizer step: a biased base, a signed 6-bit adjustment, and an
    /// open-ended extension in 5-bit increments.
    fn decode_quant_step(&self, bs: &mut BitReaderLtr<'_>) -> Result<i32> {
        let mut quant_step = 90 * self.bits_per_sample as i32 >> 4;

        let step = bs.read_bits_leq32_signed(6)?;
        quant_step += step;

        if step == -32 || step == 31 {
            let sign = if step == 31 { 0 } else { -1 };
            let mut quant = 0i32;
            let mut last = step;

            loop {
                if bs.bits_read() as usize + 5 >= self.num_saved_bits {
                    break;
                }
                last = bs.read_bits_leq32(5)? as i32;
                if last != 31 {
                    break;
                }
                quant += 31;
            }

            quant_step += ((quant + last) ^ sign) - sign;
        }

        if quant_step < 0 {
            debug!("negative quant step");
        }

        Ok(quant_step)
    }

    /// Decode the per-channel quantizer step modifiers.
    fn decode_quant_modifiers(&mut self, bs: &mut BitReaderLtr<'_>, quant_step: i32) -> Result<()> {
        if self.channels_for_cur_subframe == 1 {
            self.channel[self.channel_indexes_for_cur_subframe[0]].quant_step = quant_step;
            return Ok(());
        }

        let modifier_len = bs.read_bits_leq32(3)?;

        for i in 0..self.channels_for_cur_subframe {
            let c = self.channel_indexes_for_cur_subframe[i];
            self.channel[c].quant_step = quant_step;

            if bs.read_bool()? {
                if modifier_len > 0 {
                    self.channel[c].quant_step += bs.read_bits_leq32(modifier_len)? as i32 + 1;
                }
                else {
                    self.channel[c].quant_step += 1;
                }
            }
        }

        Ok(())
    }
}
