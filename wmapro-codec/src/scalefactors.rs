// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scale factor decoding: DPCM on first transmission, run-level deltas on refresh, and
//! resampling whenever the block size changes.

use log::error;

use wmapro_core::errors::{decode_error, Result};
use wmapro_core::io::{BitReaderLtr, ReadBitsLtr};

use crate::codebooks::{CODEBOOKS, SCALE_RL_LEVEL, SCALE_RL_RUN};
use crate::decoder::WmaProDecoder;

impl WmaProDecoder {
    /// Extract the scale factors of every channel in the current block.
    pub(crate) fn decode_scale_factors(&mut self, bs: &mut BitReaderLtr<'_>) -> Result<()> {
        // Every channel of the block carries scale factors, including channels that
        // transmit no coefficients themselves: a channel transform may still deposit
        // spectral content on them.
        for i in 0..self.channels_for_cur_subframe {
            let c = self.channel_indexes_for_cur_subframe[i];

            // Factors are decoded into the currently inactive bank so the previously
            // transmitted values survive for later resampling.
            let bank = 1 - self.channel[c].scale_factor_idx;

            // Resample the last transmitted factors into the new band layout. This may happen
            // several times before new values are transmitted.
            if self.channel[c].reuse_sf {
                let src_table = self.channel[c].table_idx;
                for b in 0..self.num_bands {
                    let src_band =
                        usize::from(self.sf_offsets[self.table_idx][src_table][b]);
                    let value =
                        self.channel[c].saved_scale_factors[self.channel[c].scale_factor_idx]
                            [src_band];
                    self.channel[c].saved_scale_factors[bank][b] = value;
                }
            }

            if self.channel[c].cur_subframe == 0 || bs.read_bool()? {
                if !self.channel[c].reuse_sf {
                    // Decode DPCM coded scale factors.
                    self.channel[c].scale_factor_step = bs.read_bits_leq32(2)? as i32 + 1;
                    let mut val = 45 / self.channel[c].scale_factor_step;

                    for b in 0..self.num_bands {
                        let (idx, _) = bs.read_codebook(&CODEBOOKS.sf)?;
                        val += i32::from(idx) - 60;
                        self.channel[c].saved_scale_factors[bank][b] = val;
                    }
                }
                else {
                    // Run-level decode differences to the resampled factors.
                    let mut b = 0usize;

                    while b < self.num_bands {
                        let (idx, _) = bs.read_codebook(&CODEBOOKS.sf_rl)?;

                        let (val, skip, sign) = match idx {
                            0 => {
                                let code = bs.read_bits_leq32(14)?;
                                let sign = if code & 1 != 0 { 0 } else { -1 };
                                ((code >> 6) as i32, ((code & 0x3f) >> 1) as usize, sign)
                            }
                            1 => break,
                            _ => {
                                let skip = usize::from(SCALE_RL_RUN[usize::from(idx)]);
                                let val = SCALE_RL_LEVEL[usize::from(idx)];
                                (val, skip, bs.read_bit()? as i32 - 1)
                            }
                        };

                        b += skip;
                        if b >= self.num_bands {
                            error!("wmapro: invalid scale factor coding");
                            return decode_error("wmapro: scale factor band overrun");
                        }

                        self.channel[c].saved_scale_factors[bank][b] += (val ^ sign) - sign;
                        b += 1;
                    }
                }

                // Commit: the freshly written bank becomes the transmitted reference.
                self.channel[c].scale_factor_idx = bank;
                self.channel[c].table_idx = self.table_idx;
                self.channel[c].reuse_sf = true;
            }

            self.channel[c].cur_sf_bank = bank;

            // Calculate the new scale factor maximum.
            let max = self.channel[c].saved_scale_factors[bank][..self.num_bands]
                .iter()
                .copied()
                .max()
                .unwrap_or(0);
            self.channel[c].max_scale_factor = max;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wmapro_core::io::{BitReaderLtr, BitWriterLtr};

    use crate::codebooks::{SCALE_BITS, SCALE_CODES};
    use crate::common::CodecParameters;
    use crate::decoder::WmaProDecoder;

    fn test_decoder() -> WmaProDecoder {
        let mut extra = [0u8; 18];
        extra[0] = 16;
        extra[2] = 3;
        extra[14..16].copy_from_slice(&(0x40u16 | (2 << 3)).to_le_bytes());
        WmaProDecoder::try_new(&CodecParameters::new(44100, 1, 2048, &extra)).unwrap()
    }

    /// Resampling factors from a layout into the same layout must be the identity map.
    #[test]
    fn verify_scale_factor_resample_identity() {
        let dec = test_decoder();

        for i in 0..dec.num_possible_block_sizes {
            for b in 0..dec.num_sfb[i] {
                assert_eq!(usize::from(dec.sf_offsets[i][i][b]), b, "size {} band {}", i, b);
            }
        }
    }

    #[test]
    fn verify_dpcm_decode() {
        let mut dec = test_decoder();
        dec.channels_for_cur_subframe = 1;
        dec.channel_indexes_for_cur_subframe[0] = 0;
        dec.table_idx = 0;
        dec.num_bands = 4;
        dec.channel[0].transmit_coefs = true;
        dec.channel[0].cur_subframe = 0;

        // Step 3 (2 bits = 2), then deltas +2, 0, -1, +5 as DPCM symbols (delta + 60).
        let mut bw = BitWriterLtr::new();
        bw.put_bits(2, 2);
        for delta in [2i32, 0, -1, 5] {
            let sym = (delta + 60) as usize;
            bw.put_bits(u32::from(SCALE_BITS[sym]), SCALE_CODES[sym]);
        }
        bw.put_bits(32, 0);

        let mut bs = BitReaderLtr::new(bw.bytes());
        dec.decode_scale_factors(&mut bs).unwrap();

        // Seed is 45 / step = 15.
        let bank = dec.channel[0].cur_sf_bank;
        assert_eq!(&dec.channel[0].saved_scale_factors[bank][..4], &[17, 17, 16, 21]);
        assert_eq!(dec.channel[0].max_scale_factor, 21);
        assert!(dec.channel[0].reuse_sf);
        assert_eq!(dec.channel[0].scale_factor_step, 3);
    }

    #[test]
    fn verify_band_overrun_rejected() {
        let mut dec = test_decoder();
        dec.channels_for_cur_subframe = 1;
        dec.channel_indexes_for_cur_subframe[0] = 0;
        dec.table_idx = 0;
        dec.num_bands = 4;
        dec.channel[0].cur_subframe = 1;
        dec.channel[0].reuse_sf = true;
        dec.channel[0].table_idx = 0;

        // Refresh flag set, then a raw 14-bit escape whose skip jumps past the last band.
        let mut bw = BitWriterLtr::new();
        bw.put_bits(1, 1);
        let esc = 0usize; // escape symbol of the run-level book
        bw.put_bits(u32::from(crate::codebooks::SCALE_RL_BITS[esc]), crate::codebooks::SCALE_RL_CODES[esc]);
        // value 3, skip 20, positive sign.
        bw.put_bits(14, (3 << 6) | (20 << 1) | 1);
        bw.put_bits(16, 0);

        let mut bs = BitReaderLtr::new(bw.bytes());
        assert!(dec.decode_scale_factors(&mut bs).is_err());
    }
}
