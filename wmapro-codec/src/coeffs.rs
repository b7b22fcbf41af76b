// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spectral coefficient decoding: vector Huffman codes with 4, 2, and 1 values per symbol,
//! falling back to run-level coding after a long enough run of zeros.

use log::error;

use wmapro_core::errors::{decode_error, Result};
use wmapro_core::io::vlc::Codebook;
use wmapro_core::io::{BitReaderLtr, ReadBitsLtr};

use crate::codebooks::*;
use crate::decoder::WmaProDecoder;

/// Decode an uncompressed coefficient of up to 31 bits; consumes up to 34 bits.
fn get_large_val(bs: &mut BitReaderLtr<'_>) -> Result<u32> {
    // Count the escape prefix to find the value length.
    let mut num_bits = 8;

    if bs.read_bool()? {
        num_bits += 8;
        if bs.read_bool()? {
            num_bits += 8;
            if bs.read_bool()? {
                num_bits += 7;
            }
        }
    }

    Ok(bs.read_bits_leq32(num_bits)?)
}

/// Decode run-level coded coefficients into `buf[offset..]`. Runs wrap modulo the block
/// length, as the reference bitstream permits jumps that land past the end.
#[allow(clippy::too_many_arguments)]
fn run_level_decode(
    bs: &mut BitReaderLtr<'_>,
    vlc: &Codebook,
    level_table: &[i32],
    run_table: &[u16],
    buf: &mut [i64],
    offset: usize,
    frame_len_bits: u32,
) -> Result<()> {
    let num_coefs = buf.len();
    let coef_mask = num_coefs - 1;

    let mut offset = offset;

    while offset < num_coefs {
        let (code, _) = bs.read_codebook(vlc)?;
        let code = usize::from(code);

        if code > 1 {
            // Normal code.
            offset += usize::from(run_table[code]);
            let sign = bs.read_bit()? as i32 - 1;
            buf[offset & coef_mask] = i64::from((level_table[code] ^ sign) - sign) << 32;
        }
        else if code == 1 {
            // End of block; the remaining coefficients stay zero.
            break;
        }
        else {
            // Escape: an uncompressed level, optionally preceded by a position jump.
            let level = get_large_val(bs)? as i32;

            if bs.read_bool()? {
                if bs.read_bool()? {
                    if bs.read_bool()? {
                        error!("wmapro: broken escape sequence");
                        return decode_error("wmapro: broken run level escape");
                    }
                    offset += bs.read_bits_leq32(frame_len_bits)? as usize + 4;
                }
                else {
                    offset += bs.read_bits_leq32(2)? as usize + 1;
                }
            }

            let sign = bs.read_bit()? as i32 - 1;
            buf[offset & coef_mask] = i64::from((level ^ sign).wrapping_sub(sign)) << 32;
        }

        offset += 1;
    }

    // The end-of-block code may be omitted when the last run lands exactly on the block end.
    if offset > num_coefs {
        error!("wmapro: overflow in spectral run level decode");
        return decode_error("wmapro: spectral coefficient overrun");
    }

    Ok(())
}

impl WmaProDecoder {
    /// Extract the spectral coefficients of channel `c` from the bitstream.
    pub(crate) fn decode_coeffs(&mut self, bs: &mut BitReaderLtr<'_>, c: usize) -> Result<()> {
        let vlc_idx = bs.read_bit()? as usize;

        let (run_table, level_table): (&[u16], &[i32]) = if vlc_idx != 0 {
            (&COEF1_RUN, &COEF1_LEVEL)
        }
        else {
            (&COEF0_RUN, &COEF0_LEVEL)
        };

        let num_vec_coeffs = self.channel[c].num_vec_coeffs;
        let zero_run_limit = self.subframe_len >> 8;

        let mut cur_coeff = 0usize;
        let mut num_zeros = 0usize;
        let mut rl_mode = false;

        // Vector coded phase: 4 coefficients per symbol, escaping into two 2-value symbols,
        // which in turn escape into single-value symbols extended by large-value escapes.
        while (self.transmit_num_vec_coeffs || !rl_mode) && cur_coeff + 3 < num_vec_coeffs {
            let mut vals = [0i32; 4];

            let (idx, _) = bs.read_codebook(&CODEBOOKS.vec4)?;

            if usize::from(idx) == VEC4_CODES.len() - 1 {
                for i in (0..4).step_by(2) {
                    let (idx2, _) = bs.read_codebook(&CODEBOOKS.vec2)?;

                    if usize::from(idx2) == VEC2_CODES.len() - 1 {
                        let (v0, _) = bs.read_codebook(&CODEBOOKS.vec1)?;
                        let mut v0 = u32::from(v0);
                        if v0 as usize == VEC1_CODES.len() - 1 {
                            v0 = v0.wrapping_add(get_large_val(bs)?);
                        }

                        let (v1, _) = bs.read_codebook(&CODEBOOKS.vec1)?;
                        let mut v1 = u32::from(v1);
                        if v1 as usize == VEC1_CODES.len() - 1 {
                            v1 = v1.wrapping_add(get_large_val(bs)?);
                        }

                        vals[i] = v0 as i32;
                        vals[i + 1] = v1 as i32;
                    }
                    else {
                        let packed = SYMBOL_TO_VEC2[usize::from(idx2)];
                        vals[i] = i32::from(packed >> 4);
                        vals[i + 1] = i32::from(packed & 0xf);
                    }
                }
            }
            else {
                let packed = SYMBOL_TO_VEC4[usize::from(idx)];
                vals[0] = i32::from(packed >> 12);
                vals[1] = i32::from((packed >> 8) & 0xf);
                vals[2] = i32::from((packed >> 4) & 0xf);
                vals[3] = i32::from(packed & 0xf);
            }

            // Decode the sign of each non-zero value; count zero runs to decide when to
            // switch to run-level mode.
            for &v in vals.iter() {
                if v != 0 {
                    let sign = bs.read_bit()? as i32 - 1;
                    self.channel[c].coeffs[cur_coeff] =
                        i64::from((v ^ sign).wrapping_sub(sign)) << 32;
                    num_zeros = 0;
                }
                else {
                    self.channel[c].coeffs[cur_coeff] = 0;
                    num_zeros += 1;
                    if num_zeros > zero_run_limit {
                        rl_mode = true;
                    }
                }
                cur_coeff += 1;
            }
        }

        // Run-level coded remainder.
        if cur_coeff < self.subframe_len {
            for v in self.channel[c].coeffs[cur_coeff..self.subframe_len].iter_mut() {
                *v = 0;
            }

            run_level_decode(
                bs,
                &CODEBOOKS.coef[vlc_idx],
                level_table,
                run_table,
                &mut self.channel[c].coeffs[..self.subframe_len],
                cur_coeff,
                self.esc_len,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmapro_core::io::BitWriterLtr;

    use crate::common::CodecParameters;

    fn test_decoder() -> WmaProDecoder {
        let mut extra = [0u8; 18];
        extra[0] = 16;
        extra[2] = 3;
        extra[14..16].copy_from_slice(&0x40u16.to_le_bytes());
        WmaProDecoder::try_new(&CodecParameters::new(44100, 1, 2048, &extra)).unwrap()
    }

    fn put_symbol(bw: &mut BitWriterLtr, codes: &[u32], bits: &[u8], symbol: usize) {
        bw.put_bits(u32::from(bits[symbol]), codes[symbol]);
    }

    fn vec4_symbol(tuple: u16) -> usize {
        SYMBOL_TO_VEC4.iter().position(|&v| v == tuple).unwrap()
    }

    #[test]
    fn verify_get_large_val_widths() {
        let mut bw = BitWriterLtr::new();
        bw.put_bits(1, 0); // 8 bit value follows
        bw.put_bits(8, 0xd3);
        bw.put_bits(1, 1);
        bw.put_bits(1, 0); // 16 bit value follows
        bw.put_bits(16, 0xbeef);
        bw.put_bits(1, 1);
        bw.put_bits(1, 1);
        bw.put_bits(1, 1); // 31 bit value follows
        bw.put_bits(31, 0x4d2c0ffe);

        let mut bs = BitReaderLtr::new(bw.bytes());
        assert_eq!(get_large_val(&mut bs).unwrap(), 0xd3);
        assert_eq!(get_large_val(&mut bs).unwrap(), 0xbeef);
        assert_eq!(get_large_val(&mut bs).unwrap(), 0x4d2c0ffe);
    }

    #[test]
    fn verify_vector_then_run_level() {
        let mut dec = test_decoder();
        dec.subframe_len = 2048;
        dec.esc_len = 12;
        dec.transmit_num_vec_coeffs = false;
        dec.channel[0].num_vec_coeffs = 2048;

        let mut bw = BitWriterLtr::new();
        bw.put_bits(1, 0); // coefficient table 0

        // (2, 0, 1, 0) with signs - and +.
        put_symbol(&mut bw, &VEC4_CODES, &VEC4_BITS, vec4_symbol(0x2010));
        bw.put_bits(1, 0); // negative
        bw.put_bits(1, 1); // positive

        // Two all-zero vectors push the zero run over subframe_len / 256 = 8, ending the
        // vector phase.
        for _ in 0..2 {
            put_symbol(&mut bw, &VEC4_CODES, &VEC4_BITS, vec4_symbol(0x0000));
        }

        // Run-level phase: code for run 2, level 1 (symbol 4 in the coef0 layout), then EOB.
        put_symbol(&mut bw, &COEF0_CODES, &COEF0_BITS, 4);
        bw.put_bits(1, 1); // positive
        put_symbol(&mut bw, &COEF0_CODES, &COEF0_BITS, 1);
        bw.put_bits(32, 0);

        let mut bs = BitReaderLtr::new(bw.bytes());
        dec.decode_coeffs(&mut bs, 0).unwrap();

        let coeffs = &dec.channel[0].coeffs;
        assert_eq!(coeffs[0] >> 32, -2);
        assert_eq!(coeffs[1] >> 32, 0);
        assert_eq!(coeffs[2] >> 32, 1);
        assert_eq!(coeffs[3] >> 32, 0);
        // The vector phase emitted 12 coefficients; the run-level code skips 2 more zeros
        // and writes +1.
        assert!(coeffs[4..14].iter().all(|&v| v == 0));
        assert_eq!(coeffs[14] >> 32, 1);
        assert!(coeffs[15..2048].iter().all(|&v| v == 0));
    }

    #[test]
    fn verify_broken_escape_rejected() {
        let mut dec = test_decoder();
        dec.subframe_len = 64;
        dec.esc_len = 6;
        dec.transmit_num_vec_coeffs = false;
        dec.channel[0].num_vec_coeffs = 0;

        let mut bw = BitWriterLtr::new();
        bw.put_bits(1, 0); // coefficient table 0
        put_symbol(&mut bw, &COEF0_CODES, &COEF0_BITS, 0); // escape
        bw.put_bits(1, 0); // 8 bit value
        bw.put_bits(8, 5);
        bw.put_bits(3, 0b111); // illegal jump flag combination
        bw.put_bits(16, 0);

        let mut bs = BitReaderLtr::new(bw.bytes());
        assert!(dec.decode_coeffs(&mut bs, 0).is_err());
    }
}
