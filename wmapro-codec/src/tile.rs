// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame tiling: reconstruction of every channel's subframe list.

use log::error;

use wmapro_core::errors::{decode_error, Result};
use wmapro_core::io::{BitReaderLtr, ReadBitsLtr};

use crate::common::{MAX_CHANNELS, MAX_SUBFRAMES, BLOCK_MAX_SIZE};
use crate::decoder::WmaProDecoder;

impl WmaProDecoder {
    /// Decode the length of the subframe starting at `offset` samples into the frame.
    fn decode_subframe_length(&self, bs: &mut BitReaderLtr<'_>, offset: usize) -> Result<usize> {
        // No need to read from the bitstream when only one length is possible.
        if offset == self.samples_per_frame - self.min_samples_per_subframe {
            return Ok(self.min_samples_per_subframe);
        }

        // One bit can indicate that the subframe is of maximum length, in which case the
        // shift is coded relative to 1.
        let frame_len_shift = if self.max_subframe_len_bit {
            if bs.read_bool()? {
                1 + bs.read_bits_leq32(self.subframe_len_bits - 1)?
            }
            else {
                0
            }
        }
        else {
            bs.read_bits_leq32(self.subframe_len_bits)?
        };

        let subframe_len = self.samples_per_frame >> frame_len_shift;

        // Sanity check the length.
        if subframe_len < self.min_samples_per_subframe
            || subframe_len > self.samples_per_frame
            || subframe_len > BLOCK_MAX_SIZE
        {
            error!("wmapro: broken frame, subframe_len {}", subframe_len);
            return decode_error("wmapro: invalid subframe length");
        }

        Ok(subframe_len)
    }

    /// Decode how the data in the frame is split into subframes. Every frame contains the
    /// encoded data for a fixed number of samples per channel, and the data for every channel
    /// might be split into several subframes.
    ///
    /// If the subframes are not evenly split, the algorithm estimates the channels with the
    /// lowest number of total samples. For each of those channels a bit indicates whether the
    /// channel contains a subframe of the next size that is going to be read from the
    /// bitstream or not. If it does, the subframe size gets added to the channel's subframe
    /// list. These steps repeat until the frame is properly divided between the individual
    /// channels.
    pub(crate) fn decode_tile_header(&mut self, bs: &mut BitReaderLtr<'_>) -> Result<()> {
        // Sum of samples for all currently known subframes of a channel.
        let mut num_samples = [0usize; MAX_CHANNELS];
        // Flags indicating which channels contain the subframe being read.
        let mut contains_subframe = [false; MAX_CHANNELS];
        let mut channels_for_cur_subframe = self.num_channels;
        let mut min_channel_len = 0usize;

        for ch in self.channel.iter_mut() {
            ch.num_subframes = 0;
        }

        // All channels share identical subframe offsets and sizes.
        let fixed_channel_layout = self.max_num_subframes == 1 || bs.read_bool()?;

        // Loop until the frame data is split between the subframes.
        loop {
            // Check which channels contain the subframe.
            for c in 0..self.num_channels {
                contains_subframe[c] = if num_samples[c] == min_channel_len {
                    if fixed_channel_layout
                        || channels_for_cur_subframe == 1
                        || min_channel_len
                            == self.samples_per_frame - self.min_samples_per_subframe
                    {
                        true
                    }
                    else {
                        bs.read_bool()?
                    }
                }
                else {
                    false
                };
            }

            let subframe_len = self.decode_subframe_length(bs, min_channel_len)?;

            // Add the subframe to the participating channels and find the new minimum.
            min_channel_len += subframe_len;

            for c in 0..self.num_channels {
                let chan = &mut self.channel[c];

                if contains_subframe[c] {
                    if chan.num_subframes >= MAX_SUBFRAMES {
                        error!("wmapro: broken frame, num subframes > 31");
                        return decode_error("wmapro: too many subframes");
                    }

                    chan.subframe_len[chan.num_subframes] = subframe_len;
                    chan.num_subframes += 1;
                    num_samples[c] += subframe_len;

                    if num_samples[c] > self.samples_per_frame {
                        error!("wmapro: broken frame, channel len > samples_per_frame");
                        return decode_error("wmapro: channel exceeds frame length");
                    }
                }
                else if num_samples[c] <= min_channel_len {
                    if num_samples[c] < min_channel_len {
                        channels_for_cur_subframe = 0;
                        min_channel_len = num_samples[c];
                    }
                    channels_for_cur_subframe += 1;
                }
            }

            if min_channel_len >= self.samples_per_frame {
                break;
            }
        }

        // Convert the subframe lists into running offsets.
        for ch in self.channel.iter_mut() {
            let mut offset = 0;
            for i in 0..ch.num_subframes {
                ch.subframe_offset[i] = offset;
                offset += ch.subframe_len[i];
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wmapro_core::io::{BitReaderLtr, BitWriterLtr};

    use crate::common::CodecParameters;
    use crate::decoder::WmaProDecoder;

    fn test_decoder(channels: u32, decode_flags: u16) -> WmaProDecoder {
        let mut extra = [0u8; 18];
        extra[0] = 16; // bits per sample
        extra[2] = 3; // channel mask
        extra[14..16].copy_from_slice(&decode_flags.to_le_bytes());
        WmaProDecoder::try_new(&CodecParameters::new(44100, channels, 2048, &extra)).unwrap()
    }

    #[test]
    fn verify_single_subframe_layout() {
        // max_num_subframes == 1: the tile header consumes no bits at all.
        let mut dec = test_decoder(2, 0x40);
        let mut bs = BitReaderLtr::new(&[0xff; 4]);

        dec.decode_tile_header(&mut bs).unwrap();

        assert_eq!(bs.bits_read(), 0);
        for c in 0..2 {
            assert_eq!(dec.channel[c].num_subframes, 1);
            assert_eq!(dec.channel[c].subframe_len[0], dec.samples_per_frame);
        }
    }

    #[test]
    fn verify_fixed_layout_even_split() {
        // max_num_subframes == 8 (log2 = 3 in bits 3..5 of the decode flags). A set layout
        // bit plus a zero length shift per subframe yields one full-length... rather, the
        // fixed layout reads one shared length per round.
        let mut dec = test_decoder(1, 0x40 | (3 << 3));

        // Layout: fixed(1), then per round a subframe_len_bits(2) shift of 3 => frame/8,
        // repeated until the frame is full (the final round is implicit).
        let mut bw = BitWriterLtr::new();
        bw.put_bits(1, 1);
        for _ in 0..7 {
            bw.put_bits(2, 3);
        }
        bw.put_bits(8, 0);

        let mut bs = BitReaderLtr::new(bw.bytes());
        dec.decode_tile_header(&mut bs).unwrap();

        assert_eq!(dec.channel[0].num_subframes, 8);
        let sum: usize = dec.channel[0].subframe_len[..8].iter().sum();
        assert_eq!(sum, dec.samples_per_frame);
        assert_eq!(dec.channel[0].subframe_offset[7], dec.samples_per_frame * 7 / 8);
    }

    #[test]
    fn verify_uneven_stereo_split() {
        // Two channels, max 2 subframes. Channel 0 splits the frame in half, channel 1 keeps
        // one full-length subframe.
        let mut dec = test_decoder(2, 0x40 | (1 << 3));

        let mut bw = BitWriterLtr::new();
        bw.put_bits(1, 0); // not a fixed layout
        // Round 1 at offset 0: both channels are candidates.
        bw.put_bits(1, 1); // channel 0 contains the next subframe
        bw.put_bits(1, 0); // channel 1 does not
        bw.put_bits(1, 1); // length: frame >> 1
        // Round 2: channel 1 alone at offset 0 (forced), length frame >> 0.
        bw.put_bits(1, 0);
        // Round 3: channel 0 at offset frame/2 is forced to min samples remaining.
        bw.put_bits(8, 0);

        let mut bs = BitReaderLtr::new(bw.bytes());
        dec.decode_tile_header(&mut bs).unwrap();

        let frame = dec.samples_per_frame;
        assert_eq!(dec.channel[0].num_subframes, 2);
        assert_eq!(&dec.channel[0].subframe_len[..2], &[frame / 2, frame / 2]);
        assert_eq!(&dec.channel[0].subframe_offset[..2], &[0, frame / 2]);
        assert_eq!(dec.channel[1].num_subframes, 1);
        assert_eq!(dec.channel[1].subframe_len[0], frame);

        // Every channel's subframes must exactly cover the frame.
        for c in 0..2 {
            let n = dec.channel[c].num_subframes;
            let sum: usize = dec.channel[c].subframe_len[..n].iter().sum();
            assert_eq!(sum, frame);
        }
    }

    #[test]
    fn verify_invalid_subframe_length_rejected() {
        // Up to 32 subframes: a 3-bit length shift of 7 requests a 16 sample subframe, below
        // the minimum of frame / 32.
        let mut dec = test_decoder(1, 0x40 | (5 << 3));

        let mut bw = BitWriterLtr::new();
        bw.put_bits(1, 1); // fixed layout
        bw.put_bits(3, 7); // shift = 7 => frame >> 7 < min_samples_per_subframe
        bw.put_bits(8, 0);

        let mut bs = BitReaderLtr::new(bw.bytes());
        assert!(dec.decode_tile_header(&mut bs).is_err());
    }
}
