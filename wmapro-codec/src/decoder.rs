// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::mem;

use log::{debug, error, warn};

use wmapro_core::dsp::cordic;
use wmapro_core::dsp::imdct::Imdct;
use wmapro_core::dsp::math::clip16;
use wmapro_core::errors::{decode_error, unsupported_error, Result};
use wmapro_core::io::{BitReaderLtr, BitWriterLtr, FiniteBitStream, ReadBitsLtr};
use wmapro_core::util::bits::ilog2;

use crate::common::*;
use crate::tables::CRITICAL_FREQS;
use crate::window::sine_window;

/// The outcome of a [`WmaProDecoder::decode_packet`] call.
#[derive(Copy, Clone, Debug, Default)]
pub struct DecodedPacket {
    /// Bytes consumed from the input buffer. The caller should advance the buffer by this
    /// amount before the next call.
    pub bytes_read: usize,
    /// Number of interleaved `i16` samples written to the output.
    pub samples_written: usize,
}

/// Frame specific decoder state for a single channel.
pub(crate) struct ChannelCtx {
    /// Length of the previous block.
    pub prev_block_len: usize,
    pub transmit_coefs: bool,
    pub num_subframes: usize,
    /// Subframe lengths in samples.
    pub subframe_len: [usize; MAX_SUBFRAMES],
    /// Subframe positions in the current frame.
    pub subframe_offset: [usize; MAX_SUBFRAMES],
    /// Current subframe number.
    pub cur_subframe: usize,
    /// Number of already processed samples.
    pub decoded_samples: usize,
    /// Channel is part of a group.
    pub grouped: bool,
    /// Quantization step for the current subframe.
    pub quant_step: i32,
    /// Share scale factors between subframes.
    pub reuse_sf: bool,
    /// Scaling step for the current subframe.
    pub scale_factor_step: i32,
    /// Maximum scale factor for the current subframe.
    pub max_scale_factor: i32,
    /// Resampled and (previously) transmitted scale factor values.
    pub saved_scale_factors: [[i32; MAX_BANDS]; 2],
    /// Bank holding the most recently transmitted scale factors.
    pub scale_factor_idx: usize,
    /// Bank holding the factors in use for the current subframe.
    pub cur_sf_bank: usize,
    /// Block size index under which the saved scale factors were transmitted.
    pub table_idx: usize,
    /// Number of vector coded coefficients.
    pub num_vec_coeffs: usize,
    /// Frequency domain workspace for the current subframe. Integer coefficient values are
    /// kept in the high 32 bits so the decorrelation can accumulate in 64 bits.
    pub coeffs: Vec<i64>,
    /// Output ring: one frame of reconstructed samples followed by half a frame of overlap
    /// tail for the next frame.
    pub out: Vec<i32>,
}

impl ChannelCtx {
    fn new(samples_per_frame: usize) -> Self {
        ChannelCtx {
            prev_block_len: samples_per_frame,
            transmit_coefs: false,
            num_subframes: 0,
            subframe_len: [0; MAX_SUBFRAMES],
            subframe_offset: [0; MAX_SUBFRAMES],
            cur_subframe: 0,
            decoded_samples: 0,
            grouped: false,
            quant_step: 0,
            reuse_sf: false,
            scale_factor_step: 0,
            max_scale_factor: 0,
            saved_scale_factors: [[0; MAX_BANDS]; 2],
            scale_factor_idx: 0,
            cur_sf_bank: 0,
            table_idx: 0,
            num_vec_coeffs: 0,
            coeffs: vec![0; BLOCK_MAX_SIZE],
            out: vec![0; samples_per_frame + samples_per_frame / 2],
        }
    }
}

/// Channel group for channel transformations.
#[derive(Copy, Clone)]
pub(crate) struct ChannelGroup {
    /// Number of channels in the group.
    pub num_channels: usize,
    /// Indices of the member channels, in transmission order.
    pub channels: [usize; MAX_CHANNELS],
    /// Transform on / off.
    pub transform: bool,
    /// Controls whether the transform is enabled for a certain band.
    pub transform_band: [bool; MAX_BANDS],
    /// Row-major Q1.31 decorrelation matrix.
    pub decorrelation_matrix: [i32; MAX_CHANNELS * MAX_CHANNELS],
}

impl ChannelGroup {
    pub(crate) fn new() -> Self {
        ChannelGroup {
            num_channels: 0,
            channels: [0; MAX_CHANNELS],
            transform: false,
            transform_band: [false; MAX_BANDS],
            decorrelation_matrix: [0; MAX_CHANNELS * MAX_CHANNELS],
        }
    }
}

/// Fixed-point WMA Pro (v3) decoder.
pub struct WmaProDecoder {
    /* stream configuration, set once at init */
    pub(crate) sample_rate: u32,
    pub(crate) block_align: usize,
    pub(crate) len_prefix: bool,
    pub(crate) dynamic_range_compression: bool,
    pub(crate) bits_per_sample: u32,
    pub(crate) samples_per_frame: usize,
    pub(crate) log2_frame_size: u32,
    pub(crate) num_channels: usize,
    pub(crate) channel_mask: u32,
    pub(crate) lfe_channel: Option<usize>,
    pub(crate) max_num_subframes: usize,
    pub(crate) subframe_len_bits: u32,
    pub(crate) max_subframe_len_bit: bool,
    pub(crate) min_samples_per_subframe: usize,
    pub(crate) num_possible_block_sizes: usize,
    /// Scale factor bands per block size.
    pub(crate) num_sfb: [usize; BLOCK_SIZES],
    /// Scale factor band offsets, multiples of 4.
    pub(crate) sfb_offsets: [[u16; MAX_BANDS]; BLOCK_SIZES],
    /// Scale factor resample matrix.
    pub(crate) sf_offsets: [[[u8; MAX_BANDS]; BLOCK_SIZES]; BLOCK_SIZES],
    pub(crate) subwoofer_cutoffs: [usize; BLOCK_SIZES],

    /* packet decode state */
    frame_data: BitWriterLtr,
    pub(crate) num_saved_bits: usize,
    frame_offset: usize,
    rsv_read_pos: usize,
    next_packet_start: usize,
    packet_offset: u32,
    packet_sequence_number: u32,
    pub(crate) packet_loss: bool,
    packet_done: bool,
    skip_frame: bool,
    frame_num: u32,
    drc_gain: u8,

    /* subframe/block decode state */
    pub(crate) subframe_len: usize,
    pub(crate) cur_block_offset: usize,
    pub(crate) channels_for_cur_subframe: usize,
    pub(crate) channel_indexes_for_cur_subframe: [usize; MAX_CHANNELS],
    pub(crate) num_bands: usize,
    pub(crate) table_idx: usize,
    pub(crate) esc_len: u32,
    pub(crate) transmit_num_vec_coeffs: bool,
    pub(crate) parsed_all_subframes: bool,
    pub(crate) num_chgroups: usize,
    pub(crate) chgroup: [ChannelGroup; MAX_CHANNELS],
    pub(crate) channel: Vec<ChannelCtx>,

    /* transform resources */
    pub(crate) imdct: Vec<Imdct>,
    pub(crate) windows: Vec<Vec<i32>>,
    /// Dequantized spectrum scratch, reused by every subframe.
    pub(crate) scratch: Vec<i32>,
    /// sin(i * pi / 64) in Q1.31 for the decorrelation matrix rotations.
    pub(crate) sin64: [i32; 33],
}

/// Derive log2 of the frame length in samples for a WMA v3 stream.
fn frame_len_bits(sample_rate: u32, decode_flags: u16) -> u32 {
    let mut bits = if sample_rate <= 16000 {
        9
    }
    else if sample_rate <= 22050 {
        10
    }
    else if sample_rate <= 48000 {
        11
    }
    else {
        12
    };

    match decode_flags & 0x6 {
        0x2 => bits += 1,
        0x4 => bits -= 1,
        0x6 => bits -= 2,
        _ => (),
    }

    bits
}

impl WmaProDecoder {
    /// Initialize a decoder for the stream described by `params`.
    pub fn try_new(params: &CodecParameters) -> Result<Self> {
        let extra = &params.extra_data;

        if extra.len() < 18 {
            return decode_error("wmapro: extradata too small");
        }

        let bits_per_sample = u32::from(u16::from_le_bytes([extra[0], extra[1]]));
        let channel_mask = u32::from_le_bytes([extra[2], extra[3], extra[4], extra[5]]);
        let decode_flags = u16::from_le_bytes([extra[14], extra[15]]);

        validate!(bits_per_sample >= 1 && bits_per_sample <= 32);

        if params.sample_rate == 0 || params.sample_rate > 96000 {
            return unsupported_error("wmapro: sample rate");
        }

        let num_channels = params.channels as usize;

        if num_channels == 0 {
            return decode_error("wmapro: invalid number of channels");
        }
        else if num_channels > MAX_CHANNELS {
            return unsupported_error("wmapro: more than 8 channels");
        }

        let block_align = params.block_align as usize;
        validate!(block_align > 0 && block_align <= MAX_FRAMESIZE);

        let log2_frame_size = ilog2(block_align as u64) + 4;

        let samples_per_frame = 1usize << frame_len_bits(params.sample_rate, decode_flags);

        let log2_max_num_subframes = usize::from((decode_flags & 0x38) >> 3);
        let max_num_subframes = 1usize << log2_max_num_subframes;

        if max_num_subframes > MAX_SUBFRAMES {
            return decode_error("wmapro: invalid number of subframes");
        }

        let max_subframe_len_bit = max_num_subframes == 16 || max_num_subframes == 4;
        let subframe_len_bits = ilog2(log2_max_num_subframes as u64) + 1;

        let num_possible_block_sizes = log2_max_num_subframes + 1;
        let min_samples_per_subframe = samples_per_frame / max_num_subframes;

        // A single-subframe layout of an oversized frame would request a transform larger than
        // the largest supported block.
        if samples_per_frame > BLOCK_MAX_SIZE && max_num_subframes == 1 {
            return unsupported_error("wmapro: frame exceeds maximum block size");
        }

        if min_samples_per_subframe < (1 << BLOCK_MIN_BITS) {
            return unsupported_error("wmapro: subframes below minimum block size");
        }

        // Extract the LFE channel position from the channel mask.
        let mut lfe_channel = None;

        if channel_mask & 8 != 0 {
            let mut index = -1i32;
            let mut mask = 1u32;
            while mask < 16 {
                if channel_mask & mask != 0 {
                    index += 1;
                }
                mask <<= 1;
            }
            if index >= 0 && (index as usize) < num_channels {
                lfe_channel = Some(index as usize);
            }
        }

        // Calculate the number of scale factor bands and their offsets for every possible
        // block size.
        let mut num_sfb = [0usize; BLOCK_SIZES];
        let mut sfb_offsets = [[0u16; MAX_BANDS]; BLOCK_SIZES];

        for i in 0..num_possible_block_sizes {
            let subframe_len = samples_per_frame >> i;
            let mut band = 1usize;

            sfb_offsets[i][0] = 0;

            for &freq in CRITICAL_FREQS.iter() {
                if band - 1 >= MAX_BANDS - 1
                    || usize::from(sfb_offsets[i][band - 1]) >= subframe_len
                {
                    break;
                }

                let mut offset =
                    (subframe_len * 2 * usize::from(freq)) / params.sample_rate as usize + 2;
                offset &= !3;

                if offset > usize::from(sfb_offsets[i][band - 1]) {
                    sfb_offsets[i][band] = offset as u16;
                    band += 1;
                }
            }

            sfb_offsets[i][band - 1] = subframe_len as u16;
            num_sfb[i] = band - 1;
        }

        // Scale factors can be shared between blocks of different sizes as every block has a
        // different scale factor band layout. The sf_offsets matrix maps each band to the band
        // of another layout whose center is closest.
        let mut sf_offsets = [[[0u8; MAX_BANDS]; BLOCK_SIZES]; BLOCK_SIZES];

        for i in 0..num_possible_block_sizes {
            for b in 0..num_sfb[i] {
                let offset = ((usize::from(sfb_offsets[i][b]) + usize::from(sfb_offsets[i][b + 1])
                    - 1)
                    << i)
                    >> 1;
                for x in 0..num_possible_block_sizes {
                    let mut v = 0usize;
                    while (usize::from(sfb_offsets[x][v + 1]) << x) < offset {
                        v += 1;
                    }
                    sf_offsets[i][x][b] = v as u8;
                }
            }
        }

        // Subwoofer cutoff values.
        let mut subwoofer_cutoffs = [0usize; BLOCK_SIZES];
        for (i, cutoff) in subwoofer_cutoffs.iter_mut().enumerate().take(num_possible_block_sizes)
        {
            let block_size = samples_per_frame >> i;
            let rate = params.sample_rate as usize;
            *cutoff = ((440 * block_size + 3 * (rate >> 1) - 1) / rate).clamp(4, block_size);
        }

        // One IMDCT and sine window per block size.
        let imdct =
            (0..BLOCK_SIZES as u32).map(|i| Imdct::new(BLOCK_MIN_BITS + 1 + i)).collect();
        let windows =
            (0..BLOCK_SIZES as u32).map(|i| sine_window(1 << (BLOCK_MIN_BITS + i))).collect();

        // Sine values for the decorrelation matrix rotations.
        let mut sin64 = [0i32; 33];
        for (i, v) in sin64.iter_mut().enumerate() {
            *v = cordic::sincos((i as u32).wrapping_mul(0xffff_ffff >> 7)).0;
        }

        let channel = (0..num_channels).map(|_| ChannelCtx::new(samples_per_frame)).collect();

        Ok(WmaProDecoder {
            sample_rate: params.sample_rate,
            block_align,
            len_prefix: decode_flags & 0x40 != 0,
            dynamic_range_compression: decode_flags & 0x80 != 0,
            bits_per_sample,
            samples_per_frame,
            log2_frame_size,
            num_channels,
            channel_mask,
            lfe_channel,
            max_num_subframes,
            subframe_len_bits,
            max_subframe_len_bit,
            min_samples_per_subframe,
            num_possible_block_sizes,
            num_sfb,
            sfb_offsets,
            sf_offsets,
            subwoofer_cutoffs,
            frame_data: BitWriterLtr::with_capacity(MAX_FRAMESIZE),
            num_saved_bits: 0,
            frame_offset: 0,
            rsv_read_pos: 0,
            next_packet_start: 0,
            packet_offset: 0,
            packet_sequence_number: 0,
            // The first packet is always treated as the start of a stream.
            packet_loss: true,
            packet_done: false,
            // The overlap tail of the first frame is silence; do not output it.
            skip_frame: true,
            frame_num: 0,
            drc_gain: 0,
            subframe_len: 0,
            cur_block_offset: 0,
            channels_for_cur_subframe: 0,
            channel_indexes_for_cur_subframe: [0; MAX_CHANNELS],
            num_bands: 0,
            table_idx: 0,
            esc_len: 0,
            transmit_num_vec_coeffs: false,
            parsed_all_subframes: false,
            num_chgroups: 0,
            chgroup: [ChannelGroup::new(); MAX_CHANNELS],
            channel,
            imdct,
            windows,
            scratch: vec![0; BLOCK_MAX_SIZE],
            sin64,
        })
    }

    /// The number of samples spanned by one frame, per channel.
    pub fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    /// The number of output channels after the downmix.
    pub fn num_output_channels(&self) -> usize {
        self.num_channels.min(2)
    }

    /// Clear decoder buffers, for seeking. The next valid packet restarts frame assembly.
    pub fn flush(&mut self) {
        // Reset the output rings as parts of them are used during the windowing of a new
        // frame.
        for ch in self.channel.iter_mut() {
            ch.out.iter_mut().for_each(|s| *s = 0);
            ch.coeffs.iter_mut().for_each(|s| *s = 0);
        }
        self.packet_loss = true;
    }

    /// Fill the bit reservoir with a (partial) frame.
    fn save_bits(
        &mut self,
        packet: &[u8],
        gb: &mut BitReaderLtr<'_>,
        len: usize,
        append: bool,
    ) -> Result<()> {
        // When the frame data does not need to be concatenated, the reservoir is reset and the
        // sub-byte offset of the source is kept so whole bytes can be copied directly.
        if !append {
            self.frame_offset = (gb.bits_read() & 7) as usize;
            self.num_saved_bits = self.frame_offset;
            self.frame_data.clear();
        }

        let buflen = (self.num_saved_bits + len + 8) >> 3;

        if len == 0 || buflen > MAX_FRAMESIZE {
            warn!("wmapro: frame exceeds the bit reservoir");
            self.packet_loss = true;
            return Ok(());
        }

        self.num_saved_bits += len;

        if !append {
            let start = (gb.bits_read() >> 3) as usize;
            self.frame_data.put_bits_from(&packet[start..], self.num_saved_bits);
            gb.ignore_bits(len as u32)?;
        }
        else {
            let align = (8 - (gb.bits_read() & 7) as usize % 8).min(len);
            let head = gb.read_bits_leq32(align as u32)?;
            self.frame_data.put_bits(align as u32, head);

            let rest = len - align;
            let start = (gb.bits_read() >> 3) as usize;
            self.frame_data.put_bits_from(&packet[start..], rest);
            gb.ignore_bits(rest as u32)?;
        }

        // Restart the reservoir reader at the first bit of the frame.
        self.rsv_read_pos = self.frame_offset;

        Ok(())
    }

    /// Decode one frame from the bit reservoir. Returns true while the frame trailer signals
    /// that more frames follow in the reservoir.
    fn decode_frame(&mut self, out: &mut [i16], out_pos: &mut usize) -> bool {
        let frame_data = mem::take(&mut self.frame_data);

        let result = (|| {
            let mut bs = BitReaderLtr::new(frame_data.bytes());
            bs.ignore_bits(self.rsv_read_pos as u32)?;
            self.decode_frame_inner(&mut bs, out, out_pos)
        })();

        self.frame_data = frame_data;

        match result {
            Ok((more_frames, read_pos)) => {
                self.rsv_read_pos = read_pos;
                more_frames
            }
            Err(err) => {
                debug!("wmapro: dropping frame: {}", err);
                self.packet_loss = true;
                false
            }
        }
    }

    fn decode_frame_inner(
        &mut self,
        bs: &mut BitReaderLtr<'_>,
        out: &mut [i16],
        out_pos: &mut usize,
    ) -> Result<(bool, usize)> {
        // Check for potential output buffer overflow.
        if self.num_channels * self.samples_per_frame > out.len() - *out_pos {
            error!("wmapro: not enough space for the output samples");
            self.packet_loss = true;
            return Ok((false, bs.bits_read() as usize));
        }

        let len = if self.len_prefix {
            bs.read_bits_leq32(self.log2_frame_size)? as usize
        }
        else {
            0
        };

        self.decode_tile_header(bs)?;

        // Postproc transform coefficients, currently skipped.
        if self.num_channels > 1 && bs.read_bool()? && bs.read_bool()? {
            bs.ignore_bits((4 * self.num_channels * self.num_channels) as u32)?;
        }

        if self.dynamic_range_compression {
            self.drc_gain = bs.read_bits_leq32(8)? as u8;
        }

        // Skip-sample hints. Usually present on the first and last frame of a stream; the
        // values are not needed for reconstruction and are discarded.
        if bs.read_bool()? {
            let hint_bits = ilog2((self.samples_per_frame * 2) as u64);
            if bs.read_bool()? {
                bs.ignore_bits(hint_bits)?;
            }
            if bs.read_bool()? {
                bs.ignore_bits(hint_bits)?;
            }
        }

        // Reset subframe states.
        self.parsed_all_subframes = false;
        for ch in self.channel.iter_mut() {
            ch.decoded_samples = 0;
            ch.cur_subframe = 0;
            ch.reuse_sf = false;
        }

        while !self.parsed_all_subframes {
            self.decode_subframe(bs)?;
        }

        // Downmix to stereo and convert the finished frame to interleaved 16-bit output.
        let emitted = self.downmix(&mut out[*out_pos..]);

        // Shift each ring so the overlap tail is in place for the next frame.
        let frame = self.samples_per_frame;
        for ch in self.channel.iter_mut() {
            ch.out.copy_within(frame..frame + frame / 2, 0);
        }

        if self.skip_frame {
            self.skip_frame = false;
        }
        else {
            *out_pos += emitted;
        }

        // Frame trailer.
        if self.len_prefix {
            let consumed = bs.bits_read() as usize - self.frame_offset;
            if len != consumed + 2 {
                debug!(
                    "wmapro: frame[{}] would have to skip {} bits",
                    self.frame_num,
                    len as i64 - consumed as i64 - 1
                );
                self.packet_loss = true;
                return Ok((false, bs.bits_read() as usize));
            }
            bs.ignore_bits((len - consumed - 1) as u32)?;
        }
        else {
            // Seek past trailing zero padding.
            while (bs.bits_read() as usize) < self.num_saved_bits && !bs.read_bool()? {}
        }

        let more_frames =
            if (bs.bits_read() as usize) < self.num_saved_bits { bs.read_bool()? } else { false };

        self.frame_num += 1;

        Ok((more_frames, bs.bits_read() as usize))
    }

    /// Downmix the finished frame to at most two channels and write interleaved samples.
    /// Returns the number of samples written.
    fn downmix(&self, out: &mut [i16]) -> usize {
        let frame = self.samples_per_frame;

        // The reconstructed samples sit at Q27; shifting down by 12 lands them at Q0.15.
        fn to_pcm(v: i64) -> i16 {
            clip16((v >> (27 - 15)).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
        }

        match self.num_channels {
            1 => {
                for (dst, &src) in out.iter_mut().zip(self.channel[0].out[..frame].iter()) {
                    *dst = to_pcm(i64::from(src));
                }
                frame
            }
            2 => {
                for i in 0..frame {
                    out[2 * i] = to_pcm(i64::from(self.channel[0].out[i]));
                    out[2 * i + 1] = to_pcm(i64::from(self.channel[1].out[i]));
                }
                2 * frame
            }
            3 => {
                for i in 0..frame {
                    let c2 = i64::from(self.channel[2].out[i]);
                    out[2 * i] = to_pcm(i64::from(self.channel[0].out[i]) + c2);
                    out[2 * i + 1] = to_pcm(i64::from(self.channel[1].out[i]) + c2);
                }
                2 * frame
            }
            4 => {
                for i in 0..frame {
                    out[2 * i] = to_pcm(
                        i64::from(self.channel[0].out[i]) + i64::from(self.channel[2].out[i]),
                    );
                    out[2 * i + 1] = to_pcm(
                        i64::from(self.channel[1].out[i]) + i64::from(self.channel[3].out[i]),
                    );
                }
                2 * frame
            }
            _ => {
                // Five or more channels: fold centre and the first surround pair into the
                // front pair, drop the rest.
                for i in 0..frame {
                    let c2 = i64::from(self.channel[2].out[i]);
                    let l =
                        i64::from(self.channel[0].out[i]) + c2 + i64::from(self.channel[3].out[i]);
                    let r =
                        i64::from(self.channel[1].out[i]) + c2 + i64::from(self.channel[4].out[i]);
                    out[2 * i] = to_pcm(l);
                    out[2 * i + 1] = to_pcm(r);
                }
                2 * frame
            }
        }
    }

    /// The SMPTE channel mask the stream was configured with.
    pub fn channel_mask(&self) -> u32 {
        self.channel_mask
    }

    /// The stream sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The most recent dynamic range compression gain, when the stream carries DRC data.
    pub fn drc_gain(&self) -> u8 {
        self.drc_gain
    }

    /// Decode one compressed packet. `buf` must hold at least `block_align` bytes when a new
    /// packet starts; the caller advances `buf` by the returned byte count between calls.
    pub fn decode_packet(&mut self, buf: &[u8], out: &mut [i16]) -> Result<DecodedPacket> {
        let mut out_pos = 0usize;

        let (packet, mut gb) = if self.packet_done || self.packet_loss {
            self.packet_done = false;

            // Sanity check for the buffer length.
            if buf.len() < self.block_align {
                warn!(
                    "wmapro: buffer smaller than the packet size ({} < {})",
                    buf.len(),
                    self.block_align
                );
                return decode_error("wmapro: packet smaller than block alignment");
            }

            self.next_packet_start = buf.len() - self.block_align;
            let packet = &buf[..self.block_align];
            let mut gb = BitReaderLtr::new(packet);

            // Parse the packet header.
            let packet_sequence_number = gb.read_bits_leq32(4)?;
            gb.ignore_bits(2)?;

            // The number of bits of this packet that belong to the previous, still open,
            // frame.
            let num_bits_prev_frame = gb.read_bits_leq32(self.log2_frame_size)? as usize;

            if !self.packet_loss
                && ((self.packet_sequence_number + 1) & 0xf) != packet_sequence_number
            {
                self.packet_loss = true;
                warn!(
                    "wmapro: packet loss detected, sequence {} vs {}",
                    self.packet_sequence_number, packet_sequence_number
                );
            }

            self.packet_sequence_number = packet_sequence_number;

            if num_bits_prev_frame > 0 {
                let remaining_packet_bits = gb.bits_left() as usize;

                let append_len = if num_bits_prev_frame >= remaining_packet_bits {
                    self.packet_done = true;
                    remaining_packet_bits
                }
                else {
                    num_bits_prev_frame
                };

                // Stitch the head of this packet onto the saved tail of the previous packet
                // to complete the open frame.
                self.save_bits(packet, &mut gb, append_len, true)?;

                if !self.packet_loss {
                    self.decode_frame(out, &mut out_pos);
                }
            }
            else if self.num_saved_bits > self.frame_offset {
                debug!(
                    "wmapro: ignoring {} previously saved bits",
                    self.num_saved_bits - self.frame_offset
                );
            }

            if self.packet_loss {
                // Drop the stale reservoir so the decoder does not try to finish incomplete
                // frames after a resync.
                self.num_saved_bits = 0;
                self.rsv_read_pos = 0;
                self.packet_loss = false;
            }

            (packet, gb)
        }
        else {
            // Continue inside the current packet; the caller re-feeds the unconsumed tail.
            if buf.len() < self.next_packet_start {
                return decode_error("wmapro: packet smaller than the stashed tail");
            }

            let packet = &buf[..buf.len() - self.next_packet_start];
            let mut gb = BitReaderLtr::new(packet);
            gb.ignore_bits(self.packet_offset)?;

            if self.len_prefix && gb.bits_left() > u64::from(self.log2_frame_size) {
                let frame_size = gb.clone().read_bits_leq32(self.log2_frame_size)? as usize;

                if frame_size > 0 && frame_size as u64 <= gb.bits_left() {
                    self.save_bits(packet, &mut gb, frame_size, false)?;
                    self.packet_done = !self.decode_frame(out, &mut out_pos);
                }
                else {
                    self.packet_done = true;
                }
            }
            else if !self.len_prefix && self.num_saved_bits > self.rsv_read_pos {
                // Without a length prefix the compressed frame length is unknown, but the
                // reservoir is known to hold only whole frames at this point.
                self.packet_done = !self.decode_frame(out, &mut out_pos);
            }
            else {
                self.packet_done = true;
            }

            (packet, gb)
        };

        // Save the rest of the packet so the next frame can be assembled across the packet
        // boundary.
        if self.packet_done && !self.packet_loss && gb.bits_left() > 0 {
            let left = gb.bits_left() as usize;
            self.save_bits(packet, &mut gb, left, false)?;
        }

        let pos = gb.bits_read();
        self.packet_offset = (pos & 7) as u32;

        if self.packet_loss {
            return decode_error("wmapro: packet loss");
        }

        Ok(DecodedPacket { bytes_read: (pos >> 3) as usize, samples_written: out_pos })
    }
}
