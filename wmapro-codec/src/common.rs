// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Maximum number of handled channels.
pub(crate) const MAX_CHANNELS: usize = 8;
/// Maximum number of subframes per channel.
pub(crate) const MAX_SUBFRAMES: usize = 32;
/// Maximum number of scale factor bands.
pub(crate) const MAX_BANDS: usize = 29;
/// Maximum compressed frame size in bytes.
pub(crate) const MAX_FRAMESIZE: usize = 32768;

/// log2 of the minimum block size.
pub(crate) const BLOCK_MIN_BITS: u32 = 6;
/// log2 of the maximum block size.
pub(crate) const BLOCK_MAX_BITS: u32 = 12;
/// Maximum block size in samples.
pub(crate) const BLOCK_MAX_SIZE: usize = 1 << BLOCK_MAX_BITS;
/// Number of possible block sizes.
pub(crate) const BLOCK_SIZES: usize = (BLOCK_MAX_BITS - BLOCK_MIN_BITS + 1) as usize;

/// Parameters describing a WMA Pro stream, as carried by the container.
#[derive(Clone, Debug, Default)]
pub struct CodecParameters {
    /// The stream sample rate in Hz.
    pub sample_rate: u32,
    /// The number of channels in the stream.
    pub channels: u32,
    /// The packet size in bytes. Every compressed packet fed to the decoder spans exactly this
    /// many bytes.
    pub block_align: u32,
    /// The codec private data. At least 18 bytes: bits-per-sample at offset 0 (u16le), the
    /// SMPTE channel mask at offset 2 (u32le), and the decode flags at offset 14 (u16le).
    /// The layout is that of WMA version 3 (WMA Pro); other versions are not described by this
    /// blob and are rejected.
    pub extra_data: Box<[u8]>,
}

impl CodecParameters {
    pub fn new(sample_rate: u32, channels: u32, block_align: u32, extra_data: &[u8]) -> Self {
        CodecParameters { sample_rate, channels, block_align, extra_data: extra_data.into() }
    }
}

macro_rules! validate {
    ($a:expr) => {
        if !$a {
            log::error!("check failed at {}:{}", file!(), line!());
            return wmapro_core::errors::decode_error("wmapro: invalid data");
        }
    };
}

pub(crate) use validate;
