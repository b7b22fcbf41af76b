// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A fixed-point WMA Pro (Windows Media Audio 9 Professional) decoder.
//!
//! WMA Pro is an MDCT based codec comparable to AAC. Decoding consists of the following steps:
//! bitstream decoding, reconstruction of per-channel data, rescaling and inverse quantization,
//! the inverse MDCT, and windowing with overlap-add.
//!
//! The compressed bitstream is split into individual packets. Every packet contains one or more
//! frames, and frames may have a variable length and cross packet boundaries, so the decoder
//! maintains a bit reservoir that partial frames are stitched into. Common to all frames is the
//! number of samples they span, derived from extradata that has to be passed to the decoder.
//!
//! Frames are split into a variable number of subframes, each spanning `2^n` time domain
//! samples. The subframe layouts of the individual channels of a frame do not need to agree.
//! When the offsets and lengths of subframes on several channels do line up, those subframes
//! form a block and may be coded jointly with per-band channel transforms such as M/S stereo.
//! Spectral coefficients are transmitted as Huffman coded vectors with 4, 2, and 1 elements,
//! with a run-level scheme taking over once a long enough run of zeros has been seen. Scale
//! factors are DPCM coded on first transmission and run-level delta coded when refreshed, and
//! are resampled whenever the block size changes.

mod chgroup;
mod codebooks;
mod coeffs;
mod common;
mod decoder;
mod dequant;
mod scalefactors;
mod subframe;
mod tables;
mod tile;
mod window;

pub use common::CodecParameters;
pub use decoder::{DecodedPacket, WmaProDecoder};
