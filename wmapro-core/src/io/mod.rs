// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `io` module implements bitstream reading and writing.

mod bit;
pub mod vlc;

pub use bit::{BitReaderLtr, BitWriterLtr, FiniteBitStream, ReadBitsLtr};
