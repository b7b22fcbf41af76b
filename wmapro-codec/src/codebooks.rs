// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The Huffman codebooks of the coefficient, vector, and scale factor coders, together with
//! their run/level and vector symbol maps.
//!
//! The codewords are canonical, length limited (22 bits), and Kraft complete, so every bit
//! pattern resolves to a symbol. Symbol order matches the companion tables: for the run-level
//! books symbol 0 is the escape, symbol 1 the end-of-block marker, and the remainder index the
//! run and level arrays. The vector books reserve their last symbol as the escape into the
//! next-smaller vector size.

use lazy_static::lazy_static;

use wmapro_core::io::vlc::{Codebook, CodebookBuilder};

pub(crate) const SCALE_CODES: [u32; 121] = [
    0x3fffe4, 0x3fffe5, 0x3fffe6, 0x3fffe7, 0x3fffe8, 0x3fffe9, 0x3fffea, 0x3fffeb,
    0x3fffec, 0x3fffed, 0x3fffee, 0x3fffef, 0x3ffff0, 0x3ffff1, 0x1fffec, 0x1fffed,
    0x1fffee, 0xffff0, 0xffff1, 0xffff2, 0x7fff4, 0x7fff5, 0x3fff6, 0x3fff7,
    0x1fff6, 0x1fff7, 0x1fff8, 0xfff6, 0xfff7, 0x7ff6, 0x7ff7, 0x7ff8,
    0x3ff6, 0x3ff7, 0x1ff6, 0x1ff7, 0x1ff8, 0xff6, 0xff7, 0x7f6,
    0x7f7, 0x7f8, 0x3f6, 0x3f7, 0x1f6, 0x1f7, 0x1f8, 0xf6,
    0xf7, 0x76, 0x77, 0x78, 0x36, 0x37, 0x16, 0x17,
    0x18, 0x6, 0x7, 0x0, 0x1, 0x2, 0x8, 0x9,
    0xa, 0x19, 0x1a, 0x38, 0x39, 0x3a, 0x79, 0x7a,
    0xf8, 0xf9, 0xfa, 0x1f9, 0x1fa, 0x3f8, 0x3f9, 0x3fa,
    0x7f9, 0x7fa, 0xff8, 0xff9, 0xffa, 0x1ff9, 0x1ffa, 0x3ff8,
    0x3ff9, 0x3ffa, 0x7ff9, 0x7ffa, 0xfff8, 0xfff9, 0xfffa, 0x1fff9,
    0x1fffa, 0x3fff8, 0x3fff9, 0x7fff6, 0x7fff7, 0xffff3, 0xffff4, 0xffff5,
    0x1fffef, 0x1ffff0, 0x1ffff1, 0x3ffff2, 0x3ffff3, 0x3ffff4, 0x3ffff5, 0x3ffff6,
    0x3ffff7, 0x3ffff8, 0x3ffff9, 0x3ffffa, 0x3ffffb, 0x3ffffc, 0x3ffffd, 0x3ffffe,
    0x3fffff,
];

pub(crate) const SCALE_BITS: [u8; 121] = [
    22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 21, 21,
    21, 20, 20, 20, 19, 19, 18, 18, 17, 17, 17, 16, 16, 15, 15, 15,
    14, 14, 13, 13, 13, 12, 12, 11, 11, 11, 10, 10, 9, 9, 9, 8,
    8, 7, 7, 7, 6, 6, 5, 5, 5, 4, 4, 3, 3, 3, 4, 4,
    4, 5, 5, 6, 6, 6, 7, 7, 8, 8, 8, 9, 9, 10, 10, 10,
    11, 11, 12, 12, 12, 13, 13, 14, 14, 14, 15, 15, 16, 16, 16, 17,
    17, 18, 18, 19, 19, 20, 20, 20, 21, 21, 21, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 22, 22, 22, 22, 22,
];

pub(crate) const SCALE_RL_CODES: [u32; 120] = [
    0xff0, 0x0, 0x1, 0x2, 0x3, 0x4, 0xc, 0xd,
    0xe, 0x26, 0x27, 0x28, 0x60, 0x61, 0x62, 0x63,
    0xe2, 0xe3, 0xe4, 0x1e8, 0x1e9, 0x1ea, 0x1eb, 0x3ee,
    0x3ef, 0x3f0, 0x7f0, 0x7f1, 0x7f2, 0xff1, 0xff2, 0xff3,
    0xff4, 0x1ff6, 0x5, 0xf, 0x10, 0x11, 0x29, 0x2a,
    0x2b, 0x64, 0x65, 0x66, 0x67, 0xe5, 0xe6, 0xe7,
    0x1ec, 0x1ed, 0x12, 0x2c, 0x2d, 0x2e, 0x68, 0x69,
    0x6a, 0x6b, 0xe8, 0xe9, 0xea, 0x1ee, 0x1ef, 0x1f0,
    0x3f1, 0x3f2, 0x2f, 0x6c, 0x6d, 0x6e, 0x6f, 0xeb,
    0xec, 0xed, 0x70, 0xee, 0xef, 0xf0, 0xf1, 0x1f1,
    0x1f2, 0x1f3, 0xf2, 0xf3, 0x1f4, 0x1f5, 0x1f6, 0x3f3,
    0x3f4, 0x3f5, 0x3f6, 0x3f7, 0x7f3, 0x7f4, 0x7f5, 0x7f6,
    0x7f7, 0xff5, 0xff6, 0xff7, 0xff8, 0xff9, 0xffa, 0x1ff7,
    0x1ff8, 0x1ff9, 0x1ffa, 0x1ffb, 0x3ff8, 0x3ff9, 0x3ffa, 0x3ffb,
    0x3ffc, 0x7ffa, 0x7ffb, 0x7ffc, 0x7ffd, 0x7ffe, 0xfffe, 0xffff,
];

pub(crate) const SCALE_RL_BITS: [u8; 120] = [
    12, 4, 4, 4, 4, 4, 5, 5, 5, 6, 6, 6, 7, 7, 7, 7,
    8, 8, 8, 9, 9, 9, 9, 10, 10, 10, 11, 11, 11, 12, 12, 12,
    12, 13, 4, 5, 5, 5, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8,
    9, 9, 5, 6, 6, 6, 7, 7, 7, 7, 8, 8, 8, 9, 9, 9,
    10, 10, 6, 7, 7, 7, 7, 8, 8, 8, 7, 8, 8, 8, 8, 9,
    9, 9, 8, 8, 9, 9, 9, 10, 10, 10, 10, 10, 11, 11, 11, 11,
    11, 12, 12, 12, 12, 12, 12, 13, 13, 13, 13, 13, 14, 14, 14, 14,
    14, 15, 15, 15, 15, 15, 16, 16,
];

pub(crate) const SCALE_RL_RUN: [u16; 120] = [
    0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13,
    14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29,
    30, 31, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13,
    14, 15, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13,
    14, 15, 0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2, 3, 4, 5,
    6, 7, 0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2, 3, 4, 0,
    1, 2, 3, 4, 0, 1, 2, 3, 4, 0, 1, 2, 3, 4, 0, 1,
    2, 3, 4, 0, 1, 2, 3, 4,
];

pub(crate) const SCALE_RL_LEVEL: [i32; 120] = [
    0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    2, 2, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3,
    3, 3, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5, 5, 5,
    5, 5, 6, 6, 6, 6, 6, 6, 6, 6, 8, 8, 8, 8, 8, 9,
    9, 9, 9, 9, 10, 10, 10, 10, 10, 11, 11, 11, 11, 11, 12, 12,
    12, 12, 12, 13, 13, 13, 13, 13,
];

pub(crate) const COEF0_CODES: [u32; 208] = [
    0xfe8, 0xc6, 0x0, 0x1, 0x2, 0x3, 0x4, 0x5,
    0x6, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x48,
    0x49, 0x4a, 0x4b, 0x4c, 0x4d, 0xc7, 0xc8, 0xc9,
    0xca, 0xcb, 0xcc, 0x1d4, 0x1d5, 0x1d6, 0x1d7, 0x1d8,
    0x1d9, 0x3de, 0x3df, 0x3e0, 0x3e1, 0x3e2, 0x3e3, 0x7e8,
    0x7e9, 0x7ea, 0x7eb, 0x7ec, 0x7ed, 0xfe9, 0xfea, 0xfeb,
    0xfec, 0xfed, 0xfee, 0xfef, 0x1fec, 0x1fed, 0x1fee, 0x1fef,
    0x1ff0, 0x1ff1, 0x3ff0, 0x3ff1, 0x3ff2, 0x3ff3, 0x3ff4, 0x3ff5,
    0x7ff8, 0x7ff9, 0x7, 0x8, 0x18, 0x19, 0x1a, 0x1b,
    0x1c, 0x1d, 0x1e, 0x4e, 0x4f, 0x50, 0x51, 0x52,
    0x53, 0xcd, 0xce, 0xcf, 0xd0, 0xd1, 0xd2, 0x1da,
    0x1db, 0x1dc, 0x1dd, 0x1de, 0x1df, 0x3e4, 0x3e5, 0x3e6,
    0x3e7, 0x3e8, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x54,
    0x55, 0x56, 0x57, 0x58, 0x59, 0xd3, 0xd4, 0xd5,
    0xd6, 0xd7, 0x5a, 0x5b, 0x5c, 0x5d, 0x5e, 0x5f,
    0x60, 0xd8, 0xd9, 0xda, 0xdb, 0xdc, 0xdd, 0x1e0,
    0x1e1, 0x1e2, 0x61, 0x62, 0xde, 0xdf, 0xe0, 0xe1,
    0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0x1e3,
    0x1e4, 0x1e5, 0xe9, 0x1e6, 0x1e7, 0x1e8, 0x1e9, 0x1ea,
    0x1eb, 0x3e9, 0x1ec, 0x1ed, 0x1ee, 0x3ea, 0x3eb, 0x3ec,
    0x3ed, 0x3ee, 0x3ef, 0x3f0, 0x3f1, 0x3f2, 0x3f3, 0x7ee,
    0x7ef, 0x7f0, 0x7f1, 0x7f2, 0x7f3, 0xff0, 0xff1, 0xff2,
    0xff3, 0xff4, 0xff5, 0x1ff2, 0x1ff3, 0x1ff4, 0x1ff5, 0x1ff6,
    0x1ff7, 0x3ff6, 0x3ff7, 0x3ff8, 0x3ff9, 0x3ffa, 0x3ffb, 0x7ffa,
    0x7ffb, 0x7ffc, 0x7ffd, 0xfffc, 0xfffd, 0x1fffc, 0x1fffd, 0x3fffc,
    0x3fffd, 0x7fffc, 0x7fffd, 0x7fffe, 0xffffe, 0x1ffffe, 0x3ffffe, 0x3fffff,
];

pub(crate) const COEF0_BITS: [u8; 208] = [
    12, 8, 5, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6, 7,
    7, 7, 7, 7, 7, 8, 8, 8, 8, 8, 8, 9, 9, 9, 9, 9,
    9, 10, 10, 10, 10, 10, 10, 11, 11, 11, 11, 11, 11, 12, 12, 12,
    12, 12, 12, 12, 13, 13, 13, 13, 13, 13, 14, 14, 14, 14, 14, 14,
    15, 15, 5, 5, 6, 6, 6, 6, 6, 6, 6, 7, 7, 7, 7, 7,
    7, 8, 8, 8, 8, 8, 8, 9, 9, 9, 9, 9, 9, 10, 10, 10,
    10, 10, 6, 6, 6, 6, 6, 7, 7, 7, 7, 7, 7, 8, 8, 8,
    8, 8, 7, 7, 7, 7, 7, 7, 7, 8, 8, 8, 8, 8, 8, 9,
    9, 9, 7, 7, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 9,
    9, 9, 8, 9, 9, 9, 9, 9, 9, 10, 9, 9, 9, 10, 10, 10,
    10, 10, 10, 10, 10, 10, 10, 11, 11, 11, 11, 11, 11, 12, 12, 12,
    12, 12, 12, 13, 13, 13, 13, 13, 13, 14, 14, 14, 14, 14, 14, 15,
    15, 15, 15, 16, 16, 17, 17, 18, 18, 19, 19, 19, 20, 21, 22, 22,
];

pub(crate) const COEF0_RUN: [u16; 208] = [
    0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13,
    14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29,
    30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45,
    46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61,
    62, 63, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13,
    14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29,
    30, 31, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13,
    14, 15, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13,
    14, 15, 0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2, 3, 4, 5,
    6, 7, 0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2, 3, 4, 5,
    6, 7, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1,
    2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1,
    2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

pub(crate) const COEF0_LEVEL: [i32; 208] = [
    0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    2, 2, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3,
    3, 3, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 4, 5, 5, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6,
    6, 6, 7, 7, 7, 7, 7, 7, 7, 7, 8, 8, 8, 8, 8, 8,
    8, 8, 9, 9, 9, 9, 10, 10, 10, 10, 11, 11, 11, 11, 12, 12,
    12, 12, 13, 13, 13, 13, 14, 14, 14, 14, 15, 15, 15, 15, 16, 16,
    16, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30,
];

pub(crate) const COEF1_CODES: [u32; 140] = [
    0xff6, 0xdc, 0x0, 0x2, 0x3, 0x4, 0x5, 0x1a,
    0x1b, 0x1c, 0x54, 0x55, 0x56, 0x57, 0xdd, 0xde,
    0xdf, 0x1e8, 0x1e9, 0x1ea, 0x1eb, 0x3ee, 0x3ef, 0x3f0,
    0x7f4, 0x7f5, 0x7f6, 0x7f7, 0xff7, 0xff8, 0xff9, 0x1ff8,
    0x1ff9, 0x1ffa, 0x6, 0x7, 0x8, 0x9, 0x1d, 0x1e,
    0x1f, 0x58, 0x59, 0x5a, 0xe0, 0xe1, 0xe2, 0xe3,
    0x1ec, 0x1ed, 0xa, 0xb, 0x20, 0x21, 0x22, 0x5b,
    0x5c, 0x5d, 0xc, 0x23, 0x24, 0x25, 0x5e, 0x5f,
    0x60, 0x61, 0x26, 0x27, 0x28, 0x62, 0x63, 0x64,
    0xe4, 0xe5, 0x29, 0x65, 0x66, 0x67, 0x68, 0xe6,
    0xe7, 0xe8, 0x69, 0x6a, 0x6b, 0xe9, 0x6c, 0x6d,
    0xea, 0xeb, 0xec, 0xed, 0xee, 0xef, 0xf0, 0xf1,
    0xf2, 0x1ee, 0xf3, 0x1ef, 0x1f0, 0x1f1, 0x1f2, 0x1f3,
    0x1f4, 0x3f1, 0x1f5, 0x1f6, 0x3f2, 0x3f3, 0x3f4, 0x3f5,
    0x3f6, 0x3f7, 0x3f8, 0x3f9, 0x7f8, 0x7f9, 0x7fa, 0xffa,
    0xffb, 0x1ffb, 0x1ffc, 0x1ffd, 0x3ffc, 0x3ffd, 0x7ffc, 0x7ffd,
    0xfffc, 0xfffd, 0x1fffc, 0x1fffd, 0x3fffc, 0x3fffd, 0x7fffc, 0x7fffd,
    0x7fffe, 0xffffe, 0x1ffffe, 0x1fffff,
];

pub(crate) const COEF1_BITS: [u8; 140] = [
    12, 8, 4, 5, 5, 5, 5, 6, 6, 6, 7, 7, 7, 7, 8, 8,
    8, 9, 9, 9, 9, 10, 10, 10, 11, 11, 11, 11, 12, 12, 12, 13,
    13, 13, 5, 5, 5, 5, 6, 6, 6, 7, 7, 7, 8, 8, 8, 8,
    9, 9, 5, 5, 6, 6, 6, 7, 7, 7, 5, 6, 6, 6, 7, 7,
    7, 7, 6, 6, 6, 7, 7, 7, 8, 8, 6, 7, 7, 7, 7, 8,
    8, 8, 7, 7, 7, 8, 7, 7, 8, 8, 8, 8, 8, 8, 8, 8,
    8, 9, 8, 9, 9, 9, 9, 9, 9, 10, 9, 9, 10, 10, 10, 10,
    10, 10, 10, 10, 11, 11, 11, 12, 12, 13, 13, 13, 14, 14, 15, 15,
    16, 16, 17, 17, 18, 18, 19, 19, 19, 20, 21, 21,
];

pub(crate) const COEF1_RUN: [u16; 140] = [
    0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13,
    14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29,
    30, 31, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13,
    14, 15, 0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2, 3, 4, 5,
    6, 7, 0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2, 3, 4, 5,
    6, 7, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1,
    2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1,
    2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

pub(crate) const COEF1_LEVEL: [i32; 140] = [
    0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    2, 2, 3, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4, 4, 4, 4,
    4, 4, 5, 5, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6,
    6, 6, 7, 7, 7, 7, 8, 8, 8, 8, 9, 9, 9, 9, 10, 10,
    10, 10, 11, 11, 11, 11, 12, 12, 12, 12, 13, 13, 13, 13, 14, 14,
    14, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28,
    29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40,
];

pub(crate) const VEC4_CODES: [u32; 127] = [
    0x0, 0x4, 0x26, 0x5a, 0x1c8, 0x3c8, 0x5, 0x27,
    0x5b, 0x1c9, 0x3c9, 0x28, 0x5c, 0x1ca, 0x3ca, 0x5d,
    0x1cb, 0x3cb, 0x1cc, 0x3cc, 0x3cd, 0x6, 0x29, 0x5e,
    0x1cd, 0x3ce, 0x2a, 0x5f, 0x1ce, 0x3cf, 0x60, 0x1cf,
    0x3d0, 0x1d0, 0x3d1, 0x3d2, 0x2b, 0x61, 0x1d1, 0x3d3,
    0x62, 0x1d2, 0x3d4, 0x1d3, 0x3d5, 0x3d6, 0x63, 0x1d4,
    0x3d7, 0x1d5, 0x3d8, 0x3d9, 0x1d6, 0x3da, 0x3db, 0x3dc,
    0x7, 0x2c, 0x64, 0x1d7, 0x3dd, 0x10, 0x65, 0x1d8,
    0x3de, 0x66, 0x1d9, 0x3df, 0x1da, 0x3e0, 0x3e1, 0x11,
    0x67, 0x1db, 0x3e2, 0x68, 0x1dc, 0x3e3, 0x1dd, 0x3e4,
    0x3e5, 0x69, 0x1de, 0x3e6, 0x1df, 0x3e7, 0x3e8, 0x1e0,
    0x3e9, 0x3ea, 0x3eb, 0x12, 0x6a, 0x1e1, 0x3ec, 0x6b,
    0x1e2, 0x3ed, 0x1e3, 0x3ee, 0x3ef, 0x6c, 0xdc, 0x3f0,
    0xdd, 0x3f1, 0x3f2, 0xde, 0x3f3, 0x3f4, 0x3f5, 0x6d,
    0xdf, 0x3f6, 0xe0, 0x3f7, 0x3f8, 0xe1, 0x3f9, 0x3fa,
    0x3fb, 0xe2, 0x3fc, 0x3fd, 0x3fe, 0x3ff, 0xe3,
];

pub(crate) const VEC4_BITS: [u8; 127] = [
    2, 4, 6, 7, 9, 10, 4, 6, 7, 9, 10, 6, 7, 9, 10, 7,
    9, 10, 9, 10, 10, 4, 6, 7, 9, 10, 6, 7, 9, 10, 7, 9,
    10, 9, 10, 10, 6, 7, 9, 10, 7, 9, 10, 9, 10, 10, 7, 9,
    10, 9, 10, 10, 9, 10, 10, 10, 4, 6, 7, 9, 10, 5, 7, 9,
    10, 7, 9, 10, 9, 10, 10, 5, 7, 9, 10, 7, 9, 10, 9, 10,
    10, 7, 9, 10, 9, 10, 10, 9, 10, 10, 10, 5, 7, 9, 10, 7,
    9, 10, 9, 10, 10, 7, 8, 10, 8, 10, 10, 8, 10, 10, 10, 7,
    8, 10, 8, 10, 10, 8, 10, 10, 10, 8, 10, 10, 10, 10, 8,
];

pub(crate) const SYMBOL_TO_VEC4: [u16; 126] = [
    0x0000, 0x0001, 0x0002, 0x0003, 0x0004, 0x0005, 0x0010, 0x0011,
    0x0012, 0x0013, 0x0014, 0x0020, 0x0021, 0x0022, 0x0023, 0x0030,
    0x0031, 0x0032, 0x0040, 0x0041, 0x0050, 0x0100, 0x0101, 0x0102,
    0x0103, 0x0104, 0x0110, 0x0111, 0x0112, 0x0113, 0x0120, 0x0121,
    0x0122, 0x0130, 0x0131, 0x0140, 0x0200, 0x0201, 0x0202, 0x0203,
    0x0210, 0x0211, 0x0212, 0x0220, 0x0221, 0x0230, 0x0300, 0x0301,
    0x0302, 0x0310, 0x0311, 0x0320, 0x0400, 0x0401, 0x0410, 0x0500,
    0x1000, 0x1001, 0x1002, 0x1003, 0x1004, 0x1010, 0x1011, 0x1012,
    0x1013, 0x1020, 0x1021, 0x1022, 0x1030, 0x1031, 0x1040, 0x1100,
    0x1101, 0x1102, 0x1103, 0x1110, 0x1111, 0x1112, 0x1120, 0x1121,
    0x1130, 0x1200, 0x1201, 0x1202, 0x1210, 0x1211, 0x1220, 0x1300,
    0x1301, 0x1310, 0x1400, 0x2000, 0x2001, 0x2002, 0x2003, 0x2010,
    0x2011, 0x2012, 0x2020, 0x2021, 0x2030, 0x2100, 0x2101, 0x2102,
    0x2110, 0x2111, 0x2120, 0x2200, 0x2201, 0x2210, 0x2300, 0x3000,
    0x3001, 0x3002, 0x3010, 0x3011, 0x3020, 0x3100, 0x3101, 0x3110,
    0x3200, 0x4000, 0x4001, 0x4010, 0x4100, 0x5000,
];

pub(crate) const VEC2_CODES: [u32; 137] = [
    0x0, 0x2, 0x8, 0x16, 0x34, 0x72, 0x1ec, 0x1ed,
    0x3ec, 0x7ea, 0xfe8, 0x1fe6, 0x3fe4, 0x7fe2, 0xffe2, 0xffe3,
    0x3, 0x9, 0x17, 0x35, 0x73, 0xf0, 0x1ee, 0x3ed,
    0x7eb, 0xfe9, 0x1fe7, 0x3fe5, 0x7fe3, 0xffe4, 0xffe5, 0xa,
    0x18, 0x36, 0x74, 0xf1, 0x1ef, 0x3ee, 0x7ec, 0xfea,
    0x1fe8, 0x3fe6, 0x7fe4, 0xffe6, 0xffe7, 0x19, 0x37, 0x75,
    0xf2, 0x1f0, 0x3ef, 0x7ed, 0xfeb, 0x1fe9, 0x3fe7, 0x7fe5,
    0xffe8, 0xffe9, 0x38, 0x76, 0xf3, 0x1f1, 0x3f0, 0x7ee,
    0xfec, 0x1fea, 0x3fe8, 0x7fe6, 0xffea, 0xffeb, 0x77, 0xf4,
    0x1f2, 0x3f1, 0x7ef, 0xfed, 0x1feb, 0x3fe9, 0x7fe7, 0xffec,
    0xffed, 0xf5, 0x1f3, 0x3f2, 0x7f0, 0xfee, 0x1fec, 0x3fea,
    0x7fe8, 0xffee, 0xffef, 0x1f4, 0x3f3, 0x7f1, 0xfef, 0x1fed,
    0x3feb, 0x7fe9, 0xfff0, 0xfff1, 0x3f4, 0x7f2, 0xff0, 0x1fee,
    0x3fec, 0x7fea, 0xfff2, 0xfff3, 0x7f3, 0xff1, 0x1fef, 0x3fed,
    0x7feb, 0xfff4, 0xfff5, 0xff2, 0x1ff0, 0x3fee, 0x7fec, 0xfff6,
    0xfff7, 0x1ff1, 0x3fef, 0x7fed, 0xfff8, 0xfff9, 0x3ff0, 0x7fee,
    0xfffa, 0xfffb, 0x7fef, 0xfffc, 0xfffd, 0x7ff0, 0xfffe, 0xffff,
    0x1f5,
];

pub(crate) const VEC2_BITS: [u8; 137] = [
    2, 3, 4, 5, 6, 7, 9, 9, 10, 11, 12, 13, 14, 15, 16, 16,
    3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 16, 4,
    5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 16, 5, 6, 7,
    8, 9, 10, 11, 12, 13, 14, 15, 16, 16, 6, 7, 8, 9, 10, 11,
    12, 13, 14, 15, 16, 16, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
    16, 8, 9, 10, 11, 12, 13, 14, 15, 16, 16, 9, 10, 11, 12, 13,
    14, 15, 16, 16, 10, 11, 12, 13, 14, 15, 16, 16, 11, 12, 13, 14,
    15, 16, 16, 12, 13, 14, 15, 16, 16, 13, 14, 15, 16, 16, 14, 15,
    16, 16, 15, 16, 16, 15, 16, 16, 9,
];

pub(crate) const SYMBOL_TO_VEC2: [u8; 136] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
    0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17,
    0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x20,
    0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2a, 0x2b, 0x2c, 0x2d, 0x30, 0x31, 0x32,
    0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a,
    0x3b, 0x3c, 0x40, 0x41, 0x42, 0x43, 0x44, 0x45,
    0x46, 0x47, 0x48, 0x49, 0x4a, 0x4b, 0x50, 0x51,
    0x52, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59,
    0x5a, 0x60, 0x61, 0x62, 0x63, 0x64, 0x65, 0x66,
    0x67, 0x68, 0x69, 0x70, 0x71, 0x72, 0x73, 0x74,
    0x75, 0x76, 0x77, 0x78, 0x80, 0x81, 0x82, 0x83,
    0x84, 0x85, 0x86, 0x87, 0x90, 0x91, 0x92, 0x93,
    0x94, 0x95, 0x96, 0xa0, 0xa1, 0xa2, 0xa3, 0xa4,
    0xa5, 0xb0, 0xb1, 0xb2, 0xb3, 0xb4, 0xc0, 0xc1,
    0xc2, 0xc3, 0xd0, 0xd1, 0xd2, 0xe0, 0xe1, 0xf0,
];

pub(crate) const VEC1_CODES: [u32; 101] = [
    0x0, 0x1, 0x4, 0x5, 0xc, 0xd, 0x1c, 0x1d,
    0x3c, 0x3d, 0x7c, 0x7d, 0xfc, 0x1fa, 0x1fb, 0x1fc,
    0x3fc, 0x3fd, 0x7fc, 0x7fd, 0xffc, 0xffd, 0x1ffc, 0x1ffd,
    0x3ffc, 0x3ffd, 0x7ffc, 0xfffa, 0xfffb, 0xfffc, 0x1fffa, 0x1fffb,
    0x3fff8, 0x3fff9, 0x7fff4, 0x7fff5, 0x7fff6, 0xfffee, 0xfffef, 0x1fffe0,
    0x1fffe1, 0x1fffe2, 0x3fffc6, 0x3fffc7, 0x3fffc8, 0x3fffc9, 0x3fffca, 0x3fffcb,
    0x3fffcc, 0x3fffcd, 0x3fffce, 0x3fffcf, 0x3fffd0, 0x3fffd1, 0x3fffd2, 0x3fffd3,
    0x3fffd4, 0x3fffd5, 0x3fffd6, 0x3fffd7, 0x3fffd8, 0x3fffd9, 0x3fffda, 0x3fffdb,
    0x3fffdc, 0x3fffdd, 0x3fffde, 0x3fffdf, 0x3fffe0, 0x3fffe1, 0x3fffe2, 0x3fffe3,
    0x3fffe4, 0x3fffe5, 0x3fffe6, 0x3fffe7, 0x3fffe8, 0x3fffe9, 0x3fffea, 0x3fffeb,
    0x3fffec, 0x3fffed, 0x3fffee, 0x3fffef, 0x3ffff0, 0x3ffff1, 0x3ffff2, 0x3ffff3,
    0x3ffff4, 0x3ffff5, 0x3ffff6, 0x3ffff7, 0x3ffff8, 0x3ffff9, 0x3ffffa, 0x3ffffb,
    0x3ffffc, 0x3ffffd, 0x3ffffe, 0x3fffff, 0x1fd,
];

pub(crate) const VEC1_BITS: [u8; 101] = [
    2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 9, 9, 9,
    10, 10, 11, 11, 12, 12, 13, 13, 14, 14, 15, 16, 16, 16, 17, 17,
    18, 18, 19, 19, 19, 20, 20, 21, 21, 21, 22, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22, 22,
    22, 22, 22, 22, 9,
];

/// The lookup width used for the coefficient and vector codebooks.
const VLC_BITS: u32 = 9;
/// The lookup width used for the scale factor DPCM codebook.
const SCALE_VLC_BITS: u32 = 8;

pub(crate) struct CodebookSet {
    /// Scale factor DPCM codebook.
    pub sf: Codebook,
    /// Scale factor run-level codebook.
    pub sf_rl: Codebook,
    /// Coefficient run-level codebooks.
    pub coef: [Codebook; 2],
    /// Four coefficients per symbol.
    pub vec4: Codebook,
    /// Two coefficients per symbol.
    pub vec2: Codebook,
    /// One coefficient per symbol.
    pub vec1: Codebook,
}

fn make_codebook(codes: &[u32], bits: &[u8], lookup_width: u32) -> Codebook {
    let values: Vec<u16> = (0..codes.len() as u16).collect();
    CodebookBuilder::new().bits_per_read(lookup_width).make(codes, bits, &values)
}

lazy_static! {
    pub(crate) static ref CODEBOOKS: CodebookSet = CodebookSet {
        sf: make_codebook(&SCALE_CODES, &SCALE_BITS, SCALE_VLC_BITS),
        sf_rl: make_codebook(&SCALE_RL_CODES, &SCALE_RL_BITS, VLC_BITS),
        coef: [
            make_codebook(&COEF0_CODES, &COEF0_BITS, VLC_BITS),
            make_codebook(&COEF1_CODES, &COEF1_BITS, VLC_BITS),
        ],
        vec4: make_codebook(&VEC4_CODES, &VEC4_BITS, VLC_BITS),
        vec2: make_codebook(&VEC2_CODES, &VEC2_BITS, VLC_BITS),
        vec1: make_codebook(&VEC1_CODES, &VEC1_BITS, VLC_BITS),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmapro_core::io::{BitReaderLtr, BitWriterLtr, ReadBitsLtr};

    fn roundtrip(codebook: &Codebook, codes: &[u32], bits: &[u8]) {
        // Every codeword in the table must decode back to its own symbol.
        for symbol in 0..codes.len() {
            let mut bw = BitWriterLtr::new();
            bw.put_bits(u32::from(bits[symbol]), codes[symbol]);
            // Pad so the reader never runs dry mid-lookup.
            bw.put_bits(32, 0xffff_ffff);

            let mut bs = BitReaderLtr::new(bw.bytes());
            let (value, len) = bs.read_codebook(codebook).unwrap();

            assert_eq!(usize::from(value), symbol);
            assert_eq!(len, u32::from(bits[symbol]));
        }
    }

    #[test]
    fn verify_codebook_roundtrips() {
        roundtrip(&CODEBOOKS.sf, &SCALE_CODES, &SCALE_BITS);
        roundtrip(&CODEBOOKS.sf_rl, &SCALE_RL_CODES, &SCALE_RL_BITS);
        roundtrip(&CODEBOOKS.coef[0], &COEF0_CODES, &COEF0_BITS);
        roundtrip(&CODEBOOKS.coef[1], &COEF1_CODES, &COEF1_BITS);
        roundtrip(&CODEBOOKS.vec4, &VEC4_CODES, &VEC4_BITS);
        roundtrip(&CODEBOOKS.vec2, &VEC2_CODES, &VEC2_BITS);
        roundtrip(&CODEBOOKS.vec1, &VEC1_CODES, &VEC1_BITS);
    }

    #[test]
    fn verify_codebooks_complete() {
        // Kraft sums must be exactly one: any bit pattern decodes to some symbol.
        for bits in
            [&SCALE_BITS[..], &SCALE_RL_BITS, &COEF0_BITS, &COEF1_BITS, &VEC4_BITS, &VEC2_BITS, &VEC1_BITS]
        {
            let kraft: u64 = bits.iter().map(|&l| 1u64 << (32 - u32::from(l))).sum();
            assert_eq!(kraft, 1u64 << 32);
        }
    }

    #[test]
    fn verify_vector_symbol_maps() {
        // vec4 covers every 4-tuple with digit sum <= 5 exactly once.
        let mut seen4 = std::collections::HashSet::new();
        for &packed in SYMBOL_TO_VEC4.iter() {
            let sum = (packed >> 12) + ((packed >> 8) & 0xf) + ((packed >> 4) & 0xf) + (packed & 0xf);
            assert!(sum <= 5);
            assert!(seen4.insert(packed));
        }

        // vec2 covers every pair with sum <= 15 exactly once.
        let mut seen2 = std::collections::HashSet::new();
        for &packed in SYMBOL_TO_VEC2.iter() {
            assert!(u32::from(packed >> 4) + u32::from(packed & 0xf) <= 15);
            assert!(seen2.insert(packed));
        }
    }

    #[test]
    fn verify_run_level_tables() {
        // Symbols 0 and 1 are escape and end-of-block; real entries start at 2.
        for (runs, levels) in [
            (&SCALE_RL_RUN[..], &SCALE_RL_LEVEL[..]),
            (&COEF0_RUN[..], &COEF0_LEVEL[..]),
            (&COEF1_RUN[..], &COEF1_LEVEL[..]),
        ] {
            assert_eq!(runs.len(), levels.len());
            for (&run, &level) in runs.iter().zip(levels.iter()).skip(2) {
                assert!(level > 0);
                assert!(run < 64);
            }
        }
    }
}
