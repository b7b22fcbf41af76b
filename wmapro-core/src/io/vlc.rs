// wmapro-rs
// Copyright (c) 2026 The wmapro-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `vlc` module provides support for decoding variable-length codes (VLC).

/// A single entry in a `Codebook`.
///
/// A `Codebook` is structured as a flattened table-of-tables. Wherein there is one table
/// partitioned into many sub-tables. Each sub-table is a look-up table for a portion of a
/// complete codeword. Upon look-up, a sub-table either contains the decoded value or indicates
/// how many further bits should be read and the offset of the sub-table to use for the next
/// look-up. In this way a tree of prefixes is formed where the leaf nodes contain decoded
/// values.
#[derive(Copy, Clone)]
pub(crate) enum CodebookEntry {
    /// The looked-up bits complete a codeword of `len` bits (relative to the start of the
    /// sub-table). A length of 0 marks a prefix no codeword uses.
    Value { value: u16, len: u8 },
    /// The looked-up bits are the prefix of one or more longer codewords. The next look-up
    /// should read `len` bits and index the sub-table starting at `offset`.
    Jump { offset: u32, len: u8 },
}

/// A `Codebook` maps codewords to decoded values. It is used in conjunction with
/// [`ReadBitsLtr::read_codebook`](crate::io::ReadBitsLtr::read_codebook).
pub struct Codebook {
    pub(crate) table: Vec<CodebookEntry>,
    pub(crate) init_len: u32,
}

/// `CodebookBuilder` generates a `Codebook` from a set of codewords, codeword lengths, and
/// decoded values.
pub struct CodebookBuilder {
    bits_per_read: u32,
}

impl Default for CodebookBuilder {
    fn default() -> Self {
        CodebookBuilder { bits_per_read: 8 }
    }
}

impl CodebookBuilder {
    /// Instantiates a new `CodebookBuilder`.
    pub fn new() -> Self {
        Default::default()
    }

    /// Specify the maximum number of bits that should be consumed from the source at a time.
    /// This value must be within the range 1 <= `num_bits` <= 16.
    pub fn bits_per_read(&mut self, num_bits: u32) -> &mut Self {
        assert!(num_bits <= 16);
        assert!(num_bits > 0);
        self.bits_per_read = num_bits;
        self
    }

    /// Construct a `Codebook` using the given codewords, their respective lengths, and values.
    ///
    /// Codewords are taken to be right-aligned within `codes`. Entries with a length of 0 are
    /// unused and skipped. The codewords must form a prefix-free code.
    pub fn make(&self, codes: &[u32], lens: &[u8], values: &[u16]) -> Codebook {
        assert!(codes.len() == lens.len());
        assert!(codes.len() == values.len());

        let mut words = Vec::with_capacity(codes.len());

        for (i, (&code, &len)) in codes.iter().zip(lens).enumerate() {
            if len > 0 {
                assert!(len <= 32);
                words.push((code, len, values[i]));
            }
        }

        let mut table = Vec::new();

        let init_len = if words.is_empty() {
            0
        }
        else {
            build_sub_table(&mut table, &words, 0, self.bits_per_read).1
        };

        Codebook { table, init_len }
    }
}

/// Recursively builds the sub-table for all codewords sharing a `prefix_len` bit prefix.
/// Returns the offset of the sub-table and its look-up width.
fn build_sub_table(
    table: &mut Vec<CodebookEntry>,
    words: &[(u32, u8, u16)],
    prefix_len: u32,
    bits_per_read: u32,
) -> (u32, u32) {
    let max_rel =
        words.iter().map(|&(_, len, _)| u32::from(len) - prefix_len).max().unwrap_or(0);
    let width = max_rel.min(bits_per_read);

    let offset = table.len() as u32;
    table.resize(table.len() + (1 << width), CodebookEntry::Value { value: 0, len: 0 });

    // Fill value entries, and collect longer codewords per prefix for recursion.
    let mut pending: Vec<(u32, Vec<(u32, u8, u16)>)> = Vec::new();

    for &(code, len, value) in words {
        let rel_len = u32::from(len) - prefix_len;

        if rel_len <= width {
            // The codeword terminates within this sub-table. All table slots sharing the
            // codeword as their prefix resolve to it.
            let base = (code << (width - rel_len)) & ((1 << width) - 1);

            for slot in 0..(1 << (width - rel_len)) {
                let idx = (offset + base + slot) as usize;
                table[idx] = CodebookEntry::Value { value, len: rel_len as u8 };
            }
        }
        else {
            let prefix = (code >> (rel_len - width)) & ((1 << width) - 1);

            match pending.iter_mut().find(|(p, _)| *p == prefix) {
                Some((_, group)) => group.push((code, len, value)),
                None => pending.push((prefix, vec![(code, len, value)])),
            }
        }
    }

    for (prefix, group) in pending {
        let (sub_offset, sub_width) =
            build_sub_table(table, &group, prefix_len + width, bits_per_read);

        table[(offset + prefix) as usize] =
            CodebookEntry::Jump { offset: sub_offset, len: sub_width as u8 };
    }

    (offset, width)
}
