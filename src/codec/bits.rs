//! Bit-level packing for the Huffman payload.
//!
//! Layout: one header byte holding the trailing padding-bit count, then the
//! code bits packed MSB-first. Padding is `8 - (bits % 8)` and deliberately
//! stays 8 (a full extra zero byte) when the stream is already byte-aligned;
//! this matches the on-disk format this crate inherits and costs one byte.

use crate::error::{ObscuraError, Result};

/// Appends bits MSB-first into a byte buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Append the `len` low bits of `bits`, most significant first.
    pub fn push_bits(&mut self, bits: u128, len: u8) {
        for i in (0..len).rev() {
            let bit = (bits >> i) & 1 == 1;
            if self.bit_len % 8 == 0 {
                self.bytes.push(0);
            }
            if bit {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 1 << (7 - (self.bit_len % 8));
            }
            self.bit_len += 1;
        }
    }

    /// Close the stream: pad to a byte boundary with zero bits and prepend
    /// the one-byte padding header. Output length is exactly
    /// `1 + (bit_len + padding) / 8` bytes.
    pub fn pack(self) -> (Vec<u8>, u8) {
        let padding = (8 - (self.bit_len % 8)) as u8; // 8 when already aligned
        let mut packed = Vec::with_capacity(1 + (self.bit_len + padding as usize) / 8);
        packed.push(padding);
        packed.extend_from_slice(&self.bytes);
        if padding == 8 {
            packed.push(0);
        }
        (packed, padding)
    }
}

/// Reads a packed buffer bit by bit, stopping before the trailing padding.
#[derive(Debug)]
pub struct BitReader<'a> {
    payload: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> BitReader<'a> {
    /// Open a packed buffer: consume the padding header and bound the cursor
    /// to the real data bits.
    pub fn unpack(packed: &'a [u8]) -> Result<Self> {
        let (&padding, payload) = packed
            .split_first()
            .ok_or_else(|| ObscuraError::InvalidFormat("empty packed buffer".to_string()))?;
        if !(1..=8).contains(&padding) {
            return Err(ObscuraError::InvalidFormat(format!(
                "padding header {} out of range",
                padding
            )));
        }
        let total_bits = payload.len() * 8;
        if total_bits < padding as usize {
            return Err(ObscuraError::InvalidFormat(
                "packed buffer shorter than its padding".to_string(),
            ));
        }
        Ok(Self {
            payload,
            pos: 0,
            end: total_bits - padding as usize,
        })
    }

    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn next_bit(&mut self) -> Option<bool> {
        if self.pos >= self.end {
            return None;
        }
        let bit = (self.payload[self.pos / 8] >> (7 - (self.pos % 8))) & 1 == 1;
        self.pos += 1;
        Some(bit)
    }
}
