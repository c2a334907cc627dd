//! Size estimates and compression-ratio accounting.
//!
//! RLE and Huffman sizes are the same estimates the original reporting used:
//! two bytes per RLE token, and packed bytes plus a text rendering of the
//! code table for Huffman. Neither is the exact serialized size; they exist
//! for the ratio report, not for allocation.

use crate::codec::huffman::{CodeTable, HuffmanBlock};
use crate::codec::rle::RunToken;
use crate::frame::Frame;

/// Raw frame estimate: one byte per element.
pub fn raw_size(frame: &Frame) -> u64 {
    frame.len() as u64
}

/// Fixed two-byte-per-token estimate for an RLE token list.
pub fn rle_size(tokens: &[RunToken]) -> u64 {
    tokens.len() as u64 * 2
}

/// Huffman block estimate: packed byte length plus the code-table text.
pub fn huffman_size(block: &HuffmanBlock) -> u64 {
    block.data.len() as u64 + code_table_text(&block.table).len() as u64
}

/// Enumerable text form of a code table: entries `sym: "bits"` in symbol
/// order, brace-wrapped. Deterministic, so the size estimate is too.
pub fn code_table_text(table: &CodeTable) -> String {
    let entries: Vec<String> = table
        .entries()
        .map(|(symbol, code)| format!("{}: \"{}\"", symbol, code.bitstring()))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Percentage reduction: `(1 - compressed / original) * 100`. Zero when the
/// original size is zero (guard, not a fault); negative when the compressed
/// representation is larger.
pub fn ratio_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - compressed as f64 / original as f64) * 100.0
}

/// Per-frame size report handed to display/persistence collaborators.
#[derive(Debug, Clone, Copy)]
pub struct CompressionReport {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl CompressionReport {
    pub fn new(original_bytes: u64, compressed_bytes: u64) -> Self {
        Self { original_bytes, compressed_bytes }
    }

    pub fn original_kb(&self) -> f64 {
        self.original_bytes as f64 / 1024.0
    }

    pub fn compressed_kb(&self) -> f64 {
        self.compressed_bytes as f64 / 1024.0
    }

    pub fn ratio_percent(&self) -> f64 {
        ratio_percent(self.original_bytes, self.compressed_bytes)
    }
}

/// Running totals across the frames of a video; the overall ratio comes
/// from the summed sizes, not an average of per-frame ratios.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchTotals {
    pub frames: u64,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl BatchTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, report: &CompressionReport) {
        self.frames += 1;
        self.original_bytes += report.original_bytes;
        self.compressed_bytes += report.compressed_bytes;
    }

    pub fn ratio_percent(&self) -> f64 {
        ratio_percent(self.original_bytes, self.compressed_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{huffman, rle};
    use crate::frame::Shape;

    #[test]
    fn test_ratio_zero_original_guard() {
        assert_eq!(ratio_percent(0, 100), 0.0);
    }

    #[test]
    fn test_ratio_sign() {
        // expansion produces a negative percentage
        assert!(ratio_percent(10, 20) < 0.0);
        // non-empty compressed output never reaches 100
        assert!(ratio_percent(1_000_000, 1) < 100.0);
        assert_eq!(ratio_percent(100, 50), 50.0);
    }

    #[test]
    fn test_rle_token_estimate() {
        let tokens = rle::encode(&[255u8; 5]).unwrap();
        assert_eq!(rle_size(&tokens), 2);
        let tokens = rle::encode(&[1, 2, 1, 2, 1]).unwrap();
        assert_eq!(rle_size(&tokens), 10);
    }

    #[test]
    fn test_code_table_text_deterministic() {
        let block = huffman::encode(&[9, 9, 9, 7]).unwrap();
        let text = code_table_text(&block.table);
        assert_eq!(text, "{7: \"0\", 9: \"1\"}");
        assert_eq!(huffman_size(&block), block.data.len() as u64 + text.len() as u64);
    }

    #[test]
    fn test_raw_size_is_element_count() {
        let frame = Frame::new(Shape::new(2, 3, 3), vec![0u8; 18]).unwrap();
        assert_eq!(raw_size(&frame), 18);
    }

    #[test]
    fn test_batch_totals() {
        let mut totals = BatchTotals::new();
        totals.add(&CompressionReport::new(100, 40));
        totals.add(&CompressionReport::new(100, 60));
        assert_eq!(totals.frames, 2);
        assert_eq!(totals.original_bytes, 200);
        assert_eq!(totals.compressed_bytes, 100);
        assert_eq!(totals.ratio_percent(), 50.0);
    }
}
