//! Per-frame Huffman coding.
//!
//! The tree is rebuilt from scratch for every frame (no codebook persists
//! across frames) and lives in an index-linked arena. Heap ties are broken by
//! an insertion sequence number so the tree shape, and therefore the packed
//! output, is identical across runs and platforms.

use crate::codec::bits::{BitReader, BitWriter};
use crate::codec::freq::FrequencyTable;
use crate::error::{ObscuraError, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Node {
    symbol: Option<u8>,
    left: Option<usize>,
    right: Option<usize>,
}

/// Binary prefix-code tree over the symbols of one frequency table.
#[derive(Debug)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

impl HuffmanTree {
    /// Build by repeatedly merging the two lowest-frequency nodes. The first
    /// node popped becomes the left child. With one distinct symbol the loop
    /// never runs and the lone leaf is the root.
    pub fn from_frequencies(freqs: &FrequencyTable) -> Result<Self> {
        let mut nodes = Vec::with_capacity(freqs.distinct() * 2);
        let mut heap: BinaryHeap<Reverse<(u64, u64, usize)>> = BinaryHeap::new();
        let mut seq: u64 = 0;

        for (symbol, count) in freqs.entries() {
            let idx = nodes.len();
            nodes.push(Node { symbol: Some(symbol), left: None, right: None });
            heap.push(Reverse((count, seq, idx)));
            seq += 1;
        }

        while heap.len() > 1 {
            let Reverse((f1, _, i1)) = heap.pop().ok_or(ObscuraError::EmptyInput)?;
            let Reverse((f2, _, i2)) = heap.pop().ok_or(ObscuraError::EmptyInput)?;
            let idx = nodes.len();
            nodes.push(Node { symbol: None, left: Some(i1), right: Some(i2) });
            heap.push(Reverse((f1 + f2, seq, idx)));
            seq += 1;
        }

        let Reverse((_, _, root)) = heap.pop().ok_or(ObscuraError::EmptyInput)?;
        Ok(Self { nodes, root })
    }
}

/// One prefix code. Depth of a Huffman tree with u64 frequencies is bounded
/// by Fibonacci growth of the subtree weights (< 96 levels), so 128 bits of
/// storage always suffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    pub bits: u128,
    pub len: u8,
}

impl Code {
    fn child(self, bit: u8) -> Self {
        Self { bits: (self.bits << 1) | bit as u128, len: self.len + 1 }
    }

    pub fn bitstring(&self) -> String {
        (0..self.len)
            .rev()
            .map(|i| if (self.bits >> i) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

/// Symbol -> prefix code mapping; prefix-free by construction.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: [Option<Code>; 256],
}

impl CodeTable {
    pub fn empty() -> Self {
        Self { codes: [None; 256] }
    }

    /// Walk the tree with an explicit stack, appending 0 going left and 1
    /// going right. A leaf root (single distinct symbol) would otherwise get
    /// the empty code, so it is assigned the single bit "0".
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut table = Self::empty();
        let mut stack = vec![(tree.root, Code { bits: 0, len: 0 })];
        while let Some((idx, code)) = stack.pop() {
            let node = &tree.nodes[idx];
            if let Some(symbol) = node.symbol {
                let code = if code.len == 0 { Code { bits: 0, len: 1 } } else { code };
                table.codes[symbol as usize] = Some(code);
            } else {
                if let Some(right) = node.right {
                    stack.push((right, code.child(1)));
                }
                if let Some(left) = node.left {
                    stack.push((left, code.child(0)));
                }
            }
        }
        table
    }

    pub fn get(&self, symbol: u8) -> Option<Code> {
        self.codes[symbol as usize]
    }

    pub fn insert(&mut self, symbol: u8, code: Code) {
        self.codes[symbol as usize] = Some(code);
    }

    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(|c| c.is_none())
    }

    /// (symbol, code) pairs in symbol order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(s, c)| c.map(|code| (s as u8, code)))
    }
}

/// The packed result for one frame: padded bit data (with its one-byte
/// padding header prefixed), the code table, and the padding count stored
/// redundantly. The frame shape travels in the container, not here.
#[derive(Debug)]
pub struct HuffmanBlock {
    pub data: Vec<u8>,
    pub table: CodeTable,
    pub padding: u8,
}

/// Compress a flattened symbol stream: count, build tree, derive codes,
/// concatenate per-symbol codes MSB-first, pad and prefix the header byte.
pub fn encode(symbols: &[u8]) -> Result<HuffmanBlock> {
    let freqs = FrequencyTable::build(symbols)?;
    let tree = HuffmanTree::from_frequencies(&freqs)?;
    let table = CodeTable::from_tree(&tree);

    let mut writer = BitWriter::new();
    for &s in symbols {
        let code = table.get(s).ok_or_else(|| {
            ObscuraError::InvalidFormat(format!("symbol {} missing from code table", s))
        })?;
        writer.push_bits(code.bits, code.len);
    }
    let (data, padding) = writer.pack();
    Ok(HuffmanBlock { data, table, padding })
}

// Decode walks a trie rebuilt from the code table rather than the original
// frequency tree, since only the table survives in the container.
struct DecodeNode {
    symbol: Option<u8>,
    children: [Option<usize>; 2],
}

struct DecodeTree {
    nodes: Vec<DecodeNode>,
}

impl DecodeTree {
    fn from_table(table: &CodeTable) -> Result<Self> {
        let mut nodes = vec![DecodeNode { symbol: None, children: [None, None] }];
        for (symbol, code) in table.entries() {
            let mut idx = 0;
            for i in (0..code.len).rev() {
                let bit = ((code.bits >> i) & 1) as usize;
                if nodes[idx].symbol.is_some() {
                    return Err(ObscuraError::DecodeMismatch(
                        "code table is not prefix-free".to_string(),
                    ));
                }
                idx = match nodes[idx].children[bit] {
                    Some(next) => next,
                    None => {
                        let next = nodes.len();
                        nodes.push(DecodeNode { symbol: None, children: [None, None] });
                        nodes[idx].children[bit] = Some(next);
                        next
                    }
                };
            }
            if nodes[idx].symbol.is_some() || nodes[idx].children.iter().any(|c| c.is_some()) {
                return Err(ObscuraError::DecodeMismatch(
                    "code table is not prefix-free".to_string(),
                ));
            }
            nodes[idx].symbol = Some(symbol);
        }
        Ok(Self { nodes })
    }
}

/// Recover the original symbol stream from a packed buffer: 0 descends left,
/// 1 descends right, and reaching a leaf emits a symbol and resets the walk
/// to the root. The symbol count comes from the stored frame shape.
pub fn decode(packed: &[u8], table: &CodeTable, expected_len: usize) -> Result<Vec<u8>> {
    let tree = DecodeTree::from_table(table)?;
    let mut reader = BitReader::unpack(packed)?;

    let mut out = Vec::with_capacity(expected_len);
    let mut idx = 0;
    while let Some(bit) = reader.next_bit() {
        idx = tree.nodes[idx].children[bit as usize].ok_or_else(|| {
            ObscuraError::DecodeMismatch("bit sequence does not reach a leaf".to_string())
        })?;
        if let Some(symbol) = tree.nodes[idx].symbol {
            out.push(symbol);
            idx = 0;
            if out.len() > expected_len {
                return Err(ObscuraError::DecodeMismatch(format!(
                    "recovered more than the expected {} symbols",
                    expected_len
                )));
            }
        }
    }

    if idx != 0 || out.len() != expected_len {
        return Err(ObscuraError::DecodeMismatch(format!(
            "recovered {} symbols, expected {}",
            out.len(),
            expected_len
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_for(data: &[u8]) -> CodeTable {
        let freqs = FrequencyTable::build(data).unwrap();
        let tree = HuffmanTree::from_frequencies(&freqs).unwrap();
        CodeTable::from_tree(&tree)
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(encode(&[]), Err(ObscuraError::EmptyInput)));
    }

    #[test]
    fn test_degenerate_single_symbol_code() {
        let table = table_for(&[7; 100]);
        let code = table.get(7).unwrap();
        assert_eq!(code.bitstring(), "0");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_degenerate_block_layout() {
        // 100 one-bit codes: 100 bits, padding 4, 13 payload bytes + header
        let block = encode(&[7; 100]).unwrap();
        assert_eq!(block.padding, 4);
        assert_eq!(block.data.len(), 14);
        assert_eq!(block.data[0], 4);
        let decoded = decode(&block.data, &block.table, 100).unwrap();
        assert_eq!(decoded, vec![7; 100]);
    }

    #[test]
    fn test_two_symbols_one_bit_codes() {
        let mut data = vec![10u8; 90];
        data.extend(vec![200u8; 10]);
        let table = table_for(&data);
        assert_eq!(table.get(10).unwrap().len, 1);
        assert_eq!(table.get(200).unwrap().len, 1);
        assert_ne!(
            table.get(10).unwrap().bitstring(),
            table.get(200).unwrap().bitstring()
        );
    }

    #[test]
    fn test_prefix_free() {
        let data: Vec<u8> = (0..=255u8)
            .flat_map(|s| std::iter::repeat(s).take(1 + (s as usize % 7) * 3))
            .collect();
        let table = table_for(&data);
        let codes: Vec<String> = table.entries().map(|(_, c)| c.bitstring()).collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a.as_str()), "{} is a prefix of {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_skewed_frequencies_get_shorter_codes() {
        let mut data = vec![1u8; 1000];
        data.extend(vec![2u8; 100]);
        data.extend(vec![3u8; 10]);
        data.extend(vec![4u8; 1]);
        let table = table_for(&data);
        assert!(table.get(1).unwrap().len <= table.get(2).unwrap().len);
        assert!(table.get(2).unwrap().len <= table.get(3).unwrap().len);
        assert!(table.get(3).unwrap().len <= table.get(4).unwrap().len);
    }

    #[test]
    fn test_round_trip() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 251) as u8).collect();
        let block = encode(&data).unwrap();
        let decoded = decode(&block.data, &block.table, data.len()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_deterministic_output() {
        // plenty of frequency ties to exercise the insertion-order tie-break
        let data: Vec<u8> = (0..=255u8).flat_map(|s| [s, s]).collect();
        let first = encode(&data).unwrap();
        let second = encode(&data).unwrap();
        assert_eq!(first.data, second.data);
        assert_eq!(
            first.table.entries().collect::<Vec<_>>(),
            second.table.entries().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_decode_wrong_count() {
        let block = encode(&[1, 2, 3, 1, 2, 1]).unwrap();
        assert!(matches!(
            decode(&block.data, &block.table, 7),
            Err(ObscuraError::DecodeMismatch(_))
        ));
    }

    #[test]
    fn test_decode_corrupt_buffer() {
        let data = vec![5u8, 6, 5, 6, 5, 5, 5, 7, 8, 9, 5, 5];
        let block = encode(&data).unwrap();
        // dropping the final byte shifts padding onto real data bits
        let mut corrupted = block.data.clone();
        corrupted.truncate(corrupted.len() - 1);
        assert!(decode(&corrupted, &block.table, data.len()).is_err());
    }

    #[test]
    fn test_decode_rejects_non_prefix_free_table() {
        let mut table = CodeTable::empty();
        table.insert(1, Code { bits: 0b0, len: 1 });
        table.insert(2, Code { bits: 0b01, len: 2 });
        assert!(matches!(
            DecodeTree::from_table(&table),
            Err(ObscuraError::DecodeMismatch(_))
        ));
    }
}
