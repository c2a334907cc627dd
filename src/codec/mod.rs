pub mod bits;
pub mod freq;
pub mod huffman;
pub mod rle;

pub use freq::FrequencyTable;
pub use huffman::{Code, CodeTable, HuffmanBlock, HuffmanTree};
pub use rle::RunToken;

// Re-export specific functions to avoid naming conflicts
pub use huffman::{encode as huffman_encode, decode as huffman_decode};
pub use rle::{encode as rle_encode, decode as rle_decode};
