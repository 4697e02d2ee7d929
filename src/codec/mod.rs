//! Plaintext compression codecs

pub mod huffman;

pub use huffman::{CodeTable, Encoded, HuffmanCodec, HuffmanNode, HuffmanTree};
