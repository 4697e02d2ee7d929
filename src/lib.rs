//! Quantum Cipher
//!
//! A toy quantum key-distribution and encryption pipeline. Plaintext is
//! Huffman-compressed to bits, a key is agreed with a simulated BB84
//! exchange, and the bits are scrambled by a six-gate Clifford circuit and
//! recovered by its inverse. Every circuit runs on an exact stabilizer-tableau
//! simulator, since the gate set never leaves the Clifford group.

pub mod error;
pub mod bits;
pub mod quantum;
pub mod simulators;
pub mod codec;
pub mod protocols;
pub mod pipeline;
pub mod config;

pub use config::CipherConfig;
pub use error::{Error, ErrorKind, Result};
pub use pipeline::{DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, QuantumCipher};

// Create a prelude module for convenient imports
pub mod prelude {
    pub use crate::quantum::prelude::*;
    pub use crate::simulators::{Deadline, ShotDistribution, StabilizerSimulator};
    pub use crate::codec::{CodeTable, HuffmanCodec, HuffmanTree};
    pub use crate::protocols::{
        Bb84KeyMaterial, DecryptionTransform, EncryptionTransform, ErrorMitigationDecoder,
        KeyExchangeProtocol,
    };
    pub use crate::pipeline::{DecryptRequest, EncryptRequest, QuantumCipher};
    pub use crate::config::CipherConfig;
    pub use crate::error::{Error, ErrorKind, Result};
}

// Version and crate information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
