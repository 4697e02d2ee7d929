//! Protocols built on the stabilizer simulator
//!
//! BB84 key agreement, the forward and inverse six-gate transforms, and the
//! decoder that picks a decryption outcome from its shot distribution.

pub mod key_exchange;
pub mod encryption;
pub mod decryption;
pub mod mitigation;

pub use key_exchange::{Basis, Bb84KeyMaterial, KeyExchangeProtocol};
pub use encryption::EncryptionTransform;
pub use decryption::DecryptionTransform;
pub use mitigation::ErrorMitigationDecoder;
