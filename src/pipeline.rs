//! Encrypt/decrypt round trips
//!
//! [`QuantumCipher`] ties the codec, key agreement and the two transforms
//! together behind request and response types that (de)serialize with serde,
//! so any transport can sit in front of it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::codec::{CodeTable, HuffmanCodec, HuffmanTree};
use crate::config::CipherConfig;
use crate::error::{ErrorKind, Result, ValidationError};
use crate::protocols::{DecryptionTransform, EncryptionTransform, KeyExchangeProtocol};

/// Input to [`QuantumCipher::encrypt`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// Text to Huffman-encode before encryption
    #[serde(default)]
    pub message: Option<String>,
    /// Bits to encrypt as-is
    #[serde(default, alias = "binary")]
    pub pre_encoded_bits: Option<String>,
    /// Generated with BB84 when absent and a message is given
    #[serde(default)]
    pub shared_key: Option<String>,
}

impl EncryptRequest {
    pub fn message(text: impl Into<String>) -> Self {
        EncryptRequest {
            message: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn bits(bits: impl Into<String>, shared_key: impl Into<String>) -> Self {
        EncryptRequest {
            pre_encoded_bits: Some(bits.into()),
            shared_key: Some(shared_key.into()),
            ..Default::default()
        }
    }

    pub fn with_shared_key(mut self, shared_key: impl Into<String>) -> Self {
        self.shared_key = Some(shared_key.into());
        self
    }
}

/// Output of [`QuantumCipher::encrypt`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptResponse {
    pub original_message: Option<String>,
    pub encoded_bits: String,
    pub code_table: Option<CodeTable>,
    /// Needed to decode bits later; absent for pre-encoded input
    pub tree: Option<HuffmanTree>,
    pub shared_key: String,
    pub ciphertext_bits: String,
    pub decrypted_bits: String,
    pub recovered_text: Option<String>,
    /// `None` when there is no tree to verify against
    pub matches_original: Option<bool>,
}

/// Input to [`QuantumCipher::decrypt`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptRequest {
    pub ciphertext_bits: String,
    pub shared_key: String,
    /// Mitigation reference; the ciphertext itself when absent
    #[serde(default)]
    pub reference_bits: Option<String>,
}

/// Output of [`QuantumCipher::decrypt`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub decrypted_bits: String,
}

/// The full encrypt and decrypt pipeline
#[derive(Debug, Clone)]
pub struct QuantumCipher {
    config: CipherConfig,
    key_exchange: KeyExchangeProtocol,
    encryption: EncryptionTransform,
    decryption: DecryptionTransform,
}

impl QuantumCipher {
    pub fn new(config: CipherConfig) -> Result<Self> {
        config.validate()?;
        Ok(QuantumCipher {
            key_exchange: KeyExchangeProtocol::new(config.key_exchange_shots),
            encryption: EncryptionTransform::new(config.shots),
            decryption: DecryptionTransform::new(config.shots),
            config,
        })
    }

    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    /// Encode (optionally), agree a key (optionally), encrypt, then decrypt
    /// again and check the recovered text.
    #[instrument(skip(self, rng))]
    pub fn encrypt<R: Rng + ?Sized>(&self, request: &EncryptRequest, rng: &mut R) -> Result<EncryptResponse> {
        let message = non_empty(&request.message);
        let bits = non_empty(&request.pre_encoded_bits);
        let supplied_key = non_empty(&request.shared_key);
        let deadline = self.config.deadline();

        let (encoded_bits, encoded) = match (message, bits) {
            (None, None) => return Err(ValidationError::MissingInput.into()),
            (Some(_), Some(_)) => return Err(ValidationError::ConflictingInput.into()),
            (Some(text), None) => {
                let encoded = HuffmanCodec::encode(text);
                (encoded.bits.clone(), Some(encoded))
            }
            (None, Some(bits)) => {
                if supplied_key.is_none() {
                    return Err(ValidationError::MissingSharedKey.into());
                }
                (bits.to_string(), None)
            }
        };

        let shared_key = match supplied_key {
            Some(key) => key.to_string(),
            None => {
                self.key_exchange
                    .agree_key(encoded_bits.len(), rng, deadline.as_ref())?
                    .shared_key
            }
        };

        let ciphertext_bits = self
            .encryption
            .encrypt(&encoded_bits, &shared_key, rng, deadline.as_ref())?;
        let decrypted_bits = self.decryption.decrypt(
            &ciphertext_bits,
            &shared_key,
            &encoded_bits,
            rng,
            deadline.as_ref(),
        )?;

        let (code_table, tree, recovered_text, matches_original) = match encoded {
            Some(encoded) => {
                let recovered = match HuffmanCodec::decode(&decrypted_bits, Some(&encoded.tree)) {
                    Ok(text) => Some(text),
                    Err(e) if e.kind() == ErrorKind::Decoding => {
                        warn!(error = %e, "decrypted bits do not decode with the message tree");
                        None
                    }
                    Err(e) => return Err(e),
                };
                let matches = Some(recovered.as_deref() == message);
                (Some(encoded.code_table), Some(encoded.tree), recovered, matches)
            }
            None => (None, None, None, None),
        };

        info!(
            ciphertext = %ciphertext_bits,
            decrypted = %decrypted_bits,
            matches = ?matches_original,
            "round trip complete"
        );

        Ok(EncryptResponse {
            original_message: message.map(str::to_string),
            encoded_bits,
            code_table,
            tree,
            shared_key,
            ciphertext_bits,
            decrypted_bits,
            recovered_text,
            matches_original,
        })
    }

    /// Run the inverse transform on `ciphertext_bits`
    #[instrument(skip(self, rng))]
    pub fn decrypt<R: Rng + ?Sized>(&self, request: &DecryptRequest, rng: &mut R) -> Result<DecryptResponse> {
        if request.ciphertext_bits.is_empty() {
            return Err(ValidationError::EmptyField { field: "ciphertext_bits" }.into());
        }
        if request.shared_key.is_empty() {
            return Err(ValidationError::EmptyField { field: "shared_key" }.into());
        }
        let reference = non_empty(&request.reference_bits).unwrap_or(request.ciphertext_bits.as_str());
        let deadline = self.config.deadline();

        let decrypted_bits = self.decryption.decrypt(
            &request.ciphertext_bits,
            &request.shared_key,
            reference,
            rng,
            deadline.as_ref(),
        )?;
        info!(decrypted = %decrypted_bits, "decryption complete");
        Ok(DecryptResponse { decrypted_bits })
    }
}

/// Empty strings count as absent
fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_are_treated_as_missing() {
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some("01".to_string())), Some("01"));
    }

    #[test]
    fn requests_accept_the_binary_alias() {
        let request: EncryptRequest =
            serde_json::from_str(r#"{"binary": "0101", "shared_key": "11"}"#).unwrap();
        assert_eq!(request, EncryptRequest::bits("0101", "11"));
    }
}
