use rand::Rng;
use tracing::{debug, error, info};

use crate::bits::{fit_key, parse_bits};
use crate::error::{Result, ValidationError};
use crate::quantum::circuit::CircuitBuilder;
use crate::simulators::{Deadline, StabilizerSimulator};

/// Forward six-gate transform
#[derive(Debug, Clone)]
pub struct EncryptionTransform {
    simulator: StabilizerSimulator,
    shots: usize,
}

impl EncryptionTransform {
    pub fn new(shots: usize) -> Self {
        EncryptionTransform {
            simulator: StabilizerSimulator::new(),
            shots,
        }
    }

    pub fn shots(&self) -> usize {
        self.shots
    }

    /// Scramble `plaintext_bits` under `key_bits`, returning the most
    /// frequent measurement outcome. The key is reused cyclically or
    /// truncated to the plaintext length.
    pub fn encrypt<R: Rng + ?Sized>(
        &self,
        plaintext_bits: &str,
        key_bits: &str,
        rng: &mut R,
        deadline: Option<&Deadline>,
    ) -> Result<String> {
        let plaintext = parse_bits(plaintext_bits, "plaintext_bits")?;
        if plaintext.is_empty() {
            return Err(ValidationError::EmptyField { field: "plaintext_bits" }.into());
        }
        if self.shots == 0 {
            return Err(ValidationError::Config("shot count must be positive".to_string()).into());
        }
        let key = fit_key(&parse_bits(key_bits, "shared_key")?, plaintext.len());

        let circuit = CircuitBuilder::forward_six_gate(&plaintext, &key)?;
        info!(qubits = circuit.qubit_count, shots = self.shots, "submitting encryption circuit");
        let counts = self
            .simulator
            .simulate_with_deadline(&circuit, self.shots, rng, deadline)
            .map_err(|e| {
                error!(error = %e, "encryption failed");
                e
            })?;
        debug!(top = ?counts.top(3), "encryption counts");

        let ciphertext = counts
            .most_frequent()
            .map(str::to_string)
            .ok_or(ValidationError::EmptyField { field: "distribution" })?;
        info!(ciphertext = %ciphertext, "encryption complete");
        Ok(ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn ciphertext_has_plaintext_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let ciphertext = EncryptionTransform::new(64)
            .encrypt("10110", "01", &mut rng, None)
            .unwrap();
        assert_eq!(ciphertext.len(), 5);
        assert!(ciphertext.chars().all(|c| c == '0' || c == '1'));
    }

    #[test]
    fn same_seed_gives_same_ciphertext() {
        let transform = EncryptionTransform::new(128);
        let a = transform.encrypt("0110", "1010", &mut ChaCha8Rng::seed_from_u64(7), None).unwrap();
        let b = transform.encrypt("0110", "1010", &mut ChaCha8Rng::seed_from_u64(7), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_key_matches_all_zero_key() {
        let transform = EncryptionTransform::new(64);
        let a = transform.encrypt("101", "", &mut ChaCha8Rng::seed_from_u64(4), None).unwrap();
        let b = transform.encrypt("101", "000", &mut ChaCha8Rng::seed_from_u64(4), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_plaintext_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = EncryptionTransform::new(8).encrypt("0120", "1", &mut rng, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
