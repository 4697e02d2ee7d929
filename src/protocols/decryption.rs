use rand::Rng;
use tracing::{error, info};

use crate::bits::{fit_key, parse_bits};
use crate::error::{Result, ValidationError};
use crate::protocols::mitigation::ErrorMitigationDecoder;
use crate::quantum::circuit::CircuitBuilder;
use crate::simulators::{Deadline, StabilizerSimulator};

/// Inverse six-gate transform followed by error mitigation
#[derive(Debug, Clone)]
pub struct DecryptionTransform {
    simulator: StabilizerSimulator,
    shots: usize,
}

impl DecryptionTransform {
    pub fn new(shots: usize) -> Self {
        DecryptionTransform {
            simulator: StabilizerSimulator::new(),
            shots,
        }
    }

    pub fn shots(&self) -> usize {
        self.shots
    }

    /// Unscramble `ciphertext_bits` and pick the outcome nearest `reference_bits`.
    pub fn decrypt<R: Rng + ?Sized>(
        &self,
        ciphertext_bits: &str,
        key_bits: &str,
        reference_bits: &str,
        rng: &mut R,
        deadline: Option<&Deadline>,
    ) -> Result<String> {
        let ciphertext = parse_bits(ciphertext_bits, "ciphertext_bits")?;
        if ciphertext.is_empty() {
            return Err(ValidationError::EmptyField { field: "ciphertext_bits" }.into());
        }
        let reference = parse_bits(reference_bits, "reference_bits")?;
        if reference.len() != ciphertext.len() {
            return Err(ValidationError::LengthMismatch {
                expected: ciphertext.len(),
                actual: reference.len(),
            }
            .into());
        }
        if self.shots == 0 {
            return Err(ValidationError::Config("shot count must be positive".to_string()).into());
        }
        let key = fit_key(&parse_bits(key_bits, "shared_key")?, ciphertext.len());

        let circuit = CircuitBuilder::inverse_six_gate(&ciphertext, &key)?;
        info!(qubits = circuit.qubit_count, shots = self.shots, "submitting decryption circuit");
        let counts = self
            .simulator
            .simulate_with_deadline(&circuit, self.shots, rng, deadline)
            .map_err(|e| {
                error!(error = %e, "decryption failed");
                e
            })?;

        ErrorMitigationDecoder::select(&counts, reference_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn reference_length_must_match() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let err = DecryptionTransform::new(16)
            .decrypt("0101", "1", "010", &mut rng, None)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::LengthMismatch { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn small_registers_recover_the_reference() {
        // 3 qubits give 8 equally likely outcomes; 512 shots see all of them.
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let decrypted = DecryptionTransform::new(512)
            .decrypt("110", "011", "101", &mut rng, None)
            .unwrap();
        assert_eq!(decrypted, "101");
    }

    #[test]
    fn empty_ciphertext_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let err = DecryptionTransform::new(16).decrypt("", "1", "", &mut rng, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
