use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::bits::to_bit_string;
use crate::error::{Result, ValidationError};
pub use crate::quantum::circuit::Basis;
use crate::quantum::circuit::CircuitBuilder;
use crate::simulators::{Deadline, StabilizerSimulator};

impl Basis {
    /// Pick a basis uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }
}

/// BB84 results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bb84KeyMaterial {
    pub alice_bits: Vec<bool>,
    pub alice_bases: Vec<Basis>,
    pub bob_bases: Vec<Basis>,
    /// Positions where both parties chose the same basis, ascending
    pub sifted_positions: Vec<usize>,
    pub shared_key: String,
    /// Most frequent outcome of the diagnostic run; never used for the key
    pub bob_most_frequent: Option<String>,
}

impl Bb84KeyMaterial {
    /// Number of qubits exchanged
    pub fn raw_length(&self) -> usize {
        self.alice_bits.len()
    }

    /// Alice's raw bits as a bitstring
    pub fn alice_key(&self) -> String {
        to_bit_string(&self.alice_bits)
    }

    /// Share of exchanged qubits that survived sifting
    pub fn sifted_fraction(&self) -> f64 {
        if self.alice_bits.is_empty() {
            return 0.0;
        }
        self.sifted_positions.len() as f64 / self.alice_bits.len() as f64
    }
}

/// Keep Alice's bits where the bases agree, in index order
pub fn sift(alice_bits: &[bool], alice_bases: &[Basis], bob_bases: &[Basis]) -> Result<(Vec<usize>, String)> {
    for bases in [alice_bases, bob_bases] {
        if bases.len() != alice_bits.len() {
            return Err(ValidationError::LengthMismatch {
                expected: alice_bits.len(),
                actual: bases.len(),
            }
            .into());
        }
    }

    let positions: Vec<usize> = (0..alice_bits.len())
        .filter(|&i| alice_bases[i] == bob_bases[i])
        .collect();
    let key: Vec<bool> = positions.iter().map(|&i| alice_bits[i]).collect();
    Ok((positions, to_bit_string(&key)))
}

/// Runs the BB84 key agreement on the stabilizer simulator
#[derive(Debug, Clone)]
pub struct KeyExchangeProtocol {
    simulator: StabilizerSimulator,
    shots: usize,
}

impl KeyExchangeProtocol {
    pub fn new(shots: usize) -> Self {
        KeyExchangeProtocol {
            simulator: StabilizerSimulator::new(),
            shots,
        }
    }

    /// Agree on a key over `n` qubits.
    ///
    /// The circuit is simulated for diagnostics only. The shared key is
    /// Alice's own bits at the basis-matching positions, so Bob's measured
    /// values never enter it.
    pub fn agree_key<R: Rng + ?Sized>(&self, n: usize, rng: &mut R, deadline: Option<&Deadline>) -> Result<Bb84KeyMaterial> {
        info!(qubits = n, "generating BB84 key");

        let alice_bits: Vec<bool> = (0..n).map(|_| rng.gen_bool(0.5)).collect();
        let alice_bases: Vec<Basis> = (0..n).map(|_| Basis::random(rng)).collect();
        let bob_bases: Vec<Basis> = (0..n).map(|_| Basis::random(rng)).collect();

        let circuit = CircuitBuilder::bb84(&alice_bits, &alice_bases, &bob_bases)?;
        let counts = self
            .simulator
            .simulate_with_deadline(&circuit, self.shots, rng, deadline)
            .map_err(|e| {
                error!(error = %e, "BB84 key generation failed");
                e
            })?;
        let bob_most_frequent = counts.most_frequent().map(str::to_string);
        debug!(distinct = counts.len(), bob = ?bob_most_frequent, "BB84 measurement counts");

        let (sifted_positions, shared_key) = sift(&alice_bits, &alice_bases, &bob_bases)?;
        info!(shared_key = %shared_key, sifted = sifted_positions.len(), "shared secret key");

        Ok(Bb84KeyMaterial {
            alice_bits,
            alice_bases,
            bob_bases,
            sifted_positions,
            shared_key,
            bob_most_frequent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn sifting_keeps_matching_positions() {
        let bits = [true, false, true, true];
        let alice = [Basis::Rectilinear, Basis::Diagonal, Basis::Diagonal, Basis::Rectilinear];
        let bob = [Basis::Rectilinear, Basis::Rectilinear, Basis::Diagonal, Basis::Diagonal];
        let (positions, key) = sift(&bits, &alice, &bob).unwrap();
        assert_eq!(positions, vec![0, 2]);
        assert_eq!(key, "11");
    }

    #[test]
    fn sifting_rejects_mismatched_lengths() {
        let bits = [true, false, true];
        let full = [Basis::Rectilinear; 3];
        let short = [Basis::Diagonal; 2];

        let err = sift(&bits, &full, &short).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Validation(ValidationError::LengthMismatch { expected: 3, actual: 2 })
        ));
        assert!(sift(&bits, &short, &full).is_err());
    }

    #[test]
    fn matching_bases_measure_alices_bit() {
        // With equal bases the two Hadamards cancel and Bob reads Alice's bit.
        let bits = [true, false, true];
        let bases = [Basis::Diagonal, Basis::Rectilinear, Basis::Diagonal];
        let circuit = CircuitBuilder::bb84(&bits, &bases, &bases).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let counts = StabilizerSimulator::new().simulate(&circuit, 64, &mut rng).unwrap();
        assert_eq!(counts.get("101"), 64);
    }

    #[test]
    fn zero_qubits_give_an_empty_key() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let material = KeyExchangeProtocol::new(16).agree_key(0, &mut rng, None).unwrap();
        assert!(material.shared_key.is_empty());
        assert_eq!(material.sifted_fraction(), 0.0);
    }
}
