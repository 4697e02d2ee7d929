//! Stabilizer tableau
//!
//! An n-qubit stabilizer state is tracked as n stabilizer generators plus n
//! destabilizers, each a signed Pauli string packed into `u64` words
//! (Aaronson–Gottesman form). Clifford gates conjugate every row in O(n);
//! a Z measurement costs O(n²) and never needs the exponential state vector.

use std::fmt;
use rand::Rng;

use crate::error::SimulationError;
use crate::quantum::gate::{Gate, StandardGate};

const WORD_BITS: usize = 64;

fn word_count(qubit_count: usize) -> usize {
    qubit_count.div_ceil(WORD_BITS)
}

/// A signed Pauli string. Bit pairs (x, z) encode I, X, Z and Y = (1, 1).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PauliRow {
    xs: Vec<u64>,
    zs: Vec<u64>,
    sign: bool,
}

impl PauliRow {
    /// The identity string on `qubit_count` qubits
    pub fn identity(qubit_count: usize) -> Self {
        let words = word_count(qubit_count);
        PauliRow {
            xs: vec![0; words],
            zs: vec![0; words],
            sign: false,
        }
    }

    /// A single-qubit Z on `qubit`, all other qubits identity
    pub fn single_z(qubit_count: usize, qubit: usize) -> Self {
        let mut row = Self::identity(qubit_count);
        row.set_z(qubit, true);
        row
    }

    /// A single-qubit X on `qubit`, all other qubits identity
    pub fn single_x(qubit_count: usize, qubit: usize) -> Self {
        let mut row = Self::identity(qubit_count);
        row.set_x(qubit, true);
        row
    }

    #[inline]
    pub fn x(&self, qubit: usize) -> bool {
        (self.xs[qubit / WORD_BITS] >> (qubit % WORD_BITS)) & 1 == 1
    }

    #[inline]
    pub fn z(&self, qubit: usize) -> bool {
        (self.zs[qubit / WORD_BITS] >> (qubit % WORD_BITS)) & 1 == 1
    }

    /// True when the string carries a -1 phase
    pub fn is_negative(&self) -> bool {
        self.sign
    }

    #[inline]
    fn set_x(&mut self, qubit: usize, value: bool) {
        set_bit(&mut self.xs, qubit, value);
    }

    #[inline]
    fn set_z(&mut self, qubit: usize, value: bool) {
        set_bit(&mut self.zs, qubit, value);
    }

    fn is_identity(&self) -> bool {
        self.xs.iter().chain(self.zs.iter()).all(|&w| w == 0)
    }

    /// Whether the two strings commute (even symplectic product)
    pub fn commutes_with(&self, other: &PauliRow) -> bool {
        let parity = self
            .xs
            .iter()
            .zip(&self.zs)
            .zip(other.xs.iter().zip(&other.zs))
            .fold(0u32, |acc, ((x1, z1), (x2, z2))| {
                acc ^ ((x1 & z2) ^ (z1 & x2)).count_ones()
            });
        parity & 1 == 0
    }

    /// Replace `self` with the product `self · other`.
    ///
    /// Lane-parallel mod-4 counters track the power of i picked up at each
    /// anticommuting position. Only the real part of the phase is kept, which
    /// is exact whenever the two rows commute.
    pub fn multiply_by(&mut self, other: &PauliRow) {
        let mut cnt1 = 0u64;
        let mut cnt2 = 0u64;
        for w in 0..self.xs.len() {
            let (x2, z2) = (other.xs[w], other.zs[w]);
            let (old_x1, old_z1) = (self.xs[w], self.zs[w]);
            let x1 = old_x1 ^ x2;
            let z1 = old_z1 ^ z2;
            self.xs[w] = x1;
            self.zs[w] = z1;

            let x1z2 = old_x1 & z2;
            let anti_commutes = (x2 & old_z1) ^ x1z2;
            cnt2 ^= (cnt1 ^ x1 ^ z1 ^ x1z2) & anti_commutes;
            cnt1 ^= anti_commutes;
        }
        let log_i = cnt1.count_ones() + 2 * cnt2.count_ones();
        let total = log_i + 2 * u32::from(self.sign) + 2 * u32::from(other.sign);
        self.sign = total & 2 != 0;
    }
}

impl fmt::Display for PauliRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.sign { '-' } else { '+' })?;
        for q in 0..self.xs.len() * WORD_BITS {
            let c = match (self.x(q), self.z(q)) {
                (false, false) => 'I',
                (true, false) => 'X',
                (false, true) => 'Z',
                (true, true) => 'Y',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

fn set_bit(words: &mut [u64], qubit: usize, value: bool) {
    let mask = 1u64 << (qubit % WORD_BITS);
    if value {
        words[qubit / WORD_BITS] |= mask;
    } else {
        words[qubit / WORD_BITS] &= !mask;
    }
}

/// Outcome of measuring one qubit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementResult {
    /// The measured bit
    pub outcome: bool,
    /// False when the outcome was fixed by the state
    pub random: bool,
}

/// Stabilizer/destabilizer tableau for an n-qubit state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tableau {
    qubit_count: usize,
    destabilizers: Vec<PauliRow>,
    stabilizers: Vec<PauliRow>,
}

impl Tableau {
    /// The all-zero computational basis state |0...0⟩
    pub fn zero_state(qubit_count: usize) -> Self {
        Tableau {
            qubit_count,
            destabilizers: (0..qubit_count)
                .map(|q| PauliRow::single_x(qubit_count, q))
                .collect(),
            stabilizers: (0..qubit_count)
                .map(|q| PauliRow::single_z(qubit_count, q))
                .collect(),
        }
    }

    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    pub fn stabilizers(&self) -> &[PauliRow] {
        &self.stabilizers
    }

    pub fn destabilizers(&self) -> &[PauliRow] {
        &self.destabilizers
    }

    fn check_qubit(&self, qubit: usize) -> Result<(), SimulationError> {
        if qubit >= self.qubit_count {
            return Err(SimulationError::QubitOutOfRange {
                qubit,
                qubit_count: self.qubit_count,
            });
        }
        Ok(())
    }

    fn rows_mut(&mut self) -> impl Iterator<Item = &mut PauliRow> {
        self.destabilizers.iter_mut().chain(self.stabilizers.iter_mut())
    }

    /// Conjugate every generator by a unitary gate
    pub fn apply(&mut self, gate: &Gate) -> Result<(), SimulationError> {
        for &q in gate.qubits() {
            self.check_qubit(q)?;
        }

        match (gate.kind(), gate.qubits()) {
            (StandardGate::H, &[q]) => self.rows_mut().for_each(|row| {
                let (x, z) = (row.x(q), row.z(q));
                row.sign ^= x & z;
                row.set_x(q, z);
                row.set_z(q, x);
            }),
            (StandardGate::S, &[q]) => self.rows_mut().for_each(|row| {
                let (x, z) = (row.x(q), row.z(q));
                row.sign ^= x & z;
                row.set_z(q, z ^ x);
            }),
            (StandardGate::Sdg, &[q]) => self.rows_mut().for_each(|row| {
                let (x, z) = (row.x(q), row.z(q));
                row.sign ^= x & !z;
                row.set_z(q, z ^ x);
            }),
            (StandardGate::X, &[q]) => self.rows_mut().for_each(|row| row.sign ^= row.z(q)),
            (StandardGate::Z, &[q]) => self.rows_mut().for_each(|row| row.sign ^= row.x(q)),
            (StandardGate::Y, &[q]) => self.rows_mut().for_each(|row| row.sign ^= row.x(q) ^ row.z(q)),
            (StandardGate::CNOT, &[a, b]) => self.rows_mut().for_each(|row| {
                let (xa, za, xb, zb) = (row.x(a), row.z(a), row.x(b), row.z(b));
                row.sign ^= xa & zb & !(xb ^ za);
                row.set_x(b, xb ^ xa);
                row.set_z(a, za ^ zb);
            }),
            _ => {
                return Err(SimulationError::UnsupportedGate {
                    gate: gate.to_string(),
                })
            }
        }
        Ok(())
    }

    /// The Z outcome of `qubit` if it is fixed by the state, without collapsing
    pub fn peek_z(&self, qubit: usize) -> Result<Option<bool>, SimulationError> {
        self.check_qubit(qubit)?;
        if self.stabilizers.iter().any(|row| row.x(qubit)) {
            return Ok(None);
        }

        // Z_q is a product of the stabilizers paired with destabilizers that
        // anticommute with it; that product's sign is the outcome.
        let mut scratch = PauliRow::identity(self.qubit_count);
        for (destabilizer, stabilizer) in self.destabilizers.iter().zip(&self.stabilizers) {
            if destabilizer.x(qubit) {
                scratch.multiply_by(stabilizer);
            }
        }
        Ok(Some(scratch.sign))
    }

    /// Measure `qubit` in the Z basis, collapsing the state
    pub fn measure<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> Result<MeasurementResult, SimulationError> {
        self.check_qubit(qubit)?;

        let Some(pivot_index) = self.stabilizers.iter().position(|row| row.x(qubit)) else {
            let outcome = self.peek_z(qubit)?.ok_or_else(|| {
                SimulationError::InconsistentTableau(format!(
                    "qubit {} is neither random nor determined",
                    qubit
                ))
            })?;
            return Ok(MeasurementResult { outcome, random: false });
        };

        let pivot = self.stabilizers[pivot_index].clone();
        for (i, row) in self.stabilizers.iter_mut().enumerate() {
            if i != pivot_index && row.x(qubit) {
                row.multiply_by(&pivot);
            }
        }
        for row in self.destabilizers.iter_mut() {
            if row.x(qubit) {
                row.multiply_by(&pivot);
            }
        }

        let outcome = rng.gen_bool(0.5);
        let mut measured = PauliRow::single_z(self.qubit_count, qubit);
        measured.sign = outcome;
        self.destabilizers[pivot_index] = pivot;
        self.stabilizers[pivot_index] = measured;

        Ok(MeasurementResult { outcome, random: true })
    }

    /// Check that the generators still form a valid stabilizer group.
    ///
    /// Stabilizers must pairwise commute and be independent, destabilizers
    /// must pairwise commute, and destabilizer i must anticommute with
    /// stabilizer j exactly when i == j.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let n = self.qubit_count;
        let words = word_count(n);
        if self.stabilizers.len() != n || self.destabilizers.len() != n {
            return Err(SimulationError::InconsistentTableau(format!(
                "expected {} generators of each kind, found {} stabilizers and {} destabilizers",
                n,
                self.stabilizers.len(),
                self.destabilizers.len()
            )));
        }
        for row in self.stabilizers.iter().chain(&self.destabilizers) {
            if row.xs.len() != words || row.zs.len() != words {
                return Err(SimulationError::InconsistentTableau(
                    "generator width does not match qubit count".to_string(),
                ));
            }
        }
        if let Some(i) = self.stabilizers.iter().position(PauliRow::is_identity) {
            return Err(SimulationError::InconsistentTableau(format!(
                "stabilizer {} is the identity",
                i
            )));
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if !self.stabilizers[i].commutes_with(&self.stabilizers[j]) {
                    return Err(SimulationError::InconsistentTableau(format!(
                        "stabilizers {} and {} anticommute",
                        i, j
                    )));
                }
                if !self.destabilizers[i].commutes_with(&self.destabilizers[j]) {
                    return Err(SimulationError::InconsistentTableau(format!(
                        "destabilizers {} and {} anticommute",
                        i, j
                    )));
                }
            }
            for j in 0..n {
                let anticommutes = !self.destabilizers[i].commutes_with(&self.stabilizers[j]);
                if anticommutes != (i == j) {
                    return Err(SimulationError::InconsistentTableau(format!(
                        "destabilizer {} and stabilizer {} break the symplectic pairing",
                        i, j
                    )));
                }
            }
        }

        let rank = gf2_rank(&self.stabilizers);
        if rank != n {
            return Err(SimulationError::InconsistentTableau(format!(
                "stabilizers have rank {} but {} qubits",
                rank, n
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.stabilizers {
            let text = row.to_string();
            // Drop the word padding past the last qubit.
            writeln!(f, "{}", &text[..=self.qubit_count])?;
        }
        Ok(())
    }
}

/// Rank over GF(2) of the rows' (x | z) bit vectors
fn gf2_rank(rows: &[PauliRow]) -> usize {
    let mut vectors: Vec<Vec<u64>> = rows
        .iter()
        .map(|row| row.xs.iter().chain(&row.zs).copied().collect())
        .collect();
    let width = vectors.first().map_or(0, |v| v.len() * WORD_BITS);

    let mut rank = 0;
    for bit in 0..width {
        let (word, mask) = (bit / WORD_BITS, 1u64 << (bit % WORD_BITS));
        let Some(pivot) = (rank..vectors.len()).find(|&r| vectors[r][word] & mask != 0) else {
            continue;
        };
        vectors.swap(rank, pivot);
        let pivot_row = vectors[rank].clone();
        for (r, vector) in vectors.iter_mut().enumerate() {
            if r != rank && vector[word] & mask != 0 {
                for (a, b) in vector.iter_mut().zip(&pivot_row) {
                    *a ^= b;
                }
            }
        }
        rank += 1;
    }
    rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn gate(kind: StandardGate, qubits: &[usize]) -> Gate {
        Gate::new(kind, qubits).unwrap()
    }

    #[test]
    fn zero_state_measures_zero() {
        let tableau = Tableau::zero_state(3);
        tableau.validate().unwrap();
        for q in 0..3 {
            assert_eq!(tableau.peek_z(q).unwrap(), Some(false));
        }
    }

    #[test]
    fn x_flips_outcome() {
        let mut tableau = Tableau::zero_state(2);
        tableau.apply(&gate(StandardGate::X, &[1])).unwrap();
        assert_eq!(tableau.peek_z(0).unwrap(), Some(false));
        assert_eq!(tableau.peek_z(1).unwrap(), Some(true));
    }

    #[test]
    fn y_flips_outcome_and_z_does_not() {
        let mut tableau = Tableau::zero_state(2);
        tableau.apply(&gate(StandardGate::Y, &[0])).unwrap();
        tableau.apply(&gate(StandardGate::Z, &[1])).unwrap();
        assert_eq!(tableau.peek_z(0).unwrap(), Some(true));
        assert_eq!(tableau.peek_z(1).unwrap(), Some(false));
    }

    #[test]
    fn hadamard_makes_outcome_random() {
        let mut tableau = Tableau::zero_state(1);
        tableau.apply(&gate(StandardGate::H, &[0])).unwrap();
        assert_eq!(tableau.peek_z(0).unwrap(), None);
        assert_eq!(tableau.stabilizers()[0].to_string().chars().take(2).collect::<String>(), "+X");
    }

    #[test]
    fn hzh_is_x() {
        let mut tableau = Tableau::zero_state(1);
        tableau.apply(&gate(StandardGate::H, &[0])).unwrap();
        tableau.apply(&gate(StandardGate::Z, &[0])).unwrap();
        tableau.apply(&gate(StandardGate::H, &[0])).unwrap();
        assert_eq!(tableau.peek_z(0).unwrap(), Some(true));
    }

    #[test]
    fn s_then_sdg_is_identity() {
        let mut tableau = Tableau::zero_state(1);
        tableau.apply(&gate(StandardGate::H, &[0])).unwrap();
        let before = tableau.clone();
        tableau.apply(&gate(StandardGate::S, &[0])).unwrap();
        assert_ne!(tableau, before);
        tableau.apply(&gate(StandardGate::Sdg, &[0])).unwrap();
        assert_eq!(tableau, before);
    }

    #[test]
    fn s_squared_is_z() {
        // H S S H |0⟩ = H Z H |0⟩ = X |0⟩ = |1⟩
        let mut tableau = Tableau::zero_state(1);
        for kind in [StandardGate::H, StandardGate::S, StandardGate::S, StandardGate::H] {
            tableau.apply(&gate(kind, &[0])).unwrap();
        }
        assert_eq!(tableau.peek_z(0).unwrap(), Some(true));
    }

    #[test]
    fn bell_pair_outcomes_are_correlated() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..32 {
            let mut tableau = Tableau::zero_state(2);
            tableau.apply(&gate(StandardGate::H, &[0])).unwrap();
            tableau.apply(&gate(StandardGate::CNOT, &[0, 1])).unwrap();
            tableau.validate().unwrap();

            let first = tableau.measure(0, &mut rng).unwrap();
            assert!(first.random);
            let second = tableau.measure(1, &mut rng).unwrap();
            assert!(!second.random);
            assert_eq!(first.outcome, second.outcome);
            tableau.validate().unwrap();
        }
    }

    #[test]
    fn measurement_collapses_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut tableau = Tableau::zero_state(1);
        tableau.apply(&gate(StandardGate::H, &[0])).unwrap();
        let first = tableau.measure(0, &mut rng).unwrap();
        let again = tableau.measure(0, &mut rng).unwrap();
        assert!(!again.random);
        assert_eq!(first.outcome, again.outcome);
    }

    #[test]
    fn t_gate_is_rejected() {
        let mut tableau = Tableau::zero_state(1);
        let err = tableau.apply(&gate(StandardGate::T, &[0])).unwrap_err();
        assert!(matches!(err, SimulationError::UnsupportedGate { .. }));
    }

    #[test]
    fn out_of_range_qubit_is_rejected() {
        let mut tableau = Tableau::zero_state(2);
        let err = tableau.apply(&gate(StandardGate::H, &[5])).unwrap_err();
        assert_eq!(err, SimulationError::QubitOutOfRange { qubit: 5, qubit_count: 2 });
    }

    #[test]
    fn validator_catches_duplicate_stabilizers() {
        let mut tableau = Tableau::zero_state(2);
        tableau.stabilizers[1] = tableau.stabilizers[0].clone();
        assert!(matches!(
            tableau.validate(),
            Err(SimulationError::InconsistentTableau(_))
        ));
    }

    #[test]
    fn product_sign_tracks_phase() {
        // (-Z)(-Z) = +I
        let mut a = PauliRow::single_z(1, 0);
        a.sign = true;
        let b = a.clone();
        a.multiply_by(&b);
        assert!(a.is_identity());
        assert!(!a.is_negative());

        // X·Y = iZ on one qubit, so (X⊗X)(Y⊗Y) = (iZ)(iZ) = -Z⊗Z
        let mut xx = PauliRow::identity(2);
        xx.set_x(0, true);
        xx.set_x(1, true);
        let mut yy = PauliRow::identity(2);
        for q in 0..2 {
            yy.set_x(q, true);
            yy.set_z(q, true);
        }
        xx.multiply_by(&yy);
        assert!(xx.is_negative());
        assert!(xx.z(0) && xx.z(1) && !xx.x(0) && !xx.x(1));
    }

    #[test]
    fn rows_span_words() {
        let n = 70;
        let mut tableau = Tableau::zero_state(n);
        tableau.apply(&gate(StandardGate::X, &[65])).unwrap();
        tableau.apply(&gate(StandardGate::CNOT, &[65, 3])).unwrap();
        tableau.validate().unwrap();
        assert_eq!(tableau.peek_z(3).unwrap(), Some(true));
        assert_eq!(tableau.peek_z(64).unwrap(), Some(false));
    }

    #[test]
    fn identity_stabilizer_is_rejected() {
        let mut tableau = Tableau::zero_state(2);
        tableau.apply(&gate(StandardGate::H, &[1])).unwrap();
        tableau.stabilizers[1] = PauliRow::identity(2);
        match tableau.validate() {
            Err(SimulationError::InconsistentTableau(message)) => {
                assert!(message.contains("stabilizer 1 is the identity"), "{}", message)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
