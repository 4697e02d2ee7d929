use std::fmt;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError, ValidationError};
use crate::quantum::gate::{Gate, StandardGate};

/// A quantum circuit consisting of a sequence of gates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantumCircuit {
    pub gates: Vec<Gate>,
    pub qubit_count: usize,
}

impl QuantumCircuit {
    /// Create a new empty quantum circuit
    pub fn new(qubit_count: usize) -> Self {
        QuantumCircuit {
            gates: Vec::new(),
            qubit_count,
        }
    }

    pub fn add_gate(&mut self, kind: StandardGate, qubits: &[usize]) -> Result<()> {
        // Validate qubit indices
        for &q in qubits {
            if q >= self.qubit_count {
                return Err(SimulationError::QubitOutOfRange {
                    qubit: q,
                    qubit_count: self.qubit_count,
                }
                .into());
            }
        }

        self.gates.push(Gate::new(kind, qubits)?);
        Ok(())
    }

    /// Get the number of gates in the circuit
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Number of measurement instructions
    pub fn measurement_count(&self) -> usize {
        self.gates
            .iter()
            .filter(|g| g.kind() == StandardGate::Measure)
            .count()
    }

    /// Index of the first measurement; everything before it is unitary
    pub fn unitary_prefix_len(&self) -> usize {
        self.gates
            .iter()
            .position(|g| !g.kind().is_unitary())
            .unwrap_or(self.gates.len())
    }

    /// Compose this circuit with another circuit, `other` running second
    pub fn compose(&self, other: &QuantumCircuit) -> Result<QuantumCircuit> {
        if self.qubit_count != other.qubit_count {
            return Err(ValidationError::LengthMismatch {
                expected: self.qubit_count,
                actual: other.qubit_count,
            }
            .into());
        }

        let mut result = self.clone();
        result.gates.extend(other.gates.iter().cloned());
        Ok(result)
    }

    /// Create the adjoint (dagger) of this circuit
    ///
    /// Fails for circuits containing measurements or `T`.
    pub fn adjoint(&self) -> Result<Self> {
        let mut result = QuantumCircuit::new(self.qubit_count);

        // Add the gates in reverse order, with each gate replaced by its adjoint
        for gate in self.gates.iter().rev() {
            let adjoint = gate.adjoint().ok_or_else(|| SimulationError::UnsupportedGate {
                gate: format!("adjoint of {}", gate),
            })?;
            result.gates.push(adjoint);
        }

        Ok(result)
    }
}

impl fmt::Display for QuantumCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "qreg q[{}];", self.qubit_count)?;
        for gate in &self.gates {
            writeln!(f, "{};", gate)?;
        }
        Ok(())
    }
}

/// BB84 preparation and measurement basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Computational (Z) basis
    Rectilinear,
    /// Hadamard-rotated (X) basis
    Diagonal,
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Rectilinear => write!(f, "Z"),
            Basis::Diagonal => write!(f, "X"),
        }
    }
}

/// Builder for quantum circuits
#[derive(Debug)]
pub struct CircuitBuilder {
    circuit: QuantumCircuit,
}

impl CircuitBuilder {
    /// Create a new circuit builder
    pub fn new(qubit_count: usize) -> Self {
        CircuitBuilder {
            circuit: QuantumCircuit::new(qubit_count),
        }
    }

    /// Build the quantum circuit
    pub fn build(self) -> QuantumCircuit {
        self.circuit
    }

    pub fn qubit_count(&self) -> usize {
        self.circuit.qubit_count
    }

    pub fn add_gate(&mut self, kind: StandardGate, qubits: &[usize]) -> Result<&mut Self> {
        self.circuit.add_gate(kind, qubits)?;
        Ok(self)
    }

    /// Add a Hadamard gate
    pub fn h(&mut self, qubit: usize) -> Result<&mut Self> {
        self.add_gate(StandardGate::H, &[qubit])
    }

    /// Add a Pauli-X gate
    pub fn x(&mut self, qubit: usize) -> Result<&mut Self> {
        self.add_gate(StandardGate::X, &[qubit])
    }

    /// Add a Pauli-Y gate
    pub fn y(&mut self, qubit: usize) -> Result<&mut Self> {
        self.add_gate(StandardGate::Y, &[qubit])
    }

    /// Add a Pauli-Z gate
    pub fn z(&mut self, qubit: usize) -> Result<&mut Self> {
        self.add_gate(StandardGate::Z, &[qubit])
    }

    /// Add a phase gate
    pub fn s(&mut self, qubit: usize) -> Result<&mut Self> {
        self.add_gate(StandardGate::S, &[qubit])
    }

    /// Add an inverse phase gate
    pub fn sdg(&mut self, qubit: usize) -> Result<&mut Self> {
        self.add_gate(StandardGate::Sdg, &[qubit])
    }

    /// Add a T gate
    pub fn t(&mut self, qubit: usize) -> Result<&mut Self> {
        self.add_gate(StandardGate::T, &[qubit])
    }

    /// Add a CNOT gate
    pub fn cnot(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        self.add_gate(StandardGate::CNOT, &[control, target])
    }

    /// Measure a qubit in the Z basis
    pub fn measure(&mut self, qubit: usize) -> Result<&mut Self> {
        self.add_gate(StandardGate::Measure, &[qubit])
    }

    /// Apply a single-qubit gate to every qubit in ascending order
    pub fn on_all(&mut self, kind: StandardGate) -> Result<&mut Self> {
        for q in 0..self.qubit_count() {
            self.add_gate(kind, &[q])?;
        }
        Ok(self)
    }

    /// Apply X to each qubit whose bit is set
    pub fn flip_where(&mut self, bits: &[bool]) -> Result<&mut Self> {
        for (q, _) in bits.iter().enumerate().filter(|&(_, &b)| b) {
            self.x(q)?;
        }
        Ok(self)
    }

    /// Measure every qubit in ascending order
    pub fn measure_all(&mut self) -> Result<&mut Self> {
        self.on_all(StandardGate::Measure)
    }

    /// Create a Bell pair (entangled state)
    pub fn bell_pair(&mut self, qubit1: usize, qubit2: usize) -> Result<&mut Self> {
        self.h(qubit1)?;
        self.cnot(qubit1, qubit2)
    }

    /// BB84 preparation and measurement, one qubit per key bit.
    ///
    /// Qubit i gets X when Alice's bit is 1, H when Alice prepares in the
    /// diagonal basis, H again when Bob measures in it, then a measurement.
    pub fn bb84(alice_bits: &[bool], alice_bases: &[Basis], bob_bases: &[Basis]) -> Result<QuantumCircuit> {
        let n = alice_bits.len();
        expect_len(alice_bases.len(), n)?;
        expect_len(bob_bases.len(), n)?;

        let mut builder = CircuitBuilder::new(n);
        for i in 0..n {
            if alice_bits[i] {
                builder.x(i)?;
            }
            if alice_bases[i] == Basis::Diagonal {
                builder.h(i)?;
            }
            if bob_bases[i] == Basis::Diagonal {
                builder.h(i)?;
            }
            builder.measure(i)?;
        }
        Ok(builder.build())
    }

    /// The six-gate scrambling circuit used for encryption.
    ///
    /// Plaintext flips, key flips, H on all, a CNOT ring, then S, X, Y and Z
    /// on all before measuring everything.
    pub fn forward_six_gate(plaintext: &[bool], key: &[bool]) -> Result<QuantumCircuit> {
        let n = plaintext.len();
        expect_len(key.len(), n)?;

        let mut builder = CircuitBuilder::new(n);
        builder.flip_where(plaintext)?.flip_where(key)?;
        builder.on_all(StandardGate::H)?;
        for i in 0..n.saturating_sub(1) {
            builder.cnot(i, i + 1)?;
        }
        if n > 1 {
            builder.cnot(n - 1, 0)?;
        }
        builder
            .on_all(StandardGate::S)?
            .on_all(StandardGate::X)?
            .on_all(StandardGate::Y)?
            .on_all(StandardGate::Z)?
            .measure_all()?;
        Ok(builder.build())
    }

    /// The inverse of [`CircuitBuilder::forward_six_gate`]'s scrambling layers.
    ///
    /// Ciphertext flips, then Z, Y, X and S† on all, the CNOT ring unwound in
    /// reverse, H on all, key flips, and a measurement of everything.
    pub fn inverse_six_gate(ciphertext: &[bool], key: &[bool]) -> Result<QuantumCircuit> {
        let n = ciphertext.len();
        expect_len(key.len(), n)?;

        let mut builder = CircuitBuilder::new(n);
        builder.flip_where(ciphertext)?;
        builder
            .on_all(StandardGate::Z)?
            .on_all(StandardGate::Y)?
            .on_all(StandardGate::X)?
            .on_all(StandardGate::Sdg)?;
        if n > 1 {
            builder.cnot(n - 1, 0)?;
        }
        for i in (0..n.saturating_sub(1)).rev() {
            builder.cnot(i, i + 1)?;
        }
        builder.on_all(StandardGate::H)?;
        builder.flip_where(key)?;
        builder.measure_all()?;
        Ok(builder.build())
    }
}

fn expect_len(actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(ValidationError::LengthMismatch { expected, actual }.into());
    }
    Ok(())
}
