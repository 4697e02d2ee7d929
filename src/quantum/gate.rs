// src/quantum/gate.rs
//! Quantum gates
//!
//! Gates are plain tagged values: a [`StandardGate`] kind together with the
//! qubits it acts on. The stabilizer simulator only understands the Clifford
//! kinds plus measurement; `T` can be written into a circuit but is rejected
//! when the circuit is simulated.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Standard gate kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardGate {
    /// Hadamard gate
    H,

    /// Pauli-X gate (NOT gate)
    X,

    /// Pauli-Y gate
    Y,

    /// Pauli-Z gate
    Z,

    /// Phase gate (S gate)
    S,

    /// Inverse phase gate (S†)
    Sdg,

    /// CNOT gate, control first
    CNOT,

    /// π/8 gate (T gate), not Clifford
    T,

    /// Z-basis measurement into the classical bit of the same index
    Measure,
}

impl StandardGate {
    /// Number of qubits this kind acts on
    pub fn qubit_count(&self) -> usize {
        match self {
            StandardGate::CNOT => 2,
            _ => 1,
        }
    }

    /// Whether the stabilizer tableau can apply this kind
    pub fn is_clifford(&self) -> bool {
        !matches!(self, StandardGate::T)
    }

    /// Whether this kind is unitary (everything but measurement)
    pub fn is_unitary(&self) -> bool {
        !matches!(self, StandardGate::Measure)
    }

    /// The inverse gate kind, if it is expressible in this gate set
    pub fn adjoint(&self) -> Option<StandardGate> {
        match self {
            StandardGate::S => Some(StandardGate::Sdg),
            StandardGate::Sdg => Some(StandardGate::S),
            StandardGate::T | StandardGate::Measure => None,
            other => Some(*other),
        }
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StandardGate::H => "h",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::CNOT => "cx",
            StandardGate::T => "t",
            StandardGate::Measure => "measure",
        };
        write!(f, "{}", name)
    }
}

/// A gate kind bound to the qubits it acts on. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gate {
    kind: StandardGate,
    qubits: Vec<usize>,
}

impl Gate {
    /// Bind `kind` to `qubits`, checking arity and distinctness
    pub fn new(kind: StandardGate, qubits: &[usize]) -> Result<Self, SimulationError> {
        if qubits.len() != kind.qubit_count() {
            return Err(SimulationError::UnsupportedGate {
                gate: format!(
                    "{} on {} qubits (expects {})",
                    kind,
                    qubits.len(),
                    kind.qubit_count()
                ),
            });
        }
        if let [control, target] = qubits {
            if control == target {
                return Err(SimulationError::ControlTargetOverlap(*control));
            }
        }
        Ok(Gate { kind, qubits: qubits.to_vec() })
    }

    pub fn kind(&self) -> StandardGate {
        self.kind
    }

    pub fn qubits(&self) -> &[usize] {
        &self.qubits
    }

    /// Inverse of this gate on the same qubits
    pub fn adjoint(&self) -> Option<Gate> {
        self.kind.adjoint().map(|kind| Gate { kind, qubits: self.qubits.clone() })
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for (i, q) in self.qubits.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}q[{}]", sep, q)?;
        }
        Ok(())
    }
}
