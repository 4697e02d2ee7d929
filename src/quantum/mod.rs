// src/quantum/mod.rs
//! Quantum circuit abstractions
//!
//! This module implements the Clifford gate set, circuits built from it,
//! and the stabilizer tableau those circuits act on.

pub mod gate;
pub mod circuit;
pub mod tableau;

pub use gate::{Gate, StandardGate};
pub use circuit::{Basis, CircuitBuilder, QuantumCircuit};
pub use tableau::{MeasurementResult, PauliRow, Tableau};

/// Re-export commonly used types
pub mod prelude {
    pub use super::{Gate, StandardGate};
    pub use super::{Basis, QuantumCircuit, CircuitBuilder};
    pub use super::Tableau;
}
