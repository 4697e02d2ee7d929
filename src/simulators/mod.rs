//! Quantum circuit simulators
//!
//! This module provides the stabilizer simulator used by every protocol
//! step, simulating Clifford circuits exactly on classical hardware.

pub mod distribution;
pub mod stabilizer;

pub use distribution::ShotDistribution;
pub use stabilizer::{Deadline, StabilizerSimulator};
