//! Stabilizer simulator
//!
//! Runs Clifford circuits exactly on a [`Tableau`]. The unitary prefix of a
//! circuit (everything before its first measurement) is applied once; each
//! shot then clones that tableau and replays the remaining instructions with
//! its own random source. Shots run on the rayon pool and their outcomes are
//! merged into a [`ShotDistribution`].

use std::time::{Duration, Instant};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::bits::to_bit_string;
use crate::error::{Error, Result, SimulationError, TimeoutError};
use crate::quantum::circuit::QuantumCircuit;
use crate::quantum::gate::{Gate, StandardGate};
use crate::quantum::tableau::Tableau;
use crate::simulators::distribution::ShotDistribution;

/// A wall-clock limit for one unit of work
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    /// A deadline `limit` from now
    pub fn after(limit: Duration) -> Self {
        Deadline {
            started: Instant::now(),
            limit,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Fails once the limit has been reached
    pub fn check(&self) -> std::result::Result<(), TimeoutError> {
        let elapsed = self.started.elapsed();
        if elapsed >= self.limit {
            return Err(TimeoutError {
                elapsed,
                limit: self.limit,
            });
        }
        Ok(())
    }
}

/// Exact shot-based simulator for Clifford circuits
#[derive(Debug, Clone, Copy, Default)]
pub struct StabilizerSimulator;

impl StabilizerSimulator {
    pub fn new() -> Self {
        StabilizerSimulator
    }

    /// Simulate `circuit` for `shots` repetitions
    pub fn simulate<R: Rng + ?Sized>(&self, circuit: &QuantumCircuit, shots: usize, rng: &mut R) -> Result<ShotDistribution> {
        self.simulate_with_deadline(circuit, shots, rng, None)
    }

    /// Simulate `circuit`, failing with a timeout once `deadline` passes.
    ///
    /// Per-shot generators are seeded from `rng` in shot order, so a seeded
    /// `rng` reproduces the same distribution however the shots are scheduled.
    pub fn simulate_with_deadline<R: Rng + ?Sized>(
        &self,
        circuit: &QuantumCircuit,
        shots: usize,
        rng: &mut R,
        deadline: Option<&Deadline>,
    ) -> Result<ShotDistribution> {
        check_supported(circuit)?;

        let (prefix, suffix) = circuit.gates.split_at(circuit.unitary_prefix_len());
        debug!(
            qubits = circuit.qubit_count,
            gates = circuit.gate_count(),
            replayed = suffix.len(),
            shots,
            "simulating circuit"
        );

        let base = self.prepare(circuit.qubit_count, prefix)?;
        if let Some(deadline) = deadline {
            deadline.check()?;
        }

        let seeds: Vec<u64> = (0..shots).map(|_| rng.gen()).collect();
        seeds
            .into_par_iter()
            .map(|seed| run_shot(&base, suffix, seed, deadline))
            .try_fold(ShotDistribution::new, |mut acc, outcome| {
                acc.record(outcome?);
                Ok::<_, Error>(acc)
            })
            .try_reduce(ShotDistribution::new, |a, b| Ok(a.merge(b)))
    }

    /// Apply unitary gates to the zero state
    pub fn prepare(&self, qubit_count: usize, gates: &[Gate]) -> Result<Tableau> {
        let mut tableau = Tableau::zero_state(qubit_count);
        for gate in gates {
            tableau.apply(gate)?;
        }
        Ok(tableau)
    }

    /// The tableau a measurement-free circuit leaves behind
    pub fn final_tableau(&self, circuit: &QuantumCircuit) -> Result<Tableau> {
        check_supported(circuit)?;
        if circuit.measurement_count() > 0 {
            return Err(SimulationError::UnsupportedGate {
                gate: "measure in a unitary-only circuit".to_string(),
            }
            .into());
        }
        self.prepare(circuit.qubit_count, &circuit.gates)
    }
}

fn check_supported(circuit: &QuantumCircuit) -> Result<()> {
    for gate in &circuit.gates {
        if !gate.kind().is_clifford() {
            return Err(SimulationError::UnsupportedGate {
                gate: gate.to_string(),
            }
            .into());
        }
        if let Some(&qubit) = gate.qubits().iter().find(|&&q| q >= circuit.qubit_count) {
            return Err(SimulationError::QubitOutOfRange {
                qubit,
                qubit_count: circuit.qubit_count,
            }
            .into());
        }
    }
    Ok(())
}

fn run_shot(base: &Tableau, instructions: &[Gate], seed: u64, deadline: Option<&Deadline>) -> Result<String> {
    if let Some(deadline) = deadline {
        deadline.check()?;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tableau = base.clone();
    let mut register = vec![false; tableau.qubit_count()];
    for gate in instructions {
        match (gate.kind(), gate.qubits()) {
            (StandardGate::Measure, &[qubit]) => {
                register[qubit] = tableau.measure(qubit, &mut rng)?.outcome;
            }
            _ => tableau.apply(gate)?,
        }
    }
    Ok(to_bit_string(&register))
}
