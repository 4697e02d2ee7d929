//! Error types for the cipher pipeline
//!
//! Every operation returns one of four failure kinds: validation of caller
//! input, simulation of a circuit, an exceeded deadline, or Huffman decoding.
//! Each kind has its own type so it can be produced and tested on its own,
//! and the top-level [`Error`] wraps them for `?` propagation.

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for all operations in the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller input was missing, malformed or inconsistent
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A circuit could not be simulated
    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// A simulation ran past its deadline
    #[error("timeout: {0}")]
    Timeout(#[from] TimeoutError),

    /// A Huffman bit sequence could not be decoded
    #[error("decoding error: {0}")]
    Decoding(#[from] DecodingError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Simulation,
    Timeout,
    Decoding,
}

impl Error {
    /// The failure kind, independent of the specific variant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Simulation(_) => ErrorKind::Simulation,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Decoding(_) => ErrorKind::Decoding,
        }
    }
}

/// Missing or mismatched caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Neither a message nor pre-encoded bits were supplied
    #[error("either a message or pre-encoded bits must be provided")]
    MissingInput,

    /// Both a message and pre-encoded bits were supplied
    #[error("only one of a message or pre-encoded bits may be provided")]
    ConflictingInput,

    /// Pre-encoded bits were supplied without a shared key
    #[error("a shared key is required when providing bits directly")]
    MissingSharedKey,

    /// A required field was absent or empty
    #[error("field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// A bitstring contained something other than '0' or '1'
    #[error("field '{field}' has invalid bit {found:?} at position {position}")]
    InvalidBit {
        field: &'static str,
        position: usize,
        found: char,
    },

    /// Two bitstrings that must line up had different lengths
    #[error("length mismatch: expected {expected} bits, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A configuration value could not be used
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A circuit that the stabilizer simulator cannot execute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The gate is not in the Clifford set handled by the tableau
    #[error("unsupported gate {gate}")]
    UnsupportedGate { gate: String },

    /// A gate addressed a qubit outside the circuit
    #[error("qubit index {qubit} out of range for {qubit_count} qubits")]
    QubitOutOfRange { qubit: usize, qubit_count: usize },

    /// A two-qubit gate used the same qubit twice
    #[error("control and target are both qubit {0}")]
    ControlTargetOverlap(usize),

    /// The stabilizer generators no longer form a valid group
    #[error("inconsistent tableau: {0}")]
    InconsistentTableau(String),
}

/// A simulation that exceeded the caller's deadline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("simulation exceeded its {limit:?} deadline after {elapsed:?}")]
pub struct TimeoutError {
    pub elapsed: Duration,
    pub limit: Duration,
}

/// Huffman decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    /// The bits ran out part-way through a code
    #[error("bit sequence ended mid-code after {consumed} bits")]
    Truncated { consumed: usize },

    /// A bit was neither '0' nor '1'
    #[error("invalid bit {found:?} at position {position}")]
    InvalidBit { position: usize, found: char },

    /// A bit selected a branch the tree does not have
    #[error("no code continues with the bit at position {position}")]
    InvalidCode { position: usize },

    /// A node referred to a child outside the tree
    #[error("malformed tree: node {index} does not exist")]
    MalformedTree { index: usize },

    /// Bits were supplied for a tree with no symbols
    #[error("cannot decode {bits} bits with an empty tree")]
    EmptyTree { bits: usize },

    /// No tree was supplied for a decode request
    #[error("no Huffman tree available for decoding")]
    MissingTree,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
