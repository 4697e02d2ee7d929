//! Error mitigation for decryption outcomes

use tracing::{debug, info};

use crate::bits::hamming_distance;
use crate::error::{Result, ValidationError};
use crate::simulators::ShotDistribution;

/// Picks the outcome closest to a reference bitstring.
///
/// Candidates are visited from most to least frequent and a later candidate
/// only wins with a strictly smaller Hamming distance, so among equally close
/// outcomes the most frequent one is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorMitigationDecoder;

impl ErrorMitigationDecoder {
    pub fn select(distribution: &ShotDistribution, reference: &str) -> Result<String> {
        let sorted = distribution.sorted_by_count();
        debug!(top = ?&sorted[..sorted.len().min(3)], "top decryption counts");

        let mut best: Option<(&str, usize)> = None;
        for (candidate, _) in sorted {
            let distance = hamming_distance(candidate, reference)?;
            if best.map_or(true, |(_, min)| distance < min) {
                best = Some((candidate, distance));
            }
        }

        let (outcome, distance) = best.ok_or(ValidationError::EmptyField { field: "distribution" })?;
        info!(outcome, distance, "mitigated decryption outcome");
        Ok(outcome.to_string())
    }
}
