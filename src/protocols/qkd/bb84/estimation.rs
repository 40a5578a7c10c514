//! Error-rate estimation on a disclosed sample of the sifted key.

use super::sifting::SiftedKey;
use crate::core::errors::ProtocolError;
use rand::Rng;
use rand::seq::index;

/// Error rates strictly above this abort the exchange.
pub const ERROR_THRESHOLD: f64 = 0.1;

/// One in every `SAMPLE_DIVISOR` sifted bits is disclosed (rounded down).
pub const SAMPLE_DIVISOR: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Abort,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEstimate {
    /// Disclosed positions within the sifted key, ascending.
    pub sample: Vec<usize>,
    pub mismatches: usize,
    /// `mismatches / sample.len()`, or zero for an empty sample.
    pub error_rate: f64,
}

impl ErrorEstimate {
    pub fn sample_size(&self) -> usize {
        self.sample.len()
    }

    pub fn decision(&self) -> Decision {
        if self.error_rate > ERROR_THRESHOLD {
            Decision::Abort
        } else {
            Decision::Accept
        }
    }
}

pub fn sample_size(sifted_len: usize) -> usize {
    sifted_len / SAMPLE_DIVISOR
}

/// Picks `⌊L/2⌋` sifted positions uniformly without replacement and counts
/// where Alice and Bob disagree.
pub fn estimate_errors<R: Rng + ?Sized>(key: &SiftedKey, rng: &mut R) -> ErrorEstimate {
    let len = key.len();
    let mut sample = index::sample(rng, len, sample_size(len)).into_vec();
    sample.sort_unstable();

    count_mismatches(key, sample)
}

/// Counts mismatches over a caller-chosen sample of sifted positions.
///
/// The sample must name distinct positions inside the sifted key.
pub fn error_estimate_for(
    key: &SiftedKey,
    mut sample: Vec<usize>,
) -> Result<ErrorEstimate, ProtocolError> {
    sample.sort_unstable();

    if let Some(&last) = sample.last() {
        if last >= key.len() {
            return Err(ProtocolError::InvalidInput(format!(
                "sample position {last} outside sifted key of length {}",
                key.len()
            )));
        }
    }
    if let Some(w) = sample.windows(2).find(|w| w[0] == w[1]) {
        return Err(ProtocolError::InvalidInput(format!(
            "sample position {} drawn twice",
            w[0]
        )));
    }

    Ok(count_mismatches(key, sample))
}

/// `sample` is sorted, distinct and in range.
fn count_mismatches(key: &SiftedKey, sample: Vec<usize>) -> ErrorEstimate {
    let mismatches = sample
        .iter()
        .filter(|&&i| key.alice_bits[i] != key.bob_bits[i])
        .count();

    let error_rate = if sample.is_empty() {
        0.0
    } else {
        mismatches as f64 / sample.len() as f64
    };

    ErrorEstimate {
        sample,
        mismatches,
        error_rate,
    }
}
