//! Preparation and measurement bases, and the BB84 encoding rule.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One of the two conjugate BB84 bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Computational basis {|0>, |1>}.
    #[serde(rename = "Z")]
    Rectilinear,
    /// Hadamard basis {|+>, |->}.
    #[serde(rename = "X")]
    Diagonal,
}

impl Basis {
    /// Uniformly random basis.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }
}

/// A sender's intent: which bit to encode and in which basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QubitPreparation {
    pub bit: bool,
    pub basis: Basis,
}

/// Maps a classical bit and basis to a preparation request.
///
/// Channels realise it as a bit flip (X) when `bit` is set, followed by a basis
/// change (H) when `basis` is diagonal.
pub fn encode(bit: bool, basis: Basis) -> QubitPreparation {
    QubitPreparation { bit, basis }
}
