//! Bit and basis choices of the three parties.

use crate::core::errors::ProtocolError;
use crate::core::{Basis, QubitPreparation, encode};
use rand::Rng;

/// Ordered (bit, basis) pairs, one per transmitted qubit.
///
/// Index `i` of one party's record always refers to the same qubit as index `i`
/// of every other party's record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyRecord {
    pub bits: Vec<bool>,
    pub bases: Vec<Basis>,
}

impl PartyRecord {
    pub fn new(bits: Vec<bool>, bases: Vec<Basis>) -> Result<Self, ProtocolError> {
        if bits.len() != bases.len() {
            return Err(ProtocolError::InvalidInput(format!(
                "record has {} bits but {} bases",
                bits.len(),
                bases.len()
            )));
        }
        Ok(Self { bits, bases })
    }

    /// `n` independent uniformly random bits and bases.
    pub fn generate<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let bits = random_bits(n, rng);
        let bases = random_bases(n, rng);
        Self { bits, bases }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn preparation(&self, index: usize) -> QubitPreparation {
        encode(self.bits[index], self.bases[index])
    }
}

pub fn random_bits<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<bool> {
    (0..n).map(|_| rng.random_bool(0.5)).collect()
}

pub fn random_bases<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Basis> {
    (0..n).map(|_| Basis::random(rng)).collect()
}

/// Everything chosen before the first qubit leaves the sender.
///
/// Alice owns bits and bases; Bob and, if present, Eve only pick bases. Their
/// bits come out of measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participants {
    pub alice: PartyRecord,
    pub bob_bases: Vec<Basis>,
    pub eve_bases: Option<Vec<Basis>>,
}

impl Participants {
    /// Draws in a fixed order: Alice's bits, Alice's bases, Eve's bases, Bob's bases.
    pub fn generate<R: Rng + ?Sized>(n: usize, eavesdrop: bool, rng: &mut R) -> Self {
        let alice = PartyRecord::generate(n, rng);
        let eve_bases = eavesdrop.then(|| random_bases(n, rng));
        let bob_bases = random_bases(n, rng);
        Self {
            alice,
            bob_bases,
            eve_bases,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.alice.len()
    }

    /// Every record must cover the same positive number of qubits.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let n = self.alice.len();
        if n == 0 {
            return Err(ProtocolError::InvalidInput(
                "number of qubits must be positive".into(),
            ));
        }
        if self.alice.bases.len() != n {
            return Err(ProtocolError::InvalidInput(format!(
                "Alice has {n} bits but {} bases",
                self.alice.bases.len()
            )));
        }
        if self.bob_bases.len() != n {
            return Err(ProtocolError::InvalidInput(format!(
                "Bob has {} bases for {n} qubits",
                self.bob_bases.len()
            )));
        }
        if let Some(eve) = &self.eve_bases {
            if eve.len() != n {
                return Err(ProtocolError::InvalidInput(format!(
                    "Eve has {} bases for {n} qubits",
                    eve.len()
                )));
            }
        }
        Ok(())
    }
}
