//! Public basis comparison.

use crate::core::Basis;

/// Bits at the positions where Alice and Bob used the same basis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiftedKey {
    /// Positions in the raw transmission where the bases agreed, ascending.
    pub agreement: Vec<usize>,
    pub alice_bits: Vec<bool>,
    pub bob_bits: Vec<bool>,
}

impl SiftedKey {
    pub fn len(&self) -> usize {
        self.agreement.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agreement.is_empty()
    }
}

/// Keeps index `i` iff `alice_bases[i] == bob_bases[i]`.
///
/// All four slices are walked in lockstep; positions past the shortest one are
/// never compared.
pub fn sift(
    alice_bases: &[Basis],
    bob_bases: &[Basis],
    alice_bits: &[bool],
    bob_bits: &[bool],
) -> SiftedKey {
    let mut key = SiftedKey::default();

    let positions = alice_bases
        .iter()
        .zip(bob_bases)
        .zip(alice_bits.iter().zip(bob_bits))
        .enumerate();

    for (i, ((a_basis, b_basis), (&a_bit, &b_bit))) in positions {
        if a_basis == b_basis {
            key.agreement.push(i);
            key.alice_bits.push(a_bit);
            key.bob_bits.push(b_bit);
        }
    }

    key
}
