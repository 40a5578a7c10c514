//! The quantum leg of BB84: prepare, optionally intercept, measure.
//!
//! Each qubit completes its whole lifecycle before the next one is prepared.

use super::party::{Participants, PartyRecord};
use crate::core::errors::ChannelError;
use crate::core::{Basis, QuantumChannel, encode};
use rand::Rng;

/// Man-in-the-middle: measures every qubit in its own basis and forwards a
/// fresh qubit encoding what it saw.
pub struct Interceptor<'a> {
    bases: &'a [Basis],
    intercepted: Vec<bool>,
}

impl<'a> Interceptor<'a> {
    pub fn new(bases: &'a [Basis]) -> Self {
        Self {
            bases,
            intercepted: Vec::with_capacity(bases.len()),
        }
    }

    /// Collapses `state` and returns its replacement.
    pub fn intercept<C, R>(
        &mut self,
        channel: &C,
        index: usize,
        state: C::State,
        rng: &mut R,
    ) -> Result<C::State, ChannelError>
    where
        C: QuantumChannel,
        R: Rng + ?Sized,
    {
        let basis = self.bases[index];
        let bit = channel.measure(state, basis, rng)?;
        self.intercepted.push(bit);
        channel.prepare(encode(bit, basis))
    }

    pub fn into_record(self) -> PartyRecord {
        PartyRecord {
            bits: self.intercepted,
            bases: self.bases.to_vec(),
        }
    }
}

/// Receiver-side basis measurement.
pub fn measure<C, R>(
    channel: &C,
    state: C::State,
    basis: Basis,
    rng: &mut R,
) -> Result<bool, ChannelError>
where
    C: QuantumChannel,
    R: Rng + ?Sized,
{
    channel.measure(state, basis, rng)
}

/// Outcome of sending every qubit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    /// Bob's measured bits with the bases he used.
    pub bob: PartyRecord,
    /// What Eve measured, if she was on the line.
    pub eve: Option<PartyRecord>,
}

/// Sends all of Alice's qubits to Bob, through Eve when she is present.
///
/// Any channel failure aborts the whole transmission; nothing partial is returned.
pub fn transmit<C, R>(
    channel: &C,
    participants: &Participants,
    rng: &mut R,
) -> Result<Transmission, ChannelError>
where
    C: QuantumChannel,
    R: Rng + ?Sized,
{
    let n = participants.num_qubits();
    let mut eve = participants.eve_bases.as_deref().map(Interceptor::new);
    let mut bob_bits = Vec::with_capacity(n);

    for i in 0..n {
        let mut state = channel.prepare(participants.alice.preparation(i))?;

        if let Some(eve) = eve.as_mut() {
            state = eve.intercept(channel, i, state, rng)?;
        }

        bob_bits.push(measure(channel, state, participants.bob_bases[i], rng)?);
    }

    Ok(Transmission {
        bob: PartyRecord {
            bits: bob_bits,
            bases: participants.bob_bases.clone(),
        },
        eve: eve.map(Interceptor::into_record),
    })
}
