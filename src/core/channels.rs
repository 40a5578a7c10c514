//! The quantum channel capability the protocol runs against.
//!
//! A channel prepares a state from a [`QubitPreparation`] and measures a state in
//! a [`Basis`]. Measuring in the preparation basis returns the encoded bit with
//! certainty; measuring in the conjugate basis returns a fair coin flip.
//! Randomness always comes from the caller's RNG, so a channel holds no mutable
//! state and can be shared across concurrent runs.

use crate::core::basis::{Basis, QubitPreparation};
use crate::core::errors::ChannelError;
use crate::core::gates::Gate;
use crate::core::measurements::Measurement;
use crate::core::state::QuantumState;
use rand::Rng;

pub trait QuantumChannel {
    /// Opaque in-flight state.
    type State;

    fn prepare(&self, preparation: QubitPreparation) -> Result<Self::State, ChannelError>;

    /// Consumes `state`: the original preparation does not survive measurement.
    fn measure<R: Rng + ?Sized>(
        &self,
        state: Self::State,
        basis: Basis,
        rng: &mut R,
    ) -> Result<bool, ChannelError>;
}

impl<C: QuantumChannel + ?Sized> QuantumChannel for &C {
    type State = C::State;

    fn prepare(&self, preparation: QubitPreparation) -> Result<Self::State, ChannelError> {
        (**self).prepare(preparation)
    }

    fn measure<R: Rng + ?Sized>(
        &self,
        state: Self::State,
        basis: Basis,
        rng: &mut R,
    ) -> Result<bool, ChannelError> {
        (**self).measure(state, basis, rng)
    }
}

/// Classical probabilistic model of an ideal, noise-free channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdealChannel;

impl IdealChannel {
    pub fn new() -> Self {
        Self
    }
}

impl QuantumChannel for IdealChannel {
    type State = QubitPreparation;

    fn prepare(&self, preparation: QubitPreparation) -> Result<Self::State, ChannelError> {
        Ok(preparation)
    }

    fn measure<R: Rng + ?Sized>(
        &self,
        state: Self::State,
        basis: Basis,
        rng: &mut R,
    ) -> Result<bool, ChannelError> {
        if state.basis == basis {
            Ok(state.bit)
        } else {
            Ok(rng.random_bool(0.5))
        }
    }
}

/// Density-matrix simulation of a single qubit per transmission.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedChannel;

impl SimulatedChannel {
    pub fn new() -> Self {
        Self
    }
}

impl QuantumChannel for SimulatedChannel {
    type State = QuantumState;

    fn prepare(&self, preparation: QubitPreparation) -> Result<Self::State, ChannelError> {
        let mut state = QuantumState::new(1);

        // Flip first, then change basis: |1> -> |->, never the other way round
        if preparation.bit {
            state.apply(&Gate::x(), &[0])?;
        }
        if preparation.basis == Basis::Diagonal {
            state.apply(&Gate::h(), &[0])?;
        }

        Ok(state)
    }

    fn measure<R: Rng + ?Sized>(
        &self,
        mut state: Self::State,
        basis: Basis,
        rng: &mut R,
    ) -> Result<bool, ChannelError> {
        let res = state.measure(&Measurement::for_basis(basis), &[0], rng)?;
        Ok(res.index == 1)
    }
}
