//! Simulation of the BB84 quantum key distribution protocol.
//!
//! ```no_run
//! let result = qkd_bb84::run_protocol(64, false)?;
//! println!("{}", result.to_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
mod core;
pub mod protocols;
mod sampler;

pub use crate::config::{ChannelKind, ProtocolConfig};
pub use crate::core::{
    Basis, Gate, IdealChannel, Measurement, MeasurementResult, QuantumChannel, QuantumState,
    QubitPreparation, SimulatedChannel, encode, errors, utils,
};
pub use crate::protocols::bb84::{
    Bb84, MAX_QUBITS, MIN_QUBITS, ProtocolResult, Status, run_protocol, run_seeded,
};
pub use crate::sampler::{SampleSummary, Sampler};
