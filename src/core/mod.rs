pub mod basis;
mod channels;
pub mod errors;
mod gates;
mod measurements;
mod state;
pub mod utils;

pub use basis::{Basis, QubitPreparation, encode};
pub use channels::{IdealChannel, QuantumChannel, SimulatedChannel};
pub use gates::Gate;
pub use measurements::{Measurement, MeasurementResult};
pub use state::QuantumState;
