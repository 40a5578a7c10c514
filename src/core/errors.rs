use num_complex::Complex64;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GateError {
    #[error("Matrix is not Unitary (U†U != I)")]
    NonUnitary,

    #[error("Matrix must be square")]
    NotSquareMatrix,

    #[error("Invalid Dimensions")]
    InvalidDimensions,

    #[error("Duplicate qubit index found: {0}")]
    DuplicateQubit(usize),
}

#[derive(Error, Debug, Clone)]
pub enum MeasurementError {
    #[error("Number of operators ({ops}) does not match number of values ({vals})")]
    CountMismatch { ops: usize, vals: usize },

    #[error("Measurement operators do not sum to Identity (Completeness relation failed)")]
    NotComplete,

    #[error("Invalid operator dimensions")]
    InvalidDimensions,

    #[error("Duplicate qubit index found: {0}")]
    DuplicateQubit(usize),
}

#[derive(Error, Debug, Clone)]
pub enum StateError {
    #[error("Trace is not unity: {0}")]
    InvalidTrace(Complex64),

    #[error("Dimension mismatch")]
    DimensionMismatch {
        expected: usize,
        got_rows: usize,
        got_cols: usize,
    },

    #[error("Qubit index out of bounds")]
    IndexOutOfBounds { index: usize, num_qubits: usize },

    #[error("Measurement error: {0}")]
    MeasurementError(#[from] MeasurementError),

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),
}

/// Failure of the quantum channel primitive. Never retried by the protocol.
#[derive(Error, Debug, Clone)]
pub enum ChannelError {
    #[error("Channel backend unavailable: {0}")]
    Backend(String),

    #[error("Simulated state error: {0}")]
    State(#[from] StateError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for `{key}`: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Number of qubits must be between {min} and {max}, got {got}")]
    QubitsOutOfRange { got: usize, min: usize, max: usize },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Hard failure of a protocol run. Aborts are not errors, see `Status::Aborted`.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Channel failure: {0}")]
    Channel(#[from] ChannelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
