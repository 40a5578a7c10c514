//! Quantum Key Distribution (QKD) Protocols.
//!
//! - **BB84**: prepare-and-measure key distribution over two conjugate bases,
//!   with eavesdropper detection through the sampled error rate.

pub mod bb84;
