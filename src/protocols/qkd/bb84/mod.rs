//! BB84 Quantum Key Distribution.
//!
//! Alice sends random bits in random bases, Bob measures in random bases, and
//! both keep the positions where the bases agreed. Half of those bits are
//! disclosed to estimate the error rate; an eavesdropper measuring in the wrong
//! basis pushes it to roughly 25%, well over [`ERROR_THRESHOLD`].
//!
//! A run moves one way through
//! `Generating -> Encoding -> (Intercepting) -> Measuring -> Sifting -> Estimating`
//! and ends either in `Aborted` or in `Distilling -> Succeeded`. Aborts are
//! normal outcomes, reported through [`Status::Aborted`] and the log; only bad
//! input and channel failures are errors.

pub mod distillation;
pub mod estimation;
pub mod log;
pub mod party;
pub mod sifting;
pub mod transmission;

pub use estimation::{Decision, ERROR_THRESHOLD, ErrorEstimate, SAMPLE_DIVISOR};
pub use log::{LogEvent, LogTag, ProtocolLog};
pub use party::{Participants, PartyRecord};
pub use sifting::SiftedKey;
pub use transmission::Transmission;

use crate::core::errors::ProtocolError;
use crate::core::{IdealChannel, QuantumChannel};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Smallest accepted number of qubits per run.
pub const MIN_QUBITS: usize = 16;
/// Largest accepted number of qubits per run.
pub const MAX_QUBITS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Success,
    Aborted,
}

/// Counters of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub raw_length: usize,
    pub sifted_length: usize,
    pub sample_size: usize,
    pub mismatches: usize,
    /// Qubits Eve measured and resent; zero without an eavesdropper.
    pub intercepted: usize,
    /// `None` when the run never reached error estimation.
    pub error_rate: Option<f64>,
}

/// BB84 results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolResult {
    pub status: Status,
    /// Empty unless `status` is `Success`, and possibly empty even then.
    pub key: String,
    pub log: ProtocolLog,
    #[serde(skip)]
    pub stats: RunStats,
}

impl ProtocolResult {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// `{"status": ..., "key": ..., "log": [...]}`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Generating,
    Encoding,
    Intercepting,
    Measuring,
    Sifting,
    Estimating,
    Aborted,
    Distilling,
    Succeeded,
}

/// Per-run bookkeeping; nothing here outlives a single run.
struct RunState {
    stage: Stage,
    log: ProtocolLog,
    stats: RunStats,
}

impl RunState {
    fn new(raw_length: usize) -> Self {
        Self {
            stage: Stage::Generating,
            log: ProtocolLog::new(),
            stats: RunStats {
                raw_length,
                ..RunStats::default()
            },
        }
    }

    fn enter(&mut self, next: Stage) {
        debug_assert!(
            next > self.stage && self.stage != Stage::Aborted,
            "illegal transition {:?} -> {next:?}",
            self.stage
        );
        debug!(from = ?self.stage, to = ?next, "bb84 stage");
        self.stage = next;
    }

    fn finish(mut self, status: Status, key: String) -> ProtocolResult {
        self.enter(match status {
            Status::Success => Stage::Succeeded,
            Status::Aborted => Stage::Aborted,
        });
        ProtocolResult {
            status,
            key,
            log: self.log,
            stats: self.stats,
        }
    }
}

/// Rejects counts outside `[MIN_QUBITS, MAX_QUBITS]`.
pub fn validate_qubit_count(num_qubits: usize) -> Result<(), ProtocolError> {
    if num_qubits == 0 {
        return Err(ProtocolError::InvalidInput(
            "number of qubits must be positive".into(),
        ));
    }
    if !(MIN_QUBITS..=MAX_QUBITS).contains(&num_qubits) {
        return Err(ProtocolError::InvalidInput(format!(
            "number of qubits must be between {MIN_QUBITS} and {MAX_QUBITS}, got {num_qubits}"
        )));
    }
    Ok(())
}

/// BB84 over a given quantum channel.
#[derive(Debug, Clone, Default)]
pub struct Bb84<C> {
    channel: C,
}

impl<C: QuantumChannel> Bb84<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Runs BB84 protocol
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `num_qubits` is outside `[MIN_QUBITS, MAX_QUBITS]`,
    /// `Channel` when the channel fails on any qubit.
    pub fn run<R: Rng + ?Sized>(
        &self,
        num_qubits: usize,
        eavesdrop: bool,
        rng: &mut R,
    ) -> Result<ProtocolResult, ProtocolError> {
        validate_qubit_count(num_qubits)?;
        let participants = Participants::generate(num_qubits, eavesdrop, rng);
        self.run_with_participants(participants, rng)
    }

    /// Runs from already chosen bits and bases.
    ///
    /// Accepts any positive number of qubits, so that fixed choices can drive
    /// small deterministic scenarios.
    pub fn run_with_participants<R: Rng + ?Sized>(
        &self,
        participants: Participants,
        rng: &mut R,
    ) -> Result<ProtocolResult, ProtocolError> {
        participants.validate()?;

        let n = participants.num_qubits();
        let eavesdrop = participants.eve_bases.is_some();
        let mut run = RunState::new(n);
        debug!(qubits = n, eavesdrop, "bb84 run started");

        run.log.push(
            LogTag::Alice,
            format!("Generated {n} random bits and bases."),
        );

        run.enter(Stage::Encoding);
        run.log.push(
            LogTag::Alice,
            "Encoded bits into qubits based on chosen bases.",
        );
        run.log
            .push(LogTag::Channel, "Alice is sending qubits to Bob...");

        if eavesdrop {
            run.enter(Stage::Intercepting);
            run.log.push(
                LogTag::HackerAlert,
                "Eavesdropper (Eve) is intercepting the quantum channel!",
            );
        }

        let transmission = transmission::transmit(&self.channel, &participants, rng)?;

        run.stats.intercepted = transmission.eve.as_ref().map_or(0, PartyRecord::len);
        if eavesdrop {
            run.log.push(
                LogTag::HackerAlert,
                "Eve measured the qubits and sent new ones to Bob.",
            );
        }

        run.enter(Stage::Measuring);
        run.log.push(
            LogTag::Bob,
            "Received qubits and is generating his own random bases for measurement.",
        );
        run.log
            .push(LogTag::Bob, "Successfully measured all received qubits.");

        run.enter(Stage::Sifting);
        run.log.push(
            LogTag::PublicChannel,
            "Alice and Bob are now publicly comparing their bases.",
        );
        let sifted = sifting::sift(
            &participants.alice.bases,
            &transmission.bob.bases,
            &participants.alice.bits,
            &transmission.bob.bits,
        );
        run.stats.sifted_length = sifted.len();
        run.log.push(
            LogTag::PublicChannel,
            format!(
                "Basis comparison complete. {} bits remain in the sifted key.",
                sifted.len()
            ),
        );
        debug!(sifted = sifted.len(), "bases compared");

        if sifted.is_empty() {
            run.log.push(
                LogTag::Error,
                "No matching bases found. Cannot establish a key.",
            );
            warn!(qubits = n, "bb84 aborted: no matching bases");
            return Ok(run.finish(Status::Aborted, String::new()));
        }

        run.enter(Stage::Estimating);
        let estimate = estimation::estimate_errors(&sifted, rng);
        run.stats.sample_size = estimate.sample_size();
        run.stats.mismatches = estimate.mismatches;
        run.stats.error_rate = Some(estimate.error_rate);
        run.log.push(
            LogTag::PublicChannel,
            format!(
                "Alice and Bob are comparing {} random bits from their sifted keys to check for errors.",
                estimate.sample_size()
            ),
        );
        run.log.push(
            LogTag::System,
            format!("Calculated error rate: {:.2}%", estimate.error_rate * 100.0),
        );
        debug!(
            sample = estimate.sample_size(),
            mismatches = estimate.mismatches,
            error_rate = estimate.error_rate,
            "errors estimated"
        );

        match estimate.decision() {
            Decision::Abort => {
                run.log.push(
                    LogTag::HackerDetected,
                    "High error rate detected! Communication is compromised. Aborting key exchange.",
                );
                warn!(
                    error_rate = estimate.error_rate,
                    threshold = ERROR_THRESHOLD,
                    "bb84 aborted: error rate above threshold"
                );
                Ok(run.finish(Status::Aborted, String::new()))
            }
            Decision::Accept => {
                run.enter(Stage::Distilling);
                let key = distillation::distill(&sifted, &estimate);
                run.log.push(
                    LogTag::Success,
                    format!(
                        "Communication channel is secure. Final key of length {} established.",
                        key.len()
                    ),
                );
                info!(key_length = key.len(), qubits = n, "bb84 key established");
                Ok(run.finish(Status::Success, key))
            }
        }
    }
}

/// One run over an ideal channel with a fresh OS-seeded random stream.
pub fn run_protocol(num_qubits: usize, eavesdrop: bool) -> Result<ProtocolResult, ProtocolError> {
    let mut rng = ChaCha20Rng::from_os_rng();
    Bb84::new(IdealChannel::new()).run(num_qubits, eavesdrop, &mut rng)
}

/// Same as [`run_protocol`], reproducible from `seed`.
pub fn run_seeded(
    num_qubits: usize,
    eavesdrop: bool,
    seed: u64,
) -> Result<ProtocolResult, ProtocolError> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    Bb84::new(IdealChannel::new()).run(num_qubits, eavesdrop, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Basis::{self, Diagonal as X, Rectilinear as Z};

    fn fixed(alice_bits: Vec<bool>, alice_bases: Vec<Basis>, bob_bases: Vec<Basis>) -> Participants {
        Participants {
            alice: PartyRecord::new(alice_bits, alice_bases).unwrap(),
            bob_bases,
            eve_bases: None,
        }
    }

    #[test]
    fn rejects_out_of_range_counts() {
        for n in [0, 1, 15, 257, 10_000] {
            assert!(matches!(
                run_seeded(n, false, 1),
                Err(ProtocolError::InvalidInput(_))
            ));
        }
        assert!(run_seeded(MIN_QUBITS, false, 1).is_ok());
        assert!(run_seeded(MAX_QUBITS, false, 1).is_ok());
    }

    #[test]
    fn empty_participants_are_invalid() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let res = Bb84::new(IdealChannel::new())
            .run_with_participants(fixed(vec![], vec![], vec![]), &mut rng);
        assert!(matches!(res, Err(ProtocolError::InvalidInput(_))));
    }

    #[test]
    fn single_agreement_keeps_its_bit() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let res = Bb84::new(IdealChannel::new())
            .run_with_participants(fixed(vec![true, false], vec![Z, X], vec![Z, Z]), &mut rng)
            .unwrap();
        // Nothing is disclosed from a single sifted bit, so it becomes the key
        assert_eq!(res.status, Status::Success);
        assert_eq!(res.key, "1");
        assert_eq!(res.stats.sifted_length, 1);
        assert_eq!(res.stats.sample_size, 0);
        assert_eq!(res.stats.error_rate, Some(0.0));
    }

    #[test]
    fn log_order_without_eavesdropper() {
        let res = run_seeded(64, false, 21).unwrap();
        let tags: Vec<LogTag> = res.log.events().iter().map(|e| e.tag).collect();
        assert_eq!(
            &tags[..8],
            &[
                LogTag::Alice,
                LogTag::Alice,
                LogTag::Channel,
                LogTag::Bob,
                LogTag::Bob,
                LogTag::PublicChannel,
                LogTag::PublicChannel,
                LogTag::PublicChannel,
            ]
        );
        assert_eq!(tags[8], LogTag::System);
        assert_eq!(tags[9], LogTag::Success);
        assert_eq!(tags.len(), 10);
        assert!(!res.log.contains_tag(LogTag::HackerAlert));
    }

    #[test]
    fn eavesdropper_is_announced_in_log() {
        let res = run_seeded(64, true, 21).unwrap();
        let alerts = res
            .log
            .events()
            .iter()
            .filter(|e| e.tag == LogTag::HackerAlert)
            .count();
        assert_eq!(alerts, 2);
        assert_eq!(res.log.events()[3].tag, LogTag::HackerAlert);
        assert_eq!(res.stats.intercepted, 64);
        assert_eq!(run_seeded(64, false, 21).unwrap().stats.intercepted, 0);
    }

    #[test]
    fn error_rate_line_has_two_decimals() {
        let res = run_seeded(32, false, 3).unwrap();
        assert!(
            res.log
                .lines()
                .contains(&"[SYSTEM] Calculated error rate: 0.00%".to_string())
        );
    }

    #[test]
    fn stats_are_consistent_with_key() {
        let res = run_seeded(128, false, 99).unwrap();
        let stats = &res.stats;
        assert_eq!(stats.raw_length, 128);
        assert!(stats.sifted_length <= 128);
        assert_eq!(stats.sample_size, stats.sifted_length / 2);
        assert_eq!(res.key.len(), stats.sifted_length - stats.sample_size);
    }
}
