use crate::core::QuantumChannel;
use crate::core::errors::ProtocolError;
use crate::protocols::bb84::{Bb84, Status};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::HashMap;

/// Aggregated outcomes of repeated protocol runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSummary {
    pub trials: usize,
    /// Number of runs ending in each status.
    pub counts: HashMap<Status, usize>,
    /// Estimated error rate of every run that got as far as estimation.
    pub error_rates: Vec<f64>,
    pub sifted_lengths: Vec<usize>,
}

impl SampleSummary {
    pub fn count(&self, status: Status) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn abort_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.count(Status::Aborted) as f64 / self.trials as f64
    }

    pub fn mean_error_rate(&self) -> f64 {
        mean(&self.error_rates)
    }

    pub fn median_error_rate(&self) -> f64 {
        let mut rates = self.error_rates.clone();
        if rates.is_empty() {
            return 0.0;
        }
        rates.sort_by(f64::total_cmp);
        let mid = rates.len() / 2;
        if rates.len() % 2 == 0 {
            (rates[mid - 1] + rates[mid]) / 2.0
        } else {
            rates[mid]
        }
    }

    pub fn mean_sifted_length(&self) -> f64 {
        let lengths: Vec<f64> = self.sifted_lengths.iter().map(|&l| l as f64).collect();
        mean(&lengths)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Runs the protocol many times to observe its statistics.
///
/// Every trial draws from its own ChaCha20 stream, keyed by the base seed and
/// selected by the trial index, so trials never share random state.
#[derive(Debug, Clone)]
pub struct Sampler {
    pub num_qubits: usize,
    pub eavesdrop: bool,
    pub seed: u64,
}

impl Sampler {
    /// Creates a `Sampler` without an eavesdropper and with seed 0.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            eavesdrop: false,
            seed: 0,
        }
    }

    pub fn with_eavesdropper(mut self, eavesdrop: bool) -> Self {
        self.eavesdrop = eavesdrop;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Random stream of trial `index`.
    pub fn trial_rng(&self, index: usize) -> ChaCha20Rng {
        let mut rng = ChaCha20Rng::seed_from_u64(self.seed);
        rng.set_stream(index as u64);
        rng
    }

    /// Performs `num_trials` independent runs over `channel`.
    ///
    /// # Errors
    ///
    /// The first failing run stops sampling and its error is returned.
    pub fn run<C: QuantumChannel>(
        &self,
        channel: &C,
        num_trials: usize,
    ) -> Result<SampleSummary, ProtocolError> {
        let protocol = Bb84::new(channel);
        let mut summary = SampleSummary {
            trials: num_trials,
            ..SampleSummary::default()
        };

        for trial in 0..num_trials {
            let mut rng = self.trial_rng(trial);
            let result = protocol.run(self.num_qubits, self.eavesdrop, &mut rng)?;

            *summary.counts.entry(result.status).or_insert(0) += 1;
            summary.sifted_lengths.push(result.stats.sifted_length);
            if let Some(rate) = result.stats.error_rate {
                summary.error_rates.push(rate);
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IdealChannel;

    #[test]
    fn counts_add_up_to_trials() {
        let summary = Sampler::new(32)
            .with_eavesdropper(true)
            .with_seed(5)
            .run(&IdealChannel::new(), 20)
            .unwrap();
        assert_eq!(summary.trials, 20);
        assert_eq!(
            summary.count(Status::Success) + summary.count(Status::Aborted),
            20
        );
        assert_eq!(summary.sifted_lengths.len(), 20);
    }

    #[test]
    fn trial_streams_differ() {
        let sampler = Sampler::new(16);
        let a = sampler.trial_rng(0);
        let b = sampler.trial_rng(1);
        assert_ne!(a, b);
        assert_eq!(sampler.trial_rng(3), sampler.trial_rng(3));
    }

    #[test]
    fn median_of_even_and_odd_samples() {
        let mut summary = SampleSummary {
            error_rates: vec![0.3, 0.1, 0.2],
            ..SampleSummary::default()
        };
        assert_eq!(summary.median_error_rate(), 0.2);
        summary.error_rates.push(0.4);
        assert!((summary.median_error_rate() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let summary = SampleSummary::default();
        assert_eq!(summary.abort_rate(), 0.0);
        assert_eq!(summary.mean_error_rate(), 0.0);
        assert_eq!(summary.mean_sifted_length(), 0.0);
    }

    #[test]
    fn invalid_qubit_count_is_propagated() {
        let res = Sampler::new(4).run(&IdealChannel::new(), 3);
        assert!(matches!(res, Err(ProtocolError::InvalidInput(_))));
    }
}
