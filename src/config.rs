//! Run parameters, loadable from TOML or the environment.

use crate::core::errors::{ConfigError, ProtocolError};
use crate::core::{IdealChannel, SimulatedChannel};
use crate::protocols::bb84::{Bb84, MAX_QUBITS, MIN_QUBITS, ProtocolResult};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Classical model of the measurement statistics.
    #[default]
    Ideal,
    /// Density-matrix simulation.
    Simulated,
}

impl std::str::FromStr for ChannelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ideal" => Ok(ChannelKind::Ideal),
            "simulated" => Ok(ChannelKind::Simulated),
            _ => Err(ConfigError::InvalidValue {
                key: "channel",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub num_qubits: usize,
    pub eavesdrop: bool,
    /// Fixed seed for reproducible runs; fresh OS entropy when absent.
    pub seed: Option<u64>,
    pub channel: ChannelKind,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            num_qubits: 64,
            eavesdrop: false,
            seed: None,
            channel: ChannelKind::Ideal,
        }
    }
}

impl ProtocolConfig {
    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads `BB84_QUBITS`, `BB84_EAVESDROP`, `BB84_SEED` and `BB84_CHANNEL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(v) = lookup("BB84_QUBITS") {
            cfg.num_qubits = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "num_qubits",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("BB84_EAVESDROP") {
            cfg.eavesdrop = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Some(v) = lookup("BB84_SEED") {
            cfg.seed = Some(v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "seed",
                value: v.clone(),
            })?);
        }
        if let Some(v) = lookup("BB84_CHANNEL") {
            cfg.channel = v.parse()?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_QUBITS..=MAX_QUBITS).contains(&self.num_qubits) {
            return Err(ConfigError::QubitsOutOfRange {
                got: self.num_qubits,
                min: MIN_QUBITS,
                max: MAX_QUBITS,
            });
        }
        Ok(())
    }

    pub fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_os_rng(),
        }
    }

    /// Validates, then performs one run on the configured channel.
    pub fn run(&self) -> Result<ProtocolResult, ProtocolError> {
        self.validate()?;
        let mut rng = self.rng();
        match self.channel {
            ChannelKind::Ideal => {
                Bb84::new(IdealChannel::new()).run(self.num_qubits, self.eavesdrop, &mut rng)
            }
            ChannelKind::Simulated => {
                Bb84::new(SimulatedChannel::new()).run(self.num_qubits, self.eavesdrop, &mut rng)
            }
        }
    }
}
