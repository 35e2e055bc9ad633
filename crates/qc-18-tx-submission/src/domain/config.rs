//! Submission subsystem configuration with validation.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use super::types::NetworkId;

/// Main submission configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Passphrase of the network transactions are bound to
    pub network_passphrase: String,
    /// Period of the reconciliation tick
    #[serde(with = "human_duration")]
    pub reconcile_interval: Duration,
    /// Open submissions older than this are dropped by the tick
    #[serde(with = "human_duration")]
    pub max_submission_age: Duration,
    /// Sequence gate inactivity timeout
    #[serde(with = "human_duration")]
    pub gate_timeout: Duration,
    /// Route submissions through the per-account sequence gate
    pub sequence_gating: bool,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            network_passphrase: "Quantum Chain Test Network".to_string(),
            reconcile_interval: Duration::from_secs(1),
            max_submission_age: Duration::from_secs(30),
            gate_timeout: Duration::from_secs(60),
            sequence_gating: true,
        }
    }
}

impl SubmissionConfig {
    /// Build configuration from environment variables over defaults.
    ///
    /// # Environment Variables
    ///
    /// - `QC_TXSUB_NETWORK_PASSPHRASE`
    /// - `QC_TXSUB_RECONCILE_INTERVAL` (e.g. `1s`, `500ms`)
    /// - `QC_TXSUB_MAX_SUBMISSION_AGE` (e.g. `30s`)
    /// - `QC_TXSUB_GATE_TIMEOUT` (e.g. `1m`)
    /// - `QC_TXSUB_SEQUENCE_GATING` (`true` / `false`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(passphrase) = env::var("QC_TXSUB_NETWORK_PASSPHRASE") {
            config.network_passphrase = passphrase;
        }
        if let Ok(v) = env::var("QC_TXSUB_RECONCILE_INTERVAL") {
            config.reconcile_interval = parse_env_duration("QC_TXSUB_RECONCILE_INTERVAL", &v)?;
        }
        if let Ok(v) = env::var("QC_TXSUB_MAX_SUBMISSION_AGE") {
            config.max_submission_age = parse_env_duration("QC_TXSUB_MAX_SUBMISSION_AGE", &v)?;
        }
        if let Ok(v) = env::var("QC_TXSUB_GATE_TIMEOUT") {
            config.gate_timeout = parse_env_duration("QC_TXSUB_GATE_TIMEOUT", &v)?;
        }
        if let Ok(v) = env::var("QC_TXSUB_SEQUENCE_GATING") {
            config.sequence_gating = v.parse().map_err(|_| {
                ConfigError::Invalid(format!("QC_TXSUB_SEQUENCE_GATING: expected bool, got {v}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network_passphrase.trim().is_empty() {
            return Err(ConfigError::EmptyPassphrase);
        }
        if self.reconcile_interval.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "reconcile_interval cannot be 0".into(),
            ));
        }
        if self.max_submission_age.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "max_submission_age cannot be 0".into(),
            ));
        }
        if self.gate_timeout.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "gate_timeout cannot be 0".into(),
            ));
        }
        Ok(())
    }

    pub fn network_id(&self) -> NetworkId {
        NetworkId::from_passphrase(&self.network_passphrase)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No network passphrase configured
    #[error("network passphrase cannot be empty")]
    EmptyPassphrase,
    /// Zero or unparsable duration
    #[error("invalid duration: {0}")]
    InvalidDuration(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn parse_env_duration(name: &str, value: &str) -> Result<Duration, ConfigError> {
    human_duration::parse(value)
        .map_err(|e| ConfigError::InvalidDuration(format!("{name}: {e}")))
}

/// Durations as `500ms`, `30s`, `2m` or bare seconds
mod human_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Unit suffixes and their length in milliseconds. `ms` precedes `m`
    /// and `s` so it is matched first.
    const UNITS: [(&str, u64); 3] = [("ms", 1), ("s", 1_000), ("m", 60_000)];

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis();
        let text = if millis % 60_000 == 0 && millis > 0 {
            format!("{}m", millis / 60_000)
        } else if millis % 1_000 == 0 {
            format!("{}s", millis / 1_000)
        } else {
            format!("{millis}ms")
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }

    pub fn parse(text: &str) -> Result<Duration, &'static str> {
        let text = text.trim();
        let (digits, unit_millis) = UNITS
            .iter()
            .find_map(|(suffix, millis)| text.strip_suffix(suffix).map(|d| (d, *millis)))
            .unwrap_or((text, 1_000));

        let value: u64 = digits
            .trim()
            .parse()
            .map_err(|_| "expected a whole number with an optional ms/s/m unit")?;
        value
            .checked_mul(unit_millis)
            .map(Duration::from_millis)
            .ok_or("duration out of range")
    }
}
