//! Runtime configuration
//!
//! Read from a TOML file with per-field defaults, then optionally overridden
//! from `QCIPHER_*` environment variables.

use std::path::Path;
use std::time::Duration;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::simulators::Deadline;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherConfig {
    /// Shots per encryption and decryption run
    #[serde(default = "default_shots")]
    pub shots: usize,

    /// Shots for the diagnostic BB84 run
    #[serde(default = "default_shots")]
    pub key_exchange_shots: usize,

    /// Per-request deadline in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_shots() -> usize {
    1024
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            shots: default_shots(),
            key_exchange_shots: default_shots(),
            timeout_ms: None,
            seed: None,
        }
    }
}

impl CipherConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: CipherConfig =
            toml::from_str(contents).map_err(|e| ValidationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Override fields from the process environment
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Override fields from any variable source; used by
    /// [`CipherConfig::apply_env_overrides`] with the process environment.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("QCIPHER_SHOTS") {
            self.shots = parse_var("QCIPHER_SHOTS", &value)?;
        }
        if let Some(value) = lookup("QCIPHER_KEY_EXCHANGE_SHOTS") {
            self.key_exchange_shots = parse_var("QCIPHER_KEY_EXCHANGE_SHOTS", &value)?;
        }
        if let Some(value) = lookup("QCIPHER_TIMEOUT_MS") {
            self.timeout_ms = Some(parse_var("QCIPHER_TIMEOUT_MS", &value)?);
        }
        if let Some(value) = lookup("QCIPHER_SEED") {
            self.seed = Some(parse_var("QCIPHER_SEED", &value)?);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.shots == 0 {
            return Err(ValidationError::Config("shots must be positive".to_string()).into());
        }
        if self.key_exchange_shots == 0 {
            return Err(ValidationError::Config("key_exchange_shots must be positive".to_string()).into());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// A fresh deadline for one request, if a timeout is configured
    pub fn deadline(&self) -> Option<Deadline> {
        self.timeout().map(Deadline::after)
    }

    /// A per-request generator: seeded when `seed` is set, otherwise from entropy
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ValidationError::Config(format!("{}={:?}: {}", name, value, e)).into())
}
