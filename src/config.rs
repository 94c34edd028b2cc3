//! Process configuration for the `points-ledger` binary.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::ActorId;
use crate::seed::DEFAULT_ACTOR;

pub const ACTOR_VAR: &str = "POINTS_LEDGER_ACTOR";
pub const SEED_VAR: &str = "POINTS_LEDGER_SEED";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("usage: points-ledger <commands.csv>")]
    MissingInput,

    #[error("POINTS_LEDGER_ACTOR must not be empty")]
    EmptyActor,

    #[error("POINTS_LEDGER_SEED must be one of 1, 0, true, false; got '{0}'")]
    InvalidSeedFlag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Batch of commands to run.
    pub input: PathBuf,
    /// User the batch is run as.
    pub actor: ActorId,
    /// Load the default ledger before running the batch.
    pub seed: bool,
}

impl Config {
    /// Read the first argument and the `POINTS_LEDGER_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_parts(
            env::args().nth(1),
            env::var(ACTOR_VAR).ok(),
            env::var(SEED_VAR).ok(),
        )
    }

    pub fn from_parts(
        input: Option<String>,
        actor: Option<String>,
        seed: Option<String>,
    ) -> Result<Self, ConfigError> {
        let input = input
            .filter(|path| !path.is_empty())
            .ok_or(ConfigError::MissingInput)?;

        let actor = match actor {
            Some(actor) if actor.trim().is_empty() => return Err(ConfigError::EmptyActor),
            Some(actor) => actor.trim().to_string(),
            None => DEFAULT_ACTOR.to_string(),
        };

        let seed = match seed.as_deref().map(str::trim) {
            None | Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            Some(other) => return Err(ConfigError::InvalidSeedFlag(other.to_string())),
        };

        Ok(Self {
            input: PathBuf::from(input),
            actor,
            seed,
        })
    }
}
