//! Error types for name loading, generation, creation, export and config.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading replacement name pools.
#[derive(Error, Debug)]
pub enum NameSourceError {
    #[error("failed to read name list '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Rejected generator inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("password length {length} is below the minimum of {minimum}")]
    PasswordTooShort { length: usize, minimum: usize },

    #[error("minimum age {min_age} is greater than maximum age {max_age}")]
    InvertedAgeRange { min_age: u32, max_age: u32 },

    #[error("age {age} reaches past the supported calendar range")]
    AgeOutOfRange { age: u32 },
}

/// Failures reported by an account-creation backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("automation engine failed: {0}")]
    Engine(String),

    #[error("automation engine does not support provider '{0}'")]
    UnsupportedProvider(String),
}

/// Export failures. The ledger is never modified by a failed export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("no accounts to export")]
    EmptyLedger,

    #[error("failed to serialize accounts: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Config snapshot load/save and conversion failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to write config '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    InvalidValue(#[from] ParseValueError),

    #[error("SMS service '{service}' requires {field}")]
    MissingSmsCredential {
        service: &'static str,
        field: &'static str,
    },
}

/// A string did not name a known provider, browser or SMS service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}
