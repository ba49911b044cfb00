use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the experiment config document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("unable to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum TextError {
    #[error("text `{reference}` not found in {}", .dir.display())]
    NotFound { reference: String, dir: PathBuf },

    #[error("unable to read text file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("experiment id {id} does not exist ({available} sequences configured)")]
    UnknownId { id: i64, available: usize },

    #[error("sequence for experiment id {id} is invalid: {reason}")]
    Invalid { id: i64, reason: String },

    #[error("experiment sequence is exhausted")]
    Exhausted,
}

/// Failures of the per-round record persistence.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("unable to write round record {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to serialize round record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("round record was already discarded to {}", .0.display())]
    AlreadyDiscarded(PathBuf),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Log(#[from] LogError),
}

impl LogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LogError::Io {
            path: path.into(),
            source,
        }
    }
}
