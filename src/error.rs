//! Typed errors for the operations whose failure kind callers match on.
//!
//! Everything else returns `anyhow::Result` with context attached.
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the session loaders.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The data-type tag is not one of the known recordings.
    #[error("unknown data type '{0}' (expected one of: events, motion, deconv_calcium, raw_calcium)")]
    UnknownDataType(String),

    /// The expected session file does not exist.
    #[error("file {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be decoded.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Invalid arguments to the group-type k-fold splitter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("number of folds must be at least 2, got {0}")]
    TooFewSplits(usize),

    #[error("the 'groups' and 'group_types' parameters must not be None")]
    MissingGroups,

    #[error("expected {expected} labels for '{name}', got {got}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        got: usize,
    },
}
