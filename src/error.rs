use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::petri_net::TransitionId;

/// Firing rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("transition `{0}` does not exist in the process model")]
    UnknownTransition(TransitionId),
    #[error("transition `{0}` is not enabled in the given marking")]
    NotEnabled(TransitionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("reachability graph exceeds {limit} states; the net may be unbounded")]
    StateLimitExceeded { limit: usize },
}

/// Failures while turning input files into models.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("transition `{transition}` references undeclared place `{place}`")]
    UnknownPlace { transition: String, place: String },
    #[error("arc between `{place}` and `{transition}` has weight {weight}, only unit weights are supported")]
    UnsupportedWeight {
        transition: String,
        place: String,
        weight: u32,
    },
}

pub type FireResult<T> = Result<T, FireError>;
pub type LoadResult<T> = Result<T, LoadError>;
