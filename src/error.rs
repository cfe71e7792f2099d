//! Errors raised while transforming ops or loading fuzz configuration.

use std::path::PathBuf;

use crate::ot::op::Op;
use crate::ot::range::Range;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A range in the list cannot be placed in current coordinates.
    /// The list is corrupt; the current `apply` stops here.
    #[error("malformed range {range} at index {index}: {reason}")]
    MalformedRange {
        index: usize,
        range: Range,
        reason: &'static str,
    },

    /// An op that reaches before the start of the document.
    #[error("invalid op {op}: {reason}")]
    InvalidOp { op: Op, reason: &'static str },

    /// Placeholder surface that has no settled semantics yet.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("invalid fuzz config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to parse fuzz config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to read fuzz config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
}
