use std::path::PathBuf;
use thiserror::Error;

/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

/// Error type returned by every fallible operation in the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Unparseable textual prefix, prefix length out of range, unaligned
    /// range, or an internal range-to-prefix conversion failure.
    #[error("invalid IP prefix: {0}")]
    InvalidPrefix(String),

    /// Minimum prefix length outside `0..=32` (IPv4) or `0..=128` (IPv6).
    #[error("invalid minimum prefix length: {0}")]
    InvalidMinPrefixLen(String),

    /// Address family other than IPv4 or IPv6.
    #[error("unsupported IP version: {0}")]
    UnsupportedIpVersion(String),

    /// Named input path does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Underlying stream read/write failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The fixed-point merge exceeded its iteration cap. This indicates an
    /// implementation bug, not a problem with the input.
    #[error("aggregation did not converge after {0} iterations")]
    AggregationDivergence(u32),
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
