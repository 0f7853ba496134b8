use thiserror::Error;

/// Errors surfaced by the median engine configuration and the stream drivers
#[derive(Error, Debug)]
pub enum Error {
    /// Reading observations or writing results failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A compaction batch size of zero was requested
    ///
    /// Compaction is disabled by leaving the batch size unset, not by passing zero.
    #[error("Invalid compaction batch size: {0} (must be at least 1)")]
    InvalidBatchSize(u64),
}

/// Shorthand for results carrying this crate's [`enum@Error`]
pub type Result<T> = std::result::Result<T, Error>;
