#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod engine;
mod error;
pub mod source;
pub mod stream;
pub mod words;

pub use engine::{EngineConfig, MedianEngine};
pub use error::{Error, Result};
pub use source::{unique_token_count, UniqueTokenCounts};
pub use stream::{
    append_streaming_medians, write_streaming_medians, write_streaming_values,
    write_word_frequencies, RunningMedian, RunningMedianExt,
};
pub use words::{WordFrequencies, DEFAULT_COLUMN_WIDTH};
