//! Drivers connecting observation sources, the engine, and output sinks

use std::{
    fs::{File, OpenOptions},
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::{
    engine::{EngineConfig, MedianEngine},
    source::UniqueTokenCounts,
    words::WordFrequencies,
    Result,
};

/// Iterator adaptor yielding the running median after each observation
///
/// Created by [`RunningMedianExt::running_median`] or [`RunningMedian::new`].
/// Exactly one median is produced per observation, in order, and the source is only pulled
/// when the next median is requested.
#[derive(Debug, Clone)]
pub struct RunningMedian<I> {
    source: I,
    engine: MedianEngine,
}

impl<I> RunningMedian<I> {
    /// Wraps a source of observations with a fresh engine
    pub fn new(source: I, config: EngineConfig) -> Self {
        Self {
            source,
            engine: MedianEngine::new(config),
        }
    }

    /// The engine state after the observations pulled so far
    pub fn engine(&self) -> &MedianEngine {
        &self.engine
    }

    /// Stops streaming and hands back the engine
    pub fn into_engine(self) -> MedianEngine {
        self.engine
    }
}

impl<I: Iterator<Item = u64>> Iterator for RunningMedian<I> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let value = self.source.next()?;
        Some(self.engine.push(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.size_hint()
    }
}

impl<I: ExactSizeIterator<Item = u64>> ExactSizeIterator for RunningMedian<I> {}

/// Adds [`running_median`](Self::running_median) to every iterator of observations
pub trait RunningMedianExt: Iterator<Item = u64> + Sized {
    /// Maps each observation to the median of all observations up to and including it
    fn running_median(self, config: EngineConfig) -> RunningMedian<Self> {
        RunningMedian::new(self, config)
    }
}

impl<I: Iterator<Item = u64>> RunningMedianExt for I {}

/// Writes a single median (or any other value) as its own line
///
/// Integral values keep a trailing `.0`, so medians always read as `4.0` or `3.5`.
fn write_value<W: Write>(writer: &mut W, value: f64) -> std::io::Result<()> {
    writeln!(writer, "{value:?}")
}

/// Writes each value on its own line, returning how many were written
pub fn write_streaming_values<W, I>(mut writer: W, values: I) -> Result<u64>
where
    W: Write,
    I: IntoIterator<Item = f64>,
{
    let mut written = 0;
    for value in values {
        write_value(&mut writer, value)?;
        written += 1;
    }
    writer.flush()?;

    Ok(written)
}

/// Streams the running median of per-line unique token counts from `reader` into `writer`
///
/// One median line is written per input line. Returns the number of lines processed.
/// Stops at the first read or write failure.
pub fn write_streaming_medians<R, W>(reader: R, mut writer: W, config: EngineConfig) -> Result<u64>
where
    R: BufRead,
    W: Write,
{
    let mut engine = MedianEngine::new(config);

    for count in UniqueTokenCounts::new(reader) {
        let median = engine.push(count?);
        write_value(&mut writer, median)?;
    }
    writer.flush()?;

    #[cfg(feature = "log")]
    log::info!(
        "Processed {} lines ({} compactions, {} observations buffered)",
        engine.count(),
        engine.compactions(),
        engine.len()
    );

    Ok(engine.count())
}

/// Appends the running median of each line of the `input` file to the `output` file
///
/// The output file is created if missing. Existing contents are kept.
pub fn append_streaming_medians(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: EngineConfig,
) -> Result<u64> {
    let (input, output) = (input.as_ref(), output.as_ref());

    #[cfg(feature = "log")]
    log::info!(
        "Appending medians from {} to {}",
        input.display(),
        output.display()
    );

    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(OpenOptions::new().create(true).append(true).open(output)?);

    write_streaming_medians(reader, writer, config)
}

/// Writes the sorted word frequency table of the `input` file to the `output` file
///
/// The output file is truncated first. Returns the number of distinct words written.
pub fn write_word_frequencies(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    column_width: usize,
) -> Result<usize> {
    let (input, output) = (input.as_ref(), output.as_ref());

    #[cfg(feature = "log")]
    log::info!(
        "Writing word frequencies from {} to {}",
        input.display(),
        output.display()
    );

    let freq = WordFrequencies::from_reader(BufReader::new(File::open(input)?))?;
    freq.write_sorted(BufWriter::new(File::create(output)?), column_width)?;

    Ok(freq.len())
}
