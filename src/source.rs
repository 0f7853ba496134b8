//! Turning lines of text into observations
//!
//! Each line contributes one observation: the number of distinct whitespace-separated tokens on it.

use std::{collections::HashSet, io::BufRead};

use crate::Result;

/// Counts the distinct whitespace-separated tokens in a line
///
/// Blank lines count as zero.
pub fn unique_token_count(line: &str) -> u64 {
    line.split_whitespace().collect::<HashSet<_>>().len() as u64
}

/// Iterator over the unique token count of each line in a reader
///
/// Lines are read one at a time into a reused buffer, so arbitrarily large inputs can be streamed.
/// Invalid UTF-8 is replaced rather than rejected. Read failures are yielded as errors.
#[derive(Debug)]
pub struct UniqueTokenCounts<R> {
    reader: R,
    buf: Vec<u8>,
    lines: u64,
}

impl<R: BufRead> UniqueTokenCounts<R> {
    /// Wraps a buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            lines: 0,
        }
    }

    /// Number of lines read so far
    pub fn lines_read(&self) -> u64 {
        self.lines
    }
}

impl<R: BufRead> Iterator for UniqueTokenCounts<R> {
    type Item = Result<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();

        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.lines += 1;
                let line = String::from_utf8_lossy(&self.buf);

                #[cfg(feature = "log")]
                log::trace!("Line {}: {:?}", self.lines, line.trim_end());

                Some(Ok(unique_token_count(&line)))
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}
