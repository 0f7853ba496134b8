//! Word frequency table over a text stream

use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
};

use crate::Result;

/// Column width used by [`WordFrequencies::write_sorted`] when none is given
pub const DEFAULT_COLUMN_WIDTH: usize = 28;

/// Occurrence count for every whitespace-separated token seen
///
/// Entries are kept sorted by word (byte order, which for UTF-8 is code point order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFrequencies {
    counts: BTreeMap<String, u64>,
}

impl WordFrequencies {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from every line of a reader
    ///
    /// Lines are read one at a time. Invalid UTF-8 is replaced rather than rejected.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut freq = Self::new();
        let mut buf = Vec::new();
        let mut lines = 0u64;

        while reader.read_until(b'\n', &mut buf)? > 0 {
            freq.insert_line(&String::from_utf8_lossy(&buf));
            buf.clear();
            lines += 1;
        }

        #[cfg(feature = "log")]
        log::info!(
            "Counted {} distinct words across {} lines",
            freq.len(),
            lines
        );
        #[cfg(not(feature = "log"))]
        let _ = lines;

        Ok(freq)
    }

    /// Counts every token in a line
    pub fn insert_line(&mut self, line: &str) {
        for word in line.split_whitespace() {
            // Only allocate the first time a word shows up
            match self.counts.get_mut(word) {
                Some(count) => *count += 1,
                None => {
                    self.counts.insert(word.to_owned(), 1);
                }
            }
        }
    }

    /// How many times a word has been seen
    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no word has been seen
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of tokens seen, duplicates included
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Words and their counts, sorted by word
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(word, count)| (word.as_str(), *count))
    }

    /// Writes one `word count` line per entry, sorted by word
    ///
    /// Each word is left-justified to `column_width` characters. Words longer than that are
    /// written in full, directly followed by the count.
    pub fn write_sorted<W: Write>(&self, mut writer: W, column_width: usize) -> Result<()> {
        for (word, count) in self.iter() {
            writeln!(writer, "{word:<column_width$}{count}")?;
        }
        writer.flush()?;

        Ok(())
    }
}

impl<'a> Extend<&'a str> for WordFrequencies {
    /// Counts each item as a line of text
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, lines: T) {
        for line in lines {
            self.insert_line(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs::File, io::BufReader};

    use super::*;

    const EXPECTED_TABLE: &str = "deal                        4
flintstones                 2
i                           1
like                        1
pop                         4
primeday                    2
tarts                       3
vitamins                    2
";

    fn load_test_data() -> WordFrequencies {
        let f = BufReader::new(File::open("./test_data/tweets_test.txt").unwrap());
        WordFrequencies::from_reader(f).unwrap()
    }

    #[test]
    fn counts_test_data() {
        let freq = load_test_data();

        let expected = [
            ("deal", 4),
            ("flintstones", 2),
            ("i", 1),
            ("like", 1),
            ("pop", 4),
            ("primeday", 2),
            ("tarts", 3),
            ("vitamins", 2),
        ];
        assert_eq!(freq.iter().collect::<Vec<_>>(), expected);
        assert_eq!(freq.len(), 8);
        assert_eq!(freq.total(), 19);
    }

    #[test]
    fn writes_sorted_table() {
        let mut out = Vec::new();
        load_test_data()
            .write_sorted(&mut out, DEFAULT_COLUMN_WIDTH)
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), EXPECTED_TABLE);
    }

    #[test]
    fn long_words_are_not_truncated() {
        let mut freq = WordFrequencies::new();
        freq.insert_line("supercalifragilistic x");

        let mut out = Vec::new();
        freq.write_sorted(&mut out, 4).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "supercalifragilistic1\nx   1\n"
        );
    }

    #[test]
    fn unseen_word_is_zero() {
        let freq = load_test_data();
        assert_eq!(freq.get("pop"), 4);
        assert_eq!(freq.get("tart"), 0);
    }

    #[test]
    fn extend_by_lines() {
        let mut freq = WordFrequencies::new();
        freq.extend(["b a", "a"]);

        assert_eq!(freq.iter().collect::<Vec<_>>(), vec![("a", 2), ("b", 1)]);
    }

    #[test]
    fn no_data() {
        let freq = WordFrequencies::from_reader(&b""[..]).unwrap();
        assert!(freq.is_empty());
        assert_eq!(freq.total(), 0);

        let mut out = Vec::new();
        freq.write_sorted(&mut out, DEFAULT_COLUMN_WIDTH).unwrap();
        assert!(out.is_empty());
    }
}
