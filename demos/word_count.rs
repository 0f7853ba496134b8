//! Building a word frequency table and printing it as a sorted, aligned listing

use std::io;

use heapmedian::{WordFrequencies, DEFAULT_COLUMN_WIDTH};

fn main() -> heapmedian::Result<()> {
    let mut freq = WordFrequencies::new();
    freq.extend([
        "pop tarts i like pop tarts pop pop tarts",
        "flintstones vitamins primeday flintstones vitamins primeday",
        "deal deal deal deal",
    ]);

    println!("{} distinct words out of {}", freq.len(), freq.total());
    freq.write_sorted(io::stdout().lock(), DEFAULT_COLUMN_WIDTH)
}
