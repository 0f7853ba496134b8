//! A more fully-fledged example, showcasing compaction and the streaming drivers
//!
//! Run with `RUST_LOG=debug` to see compactions as they happen.

use std::io::{self, Cursor};

use heapmedian::{write_streaming_medians, EngineConfig, MedianEngine, RunningMedianExt};

const TWEETS: &str = "pop tarts i like pop tarts pop pop tarts
flintstones vitamins primeday flintstones vitamins primeday
deal deal deal deal
the quick brown fox jumps over the lazy dog
hello hello world
";

fn main() -> heapmedian::Result<()> {
    env_logger::init();

    // Collapse both heaps every 4 observations
    // Memory stays bounded, at the cost of exactness after the first collapse
    let config = EngineConfig::new().with_batch_size(4)?;
    let mut engine = MedianEngine::new(config);

    for observation in [10, 20, 30, 40, 5, 5, 5, 5, 50] {
        let median = engine.push(observation);
        println!(
            "Observed {observation:>2}: median {median:>5?}, {} buffered, {} compactions",
            engine.len(),
            engine.compactions()
        );
    }

    // The same engine as an iterator adaptor, with compaction turned off
    let exact: Vec<f64> = [10u64, 20, 30, 40, 5, 5, 5, 5, 50]
        .into_iter()
        .running_median(config.without_compaction())
        .collect();
    println!("Exact medians: {exact:?}");

    // And driven straight from lines of text
    println!("Medians of unique words per tweet:");
    let lines = write_streaming_medians(Cursor::new(TWEETS), io::stdout().lock(), EngineConfig::default())?;
    println!("Processed {lines} tweets");

    Ok(())
}
