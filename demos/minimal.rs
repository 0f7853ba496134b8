//! A basic example showing minimal usage
//!
//! We construct a [`MedianEngine`], feed it observations, and read out the median after each one

use heapmedian::MedianEngine;

/// Some sample observations, e.g. unique word counts of successive lines
///
/// In practice, this will probably be a much larger stream
const DATA: [u64; 8] = [4, 3, 1, 7, 7, 2, 9, 5];

fn main() {
    // The default engine never compacts, so every median is exact
    let mut engine = MedianEngine::default();

    for observation in DATA {
        let median = engine.push(observation);
        println!("Observed {observation}, median is now {median:?}");
    }
}
