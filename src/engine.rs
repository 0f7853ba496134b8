//! The dual-heap running median engine
//!
//! Observations are split across two heaps: a max-ordered "low" heap holding everything at or
//! below the median, and a min-ordered "high" heap holding everything at or above it.
//! The low heap always holds as many elements as the high heap, or exactly one more,
//! so the median can always be read off the two roots.

use std::{cmp::Reverse, collections::BinaryHeap, num::NonZeroU64};

use crate::{Error, Result};

/// Configuration for a [`MedianEngine`]
///
/// The only knob is the compaction batch size. The default configuration disables compaction,
/// which keeps every observation buffered and makes every median exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Collapse both heaps to their roots every this many observations
    batch_size: Option<NonZeroU64>,
}

impl EngineConfig {
    /// Configuration with compaction disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables compaction every `batch_size` observations
    ///
    /// A batch size of zero is rejected with [`Error::InvalidBatchSize`].
    pub fn with_batch_size(mut self, batch_size: u64) -> Result<Self> {
        match NonZeroU64::new(batch_size) {
            Some(batch_size) => {
                self.batch_size = Some(batch_size);
                Ok(self)
            }
            None => {
                #[cfg(feature = "log")]
                log::warn!("Rejected compaction batch size of zero");

                Err(Error::InvalidBatchSize(batch_size))
            }
        }
    }

    /// Disables compaction, letting the heaps grow with the stream
    pub fn without_compaction(mut self) -> Self {
        self.batch_size = None;
        self
    }

    /// The configured compaction batch size, if compaction is enabled
    pub fn batch_size(&self) -> Option<NonZeroU64> {
        self.batch_size
    }
}

/// Running median state for a stream of non-negative integer observations
///
/// Feed observations in arrival order with [`Self::push`], which returns the median of
/// everything pushed so far. Each push costs `O(log n)` in the number of buffered observations.
///
/// When a compaction batch size is configured, both heaps are collapsed to their roots every
/// `batch_size` observations. This bounds memory on unbounded streams, but medians reported after
/// the first compaction are an approximation: later observations are only compared against the
/// retained roots, not the discarded history.
#[derive(Debug, Clone, Default)]
pub struct MedianEngine {
    config: EngineConfig,

    /// Observations at or below the median, max at the root
    low: BinaryHeap<u64>,
    /// Observations at or above the median, min at the root
    high: BinaryHeap<Reverse<u64>>,

    /// Number of observations currently held in [`Self::low`]
    low_count: usize,
    /// Number of observations currently held in [`Self::high`]
    high_count: usize,

    /// Total observations accepted since the engine was created
    count: u64,
    /// Observations accepted since the last compaction (or since creation)
    since_compaction: u64,
    /// Number of compactions performed so far
    compactions: u64,
}

impl MedianEngine {
    /// Constructs an empty engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Constructs an empty engine that compacts every `batch_size` observations
    pub fn with_batch_size(batch_size: u64) -> Result<Self> {
        Ok(Self::new(EngineConfig::new().with_batch_size(batch_size)?))
    }

    /// The configuration this engine was built with
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Total number of observations pushed so far, including any discarded by compaction
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of observations currently buffered across both heaps
    pub fn len(&self) -> usize {
        self.low_count + self.high_count
    }

    /// Whether no observation has been pushed yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of observations held by the low (max-ordered) heap
    pub fn low_count(&self) -> usize {
        self.low_count
    }

    /// Number of observations held by the high (min-ordered) heap
    pub fn high_count(&self) -> usize {
        self.high_count
    }

    /// Largest observation at or below the median
    pub fn low_root(&self) -> Option<u64> {
        self.low.peek().copied()
    }

    /// Smallest observation at or above the median
    pub fn high_root(&self) -> Option<u64> {
        self.high.peek().map(|Reverse(v)| *v)
    }

    /// Number of compactions performed so far
    pub fn compactions(&self) -> u64 {
        self.compactions
    }

    /// Observations accepted since the last compaction
    pub fn since_compaction(&self) -> u64 {
        self.since_compaction
    }

    /// Processes the next observation in the stream and returns the updated median
    ///
    /// Values equal to the current low root are always placed in the low heap.
    pub fn push(&mut self, value: u64) -> f64 {
        // Placement
        match self.low_root() {
            Some(low_root) if value > low_root => {
                self.high.push(Reverse(value));
                self.high_count += 1;
            }
            _ => {
                self.low.push(value);
                self.low_count += 1;
            }
        }

        // Rebalance. Placement moved the counts by one, so at most one move is needed
        if self.low_count < self.high_count {
            if let Some(Reverse(root)) = self.high.pop() {
                self.low.push(root);
                self.low_count += 1;
                self.high_count -= 1;
            }
        } else if self.low_count > self.high_count + 1 {
            if let Some(root) = self.low.pop() {
                self.high.push(Reverse(root));
                self.low_count -= 1;
                self.high_count += 1;
            }
        }

        self.count += 1;
        self.since_compaction += 1;
        self.debug_check_invariants();

        let median = self.median();
        debug_assert!(median.is_some(), "median missing after a push");

        self.maybe_compact();

        median.unwrap_or_default()
    }

    /// Gets the median of the observations buffered so far
    ///
    /// Returns [`None`] if nothing has been pushed yet.
    pub fn median(&self) -> Option<f64> {
        let low = *self.low.peek()?;

        if self.len() % 2 == 0 {
            let Reverse(high) = *self.high.peek()?;
            Some((low as f64 + high as f64) / 2.)
        } else {
            Some(low as f64)
        }
    }

    /// Gets the median, or zero if nothing has been pushed yet
    pub fn median_or_default(&self) -> f64 {
        self.median().unwrap_or_default()
    }

    /// Drops every observation and counter, keeping the configuration
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Compacts the heaps if a batch size is configured and the stream just hit a multiple of it
    fn maybe_compact(&mut self) {
        let Some(batch_size) = self.config.batch_size else {
            return;
        };

        if self.count % batch_size.get() == 0 {
            self.compact();
        }
    }

    /// Collapses both heaps down to their roots
    ///
    /// With an even number of buffered observations, both roots are kept and the engine behaves as
    /// if it had seen exactly those two values. With an odd number, only the low root (which is
    /// the median) is kept, as if the engine had seen that single value. Either way the counts
    /// match the heaps afterwards and the median is unchanged by the collapse itself.
    fn compact(&mut self) {
        let buffered = self.len();
        let low_root = self.low_root();
        let high_root = self.high_root().filter(|_| buffered % 2 == 0);

        // Rebuild instead of clearing so the old allocations are released
        self.low = low_root.into_iter().collect();
        self.high = high_root.into_iter().map(Reverse).collect();
        self.low_count = self.low.len();
        self.high_count = self.high.len();

        self.since_compaction = 0;
        self.compactions += 1;

        #[cfg(feature = "log")]
        log::debug!(
            "Compacted {} buffered observations down to {} after {} total (low root: {:?}, high root: {:?})",
            buffered,
            self.len(),
            self.count,
            low_root,
            high_root,
        );

        self.debug_check_invariants();
    }

    /// Asserts the balance and root ordering invariants in debug builds
    fn debug_check_invariants(&self) {
        debug_assert_eq!(self.low.len(), self.low_count, "low count out of sync");
        debug_assert_eq!(self.high.len(), self.high_count, "high count out of sync");
        debug_assert!(
            self.low_count == self.high_count || self.low_count == self.high_count + 1,
            "heaps out of balance: low={}, high={}",
            self.low_count,
            self.high_count
        );

        if let (Some(low), Some(high)) = (self.low_root(), self.high_root()) {
            debug_assert!(low <= high, "low root {low} above high root {high}");
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn medians(engine: &mut MedianEngine, data: &[u64]) -> Vec<f64> {
        data.iter().map(|v| engine.push(*v)).collect()
    }

    /// Textbook median of a slice, by sorting a copy
    fn exact_median(data: &[u64]) -> f64 {
        let mut sorted = data.to_vec();
        sorted.sort_unstable();

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.
        } else {
            sorted[mid] as f64
        }
    }

    fn assert_invariants(engine: &MedianEngine) {
        let (low, high) = (engine.low_count(), engine.high_count());
        assert!(low == high || low == high + 1, "low={low}, high={high}");

        if let (Some(l), Some(h)) = (engine.low_root(), engine.high_root()) {
            assert!(l <= h, "low root {l} above high root {h}");
        }
    }

    #[test]
    fn no_data() {
        let engine = MedianEngine::default();
        assert_eq!(engine.median(), None);
        assert_eq!(engine.median_or_default(), 0.);
        assert_eq!(engine.count(), 0);
        assert!(engine.is_empty());
    }

    #[test]
    fn one_data() {
        let mut engine = MedianEngine::default();

        assert_eq!(engine.push(5), 5.);
        assert_eq!(engine.count(), 1);
        assert_eq!(engine.low_count(), 1);
        assert_eq!(engine.high_count(), 0);
        assert_eq!(engine.high_root(), None);
    }

    #[test]
    fn unique_word_scenario() {
        let mut engine = MedianEngine::default();
        assert_eq!(
            medians(&mut engine, &[4, 2, 4, 1, 4]),
            vec![4., 3., 4., 3., 4.]
        );
    }

    #[test]
    fn half_integer_scenario() {
        let mut engine = MedianEngine::default();
        assert_eq!(medians(&mut engine, &[4, 3, 3, 1]), vec![4., 3.5, 3., 3.]);
    }

    #[test]
    fn tie_goes_to_low_heap() {
        let mut engine = MedianEngine::default();
        engine.push(7);
        engine.push(7);

        // Second 7 lands in low, then gets rebalanced across
        assert_eq!(engine.low_root(), Some(7));
        assert_eq!(engine.high_root(), Some(7));
        assert_eq!(engine.push(7), 7.);
        assert_eq!(engine.low_count(), 2);
        assert_eq!(engine.high_count(), 1);
    }

    #[test]
    fn large_values_do_not_overflow() {
        let mut engine = MedianEngine::default();
        engine.push(u64::MAX);
        let median = engine.push(u64::MAX);

        assert_eq!(median, u64::MAX as f64);
    }

    #[test]
    fn zero_batch_size_rejected() {
        assert!(matches!(
            EngineConfig::new().with_batch_size(0),
            Err(Error::InvalidBatchSize(0))
        ));
        assert!(MedianEngine::with_batch_size(0).is_err());
    }

    #[test]
    fn config_round_trip() {
        let config = EngineConfig::new().with_batch_size(8).unwrap();
        assert_eq!(config.batch_size().map(NonZeroU64::get), Some(8));
        assert_eq!(config.without_compaction().batch_size(), None);
        assert_eq!(EngineConfig::default().batch_size(), None);
    }

    #[test]
    fn compaction_even_keeps_both_roots() {
        let mut engine = MedianEngine::with_batch_size(4).unwrap();
        assert_eq!(medians(&mut engine, &[1, 2, 3, 4]), vec![1., 1.5, 2., 2.5]);

        assert_eq!(engine.compactions(), 1);
        assert_eq!(engine.since_compaction(), 0);
        assert_eq!(engine.len(), 2);
        assert_eq!(engine.low_root(), Some(2));
        assert_eq!(engine.high_root(), Some(3));
        assert_eq!(engine.median(), Some(2.5));
        assert_eq!(engine.count(), 4);
    }

    #[test]
    fn compaction_odd_keeps_low_root() {
        let mut engine = MedianEngine::with_batch_size(3).unwrap();
        assert_eq!(medians(&mut engine, &[5, 1, 9]), vec![5., 3., 5.]);

        assert_eq!(engine.len(), 1);
        assert_eq!(engine.low_count(), 1);
        assert_eq!(engine.high_count(), 0);
        assert_eq!(engine.median(), Some(5.));

        assert_eq!(medians(&mut engine, &[7, 0]), vec![6., 5.]);
        assert_eq!(engine.since_compaction(), 2);
    }

    #[test]
    fn compaction_only_at_batch_multiples() {
        let mut engine = MedianEngine::with_batch_size(5).unwrap();

        for v in 0..4 {
            engine.push(v);
            assert_eq!(engine.compactions(), 0);
        }
        engine.push(4);
        assert_eq!(engine.compactions(), 1);

        for v in 0..4 {
            engine.push(v);
            assert_eq!(engine.compactions(), 1);
        }
        engine.push(4);
        assert_eq!(engine.compactions(), 2);
    }

    #[test]
    fn compaction_approximates_after_first_collapse() {
        let data = [1, 2, 3, 4, 0, 0];

        let mut exact = MedianEngine::default();
        let mut compacted = MedianEngine::with_batch_size(2).unwrap();

        assert_eq!(medians(&mut exact, &data), vec![1., 1.5, 2., 2.5, 2., 1.5]);
        assert_eq!(
            medians(&mut compacted, &data),
            vec![1., 1.5, 2., 2.5, 2., 1.]
        );
        assert_eq!(compacted.compactions(), 3);
        assert_eq!(compacted.len(), 2);
    }

    #[test]
    fn compaction_every_observation() {
        let mut engine = MedianEngine::with_batch_size(1).unwrap();

        for v in [3, 9, 1, 4, 4, 8] {
            engine.push(v);
            assert!(engine.len() <= 2);
            assert_invariants(&engine);
        }
        assert_eq!(engine.compactions(), 6);
        assert_eq!(engine.count(), 6);
    }

    #[test]
    fn reset_keeps_config() {
        let mut engine = MedianEngine::with_batch_size(2).unwrap();
        medians(&mut engine, &[1, 2, 3]);
        engine.reset();

        assert!(engine.is_empty());
        assert_eq!(engine.count(), 0);
        assert_eq!(engine.compactions(), 0);
        assert_eq!(engine.config().batch_size().map(NonZeroU64::get), Some(2));
    }

    proptest! {
        #[test]
        fn invariants_hold_after_every_push(
            data in prop::collection::vec(0u64..1_000, 1..200),
            batch_size in prop::option::of(1u64..50),
        ) {
            let config = match batch_size {
                Some(b) => EngineConfig::new().with_batch_size(b).unwrap(),
                None => EngineConfig::new(),
            };
            let mut engine = MedianEngine::new(config);

            for v in data {
                engine.push(v);
                assert_invariants(&engine);
            }
        }

        #[test]
        fn exact_without_compaction(data in prop::collection::vec(0u64..1_000, 1..200)) {
            let mut engine = MedianEngine::default();

            for i in 0..data.len() {
                let median = engine.push(data[i]);
                prop_assert_eq!(median, exact_median(&data[..=i]));
            }
        }

        #[test]
        fn replay_is_deterministic(
            data in prop::collection::vec(0u64..100, 1..200),
            batch_size in 1u64..20,
        ) {
            let mut first = MedianEngine::with_batch_size(batch_size).unwrap();
            let mut second = MedianEngine::with_batch_size(batch_size).unwrap();

            prop_assert_eq!(medians(&mut first, &data), medians(&mut second, &data));
        }

        #[test]
        fn first_batch_matches_uncompacted(
            data in prop::collection::vec(0u64..1_000, 1..200),
            batch_size in 1u64..50,
        ) {
            let mut exact = MedianEngine::default();
            let mut compacted = MedianEngine::with_batch_size(batch_size).unwrap();

            let exact = medians(&mut exact, &data);
            let compacted = medians(&mut compacted, &data);
            let boundary = (batch_size as usize).min(data.len());

            prop_assert_eq!(&exact[..boundary], &compacted[..boundary]);
        }

        #[test]
        fn buffered_memory_is_bounded(
            data in prop::collection::vec(0u64..1_000, 1..300),
            batch_size in 1u64..20,
        ) {
            let mut engine = MedianEngine::with_batch_size(batch_size).unwrap();

            for v in data {
                engine.push(v);
                prop_assert!(engine.len() as u64 <= batch_size + 2);
            }
        }
    }
}
