use pimc_core::errors::ErrorInfo;
use pimc_core::PimcError;
use serde::{Deserialize, Serialize};

/// Tag identifying how an accumulator summarises samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccumulatorKind {
    /// One running mean and variance.
    Simple,
    /// Running statistics binned by partition index.
    Partitioned,
}

/// Running statistics for a scalar measurement.
///
/// The measurement pipeline calls [`add_to_value`](Self::add_to_value) one or
/// more times per step (e.g. once per time slice), then
/// [`store_value`](Self::store_value) to commit the step as one sample.
/// Report writers only use the read-only queries.
pub trait ScalarAccumulator {
    /// Summary kind tag.
    fn kind(&self) -> AccumulatorKind;

    /// Adds `value` to the pending sample of the current step.
    fn add_to_value(&mut self, value: f64);

    /// Commits the pending sample and clears it.
    fn store_value(&mut self, step: u64);

    /// Discards the pending sample without committing it.
    fn clear_value(&mut self);

    /// Number of committed samples.
    fn sample_count(&self) -> u64;

    /// Mean of the committed samples (0 when empty).
    fn average(&self) -> f64;

    /// Unbiased sample variance (0 with fewer than two samples).
    fn variance(&self) -> f64;

    /// Standard error of the mean, ignoring autocorrelation.
    fn standard_error(&self) -> f64 {
        let n = self.sample_count();
        if n < 2 {
            return 0.0;
        }
        (self.variance() / n as f64).sqrt()
    }

    /// Step index of the most recently committed sample.
    fn last_step(&self) -> Option<u64>;

    /// Drops all committed statistics, typically after a report.
    fn reset(&mut self);
}

/// Base-capability view used by writers that accept any accumulator kind.
pub type AnyScalarAccumulator = dyn ScalarAccumulator + 'static;

/// Welford running mean/variance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    /// Adds one sample.
    pub fn push(&mut self, sample: f64) {
        self.count += 1;
        let delta = sample - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (sample - self.mean);
    }

    /// Number of samples.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sample mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / (self.count - 1) as f64).max(0.0)
    }

    /// Merges another set of statistics into this one (Chan et al. update).
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        self.mean += delta * other.count as f64 / total as f64;
        let weight = self.count as f64 * other.count as f64 / total as f64;
        self.m2 += other.m2 + delta * delta * weight;
        self.count = total;
    }
}

/// Single running mean/variance over committed samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleScalarAccumulator {
    pending: f64,
    stats: RunningStats,
    last_step: Option<u64>,
}

impl SimpleScalarAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the committed statistics.
    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }
}

impl ScalarAccumulator for SimpleScalarAccumulator {
    fn kind(&self) -> AccumulatorKind {
        AccumulatorKind::Simple
    }

    fn add_to_value(&mut self, value: f64) {
        self.pending += value;
    }

    fn store_value(&mut self, step: u64) {
        self.stats.push(self.pending);
        self.pending = 0.0;
        self.last_step = Some(step);
    }

    fn clear_value(&mut self) {
        self.pending = 0.0;
    }

    fn sample_count(&self) -> u64 {
        self.stats.count()
    }

    fn average(&self) -> f64 {
        self.stats.mean()
    }

    fn variance(&self) -> f64 {
        self.stats.variance()
    }

    fn last_step(&self) -> Option<u64> {
        self.last_step
    }

    fn reset(&mut self) {
        self.stats = RunningStats::default();
        self.pending = 0.0;
        self.last_step = None;
    }
}

/// Running statistics binned by a partition index.
///
/// The caller selects the active partition (for example the permutation
/// sector of the current path) before committing a sample; each partition
/// keeps its own mean and variance while the base accumulator queries report
/// the pooled statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionedScalarAccumulator {
    pending: f64,
    partition: usize,
    bins: Vec<RunningStats>,
    last_step: Option<u64>,
}

impl PartitionedScalarAccumulator {
    /// Creates an accumulator with `partition_count` bins (at least one).
    pub fn new(partition_count: usize) -> Result<Self, PimcError> {
        if partition_count == 0 {
            return Err(PimcError::Report(
                ErrorInfo::new("partition-count", "partitioned accumulator needs at least one bin")
                    .with_hint("use SimpleScalarAccumulator for unpartitioned data"),
            ));
        }
        Ok(Self {
            pending: 0.0,
            partition: 0,
            bins: vec![RunningStats::default(); partition_count],
            last_step: None,
        })
    }

    /// Number of partition bins.
    pub fn partition_count(&self) -> usize {
        self.bins.len()
    }

    /// Currently selected partition.
    pub fn partition(&self) -> usize {
        self.partition
    }

    /// Selects the bin that the next committed sample goes to.
    pub fn set_partition(&mut self, partition: usize) -> Result<(), PimcError> {
        if partition >= self.bins.len() {
            return Err(PimcError::Report(
                ErrorInfo::new("partition-range", "partition index out of range")
                    .with_context("partition", partition.to_string())
                    .with_context("partition_count", self.bins.len().to_string()),
            ));
        }
        self.partition = partition;
        Ok(())
    }

    /// Statistics of one partition, `None` when out of range.
    pub fn partition_stats(&self, partition: usize) -> Option<&RunningStats> {
        self.bins.get(partition)
    }

    /// Mean of one partition, `None` when out of range.
    pub fn partition_average(&self, partition: usize) -> Option<f64> {
        self.bins.get(partition).map(RunningStats::mean)
    }

    /// Sample count of one partition, `None` when out of range.
    pub fn partition_sample_count(&self, partition: usize) -> Option<u64> {
        self.bins.get(partition).map(RunningStats::count)
    }

    fn pooled(&self) -> RunningStats {
        let mut pooled = RunningStats::default();
        for bin in &self.bins {
            pooled.merge(bin);
        }
        pooled
    }
}

impl ScalarAccumulator for PartitionedScalarAccumulator {
    fn kind(&self) -> AccumulatorKind {
        AccumulatorKind::Partitioned
    }

    fn add_to_value(&mut self, value: f64) {
        self.pending += value;
    }

    fn store_value(&mut self, step: u64) {
        self.bins[self.partition].push(self.pending);
        self.pending = 0.0;
        self.last_step = Some(step);
    }

    fn clear_value(&mut self) {
        self.pending = 0.0;
    }

    fn sample_count(&self) -> u64 {
        self.bins.iter().map(RunningStats::count).sum()
    }

    fn average(&self) -> f64 {
        self.pooled().mean()
    }

    fn variance(&self) -> f64 {
        self.pooled().variance()
    }

    fn last_step(&self) -> Option<u64> {
        self.last_step
    }

    fn reset(&mut self) {
        self.bins.iter_mut().for_each(|bin| *bin = RunningStats::default());
        self.pending = 0.0;
        self.last_step = None;
    }
}
