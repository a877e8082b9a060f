use approx::assert_relative_eq;
use pimc_stats::{
    AccumulatorKind, PartitionedScalarAccumulator, RunningStats, ScalarAccumulator,
    SimpleScalarAccumulator,
};
use proptest::prelude::*;

#[test]
fn pending_value_sums_slices_into_one_sample() {
    let mut acc = SimpleScalarAccumulator::new();
    for slice in [0.5, 0.25, 0.25] {
        acc.add_to_value(slice);
    }
    acc.store_value(7);
    assert_eq!(acc.sample_count(), 1);
    assert_relative_eq!(acc.average(), 1.0);
    assert_eq!(acc.last_step(), Some(7));
    assert_eq!(acc.standard_error(), 0.0);
}

#[test]
fn clear_value_discards_pending_sample() {
    let mut acc = SimpleScalarAccumulator::new();
    acc.add_to_value(100.0);
    acc.clear_value();
    acc.add_to_value(2.0);
    acc.store_value(0);
    assert_relative_eq!(acc.average(), 2.0);
}

#[test]
fn reset_clears_everything() {
    let mut acc = SimpleScalarAccumulator::new();
    acc.add_to_value(3.0);
    acc.store_value(0);
    acc.reset();
    assert_eq!(acc.sample_count(), 0);
    assert_eq!(acc.last_step(), None);
    assert_eq!(acc.kind(), AccumulatorKind::Simple);
}

#[test]
fn partitioned_bins_by_selected_partition() {
    let mut acc = PartitionedScalarAccumulator::new(2).unwrap();
    for (partition, value) in [(0, 1.0), (1, 5.0), (0, 3.0)] {
        acc.set_partition(partition).unwrap();
        acc.add_to_value(value);
        acc.store_value(0);
    }
    assert_eq!(acc.kind(), AccumulatorKind::Partitioned);
    assert_eq!(acc.partition_sample_count(0), Some(2));
    assert_eq!(acc.partition_sample_count(1), Some(1));
    assert_relative_eq!(acc.partition_average(0).unwrap(), 2.0);
    assert_relative_eq!(acc.partition_average(1).unwrap(), 5.0);
    assert_relative_eq!(acc.average(), 3.0);
    assert_relative_eq!(acc.variance(), 4.0);
    assert_eq!(acc.partition_average(2), None);
}

#[test]
fn partitioned_rejects_bad_arguments() {
    assert_eq!(
        PartitionedScalarAccumulator::new(0).unwrap_err().info().code,
        "partition-count"
    );
    let mut acc = PartitionedScalarAccumulator::new(3).unwrap();
    let err = acc.set_partition(3).unwrap_err();
    assert_eq!(err.info().code, "partition-range");
    assert_eq!(acc.partition(), 0);
}

proptest! {
    #[test]
    fn pooled_partitions_match_single_accumulator(
        samples in proptest::collection::vec((0usize..4, -50.0f64..50.0), 1..64)
    ) {
        let mut simple = SimpleScalarAccumulator::new();
        let mut partitioned = PartitionedScalarAccumulator::new(4).unwrap();
        for (step, (partition, value)) in samples.iter().enumerate() {
            simple.add_to_value(*value);
            simple.store_value(step as u64);
            partitioned.set_partition(*partition).unwrap();
            partitioned.add_to_value(*value);
            partitioned.store_value(step as u64);
        }
        prop_assert_eq!(simple.sample_count(), partitioned.sample_count());
        prop_assert!((simple.average() - partitioned.average()).abs() < 1e-9);
        prop_assert!((simple.variance() - partitioned.variance()).abs() < 1e-7);
    }

    #[test]
    fn running_variance_is_non_negative(samples in proptest::collection::vec(-1e6f64..1e6, 0..32)) {
        let mut stats = RunningStats::default();
        samples.iter().for_each(|&s| stats.push(s));
        prop_assert!(stats.variance() >= 0.0);
        prop_assert_eq!(stats.count(), samples.len() as u64);
    }
}
