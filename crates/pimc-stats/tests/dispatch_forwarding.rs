use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pimc_core::PimcError;
use pimc_stats::{
    AccRejEstimator, AccumulatorRef, ArrayEstimator, EstimatorInfo, EstimatorRef,
    PartitionedScalarAccumulator, ReportWriter, ReportWriters, ScalarAccumulator, ScalarEstimator,
    SimpleScalarAccumulator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Scalar,
    Array,
    AccRej,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Call {
    slot: Slot,
    phase: Phase,
    estimator: usize,
    accumulator: usize,
}

fn address<T: ?Sized>(value: &T) -> usize {
    value as *const T as *const () as usize
}

type CallLog = Rc<RefCell<Vec<Call>>>;

struct Recorder {
    slot: Slot,
    calls: CallLog,
    drops: Rc<Cell<usize>>,
}

impl<E: ?Sized, A: ?Sized> ReportWriter<E, A> for Recorder {
    fn start_report(&mut self, estimator: &E, accumulator: &A) -> Result<(), PimcError> {
        self.calls.borrow_mut().push(Call {
            slot: self.slot,
            phase: Phase::Start,
            estimator: address(estimator),
            accumulator: address(accumulator),
        });
        Ok(())
    }

    fn report_step(&mut self, estimator: &E, accumulator: &A) -> Result<(), PimcError> {
        self.calls.borrow_mut().push(Call {
            slot: self.slot,
            phase: Phase::Step,
            estimator: address(estimator),
            accumulator: address(accumulator),
        });
        Ok(())
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

struct Harness {
    writers: ReportWriters,
    calls: CallLog,
    drops: [Rc<Cell<usize>>; 3],
}

fn harness() -> Harness {
    let calls: CallLog = Rc::default();
    let drops: [Rc<Cell<usize>>; 3] = Default::default();
    let recorder = |slot, drops: &Rc<Cell<usize>>| Recorder {
        slot,
        calls: calls.clone(),
        drops: drops.clone(),
    };
    let writers = ReportWriters::new(
        Box::new(recorder(Slot::Scalar, &drops[0])),
        Box::new(recorder(Slot::Array, &drops[1])),
        Box::new(recorder(Slot::AccRej, &drops[2])),
    );
    Harness {
        writers,
        calls,
        drops,
    }
}

fn scalar() -> ScalarEstimator {
    ScalarEstimator::new(EstimatorInfo::new("energy", "scalar-energy", "Ha"))
}

fn array() -> ArrayEstimator {
    ArrayEstimator::new(EstimatorInfo::new("density", "array-density", "a0^-3"), vec![2, 3])
}

fn acc_rej() -> AccRejEstimator {
    AccRejEstimator::new("bisection", vec!["level 0".into(), "level 1".into()])
}

#[test]
fn scalar_start_forwards_once_to_scalar_writer() {
    let mut h = harness();
    let est = scalar();
    let acc = SimpleScalarAccumulator::new();
    h.writers.start_scalar_report(&est, &acc).unwrap();
    assert_eq!(
        *h.calls.borrow(),
        vec![Call {
            slot: Slot::Scalar,
            phase: Phase::Start,
            estimator: address(&est),
            accumulator: address(&acc),
        }]
    );
}

#[test]
fn scalar_step_forwards_once_to_scalar_writer() {
    let mut h = harness();
    let est = scalar();
    let acc = SimpleScalarAccumulator::new();
    h.writers.report_scalar_step(&est, &acc).unwrap();
    let calls = h.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].slot, Slot::Scalar);
    assert_eq!(calls[0].phase, Phase::Step);
    assert_eq!(calls[0].estimator, address(&est));
    assert_eq!(calls[0].accumulator, address(&acc));
}

#[test]
fn partitioned_scalar_pairing_is_a_silent_no_op() {
    let mut h = harness();
    let est = scalar();
    let acc = PartitionedScalarAccumulator::new(4).unwrap();
    h.writers.start_partitioned_scalar_report(&est, &acc).unwrap();
    h.writers.report_partitioned_scalar_step(&est, &acc).unwrap();
    h.writers
        .start_report(EstimatorRef::Scalar(&est), AccumulatorRef::Partitioned(&acc))
        .unwrap();
    h.writers
        .report_step(EstimatorRef::Scalar(&est), AccumulatorRef::Partitioned(&acc))
        .unwrap();
    assert!(h.calls.borrow().is_empty());
    assert!(!ReportWriters::supports(est.kind(), acc.kind()));
}

#[test]
fn acc_rej_accepts_any_accumulator_kind() {
    let mut h = harness();
    let est = acc_rej();
    let simple = SimpleScalarAccumulator::new();
    let partitioned = PartitionedScalarAccumulator::new(2).unwrap();
    h.writers.start_acc_rej_report(&est, &simple).unwrap();
    h.writers.report_acc_rej_step(&est, &partitioned).unwrap();

    let calls = h.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|call| call.slot == Slot::AccRej));
    assert_eq!(calls[0].phase, Phase::Start);
    assert_eq!(calls[0].accumulator, address(&simple));
    assert_eq!(calls[1].phase, Phase::Step);
    assert_eq!(calls[1].accumulator, address(&partitioned));
    assert!(calls.iter().all(|call| call.estimator == address(&est)));
}

#[test]
fn array_accepts_any_accumulator_kind() {
    let mut h = harness();
    let est = array();
    let simple = SimpleScalarAccumulator::new();
    let partitioned = PartitionedScalarAccumulator::new(3).unwrap();
    h.writers.start_array_report(&est, &partitioned).unwrap();
    h.writers.report_array_step(&est, &simple).unwrap();

    let calls = h.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|call| call.slot == Slot::Array));
    assert_eq!(calls[0].accumulator, address(&partitioned));
    assert_eq!(calls[1].accumulator, address(&simple));
}

#[test]
fn kind_routed_entry_points_match_typed_ones() {
    let mut h = harness();
    let s = scalar();
    let a = array();
    let r = acc_rej();
    let simple = SimpleScalarAccumulator::new();
    let partitioned = PartitionedScalarAccumulator::new(2).unwrap();

    h.writers
        .start_report(EstimatorRef::Scalar(&s), AccumulatorRef::Simple(&simple))
        .unwrap();
    h.writers
        .report_step(EstimatorRef::Array(&a), AccumulatorRef::Partitioned(&partitioned))
        .unwrap();
    h.writers
        .report_step(EstimatorRef::AccRej(&r), AccumulatorRef::Simple(&simple))
        .unwrap();

    let slots: Vec<(Slot, Phase)> = h.calls.borrow().iter().map(|c| (c.slot, c.phase)).collect();
    assert_eq!(
        slots,
        vec![
            (Slot::Scalar, Phase::Start),
            (Slot::Array, Phase::Step),
            (Slot::AccRej, Phase::Step),
        ]
    );
    assert_eq!(h.calls.borrow()[1].accumulator, address(&partitioned));
}

#[test]
fn writers_do_not_see_other_slots() {
    let mut h = harness();
    let est = scalar();
    let acc = SimpleScalarAccumulator::new();
    for _ in 0..3 {
        h.writers.report_scalar_step(&est, &acc).unwrap();
    }
    assert!(h.calls.borrow().iter().all(|call| call.slot == Slot::Scalar));
    assert_eq!(h.calls.borrow().len(), 3);
}

#[test]
fn dropping_dispatcher_releases_each_writer_once() {
    let h = harness();
    let drops = h.drops.clone();
    assert!(drops.iter().all(|count| count.get() == 0));
    drop(h.writers);
    assert!(drops.iter().all(|count| count.get() == 1));
}

struct Failing;

impl ReportWriter<ScalarEstimator, SimpleScalarAccumulator> for Failing {
    fn start_report(
        &mut self,
        _: &ScalarEstimator,
        _: &SimpleScalarAccumulator,
    ) -> Result<(), PimcError> {
        Err(PimcError::io("report-write", "disk full"))
    }

    fn report_step(
        &mut self,
        _: &ScalarEstimator,
        _: &SimpleScalarAccumulator,
    ) -> Result<(), PimcError> {
        Ok(())
    }
}

#[test]
fn writer_errors_propagate_unchanged() {
    let h = harness();
    let Harness { calls, drops, .. } = h;
    let mut writers = ReportWriters::new(
        Box::new(Failing),
        Box::new(Recorder {
            slot: Slot::Array,
            calls: calls.clone(),
            drops: drops[1].clone(),
        }),
        Box::new(Recorder {
            slot: Slot::AccRej,
            calls,
            drops: drops[2].clone(),
        }),
    );
    let err = writers
        .start_scalar_report(&scalar(), &SimpleScalarAccumulator::new())
        .unwrap_err();
    assert_eq!(err.info().code, "report-write");
    assert_eq!(err.info().message, "disk full");
}
