use pimc_core::PimcError;
use serde::{Deserialize, Serialize};

use crate::accumulator::{
    AccumulatorKind, AnyScalarAccumulator, PartitionedScalarAccumulator, SimpleScalarAccumulator,
};
use crate::estimator::{AccRejEstimator, ArrayEstimator, EstimatorKind, ScalarEstimator};

/// Output sink for one (estimator kind, accumulator kind) pairing.
///
/// A report is one call to [`start_report`](Self::start_report) followed by
/// any number of [`report_step`](Self::report_step) calls. `start_report`
/// must come first and resets whatever per-report state the writer keeps
/// (step counters, headers). Callers are responsible for the ordering; the
/// writers in this crate reject a step issued before any start.
pub trait ReportWriter<E: ?Sized, A: ?Sized> {
    /// Begins a new report for the estimator/accumulator pair.
    fn start_report(&mut self, estimator: &E, accumulator: &A) -> Result<(), PimcError>;

    /// Emits the accumulated statistics for one reporting step.
    fn report_step(&mut self, estimator: &E, accumulator: &A) -> Result<(), PimcError>;
}

/// Writer for scalar estimators summarised by a simple accumulator.
pub type ScalarReportWriter = Box<dyn ReportWriter<ScalarEstimator, SimpleScalarAccumulator>>;
/// Writer for array estimators normalised by any scalar accumulator.
pub type ArrayReportWriter = Box<dyn ReportWriter<ArrayEstimator, AnyScalarAccumulator>>;
/// Writer for acceptance/rejection estimators paired with any scalar accumulator.
pub type AccRejReportWriter = Box<dyn ReportWriter<AccRejEstimator, AnyScalarAccumulator>>;

/// Borrowed estimator of any kind.
#[derive(Debug, Clone, Copy)]
pub enum EstimatorRef<'a> {
    /// Scalar observable.
    Scalar(&'a ScalarEstimator),
    /// Array observable.
    Array(&'a ArrayEstimator),
    /// Move acceptance counters.
    AccRej(&'a AccRejEstimator),
}

impl EstimatorRef<'_> {
    /// Kind tag of the borrowed estimator.
    pub fn kind(&self) -> EstimatorKind {
        match self {
            EstimatorRef::Scalar(_) => EstimatorKind::Scalar,
            EstimatorRef::Array(_) => EstimatorKind::Array,
            EstimatorRef::AccRej(_) => EstimatorKind::AccRej,
        }
    }

    /// Name of the borrowed estimator.
    pub fn name(&self) -> &str {
        match self {
            EstimatorRef::Scalar(est) => &est.info().name,
            EstimatorRef::Array(est) => &est.info().name,
            EstimatorRef::AccRej(est) => &est.info().name,
        }
    }
}

/// Borrowed accumulator of any kind.
#[derive(Debug, Clone, Copy)]
pub enum AccumulatorRef<'a> {
    /// Single running mean/variance.
    Simple(&'a SimpleScalarAccumulator),
    /// Partition-binned statistics.
    Partitioned(&'a PartitionedScalarAccumulator),
}

impl<'a> AccumulatorRef<'a> {
    /// Kind tag of the borrowed accumulator.
    pub fn kind(&self) -> AccumulatorKind {
        match self {
            AccumulatorRef::Simple(_) => AccumulatorKind::Simple,
            AccumulatorRef::Partitioned(_) => AccumulatorKind::Partitioned,
        }
    }

    /// Views the accumulator through the base capability.
    pub fn as_base(&self) -> &'a AnyScalarAccumulator {
        match *self {
            AccumulatorRef::Simple(acc) => acc as &'a AnyScalarAccumulator,
            AccumulatorRef::Partitioned(acc) => acc as &'a AnyScalarAccumulator,
        }
    }
}

/// Registered writer slot a pairing resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    /// Scalar estimator with simple accumulator.
    Scalar,
    /// Array estimator with any accumulator.
    Array,
    /// Acceptance estimator with any accumulator.
    AccRej,
}

/// Resolves a pairing to its writer slot. `None` means the pairing has no
/// registered writer and is dropped without output.
pub fn route(estimator: EstimatorKind, accumulator: AccumulatorKind) -> Option<Route> {
    match (estimator, accumulator) {
        (EstimatorKind::Scalar, AccumulatorKind::Simple) => Some(Route::Scalar),
        // No writer understands partition bins yet.
        (EstimatorKind::Scalar, AccumulatorKind::Partitioned) => None,
        (EstimatorKind::Array, _) => Some(Route::Array),
        (EstimatorKind::AccRej, _) => Some(Route::AccRej),
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Start,
    Step,
}

/// Routes estimator/accumulator pairs to the writer that understands both.
///
/// The dispatcher exclusively owns one writer per supported pairing for its
/// whole lifetime; dropping it drops each writer once. It keeps no other
/// state, so report ordering is the writers' concern.
pub struct ReportWriters {
    scalar: ScalarReportWriter,
    array: ArrayReportWriter,
    acc_rej: AccRejReportWriter,
}

impl std::fmt::Debug for ReportWriters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportWriters").finish_non_exhaustive()
    }
}

impl ReportWriters {
    /// Takes ownership of the three writers.
    pub fn new(
        scalar: ScalarReportWriter,
        array: ArrayReportWriter,
        acc_rej: AccRejReportWriter,
    ) -> Self {
        Self {
            scalar,
            array,
            acc_rej,
        }
    }

    /// Returns true when the pairing has a registered writer.
    pub fn supports(estimator: EstimatorKind, accumulator: AccumulatorKind) -> bool {
        route(estimator, accumulator).is_some()
    }

    /// Starts a scalar report.
    pub fn start_scalar_report(
        &mut self,
        est: &ScalarEstimator,
        acc: &SimpleScalarAccumulator,
    ) -> Result<(), PimcError> {
        self.scalar.start_report(est, acc)
    }

    /// Reports one scalar step.
    pub fn report_scalar_step(
        &mut self,
        est: &ScalarEstimator,
        acc: &SimpleScalarAccumulator,
    ) -> Result<(), PimcError> {
        self.scalar.report_step(est, acc)
    }

    /// Accepted and ignored: no writer is registered for partitioned scalars.
    pub fn start_partitioned_scalar_report(
        &mut self,
        est: &ScalarEstimator,
        acc: &PartitionedScalarAccumulator,
    ) -> Result<(), PimcError> {
        tracing::trace!(
            estimator = %est.info().name,
            partitions = acc.partition_count(),
            "no writer for partitioned scalar report; dropped"
        );
        Ok(())
    }

    /// Accepted and ignored: no writer is registered for partitioned scalars.
    pub fn report_partitioned_scalar_step(
        &mut self,
        est: &ScalarEstimator,
        acc: &PartitionedScalarAccumulator,
    ) -> Result<(), PimcError> {
        tracing::trace!(
            estimator = %est.info().name,
            partitions = acc.partition_count(),
            "no writer for partitioned scalar step; dropped"
        );
        Ok(())
    }

    /// Starts an acceptance/rejection report.
    pub fn start_acc_rej_report(
        &mut self,
        est: &AccRejEstimator,
        acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        self.acc_rej.start_report(est, acc)
    }

    /// Reports one acceptance/rejection step.
    pub fn report_acc_rej_step(
        &mut self,
        est: &AccRejEstimator,
        acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        self.acc_rej.report_step(est, acc)
    }

    /// Starts an array report.
    pub fn start_array_report(
        &mut self,
        est: &ArrayEstimator,
        acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        self.array.start_report(est, acc)
    }

    /// Reports one array step.
    pub fn report_array_step(
        &mut self,
        est: &ArrayEstimator,
        acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        self.array.report_step(est, acc)
    }

    /// Starts a report for any pairing, routed by kind.
    pub fn start_report(
        &mut self,
        est: EstimatorRef<'_>,
        acc: AccumulatorRef<'_>,
    ) -> Result<(), PimcError> {
        self.dispatch(Phase::Start, est, acc)
    }

    /// Reports one step for any pairing, routed by kind.
    pub fn report_step(
        &mut self,
        est: EstimatorRef<'_>,
        acc: AccumulatorRef<'_>,
    ) -> Result<(), PimcError> {
        self.dispatch(Phase::Step, est, acc)
    }

    fn dispatch(
        &mut self,
        phase: Phase,
        est: EstimatorRef<'_>,
        acc: AccumulatorRef<'_>,
    ) -> Result<(), PimcError> {
        match (phase, est, acc) {
            (Phase::Start, EstimatorRef::Scalar(e), AccumulatorRef::Simple(a)) => {
                self.start_scalar_report(e, a)
            }
            (Phase::Step, EstimatorRef::Scalar(e), AccumulatorRef::Simple(a)) => {
                self.report_scalar_step(e, a)
            }
            (Phase::Start, EstimatorRef::Scalar(e), AccumulatorRef::Partitioned(a)) => {
                self.start_partitioned_scalar_report(e, a)
            }
            (Phase::Step, EstimatorRef::Scalar(e), AccumulatorRef::Partitioned(a)) => {
                self.report_partitioned_scalar_step(e, a)
            }
            (Phase::Start, EstimatorRef::Array(e), a) => self.start_array_report(e, a.as_base()),
            (Phase::Step, EstimatorRef::Array(e), a) => self.report_array_step(e, a.as_base()),
            (Phase::Start, EstimatorRef::AccRej(e), a) => {
                self.start_acc_rej_report(e, a.as_base())
            }
            (Phase::Step, EstimatorRef::AccRej(e), a) => self.report_acc_rej_step(e, a.as_base()),
        }
    }
}
