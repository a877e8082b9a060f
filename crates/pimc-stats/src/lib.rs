#![deny(missing_docs)]
#![doc = "Estimators, accumulators and the report writer dispatcher for PIMC measurements."]

/// Running-statistics accumulators.
pub mod accumulator;
/// YAML report configuration and writer construction.
pub mod config;
/// Human readable report writer.
pub mod console;
/// Estimator kinds and their measured state.
pub mod estimator;
/// JSON-lines report writer and record schema.
pub mod jsonl;
/// Shared output sinks.
pub mod sink;
/// Report writer capability and the kind-routing dispatcher.
pub mod writer;

pub use accumulator::{
    AccumulatorKind, AnyScalarAccumulator, PartitionedScalarAccumulator, RunningStats,
    ScalarAccumulator, SimpleScalarAccumulator,
};
pub use config::{ReportConfig, ReportDestination, ReportFormat};
pub use console::ConsoleWriter;
pub use estimator::{
    AccRejEstimator, ArrayEstimator, EstimatorInfo, EstimatorKind, ScalarEstimator,
};
pub use jsonl::{parse_records, JsonLinesWriter, LevelRecord, ReportRecord};
pub use sink::SharedSink;
pub use writer::{
    route, AccRejReportWriter, AccumulatorRef, ArrayReportWriter, EstimatorRef, ReportWriter,
    ReportWriters, Route, ScalarReportWriter,
};
