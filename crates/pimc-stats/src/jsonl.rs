use std::io::Write;

use pimc_core::PimcError;
use serde::{Deserialize, Serialize};

use crate::accumulator::{AnyScalarAccumulator, ScalarAccumulator, SimpleScalarAccumulator};
use crate::estimator::{AccRejEstimator, ArrayEstimator, ScalarEstimator};
use crate::sink::{write_error, ReportCursor, SharedSink};
use crate::writer::{ReportWriter, ReportWriters};

/// Acceptance counters of one move level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Level label.
    pub level: String,
    /// Accepted trials.
    pub accepted: u64,
    /// Attempted trials.
    pub trials: u64,
    /// `accepted / trials`, absent when no trial was attempted.
    pub ratio: Option<f64>,
}

/// One line of JSON-lines report output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReportRecord {
    /// Emitted by `start_report`.
    Start {
        /// Estimator name.
        estimator: String,
        /// Estimator category.
        type_name: String,
        /// Unit label.
        unit: String,
    },
    /// Scalar step summary.
    Scalar {
        /// Estimator name.
        estimator: String,
        /// Zero-based step index within the current report.
        step: u64,
        /// Mean of the committed samples.
        average: f64,
        /// Standard error of the mean.
        error: f64,
        /// Number of committed samples.
        samples: u64,
    },
    /// Array step summary.
    Array {
        /// Estimator name.
        estimator: String,
        /// Zero-based step index within the current report.
        step: u64,
        /// Array extents.
        shape: Vec<usize>,
        /// Values in row-major order.
        values: Vec<f64>,
        /// Per-element errors when the estimator provides them.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        errors: Option<Vec<f64>>,
        /// Normalisation sample count from the paired accumulator.
        samples: u64,
    },
    /// Acceptance step summary.
    AccRej {
        /// Move name.
        estimator: String,
        /// Zero-based step index within the current report.
        step: u64,
        /// Per-level counters.
        levels: Vec<LevelRecord>,
    },
}

/// Machine readable writer emitting one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesWriter<W: Write> {
    out: W,
    cursor: ReportCursor,
}

impl<W: Write> JsonLinesWriter<W> {
    /// Creates a writer emitting into `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            cursor: ReportCursor::default(),
        }
    }

    /// Consumes the writer and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, record: &ReportRecord) -> Result<(), PimcError> {
        serde_json::to_writer(&mut self.out, record)
            .map_err(|err| PimcError::io("report-serialize", err))?;
        self.out.write_all(b"\n").map_err(write_error)?;
        self.out.flush().map_err(write_error)
    }

    fn start(&mut self, info: &crate::estimator::EstimatorInfo) -> Result<(), PimcError> {
        self.cursor.start(&info.name);
        tracing::debug!(estimator = %info.name, "json-lines report started");
        self.emit(&ReportRecord::Start {
            estimator: info.name.clone(),
            type_name: info.type_name.clone(),
            unit: info.unit_name.clone(),
        })
    }
}

impl<W: Write> ReportWriter<ScalarEstimator, SimpleScalarAccumulator> for JsonLinesWriter<W> {
    fn start_report(
        &mut self,
        est: &ScalarEstimator,
        _acc: &SimpleScalarAccumulator,
    ) -> Result<(), PimcError> {
        self.start(est.info())
    }

    fn report_step(
        &mut self,
        est: &ScalarEstimator,
        acc: &SimpleScalarAccumulator,
    ) -> Result<(), PimcError> {
        let estimator = est.info().name.clone();
        let step = self.cursor.advance(&estimator)?;
        self.emit(&ReportRecord::Scalar {
            estimator,
            step,
            average: acc.average(),
            error: acc.standard_error(),
            samples: acc.sample_count(),
        })
    }
}

impl<W: Write> ReportWriter<ArrayEstimator, AnyScalarAccumulator> for JsonLinesWriter<W> {
    fn start_report(
        &mut self,
        est: &ArrayEstimator,
        _acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        self.start(est.info())
    }

    fn report_step(
        &mut self,
        est: &ArrayEstimator,
        acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        let estimator = est.info().name.clone();
        let step = self.cursor.advance(&estimator)?;
        self.emit(&ReportRecord::Array {
            estimator,
            step,
            shape: est.shape().to_vec(),
            values: est.values().to_vec(),
            errors: est.errors().map(<[f64]>::to_vec),
            samples: acc.sample_count(),
        })
    }
}

impl<W: Write> ReportWriter<AccRejEstimator, AnyScalarAccumulator> for JsonLinesWriter<W> {
    fn start_report(
        &mut self,
        est: &AccRejEstimator,
        _acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        self.start(est.info())
    }

    fn report_step(
        &mut self,
        est: &AccRejEstimator,
        _acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        let estimator = est.info().name.clone();
        let step = self.cursor.advance(&estimator)?;
        let levels = est
            .level_names()
            .iter()
            .enumerate()
            .map(|(level, label)| LevelRecord {
                level: label.clone(),
                accepted: est.accepted(level),
                trials: est.trials(level),
                ratio: est.acceptance_ratio(level),
            })
            .collect();
        self.emit(&ReportRecord::AccRej {
            estimator,
            step,
            levels,
        })
    }
}

impl ReportWriters {
    /// JSON-lines writers for all three pairings, sharing one sink.
    pub fn json_lines(sink: SharedSink) -> Self {
        ReportWriters::new(
            Box::new(JsonLinesWriter::new(sink.clone())),
            Box::new(JsonLinesWriter::new(sink.clone())),
            Box::new(JsonLinesWriter::new(sink)),
        )
    }
}

/// Parses JSON-lines report output back into records, skipping blank lines.
pub fn parse_records(text: &str) -> Result<Vec<ReportRecord>, PimcError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|err| PimcError::io("report-parse", err))
        })
        .collect()
}
