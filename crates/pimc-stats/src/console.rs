use std::io::Write;

use pimc_core::PimcError;

use crate::accumulator::{AnyScalarAccumulator, ScalarAccumulator, SimpleScalarAccumulator};
use crate::estimator::{AccRejEstimator, ArrayEstimator, ScalarEstimator};
use crate::sink::{write_error, ReportCursor, SharedSink};
use crate::writer::{ReportWriter, ReportWriters};

/// Number of array elements echoed per console line.
const ARRAY_PREVIEW: usize = 4;

/// Human readable report writer.
///
/// `start_report` prints a header for the estimator; each `report_step`
/// prints one indented line with the accumulated statistics.
#[derive(Debug)]
pub struct ConsoleWriter<W: Write> {
    out: W,
    cursor: ReportCursor,
}

impl<W: Write> ConsoleWriter<W> {
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

    fn flush_out(&mut self) -> Result<(), PimcError> {
        self.out.flush().map_err(write_error)
    }
}

impl<W: Write> ReportWriter<ScalarEstimator, SimpleScalarAccumulator> for ConsoleWriter<W> {
    fn start_report(
        &mut self,
        est: &ScalarEstimator,
        _acc: &SimpleScalarAccumulator,
    ) -> Result<(), PimcError> {
        let info = est.info();
        self.cursor.start(&info.name);
        tracing::debug!(estimator = %info.name, "console scalar report started");
        writeln!(self.out, "== {} [{}] ({})", info.name, info.type_name, info.unit_name)
            .map_err(write_error)?;
        self.flush_out()
    }

    fn report_step(
        &mut self,
        est: &ScalarEstimator,
        acc: &SimpleScalarAccumulator,
    ) -> Result<(), PimcError> {
        let info = est.info();
        let step = self.cursor.advance(&info.name)?;
        writeln!(
            self.out,
            "  [{step}] {}: {:.8} +/- {:.8} {} (n={})",
            info.name,
            acc.average(),
            acc.standard_error(),
            info.unit_name,
            acc.sample_count()
        )
        .map_err(write_error)?;
        self.flush_out()
    }
}

impl<W: Write> ReportWriter<ArrayEstimator, AnyScalarAccumulator> for ConsoleWriter<W> {
    fn start_report(
        &mut self,
        est: &ArrayEstimator,
        _acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        let info = est.info();
        self.cursor.start(&info.name);
        tracing::debug!(estimator = %info.name, "console array report started");
        writeln!(
            self.out,
            "== {} [{}] shape={:?} ({})",
            info.name,
            info.type_name,
            est.shape(),
            info.unit_name
        )
        .map_err(write_error)?;
        self.flush_out()
    }

    fn report_step(
        &mut self,
        est: &ArrayEstimator,
        acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        let info = est.info();
        let step = self.cursor.advance(&info.name)?;
        let preview: Vec<String> = est
            .values()
            .iter()
            .take(ARRAY_PREVIEW)
            .map(|value| format!("{value:.6}"))
            .collect();
        let ellipsis = if est.len() > ARRAY_PREVIEW { ", ..." } else { "" };
        writeln!(
            self.out,
            "  [{step}] {}[{}]: [{}{}] (n={})",
            info.name,
            est.len(),
            preview.join(", "),
            ellipsis,
            acc.sample_count()
        )
        .map_err(write_error)?;
        self.flush_out()
    }
}

impl<W: Write> ReportWriter<AccRejEstimator, AnyScalarAccumulator> for ConsoleWriter<W> {
    fn start_report(
        &mut self,
        est: &AccRejEstimator,
        _acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        let name = &est.info().name;
        self.cursor.start(name);
        tracing::debug!(estimator = %name, "console acc/rej report started");
        writeln!(self.out, "== {} acceptance ({} levels)", name, est.level_count())
            .map_err(write_error)?;
        self.flush_out()
    }

    fn report_step(
        &mut self,
        est: &AccRejEstimator,
        _acc: &AnyScalarAccumulator,
    ) -> Result<(), PimcError> {
        let name = &est.info().name;
        let step = self.cursor.advance(name)?;
        for (level, label) in est.level_names().iter().enumerate() {
            let ratio = est
                .acceptance_ratio(level)
                .map(|ratio| format!("{ratio:.4}"))
                .unwrap_or_else(|| "n/a".to_string());
            writeln!(
                self.out,
                "  [{step}] {name} {label}: {}/{} accepted ({ratio})",
                est.accepted(level),
                est.trials(level)
            )
            .map_err(write_error)?;
        }
        self.flush_out()
    }
}

impl ReportWriters {
    /// Console writers for all three pairings, sharing one sink.
    pub fn console(sink: SharedSink) -> Self {
        ReportWriters::new(
            Box::new(ConsoleWriter::new(sink.clone())),
            Box::new(ConsoleWriter::new(sink.clone())),
            Box::new(ConsoleWriter::new(sink)),
        )
    }
}
