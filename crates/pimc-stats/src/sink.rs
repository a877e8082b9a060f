use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::rc::Rc;

use pimc_core::errors::ErrorInfo;
use pimc_core::PimcError;

/// Byte sink shared by the writers owned by one dispatcher.
///
/// The three writers of a [`ReportWriters`](crate::ReportWriters) usually
/// emit into the same stream. The sink is single-threaded, matching the
/// per-replica reporting model.
#[derive(Clone)]
pub struct SharedSink(Rc<RefCell<Box<dyn Write>>>);

impl SharedSink {
    /// Wraps a writer.
    pub fn new(inner: impl Write + 'static) -> Self {
        Self(Rc::new(RefCell::new(Box::new(inner))))
    }

    /// Sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl std::fmt::Debug for SharedSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSink(..)")
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// Per-estimator step counters tracking which reports have been started.
#[derive(Debug, Default, Clone)]
pub(crate) struct ReportCursor {
    steps: BTreeMap<String, u64>,
}

impl ReportCursor {
    /// Starts (or restarts) the report of `name`.
    pub(crate) fn start(&mut self, name: &str) {
        self.steps.insert(name.to_string(), 0);
    }

    /// Returns the index of the next step of `name` and advances it.
    pub(crate) fn advance(&mut self, name: &str) -> Result<u64, PimcError> {
        match self.steps.get_mut(name) {
            Some(step) => {
                let current = *step;
                *step += 1;
                Ok(current)
            }
            None => Err(PimcError::Report(
                ErrorInfo::new("step-before-start", "report step issued before start_report")
                    .with_context("estimator", name),
            )),
        }
    }
}

pub(crate) fn write_error(err: io::Error) -> PimcError {
    PimcError::io("report-write", err)
}
