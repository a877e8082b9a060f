use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use pimc_core::errors::ErrorInfo;
use pimc_core::PimcError;
use serde::{Deserialize, Serialize};

use crate::sink::SharedSink;
use crate::writer::ReportWriters;

/// YAML-configurable reporting behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output encoding.
    #[serde(default)]
    pub format: ReportFormat,
    /// Where report output goes.
    #[serde(default)]
    pub destination: ReportDestination,
    /// Number of measurement steps between reports.
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    1
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            destination: ReportDestination::default(),
            interval: default_interval(),
        }
    }
}

/// Supported report encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Human readable lines.
    #[default]
    Console,
    /// One JSON object per line.
    JsonLines,
}

/// Report sink selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ReportDestination {
    /// Standard output.
    #[default]
    Stdout,
    /// File created (or truncated) when the writers are built.
    File {
        /// Output path.
        path: PathBuf,
    },
}

impl ReportConfig {
    /// Parses a YAML document, then validates it.
    pub fn from_yaml_str(text: &str) -> Result<Self, PimcError> {
        let config: ReportConfig = serde_yaml::from_str(text).map_err(|err| {
            PimcError::Config(ErrorInfo::new("report-config-parse", err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PimcError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            PimcError::Io(
                ErrorInfo::new("report-config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&text)
    }

    /// Checks field ranges.
    pub fn validate(&self) -> Result<(), PimcError> {
        if self.interval == 0 {
            return Err(PimcError::Config(
                ErrorInfo::new("report-interval", "report interval must be positive")
                    .with_hint("set interval to 1 to report every step"),
            ));
        }
        Ok(())
    }

    /// Returns true when a report is due after measurement step `step`.
    pub fn is_report_step(&self, step: u64) -> bool {
        self.interval > 0 && step % self.interval == self.interval - 1
    }

    /// Opens the configured sink.
    pub fn open_sink(&self) -> Result<SharedSink, PimcError> {
        match &self.destination {
            ReportDestination::Stdout => Ok(SharedSink::stdout()),
            ReportDestination::File { path } => {
                let file = File::create(path).map_err(|err| {
                    PimcError::Io(
                        ErrorInfo::new("report-sink-open", err.to_string())
                            .with_context("path", path.display().to_string()),
                    )
                })?;
                Ok(SharedSink::new(BufWriter::new(file)))
            }
        }
    }
}

impl ReportWriters {
    /// Builds the writer set described by `config`.
    pub fn from_config(config: &ReportConfig) -> Result<Self, PimcError> {
        config.validate()?;
        let sink = config.open_sink()?;
        tracing::info!(
            format = ?config.format,
            destination = ?config.destination,
            "report writers configured"
        );
        Ok(match config.format {
            ReportFormat::Console => ReportWriters::console(sink),
            ReportFormat::JsonLines => ReportWriters::json_lines(sink),
        })
    }
}
