use pimc_core::errors::ErrorInfo;
use pimc_core::PimcError;
use serde::{Deserialize, Serialize};

fn estimator_error(code: &str, message: impl Into<String>) -> PimcError {
    PimcError::Report(ErrorInfo::new(code, message.into()))
}

/// Tag identifying the measurement kind of an estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EstimatorKind {
    /// Single real-valued observable.
    Scalar,
    /// Multi-dimensional array observable (densities, correlation functions).
    Array,
    /// Acceptance/rejection counters of a Monte Carlo move.
    AccRej,
}

/// Identity shared by every estimator, used by writers for labelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorInfo {
    /// Unique estimator name, e.g. `thermo_energy`.
    pub name: String,
    /// Physical category, e.g. `scalar-energy` or `array-density`.
    pub type_name: String,
    /// Unit label reported next to values.
    pub unit_name: String,
}

impl EstimatorInfo {
    /// Creates an identity descriptor.
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        unit_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            unit_name: unit_name.into(),
        }
    }
}

/// Scalar observable with a linear unit conversion.
///
/// The estimator holds only the most recent measured value. Running
/// statistics live in the paired accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarEstimator {
    info: EstimatorInfo,
    scale: f64,
    shift: f64,
    value: f64,
}

impl ScalarEstimator {
    /// Creates a scalar estimator reporting raw values unchanged.
    pub fn new(info: EstimatorInfo) -> Self {
        Self::with_units(info, 1.0, 0.0)
    }

    /// Creates a scalar estimator that reports `raw * scale + shift`.
    pub fn with_units(info: EstimatorInfo, scale: f64, shift: f64) -> Self {
        Self {
            info,
            scale,
            shift,
            value: 0.0,
        }
    }

    /// Identity of the estimator.
    pub fn info(&self) -> &EstimatorInfo {
        &self.info
    }

    /// Measurement kind tag.
    pub fn kind(&self) -> EstimatorKind {
        EstimatorKind::Scalar
    }

    /// Multiplicative unit conversion factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Additive unit conversion offset.
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Stores a freshly measured raw value, converted to reporting units.
    pub fn set_value(&mut self, raw: f64) {
        self.value = raw * self.scale + self.shift;
    }

    /// Most recent value in reporting units.
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Array observable stored flat in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayEstimator {
    info: EstimatorInfo,
    shape: Vec<usize>,
    values: Vec<f64>,
    errors: Option<Vec<f64>>,
}

impl ArrayEstimator {
    /// Creates a zero-filled array estimator with the given shape.
    pub fn new(info: EstimatorInfo, shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self {
            info,
            shape,
            values: vec![0.0; len],
            errors: None,
        }
    }

    /// Identity of the estimator.
    pub fn info(&self) -> &EstimatorInfo {
        &self.info
    }

    /// Measurement kind tag.
    pub fn kind(&self) -> EstimatorKind {
        EstimatorKind::Array
    }

    /// Array extents.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements (product of the extents).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current values in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Optional per-element statistical errors.
    pub fn errors(&self) -> Option<&[f64]> {
        self.errors.as_deref()
    }

    /// Replaces the current values. The length must match the shape.
    pub fn set_values(&mut self, values: &[f64]) -> Result<(), PimcError> {
        self.check_len("values", values.len())?;
        self.values.copy_from_slice(values);
        Ok(())
    }

    /// Replaces the per-element errors. The length must match the shape.
    pub fn set_errors(&mut self, errors: &[f64]) -> Result<(), PimcError> {
        self.check_len("errors", errors.len())?;
        self.errors = Some(errors.to_vec());
        Ok(())
    }

    fn check_len(&self, what: &str, len: usize) -> Result<(), PimcError> {
        if len != self.values.len() {
            return Err(PimcError::Report(
                ErrorInfo::new(
                    "array-shape-mismatch",
                    format!("{what} length does not match shape"),
                )
                .with_context("estimator", self.info.name.clone())
                .with_context("expected", self.values.len().to_string())
                .with_context("actual", len.to_string()),
            ));
        }
        Ok(())
    }
}

/// Accept/trial counters for one Monte Carlo move, split by level.
///
/// Counters cover the current report interval and are cleared with
/// [`AccRejEstimator::reset`] after each report.
#[derive(Debug, Clone, PartialEq)]
pub struct AccRejEstimator {
    info: EstimatorInfo,
    level_names: Vec<String>,
    accepted: Vec<u64>,
    trials: Vec<u64>,
}

impl AccRejEstimator {
    /// Creates counters for a move with the given level labels.
    pub fn new(move_name: impl Into<String>, level_names: Vec<String>) -> Self {
        let levels = level_names.len();
        Self {
            info: EstimatorInfo::new(move_name, "acc-rej", "ratio"),
            level_names,
            accepted: vec![0; levels],
            trials: vec![0; levels],
        }
    }

    /// Identity of the estimator; `name` is the move name.
    pub fn info(&self) -> &EstimatorInfo {
        &self.info
    }

    /// Measurement kind tag.
    pub fn kind(&self) -> EstimatorKind {
        EstimatorKind::AccRej
    }

    /// Number of move levels.
    pub fn level_count(&self) -> usize {
        self.level_names.len()
    }

    /// Label of each level.
    pub fn level_names(&self) -> &[String] {
        &self.level_names
    }

    /// Records one trial at `level`.
    pub fn record(&mut self, level: usize, accepted: bool) -> Result<(), PimcError> {
        if level >= self.level_names.len() {
            return Err(estimator_error(
                "acc-rej-level",
                format!(
                    "level {level} out of range for move {} with {} levels",
                    self.info.name,
                    self.level_names.len()
                ),
            ));
        }
        self.trials[level] += 1;
        if accepted {
            self.accepted[level] += 1;
        }
        Ok(())
    }

    /// Accepted trials at `level`.
    pub fn accepted(&self, level: usize) -> u64 {
        self.accepted.get(level).copied().unwrap_or(0)
    }

    /// Attempted trials at `level`.
    pub fn trials(&self, level: usize) -> u64 {
        self.trials.get(level).copied().unwrap_or(0)
    }

    /// Fraction of accepted trials, `None` when nothing was attempted.
    pub fn acceptance_ratio(&self, level: usize) -> Option<f64> {
        match self.trials(level) {
            0 => None,
            trials => Some(self.accepted(level) as f64 / trials as f64),
        }
    }

    /// Clears all counters.
    pub fn reset(&mut self) {
        self.accepted.iter_mut().for_each(|count| *count = 0);
        self.trials.iter_mut().for_each(|count| *count = 0);
    }
}
