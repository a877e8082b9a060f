use std::f64::consts::{PI, SQRT_2};

use pimc_core::errors::ErrorInfo;
use pimc_core::{PimcError, Vec3};
use serde::{Deserialize, Serialize};

use crate::origin::exact_origin_action;
use crate::LinkAction;

/// Below this chord ratio `artanh(y)/y` is replaced by its series.
const CHORD_SERIES_CUTOFF: f64 = 1e-4;
/// Below this scaled separation the diagonal shape takes its limit value.
const ORIGIN_CUTOFF: f64 = f64::EPSILON;

fn action_error(code: &str, message: impl Into<String>) -> ErrorInfo {
    ErrorInfo::new(code, message.into())
}

/// Physical parameters of a Coulomb pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoulombParameters {
    /// Product of the two charges.
    pub q1q2: f64,
    /// Dielectric constant.
    pub epsilon: f64,
    /// Reduced mass of the pair.
    pub mu: f64,
    /// Imaginary time step.
    pub delta_tau: f64,
}

impl CoulombParameters {
    fn validate(&self) -> Result<(), PimcError> {
        let fields = [
            ("q1q2", self.q1q2),
            ("epsilon", self.epsilon),
            ("mu", self.mu),
            ("delta_tau", self.delta_tau),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PimcError::Action(
                    action_error("non-finite-parameter", "link action parameter is not finite")
                        .with_context("parameter", name)
                        .with_context("value", value.to_string()),
                ));
            }
        }
        if self.epsilon == 0.0 {
            return Err(PimcError::Action(
                action_error("zero-dielectric", "dielectric constant must be non-zero")
                    .with_context("epsilon", self.epsilon.to_string()),
            ));
        }
        if self.mu <= 0.0 {
            return Err(PimcError::Action(
                action_error("non-positive-mass", "reduced mass must be positive")
                    .with_context("mu", self.mu.to_string()),
            ));
        }
        if self.delta_tau <= 0.0 {
            return Err(PimcError::Action(
                action_error("non-positive-time-step", "time step must be positive")
                    .with_context("delta_tau", self.delta_tau.to_string()),
            ));
        }
        Ok(())
    }
}

/// Pair action of two charged particles over one imaginary time step.
///
/// The diagonal part is the improved Kelbg form
///
/// ```text
/// u0(q) = tau Z / q * [1 - exp(-x^2) + sqrt(pi) x erfc(x)],   x = q / l
/// ```
///
/// where the length `l` is fixed at construction so that `u0(0)` equals the
/// exact Coulomb action at the origin. Away from the origin the diagonal is
/// damped by `exp(-g q^2 / (q^2 + l^2))` with `g = pi kappa^2 / (4 sqrt(2))`
/// and `kappa^2 = 2 mu tau Z^2`, the second-order coupling correction to the
/// far-field tail. The off-diagonal dependence multiplies
/// by the straight-chord average of `1/r`, `artanh(y)/y` with
/// `y = s / (2 sqrt(q^2 + l^2))`, which stays finite when both ends meet.
///
/// Values are in units of `hbar = 1`; the result tends to
/// `exp(-g) tau Z / r` far from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoulombLinkAction {
    params: CoulombParameters,
    coupling: f64,
    kelbg_length: f64,
    tail_damping: f64,
    origin_value: f64,
}

impl CoulombLinkAction {
    /// Builds the action for a pair with charge product `q1q2`, dielectric
    /// constant `epsilon` and reduced mass `mu` at time step `delta_tau`.
    ///
    /// All parameters must be finite, `epsilon` non-zero and `mu`,
    /// `delta_tau` positive.
    pub fn new(q1q2: f64, epsilon: f64, mu: f64, delta_tau: f64) -> Result<Self, PimcError> {
        Self::from_parameters(CoulombParameters {
            q1q2,
            epsilon,
            mu,
            delta_tau,
        })
    }

    /// Builds the action from a parameter set.
    pub fn from_parameters(params: CoulombParameters) -> Result<Self, PimcError> {
        params.validate()?;
        let coupling = params.q1q2 / params.epsilon;
        let origin_value = exact_origin_action(coupling, params.mu, params.delta_tau);
        if !origin_value.is_finite() {
            return Err(PimcError::Action(
                action_error("origin-action-overflow", "exact origin action is not finite")
                    .with_context("coupling", coupling.to_string())
                    .with_hint("reduce the coupling or the time step"),
            ));
        }

        let thermal_length = (params.delta_tau / (2.0 * params.mu)).sqrt();
        let kelbg_length = if coupling == 0.0 {
            thermal_length
        } else {
            params.delta_tau * coupling * PI.sqrt() / origin_value
        };
        if !(kelbg_length.is_finite() && kelbg_length > 0.0) {
            return Err(PimcError::Action(
                action_error("kelbg-length", "derived interaction length is not positive")
                    .with_context("coupling", coupling.to_string())
                    .with_context("origin_value", origin_value.to_string()),
            ));
        }

        let tail_damping =
            PI * params.mu * params.delta_tau * coupling * coupling / (2.0 * SQRT_2);

        tracing::debug!(
            coupling,
            kelbg_length,
            tail_damping,
            thermal_length,
            origin_value,
            "coulomb link action constructed"
        );
        Ok(Self {
            params,
            coupling,
            kelbg_length,
            tail_damping,
            origin_value,
        })
    }

    /// Mean distance of the two ends from the origin, `(|d1| + |d2|) / 2`.
    #[inline]
    pub fn calculate_average_separation(delta1: &Vec3, delta2: &Vec3) -> f64 {
        0.5 * (delta1.norm() + delta2.norm())
    }

    /// Squared distance between the two ends, `|d1 - d2|^2`.
    #[inline]
    pub fn calculate_s2(delta1: &Vec3, delta2: &Vec3) -> f64 {
        (*delta1 - *delta2).norm2()
    }

    /// Pair action for relative displacements `delta1` at the start and
    /// `delta2` at the end of the time step.
    pub fn get_value(&self, delta1: &Vec3, delta2: &Vec3) -> f64 {
        if self.coupling == 0.0 {
            return 0.0;
        }
        let q = Self::calculate_average_separation(delta1, delta2);
        let s = Self::calculate_s2(delta1, delta2).sqrt();
        self.diagonal(q) * self.chord_factor(q, s)
    }

    /// Diagonal action `u0(q)`.
    pub fn diagonal(&self, q: f64) -> f64 {
        let l = self.kelbg_length;
        let x = q / l;
        let damping = (-self.tail_damping * q * q / (q * q + l * l)).exp();
        self.params.delta_tau * self.coupling / l * kelbg_shape(x) * damping
    }

    fn chord_factor(&self, q: f64, s: f64) -> f64 {
        let y = s / (2.0 * q.hypot(self.kelbg_length));
        if y < CHORD_SERIES_CUTOFF {
            1.0 + y * y / 3.0
        } else {
            y.atanh() / y
        }
    }

    /// Construction parameters.
    pub fn parameters(&self) -> &CoulombParameters {
        &self.params
    }

    /// Coupling `Z = q1q2 / epsilon`.
    pub fn coupling(&self) -> f64 {
        self.coupling
    }

    /// Length `l` of the diagonal form.
    pub fn kelbg_length(&self) -> f64 {
        self.kelbg_length
    }

    /// Ratio of the far-field action to the classical `tau Z / r`.
    pub fn far_field_factor(&self) -> f64 {
        (-self.tail_damping).exp()
    }

    /// Thermal length `sqrt(delta_tau / (2 mu))`.
    pub fn thermal_length(&self) -> f64 {
        (self.params.delta_tau / (2.0 * self.params.mu)).sqrt()
    }

    /// Action at zero separation.
    pub fn origin_value(&self) -> f64 {
        self.origin_value
    }
}

/// `(1 - exp(-x^2)) / x + sqrt(pi) erfc(x)`, strictly decreasing from
/// `sqrt(pi)` at the origin to `1/x` asymptotically.
fn kelbg_shape(x: f64) -> f64 {
    if x < ORIGIN_CUTOFF {
        return PI.sqrt();
    }
    -(-x * x).exp_m1() / x + PI.sqrt() * libm::erfc(x)
}

impl LinkAction for CoulombLinkAction {
    fn value(&self, delta1: &Vec3, delta2: &Vec3) -> f64 {
        self.get_value(delta1, delta2)
    }
}
