//! Exact Coulomb pair action at zero separation.
//!
//! For two particles with reduced mass `mu` interacting through `Z/r`, the
//! diagonal density matrix at the origin relative to the free one is
//!
//! ```text
//! exp(-u(0,0;tau)) = (4/sqrt(pi)) * int_0^inf t^2 exp(-t^2) S(pi kappa / t) dt
//!                  + sqrt(pi) kappa^3 sum_n exp(kappa^2 / (4 n^2)) / n^3
//! ```
//!
//! with `kappa = |Z| sqrt(2 mu tau)`. The scattering part uses the Sommerfeld
//! factor `S(x) = x / (1 - exp(-x))` for attraction and `x / (exp(x) - 1)`
//! for repulsion. The bound-state sum only contributes when `Z < 0`.

use std::f64::consts::PI;

/// Upper limit of the scattering integral; `t^2 exp(-t^2)` is below 1e-33 there.
const T_MAX: f64 = 9.0;
/// Simpson intervals (even).
const INTERVALS: usize = 4000;
/// Terms of the bound-state sum evaluated explicitly.
const BOUND_TERMS: u32 = 2000;

/// Returns `u(0, 0; tau)` for coupling `z` (charge product over dielectric
/// constant), reduced mass `mu` and time step `tau`.
///
/// Zero coupling gives 0. Very strong attraction overflows the bound-state
/// sum and yields a non-finite result, which callers must reject.
pub fn exact_origin_action(z: f64, mu: f64, tau: f64) -> f64 {
    if z == 0.0 {
        return 0.0;
    }
    let kappa = z.abs() * (2.0 * mu * tau).sqrt();
    let attractive = z < 0.0;
    let mut total = (4.0 / PI.sqrt()) * scattering_integral(kappa, attractive);
    if attractive {
        total += PI.sqrt() * kappa.powi(3) * bound_state_sum(kappa);
    }
    -total.ln()
}

fn sommerfeld(x: f64, attractive: bool) -> f64 {
    if attractive {
        x / -(-x).exp_m1()
    } else {
        // exp_m1 overflows to infinity for large x, sending the factor to 0.
        x / x.exp_m1()
    }
}

fn scattering_integrand(t: f64, kappa: f64, attractive: bool) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    t * t * (-t * t).exp() * sommerfeld(PI * kappa / t, attractive)
}

fn scattering_integral(kappa: f64, attractive: bool) -> f64 {
    let h = T_MAX / INTERVALS as f64;
    let f = |t: f64| scattering_integrand(t, kappa, attractive);
    let mut sum = f(0.0) + f(T_MAX);
    for i in 1..INTERVALS {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(i as f64 * h);
    }
    sum * h / 3.0
}

fn bound_state_sum(kappa: f64) -> f64 {
    let k2 = kappa * kappa / 4.0;
    let explicit: f64 = (1..=BOUND_TERMS)
        .map(|n| {
            let n = f64::from(n);
            (k2 / (n * n)).exp() / (n * n * n)
        })
        .sum();
    let last = f64::from(BOUND_TERMS);
    explicit + 1.0 / (2.0 * last * last)
}
