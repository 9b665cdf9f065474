//! Reliability calculators.
//!
//! Two closed-form models: the exponential durability law and the
//! defect-free coefficient of a three-state system.

use crate::error::{self, InputError};
use serde::Serialize;

pub const DEFAULT_SURVIVAL: f64 = 0.95;
pub const DEFAULT_HOURS: f64 = 120.0;
pub const DEFAULT_STATES: [f64; 3] = [0.85, 0.10, 0.05];

/// Allowed deviation of the state probabilities from a sum of 1.
const SUM_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Durability {
    pub survival: f64,
    pub hours: f64,
    /// Failure rate λ, 1/h.
    pub failure_rate: f64,
    /// Mean time to failure, h. `None` when λ is zero.
    pub mean_time_to_failure: Option<f64>,
    /// Failure density a(t), 1/h.
    pub failure_density: f64,
}

/// Exponential law P(t) = exp(-λt), solved for λ from an observed P(t).
pub fn durability(survival: f64, hours: f64) -> Result<Durability, InputError> {
    let survival = error::finite("P(t)", survival)?;
    if survival <= 0.0 || survival > 1.0 {
        return Err(InputError::OutOfRange {
            field: "P(t)",
            range: "(0, 1]",
            value: survival,
        });
    }
    let hours = error::positive("t", hours)?;

    // -ln(1) is -0.0; keep the rate non-negative.
    let failure_rate = (-survival.ln() / hours).max(0.0);
    let mean_time_to_failure = (failure_rate > 0.0).then(|| 1.0 / failure_rate);

    Ok(Durability {
        survival,
        hours,
        failure_rate,
        mean_time_to_failure,
        failure_density: failure_rate * survival,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectFree {
    /// Probabilities actually used (after normalization, if any).
    pub no_defect: f64,
    pub with_defect: f64,
    pub failure: f64,
    /// Sum of the probabilities as entered.
    pub input_sum: f64,
    pub normalized: bool,
    /// K = P0 + P1.
    pub coefficient: f64,
}

/// Defect-free coefficient over the states where the system still works.
pub fn defect_free(p0: f64, p1: f64, p2: f64) -> Result<DefectFree, InputError> {
    let mut probs = [p0, p1, p2];
    for (field, p) in ["P0", "P1", "P2"].into_iter().zip(probs) {
        let p = error::finite(field, p)?;
        if p < 0.0 {
            return Err(InputError::OutOfRange {
                field,
                range: "[0, 1]",
                value: p,
            });
        }
    }
    let input_sum: f64 = probs.iter().sum();
    if input_sum <= 0.0 {
        return Err(InputError::NotPositive {
            field: "P0 + P1 + P2",
            value: input_sum,
        });
    }

    let normalized = (input_sum - 1.0).abs() > SUM_TOLERANCE;
    if normalized {
        tracing::warn!(sum = input_sum, "state probabilities do not sum to 1, normalizing");
        for p in probs.iter_mut() {
            *p /= input_sum;
        }
    }

    let [no_defect, with_defect, failure] = probs;
    Ok(DefectFree {
        no_defect,
        with_defect,
        failure,
        input_sum,
        normalized,
        coefficient: no_defect + with_defect,
    })
}
