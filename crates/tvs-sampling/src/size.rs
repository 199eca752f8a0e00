use tvs_core::errors::TvsError;

use crate::params::{validate_confidence, validate_margin};

/// Maximum-variance proportion used by the sizing formula.
const PROPORTION_VARIANCE: f64 = 0.25;

/// Two-sided standard normal quantile for an accepted confidence level.
pub fn z_score(confidence_interval: u32) -> Result<f64, TvsError> {
    validate_confidence(confidence_interval)?;
    Ok(match confidence_interval {
        90 => 1.645,
        95 => 1.96,
        97 => 2.17,
        _ => 2.576,
    })
}

/// Required sample size for a proportion estimate with finite population
/// correction.
///
/// ```text
/// n0 = z^2 * 0.25 / e^2
/// n  = ceil(n0 / (1 + (n0 - 1) / N))
/// ```
///
/// The result is clamped to `1..=N` when `N >= 1` and is `0` when `N == 0`.
pub fn sample_size(
    confidence_interval: u32,
    margin_of_error: f64,
    population: usize,
) -> Result<usize, TvsError> {
    let z = z_score(confidence_interval)?;
    validate_margin(margin_of_error)?;
    if population == 0 {
        return Ok(0);
    }
    let e = margin_of_error / 100.0;
    let n0 = z * z * PROPORTION_VARIANCE / (e * e);
    let corrected = n0 / (1.0 + (n0 - 1.0) / population as f64);
    // A margin small enough to underflow `e * e` demands the whole population.
    if !n0.is_finite() || !corrected.is_finite() {
        return Ok(population);
    }
    let n = corrected.ceil().max(1.0);
    if n >= population as f64 {
        return Ok(population);
    }
    Ok(n as usize)
}
