//! Sample-size design for a two-proportion experiment.
//!
//! Computes the minimum per-arm sample size needed to detect a minimum
//! detectable effect (MDE) at a two-sided significance level `alpha` with a
//! Type-II error target `beta_error`:
//!
//! ```text
//! n = ceil( (|z_{α/2}|·sqrt(2·var0) + |z_β|·sqrt(var0 + var1))² / mde² )
//! ```
//!
//! with `var0 = p0(1−p0)` and `var1 = p1(1−p1)` for `p1 = p0 + mde`.
//!
//! Independent of the generator; pure arithmetic over the inputs.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::ConfigError;

/// Convention for the power term's normal quantile.
///
/// Historically the formula evaluates the quantile at the raw Type-II error
/// value `β` rather than at its complement `1 − β`. Because the formula
/// takes absolute values and the standard normal is symmetric,
/// `|z_β| = |z_{1−β}|` and both conventions produce identical sample sizes;
/// the switch exists to make the convention explicit rather than to change
/// the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerQuantile {
    /// Evaluate the quantile at `beta_error` directly (historical form).
    #[default]
    RawBetaError,
    /// Evaluate the quantile at `1 − beta_error` (textbook form).
    Complement,
}

/// Minimum per-arm sample size detecting `mde` at significance `alpha`
/// (two-sided) and Type-II error target `beta_error`, using the historical
/// [`PowerQuantile::RawBetaError`] convention.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroMde`] when `mde == 0` (the formula divides by
/// `mde²`), and [`ConfigError::ProbabilityOutOfRange`] when `p0`, `alpha`,
/// `beta_error`, or the derived `p0 + mde` falls outside `(0, 1)`.
///
/// # Example
///
/// ```
/// let n = absim::design_sample_size(0.05, 0.2, 0.05, 0.2).unwrap();
/// assert_eq!(n, 1031);
/// ```
pub fn design_sample_size(
    mde: f64,
    p0: f64,
    alpha: f64,
    beta_error: f64,
) -> Result<u64, ConfigError> {
    design_sample_size_with(mde, p0, alpha, beta_error, PowerQuantile::default())
}

/// [`design_sample_size`] with an explicit power-quantile convention.
///
/// # Errors
///
/// Same contract as [`design_sample_size`].
pub fn design_sample_size_with(
    mde: f64,
    p0: f64,
    alpha: f64,
    beta_error: f64,
    convention: PowerQuantile,
) -> Result<u64, ConfigError> {
    if mde == 0.0 || !mde.is_finite() {
        return Err(ConfigError::ZeroMde);
    }
    check_probability("p0", p0)?;
    check_probability("alpha", alpha)?;
    check_probability("beta_error", beta_error)?;
    let p1 = p0 + mde;
    check_probability("p0 + mde", p1)?;

    let var0 = p0 * (1.0 - p0);
    let var1 = p1 * (1.0 - p1);

    let std_normal = Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
    // Both quantiles come out negative at the usual arguments; the formula
    // is defined over their absolute values.
    let z_a = std_normal.inverse_cdf(alpha / 2.0).abs();
    let z_b = match convention {
        PowerQuantile::RawBetaError => std_normal.inverse_cdf(beta_error).abs(),
        PowerQuantile::Complement => std_normal.inverse_cdf(1.0 - beta_error).abs(),
    };

    let numerator = (z_a * (2.0 * var0).sqrt() + z_b * (var0 + var1).sqrt()).powi(2);
    Ok((numerator / (mde * mde)).ceil() as u64)
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}
