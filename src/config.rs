//! Experiment configuration: the immutable parameter bundle driving the
//! hierarchical data generator.
//!
//! Two configs with identical fields are semantically interchangeable; the
//! type derives `PartialEq` and serde traits so external callers can use it
//! as a cache key.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters of the hierarchical two-arm experiment model.
///
/// The generator draws, independently per arm/run/user:
///
/// ```text
/// Views  ~ floor(exp(Normal(1, dispersion))) + 1
/// CTR    ~ Beta(m·concentration/(1−m), concentration)
/// Clicks ~ Binomial(Views, CTR)
/// ```
///
/// where the arm mean `m` is [`base_ctr`](Self::base_ctr) for control and
/// `base_ctr + uplift` for treatment.
///
/// All range checks happen eagerly in [`ExperimentConfig::new`]; a
/// constructed config is always valid and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Mean click-through rate of the control arm, in `(0, 1)`.
    base_ctr: f64,
    /// Signed CTR change of the treatment arm; `base_ctr + uplift` must
    /// stay in `(0, 1)`. Zero configures an A/A test.
    uplift: f64,
    /// Beta-distribution concentration controlling within-arm heterogeneity
    /// of per-user rates. Larger values concentrate users around the arm
    /// mean. Must be positive.
    ///
    /// Unrelated to the design formula's Type-II error rate, which is also
    /// historically called "beta" — the two are deliberately kept as
    /// distinct, independently named fields.
    concentration: f64,
    /// Standard deviation of the log-traffic distribution, controlling the
    /// spread of per-user view counts. Must be positive.
    dispersion: f64,
    /// Optional expected users per calendar day. When set, the generator
    /// assigns each user a uniform day within a window sized to cover
    /// `num_users` at this rate; display-only, consumed by no test.
    traffic_per_day: Option<f64>,
}

fn check_open_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

impl ExperimentConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the offending field when `base_ctr`
    /// or `base_ctr + uplift` falls outside `(0, 1)` (either would yield a
    /// non-positive Beta shape), or when `concentration`/`dispersion` is
    /// not strictly positive.
    pub fn new(
        base_ctr: f64,
        uplift: f64,
        concentration: f64,
        dispersion: f64,
    ) -> Result<Self, ConfigError> {
        check_open_unit("base_ctr", base_ctr)?;
        check_open_unit("base_ctr + uplift", base_ctr + uplift)?;
        check_positive("concentration", concentration)?;
        check_positive("dispersion", dispersion)?;

        Ok(Self {
            base_ctr,
            uplift,
            concentration,
            dispersion,
            traffic_per_day: None,
        })
    }

    /// Attach an expected users-per-day rate for calendar-day assignment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositive`] if `rate` is not strictly
    /// positive.
    pub fn with_traffic_per_day(mut self, rate: f64) -> Result<Self, ConfigError> {
        check_positive("traffic_per_day", rate)?;
        self.traffic_per_day = Some(rate);
        Ok(self)
    }

    /// The A/A counterpart of this configuration (`uplift = 0`), used to
    /// measure false-positive calibration against the same marginals.
    pub fn null_hypothesis(&self) -> Self {
        Self {
            uplift: 0.0,
            ..self.clone()
        }
    }

    /// Mean click-through rate of the control arm.
    pub fn base_ctr(&self) -> f64 {
        self.base_ctr
    }

    /// Signed CTR change of the treatment arm.
    pub fn uplift(&self) -> f64 {
        self.uplift
    }

    /// Beta concentration of the per-user rate distribution.
    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    /// Standard deviation of the log-traffic distribution.
    pub fn dispersion(&self) -> f64 {
        self.dispersion
    }

    /// Configured users-per-day rate, if any.
    pub fn traffic_per_day(&self) -> Option<f64> {
        self.traffic_per_day
    }

    /// Target mean rates `(control, treatment)`.
    pub fn arm_means(&self) -> (f64, f64) {
        (self.base_ctr, self.base_ctr + self.uplift)
    }
}
