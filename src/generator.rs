//! Hierarchical data generator for simulated two-arm experiments.
//!
//! Each call produces `n_runs` independent replications of an experiment
//! with `num_users` users per arm, drawn from the three-level model
//! described on [`ExperimentConfig`]. Every cell of every matrix is an
//! explicit independent draw over the full `[n_runs, n_users]` grid; there
//! is no broadcasting shortcut and no hidden global generator.

use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Beta, Binomial, Distribution, Normal};

use crate::config::ExperimentConfig;
use crate::error::{ConfigError, ShapeError};

/// One simulated batch: `n_runs` independent replications of a two-arm
/// experiment, arm `0` (control) and arm `1` (treatment).
///
/// All matrices share the exact shape `[n_runs, n_users]`, even when
/// `n_runs == 1` — downstream consumers index batches by run number
/// uniformly, so the run axis is never squeezed away. A batch is produced
/// fresh per [`generate`] call and never mutated after return.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedBatch {
    /// Per-user view counts in the control arm, every entry ≥ 1.
    pub views_0: DMatrix<u64>,
    /// Per-user view counts in the treatment arm, every entry ≥ 1.
    pub views_1: DMatrix<u64>,
    /// Latent per-user click-through rates in the control arm, in `[0, 1)`.
    pub ctr_0: DMatrix<f64>,
    /// Latent per-user click-through rates in the treatment arm, in `[0, 1)`.
    pub ctr_1: DMatrix<f64>,
    /// Per-user click counts in the control arm, `clicks ≤ views` cellwise.
    pub clicks_0: DMatrix<u64>,
    /// Per-user click counts in the treatment arm, `clicks ≤ views` cellwise.
    pub clicks_1: DMatrix<u64>,
    /// Calendar day per user, present only when the config carries a
    /// `traffic_per_day` rate. Time-series display only; no battery test
    /// consumes it.
    pub days: Option<DMatrix<u32>>,
}

impl SimulatedBatch {
    /// Number of replications in this batch.
    pub fn n_runs(&self) -> usize {
        self.views_0.nrows()
    }

    /// Number of users per arm in each replication.
    pub fn n_users(&self) -> usize {
        self.views_0.ncols()
    }

    /// Verify that every field shares the shape of `views_0`.
    ///
    /// Batches built by [`generate`] always pass; the check exists for
    /// hand-assembled batches, which every battery test runs through before
    /// touching the data.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] naming the first field whose dimensions
    /// disagree.
    pub fn check_shapes(&self) -> Result<(), ShapeError> {
        let (expected_runs, expected_users) = self.views_0.shape();
        let mismatch = |field: &'static str, found: (usize, usize)| ShapeError {
            field,
            expected_runs,
            expected_users,
            found_runs: found.0,
            found_users: found.1,
        };

        let int_fields = [
            ("views_1", self.views_1.shape()),
            ("clicks_0", self.clicks_0.shape()),
            ("clicks_1", self.clicks_1.shape()),
            ("ctr_0", self.ctr_0.shape()),
            ("ctr_1", self.ctr_1.shape()),
        ];
        for (field, shape) in int_fields {
            if shape != (expected_runs, expected_users) {
                return Err(mismatch(field, shape));
            }
        }
        if let Some(days) = &self.days {
            if days.shape() != (expected_runs, expected_users) {
                return Err(mismatch("days", days.shape()));
            }
        }
        Ok(())
    }
}

/// Generate a [`SimulatedBatch`] from a validated config.
///
/// Per cell, independently for each arm, run, and user:
///
/// 1. `views = floor(exp(X)) + 1` with `X ~ Normal(1, dispersion)`, which
///    guarantees `views ≥ 1` and a right-skewed traffic distribution;
/// 2. `ctr ~ Beta(m·β/(1−m), β)` moment-matched so the arm's rates average
///    to its target mean `m`;
/// 3. `clicks ~ Binomial(views, ctr)`.
///
/// Reproducibility comes entirely from the injected `rng`; seeding it
/// identically reproduces the batch bit-for-bit.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroCount`] when `num_users` or `n_runs` is zero.
/// Range violations on the config itself are impossible here: they are
/// rejected at [`ExperimentConfig::new`].
pub fn generate<R: Rng + ?Sized>(
    config: &ExperimentConfig,
    num_users: usize,
    n_runs: usize,
    rng: &mut R,
) -> Result<SimulatedBatch, ConfigError> {
    if num_users == 0 {
        return Err(ConfigError::ZeroCount { field: "num_users" });
    }
    if n_runs == 0 {
        return Err(ConfigError::ZeroCount { field: "n_runs" });
    }

    tracing::debug!(num_users, n_runs, "generating simulated batch");

    let (mean_0, mean_1) = config.arm_means();
    let beta = config.concentration();

    // Moment-matched Beta shapes: alpha = m·β/(1−m) gives E[ctr] = m.
    // Both arm means were validated into (0, 1), so the shapes are positive.
    let rate_0 = Beta::new(mean_0 * beta / (1.0 - mean_0), beta)
        .expect("arm mean validated in (0, 1) and concentration positive");
    let rate_1 = Beta::new(mean_1 * beta / (1.0 - mean_1), beta)
        .expect("arm mean validated in (0, 1) and concentration positive");

    let log_traffic =
        Normal::new(1.0, config.dispersion()).expect("dispersion validated positive");

    let draw_views = |rng: &mut R| -> u64 {
        let x: f64 = log_traffic.sample(rng);
        // exp() can overflow to infinity for extreme dispersion; the cast
        // saturates and the +1 must not wrap.
        (x.exp().floor() as u64).saturating_add(1)
    };

    let views_0 = DMatrix::from_fn(n_runs, num_users, |_, _| draw_views(&mut *rng));
    let views_1 = DMatrix::from_fn(n_runs, num_users, |_, _| draw_views(&mut *rng));

    let ctr_0 = DMatrix::from_fn(n_runs, num_users, |_, _| rate_0.sample(rng));
    let ctr_1 = DMatrix::from_fn(n_runs, num_users, |_, _| rate_1.sample(rng));

    let draw_clicks = |views: &DMatrix<u64>, ctr: &DMatrix<f64>, rng: &mut R| {
        DMatrix::from_fn(n_runs, num_users, |r, u| {
            Binomial::new(views[(r, u)], ctr[(r, u)])
                .expect("views >= 1 and ctr in [0, 1] by construction")
                .sample(rng)
        })
    };
    let clicks_0 = draw_clicks(&views_0, &ctr_0, &mut *rng);
    let clicks_1 = draw_clicks(&views_1, &ctr_1, &mut *rng);

    // Calendar-day assignment for time-series display. The window is sized
    // so `num_users` arrive at the configured daily rate.
    let days = config.traffic_per_day().map(|rate| {
        let window = (num_users as f64 / rate).ceil().max(1.0) as u32;
        DMatrix::from_fn(n_runs, num_users, |_, _| rng.gen_range(0..window))
    });

    Ok(SimulatedBatch {
        views_0,
        views_1,
        ctr_0,
        ctr_1,
        clicks_0,
        clicks_1,
        days,
    })
}
