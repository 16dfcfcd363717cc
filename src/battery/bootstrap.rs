//! Poisson-weighted bootstrap of the weighted rate difference.
//!
//! Approximates user-level resampling by drawing integer Poisson(1)
//! weights: for each bootstrap replicate, every user's contribution is
//! scaled by an independent weight, which matches multinomial resampling in
//! distribution while keeping the whole evaluation a dense matrix product.
//! The per-run loop is required — each run draws its own weight matrix —
//! but within a run all `n_bootstrap` replicates are evaluated in one
//! multiplication, which keeps replicate counts in the hundreds to
//! thousands tractable.
//!
//! With the `parallel` feature, runs are evaluated on the rayon pool. Each
//! run owns a counter-seeded RNG stream, so p-values are reproducible and
//! land at their run index regardless of scheduling.

use nalgebra::{DMatrix, RowDVector};
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};
use rand_xoshiro::Xoshiro256PlusPlus;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::generator::SimulatedBatch;

/// P-value per run of the two-sided Poisson bootstrap test.
///
/// # Panics
///
/// Panics if `n_bootstrap` is zero.
pub(super) fn poisson_bootstrap(
    batch: &SimulatedBatch,
    n_bootstrap: usize,
    seed: u64,
) -> Vec<f64> {
    assert!(n_bootstrap > 0, "n_bootstrap must be at least 1");

    #[cfg(feature = "parallel")]
    {
        (0..batch.n_runs())
            .into_par_iter()
            .map(|r| bootstrap_run(batch, r, n_bootstrap, counter_rng_seed(seed, r as u64)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..batch.n_runs())
            .map(|r| bootstrap_run(batch, r, n_bootstrap, counter_rng_seed(seed, r as u64)))
            .collect()
    }
}

/// Evaluate all bootstrap replicates for one run.
fn bootstrap_run(batch: &SimulatedBatch, run: usize, n_bootstrap: usize, seed: u64) -> f64 {
    let n_users = batch.n_users();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let views_0 = row_as_f64(&batch.views_0, run);
    let views_1 = row_as_f64(&batch.views_1, run);

    // Weighted click totals per user: ctr_hat · views = (clicks/views) · views.
    let weighted_0 = ctr_hat_times_views(&batch.clicks_0, &batch.views_0, run);
    let weighted_1 = ctr_hat_times_views(&batch.clicks_1, &batch.views_1, run);

    // One fresh weight matrix per run, shared by both arms so each
    // replicate resamples the same pseudo-population.
    let poisson = Poisson::<f64>::new(1.0).expect("unit mean is a valid Poisson parameter");
    let weights = DMatrix::<f64>::from_fn(n_users, n_bootstrap, |_, _| {
        poisson.sample(&mut rng).floor()
    });

    // Dense products collapse every replicate's per-arm totals at once.
    let values_0 = &weighted_0 * &weights;
    let totals_0 = &views_0 * &weights;
    let values_1 = &weighted_1 * &weights;
    let totals_1 = &views_1 * &weights;

    let mut below_zero = 0_usize;
    for j in 0..n_bootstrap {
        let delta = values_1[j] / totals_1[j] - values_0[j] / totals_0[j];
        if delta < 0.0 {
            below_zero += 1;
        }
    }

    2.0 * below_zero.min(n_bootstrap - below_zero) as f64 / n_bootstrap as f64
}

fn row_as_f64(matrix: &DMatrix<u64>, run: usize) -> RowDVector<f64> {
    RowDVector::from_iterator(matrix.ncols(), matrix.row(run).iter().map(|&v| v as f64))
}

fn ctr_hat_times_views(
    clicks: &DMatrix<u64>,
    views: &DMatrix<u64>,
    run: usize,
) -> RowDVector<f64> {
    RowDVector::from_iterator(
        clicks.ncols(),
        clicks
            .row(run)
            .iter()
            .zip(views.row(run).iter())
            .map(|(&c, &v)| (c as f64 / v as f64) * v as f64),
    )
}

/// Derive a well-distributed per-run seed from a base seed and a counter.
///
/// SplitMix64 finalizer; adjacent counters map to statistically independent
/// seeds, giving each run its own stream without any shared RNG state.
fn counter_rng_seed(seed: u64, counter: u64) -> u64 {
    let mut z = seed ^ counter.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
