//! Two-sample t-tests on per-user outcomes.
//!
//! Both variants share the same machinery: a two-sided, pooled-variance
//! (equal-variance) independent two-sample t-test applied per run, arm 0
//! against arm 1. [`t_test_clicks`] tests raw click counts;
//! [`t_test_ctr`] first reduces each user to their empirical rate
//! `clicks / views` and tests those ratios instead.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::generator::SimulatedBatch;

/// P-value per run of the t-test on raw per-user click counts.
pub(super) fn t_test_clicks(batch: &SimulatedBatch) -> Vec<f64> {
    (0..batch.n_runs())
        .map(|r| {
            let a: Vec<f64> = batch.clicks_0.row(r).iter().map(|&c| c as f64).collect();
            let b: Vec<f64> = batch.clicks_1.row(r).iter().map(|&c| c as f64).collect();
            pooled_t_test(&a, &b)
        })
        .collect()
}

/// P-value per run of the t-test on per-user empirical rates.
///
/// The ratio `clicks / views` is well-defined for every cell because the
/// generator guarantees `views ≥ 1`.
pub(super) fn t_test_ctr(batch: &SimulatedBatch) -> Vec<f64> {
    (0..batch.n_runs())
        .map(|r| {
            let a: Vec<f64> = batch
                .clicks_0
                .row(r)
                .iter()
                .zip(batch.views_0.row(r).iter())
                .map(|(&c, &v)| c as f64 / v as f64)
                .collect();
            let b: Vec<f64> = batch
                .clicks_1
                .row(r)
                .iter()
                .zip(batch.views_1.row(r).iter())
                .map(|(&c, &v)| c as f64 / v as f64)
                .collect();
            pooled_t_test(&a, &b)
        })
        .collect()
}

/// Two-sided pooled-variance two-sample t-test.
///
/// Degrees of freedom `n0 + n1 − 2`. Degenerate inputs (fewer than two
/// observations total per side, or zero pooled variance) resolve to `1.0`
/// when the means agree and `0.0` otherwise, rather than propagating NaN.
fn pooled_t_test(a: &[f64], b: &[f64]) -> f64 {
    let n0 = a.len() as f64;
    let n1 = b.len() as f64;
    let df = n0 + n1 - 2.0;
    if df < 1.0 {
        return 1.0;
    }

    let mean_a = a.iter().sum::<f64>() / n0;
    let mean_b = b.iter().sum::<f64>() / n1;

    let ss = |xs: &[f64], mean: f64| xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
    let pooled_var = (ss(a, mean_a) + ss(b, mean_b)) / df;
    let se = (pooled_var * (1.0 / n0 + 1.0 / n1)).sqrt();

    if se == 0.0 {
        return if mean_a == mean_b { 1.0 } else { 0.0 };
    }

    let t = (mean_a - mean_b) / se;
    let dist = StudentsT::new(0.0, 1.0, df).expect("df >= 1 checked above");
    (2.0 * dist.cdf(-t.abs())).clamp(0.0, 1.0)
}
