//! Mann–Whitney U test on raw per-user clicks.
//!
//! Distribution-free alternative to the t-tests, robust to the discrete,
//! right-skewed click distribution. Uses the tie-corrected normal
//! approximation with continuity correction, which is appropriate here:
//! click counts produce heavy ties, and per-arm sample sizes are in the
//! tens to thousands.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::generator::SimulatedBatch;

/// P-value per run of the two-sided Mann–Whitney U test.
pub(super) fn mann_whitney(batch: &SimulatedBatch) -> Vec<f64> {
    (0..batch.n_runs())
        .map(|r| {
            let a: Vec<f64> = batch.clicks_0.row(r).iter().map(|&c| c as f64).collect();
            let b: Vec<f64> = batch.clicks_1.row(r).iter().map(|&c| c as f64).collect();
            mann_whitney_u(&a, &b)
        })
        .collect()
}

/// Two-sided Mann–Whitney U via the tie-corrected normal approximation.
fn mann_whitney_u(a: &[f64], b: &[f64]) -> f64 {
    let n0 = a.len() as f64;
    let n1 = b.len() as f64;
    let n = n0 + n1;

    // Pool both samples, remembering membership, and sort by value.
    let mut pooled: Vec<(f64, bool)> = a
        .iter()
        .map(|&x| (x, true))
        .chain(b.iter().map(|&x| (x, false)))
        .collect();
    pooled.sort_by(|x, y| x.0.total_cmp(&y.0));

    // Midranks over tie groups; accumulate Σ(t³ − t) for the variance
    // correction while walking the groups.
    let mut rank_sum_a = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < pooled.len() {
        let mut j = i;
        while j < pooled.len() && pooled[j].0 == pooled[i].0 {
            j += 1;
        }
        let t = (j - i) as f64;
        // Average of 1-based ranks i+1 ..= j.
        let midrank = (i + 1 + j) as f64 / 2.0;
        for item in &pooled[i..j] {
            if item.1 {
                rank_sum_a += midrank;
            }
        }
        tie_term += t * t * t - t;
        i = j;
    }

    let u = rank_sum_a - n0 * (n0 + 1.0) / 2.0;
    let mean = n0 * n1 / 2.0;
    let var = n0 * n1 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if var <= 0.0 {
        // Every pooled value identical: no ordering information at all.
        return 1.0;
    }

    // Continuity correction shrinks the statistic half a step toward the
    // mean before standardizing.
    let d = u - mean;
    let z = (d - 0.5 * d.signum()) / var.sqrt();
    let std_normal = Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
    (2.0 * (1.0 - std_normal.cdf(z.abs()))).clamp(0.0, 1.0)
}
