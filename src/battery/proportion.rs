//! Pooled two-proportion z-test on run-level totals.
//!
//! Aggregates clicks and views to run-level totals per arm and tests the
//! difference of the two global rates under the pooled null rate. This is
//! the classical test the sample-size designer is built around.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::generator::SimulatedBatch;

/// P-value per run of the two-sided pooled two-proportion z-test.
pub(super) fn pooled_z(batch: &SimulatedBatch) -> Vec<f64> {
    let std_normal = Normal::new(0.0, 1.0).expect("standard normal parameters are valid");

    (0..batch.n_runs())
        .map(|r| {
            let clicks_0: f64 = batch.clicks_0.row(r).iter().map(|&c| c as f64).sum();
            let clicks_1: f64 = batch.clicks_1.row(r).iter().map(|&c| c as f64).sum();
            let views_0: f64 = batch.views_0.row(r).iter().map(|&v| v as f64).sum();
            let views_1: f64 = batch.views_1.row(r).iter().map(|&v| v as f64).sum();

            let rate_0 = clicks_0 / views_0;
            let rate_1 = clicks_1 / views_1;

            let pooled = (clicks_0 + clicks_1) / (views_0 + views_1);
            let se = (pooled * (1.0 - pooled) * (1.0 / views_0 + 1.0 / views_1)).sqrt();
            if se == 0.0 {
                // Pooled rate of exactly 0 or 1: both arms degenerate and
                // indistinguishable.
                return 1.0;
            }

            let z = (rate_0 - rate_1) / se;
            2.0 * std_normal.cdf(z).min(1.0 - std_normal.cdf(z))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    /// Batch with explicit totals; CTR matrices are irrelevant to this test
    /// but must keep the shared shape.
    fn batch_from_counts(clicks_0: &[u64], clicks_1: &[u64], views: u64) -> SimulatedBatch {
        let n = clicks_0.len();
        SimulatedBatch {
            views_0: DMatrix::from_element(1, n, views),
            views_1: DMatrix::from_element(1, n, views),
            ctr_0: DMatrix::zeros(1, n),
            ctr_1: DMatrix::zeros(1, n),
            clicks_0: DMatrix::from_row_slice(1, n, clicks_0),
            clicks_1: DMatrix::from_row_slice(1, n, clicks_1),
            days: None,
        }
    }

    #[test]
    fn equal_rates_do_not_reject() {
        let batch = batch_from_counts(&[1, 0, 1, 0, 1, 0], &[0, 1, 0, 1, 0, 1], 10);
        let p = pooled_z(&batch)[0];
        assert!((p - 1.0).abs() < 1e-9, "got {p}");
    }

    #[test]
    fn strongly_separated_rates_reject() {
        let clicks_0 = vec![0_u64; 50];
        let clicks_1 = vec![8_u64; 50];
        let batch = batch_from_counts(&clicks_0, &clicks_1, 10);
        let p = pooled_z(&batch)[0];
        assert!(p < 1e-6, "got {p}");
    }

    #[test]
    fn invariant_under_arm_swap() {
        let clicks_0 = [3, 0, 1, 2, 0, 4, 1, 0];
        let clicks_1 = [1, 1, 0, 5, 2, 0, 0, 3];
        let forward = pooled_z(&batch_from_counts(&clicks_0, &clicks_1, 20))[0];
        let swapped = pooled_z(&batch_from_counts(&clicks_1, &clicks_0, 20))[0];
        assert!((forward - swapped).abs() < 1e-12);
    }

    #[test]
    fn degenerate_zero_click_batch_is_inconclusive() {
        let batch = batch_from_counts(&[0, 0, 0], &[0, 0, 0], 5);
        assert_eq!(pooled_z(&batch)[0], 1.0);
    }
}
