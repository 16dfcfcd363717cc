//! Hypothesis-test battery and result aggregation.
//!
//! Five independent tests, each consuming a [`SimulatedBatch`] and
//! returning one two-sided p-value per run. All tests run over the same
//! batch, so their calibration and power can be compared side by side. The
//! aggregator applies a named, individually-disableable subset of the
//! battery and collects the per-test p-value vectors.

mod bootstrap;
mod proportion;
mod rank;
mod ttest;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;
use crate::generator::SimulatedBatch;

/// Default number of Poisson bootstrap replicates.
pub const DEFAULT_N_BOOTSTRAP: usize = 1000;

/// A named hypothesis test from the battery.
///
/// Every variant is a pure function of the batch (the bootstrap carries its
/// own replicate count and seed so it, too, is deterministic). Each returns
/// a `Vec<f64>` of length `n_runs` with every entry in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatteryTest {
    /// Two-sided pooled-variance t-test on raw per-user click counts.
    ClickTTest,
    /// The same t-test machinery on per-user empirical rates
    /// `clicks / views` (well-defined since `views ≥ 1` is guaranteed).
    CtrTTest,
    /// Two-sided Mann–Whitney U test on raw per-user clicks; the
    /// distribution-free alternative robust to the discrete, skewed
    /// outcome.
    MannWhitney,
    /// Pooled two-proportion z-test on run-level click/view totals.
    PooledZ,
    /// Poisson-weighted bootstrap of the weighted rate difference.
    PoissonBootstrap {
        /// Number of bootstrap replicates per run. Must be at least 1.
        n_bootstrap: usize,
        /// Seed for the per-run counter-derived RNG streams.
        seed: u64,
    },
}

impl BatteryTest {
    /// Apply this test to a batch, producing one p-value per run.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] if the batch's matrices disagree on their
    /// run/user dimensions. The check runs before any statistic is
    /// computed, so no partial result is ever produced.
    pub fn run(&self, batch: &SimulatedBatch) -> Result<Vec<f64>, ShapeError> {
        batch.check_shapes()?;
        let p_vals = match self {
            Self::ClickTTest => ttest::t_test_clicks(batch),
            Self::CtrTTest => ttest::t_test_ctr(batch),
            Self::MannWhitney => rank::mann_whitney(batch),
            Self::PooledZ => proportion::pooled_z(batch),
            Self::PoissonBootstrap { n_bootstrap, seed } => {
                bootstrap::poisson_bootstrap(batch, *n_bootstrap, *seed)
            }
        };
        debug_assert!(p_vals.iter().all(|p| (0.0..=1.0).contains(p)));
        Ok(p_vals)
    }
}

/// P-values produced by one battery test over a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// One two-sided p-value per run, each in `[0, 1]`.
    pub p_vals: Vec<f64>,
}

/// Named test configuration for [`aggregate`].
///
/// A `None` entry is an explicit opt-out: the test is skipped and its name
/// is absent from the aggregator's output.
pub type TestSuite = BTreeMap<String, Option<BatteryTest>>;

/// The canonical five-test suite under its standard names.
///
/// The bootstrap test uses [`DEFAULT_N_BOOTSTRAP`] replicates and the given
/// `seed` for its per-run RNG streams.
pub fn standard_suite(seed: u64) -> TestSuite {
    let mut suite = TestSuite::new();
    suite.insert("t_test_clicks".into(), Some(BatteryTest::ClickTTest));
    suite.insert("t_test_ctr".into(), Some(BatteryTest::CtrTTest));
    suite.insert("mann_whitney".into(), Some(BatteryTest::MannWhitney));
    suite.insert("two_proportion_z".into(), Some(BatteryTest::PooledZ));
    suite.insert(
        "poisson_bootstrap".into(),
        Some(BatteryTest::PoissonBootstrap {
            n_bootstrap: DEFAULT_N_BOOTSTRAP,
            seed,
        }),
    );
    suite
}

/// Apply every enabled test in `suite` to `batch`.
///
/// Disabled (`None`) entries are skipped and contribute no output entry.
/// Applied identically to an A/A batch (measuring calibration) and an A/B
/// batch (measuring power), so the two result maps are directly comparable
/// per test name.
///
/// # Errors
///
/// Propagates the first [`ShapeError`]; no partial map is returned.
pub fn aggregate(
    batch: &SimulatedBatch,
    suite: &TestSuite,
) -> Result<BTreeMap<String, TestResult>, ShapeError> {
    let mut results = BTreeMap::new();
    for (name, test) in suite {
        let Some(test) = test else {
            tracing::debug!(test = %name, "battery test disabled, skipping");
            continue;
        };
        let p_vals = test.run(batch)?;
        tracing::debug!(test = %name, n_runs = p_vals.len(), "battery test complete");
        results.insert(name.clone(), TestResult { p_vals });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExperimentConfig;
    use crate::generator::generate;
    use nalgebra::DMatrix;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn small_batch() -> SimulatedBatch {
        let config = ExperimentConfig::new(0.05, 0.02, 100.0, 1.0).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        generate(&config, 30, 6, &mut rng).unwrap()
    }

    #[test]
    fn every_test_returns_one_p_value_per_run() {
        let batch = small_batch();
        let tests = [
            BatteryTest::ClickTTest,
            BatteryTest::CtrTTest,
            BatteryTest::MannWhitney,
            BatteryTest::PooledZ,
            BatteryTest::PoissonBootstrap {
                n_bootstrap: 200,
                seed: 3,
            },
        ];
        for test in tests {
            let p_vals = test.run(&batch).unwrap();
            assert_eq!(p_vals.len(), batch.n_runs(), "{test:?}");
            assert!(
                p_vals.iter().all(|p| (0.0..=1.0).contains(p)),
                "{test:?} produced a p-value outside [0, 1]: {p_vals:?}"
            );
        }
    }

    #[test]
    fn mismatched_run_dimension_fails_with_shape_error() {
        let mut batch = small_batch();
        batch.ctr_1 = DMatrix::zeros(batch.n_runs() + 1, batch.n_users());

        for test in [BatteryTest::ClickTTest, BatteryTest::PooledZ] {
            let err = test.run(&batch).unwrap_err();
            assert_eq!(err.field, "ctr_1");
        }
        assert!(aggregate(&batch, &standard_suite(1)).is_err());
    }

    #[test]
    fn aggregate_skips_disabled_tests() {
        let batch = small_batch();
        let mut suite = standard_suite(5);
        suite.insert("mann_whitney".into(), None);
        suite.insert("poisson_bootstrap".into(), None);

        let results = aggregate(&batch, &suite).unwrap();
        assert!(results.contains_key("t_test_clicks"));
        assert!(results.contains_key("t_test_ctr"));
        assert!(results.contains_key("two_proportion_z"));
        assert!(!results.contains_key("mann_whitney"));
        assert!(!results.contains_key("poisson_bootstrap"));
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn aggregate_is_deterministic_for_a_fixed_batch_and_seed() {
        let batch = small_batch();
        let a = aggregate(&batch, &standard_suite(9)).unwrap();
        let b = aggregate(&batch, &standard_suite(9)).unwrap();
        assert_eq!(a, b);
    }
}
