//! Empirical CDF of a p-value sample.
//!
//! Turns an unordered p-value vector into a step function for calibration
//! and power inspection: the value at a chosen `alpha` is the fraction of
//! replicates significant at that level, read off without re-binning.

/// Empirical cumulative distribution function over a p-value sample.
///
/// Construction sorts the sample ascending, assigns cumulative probability
/// `(i+1)/n` to the `i`-th sorted value, and appends a terminal anchor
/// point `(1, 1)` so the curve always closes at the upper-right corner.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalCdf {
    values: Vec<f64>,
    probs: Vec<f64>,
}

impl EmpiricalCdf {
    /// Build the CDF from an unordered p-value sample.
    ///
    /// An empty sample degenerates to the single anchor point `(1, 1)`.
    pub fn new(p_vals: &[f64]) -> Self {
        let n = p_vals.len();
        let mut values = p_vals.to_vec();
        values.sort_by(|a, b| a.total_cmp(b));

        let mut probs: Vec<f64> = (0..n).map(|i| (i + 1) as f64 / n as f64).collect();
        values.push(1.0);
        probs.push(1.0);

        Self { values, probs }
    }

    /// Sorted p-values, terminated by the `1.0` anchor.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Cumulative probabilities aligned with [`values`](Self::values),
    /// terminated by the `1.0` anchor.
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Evaluate the CDF at `x` with linear interpolation between adjacent
    /// sorted values.
    ///
    /// Returns `0` below the smallest sample value and `1` at or above the
    /// largest.
    pub fn query(&self, x: f64) -> f64 {
        let first = self.values[0];
        let last = *self.values.last().expect("anchor point always present");
        if x < first {
            return 0.0;
        }
        if x >= last {
            return 1.0;
        }

        // First index whose value exceeds x; at least 1 since x >= first,
        // and duplicates equal to x all land on the left of the cut.
        let i = self.values.partition_point(|v| *v <= x);
        let (v0, p0) = (self.values[i - 1], self.probs[i - 1]);
        let (v1, p1) = (self.values[i], self.probs[i]);
        p0 + (x - v0) / (v1 - v0) * (p1 - p0)
    }

    /// Fraction of replicates significant at level `alpha`.
    ///
    /// Shorthand for [`query`](Self::query) — the CDF of p-values at
    /// `alpha` is exactly the rejection rate.
    pub fn fraction_significant(&self, alpha: f64) -> f64 {
        self.query(alpha)
    }
}
