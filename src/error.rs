//! Error types for configuration validation and batch shape checks.
//!
//! All engine failures are fatal to the call: everything downstream is a pure
//! computation, so there is nothing to retry and no partial result to return.
//! Configuration problems are surfaced eagerly, before any sampling is
//! attempted, and always name the offending field.

/// Error raised when a configuration parameter is outside its valid range.
///
/// Every probability-like parameter must lie strictly inside `(0, 1)`, and
/// every scale parameter must be strictly positive. Violations are detected
/// at construction/call time, never as a downstream numerical failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A probability-like field is outside the open interval `(0, 1)`.
    #[error("{field} must lie in the open interval (0, 1), got {value}")]
    ProbabilityOutOfRange {
        /// Name of the offending field (e.g. `base_ctr`, `base_ctr + uplift`).
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A scale parameter is zero, negative, or non-finite.
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The minimum detectable effect is zero (the design formula divides
    /// by `mde²`).
    #[error("mde must be non-zero")]
    ZeroMde,

    /// A run or user count is zero.
    #[error("{field} must be at least 1")]
    ZeroCount {
        /// Name of the offending count (`num_users` or `n_runs`).
        field: &'static str,
    },
}

/// Error raised when a batch's matrices disagree on their dimensions.
///
/// Every battery test indexes all six matrices by `[run, user]` uniformly,
/// so a single field with a divergent shape invalidates the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "batch field {field} has shape [{found_runs}, {found_users}], \
     expected [{expected_runs}, {expected_users}]"
)]
pub struct ShapeError {
    /// The batch field whose shape disagrees (e.g. `clicks_1`).
    pub field: &'static str,
    /// Expected run count (taken from `views_0`).
    pub expected_runs: usize,
    /// Expected user count (taken from `views_0`).
    pub expected_users: usize,
    /// Run count actually found on the offending field.
    pub found_runs: usize,
    /// User count actually found on the offending field.
    pub found_users: usize,
}
