//! Error surface for performance checks
//!
//! Every failure mode surfaces synchronously to the test body that invoked
//! the fixture. Nothing is logged-and-swallowed, retried, or suppressed; the
//! skip path is an outcome, not an error, and lives in
//! [`crate::fixture::FixtureState`].

use std::time::Duration;

use thiserror::Error;

use crate::unit::Quantity;

/// Result type for fixture and resolver operations
pub type Result<T> = std::result::Result<T, PerfError>;

/// A measured execution time exceeded its target
///
/// Carries the callable's name and both quantities expressed in the target's
/// unit. The message is exactly three lines; the actual measurement is
/// rendered to 5 decimal places.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "Function \"{func_name}\" too slow!\nExpected execution time: {expected}\nActual execution time: {actual:.5}"
)]
pub struct PerformanceFailure {
    /// Name of the callable under measurement
    pub func_name: String,
    /// The resolved threshold
    pub expected: Quantity,
    /// The measurement, converted to the threshold's unit
    pub actual: Quantity,
}

impl PerformanceFailure {
    /// Construct a failure from a callable name and both quantities
    pub fn new(func_name: impl Into<String>, expected: Quantity, actual: Quantity) -> Self {
        Self {
            func_name: func_name.into(),
            expected,
            actual,
        }
    }
}

/// Errors produced by the performance fixtures
#[derive(Error, Debug)]
pub enum PerfError {
    /// The unit expression was not a recognized time unit
    #[error("unrecognized time unit expression: {expr:?}")]
    UnitParse {
        /// The offending expression, verbatim
        expr: String,
    },

    /// The measured time exceeded the target
    #[error(transparent)]
    TooSlow(#[from] PerformanceFailure),

    /// The watchdog expired before an awaited invocation completed
    #[error("Function \"{func_name}\" exceeded the {limit:?} watchdog")]
    Timedout {
        /// Name of the callable under measurement
        func_name: String,
        /// The configured watchdog limit
        limit: Duration,
    },
}

/// Error from a fallible-callable measurement (`try_measure`)
///
/// Either a check failure from the fixture itself or the callable's own
/// error, passed through unmodified. A callable error aborts the remaining
/// iterations; there is no partial averaging.
#[derive(Error, Debug)]
pub enum CheckError<E> {
    /// Unit resolution, threshold, or watchdog failure
    #[error(transparent)]
    Perf(#[from] PerfError),

    /// Error returned by the callable itself
    #[error("{0}")]
    Callable(E),
}
