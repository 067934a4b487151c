//! Synchronous performance fixture
//!
//! The fixture is the single entry point a test interacts with. One
//! `measure` call resolves the target once, profiles the first invocation,
//! applies the fail-fast check, runs the remaining iterations in a strict
//! sequential loop, applies the mean check, and hands back the first
//! invocation's own result. Iterations 2..N exist purely for timing
//! statistics; their return values are discarded.
//!
//! Fixture construction goes through [`performance`], which consults the
//! process-wide skip configuration exactly once. When checks are disabled
//! the request resolves to [`FixtureState::Skipped`] and no callable is
//! ever invoked.

use crate::comparator::compare_to_target;
use crate::error::{CheckError, Result};
use crate::profiler::profile;
use crate::settings::{Settings, SKIP_MESSAGE};
use crate::stats::MeasurementRun;
use crate::target::{Options, PerfTarget};
use crate::unit::{registry, Quantity};

/// Outcome of a fixture request
///
/// Skipping is a deliberate, successful no-op outcome, distinct from every
/// error the fixture can produce.
#[derive(Debug)]
pub enum FixtureState<T> {
    /// Checks are enabled; here is the fixture
    Active(T),
    /// Checks are disabled for this run, with the fixed skip message
    Skipped(&'static str),
}

impl<T> FixtureState<T> {
    /// The fixture, if checks are enabled
    pub fn into_active(self) -> Option<T> {
        match self {
            FixtureState::Active(fixture) => Some(fixture),
            FixtureState::Skipped(_) => None,
        }
    }

    /// Whether this request resolved to a skip
    pub fn is_skipped(&self) -> bool {
        matches!(self, FixtureState::Skipped(_))
    }
}

/// Synchronous measurement fixture
///
/// Single-threaded and fully blocking: iteration k+1 never begins before
/// iteration k's duration has been recorded.
#[derive(Debug, Default)]
pub struct PerfFixture {}

impl PerfFixture {
    /// Create a fixture directly, bypassing the skip configuration
    pub fn new() -> Self {
        Self {}
    }

    /// Measure a callable against a performance target
    ///
    /// Runs the callable `iterations` times total. The first invocation is
    /// checked against the target on its own (bounding worst-case total run
    /// time when the callable is far over budget), then the mean of all
    /// invocations is checked. Returns the first invocation's result.
    ///
    /// A panic in the callable propagates unmodified and aborts the
    /// remaining iterations.
    ///
    /// # Errors
    ///
    /// [`crate::error::PerfError::UnitParse`] if the target unit does not
    /// resolve; [`crate::error::PerfError::TooSlow`] if either check fails.
    pub fn measure<F, R>(&self, func_name: &str, opts: Options, mut func: F) -> Result<R>
    where
        F: FnMut() -> R,
    {
        let target = PerfTarget::resolve(&opts, registry())?;
        tracing::debug!(
            func = func_name,
            iterations = target.iterations.get(),
            "profiling synchronous callable"
        );

        // First invocation doubles as the fail-fast estimate
        let (result, first) = profile(&mut func);
        compare_to_target(func_name, Quantity::from_duration(first), &target)?;

        let mut run = MeasurementRun::with_first(first);
        for _ in 1..target.iterations.get() {
            let (_, sample) = profile(&mut func);
            run.record(sample);
        }
        compare_to_target(func_name, Quantity::from_duration(run.mean()), &target)?;

        Ok(result)
    }

    /// Measure a fallible callable against a performance target
    ///
    /// Identical to [`Self::measure`], except the callable returns a
    /// `Result`. An `Err` at any iteration propagates unmodified and aborts
    /// the run immediately; a single broken iteration invalidates the whole
    /// measurement.
    pub fn try_measure<F, R, E>(
        &self,
        func_name: &str,
        opts: Options,
        mut func: F,
    ) -> std::result::Result<R, CheckError<E>>
    where
        F: FnMut() -> std::result::Result<R, E>,
    {
        let target = PerfTarget::resolve(&opts, registry()).map_err(CheckError::Perf)?;

        let (outcome, first) = profile(&mut func);
        let result = outcome.map_err(CheckError::Callable)?;
        compare_to_target(func_name, Quantity::from_duration(first), &target)
            .map_err(crate::error::PerfError::from)?;

        let mut run = MeasurementRun::with_first(first);
        for _ in 1..target.iterations.get() {
            let (outcome, sample) = profile(&mut func);
            outcome.map_err(CheckError::Callable)?;
            run.record(sample);
        }
        compare_to_target(func_name, Quantity::from_duration(run.mean()), &target)
            .map_err(crate::error::PerfError::from)?;

        Ok(result)
    }
}

/// Request the synchronous performance fixture
///
/// Consults [`Settings::global`] once; with the skip flag set this resolves
/// to [`FixtureState::Skipped`] and the wrapped callable is never invoked.
pub fn performance() -> FixtureState<PerfFixture> {
    performance_with(Settings::global())
}

/// Request the synchronous performance fixture with explicit settings
pub fn performance_with(settings: &Settings) -> FixtureState<PerfFixture> {
    if settings.skip {
        FixtureState::Skipped(SKIP_MESSAGE)
    } else {
        FixtureState::Active(PerfFixture::new())
    }
}

/// Resolve a performance fixture inside a test body, returning early from
/// the test when checks are disabled
///
/// ```no_run
/// fn test_fast_path() {
///     let perf = medir::performance_fixture!();
///     let value = perf
///         .measure("fast_path", medir::Options::default(), || 1)
///         .unwrap();
///     assert_eq!(value, 1);
/// }
/// ```
///
/// `performance_fixture!(async)` resolves the asynchronous fixture the same
/// way (requires the `async` feature).
#[macro_export]
macro_rules! performance_fixture {
    () => {
        match $crate::fixture::performance() {
            $crate::fixture::FixtureState::Active(fixture) => fixture,
            $crate::fixture::FixtureState::Skipped(reason) => {
                eprintln!("{reason}");
                return;
            }
        }
    };
    (async) => {
        match $crate::async_fixture::performance_async() {
            $crate::fixture::FixtureState::Active(fixture) => fixture,
            $crate::fixture::FixtureState::Skipped(reason) => {
                eprintln!("{reason}");
                return;
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PerfError;
    use crate::unit::TimeUnit;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_instant_callable_passes_with_defaults() {
        let fixture = PerfFixture::new();
        let value = fixture.measure("foo", Options::default(), || 1).unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn test_invocation_count_matches_iterations() {
        let fixture = PerfFixture::new();
        let mut calls = 0u32;
        fixture
            .measure("counted", Options::new().iterations(25), || calls += 1)
            .unwrap();
        assert_eq!(calls, 25);
    }

    #[test]
    fn test_returns_first_invocation_result() {
        let fixture = PerfFixture::new();
        let mut call = 0u32;
        let value = fixture
            .measure("first_wins", Options::new().iterations(10), || {
                call += 1;
                call
            })
            .unwrap();
        assert_eq!(value, 1);
    }

    #[test]
    fn test_fail_fast_aborts_after_one_invocation() {
        let fixture = PerfFixture::new();
        let mut calls = 0u32;
        let err = fixture
            .measure(
                "sluggish",
                Options::new().target(5.0).iterations(1000),
                || {
                    calls += 1;
                    thread::sleep(Duration::from_millis(30));
                },
            )
            .unwrap_err();
        assert_eq!(calls, 1);
        assert!(matches!(err, PerfError::TooSlow(_)));
    }

    #[test]
    fn test_mean_check_fails_after_all_invocations() {
        let fixture = PerfFixture::new();
        let mut calls = 0u32;
        // First call is fast and passes the fail-fast check; the remaining
        // calls drag the mean over the target.
        let err = fixture
            .measure(
                "mean_killer",
                Options::new().target(20.0).iterations(4),
                || {
                    calls += 1;
                    if calls > 1 {
                        thread::sleep(Duration::from_millis(80));
                    }
                },
            )
            .unwrap_err();
        assert_eq!(calls, 4);
        match err {
            PerfError::TooSlow(failure) => {
                assert_eq!(failure.func_name, "mean_killer");
                assert_eq!(failure.expected.unit, TimeUnit::Millisecond);
            }
            other => panic!("expected TooSlow, got {other:?}"),
        }
    }

    #[test]
    fn test_single_iteration_runs_once() {
        let fixture = PerfFixture::new();
        let mut calls = 0u32;
        fixture
            .measure("once", Options::new().iterations(1), || calls += 1)
            .unwrap();
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_unknown_unit_surfaces_before_invocation() {
        let fixture = PerfFixture::new();
        let mut calls = 0u32;
        let err = fixture
            .measure("never_runs", Options::new().unit("fortnights"), || calls += 1)
            .unwrap_err();
        assert_eq!(calls, 0);
        assert!(matches!(err, PerfError::UnitParse { .. }));
    }

    #[test]
    fn test_try_measure_aborts_on_callable_error() {
        let fixture = PerfFixture::new();
        let mut calls = 0u32;
        let err = fixture
            .try_measure("flaky", Options::new().iterations(10), || {
                calls += 1;
                if calls == 3 {
                    Err("third call broke")
                } else {
                    Ok(calls)
                }
            })
            .unwrap_err();
        assert_eq!(calls, 3);
        assert!(matches!(err, CheckError::Callable("third call broke")));
    }

    #[test]
    fn test_try_measure_returns_first_result() {
        let fixture = PerfFixture::new();
        let mut call = 0u32;
        let value: std::result::Result<u32, CheckError<&str>> =
            fixture.try_measure("ok", Options::new().iterations(5), || {
                call += 1;
                Ok(call)
            });
        assert_eq!(value.unwrap(), 1);
    }

    #[test]
    fn test_skip_settings_produce_skipped_state() {
        let state = performance_with(&Settings { skip: true });
        assert!(state.is_skipped());
        assert!(state.into_active().is_none());
    }

    #[test]
    fn test_active_settings_produce_fixture() {
        let state = performance_with(&Settings { skip: false });
        assert!(!state.is_skipped());
        assert!(state.into_active().is_some());
    }
}
