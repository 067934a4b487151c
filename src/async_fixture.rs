//! Asynchronous performance fixture
//!
//! Mirrors the synchronous fixture with cooperative suspension in place of
//! thread blocking: the profiler awaits the callable instead of blocking on
//! it, and the remaining iterations run either as a concurrent fan-out
//! (the default) or as a sequential awaited loop. The threshold checks and
//! the aggregation are shared with the synchronous engine.

use std::future::Future;
use std::time::Duration;

use futures::future;

use crate::comparator::compare_to_target;
use crate::error::{CheckError, PerfError, Result};
use crate::fixture::FixtureState;
use crate::profiler::profile_async;
use crate::settings::{Settings, SKIP_MESSAGE};
use crate::stats::MeasurementRun;
use crate::target::{Options, PerfTarget};
use crate::unit::{registry, Quantity};

/// Asynchronous measurement fixture
///
/// Single-threaded cooperative scheduling; suspension occurs at each awaited
/// invocation. No thread is ever blocked for the duration of a call.
#[derive(Debug, Default)]
pub struct AsyncPerfFixture {}

impl AsyncPerfFixture {
    /// Create a fixture directly, bypassing the skip configuration
    pub fn new() -> Self {
        Self {}
    }

    /// Measure an async callable against a performance target
    ///
    /// The first invocation is awaited on its own and checked against the
    /// target (fail-fast), then the remaining `iterations - 1` invocations
    /// run and the mean of all durations is checked. Returns the first
    /// invocation's result.
    ///
    /// With `parallel = true` (the default) the remaining invocations are
    /// all dispatched before any is awaited to completion, interleaving
    /// their suspensions on the scheduler. A duration measured this way can
    /// include time the task spent scheduled but not running when the
    /// scheduler is saturated; that inflation is an accepted measurement
    /// limitation of the concurrent mode, not corrected for. Only use the
    /// default when overlapping instances of the callable are safe.
    ///
    /// With `parallel = false` each invocation is awaited fully before the
    /// next starts.
    ///
    /// # Errors
    ///
    /// [`PerfError::UnitParse`], [`PerfError::TooSlow`], or
    /// [`PerfError::Timedout`] when a watchdog is configured and expires.
    pub async fn measure<F, Fut, R>(&self, func_name: &str, opts: Options, mut func: F) -> Result<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = R>,
    {
        let target = PerfTarget::resolve(&opts, registry())?;
        tracing::debug!(
            func = func_name,
            iterations = target.iterations.get(),
            parallel = target.parallel,
            "profiling asynchronous callable"
        );

        let (result, first) = invoke(func_name, func(), target.watchdog).await?;
        compare_to_target(func_name, Quantity::from_duration(first), &target)?;

        let mut run = MeasurementRun::with_first(first);
        let remaining = target.iterations.get() - 1;
        if target.parallel {
            let mut laps = Vec::with_capacity(remaining as usize);
            for _ in 0..remaining {
                laps.push(lap(func_name, func(), target.watchdog));
            }
            run.extend(future::try_join_all(laps).await?);
        } else {
            for _ in 0..remaining {
                let (_, sample) = invoke(func_name, func(), target.watchdog).await?;
                run.record(sample);
            }
        }
        compare_to_target(func_name, Quantity::from_duration(run.mean()), &target)?;

        Ok(result)
    }

    /// Measure a fallible async callable against a performance target
    ///
    /// Identical to [`Self::measure`], except the callable resolves to a
    /// `Result`. The first `Err` propagates unmodified and aborts the run:
    /// immediately in sequential mode, and via short-circuit in the
    /// concurrent fan-out. No partial averaging happens either way.
    pub async fn try_measure<F, Fut, R, E>(
        &self,
        func_name: &str,
        opts: Options,
        mut func: F,
    ) -> std::result::Result<R, CheckError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
    {
        let target = PerfTarget::resolve(&opts, registry()).map_err(CheckError::Perf)?;

        let (outcome, first) = invoke(func_name, func(), target.watchdog)
            .await
            .map_err(CheckError::Perf)?;
        let result = outcome.map_err(CheckError::Callable)?;
        compare_to_target(func_name, Quantity::from_duration(first), &target)
            .map_err(PerfError::from)?;

        let mut run = MeasurementRun::with_first(first);
        let remaining = target.iterations.get() - 1;
        if target.parallel {
            let mut laps = Vec::with_capacity(remaining as usize);
            for _ in 0..remaining {
                laps.push(try_lap(func_name, func(), target.watchdog));
            }
            run.extend(future::try_join_all(laps).await?);
        } else {
            for _ in 0..remaining {
                let (outcome, sample) = invoke(func_name, func(), target.watchdog)
                    .await
                    .map_err(CheckError::Perf)?;
                outcome.map_err(CheckError::Callable)?;
                run.record(sample);
            }
        }
        compare_to_target(func_name, Quantity::from_duration(run.mean()), &target)
            .map_err(PerfError::from)?;

        Ok(result)
    }
}

/// Await one invocation, bounded by the watchdog when one is configured
async fn invoke<Fut, R>(
    func_name: &str,
    fut: Fut,
    watchdog: Option<Duration>,
) -> Result<(R, Duration)>
where
    Fut: Future<Output = R>,
{
    match watchdog {
        None => Ok(profile_async(fut).await),
        Some(limit) => match tokio::time::timeout(limit, profile_async(fut)).await {
            Ok(profiled) => Ok(profiled),
            Err(_) => Err(PerfError::Timedout {
                func_name: func_name.to_string(),
                limit,
            }),
        },
    }
}

/// One fan-out iteration: the result is discarded, only the duration kept
async fn lap<Fut, R>(func_name: &str, fut: Fut, watchdog: Option<Duration>) -> Result<Duration>
where
    Fut: Future<Output = R>,
{
    let (_, sample) = invoke(func_name, fut, watchdog).await?;
    Ok(sample)
}

/// One fallible fan-out iteration
async fn try_lap<Fut, R, E>(
    func_name: &str,
    fut: Fut,
    watchdog: Option<Duration>,
) -> std::result::Result<Duration, CheckError<E>>
where
    Fut: Future<Output = std::result::Result<R, E>>,
{
    let (outcome, sample) = invoke(func_name, fut, watchdog)
        .await
        .map_err(CheckError::Perf)?;
    outcome.map_err(CheckError::Callable)?;
    Ok(sample)
}

/// Request the asynchronous performance fixture
///
/// Consults [`Settings::global`] once; with the skip flag set this resolves
/// to [`FixtureState::Skipped`] and the wrapped callable is never invoked.
pub fn performance_async() -> FixtureState<AsyncPerfFixture> {
    performance_async_with(Settings::global())
}

/// Request the asynchronous performance fixture with explicit settings
pub fn performance_async_with(settings: &Settings) -> FixtureState<AsyncPerfFixture> {
    if settings.skip {
        FixtureState::Skipped(SKIP_MESSAGE)
    } else {
        FixtureState::Active(AsyncPerfFixture::new())
    }
}
