//! Single-invocation wall-clock profiling
//!
//! Both profilers measure from immediately before invocation to immediately
//! after return with [`std::time::Instant`], a monotonic source. Precision
//! at the sub-millisecond level is adequate for threshold checks; no
//! sub-microsecond accuracy is claimed.

use std::time::{Duration, Instant};

#[cfg(feature = "async")]
use std::future::Future;

/// Execute a callable exactly once, blocking the calling thread, and return
/// its result together with the elapsed wall-clock duration
pub fn profile<R>(func: impl FnOnce() -> R) -> (R, Duration) {
    let start = Instant::now();
    let result = func();
    (result, start.elapsed())
}

/// Await a future to completion and return its output together with the
/// elapsed wall-clock duration
///
/// The clock starts at this wrapper's first poll. When many of these are
/// driven concurrently on one scheduler, an individual measurement can
/// include time the task spent scheduled but not running; see
/// [`crate::async_fixture::AsyncPerfFixture::measure`].
#[cfg(feature = "async")]
pub async fn profile_async<R>(fut: impl Future<Output = R>) -> (R, Duration) {
    let start = Instant::now();
    let result = fut.await;
    (result, start.elapsed())
}
