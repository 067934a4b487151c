//! Medir - unit-aware performance assertion fixtures for Rust tests
//!
//! This library lets a test assert an upper bound on a function's execution
//! time. A fixture runs the callable repeatedly, measures wall-clock
//! duration per invocation, and checks two thresholds: the first call
//! (fail-fast) and the mean of all calls. Targets are unit-aware, so a
//! threshold written in milliseconds compares correctly against a
//! measurement taken in seconds.
//!
//! Synchronous and asynchronous callables get sibling fixtures; the async
//! fixture can fan the iterations out concurrently on the cooperative
//! scheduler or await them one at a time. The whole mechanism can be
//! disabled for a run with `--performance-skip` (or the
//! `MEDIR_PERFORMANCE_SKIP` environment variable), turning every fixture
//! request into a skip outcome.
//!
//! # Example
//!
//! ```
//! use medir::{performance_with, FixtureState, Options, Settings};
//!
//! let fixture = match performance_with(&Settings::default()) {
//!     FixtureState::Active(fixture) => fixture,
//!     FixtureState::Skipped(reason) => panic!("{reason}"),
//! };
//! let value = fixture
//!     .measure("add", Options::new().target(10.0).unit("ms").iterations(100), || 2 + 2)
//!     .unwrap();
//! assert_eq!(value, 4);
//! ```

pub mod comparator;
pub mod error;
pub mod fixture;
pub mod profiler;
pub mod settings;
pub mod stats;
pub mod target;
pub mod unit;

#[cfg(feature = "async")]
pub mod async_fixture;

pub use error::{CheckError, PerfError, PerformanceFailure};
pub use fixture::{performance, performance_with, FixtureState, PerfFixture};
pub use settings::{Settings, SKIP_ENV, SKIP_FLAG};
pub use target::Options;
pub use unit::{Quantity, TimeUnit, UnitRegistry, UnitSpec};

#[cfg(feature = "async")]
pub use async_fixture::{performance_async, performance_async_with, AsyncPerfFixture};
