//! Performance target resolution
//!
//! [`Options`] is what a test hands to a fixture; [`PerfTarget`] is the
//! immutable resolved form every measurement is compared against. Resolution
//! is a pure function of the options and the unit registry passed in.

use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::Result;
use crate::unit::{Quantity, TimeUnit, UnitRegistry, UnitSpec};

/// Default target magnitude (in the default unit)
pub const DEFAULT_TARGET: f64 = 1000.0;
/// Default target unit
pub const DEFAULT_UNIT: TimeUnit = TimeUnit::Millisecond;
/// Default iteration count
pub const DEFAULT_ITERATIONS: u32 = 10_000;

/// Caller-facing measurement options
///
/// All fields have defaults matching `Options::default()`: a 1000 ms target
/// over 10 000 iterations, concurrent fan-out for the async fixture, no
/// watchdog.
#[derive(Debug, Clone)]
pub struct Options {
    /// Target magnitude, in `unit`
    pub target: f64,
    /// Unit the target is expressed in
    pub unit: UnitSpec,
    /// Total number of invocations (saturates to 1 if 0 is requested)
    pub iterations: u32,
    /// Async fixture only: run the remaining iterations concurrently.
    /// Ignored by the synchronous fixture, which is always sequential.
    pub parallel: bool,
    /// Optional per-invocation watchdog for the async fixture. `None`
    /// (the default) means a hung callable hangs the test.
    pub watchdog: Option<Duration>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            unit: UnitSpec::Unit(DEFAULT_UNIT),
            iterations: DEFAULT_ITERATIONS,
            parallel: true,
            watchdog: None,
        }
    }
}

impl Options {
    /// Defaults: 1000 ms target, 10 000 iterations, parallel fan-out
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target magnitude
    pub fn target(mut self, target: f64) -> Self {
        self.target = target;
        self
    }

    /// Set the target unit, from a [`TimeUnit`] or a string expression
    pub fn unit(mut self, unit: impl Into<UnitSpec>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the total invocation count
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Async fixture: run remaining iterations one at a time instead of
    /// concurrently. Use when the callable is not safe to run as many
    /// overlapping instances, or when overlap would distort the timing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Async fixture: bound each awaited invocation with a watchdog
    pub fn watchdog(mut self, limit: Duration) -> Self {
        self.watchdog = Some(limit);
        self
    }
}

/// Resolved, immutable performance target for one fixture invocation
#[derive(Debug, Clone, Copy)]
pub struct PerfTarget {
    /// The threshold every comparison converts into
    pub threshold: Quantity,
    /// Total invocation count, at least 1
    pub iterations: NonZeroU32,
    /// Concurrent fan-out for the async fixture
    pub parallel: bool,
    /// Optional per-invocation watchdog
    pub watchdog: Option<Duration>,
}

impl PerfTarget {
    /// Resolve options into a target through the given unit registry
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PerfError::UnitParse`] if the unit
    /// expression is not recognized.
    pub fn resolve(opts: &Options, registry: &UnitRegistry) -> Result<Self> {
        let unit = opts.unit.resolve(registry)?;
        Ok(Self {
            threshold: Quantity::new(opts.target, unit),
            iterations: NonZeroU32::new(opts.iterations).unwrap_or(NonZeroU32::MIN),
            parallel: opts.parallel,
            watchdog: opts.watchdog,
        })
    }
}
