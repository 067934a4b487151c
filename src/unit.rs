//! Time units, the unit registry, and unit-safe quantities
//!
//! All threshold comparisons in this crate go through [`Quantity`], a
//! (magnitude, unit) pair. Converting a measurement into the unit the caller
//! declared before comparing means a target of "1 s" and a measurement of
//! "1200 ms" are ordered correctly regardless of how either was produced.
//!
//! The [`UnitRegistry`] is the shared catalog mapping unit-name strings to
//! units. One instance is built at first use and exposed through
//! [`registry`]; resolvers take `&UnitRegistry` as an argument instead of
//! reaching into the global themselves.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PerfError;

/// A physical time unit with an exact conversion factor to seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Nanoseconds (ns)
    Nanosecond,
    /// Microseconds (us)
    Microsecond,
    /// Milliseconds (ms)
    Millisecond,
    /// Seconds (s)
    Second,
    /// Minutes (min)
    Minute,
    /// Hours (h)
    Hour,
}

impl TimeUnit {
    /// Number of seconds in one of this unit
    pub fn factor(&self) -> f64 {
        match self {
            TimeUnit::Nanosecond => 1e-9,
            TimeUnit::Microsecond => 1e-6,
            TimeUnit::Millisecond => 1e-3,
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3600.0,
        }
    }

    /// Short label used when formatting quantities (e.g. "ms")
    pub fn label(&self) -> &'static str {
        match self {
            TimeUnit::Nanosecond => "ns",
            TimeUnit::Microsecond => "us",
            TimeUnit::Millisecond => "ms",
            TimeUnit::Second => "s",
            TimeUnit::Minute => "min",
            TimeUnit::Hour => "h",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalog mapping unit-name strings to [`TimeUnit`] values
///
/// Recognizes the short labels plus common long forms and plurals, so a
/// caller can write `"ms"`, `"millisecond"`, or `"milliseconds"`
/// interchangeably. Lookup is case-insensitive.
#[derive(Debug)]
pub struct UnitRegistry {
    aliases: HashMap<&'static str, TimeUnit>,
}

impl UnitRegistry {
    /// Build a registry with the full alias table
    pub fn new() -> Self {
        let mut aliases = HashMap::new();
        let table: &[(&[&'static str], TimeUnit)] = &[
            (
                &["ns", "nanosecond", "nanoseconds", "nsec", "nsecs"],
                TimeUnit::Nanosecond,
            ),
            (
                &["us", "µs", "microsecond", "microseconds", "usec", "usecs"],
                TimeUnit::Microsecond,
            ),
            (
                &["ms", "millisecond", "milliseconds", "msec", "msecs"],
                TimeUnit::Millisecond,
            ),
            (
                &["s", "sec", "secs", "second", "seconds"],
                TimeUnit::Second,
            ),
            (&["min", "mins", "minute", "minutes"], TimeUnit::Minute),
            (&["h", "hr", "hrs", "hour", "hours"], TimeUnit::Hour),
        ];
        for (names, unit) in table {
            for name in *names {
                aliases.insert(*name, *unit);
            }
        }
        Self { aliases }
    }

    /// Parse a unit expression such as `"ms"` or `"Seconds"` into a unit
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::UnitParse`] if the expression is not a
    /// recognized time unit.
    pub fn parse_expression(&self, expr: &str) -> Result<TimeUnit, PerfError> {
        let normalized = expr.trim().to_lowercase();
        self.aliases
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| PerfError::UnitParse {
                expr: expr.to_string(),
            })
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide unit registry, built once on first access
pub fn registry() -> &'static UnitRegistry {
    static REGISTRY: OnceLock<UnitRegistry> = OnceLock::new();
    REGISTRY.get_or_init(UnitRegistry::new)
}

/// A unit supplied by the caller: either a pre-built [`TimeUnit`] value or a
/// string expression to be resolved through the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitSpec {
    /// Already-resolved unit
    Unit(TimeUnit),
    /// Expression to resolve, e.g. `"ms"` or `"seconds"`
    Expr(String),
}

impl UnitSpec {
    /// Resolve this spec to a concrete unit through the given registry
    pub fn resolve(&self, registry: &UnitRegistry) -> Result<TimeUnit, PerfError> {
        match self {
            UnitSpec::Unit(unit) => Ok(*unit),
            UnitSpec::Expr(expr) => registry.parse_expression(expr),
        }
    }
}

impl From<TimeUnit> for UnitSpec {
    fn from(unit: TimeUnit) -> Self {
        UnitSpec::Unit(unit)
    }
}

impl From<&str> for UnitSpec {
    fn from(expr: &str) -> Self {
        UnitSpec::Expr(expr.to_string())
    }
}

impl From<String> for UnitSpec {
    fn from(expr: String) -> Self {
        UnitSpec::Expr(expr)
    }
}

/// A time measurement: magnitude paired with a unit
///
/// Equality and ordering compare through seconds, so `Quantity::new(1.0,
/// Second)` equals `Quantity::new(1000.0, Millisecond)`.
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    /// Magnitude in `unit`
    pub magnitude: f64,
    /// Unit the magnitude is expressed in
    pub unit: TimeUnit,
}

impl Quantity {
    /// Create a quantity from a magnitude and unit
    pub fn new(magnitude: f64, unit: TimeUnit) -> Self {
        Self { magnitude, unit }
    }

    /// Wrap a raw wall-clock duration as a quantity in seconds
    pub fn from_duration(duration: Duration) -> Self {
        Self::new(duration.as_secs_f64(), TimeUnit::Second)
    }

    /// Magnitude expressed in seconds
    pub fn seconds(&self) -> f64 {
        self.magnitude * self.unit.factor()
    }

    /// Convert to another unit, preserving the physical value
    pub fn to(&self, unit: TimeUnit) -> Quantity {
        Quantity::new(self.seconds() / unit.factor(), unit)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.seconds() == other.seconds()
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.seconds().partial_cmp(&other.seconds())
    }
}

impl fmt::Display for Quantity {
    /// Formats as `<magnitude> <label>`, honoring an explicit precision
    /// (`{:.5}` renders the magnitude to 5 decimal places)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*} {}", precision, self.magnitude, self.unit),
            None => write!(f, "{} {}", self.magnitude, self.unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_labels() {
        let registry = UnitRegistry::new();
        assert_eq!(registry.parse_expression("ns").unwrap(), TimeUnit::Nanosecond);
        assert_eq!(registry.parse_expression("us").unwrap(), TimeUnit::Microsecond);
        assert_eq!(registry.parse_expression("ms").unwrap(), TimeUnit::Millisecond);
        assert_eq!(registry.parse_expression("s").unwrap(), TimeUnit::Second);
        assert_eq!(registry.parse_expression("min").unwrap(), TimeUnit::Minute);
        assert_eq!(registry.parse_expression("h").unwrap(), TimeUnit::Hour);
    }

    #[test]
    fn test_parse_long_forms_and_case() {
        let registry = UnitRegistry::new();
        assert_eq!(
            registry.parse_expression("Milliseconds").unwrap(),
            TimeUnit::Millisecond
        );
        assert_eq!(
            registry.parse_expression("  seconds ").unwrap(),
            TimeUnit::Second
        );
        assert_eq!(
            registry.parse_expression("µs").unwrap(),
            TimeUnit::Microsecond
        );
    }

    #[test]
    fn test_parse_unknown_unit_fails() {
        let registry = UnitRegistry::new();
        let err = registry.parse_expression("furlongs").unwrap_err();
        match err {
            PerfError::UnitParse { expr } => assert_eq!(expr, "furlongs"),
            other => panic!("expected UnitParse, got {other:?}"),
        }
    }

    #[test]
    fn test_global_registry_is_shared() {
        let a = registry() as *const UnitRegistry;
        let b = registry() as *const UnitRegistry;
        assert_eq!(a, b);
    }

    #[test]
    fn test_unit_spec_resolution() {
        let registry = UnitRegistry::new();
        let spec: UnitSpec = TimeUnit::Second.into();
        assert_eq!(spec.resolve(&registry).unwrap(), TimeUnit::Second);

        let spec: UnitSpec = "ms".into();
        assert_eq!(spec.resolve(&registry).unwrap(), TimeUnit::Millisecond);

        let spec: UnitSpec = "bogus".into();
        assert!(spec.resolve(&registry).is_err());
    }

    #[test]
    fn test_conversion() {
        let q = Quantity::new(2.0, TimeUnit::Second);
        let ms = q.to(TimeUnit::Millisecond);
        assert_eq!(ms.magnitude, 2000.0);
        assert_eq!(ms.unit, TimeUnit::Millisecond);
    }

    #[test]
    fn test_conversion_round_trip_exact_powers() {
        let q = Quantity::new(1500.0, TimeUnit::Millisecond);
        let back = q.to(TimeUnit::Second).to(TimeUnit::Millisecond);
        assert!((back.magnitude - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_cross_unit_ordering() {
        let a = Quantity::new(999.0, TimeUnit::Millisecond);
        let b = Quantity::new(1.0, TimeUnit::Second);
        assert!(a < b);
        assert!(b > a);
        assert_eq!(Quantity::new(1000.0, TimeUnit::Millisecond), b);
    }

    #[test]
    fn test_from_duration_is_seconds() {
        let q = Quantity::from_duration(Duration::from_millis(250));
        assert_eq!(q.unit, TimeUnit::Second);
        assert!((q.magnitude - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_display_default_and_precision() {
        let q = Quantity::new(1000.0, TimeUnit::Millisecond);
        assert_eq!(q.to_string(), "1000 ms");
        assert_eq!(format!("{q:.5}"), "1000.00000 ms");
    }
}
