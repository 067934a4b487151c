//! Threshold comparison
//!
//! The comparator is the single place a measurement meets its target. Every
//! comparison converts the measurement into the target's declared unit
//! first; raw magnitudes are never compared across units. The check is
//! strict greater-than, so a measurement exactly at the threshold passes.

use crate::error::PerformanceFailure;
use crate::target::PerfTarget;
use crate::unit::Quantity;

/// Compare a measured quantity against the resolved target
///
/// Invoked twice per fixture call: once on the first raw duration (the
/// fail-fast check) and once on the mean of all durations.
///
/// # Errors
///
/// Returns a [`PerformanceFailure`] carrying the callable's name and both
/// quantities in the target's unit when the measurement exceeds the target.
pub fn compare_to_target(
    func_name: &str,
    actual: Quantity,
    target: &PerfTarget,
) -> Result<(), PerformanceFailure> {
    let converted = actual.to(target.threshold.unit);
    tracing::debug!(
        func = func_name,
        actual = %converted,
        threshold = %target.threshold,
        "threshold check"
    );
    if converted.magnitude > target.threshold.magnitude {
        tracing::warn!(func = func_name, "performance threshold exceeded");
        return Err(PerformanceFailure::new(
            func_name,
            target.threshold,
            converted,
        ));
    }
    Ok(())
}
