//! Duration aggregation for one measurement run
//!
//! A [`MeasurementRun`] collects the raw durations of every invocation in a
//! single fixture call and reduces them to the two statistics the threshold
//! checks use: the first sample and the arithmetic mean. It is owned by one
//! fixture invocation, fed by whichever iteration strategy is in play, and
//! discarded once the mean has been checked.

use std::time::Duration;

/// Ordered sequence of raw durations for one fixture invocation
#[derive(Debug, Clone)]
pub struct MeasurementRun {
    samples: Vec<Duration>,
}

impl MeasurementRun {
    /// Start a run seeded with the fail-fast sample, so a run always holds
    /// at least one measurement
    pub fn with_first(first: Duration) -> Self {
        Self {
            samples: vec![first],
        }
    }

    /// Append one sample
    pub fn record(&mut self, sample: Duration) {
        self.samples.push(sample);
    }

    /// Append a batch of samples (concurrent fan-out completion order is
    /// irrelevant since only first-element and mean are consumed)
    pub fn extend(&mut self, samples: impl IntoIterator<Item = Duration>) {
        self.samples.extend(samples);
    }

    /// The fail-fast sample this run was seeded with
    pub fn first(&self) -> Duration {
        self.samples[0]
    }

    /// Arithmetic mean over all samples
    pub fn mean(&self) -> Duration {
        let total: f64 = self.samples.iter().map(Duration::as_secs_f64).sum();
        Duration::from_secs_f64(total / self.samples.len() as f64)
    }

    /// Number of samples recorded so far
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the run holds no samples (never true for a seeded run)
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
