//! Explicit call-timing capture.
//!
//! A [`FetchTelemetry`] handle is passed into each fetch call and returned
//! alongside its result. No thread-local or global state is involved, so
//! timings compose across concurrent workers by merging handles after join.

use std::time::Duration;

/// Timing of a single API call.
#[derive(Debug, Clone)]
pub struct CallTiming {
    pub endpoint: String,
    pub elapsed: Duration,
}

/// Accumulated call timings for one fetch unit.
#[derive(Debug, Clone, Default)]
pub struct FetchTelemetry {
    calls: Vec<CallTiming>,
}

impl FetchTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, endpoint: &str, elapsed: Duration) {
        self.calls.push(CallTiming {
            endpoint: endpoint.to_string(),
            elapsed,
        });
    }

    /// Fold another handle's timings into this one (orchestrator side,
    /// after the worker has returned it).
    pub fn merge(&mut self, other: FetchTelemetry) {
        self.calls.extend(other.calls);
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.calls.iter().map(|c| c.elapsed).sum()
    }

    pub fn calls(&self) -> &[CallTiming] {
        &self.calls
    }
}
