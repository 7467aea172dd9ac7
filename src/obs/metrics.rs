// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::{CacheOp, FetchOutcome};

/// Thread-safe counters kept by every client, independent of the `metrics` feature.
#[derive(Debug, Default)]
pub struct FetchMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	cache_hits: AtomicU64,
}
impl FetchMetrics {
	/// Returns the number of physical token-endpoint calls.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of fetches that produced a token.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed fetches.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of requests served from a valid cached token.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	pub(crate) fn record(&self, outcome: FetchOutcome) {
		let counter = match outcome {
			FetchOutcome::Attempt => &self.attempts,
			FetchOutcome::Success => &self.success,
			FetchOutcome::Failure => &self.failure,
		};

		counter.fetch_add(1, Ordering::Relaxed);
		record_fetch_outcome(outcome);
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}
}

/// Records a fetch outcome via the global metrics recorder (when enabled).
pub fn record_fetch_outcome(outcome: FetchOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_client_credentials_fetch_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Records a cache failure via the global metrics recorder (when enabled).
pub fn record_cache_failure_total(op: CacheOp) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_client_credentials_cache_failure_total", "op" => op.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = op;
	}
}
