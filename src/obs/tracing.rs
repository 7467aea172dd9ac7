// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	cache::CacheError,
	obs::{self, CacheOp, FlowStage},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by client stages.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: FlowStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_client_credentials.flow", stage = stage.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Reports a cache failure that the client recovered from.
pub fn record_cache_failure(op: CacheOp, error: &CacheError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(op = op.as_str(), %error, "token cache operation failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}

	obs::record_cache_failure_total(op);
}

/// Logs the validity verdict for the token read from the cache.
pub fn record_token_decision(remaining: Option<Duration>, toleration: Duration, valid: bool) {
	#[cfg(feature = "tracing")]
	{
		match remaining {
			Some(remaining) => tracing::debug!(
				remaining_seconds = remaining.whole_seconds(),
				toleration_seconds = toleration.whole_seconds(),
				valid,
				"checked cached token"
			),
			None => tracing::debug!(valid, "checked cached token without expiry"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (remaining, toleration, valid);
	}
}

/// Logs how long a physical fetch took.
pub fn record_fetch_latency(elapsed: StdDuration, succeeded: bool) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
			succeeded,
			"token endpoint call finished"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (elapsed, succeeded);
	}
}
