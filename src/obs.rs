//! Optional observability helpers for the client.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_client_credentials.flow` with a
//!   `stage` field, `warn!` events for cache failures, and `debug!` events for token decisions.
//! - Enable `metrics` to increment `oauth2_client_credentials_fetch_total` (labelled by
//!   `outcome`) for every physical fetch and `oauth2_client_credentials_cache_failure_total`
//!   (labelled by `op`) for every cache error.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client stages observed by spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// Authorised resource request.
	Execute,
	/// Physical token-endpoint call.
	Fetch,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::Execute => "execute",
			FlowStage::Fetch => "fetch",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each physical fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
	/// Request about to be sent to the token endpoint.
	Attempt,
	/// Token obtained and parsed.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FetchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchOutcome::Attempt => "attempt",
			FetchOutcome::Success => "success",
			FetchOutcome::Failure => "failure",
		}
	}
}
impl Display for FetchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Cache operations whose failures are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheOp {
	/// [`TokenCache::get`](crate::cache::TokenCache::get).
	Get,
	/// [`TokenCache::put`](crate::cache::TokenCache::put).
	Put,
	/// [`TokenCache::expire`](crate::cache::TokenCache::expire).
	Expire,
}
impl CacheOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheOp::Get => "get",
			CacheOp::Put => "put",
			CacheOp::Expire => "expire",
		}
	}
}
impl Display for CacheOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
