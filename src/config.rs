//! Client configuration and its normalisation rules.

// self
use crate::{_prelude::*, cache::TokenCache, clock::Clock, http::StatusCode};

/// Predicate deciding whether a resource-server status means the bearer token was refused.
pub type BadTokenPredicate = Arc<dyn Fn(StatusCode) -> bool + Send + Sync>;

/// Toleration applied when the configured soft-expire value is `0`.
pub const DEFAULT_SOFT_EXPIRE: Duration = Duration::seconds(10);

/// Settings for one client credential pair.
///
/// Only the token URL and the credentials are required; everything else has a default:
///
/// - soft-expire toleration of 10 seconds
/// - a fresh in-memory cache owned by the client
/// - the wall clock
/// - single-flight de-duplication of token fetches
/// - a bad-token predicate matching `401 Unauthorized` only
#[derive(Clone)]
pub struct ClientConfig {
	/// Absolute URL of the token endpoint.
	pub token_url: String,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Space-delimited scopes requested with every fetch.
	pub scope: Option<String>,
	/// Soft-expire toleration in seconds; see [`soft_expire_window`].
	pub soft_expire_seconds: i64,
	/// Token cache; a private in-memory cache is created when absent.
	pub cache: Option<Arc<dyn TokenCache>>,
	/// Time source; the wall clock is used when absent.
	pub clock: Option<Arc<dyn Clock>>,
	/// Whether overlapping fetches are collapsed into one token-endpoint call.
	pub single_flight: bool,
	/// Status predicate that invalidates the cached token.
	pub bad_token: BadTokenPredicate,
}
impl ClientConfig {
	/// Creates a configuration with default behaviour for the given credentials.
	pub fn new(
		token_url: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			token_url: token_url.into(),
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			scope: None,
			soft_expire_seconds: 0,
			cache: None,
			clock: None,
			single_flight: true,
			bad_token: Arc::new(|status| status == StatusCode::UNAUTHORIZED),
		}
	}

	/// Requests the given space-delimited scopes.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		let scope = scope.into();

		self.scope = (!scope.is_empty()).then_some(scope);

		self
	}

	/// Overrides the soft-expire toleration (`0` keeps the default, `-1` disables it).
	///
	/// Every other negative value also disables the window instead of acting as a negative
	/// toleration that would keep serving tokens past their deadline. Positive values are used
	/// verbatim, however large; a window longer than any token lifetime forces a fetch per call.
	pub fn with_soft_expire_seconds(mut self, seconds: i64) -> Self {
		self.soft_expire_seconds = seconds;

		self
	}

	/// Uses the provided cache instead of a private in-memory one.
	///
	/// Passing the same cache to several clients makes them share one token slot.
	pub fn with_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
		self.cache = Some(cache);

		self
	}

	/// Uses the provided time source for validity checks and expiry deadlines.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);

		self
	}

	/// Enables or disables single-flight de-duplication.
	pub fn with_single_flight(mut self, enabled: bool) -> Self {
		self.single_flight = enabled;

		self
	}

	/// Replaces the bad-token predicate.
	pub fn with_bad_token_predicate<F>(mut self, predicate: F) -> Self
	where
		F: 'static + Fn(StatusCode) -> bool + Send + Sync,
	{
		self.bad_token = Arc::new(predicate);

		self
	}

	/// Effective soft-expire toleration.
	pub fn soft_expire(&self) -> Duration {
		soft_expire_window(self.soft_expire_seconds)
	}
}
impl Debug for ClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientConfig")
			.field("token_url", &self.token_url)
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("scope", &self.scope)
			.field("soft_expire_seconds", &self.soft_expire_seconds)
			.field("cache_set", &self.cache.is_some())
			.field("clock_set", &self.clock.is_some())
			.field("single_flight", &self.single_flight)
			.finish()
	}
}

/// Normalises a soft-expire setting into a toleration window.
///
/// `0` selects [`DEFAULT_SOFT_EXPIRE`], `-1` (and anything below) disables the window, and any
/// positive value is used as a number of seconds.
pub fn soft_expire_window(seconds: i64) -> Duration {
	match seconds {
		0 => DEFAULT_SOFT_EXPIRE,
		s if s < 0 => Duration::ZERO,
		s => Duration::seconds(s),
	}
}
