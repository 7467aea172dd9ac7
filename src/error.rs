//! Client-level error types shared across the cache, fetch, and transport stages.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token cache failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS) against either server.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token endpoint payload could not be interpreted.
	#[error("Token endpoint response could not be parsed.")]
	Parse(
		#[from]
		#[source]
		crate::parse::ParseError,
	),

	/// Token endpoint answered with a status other than 200.
	#[error("Token endpoint returned status {status}: {body}.")]
	TokenEndpoint {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Response body, kept for diagnostics.
		body: String,
	},
	/// Outcome of a coordinated fetch shared between concurrent callers.
	#[error(transparent)]
	Shared(Arc<Error>),
}
impl Error {
	/// Returns the underlying error, looking through [`Error::Shared`] layers.
	pub fn root(&self) -> &Error {
		match self {
			Self::Shared(inner) => inner.root(),
			other => other,
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Token URL cannot be parsed as an absolute URL.
	#[error("Token URL `{url}` is invalid.")]
	InvalidTokenUrl {
		/// Raw URL supplied by the caller.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Access token cannot be encoded into an `Authorization` header.
	#[error("Access token cannot be used as an Authorization header value.")]
	InvalidAuthorizationHeader {
		/// Underlying header validation failure.
		#[source]
		source: oauth2::http::header::InvalidHeaderValue,
	},
	/// Cache selector string is not recognised.
	#[error("Cache selector `{selector}` is invalid: {reason}.")]
	InvalidCacheSelector {
		/// Raw selector supplied by the caller.
		selector: String,
		/// Why the selector was rejected.
		reason: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
