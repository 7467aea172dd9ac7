//! Token cache contract and built-in cache backends.
//!
//! A cache owns exactly one logical slot: the token currently used by one client
//! configuration. Backends are selected at construction time, either directly or through a
//! [`CacheConfig`] selector string.

pub mod failing;
pub mod file;
pub mod memory;
pub mod redis;

pub use failing::FailingCache;
pub use file::FileCache;
pub use memory::MemoryCache;
pub use self::redis::{RedisCache, RedisConfig, RedisConnection};

// std
use std::path::PathBuf;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::ConfigError, token::Token};

/// Boxed future returned by [`TokenCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Storage contract for the single token slot of a client.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Returns the stored token, or an invalid placeholder when nothing was stored yet.
	fn get(&self) -> CacheFuture<'_, Token>;

	/// Replaces the stored token.
	fn put(&self, token: Token) -> CacheFuture<'_, ()>;

	/// Marks the stored token as expired while keeping the slot.
	fn expire(&self) -> CacheFuture<'_, ()>;
}

/// Error type produced by [`TokenCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CacheError {
	/// Token could not be encoded or decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage medium.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// The slot has never been written (or was evicted by the backend).
	#[error("Cache slot `{key}` was not found.")]
	NotFound {
		/// Backend-specific slot identifier.
		key: String,
	},
}

/// Backend selection parsed from a selector string.
///
/// | Selector | Backend |
/// |---|---|
/// | `""` or `"memory"` | [`MemoryCache`] |
/// | `"error"` | [`FailingCache`] |
/// | `"file:<path>"` | [`FileCache`] |
/// | `"redis:<host>:<port>:<password>:<key>"` | [`RedisCache`] |
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheConfig {
	/// Process-local cache.
	Memory,
	/// Cache whose every operation fails.
	Failing,
	/// JSON file at the given path.
	File(PathBuf),
	/// Remote key-value store.
	Redis(RedisConfig),
}
impl CacheConfig {
	/// Opens the selected backend for the client identified by `token_url` + `client_id`.
	pub fn open(&self, token_url: &str, client_id: &str) -> Result<Arc<dyn TokenCache>, CacheError> {
		let cache: Arc<dyn TokenCache> = match self {
			Self::Memory => Arc::new(MemoryCache::default()),
			Self::Failing => Arc::new(FailingCache),
			Self::File(path) => Arc::new(FileCache::open(path)?),
			Self::Redis(config) => Arc::new(RedisCache::open(config, token_url, client_id)?),
		};

		Ok(cache)
	}
}
impl FromStr for CacheConfig {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = |reason: &str| ConfigError::InvalidCacheSelector {
			selector: s.to_owned(),
			reason: reason.to_owned(),
		};

		match s {
			"" | "memory" => Ok(Self::Memory),
			"error" => Ok(Self::Failing),
			_ =>
				if let Some(path) = s.strip_prefix("file:") {
					if path.is_empty() {
						return Err(invalid("file path is empty"));
					}

					Ok(Self::File(PathBuf::from(path)))
				} else if let Some(connection) = s.strip_prefix("redis:") {
					connection.parse().map(Self::Redis).map_err(|reason: String| invalid(&reason))
				} else {
					Err(invalid("unknown cache kind"))
				},
		}
	}
}

/// Stable identifier for the slot owned by one token URL + client ID pair.
///
/// The identifier is a base64 (URL-safe, no padding) SHA-256 digest so it can be embedded in
/// remote keys without leaking the endpoint or the client ID.
pub fn slot_key(token_url: &str, client_id: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(token_url.as_bytes());
	hasher.update(b"\n");
	hasher.update(client_id.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
