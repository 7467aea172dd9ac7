//! Redis-backed [`TokenCache`] shared by every process that uses the same key.
//!
//! Tokens are stored as JSON under `oauth2-client-credentials:token:<key>`. Expirable tokens
//! carry a TTL of their remaining lifetime plus one minute, so the store evicts them shortly
//! after they stop being useful.
//!
//! [`TokenCache::expire`] reads the token, expires it, and writes it back. That sequence is
//! not atomic: a `put` issued by another process between the read and the write is
//! overwritten by the expired copy, and the next reader fetches a new token.

// std
use std::time::Duration as StdDuration;
// crates.io
use ::redis::{
	AsyncCommands, Client as RedisClient, ConnectionAddr, ConnectionInfo, RedisConnectionInfo,
	RedisResult,
	aio::{ConnectionLike, ConnectionManager, ConnectionManagerConfig},
};
// self
use crate::{
	_prelude::*,
	cache::{self, CacheError, CacheFuture, TokenCache},
	clock::{Clock, SystemClock},
	token::Token,
};

const KEY_PREFIX: &str = "oauth2-client-credentials:token:";
const TTL_MARGIN: Duration = Duration::minutes(1);
const CONNECT_RETRIES: usize = 2;
const CONNECT_TIMEOUT: StdDuration = StdDuration::from_secs(5);
const RESPONSE_TIMEOUT: StdDuration = StdDuration::from_secs(3);

/// Connection settings parsed from `<host>:<port>:<password>:<key>`.
///
/// The password and key may be empty; an empty key is replaced by the slot key derived from
/// the client's token URL and client ID.
#[derive(Clone, PartialEq, Eq)]
pub struct RedisConfig {
	/// Server host name or address.
	pub host: String,
	/// Server port.
	pub port: u16,
	/// Optional password for `AUTH`.
	pub password: Option<String>,
	/// Explicit slot key; derived from the client configuration when absent.
	pub key: Option<String>,
}
impl RedisConfig {
	/// Plain TCP connection to database `0`, authenticating with the password verbatim.
	pub fn connection_info(&self) -> ConnectionInfo {
		ConnectionInfo {
			addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
			redis: RedisConnectionInfo {
				db: 0,
				password: self.password.clone(),
				..Default::default()
			},
		}
	}
}
impl FromStr for RedisConfig {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let fields = s.splitn(4, ':').collect::<Vec<_>>();
		let [host, port, password, key] = fields.as_slice() else {
			return Err(format!("4 fields are required, but got {}", fields.len()));
		};

		if host.is_empty() {
			return Err("redis host is empty".into());
		}

		let port = port.parse().map_err(|e| format!("redis port `{port}` is invalid: {e}"))?;
		let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_owned());

		Ok(Self { host: (*host).to_owned(), port, password: non_empty(*password), key: non_empty(*key) })
	}
}
impl Debug for RedisConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RedisConfig")
			.field("host", &self.host)
			.field("port", &self.port)
			.field("password_set", &self.password.is_some())
			.field("key", &self.key)
			.finish()
	}
}

/// Async connection a [`RedisCache`] opens on first use.
///
/// [`ConnectionManager`] re-establishes its link after the server drops it, so a restart only
/// fails the commands in flight at that moment.
pub trait RedisConnection
where
	Self: 'static + Clone + ConnectionLike + Send + Sync,
{
	/// Opens a connection through `client`.
	fn connect(client: &RedisClient) -> impl Future<Output = RedisResult<Self>> + Send;
}
impl RedisConnection for ConnectionManager {
	fn connect(client: &RedisClient) -> impl Future<Output = RedisResult<Self>> + Send {
		let config = ConnectionManagerConfig::new()
			.set_number_of_retries(CONNECT_RETRIES)
			.set_connection_timeout(CONNECT_TIMEOUT)
			.set_response_timeout(RESPONSE_TIMEOUT);

		client.get_connection_manager_with_config(config)
	}
}

/// Cache stored in a remote Redis instance.
///
/// A failed connection attempt is not remembered; the next operation dials again.
pub struct RedisCache<C = ConnectionManager> {
	client: RedisClient,
	key: String,
	clock: Arc<dyn Clock>,
	connection: OnceCell<C>,
}
impl RedisCache {
	/// Builds a cache for the client identified by `token_url` + `client_id`.
	///
	/// No connection is opened until the first operation.
	pub fn open(config: &RedisConfig, token_url: &str, client_id: &str) -> Result<Self, CacheError> {
		let client = RedisClient::open(config.connection_info()).map_err(backend_error)?;
		let key = storage_key(config.key.as_deref(), token_url, client_id);

		Ok(Self { client, key, clock: Arc::new(SystemClock), connection: OnceCell::new() })
	}
}
impl<C> RedisCache<C>
where
	C: RedisConnection,
{
	/// Uses `clock` to compute key TTLs instead of the system clock.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Full Redis key holding the token.
	pub fn key(&self) -> &str {
		&self.key
	}

	async fn connection(&self) -> Result<C, CacheError> {
		self.connection
			.get_or_try_init(|| async { C::connect(&self.client).await.map_err(backend_error) })
			.await
			.cloned()
	}

	async fn load(&self) -> Result<Token, CacheError> {
		let mut conn = self.connection().await?;
		let bytes: Option<Vec<u8>> = conn.get(&self.key).await.map_err(backend_error)?;
		let bytes = bytes.ok_or_else(|| CacheError::NotFound { key: self.key.clone() })?;

		Token::from_json(&bytes)
	}

	async fn store(&self, token: &Token) -> Result<(), CacheError> {
		let mut conn = self.connection().await?;
		let payload = token.to_json()?;
		let result = match ttl_seconds(token, self.clock.now()) {
			Some(ttl) => conn.set_ex::<_, _, ()>(&self.key, payload, ttl).await,
			None => conn.set::<_, _, ()>(&self.key, payload).await,
		};

		result.map_err(backend_error)
	}
}
impl<C> Debug for RedisCache<C> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RedisCache").field("key", &self.key).finish()
	}
}
impl<C> TokenCache for RedisCache<C>
where
	C: RedisConnection,
{
	fn get(&self) -> CacheFuture<'_, Token> {
		Box::pin(self.load())
	}

	fn put(&self, token: Token) -> CacheFuture<'_, ()> {
		Box::pin(async move { self.store(&token).await })
	}

	fn expire(&self) -> CacheFuture<'_, ()> {
		Box::pin(async move {
			let mut token = self.load().await?;

			token.expire();

			self.store(&token).await
		})
	}
}

fn storage_key(explicit: Option<&str>, token_url: &str, client_id: &str) -> String {
	match explicit {
		Some(key) => format!("{KEY_PREFIX}{key}"),
		None => format!("{KEY_PREFIX}{}", cache::slot_key(token_url, client_id)),
	}
}

/// Remaining lifetime plus the safety margin, or `None` for tokens that never expire.
fn ttl_seconds(token: &Token, now: OffsetDateTime) -> Option<u64> {
	if !token.expirable {
		return None;
	}

	let remaining = token.remaining(now).max(Duration::ZERO);
	let ttl = remaining.saturating_add(TTL_MARGIN).whole_seconds();

	Some(u64::try_from(ttl).unwrap_or(u64::MAX))
}

fn backend_error(e: ::redis::RedisError) -> CacheError {
	CacheError::Backend { message: format!("Redis operation failed: {e}") }
}
