//! Client that authorises outgoing requests with a cached client-credentials token.

mod fetch;

// crates.io
use oauth2::{ClientId, ClientSecret, Scope, TokenUrl};
// self
use crate::{
	_prelude::*,
	cache::{self, CacheError, MemoryCache, TokenCache},
	clock::{Clock, SystemClock},
	config::{BadTokenPredicate, ClientConfig},
	error::ConfigError,
	flight::FlightGroup,
	http::{HttpDoer, HttpRequest, HttpResponse, header::AUTHORIZATION},
	obs::{self, CacheOp, FetchMetrics, FlowSpan, FlowStage},
	token::TokenSecret,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialised for the crate's default reqwest transport.
pub type ReqwestBackedClient = Client<ReqwestHttpClient>;

type SharedFetch = Result<TokenSecret, Arc<Error>>;

/// Attaches a bearer token to outgoing requests, fetching a new one from the token endpoint
/// whenever the cached token is missing, expired, or refused by the resource server.
///
/// One client manages one credential pair. It is cheap to share behind an [`Arc`] and every
/// method takes `&self`, so any number of tasks may call [`Client::execute`] concurrently.
pub struct Client<C>
where
	C: ?Sized + HttpDoer,
{
	http_client: Arc<C>,
	cache: Arc<dyn TokenCache>,
	clock: Arc<dyn Clock>,
	metrics: Arc<FetchMetrics>,
	token_url: TokenUrl,
	client_id: ClientId,
	client_secret: ClientSecret,
	scope: Option<Scope>,
	soft_expire: Duration,
	single_flight: bool,
	bad_token: BadTokenPredicate,
	flight_key: String,
	flights: FlightGroup<String, SharedFetch>,
	primed: OnceCell<()>,
}
impl<C> Client<C>
where
	C: ?Sized + HttpDoer,
{
	/// Creates a client that sends every request through `http_client`.
	///
	/// Fails when the token URL is not an absolute URL.
	pub fn with_http_client(config: ClientConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let soft_expire = config.soft_expire();
		let ClientConfig {
			token_url,
			client_id,
			client_secret,
			scope,
			cache,
			clock,
			single_flight,
			bad_token,
			..
		} = config;
		let flight_key = cache::slot_key(&token_url, &client_id);
		let token_url = TokenUrl::new(token_url.clone())
			.map_err(|source| ConfigError::InvalidTokenUrl { url: token_url, source })?;

		Ok(Self {
			http_client: http_client.into(),
			cache: cache.unwrap_or_else(|| Arc::new(MemoryCache::default())),
			clock: clock.unwrap_or_else(|| Arc::new(SystemClock)),
			metrics: Default::default(),
			token_url,
			client_id: ClientId::new(client_id),
			client_secret: ClientSecret::new(client_secret),
			scope: scope.map(Scope::new),
			soft_expire,
			single_flight,
			bad_token,
			flight_key,
			flights: FlightGroup::new(),
			primed: OnceCell::new(),
		})
	}

	/// Sends `request` with an `Authorization: Bearer` header carrying a valid token.
	///
	/// The resource server's response is returned whatever its status. When the bad-token
	/// predicate matches that status the cached token is expired so the next call fetches a
	/// new one; the request itself is not retried. Token acquisition failures are returned
	/// without contacting the resource server.
	pub async fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse> {
		let span = FlowSpan::new(FlowStage::Execute);

		span.instrument(async move {
			let token = self.token().await?;
			let header = token
				.bearer_header()
				.map_err(|source| ConfigError::InvalidAuthorizationHeader { source })?;

			request.headers_mut().insert(AUTHORIZATION, header);

			let response = self.http_client.execute(request).await?;

			if (self.bad_token)(response.status()) {
				#[cfg(feature = "tracing")]
				tracing::debug!(status = response.status().as_u16(), "resource server refused token");

				if let Err(e) = self.cache.expire().await {
					report_cache_error(CacheOp::Expire, &e);
				}
			}

			Ok(response)
		})
		.await
	}

	/// Returns a token that is valid for at least the soft-expire toleration.
	///
	/// A cache read failure is reported and treated as a miss; the token endpoint stays the
	/// source of truth.
	pub async fn token(&self) -> Result<TokenSecret> {
		self.prime().await;

		match self.cache.get().await {
			Ok(token) => {
				let now = self.clock.now();
				let valid = !token.value.is_empty() && token.is_valid(now, self.soft_expire);

				obs::record_token_decision(
					token.expirable.then(|| token.remaining(now)),
					self.soft_expire,
					valid,
				);

				if valid {
					self.metrics.record_cache_hit();

					return Ok(token.value);
				}
			},
			Err(e) => report_cache_error(CacheOp::Get, &e),
		}

		self.fetch_token().await
	}

	/// Cache shared by this client.
	pub fn cache(&self) -> &Arc<dyn TokenCache> {
		&self.cache
	}

	/// Counters describing this client's fetch activity.
	pub fn fetch_metrics(&self) -> &FetchMetrics {
		&self.metrics
	}

	/// Validated token endpoint URL.
	pub fn token_url(&self) -> &TokenUrl {
		&self.token_url
	}

	/// Invalidates whatever the cache held before this client first used it.
	async fn prime(&self) {
		self.primed
			.get_or_init(|| async {
				if let Err(e) = self.cache.expire().await {
					report_cache_error(CacheOp::Expire, &e);
				}
			})
			.await;
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient> {
	/// Creates a client backed by a fresh reqwest connection pool.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http_client =
			ReqwestClient::builder().build().map_err(ConfigError::http_client_build)?;

		Self::with_http_client(config, ReqwestHttpClient::with_client(http_client))
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + HttpDoer,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("token_url", &self.token_url.as_str())
			.field("client_id", &self.client_id.as_str())
			.field("scope", &self.scope.as_deref())
			.field("soft_expire", &self.soft_expire)
			.field("single_flight", &self.single_flight)
			.finish()
	}
}

/// A never-written slot is an ordinary miss rather than a backend failure.
fn report_cache_error(op: CacheOp, error: &CacheError) {
	if !matches!(error, CacheError::NotFound { .. }) {
		obs::record_cache_failure(op, error);
	}
}
