//! Token endpoint calls, optionally collapsed through the client's
//! [`FlightGroup`](crate::flight::FlightGroup).

// std
use std::time::Instant;
// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	client::{Client, report_cache_error},
	error::ConfigError,
	http::{
		HttpDoer, HttpRequest, Method, Request, StatusCode,
		header::{ACCEPT, CONTENT_TYPE},
	},
	obs::{self, CacheOp, FetchOutcome, FlowSpan, FlowStage},
	parse,
	token::{Token, TokenSecret},
};

const GRANT_TYPE: &str = "client_credentials";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

impl<C> Client<C>
where
	C: ?Sized + HttpDoer,
{
	/// Obtains a new token, joining an outstanding fetch when single-flight is enabled.
	pub(super) async fn fetch_token(&self) -> Result<TokenSecret> {
		if !self.single_flight {
			return self.fetch_token_raw().await;
		}

		self.flights
			.run(&self.flight_key, || async { self.fetch_token_raw().await.map_err(Arc::new) })
			.await
			.map_err(Error::Shared)
	}

	/// Performs one physical token-endpoint call and stores the result.
	///
	/// A failure to store the token is reported but does not fail the fetch.
	async fn fetch_token_raw(&self) -> Result<TokenSecret> {
		let span = FlowSpan::new(FlowStage::Fetch);
		let started = Instant::now();

		self.metrics.record(FetchOutcome::Attempt);

		let result = span
			.instrument(async {
				let request = self.token_request()?;
				let response = self.http_client.execute(request).await?;

				if response.status() != StatusCode::OK {
					return Err(Error::TokenEndpoint {
						status: response.status().as_u16(),
						body: String::from_utf8_lossy(response.body()).into_owned(),
					});
				}

				let parsed = parse::parse_token_response(response.body())?;
				let mut token = Token::new(parsed.access_token);

				if !parsed.expires_in.is_zero() {
					// Overflowing deadlines leave the token non-expirable.
					if let Some(deadline) = self.clock.now().checked_add(parsed.expires_in) {
						token.set_expiration(deadline);
					}
				}

				let value = token.value.clone();

				if let Err(e) = self.cache.put(token).await {
					report_cache_error(CacheOp::Put, &e);
				}

				Ok(value)
			})
			.await;

		obs::record_fetch_latency(started.elapsed(), result.is_ok());
		self.metrics.record(match result {
			Ok(_) => FetchOutcome::Success,
			Err(_) => FetchOutcome::Failure,
		});

		result
	}

	fn token_request(&self) -> Result<HttpRequest> {
		let mut form = form_urlencoded::Serializer::new(String::new());

		form.append_pair("grant_type", GRANT_TYPE)
			.append_pair("client_id", self.client_id.as_str())
			.append_pair("client_secret", self.client_secret.secret());

		if let Some(scope) = &self.scope {
			form.append_pair("scope", scope.as_str());
		}

		let request = Request::builder()
			.method(Method::POST)
			.uri(self.token_url.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, "application/json")
			.body(form.finish().into_bytes())
			.map_err(ConfigError::from)?;

		Ok(request)
	}
}
