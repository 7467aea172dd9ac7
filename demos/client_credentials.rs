//! Sends a few authorised requests through the client with the default reqwest transport,
//! showing that the token endpoint is called once while the cached token stays valid.
//!
//! Set `OAUTH2_CACHE` to a cache selector (`file:/tmp/token.json`, `error`, ...) to try another
//! backend; the default is the in-memory cache.

// std
use std::env;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use oauth2_client_credentials::{
	Client, ClientConfig,
	cache::CacheConfig,
	http::{Method, Request},
};

const REQUESTS: usize = 3;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/get").header("authorization", "Bearer demo-access");
			then.status(200).body("{\"hello\":\"service\"}");
		})
		.await;
	let token_url = server.url("/oauth/token");
	let cache = env::var("OAUTH2_CACHE")
		.unwrap_or_default()
		.parse::<CacheConfig>()?
		.open(&token_url, "demo-client")?;
	let config = ClientConfig::new(token_url, "demo-client", "demo-secret")
		.with_scope("inventory.read")
		.with_cache(cache);
	let client = Client::new(config)?;

	for i in 1..=REQUESTS {
		let request =
			Request::builder().method(Method::GET).uri(server.url("/get")).body(Vec::new())?;
		let response = client.execute(request).await?;

		println!(
			"request {i}/{REQUESTS}: status {} body {}",
			response.status(),
			String::from_utf8_lossy(response.body())
		);
	}

	let metrics = client.fetch_metrics();

	println!(
		"token endpoint calls: {}, cache hits: {}.",
		metrics.attempts(),
		metrics.cache_hits()
	);

	token_mock.assert_calls_async(usize::try_from(metrics.attempts())?).await;
	resource_mock.assert_calls_async(REQUESTS).await;

	Ok(())
}
