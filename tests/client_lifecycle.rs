mod common;

// std
use std::{sync::Arc, time::Duration as StdDuration};
// crates.io
use time::{Duration, macros::datetime};
// self
use common::*;
use oauth2_client_credentials::{
	Client, ClientConfig, Token,
	cache::{FailingCache, MemoryCache, TokenCache},
	clock::ManualClock,
	error::{ConfigError, Error},
	http::StatusCode,
	parse::ParseError,
};

async fn send(client: &Client<FakeServers>) -> StatusCode {
	client
		.execute(resource_request())
		.await
		.expect("Authorised request should reach the resource server.")
		.status()
}

#[tokio::test]
async fn cached_token_is_reused_across_requests() {
	let servers = Arc::new(FakeServers::new());
	let client = build_client(config(), &servers);

	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(servers.token_calls(), 1);
	assert_eq!(servers.resource_calls(), 2);
	assert_eq!(client.fetch_metrics().cache_hits(), 1);
}

#[tokio::test]
async fn hard_expiry_triggers_refetch() {
	let servers = Arc::new(FakeServers::new().with_expires_in("1"));
	let clock = ManualClock::new(datetime!(2025-06-01 12:00 UTC));
	let client = build_client(
		config().with_soft_expire_seconds(-1).with_clock(Arc::new(clock.clone())),
		&servers,
	);

	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(servers.token_calls(), 1);

	clock.advance(Duration::seconds(2));

	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(servers.token_calls(), 2);
}

#[tokio::test]
async fn soft_expire_window_renews_before_the_deadline() {
	let servers = Arc::new(FakeServers::new().with_expires_in("5"));
	let clock = ManualClock::new(datetime!(2025-06-01 12:00 UTC));
	let client = build_client(config().with_clock(Arc::new(clock.clone())), &servers);

	// Five seconds of lifetime never clears the default ten-second toleration.
	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(servers.token_calls(), 2);
}

#[tokio::test]
async fn string_and_float_lifetimes_are_honoured() {
	for raw in ["\"60\"", "60.0"] {
		let servers = Arc::new(FakeServers::new().with_expires_in(raw));
		let clock = ManualClock::new(datetime!(2025-06-01 12:00 UTC));
		let client = build_client(
			config().with_soft_expire_seconds(-1).with_clock(Arc::new(clock.clone())),
			&servers,
		);

		send(&client).await;
		clock.advance(Duration::seconds(59));
		send(&client).await;

		assert_eq!(servers.token_calls(), 1, "expires_in {raw}");

		clock.advance(Duration::seconds(1));
		send(&client).await;

		assert_eq!(servers.token_calls(), 2, "expires_in {raw}");
	}
}

#[tokio::test]
async fn oversized_soft_expire_window_fetches_on_every_call() {
	let servers = Arc::new(FakeServers::new().with_expires_in("3600"));
	let client = build_client(config().with_soft_expire_seconds(1_000_000_000_000), &servers);

	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(servers.token_calls(), 2);
	assert_eq!(client.fetch_metrics().cache_hits(), 0);
}

#[tokio::test]
async fn refused_token_is_expired_for_the_next_request() {
	let servers = Arc::new(FakeServers::new());
	let client = build_client(config(), &servers);

	assert_eq!(send(&client).await, StatusCode::OK);

	servers.rotate("token-2");

	assert_eq!(send(&client).await, StatusCode::UNAUTHORIZED);
	assert_eq!(servers.token_calls(), 1);
	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(servers.token_calls(), 2);
	assert_eq!(servers.resource_calls(), 3);
}

#[tokio::test]
async fn bad_token_predicate_is_configurable() {
	let servers = Arc::new(FakeServers::new());
	let client = build_client(
		config().with_bad_token_predicate(|status| status == StatusCode::FORBIDDEN),
		&servers,
	);

	assert_eq!(send(&client).await, StatusCode::OK);

	servers.rotate("token-2");

	assert_eq!(send(&client).await, StatusCode::UNAUTHORIZED);
	assert_eq!(send(&client).await, StatusCode::UNAUTHORIZED);
	assert_eq!(servers.token_calls(), 1);
}

async fn hammer(single_flight: bool, tasks: usize, calls: usize) -> usize {
	let servers = Arc::new(FakeServers::new().with_token_delay(StdDuration::from_millis(20)));
	let client = Arc::new(build_client(
		config().with_cache(Arc::new(FailingCache)).with_single_flight(single_flight),
		&servers,
	));
	let mut handles = Vec::with_capacity(tasks);

	for _ in 0..tasks {
		let client = client.clone();

		handles.push(tokio::spawn(async move {
			for _ in 0..calls {
				assert_eq!(send(&client).await, StatusCode::OK);
			}
		}));
	}
	for handle in handles {
		handle.await.expect("Request task should not panic.");
	}

	assert_eq!(servers.resource_calls(), tasks * calls);

	servers.token_calls()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_flight_collapses_concurrent_fetches() {
	let token_calls = hammer(true, 10, 5).await;

	assert!(token_calls < 50, "expected fewer than 50 token calls, got {token_calls}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disabled_single_flight_fetches_for_every_request() {
	assert_eq!(hammer(false, 10, 5).await, 50);
}

#[tokio::test]
async fn failing_cache_still_serves_requests() {
	let servers = Arc::new(FakeServers::new());
	let client = build_client(config().with_cache(Arc::new(FailingCache)), &servers);

	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(servers.token_calls(), 2);
	assert_eq!(client.fetch_metrics().successes(), 2);
}

#[tokio::test]
async fn broken_token_server_fails_before_the_resource_request() {
	let servers = Arc::new(FakeServers::new().broken());
	let client = build_client(config(), &servers);
	let err = client
		.execute(resource_request())
		.await
		.expect_err("Unparseable token response should fail the request.");

	assert!(matches!(err.root(), Error::Parse(ParseError::MalformedBody(_))));
	assert_eq!(servers.token_calls(), 1);
	assert_eq!(servers.resource_calls(), 0);
}

#[tokio::test]
async fn locked_token_server_reports_status_and_body_each_time() {
	let servers = Arc::new(FakeServers::new().with_expected_secret("rotated-secret"));
	let client = build_client(config(), &servers);

	for attempt in 1..=2 {
		let err = client
			.execute(resource_request())
			.await
			.expect_err("Rejected credentials should fail the request.");

		match err.root() {
			Error::TokenEndpoint { status, body } => {
				assert_eq!(*status, 401);
				assert!(body.contains("invalid_client"));
			},
			other => panic!("Unexpected error {other:?}."),
		}

		assert_eq!(servers.token_calls(), attempt);
	}

	assert_eq!(servers.resource_calls(), 0);
	assert_eq!(client.fetch_metrics().failures(), 2);
}

#[tokio::test]
async fn unreachable_resource_server_surfaces_transport_error() {
	let servers = Arc::new(FakeServers::new());
	let client = build_client(config(), &servers);
	let err = client
		.execute(request_to("https://unknown.test/resource"))
		.await
		.expect_err("Unknown host should fail the request.");

	assert!(matches!(err, Error::Transport(_)));
	assert_eq!(servers.token_calls(), 1);
}

#[test]
fn invalid_token_url_fails_client_construction() {
	let servers = Arc::new(FakeServers::new());
	let err = Client::<FakeServers>::with_http_client(
		ClientConfig::new("not a url", CLIENT_ID, CLIENT_SECRET),
		servers,
	)
	.expect_err("Relative token URL should be rejected.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::InvalidTokenUrl { ref url, .. }) if url == "not a url"
	));
}

#[tokio::test]
async fn first_use_expires_whatever_the_cache_held() {
	let servers = Arc::new(FakeServers::new());
	let cache = Arc::new(MemoryCache::default());

	cache
		.put(Token::new("stale-token"))
		.await
		.expect("Seeding the memory cache should succeed.");

	let client = build_client(config().with_cache(cache.clone()), &servers);

	assert_eq!(send(&client).await, StatusCode::OK);
	assert_eq!(servers.token_calls(), 1);
	assert_eq!(
		cache.get().await.expect("Memory cache should hold the fresh token.").value.expose(),
		"token-1"
	);
}
