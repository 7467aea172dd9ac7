//! In-process token and resource servers used by the lifecycle tests.

#![allow(dead_code)]

// std
use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration as StdDuration,
};
// crates.io
use parking_lot::Mutex;
// self
use oauth2_client_credentials::{
	Client, ClientConfig,
	error::TransportError,
	http::{
		HttpDoer, HttpFuture, HttpRequest, HttpResponse, Method, Request, StatusCode,
		header::AUTHORIZATION,
	},
	url::form_urlencoded,
};

pub const TOKEN_URL: &str = "https://issuer.test/oauth/token";
pub const RESOURCE_URL: &str = "https://api.test/resource";
pub const CLIENT_ID: &str = "svc-client";
pub const CLIENT_SECRET: &str = "svc-secret";

/// Token server plus resource server behind one [`HttpDoer`].
///
/// The token server hands out `issued` to callers presenting the expected secret. The resource
/// server answers `200` only for `Bearer <accepted>` and `401` otherwise. Any other host is
/// unreachable.
pub struct FakeServers {
	token_calls: AtomicUsize,
	resource_calls: AtomicUsize,
	issued: Mutex<String>,
	accepted: Mutex<String>,
	expires_in: Option<String>,
	expected_secret: String,
	token_delay: Option<StdDuration>,
	broken: bool,
}
impl FakeServers {
	pub fn new() -> Self {
		Self {
			token_calls: AtomicUsize::new(0),
			resource_calls: AtomicUsize::new(0),
			issued: Mutex::new("token-1".into()),
			accepted: Mutex::new("token-1".into()),
			expires_in: None,
			expected_secret: CLIENT_SECRET.into(),
			token_delay: None,
			broken: false,
		}
	}

	/// Raw JSON value sent as `expires_in`.
	pub fn with_expires_in(mut self, raw: &str) -> Self {
		self.expires_in = Some(raw.into());

		self
	}

	/// Delays every token response so concurrent callers overlap.
	pub fn with_token_delay(mut self, delay: StdDuration) -> Self {
		self.token_delay = Some(delay);

		self
	}

	/// Secret the token server accepts.
	pub fn with_expected_secret(mut self, secret: &str) -> Self {
		self.expected_secret = secret.into();

		self
	}

	/// Makes the token server answer `200` with a body that is not JSON.
	pub fn broken(mut self) -> Self {
		self.broken = true;

		self
	}

	/// Switches both servers to a new token, invalidating the one clients hold.
	pub fn rotate(&self, token: &str) {
		*self.issued.lock() = token.into();
		*self.accepted.lock() = token.into();
	}

	pub fn token_calls(&self) -> usize {
		self.token_calls.load(Ordering::SeqCst)
	}

	pub fn resource_calls(&self) -> usize {
		self.resource_calls.load(Ordering::SeqCst)
	}

	async fn token_endpoint(&self, request: HttpRequest) -> HttpResponse {
		self.token_calls.fetch_add(1, Ordering::SeqCst);

		if let Some(delay) = self.token_delay {
			tokio::time::sleep(delay).await;
		}

		let form = form_urlencoded::parse(request.body()).into_owned().collect::<Vec<_>>();
		let field = |name: &str| form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

		if request.method() != Method::POST
			|| field("grant_type") != Some("client_credentials")
			|| field("client_id") != Some(CLIENT_ID)
			|| field("client_secret") != Some(self.expected_secret.as_str())
		{
			return respond(StatusCode::UNAUTHORIZED, r#"{"error":"invalid_client"}"#.into());
		}
		if self.broken {
			return respond(StatusCode::OK, "broken-token".into());
		}

		let issued = self.issued.lock().clone();
		let body = match &self.expires_in {
			Some(raw) => format!(r#"{{"access_token":"{issued}","expires_in":{raw}}}"#),
			None => format!(r#"{{"access_token":"{issued}"}}"#),
		};

		respond(StatusCode::OK, body)
	}

	fn resource_endpoint(&self, request: HttpRequest) -> HttpResponse {
		self.resource_calls.fetch_add(1, Ordering::SeqCst);

		let expected = format!("Bearer {}", self.accepted.lock());
		let presented = request.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());

		if presented == Some(expected.as_str()) {
			respond(StatusCode::OK, "resource-payload".into())
		} else {
			respond(StatusCode::UNAUTHORIZED, "token refused".into())
		}
	}
}
impl HttpDoer for FakeServers {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let target = request.uri().to_string();

			if target == TOKEN_URL {
				Ok(self.token_endpoint(request).await)
			} else if target == RESOURCE_URL {
				Ok(self.resource_endpoint(request))
			} else {
				let refused =
					io::Error::new(io::ErrorKind::ConnectionRefused, format!("no route to {target}"));

				Err(TransportError::from(refused))
			}
		})
	}
}

pub fn respond(status: StatusCode, body: String) -> HttpResponse {
	let mut response = HttpResponse::new(body.into_bytes());

	*response.status_mut() = status;

	response
}

pub fn resource_request() -> HttpRequest {
	request_to(RESOURCE_URL)
}

pub fn request_to(url: &str) -> HttpRequest {
	Request::builder()
		.method(Method::GET)
		.uri(url)
		.body(Vec::new())
		.expect("Resource request should build.")
}

pub fn config() -> ClientConfig {
	ClientConfig::new(TOKEN_URL, CLIENT_ID, CLIENT_SECRET)
}

pub fn build_client(config: ClientConfig, servers: &Arc<FakeServers>) -> Client<FakeServers> {
	Client::with_http_client(config, servers.clone())
		.expect("Client should build for the fake servers.")
}
