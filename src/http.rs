//! HTTP capability used for both the token endpoint and the resource server.
//!
//! The client never talks to the network directly. It hands fully built
//! [`HttpRequest`]s to an [`HttpDoer`] and inspects the returned [`HttpResponse`]. The bundled
//! [`ReqwestHttpClient`] (feature `reqwest`) covers the common case; tests and custom stacks
//! provide their own implementation.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
pub use oauth2::{
	HttpRequest, HttpResponse,
	http::{Method, Request, Response, StatusCode, header},
};
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpDoer::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Sends one HTTP request and yields its response.
///
/// Implementations must return every response the server produced, whatever its status, and
/// only fail for transport problems (DNS, TCP, TLS, body streaming). Status interpretation
/// belongs to the caller.
pub trait HttpDoer
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and collects the full response body.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_>;
}
impl<D> HttpDoer for Arc<D>
where
	D: ?Sized + HttpDoer,
{
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		(**self).execute(request)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token endpoints
/// return results directly. Configure any custom [`ReqwestClient`] accordingly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpDoer for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = self.0.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
