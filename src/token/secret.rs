//! Access-token value as handed out by the token endpoint.

// self
use crate::{
	_prelude::*,
	http::header::{HeaderValue, InvalidHeaderValue},
};

/// Access token that never shows up in `Debug`/`Display` output.
///
/// Persisted records store it as a plain JSON string. The empty value marks a slot that holds
/// no usable credential.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps an issued access token.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Raw token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when no credential is held.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// `Bearer <token>` header value, flagged sensitive so HTTP stacks skip it when logging.
	pub fn bearer_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
		let mut header = HeaderValue::from_str(&format!("Bearer {}", self.0))?;

		header.set_sensitive(true);

		Ok(header)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(if self.0.is_empty() { "TokenSecret(<empty>)" } else { "TokenSecret(<redacted>)" })
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
