//! Token endpoint payload parsing.
//!
//! Token servers disagree on how `expires_in` is encoded: most send an integer, some send a
//! float, and a few send a numeric string. [`parse_token_response`] accepts all three and
//! rejects anything else explicitly instead of coercing it.

// std
use std::num::ParseIntError;
// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Access token and lifetime extracted from a token endpoint response.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenResponse {
	/// Non-empty access token string.
	pub access_token: String,
	/// Reported lifetime; zero when the endpoint omitted `expires_in`.
	pub expires_in: Duration,
}
impl Debug for TokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponse")
			.field("access_token", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

/// Rejections produced by [`parse_token_response`].
#[derive(Debug, ThisError)]
pub enum ParseError {
	/// Body is not a JSON object.
	#[error("Token response body is malformed.")]
	MalformedBody(#[source] serde_json::Error),
	/// `access_token` field is absent.
	#[error("Token response is missing the access_token field.")]
	MissingAccessToken,
	/// `access_token` is present but not a string.
	#[error("Token response carries a non-string access_token ({kind}).")]
	NonStringAccessToken {
		/// JSON type that was found instead.
		kind: &'static str,
	},
	/// `access_token` is an empty string.
	#[error("Token response carries an empty access_token.")]
	EmptyAccessToken,
	/// `expires_in` is a string that does not hold an integer.
	#[error("Token response carries an invalid expires_in string `{value}`.")]
	InvalidExpiresInString {
		/// Raw string value.
		value: String,
		/// Integer conversion failure.
		#[source]
		source: ParseIntError,
	},
	/// `expires_in` is neither a number nor a string.
	#[error("Token response carries an unexpected expires_in type ({kind}).")]
	UnexpectedExpiresInType {
		/// JSON type that was found instead.
		kind: &'static str,
	},
}

/// Extracts the access token and its lifetime from a token endpoint body.
///
/// Fractional `expires_in` values are truncated to whole seconds.
pub fn parse_token_response(body: &[u8]) -> Result<TokenResponse, ParseError> {
	let data: Map<String, Value> = serde_json::from_slice(body).map_err(ParseError::MalformedBody)?;
	let access_token = match data.get("access_token") {
		None => return Err(ParseError::MissingAccessToken),
		Some(Value::String(value)) if value.is_empty() => return Err(ParseError::EmptyAccessToken),
		Some(Value::String(value)) => value.to_owned(),
		Some(other) => return Err(ParseError::NonStringAccessToken { kind: json_kind(other) }),
	};
	let expires_in = match data.get("expires_in") {
		None => Duration::ZERO,
		Some(Value::Number(number)) => Duration::seconds(number_to_seconds(number)),
		Some(Value::String(value)) => {
			let seconds = value.parse::<i64>().map_err(|source| {
				ParseError::InvalidExpiresInString { value: value.to_owned(), source }
			})?;

			Duration::seconds(seconds)
		},
		Some(other) => return Err(ParseError::UnexpectedExpiresInType { kind: json_kind(other) }),
	};

	Ok(TokenResponse { access_token, expires_in })
}

fn number_to_seconds(number: &serde_json::Number) -> i64 {
	if let Some(seconds) = number.as_i64() {
		return seconds;
	}

	// Float-to-int casts truncate toward zero and saturate at the i64 bounds.
	number.as_f64().map(|seconds| seconds as i64).unwrap_or(i64::MAX)
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
