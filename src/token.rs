//! Cached bearer token value object and its validity rules.

pub mod secret;

pub use secret::TokenSecret;

// self
use crate::{_prelude::*, cache::CacheError};

/// Bearer token plus its expirability state.
///
/// A token built with [`Token::new`] never expires on its own. It becomes expirable once
/// [`Token::set_expiration`] applies the lifetime reported by the token endpoint, or once
/// [`Token::expire`] invalidates it because the resource server refused it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Access token secret; callers must avoid logging it.
	pub value: TokenSecret,
	/// Hard-expiry instant, only meaningful when `expirable` is set.
	#[serde(with = "time::serde::rfc3339")]
	pub deadline: OffsetDateTime,
	/// Whether `deadline` participates in validity checks.
	pub expirable: bool,
}
impl Token {
	/// Wraps a freshly issued access token without an expiry.
	pub fn new(value: impl Into<String>) -> Self {
		Self { value: TokenSecret::new(value), deadline: OffsetDateTime::UNIX_EPOCH, expirable: false }
	}

	/// Placeholder for a slot that was never written; it is never valid.
	pub fn unset() -> Self {
		let mut token = Self::new("");

		token.expire();

		token
	}

	/// Decodes a token persisted with [`Token::to_json`].
	pub fn from_json(bytes: &[u8]) -> Result<Self, CacheError> {
		let de = &mut serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(de)
			.map_err(|e| CacheError::Serialization { message: format!("Failed to decode token: {e}") })
	}

	/// Encodes the token for file- or remote-backed caches.
	pub fn to_json(&self) -> Result<Vec<u8>, CacheError> {
		serde_json::to_vec(self)
			.map_err(|e| CacheError::Serialization { message: format!("Failed to encode token: {e}") })
	}

	/// Checks whether the token can still be presented at `now`.
	///
	/// Non-expirable tokens are always valid. Expirable tokens must outlive `now` by more
	/// than `toleration` so renewal happens before the hard deadline. A window reaching past
	/// the representable date range leaves no expirable token valid.
	pub fn is_valid(&self, now: OffsetDateTime, toleration: Duration) -> bool {
		!self.expirable || now.checked_add(toleration).is_some_and(|limit| self.deadline > limit)
	}

	/// Time left before the hard deadline; negative once it has passed.
	pub fn remaining(&self, now: OffsetDateTime) -> Duration {
		self.deadline - now
	}

	/// Forces the token to be considered expired from now on.
	pub fn expire(&mut self) {
		self.expirable = true;
		self.deadline = OffsetDateTime::UNIX_EPOCH;
	}

	/// Schedules the hard-expiry instant reported by the token endpoint.
	pub fn set_expiration(&mut self, deadline: OffsetDateTime) {
		self.expirable = true;
		self.deadline = deadline;
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("value", &self.value)
			.field("deadline", &self.deadline)
			.field("expirable", &self.expirable)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn non_expirable_token_is_always_valid() {
		let token = Token::new("abc");
		let now = macros::datetime!(2030-01-01 00:00 UTC);

		assert!(token.is_valid(now, Duration::ZERO));
		assert!(token.is_valid(now, Duration::hours(24)));
	}

	#[test]
	fn expirable_token_honours_toleration_window() {
		let now = macros::datetime!(2025-06-01 12:00 UTC);
		let mut token = Token::new("abc");

		token.set_expiration(now + Duration::seconds(30));

		assert!(token.is_valid(now, Duration::ZERO));
		assert!(token.is_valid(now, Duration::seconds(29)));
		assert!(!token.is_valid(now, Duration::seconds(30)));
		assert!(!token.is_valid(now + Duration::seconds(30), Duration::ZERO));
		assert_eq!(token.remaining(now), Duration::seconds(30));
	}

	#[test]
	fn out_of_range_toleration_invalidates_expirable_tokens() {
		let now = macros::datetime!(2025-06-01 12:00 UTC);
		let huge = Duration::seconds(1_000_000_000_000);
		let mut token = Token::new("abc");

		assert!(token.is_valid(now, huge));

		token.set_expiration(now + Duration::days(365));

		assert!(!token.is_valid(now, huge));
		assert!(!token.is_valid(now, Duration::MAX));
	}

	#[test]
	fn expire_invalidates_regardless_of_previous_state() {
		let now = macros::datetime!(2025-06-01 12:00 UTC);
		let mut token = Token::new("abc");

		token.expire();

		assert!(token.expirable);
		assert!(!token.is_valid(now, Duration::ZERO));
		assert!(!Token::unset().is_valid(now, Duration::ZERO));
		assert_eq!(Token::unset().value.expose(), "");
	}

	#[test]
	fn json_round_trip_preserves_all_fields() {
		let mut token = Token::new("round-trip");

		token.set_expiration(macros::datetime!(2025-06-01 12:00:30 UTC));

		let bytes = token.to_json().expect("Token should encode to JSON.");
		let text = String::from_utf8(bytes.clone()).expect("Encoded token should be UTF-8.");

		assert!(text.contains("\"value\":\"round-trip\""));
		assert!(text.contains("\"deadline\":\"2025-06-01T12:00:30Z\""));
		assert!(text.contains("\"expirable\":true"));
		assert_eq!(Token::from_json(&bytes).expect("Token should decode from JSON."), token);
	}

	#[test]
	fn from_json_reports_failing_field() {
		let err = Token::from_json(br#"{"value":"abc","deadline":42,"expirable":false}"#)
			.expect_err("Numeric deadline should be rejected.");

		assert!(matches!(&err, CacheError::Serialization { message } if message.contains("deadline")));
	}

	#[test]
	fn debug_output_redacts_value() {
		let rendered = format!("{:?}", Token::new("super-secret"));

		assert!(!rendered.contains("super-secret"));
		assert!(rendered.contains("<redacted>"));
	}
}
