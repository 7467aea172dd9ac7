//! [`TokenCache`] whose every operation fails, for fault-injection tests.

// self
use crate::{
	cache::{CacheError, CacheFuture, TokenCache},
	token::Token,
};

/// Cache that rejects every call, forcing the client to fetch a token for each request.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingCache;
impl FailingCache {
	fn failure() -> CacheError {
		CacheError::Backend { message: "failing cache rejects every operation".into() }
	}
}
impl TokenCache for FailingCache {
	fn get(&self) -> CacheFuture<'_, Token> {
		Box::pin(async { Err(Self::failure()) })
	}

	fn put(&self, _: Token) -> CacheFuture<'_, ()> {
		Box::pin(async { Err(Self::failure()) })
	}

	fn expire(&self) -> CacheFuture<'_, ()> {
		Box::pin(async { Err(Self::failure()) })
	}
}
