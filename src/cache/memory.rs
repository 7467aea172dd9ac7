//! Thread-safe in-memory [`TokenCache`] used by default.

// self
use crate::{
	_prelude::*,
	cache::{CacheFuture, TokenCache},
	token::Token,
};

/// Process-local cache holding a single token behind one mutex.
///
/// Clones share the same slot, so reusing a clone across clients opts them into sharing
/// one token.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(Arc<Mutex<Option<Token>>>);
impl MemoryCache {
	fn get_now(&self) -> Token {
		self.0.lock().clone().unwrap_or_else(Token::unset)
	}

	fn put_now(&self, token: Token) {
		*self.0.lock() = Some(token);
	}

	fn expire_now(&self) {
		self.0.lock().get_or_insert_with(Token::unset).expire();
	}
}
impl TokenCache for MemoryCache {
	fn get(&self) -> CacheFuture<'_, Token> {
		Box::pin(async move { Ok(self.get_now()) })
	}

	fn put(&self, token: Token) -> CacheFuture<'_, ()> {
		Box::pin(async move {
			self.put_now(token);

			Ok(())
		})
	}

	fn expire(&self) -> CacheFuture<'_, ()> {
		Box::pin(async move {
			self.expire_now();

			Ok(())
		})
	}
}
