//! File-backed [`TokenCache`] that survives process restarts.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	cache::{CacheError, CacheFuture, TokenCache},
	token::Token,
};

/// Persists the token as a JSON record (`value`, `deadline`, `expirable`) in a single file.
///
/// Every operation holds the cache mutex for its whole duration, including the
/// read-modify-write performed by [`TokenCache::expire`]. Writes go to a sibling temporary
/// file that is renamed over the target, so readers never observe a partial record.
#[derive(Clone, Debug)]
pub struct FileCache {
	path: PathBuf,
	lock: Arc<Mutex<()>>,
}
impl FileCache {
	/// Prepares a cache at the provided path; the file itself is created on first write.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path, lock: Default::default() })
	}

	/// Location of the token file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), CacheError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| CacheError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn load_locked(&self) -> Result<Token, CacheError> {
		let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
			ErrorKind::NotFound => CacheError::NotFound { key: self.path.display().to_string() },
			_ => CacheError::Backend {
				message: format!("Failed to read {}: {e}", self.path.display()),
			},
		})?;

		Token::from_json(&bytes)
	}

	fn persist_locked(&self, token: &Token) -> Result<(), CacheError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized = token.to_json()?;
		let tmp_path = staging_path(&self.path);

		{
			let mut file = File::create(&tmp_path).map_err(|e| CacheError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| CacheError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| CacheError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| CacheError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenCache for FileCache {
	fn get(&self) -> CacheFuture<'_, Token> {
		Box::pin(async move {
			let _guard = self.lock.lock();

			self.load_locked()
		})
	}

	fn put(&self, token: Token) -> CacheFuture<'_, ()> {
		Box::pin(async move {
			let _guard = self.lock.lock();

			self.persist_locked(&token)
		})
	}

	fn expire(&self) -> CacheFuture<'_, ()> {
		Box::pin(async move {
			let _guard = self.lock.lock();
			let mut token = self.load_locked()?;

			token.expire();

			self.persist_locked(&token)
		})
	}
}

/// Sibling path `<file name>.tmp`, unique per target so caches never share a temporary file.
fn staging_path(path: &Path) -> PathBuf {
	let mut name = path.as_os_str().to_owned();

	name.push(".tmp");

	PathBuf::from(name)
}
