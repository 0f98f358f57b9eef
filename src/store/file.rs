//! JSON file mirror of the token slot for warm restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
	sync::atomic::{AtomicU64, Ordering},
};
// crates.io
use parking_lot::Mutex;
// self
use crate::{_prelude::*, auth::Token, store::StoreError};

/// Token plus acquisition instant as persisted on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
	/// Cached bearer token.
	pub token: Token,
	/// Instant the token was acquired.
	#[serde(with = "time::serde::rfc3339")]
	pub acquired_at: OffsetDateTime,
}

/// Non-authoritative token cache persisted to a JSON file after each change.
///
/// Writes are staged with a sequence number and may run on any thread; a write older than
/// the last one applied is dropped, so the file always ends on the newest state.
#[derive(Clone, Debug)]
pub struct FileTokenCache {
	path: PathBuf,
	staged: Arc<AtomicU64>,
	applied: Arc<Mutex<u64>>,
}
impl FileTokenCache {
	/// Creates a cache at the provided path, creating parent directories eagerly.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path, staged: Default::default(), applied: Default::default() })
	}

	/// Reserves the next write slot for `cached` (`None` clears the file).
	///
	/// Call this while the state that produced `cached` is still locked.
	pub fn stage(&self, cached: Option<CachedToken>) -> PendingWrite {
		let sequence = self.staged.fetch_add(1, Ordering::SeqCst) + 1;

		PendingWrite { cache: self.clone(), sequence, cached }
	}

	/// Location of the cache file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Reads the cached token, if any.
	pub fn load(&self) -> Result<Option<CachedToken>, StoreError> {
		if !self.path.exists() {
			return Ok(None);
		}

		let bytes = fs::read(&self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", self.path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(None);
		}

		serde_json::from_slice(&bytes).map(Some).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", self.path.display()),
		})
	}

	/// Atomically replaces the file contents with `cached`.
	pub fn persist(&self, cached: &CachedToken) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(cached).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize cached token: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	/// Removes the cache file so a cleared token is not resurrected on restart.
	pub fn clear(&self) -> Result<(), StoreError> {
		match fs::remove_file(&self.path) {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Backend {
				message: format!("Failed to remove {}: {e}", self.path.display()),
			}),
		}
	}

	fn apply(&self, sequence: u64, cached: Option<&CachedToken>) -> Result<bool, StoreError> {
		let mut applied = self.applied.lock();

		if sequence <= *applied {
			return Ok(false);
		}

		*applied = sequence;

		match cached {
			Some(cached) => self.persist(cached),
			None => self.clear(),
		}
		.map(|()| true)
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create cache directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}
}

/// A staged cache write waiting to hit the disk.
#[derive(Debug)]
pub struct PendingWrite {
	cache: FileTokenCache,
	sequence: u64,
	cached: Option<CachedToken>,
}
impl PendingWrite {
	/// Performs the write unless a newer one has already landed.
	///
	/// Returns `false` when the write was superseded.
	pub fn apply(self) -> Result<bool, StoreError> {
		self.cache.apply(self.sequence, self.cached.as_ref())
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process, time::Duration};
	// self
	use super::*;
	use crate::store::TokenStore;

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"payment_relay_token_cache_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn persisted_token_warm_starts_a_new_store() {
		let path = temp_path("warm");
		let store = TokenStore::with_cache(
			FileTokenCache::open(&path).expect("Failed to open token cache file."),
		);

		store.replace(Token::new("cached-token"));
		drop(store);

		let reopened = TokenStore::with_cache(
			FileTokenCache::open(&path).expect("Failed to reopen token cache file."),
		);

		assert!(!reopened.is_ready());
		assert!(reopened.warm_start(Duration::from_secs(600)).expect("Warm start failed."));
		assert!(reopened.is_ready(), "A fresh cached token should open the gate before any login.");
		assert_eq!(reopened.current().map(|t| t.expose().to_owned()), Some("cached-token".into()));

		reopened.invalidate();

		assert!(!path.exists(), "Invalidating the store must clear the cache file.");
	}

	#[test]
	fn stale_cached_token_is_ignored() {
		let path = temp_path("stale");
		let cache = FileTokenCache::open(&path).expect("Failed to open token cache file.");

		cache
			.persist(&CachedToken {
				token: Token::new("old-token"),
				acquired_at: OffsetDateTime::now_utc() - time::Duration::hours(2),
			})
			.expect("Failed to persist stale token fixture.");

		let store = TokenStore::with_cache(cache.clone());

		assert!(!store.warm_start(Duration::from_secs(3300)).expect("Warm start failed."));
		assert!(!store.is_ready());

		cache.clear().expect("Failed to remove temporary token cache.");
	}

	#[test]
	fn corrupt_cache_reports_serialization_error() {
		let path = temp_path("corrupt");

		fs::write(&path, b"not json").expect("Failed to write corrupt cache fixture.");

		let cache = FileTokenCache::open(&path).expect("Failed to open token cache file.");
		let err = cache.load().expect_err("Corrupt cache must fail to load.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		cache.clear().expect("Failed to remove temporary token cache.");
	}

	#[test]
	fn superseded_write_is_dropped() {
		let path = temp_path("order");
		let cache = FileTokenCache::open(&path).expect("Failed to open token cache file.");
		let cached = |token: &str| CachedToken {
			token: Token::new(token),
			acquired_at: OffsetDateTime::now_utc(),
		};
		let older = cache.stage(Some(cached("older")));
		let newer = cache.stage(Some(cached("newer")));

		assert!(newer.apply().expect("Newer write should succeed."));
		assert!(!older.apply().expect("Superseded write should be skipped."));
		assert_eq!(
			cache.load().expect("Cache should load.").map(|c| c.token.expose().to_owned()),
			Some("newer".into()),
		);

		cache.clear().expect("Failed to remove temporary token cache.");
	}

	#[tokio::test]
	async fn runtime_mirror_lands_newest_state() {
		let path = temp_path("runtime");
		let cache = FileTokenCache::open(&path).expect("Failed to open token cache file.");
		let store = TokenStore::with_cache(cache.clone());

		for i in 0..16 {
			store.replace(Token::new(format!("token-{i}")));
		}

		store.invalidate();
		store.replace(Token::new("last"));

		let loaded = || cache.load().ok().flatten().map(|c| c.token.expose().to_owned());

		for _ in 0..200 {
			if loaded().as_deref() == Some("last") {
				break;
			}

			tokio::time::sleep(Duration::from_millis(10)).await;
		}

		assert_eq!(loaded().as_deref(), Some("last"));

		tokio::time::sleep(Duration::from_millis(50)).await;

		assert_eq!(loaded().as_deref(), Some("last"), "A stale write must not land afterwards.");

		cache.clear().expect("Failed to remove temporary token cache.");
	}
}
