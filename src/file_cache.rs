use crate::byte_size::ByteSize;
use crate::error::CacheError;
use crate::sweeper::Sweeper;
use parking_lot::RwLock;
use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::warn;
use walkdir::WalkDir;

const CACHE_FILE_SUFFIX: &str = ".cache";

/// A persistent key-value cache backed by a filesystem directory.
///
/// Entries are identified by an ordered sequence of string key segments.
/// Each segment is independently SHA-1 hashed and hex encoded into a path
/// component, so the on-disk layout never reveals key content and stays
/// filesystem-safe; the leaf file carries a `.cache` suffix and holds the
/// raw value bytes with no header. A file's modification time is the sole
/// expiration signal, which means overwriting an entry implicitly restarts
/// its TTL clock.
///
/// All operations are serialized by a single store-wide reader/writer lock:
/// reads run concurrently with each other, writes are fully exclusive. That
/// coarse granularity is what makes [`update`](FileCache::update)'s
/// read-compute-write sequence safe; the cost is that writes to unrelated
/// keys also serialize.
///
/// An optional total-size budget rejects writes that would push the
/// directory past the limit. Admission decisions use a size snapshot
/// refreshed only by the constructor-time walk and each periodic sweep, so
/// they can be stale by up to one sweep interval. Rejections and per-file
/// I/O failures are logged, not returned; a cache miss is never fatal.
///
/// Independent processes must use disjoint root directories; there is no
/// cross-process locking.
///
/// # Examples
///
/// ```
/// use flightcache::FileCache;
/// use std::time::Duration;
///
/// let dir = tempfile::tempdir().unwrap();
/// let cache = FileCache::new(dir.path(), Duration::ZERO, Duration::ZERO, 0).unwrap();
///
/// cache.set(&["users", "42"], b"payload");
/// assert_eq!(cache.get(&["users", "42"]), Some(b"payload".to_vec()));
///
/// cache.update(&["users", "42"], |current| {
///     let mut next = current.unwrap_or_default();
///     next.extend_from_slice(b"!");
///     next
/// });
/// assert_eq!(cache.get(&["users", "42"]), Some(b"payload!".to_vec()));
/// ```
pub struct FileCache {
    shared: Arc<Shared>,
    sweeper: Option<Sweeper>,
}

struct Shared {
    root: PathBuf,
    ttl: Duration,
    max_total_bytes: u64,
    stats: RwLock<DirStats>,
}

/// Size snapshot guarded by the store-wide lock.
///
/// `total_bytes` is refreshed only by full directory walks; between walks it
/// is a stale estimate. A value of 0 (empty store, or not yet measured)
/// bypasses admission control entirely.
#[derive(Default)]
struct DirStats {
    total_bytes: u64,
}

impl FileCache {
    /// Opens a file cache rooted at `dir`, creating the directory if absent.
    ///
    /// A zero `ttl` disables expiration, a zero `sweep_interval` disables
    /// the periodic sweep, and a non-positive `max_total_bytes` disables the
    /// size budget. Construction performs one synchronous prune-and-measure
    /// walk, so stale files from an earlier process are dropped up front and
    /// the size snapshot is seeded before the first periodic tick.
    ///
    /// Directory creation failure is the one constructor error surfaced to
    /// the caller.
    pub fn new(
        dir: impl AsRef<Path>,
        ttl: Duration,
        sweep_interval: Duration,
        max_total_bytes: i64,
    ) -> Result<Self, CacheError> {
        let root = dir.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| CacheError::OpenRoot {
            path: root.clone(),
            source,
        })?;
        let shared = Arc::new(Shared {
            root,
            ttl,
            max_total_bytes: max_total_bytes.max(0) as u64,
            stats: RwLock::new(DirStats::default()),
        });
        shared.delete_expired();
        let sweeper = (!sweep_interval.is_zero()).then(|| {
            let shared = Arc::clone(&shared);
            Sweeper::spawn(sweep_interval, move || shared.delete_expired())
        });
        Ok(Self { shared, sweeper })
    }

    /// Writes `value` under the hashed path for `keys`, overwriting any
    /// prior content.
    ///
    /// Intermediate directories are created as needed. When the size budget
    /// would be exceeded, or a file operation fails, the write is skipped
    /// and the failure logged; callers cannot distinguish a rejected write
    /// from a successful one by return value.
    pub fn set<S: AsRef<str>>(&self, keys: &[S], value: &[u8]) {
        let stats = self.shared.stats.write();
        self.shared.store(&stats, keys, value);
    }

    /// Reads the value under `keys`, if present and unexpired.
    ///
    /// With a nonzero TTL, a file whose modification time is older than
    /// now − ttl is deleted as a side effect of the read and `None` is
    /// returned.
    pub fn get<S: AsRef<str>>(&self, keys: &[S]) -> Option<Vec<u8>> {
        let _stats = self.shared.stats.read();
        self.shared.load(keys)
    }

    /// Atomically transforms the value under `keys`.
    ///
    /// The exclusive lock is held across the whole read-compute-write
    /// sequence, so concurrent `update`s never interleave, including
    /// updates to different keys, since the lock is store-wide. `apply`
    /// receives `None` when no current value exists; its return value
    /// becomes the new content, subject to the same admission check and
    /// logging as [`set`](FileCache::set).
    pub fn update<S, F>(&self, keys: &[S], apply: F)
    where
        S: AsRef<str>,
        F: FnOnce(Option<Vec<u8>>) -> Vec<u8>,
    {
        let stats = self.shared.stats.write();
        let current = self.shared.load(keys);
        let next = apply(current);
        self.shared.store(&stats, keys, &next);
    }

    /// Removes the entry under `keys`. No-op for an absent entry.
    pub fn delete<S: AsRef<str>>(&self, keys: &[S]) {
        let _stats = self.shared.stats.write();
        let _ = fs::remove_file(self.shared.entry_path(keys));
    }
}

impl Drop for FileCache {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.stop();
        }
    }
}

impl Shared {
    /// Write path shared by `set` and `update`. The caller proves it holds
    /// the exclusive lock by passing the guarded snapshot.
    fn store<S: AsRef<str>>(&self, stats: &DirStats, keys: &[S], value: &[u8]) {
        if let Err(err) = self.check_budget(stats, value.len() as u64) {
            warn!(error = %err, "skipped writing cache file");
            return;
        }
        let path = self.entry_path(keys);
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(error = %err, path = %parent.display(), "failed to create cache directory");
                return;
            }
        }
        if let Err(err) = fs::write(&path, value) {
            warn!(error = %err, path = %path.display(), "failed to write cache file");
        }
    }

    /// Read path shared by `get` and `update`; the caller holds the lock.
    fn load<S: AsRef<str>>(&self, keys: &[S]) -> Option<Vec<u8>> {
        let path = self.entry_path(keys);
        let meta = fs::metadata(&path).ok()?;
        if !self.ttl.is_zero() && is_older_than(&meta, self.ttl) {
            let _ = fs::remove_file(&path);
            return None;
        }
        fs::read(&path).ok()
    }

    /// Walks the store, deleting expired files and recomputing the size
    /// snapshot from the survivors.
    fn delete_expired(&self) {
        let mut stats = self.stats.write();
        let mut total_bytes = 0u64;
        for entry in WalkDir::new(&self.root).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            if !self.ttl.is_zero() && is_older_than(&meta, self.ttl) {
                if let Err(err) = fs::remove_file(entry.path()) {
                    warn!(error = %err, path = %entry.path().display(), "failed to remove expired cache file");
                }
            } else {
                total_bytes += meta.len();
            }
        }
        stats.total_bytes = total_bytes;
    }

    fn check_budget(&self, stats: &DirStats, incoming: u64) -> Result<(), CacheError> {
        if self.max_total_bytes == 0 || stats.total_bytes == 0 {
            return Ok(());
        }
        if stats.total_bytes + incoming > self.max_total_bytes {
            return Err(CacheError::SizeLimitExceeded {
                current: ByteSize(stats.total_bytes as i64),
                incoming: ByteSize(incoming as i64),
                limit: ByteSize(self.max_total_bytes as i64),
            });
        }
        Ok(())
    }

    fn entry_path<S: AsRef<str>>(&self, keys: &[S]) -> PathBuf {
        let mut path = self.root.clone();
        match keys.split_last() {
            Some((leaf, parents)) => {
                for segment in parents {
                    path.push(hash_segment(segment.as_ref()));
                }
                path.push(format!("{}{CACHE_FILE_SUFFIX}", hash_segment(leaf.as_ref())));
            }
            // An empty key sequence maps to a single file at the root.
            None => path.push(CACHE_FILE_SUFFIX),
        }
        path
    }
}

fn hash_segment(segment: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(segment.as_bytes());
    hex::encode(hasher.finalize())
}

fn is_older_than(meta: &fs::Metadata, ttl: Duration) -> bool {
    let Ok(modified) = meta.modified() else {
        return false;
    };
    match SystemTime::now().duration_since(modified) {
        Ok(age) => age > ttl,
        // An mtime in the future reads as not expired.
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_segments_hash_to_nested_fs_safe_components() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::ZERO, Duration::ZERO, 0).unwrap();
        let path = cache.shared.entry_path(&["a/b", "../escape"]);

        let rel = path.strip_prefix(dir.path()).unwrap();
        let components: Vec<_> = rel
            .iter()
            .map(|c| c.to_string_lossy().into_owned())
            .collect();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], hash_segment("a/b"));
        assert_eq!(components[1], format!("{}.cache", hash_segment("../escape")));
        // 40 hex chars of SHA-1, nothing the filesystem could interpret.
        assert_eq!(components[0].len(), 40);
        assert!(components[0].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn same_segment_always_hashes_identically() {
        assert_eq!(hash_segment("key"), hash_segment("key"));
        assert_ne!(hash_segment("key"), hash_segment("key2"));
    }

    #[test]
    fn budget_check_bypassed_without_limit_or_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let unlimited = FileCache::new(dir.path(), Duration::ZERO, Duration::ZERO, 0).unwrap();
        let stats = DirStats { total_bytes: 1 << 40 };
        assert!(unlimited.shared.check_budget(&stats, 1 << 40).is_ok());

        let limited = FileCache::new(dir.path(), Duration::ZERO, Duration::ZERO, 1024).unwrap();
        // No snapshot yet: admit.
        let empty = DirStats { total_bytes: 0 };
        assert!(limited.shared.check_budget(&empty, 1 << 20).is_ok());
        // Snapshot present and the write would overflow: reject.
        let used = DirStats { total_bytes: 768 };
        assert!(limited.shared.check_budget(&used, 768).is_err());
        assert!(limited.shared.check_budget(&used, 256).is_ok());
    }
}
