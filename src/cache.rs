use crate::entry::Entry;
use crate::sweeper::Sweeper;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A thread-safe key-value store with per-instance TTL expiration.
///
/// Values are stored in a [`DashMap`], so readers never block other readers
/// and `set`/`delete` are individually atomic. Expiration is lazy by
/// default: an expired entry is removed by the first `get` that observes it.
/// When constructed with a nonzero sweep interval, a background thread
/// additionally removes expired entries every interval, so entries nobody
/// reads still get reclaimed.
///
/// The cache is the sole owner of its sweep thread. Dropping the cache
/// signals the thread, joins it, and clears the store; share the cache
/// across threads behind an `Arc`.
///
/// # Type Parameters
///
/// * `K` - The key type
/// * `V` - The cached value type; `get` hands out clones
///
/// # Consistency
///
/// Same-key operations from different threads race with last-write-wins
/// semantics. No compare-and-swap is exposed; a `get`/`set` pair is not
/// atomic. Distinct keys are fully independent.
///
/// # Examples
///
/// ```
/// use flightcache::Cache;
/// use std::time::Duration;
///
/// // No default TTL, no background sweep.
/// let cache: Cache<u32, String> = Cache::new(Duration::ZERO, Duration::ZERO);
/// cache.set(1, "a".to_string());
/// assert_eq!(cache.get(&1), Some("a".to_string()));
/// cache.delete(&1);
/// assert_eq!(cache.get(&1), None);
/// ```
///
/// With a TTL, entries stop being visible once the deadline passes:
///
/// ```
/// use flightcache::Cache;
/// use std::time::Duration;
///
/// let cache: Cache<u32, &str> = Cache::new(Duration::from_millis(20), Duration::ZERO);
/// cache.set(1, "a");
/// assert_eq!(cache.get(&1), Some("a"));
/// std::thread::sleep(Duration::from_millis(50));
/// assert_eq!(cache.get(&1), None);
/// ```
pub struct Cache<K: Eq + Hash, V> {
    map: Arc<DashMap<K, Entry<V>>>,
    default_ttl: Duration,
    sweeper: Option<Sweeper>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache with a default TTL and an active-sweep interval.
    ///
    /// A zero `default_ttl` stores entries without expiration unless
    /// [`set_with_ttl`](Cache::set_with_ttl) overrides it per call. A zero
    /// `sweep_interval` disables the background sweep entirely; only lazy
    /// expiration on read applies, so an entry with no readers may live
    /// past its deadline.
    pub fn new(default_ttl: Duration, sweep_interval: Duration) -> Self {
        let map = Arc::new(DashMap::new());
        let sweeper = (!sweep_interval.is_zero()).then(|| {
            let map = Arc::clone(&map);
            Sweeper::spawn(sweep_interval, move || {
                let now = Instant::now();
                map.retain(|_, entry: &mut Entry<V>| !entry.is_expired(now));
            })
        });
        Self {
            map,
            default_ttl,
            sweeper,
        }
    }

    /// Stores a value under `key` with the instance default TTL.
    ///
    /// Unconditionally overwrites any existing entry, restarting its
    /// expiration clock. Never fails.
    pub fn set(&self, key: K, value: V) {
        self.map.insert(key, Entry::new(value, self.default_ttl));
    }

    /// Stores a value with a per-call TTL, ignoring the instance default.
    ///
    /// A zero `ttl` stores the entry without expiration even when the
    /// instance has a default TTL.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.map.insert(key, Entry::new(value, ttl));
    }

    /// Returns a clone of the value under `key`, if present and unexpired.
    ///
    /// An entry observed past its deadline is deleted as a side effect of
    /// the read and `None` is returned.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        {
            let entry = self.map.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }
        // Guarded removal: only delete what was actually observed expired,
        // so a racing overwrite of the same key is not lost.
        self.map.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    /// Removes the entry under `key`. No-op for an absent key.
    pub fn delete(&self, key: &K) {
        self.map.remove(key);
    }

    /// Empties the store.
    ///
    /// Concurrent readers observe either the pre-clear or post-clear state
    /// for any given key, never a torn entry.
    pub fn clear(&self) {
        self.map.clear();
    }

    /// Number of stored entries, counting expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Eq + Hash, V> Drop for Cache<K, V> {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.stop();
        }
        self.map.clear();
    }
}
