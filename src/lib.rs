//! # flightcache
//!
//! A process-local caching toolkit built from three composable pieces:
//!
//! - [`Cache`] - A thread-safe key-value store with optional TTL expiration,
//!   lazy (on-read) deletion, and an optional periodic background sweep
//! - [`SingleflightGroup`] - Call coalescing that guarantees at most one
//!   in-flight computation per key across concurrent callers
//! - [`FileCache`] - A persisted variant backed by a filesystem directory,
//!   with mtime-driven TTL and an optional total-size budget
//!
//! ## Features
//!
//! - **Lock-free reads**: the in-memory store uses [DashMap](https://docs.rs/dashmap),
//!   so readers never block other readers
//! - **TTL expiration**: per-instance default with per-call override, enforced
//!   lazily on read and optionally by an active sweep thread
//! - **Deterministic teardown**: each cache owns its sweep thread and joins it
//!   on drop; nothing leaks, nothing relies on finalizers
//! - **Typed retrieval**: mixed-type caching through [`AnyValue`] with errors
//!   that distinguish "not found" from "found but wrong type"
//! - **Size-budgeted persistence**: the file cache can reject writes that
//!   would push the directory past a configured byte limit
//!
//! ## Quick Start
//!
//! ```
//! use flightcache::Cache;
//! use std::time::Duration;
//!
//! // Entries live 5 minutes; a sweep pass runs every minute.
//! let cache: Cache<String, u64> = Cache::new(
//!     Duration::from_secs(300),
//!     Duration::from_secs(60),
//! );
//!
//! cache.set("hits".to_string(), 1);
//! assert_eq!(cache.get(&"hits".to_string()), Some(1));
//! ```
//!
//! ## Get-or-Compute Under Concurrency
//!
//! The cache and the singleflight group are designed to be composed by hand:
//! check the cache, and only on a miss run the computation through the group
//! so concurrent misses for the same key share one execution.
//!
//! ```
//! use flightcache::{Cache, SingleflightGroup};
//! use std::time::Duration;
//!
//! let cache: Cache<u32, String> = Cache::new(Duration::ZERO, Duration::ZERO);
//! let group: SingleflightGroup<u32, String, String> = SingleflightGroup::new();
//!
//! let get = |key: u32| -> Result<String, String> {
//!     if let Some(hit) = cache.get(&key) {
//!         return Ok(hit);
//!     }
//!     group.run(key, || {
//!         let value = format!("expensive-{key}");
//!         cache.set(key, value.clone());
//!         Ok(value)
//!     })
//! };
//!
//! assert_eq!(get(7).unwrap(), "expensive-7");
//! assert_eq!(cache.get(&7), Some("expensive-7".to_string()));
//! ```
//!
//! ## Persistence
//!
//! ```
//! use flightcache::FileCache;
//! use std::time::Duration;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let cache = FileCache::new(dir.path(), Duration::ZERO, Duration::ZERO, 0).unwrap();
//! cache.set(&["report", "2024"], b"contents");
//! assert_eq!(cache.get(&["report", "2024"]), Some(b"contents".to_vec()));
//! ```

mod any_value;
mod byte_size;
mod cache;
mod entry;
mod error;
mod file_cache;
mod singleflight;
mod sweeper;

pub use any_value::{value_of, AnyValue};
pub use byte_size::ByteSize;
pub use cache::Cache;
pub use entry::Entry;
pub use error::CacheError;
pub use file_cache::FileCache;
pub use singleflight::SingleflightGroup;
