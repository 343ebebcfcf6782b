use crate::byte_size::ByteSize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for cache operations.
///
/// Lookup failures against an [`AnyValue`](crate::AnyValue)-holding cache
/// distinguish a missing entry from one of the wrong type, carrying both
/// type descriptors for diagnostics. Filesystem failures at construction
/// time are returned; per-entry filesystem failures inside the file cache
/// degrade to "value not cached" and are only logged.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No entry exists for the requested key.
    #[error("cache: not found")]
    NotFound,

    /// An entry exists but holds a value of a different type.
    #[error("cache: got [{actual}] but not [{expected}]")]
    WrongType {
        actual: &'static str,
        expected: &'static str,
    },

    /// Admitting the write would push the store past its size budget.
    ///
    /// The file cache constructs this for admission rejections but logs it
    /// instead of returning it; `set` stays infallible by design.
    #[error("cache: current dir size {current} + {incoming} would exceed limit {limit}")]
    SizeLimitExceeded {
        current: ByteSize,
        incoming: ByteSize,
        limit: ByteSize,
    },

    /// The cache root directory could not be created.
    #[error("cache: failed to open root directory {}", path.display())]
    OpenRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
