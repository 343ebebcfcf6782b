use crate::error::CacheError;
use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

/// A type-erased cached value tagged with its concrete type name.
///
/// A single cache instance can only hold one value type, so mixed-type
/// caching goes through `AnyValue`: the value is erased behind
/// `dyn Any` and the concrete type's descriptor is captured at construction,
/// since it cannot be recovered from the erased value later. Retrieval
/// through [`value_of`] checks the type and reports a mismatch with both
/// descriptors instead of panicking.
///
/// Cloning is cheap; the payload is shared behind an `Arc`.
///
/// # Examples
///
/// ```
/// use flightcache::{value_of, AnyValue, Cache, CacheError};
/// use std::time::Duration;
///
/// let cache: Cache<u32, AnyValue> = Cache::new(Duration::ZERO, Duration::ZERO);
/// cache.set(1, AnyValue::new("a".to_string()));
/// cache.set(2, AnyValue::new(3i64));
///
/// let s: String = value_of(cache.get(&1)).unwrap();
/// assert_eq!(s, "a");
/// let n: i64 = value_of(cache.get(&2)).unwrap();
/// assert_eq!(n, 3);
///
/// // Asking for the wrong type yields a typed error, not a panic.
/// let err = value_of::<String>(cache.get(&2)).unwrap_err();
/// assert!(matches!(err, CacheError::WrongType { .. }));
/// ```
#[derive(Clone)]
pub struct AnyValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl AnyValue {
    /// Wraps a value, recording its concrete type descriptor.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: any::type_name::<T>(),
        }
    }

    /// The descriptor of the wrapped value's concrete type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true if the wrapped value is of type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Recovers a clone of the wrapped value as `T`.
    ///
    /// Fails with [`CacheError::WrongType`] naming both the stored and the
    /// requested type when `T` does not match.
    pub fn downcast<T: Any + Clone>(&self) -> Result<T, CacheError> {
        self.value
            .downcast_ref::<T>()
            .cloned()
            .ok_or(CacheError::WrongType {
                actual: self.type_name,
                expected: any::type_name::<T>(),
            })
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Typed retrieval from an any-valued cache lookup.
///
/// Takes the `Option` returned by [`Cache::get`](crate::Cache::get) on a
/// `Cache<K, AnyValue>` and produces a strongly-typed value, distinguishing
/// "not found" from "found but wrong type".
pub fn value_of<T: Any + Clone>(value: Option<AnyValue>) -> Result<T, CacheError> {
    match value {
        Some(v) => v.downcast(),
        None => Err(CacheError::NotFound),
    }
}
