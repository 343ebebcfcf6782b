use dashmap::DashMap;
use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::Arc;

/// Per-key call coalescing for concurrent "compute if absent" work.
///
/// [`run`](SingleflightGroup::run) guarantees that for any number of
/// concurrent callers presenting the same key, the supplied computation
/// executes at most once and every caller receives a clone of that single
/// execution's result, `Ok` or `Err` alike. Once a call completes it is
/// forgotten: a later `run` with the same key computes afresh. This is a
/// deduplication mechanism for in-flight work, not a cache; pair it with a
/// [`Cache`](crate::Cache) to memoize results.
///
/// Different keys execute fully independently and concurrently.
///
/// # Examples
///
/// ```
/// use flightcache::SingleflightGroup;
///
/// let group: SingleflightGroup<&str, u32, String> = SingleflightGroup::new();
/// let value = group.run("answer", || Ok(42)).unwrap();
/// assert_eq!(value, 42);
///
/// // Errors propagate verbatim and are not retried by the group.
/// let err = group.run("answer", || Err::<u32, _>("boom".to_string()));
/// assert_eq!(err.unwrap_err(), "boom");
/// ```
pub struct SingleflightGroup<K, V, E> {
    calls: DashMap<K, Arc<Call<V, E>>>,
}

struct Call<V, E> {
    state: Mutex<CallState<V, E>>,
}

enum CallState<V, E> {
    Pending,
    Done(Result<V, E>),
}

impl<V, E> Default for Call<V, E> {
    fn default() -> Self {
        Self {
            state: Mutex::new(CallState::Pending),
        }
    }
}

impl<K, V, E> SingleflightGroup<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self {
            calls: DashMap::new(),
        }
    }

    /// Runs `compute` for `key`, coalescing with any in-flight call.
    ///
    /// The registry lock is held only to register or look up the per-key
    /// call, never across `compute`. The per-call mutex then serializes
    /// same-key callers: whoever acquires it first computes; the rest block
    /// until the result is available and receive a clone of it. The block
    /// is bounded only by the computation's own runtime.
    ///
    /// The completed call is removed from the registry before its mutex is
    /// released, so a caller arriving after completion starts a fresh call
    /// rather than reusing a stale memo.
    pub fn run<F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let call = self.calls.entry(key.clone()).or_default().value().clone();
        let mut state = call.state.lock();
        if let CallState::Done(result) = &*state {
            return result.clone();
        }
        let result = compute();
        *state = CallState::Done(result.clone());
        self.calls.remove(&key);
        result
    }

    /// Number of calls currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.len()
    }
}

impl<K, V, E> Default for SingleflightGroup<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
