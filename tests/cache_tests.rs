use flightcache::{value_of, AnyValue, Cache, CacheError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_set_get_delete_clear() {
    let cache: Cache<i32, String> = Cache::new(Duration::from_secs(3), Duration::from_secs(5));
    cache.set(1, "a".to_string());
    cache.set(2, "b".to_string());

    assert_eq!(cache.get(&1), Some("a".to_string()));

    cache.delete(&1);
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.get(&2), Some("b".to_string()));

    cache.clear();
    assert_eq!(cache.get(&2), None);
    assert!(cache.is_empty());
}

#[test]
fn test_lazy_expiration_without_sweeper() {
    let cache: Cache<i32, &str> = Cache::new(Duration::from_millis(50), Duration::ZERO);
    cache.set(1, "a");
    assert_eq!(cache.get(&1), Some("a"));

    thread::sleep(Duration::from_millis(120));

    // No sweeper is running, so the entry is still stored until a read
    // observes it expired.
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_active_sweep_removes_unread_entries() {
    let cache: Cache<i32, &str> = Cache::new(Duration::from_millis(50), Duration::from_millis(25));
    cache.set(1, "a");
    cache.set(2, "b");
    assert_eq!(cache.len(), 2);

    thread::sleep(Duration::from_millis(250));

    // No get calls in between: the sweeper alone must have reclaimed both.
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_zero_ttl_stores_permanently() {
    let cache: Cache<i32, &str> = Cache::new(Duration::ZERO, Duration::ZERO);
    cache.set(1, "a");
    thread::sleep(Duration::from_millis(50));
    assert_eq!(cache.get(&1), Some("a"));
}

#[test]
fn test_set_with_ttl_overrides_the_default() {
    let cache: Cache<i32, &str> = Cache::new(Duration::ZERO, Duration::ZERO);
    cache.set_with_ttl(1, "short-lived", Duration::from_millis(50));
    cache.set(2, "permanent");

    thread::sleep(Duration::from_millis(120));
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.get(&2), Some("permanent"));

    // The override also works the other way: zero disables a nonzero default.
    let expiring: Cache<i32, &str> = Cache::new(Duration::from_millis(50), Duration::ZERO);
    expiring.set_with_ttl(3, "kept", Duration::ZERO);
    thread::sleep(Duration::from_millis(120));
    assert_eq!(expiring.get(&3), Some("kept"));
}

#[test]
fn test_overwrite_restarts_the_expiration_clock() {
    let cache: Cache<i32, &str> = Cache::new(Duration::from_millis(150), Duration::ZERO);
    cache.set(1, "first");
    thread::sleep(Duration::from_millis(100));
    cache.set(1, "second");
    thread::sleep(Duration::from_millis(100));

    // 200ms after the first write, but only 100ms after the overwrite.
    assert_eq!(cache.get(&1), Some("second"));
}

#[test]
fn test_concurrent_access_from_many_threads() {
    let cache: Arc<Cache<u32, u32>> = Arc::new(Cache::new(Duration::ZERO, Duration::ZERO));

    let mut handles = Vec::new();
    for t in 0..8u32 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..200u32 {
                let key = i % 16;
                cache.set(key, t * 1000 + i);
                let _ = cache.get(&key);
                if i % 7 == 0 {
                    cache.delete(&key);
                }
            }
        }));
    }
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    // Whatever survived must be readable and well-formed.
    for key in 0..16u32 {
        if let Some(v) = cache.get(&key) {
            assert!(v < 8 * 1000 + 200);
        }
    }
}

#[test]
fn test_clear_is_visible_to_all_keys() {
    let cache: Cache<u32, u32> = Cache::new(Duration::ZERO, Duration::ZERO);
    for key in 0..100 {
        cache.set(key, key);
    }
    cache.clear();
    for key in 0..100 {
        assert_eq!(cache.get(&key), None);
    }
}

#[test]
fn test_mixed_type_values_with_typed_retrieval() {
    let cache: Cache<i32, AnyValue> = Cache::new(Duration::from_secs(3), Duration::from_secs(5));
    cache.set(1, AnyValue::new("a".to_string()));
    cache.set(2, AnyValue::new(3i32));

    let s: String = value_of(cache.get(&1)).expect("stored as String");
    assert_eq!(s, "a");
    let n: i32 = value_of(cache.get(&2)).expect("stored as i32");
    assert_eq!(n, 3);

    let err = value_of::<String>(cache.get(&2)).unwrap_err();
    assert!(matches!(err, CacheError::WrongType { .. }));

    let err = value_of::<String>(cache.get(&404)).unwrap_err();
    assert!(matches!(err, CacheError::NotFound));
}
