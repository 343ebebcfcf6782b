//! The canonical composition: check the cache, and only on a miss run the
//! computation through the singleflight group so concurrent misses for the
//! same key share one execution.
//!
//! 100 workers request 10 distinct keys; the slow getter runs 10 times.
//!
//! Run with: `cargo run --example get_or_compute`

use flightcache::{Cache, SingleflightGroup};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

fn slow_getter(key: u32) -> String {
    info!(key, "calling slow getter");
    thread::sleep(Duration::from_millis(200));
    key.to_string().repeat((key as usize + 1) * 2)
}

fn main() {
    tracing_subscriber::fmt::init();

    let cache: Arc<Cache<u32, String>> = Arc::new(Cache::new(
        Duration::from_secs(30),
        Duration::from_secs(5),
    ));
    let group: Arc<SingleflightGroup<u32, String, String>> = Arc::new(SingleflightGroup::new());

    let started = Instant::now();
    let mut handles = Vec::new();
    for i in 0..100u32 {
        let cache = Arc::clone(&cache);
        let group = Arc::clone(&group);
        handles.push(thread::spawn(move || {
            let key = i % 10;
            match cache.get(&key) {
                Some(hit) => hit,
                None => group
                    .run(key, || {
                        let value = slow_getter(key);
                        cache.set(key, value.clone());
                        Ok::<_, String>(value)
                    })
                    .expect("getter is infallible"),
            }
        }));
    }

    let mut total_len = 0;
    for handle in handles {
        total_len += handle.join().expect("worker panicked").len();
    }

    info!(
        total_len,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "100 requests served by 10 computations"
    );
}
