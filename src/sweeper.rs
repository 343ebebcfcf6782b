use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Owned handle to a background thread that runs a closure once per interval.
///
/// Cancellation is cooperative: [`stop`](Sweeper::stop) drops the channel
/// sender, the thread observes the disconnect on its next wait and exits,
/// and `stop` joins it. The owning cache calls `stop` from its `Drop` impl,
/// so the thread is torn down exactly once and never outlives its cache.
pub(crate) struct Sweeper {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawns the sweep thread. `tick` runs every `interval` until stopped.
    pub(crate) fn spawn<F>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            // The timed wait doubles as the ticker.
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => tick(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        Self { stop_tx, handle }
    }

    /// Signals the thread and blocks until it has exited.
    pub(crate) fn stop(self) {
        drop(self.stop_tx);
        let _ = self.handle.join();
    }
}
