use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// A stop flag that supports interruptible waits.
///
/// The patch loop sleeps between cycles; a plain `thread::sleep` would make
/// `stop()` block for up to a full retry interval. Waiting on this signal
/// instead returns as soon as a stop is requested.
pub struct StopSignal {
    requested: AtomicBool,
    lock: Mutex<()>,
    cond: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            lock: Mutex::new(()),
            cond: Condvar::new(),
        }
    }

    /// Request a stop, waking every waiting thread.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.cond.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleep for `timeout` or until a stop is requested, whichever comes
    /// first. Returns `true` when the wait ended because of a stop request.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_requested() {
            return true;
        }

        let guard = match self.lock.lock() {
            Ok(guard) => guard,
            // Poisoned lock: some waiter panicked. Treat as stopped.
            Err(_) => return true,
        };

        match self
            .cond
            .wait_timeout_while(guard, timeout, |()| !self.is_requested())
        {
            Ok((_, timeout_result)) => !timeout_result.timed_out(),
            Err(_) => true,
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn starts_unrequested() {
        let signal = StopSignal::new();
        assert!(!signal.is_requested());
    }

    #[test]
    fn request_is_sticky() {
        let signal = StopSignal::new();
        signal.request();
        assert!(signal.is_requested());
        assert!(signal.is_requested());
    }

    #[test]
    fn wait_times_out_without_request() {
        let signal = StopSignal::new();
        let start = Instant::now();
        let stopped = signal.wait(Duration::from_millis(50));
        assert!(!stopped);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn wait_returns_immediately_when_already_requested() {
        let signal = StopSignal::new();
        signal.request();
        let start = Instant::now();
        assert!(signal.wait(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn request_interrupts_a_waiting_thread() {
        let signal = Arc::new(StopSignal::new());
        let waiter = Arc::clone(&signal);

        let handle = thread::spawn(move || {
            let start = Instant::now();
            let stopped = waiter.wait(Duration::from_secs(10));
            (stopped, start.elapsed())
        });

        thread::sleep(Duration::from_millis(50));
        signal.request();

        let (stopped, elapsed) = handle.join().unwrap();
        assert!(stopped);
        assert!(elapsed < Duration::from_secs(1));
    }
}
