//! Cancellation of blocking waits, e.g. from a Ctrl-C handler.

use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    time::{Duration, Instant},
};

/// Cooperative cancellation for blocking waits.
///
/// Clones share the same state, so one clone can be handed to a signal handler while another
/// is passed to a long-running operation. Cancelling wakes up all sleepers immediately.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.inner.wakeup.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for `duration` or until the token is cancelled.
    /// Returns `true` if the token was cancelled
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = self
                .inner
                .wakeup
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *cancelled
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn should_sleep_full_duration() {
        let token = CancelToken::new();
        let start = Instant::now();
        assert!(!token.sleep(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn should_wake_on_cancel() {
        let token = CancelToken::new();
        let handle = token.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.cancel();
        });

        let start = Instant::now();
        assert!(token.sleep(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(token.is_cancelled());
        canceller.join().unwrap();
    }

    #[test]
    fn should_return_immediately_when_already_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.sleep(Duration::from_secs(30)));
    }
}
