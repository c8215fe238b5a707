//! In-flight request tracking

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Counts requests in flight; "loading" while the count is non-zero
#[derive(Debug, Clone)]
pub struct LoadingTracker {
    inner: Arc<LoadingInner>,
}

#[derive(Debug)]
struct LoadingInner {
    in_flight: AtomicUsize,
    loading_tx: watch::Sender<bool>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        let (loading_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(LoadingInner {
                in_flight: AtomicUsize::new(0),
                loading_tx,
            }),
        }
    }

    /// Mark a request as started. The request counts until the returned
    /// guard is dropped, whichever way the request ends.
    pub fn start(&self) -> LoadingGuard {
        if self.inner.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.inner.loading_tx.send_replace(true);
        }
        LoadingGuard {
            inner: self.inner.clone(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight() > 0
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.loading_tx.subscribe()
    }
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct LoadingGuard {
    inner: Arc<LoadingInner>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.inner.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.loading_tx.send_replace(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_until_last_request_finishes() {
        let tracker = LoadingTracker::new();
        let rx = tracker.subscribe();
        assert!(!tracker.is_loading());

        let first = tracker.start();
        let second = tracker.start();
        assert_eq!(tracker.in_flight(), 2);
        assert!(*rx.borrow());

        drop(first);
        assert!(tracker.is_loading());
        assert!(*rx.borrow());

        drop(second);
        assert!(!tracker.is_loading());
        assert!(!*rx.borrow());
    }
}
