//! Screen-scoped cancellation.
//!
//! A dismissed screen must never apply a late response.  Every screen owns
//! a [`ScreenScope`]; work launched through it resolves to `None` once the
//! scope is cancelled, dropping the in-flight request with it.
//! Cancellation is a silent no-op, not an error.

use tokio::sync::watch;

/// Cancellation scope tied to one screen's lifetime.  Dropping the scope
/// cancels it.
pub struct ScreenScope {
    cancelled: watch::Sender<bool>,
}

impl ScreenScope {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self { cancelled }
    }

    /// Cancel explicitly (e.g. on navigation away, before the screen is
    /// dropped).
    pub fn cancel(&self) {
        // send_replace stores the flag even with no receiver subscribed
        // yet; plain send would drop it.
        self.cancelled.send_replace(true);
    }

    /// True once the scope has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Run a future under this scope.
    ///
    /// Returns `Some(output)` if the future completes first, `None` if the
    /// scope is cancelled first.  The future is dropped on cancellation,
    /// which also abandons its in-flight request.
    pub async fn run<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        let mut rx = self.cancelled.subscribe();
        tokio::select! {
            out = fut => Some(out),
            res = rx.wait_for(|cancelled| *cancelled) => {
                // A closed channel means the scope was dropped: cancelled.
                let _ = res;
                None
            }
        }
    }
}

impl Default for ScreenScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.cancelled.send_replace(true);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_completed_work_passes_through() {
        let scope = ScreenScope::new();
        let out = scope.run(async { 7 }).await;
        assert_eq!(out, Some(7));
    }

    #[tokio::test]
    async fn test_cancel_before_any_subscriber_sticks() {
        // Nothing has called run() yet, so no receiver exists; the flag
        // must still latch.
        let scope = ScreenScope::new();
        scope.cancel();
        assert!(scope.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_scope_drops_pending_work() {
        let scope = ScreenScope::new();
        scope.cancel();
        let out = scope
            .run(async {
                sleep(Duration::from_secs(30)).await;
                7
            })
            .await;
        assert_eq!(out, None);
    }

    #[tokio::test]
    async fn test_cancel_mid_flight() {
        let scope = std::sync::Arc::new(ScreenScope::new());
        let canceller = scope.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let out = scope
            .run(async {
                sleep(Duration::from_secs(30)).await;
                7
            })
            .await;
        assert_eq!(out, None);
    }
}
