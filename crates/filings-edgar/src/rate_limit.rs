//! Sliding-window rate limiter.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::trace;

/// Bounds the number of requests issued within a trailing time window.
///
/// Acquisitions pass through an async gate one at a time, including any wait,
/// so concurrent callers queue up behind one another and the aggregate rate,
/// not each caller's individual rate, stays under the limit. The window of
/// admission timestamps sits behind its own short-held lock that is never
/// kept across a wait, so [`current_rate`](Self::current_rate) answers
/// immediately even while an acquisition is sleeping.
///
/// Dropping an [`acquire`](Self::acquire) future while it waits leaves the
/// window untouched: a timestamp is only recorded when the caller is admitted.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    time_window: Duration,
    gate: tokio::sync::Mutex<()>,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter admitting at most `max_requests` per `time_window`.
    ///
    /// A `max_requests` of zero is treated as one.
    ///
    /// # Example
    /// ```
    /// use filings_edgar::RateLimiter;
    /// use std::time::Duration;
    ///
    /// // SEC fair-access policy: 10 requests per second
    /// let limiter = RateLimiter::new(10, Duration::from_secs(1));
    /// assert_eq!(limiter.max_requests(), 10);
    /// ```
    #[must_use]
    pub fn new(max_requests: usize, time_window: Duration) -> Self {
        let max_requests = max_requests.max(1);
        Self {
            max_requests,
            time_window,
            gate: tokio::sync::Mutex::new(()),
            window: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    /// Maximum requests admitted per window.
    #[must_use]
    pub const fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Length of the window.
    #[must_use]
    pub const fn time_window(&self) -> Duration {
        self.time_window
    }

    /// Waits until one more request fits in the window, then records it.
    ///
    /// This never fails; it only delays.
    pub async fn acquire(&self) {
        let _turn = self.gate.lock().await;

        let expires = {
            let mut window = self.lock_window();
            let now = Instant::now();
            self.prune(&mut window, now);
            if window.len() >= self.max_requests {
                window
                    .front()
                    .map(|&oldest| oldest + self.time_window)
                    .filter(|&expires| expires > now)
            } else {
                None
            }
        };

        if let Some(expires) = expires {
            trace!(
                wait_ms = expires.saturating_duration_since(Instant::now()).as_millis() as u64,
                "Rate window full, waiting"
            );
            sleep_until(expires).await;
        }

        // Only the gate holder mutates the window, so nothing moved while we slept.
        let mut window = self.lock_window();
        let now = Instant::now();
        self.prune(&mut window, now);
        if window.len() >= self.max_requests {
            window.pop_front();
        }
        window.push_back(now);
    }

    /// Number of requests recorded in the current window.
    ///
    /// Entries that have already expired are not counted, and nothing is
    /// removed from the window. Never waits on a pending acquisition.
    #[must_use]
    pub fn current_rate(&self) -> usize {
        let window = self.lock_window();
        let now = Instant::now();
        window
            .iter()
            .filter(|&&t| now.duration_since(t) <= self.time_window)
            .count()
    }

    fn lock_window(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        // The window is a plain queue; a panic elsewhere cannot leave it half-updated.
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prune(&self, window: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = window.front() {
            if now.duration_since(oldest) > self.time_window {
                window.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_under_capacity_does_not_wait() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }

        assert_eq!(Instant::now(), start);
        assert_eq!(limiter.current_rate(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_oldest_to_expire() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert_eq!(Instant::now() - start, Duration::from_secs(1));
        assert_eq!(limiter.current_rate(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_rate_forgets_expired_entries() {
        let limiter = RateLimiter::new(5, Duration::from_millis(500));
        limiter.acquire().await;
        limiter.acquire().await;

        tokio::time::advance(Duration::from_millis(600)).await;

        assert_eq!(limiter.current_rate(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquisitions_respect_window() {
        let max_requests = 4;
        let window = Duration::from_secs(1);
        let limiter = Arc::new(RateLimiter::new(max_requests, window));

        let tasks = (0..25).map(|_| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move {
                limiter.acquire().await;
                Instant::now()
            })
        });

        let mut stamps: Vec<Instant> = join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        stamps.sort();

        // No half-open interval (t - window, t] may hold more than max_requests stamps.
        for &t in &stamps {
            let in_window = stamps
                .iter()
                .filter(|&&s| s <= t && t.duration_since(s) < window)
                .count();
            assert!(
                in_window <= max_requests,
                "{in_window} requests within one window"
            );
        }

        // 25 requests at 4 per second need at least six full windows.
        assert!(stamps[24].duration_since(stamps[0]) >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_acquire_leaves_window_intact() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        limiter.acquire().await;

        // This acquisition has to wait ten seconds; abandon it after one.
        let cancelled = tokio::time::timeout(Duration::from_secs(1), limiter.acquire()).await;
        assert!(cancelled.is_err());
        assert_eq!(limiter.current_rate(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_rate_answers_while_an_acquire_waits() {
        let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(10)));
        limiter.acquire().await;

        let waiting = tokio::spawn({
            let limiter = Arc::clone(&limiter);
            async move { limiter.acquire().await }
        });
        // Let the spawned acquisition take the gate and start sleeping.
        tokio::task::yield_now().await;
        assert!(!waiting.is_finished());

        let start = Instant::now();
        assert_eq!(limiter.current_rate(), 1);
        assert_eq!(Instant::now(), start);

        waiting.await.unwrap();
        assert_eq!(Instant::now() - start, Duration::from_secs(10));
        assert_eq!(limiter.current_rate(), 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let limiter = RateLimiter::new(0, Duration::from_secs(1));
        assert_eq!(limiter.max_requests(), 1);
    }
}
