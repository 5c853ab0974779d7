// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rolling-window throttle that admits scheduled operations in call order.
//!
//! Each [`ThrottledQueue`] guards one external resource. It keeps the start
//! instants of recent admissions and lets at most `limit` of them fall inside
//! any trailing `window`. Up to `limit` calls in a fresh window start
//! immediately; overflow waits until the oldest admission slides out.
//!
//! Waiters queue on a fair `tokio::sync::Mutex`. The waiter at the head holds
//! the lock while it sleeps, so admission order is call order.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use emblem_config::model::ThrottleConfig;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// A FIFO rate limiter for one external resource.
pub struct ThrottledQueue {
    name: String,
    limit: usize,
    window: Duration,
    admissions: Mutex<VecDeque<Instant>>,
    pending: AtomicUsize,
}

impl ThrottledQueue {
    /// Creates a throttle admitting at most `limit` operations per `window`.
    ///
    /// A `limit` of zero is treated as one.
    pub fn new(name: impl Into<String>, limit: usize, window: Duration) -> Self {
        let limit = limit.max(1);
        Self {
            name: name.into(),
            limit,
            window,
            admissions: Mutex::new(VecDeque::with_capacity(limit)),
            pending: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of callers currently waiting for admission.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Waits for admission, then runs `op` and returns exactly what it returns.
    ///
    /// The throttle only affects when `op` starts; its output, including any
    /// error, passes through untouched.
    pub async fn schedule<F, Fut, T>(&self, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.admit().await;
        op().await
    }

    async fn admit(&self) {
        let _waiting = PendingGuard::enter(&self.pending);
        let mut admissions = self.admissions.lock().await;

        loop {
            let now = Instant::now();
            while admissions
                .front()
                .is_some_and(|oldest| now.duration_since(*oldest) >= self.window)
            {
                admissions.pop_front();
            }

            if admissions.len() < self.limit {
                admissions.push_back(now);
                return;
            }

            let wake_at = admissions
                .front()
                .map_or(now, |oldest| *oldest + self.window);
            debug!(
                throttle = %self.name,
                wait_ms = wake_at.duration_since(now).as_millis() as u64,
                "throttle window full, waiting"
            );
            tokio::time::sleep_until(wake_at).await;
        }
    }
}

/// Keeps the pending count right even if the waiting future is dropped.
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The process-wide throttles, one per external resource.
///
/// Built once at startup and shared by every concurrent pipeline run so the
/// limits hold across runs.
#[derive(Clone)]
pub struct Throttles {
    /// Chat-completion calls (analysis and scenario stages).
    pub chat: Arc<ThrottledQueue>,
    /// Image-generation calls.
    pub image: Arc<ThrottledQueue>,
    /// Outbound chat messages.
    pub message: Arc<ThrottledQueue>,
}

impl Throttles {
    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self {
            chat: Arc::new(ThrottledQueue::new(
                "chat",
                config.chat_limit,
                Duration::from_millis(config.chat_window_ms),
            )),
            image: Arc::new(ThrottledQueue::new(
                "image",
                config.image_limit,
                Duration::from_millis(config.image_window_ms),
            )),
            message: Arc::new(ThrottledQueue::new(
                "message",
                config.message_limit,
                Duration::from_millis(config.message_window_ms),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;

    type StartLog = Arc<StdMutex<Vec<(usize, Instant)>>>;

    async fn run_batch(queue: &ThrottledQueue, count: usize) -> Vec<(usize, Instant)> {
        let log: StartLog = Arc::new(StdMutex::new(Vec::new()));
        let tasks = (0..count).map(|i| {
            let log = Arc::clone(&log);
            queue.schedule(move || async move {
                log.lock().unwrap().push((i, Instant::now()));
                i
            })
        });
        let results = futures::future::join_all(tasks).await;
        assert_eq!(results, (0..count).collect::<Vec<_>>());
        log.lock().unwrap().clone()
    }

    fn max_starts_in_any_window(starts: &[(usize, Instant)], window: Duration) -> usize {
        starts
            .iter()
            .map(|(_, from)| {
                starts
                    .iter()
                    .filter(|(_, t)| *t >= *from && *t < *from + window)
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_limit_in_any_window() {
        let window = Duration::from_millis(1_000);
        for (limit, count) in [(1, 4), (3, 10), (5, 12)] {
            let queue = ThrottledQueue::new("test", limit, window);
            let starts = run_batch(&queue, count).await;
            assert_eq!(starts.len(), count);
            assert!(
                max_starts_in_any_window(&starts, window) <= limit,
                "limit {limit} exceeded: {starts:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn admits_in_call_order() {
        let queue = ThrottledQueue::new("test", 2, Duration::from_millis(500));
        let starts = run_batch(&queue, 7).await;
        let order: Vec<usize> = starts.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, (0..7).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn first_limit_calls_start_immediately() {
        let origin = Instant::now();
        let queue = ThrottledQueue::new("test", 3, Duration::from_secs(60));
        let starts = run_batch(&queue, 4).await;

        for (_, started) in &starts[..3] {
            assert_eq!(*started, origin);
        }
        assert!(starts[3].1 >= origin + Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn window_slides_after_idle_period() {
        let queue = ThrottledQueue::new("test", 1, Duration::from_millis(100));
        queue.schedule(|| async {}).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        let before = Instant::now();
        queue.schedule(|| async {}).await;
        assert_eq!(Instant::now(), before, "second call should not wait");
    }

    #[tokio::test(start_paused = true)]
    async fn passes_errors_through_untouched() {
        let queue = ThrottledQueue::new("test", 1, Duration::from_millis(10));
        let result: Result<u32, String> = queue.schedule(|| async { Err("boom".to_string()) }).await;
        assert_eq!(result, Err("boom".to_string()));

        let ok: Result<u32, String> = queue.schedule(|| async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn independent_queues_do_not_share_budget() {
        let chat = ThrottledQueue::new("chat", 1, Duration::from_secs(10));
        let image = ThrottledQueue::new("image", 1, Duration::from_secs(10));
        let origin = Instant::now();

        chat.schedule(|| async {}).await;
        image.schedule(|| async {}).await;
        assert_eq!(Instant::now(), origin);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_counts_waiters() {
        let queue = Arc::new(ThrottledQueue::new("test", 1, Duration::from_secs(5)));
        queue.schedule(|| async {}).await;

        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.schedule(|| async {}).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(queue.pending(), 1);

        waiter.await.unwrap();
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn zero_limit_is_clamped() {
        let queue = ThrottledQueue::new("test", 0, Duration::from_secs(1));
        assert_eq!(queue.limit(), 1);
    }

    #[test]
    fn throttles_follow_config() {
        let config = ThrottleConfig {
            chat_limit: 7,
            chat_window_ms: 1_000,
            image_limit: 2,
            image_window_ms: 60_000,
            message_limit: 20,
            message_window_ms: 30_000,
        };
        let throttles = Throttles::from_config(&config);
        assert_eq!(throttles.chat.limit(), 7);
        assert_eq!(throttles.image.window(), Duration::from_secs(60));
        assert_eq!(throttles.message.name(), "message");
    }
}
