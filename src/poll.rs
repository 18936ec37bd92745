// src/poll.rs
//! Bounded retry of a predicate.
//!
//! Used to observe side effects of processes we do not control (a file
//! appearing, an editor taking focus). The poller never spawns: it runs inside
//! the caller's future, so dropping that future cancels every later
//! evaluation.

use std::future::{self, Future};
use std::time::Duration;

use tokio::time::{self, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("condition not met within {after:?}")]
pub struct PollTimeout {
    pub after: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    interval: Duration,
    timeout: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(5))
    }
}

impl Poller {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Evaluates `predicate` until it yields a value or the deadline passes.
    ///
    /// Evaluations never overlap: the next one is scheduled `interval` after
    /// the previous one completed. An evaluation still running when the
    /// deadline passes is abandoned.
    pub async fn poll_for<T, F, Fut>(&self, mut predicate: F) -> Result<T, PollTimeout>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let deadline = Instant::now() + self.timeout;
        let run = async {
            let mut attempts = 0u32;
            loop {
                attempts += 1;
                if let Some(value) = predicate().await {
                    return value;
                }
                log::trace!("poll attempt {attempts} not satisfied");
                time::sleep(self.interval).await;
            }
        };

        match time::timeout_at(deadline, run).await {
            Ok(value) => Ok(value),
            Err(_) => Err(PollTimeout {
                after: self.timeout,
            }),
        }
    }

    pub async fn until<F, Fut>(&self, mut predicate: F) -> Result<(), PollTimeout>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        self.poll_for(|| {
            let fut = predicate();
            async move { fut.await.then_some(()) }
        })
        .await
    }

    pub async fn until_sync<F>(&self, mut predicate: F) -> Result<(), PollTimeout>
    where
        F: FnMut() -> bool,
    {
        self.poll_for(|| future::ready(predicate().then_some(())))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn poller() -> Poller {
        Poller::new(Duration::from_millis(100), Duration::from_secs(2))
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_once_predicate_turns_true() {
        let calls = Cell::new(0);
        let start = Instant::now();
        poller()
            .until_sync(|| {
                calls.set(calls.get() + 1);
                calls.get() == 5
            })
            .await
            .unwrap();
        assert_eq!(calls.get(), 5);
        assert_eq!(start.elapsed(), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_near_the_deadline() {
        let start = Instant::now();
        let err = poller().until_sync(|| false).await.unwrap_err();
        assert_eq!(err.after, Duration::from_secs(2));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(2100), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn returns_the_value_that_satisfied_it() {
        let calls = Cell::new(0);
        let found = poller()
            .poll_for(|| {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { (n >= 3).then(|| format!("found on attempt {n}")) }
            })
            .await
            .unwrap();
        assert_eq!(found, "found on attempt 3");
    }

    #[tokio::test(start_paused = true)]
    async fn async_evaluations_never_overlap() {
        let in_flight = Rc::new(Cell::new(false));
        let calls = Rc::new(Cell::new(0));
        poller()
            .until(|| {
                let in_flight = in_flight.clone();
                let calls = calls.clone();
                async move {
                    assert!(!in_flight.replace(true), "overlapping evaluation");
                    time::sleep(Duration::from_millis(250)).await;
                    in_flight.set(false);
                    calls.set(calls.get() + 1);
                    calls.get() == 3
                }
            })
            .await
            .unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_predicate_counts_against_the_deadline() {
        let err = poller()
            .until(|| async {
                time::sleep(Duration::from_secs(10)).await;
                true
            })
            .await
            .unwrap_err();
        assert_eq!(err.after, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_future_stops_evaluations() {
        let calls = Rc::new(Cell::new(0));
        let counted = calls.clone();
        let poller = poller();
        let pending = poller.until_sync(move || {
            counted.set(counted.get() + 1);
            false
        });
        let _ = time::timeout(Duration::from_millis(350), pending).await;
        let seen = calls.get();
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.get(), seen);
        assert_eq!(seen, 4);
    }
}
