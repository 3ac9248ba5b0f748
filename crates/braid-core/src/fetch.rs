//! Fetch port and simulated implementations.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::error::FetchError;

/// The only URL the simulated fetchers accept.
pub const VALID_URL: &str = "https://valid.url";

/// Fetch port (interface).
/// v1 only has simulated implementations, but this trait is the seam for
/// swapping in a real transport later.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one resource.
    ///
    /// Suspends for the simulated latency; the calling context is free to
    /// run other tasks while this waits.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Simulated fetcher: fixed latency, fixed payload.
///
/// Design:
/// - Bad input is rejected before the delay (fail fast, no wasted wait).
/// - The sleep is the suspension point; nothing here blocks a worker thread.
#[derive(Debug, Clone)]
pub struct SimulatedFetcher {
    delay: Duration,
}

impl SimulatedFetcher {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// One second of latency, matching the scenario this simulates.
    pub fn default_v1() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Fetcher for SimulatedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if url != VALID_URL {
            return Err(FetchError::BadUrl(url.to_string()));
        }
        sleep(self.delay).await;
        Ok("Fetched data".to_string())
    }
}

/// Fetcher that fails its first `n` calls, then behaves like
/// [`SimulatedFetcher`].
///
/// Deterministic transient-failure source for exercising the joiner's
/// failure path without real I/O.
pub struct FlakyFetcher {
    inner: SimulatedFetcher,
    remaining_failures: AtomicU32,
}

impl FlakyFetcher {
    pub fn new(delay: Duration, failures: u32) -> Self {
        Self {
            inner: SimulatedFetcher::new(delay),
            remaining_failures: AtomicU32::new(failures),
        }
    }
}

#[async_trait]
impl Fetcher for FlakyFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(FetchError::RequestFailed(format!(
                "intentional failure (left={left})"
            )));
        }
        self.inner.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::valid(VALID_URL, true)]
    #[case::wrong_host("https://invalid.url", false)]
    #[case::not_a_url("not a url", false)]
    #[case::empty("", false)]
    #[tokio::test]
    async fn simulated_fetcher_validates_url(#[case] url: &str, #[case] ok: bool) {
        let fetcher = SimulatedFetcher::new(Duration::from_millis(10));
        let result = fetcher.fetch(url).await;
        assert_eq!(result.is_ok(), ok);
        if !ok {
            assert_eq!(result, Err(FetchError::BadUrl(url.to_string())));
        }
    }

    #[tokio::test]
    async fn simulated_fetcher_returns_fixed_payload() {
        let fetcher = SimulatedFetcher::new(Duration::from_millis(10));
        let data = fetcher.fetch(VALID_URL).await.unwrap();
        assert_eq!(data, "Fetched data");
    }

    #[tokio::test]
    async fn flaky_fetcher_fails_then_recovers() {
        let fetcher = FlakyFetcher::new(Duration::from_millis(10), 2);

        let first = fetcher.fetch(VALID_URL).await;
        let second = fetcher.fetch(VALID_URL).await;
        let third = fetcher.fetch(VALID_URL).await;

        assert!(matches!(first, Err(FetchError::RequestFailed(_))));
        assert!(matches!(second, Err(FetchError::RequestFailed(_))));
        assert_eq!(third.unwrap(), "Fetched data");
    }
}
