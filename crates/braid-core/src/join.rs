//! Fan-out/fan-in joiner over independent fetch operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{FetchError, JoinFailure};
use crate::fetch::{Fetcher, VALID_URL};
use crate::ids::FetchId;

/// One joined row, still carrying the typed result.
struct JoinedOp {
    index: usize,
    id: FetchId,
    url: String,
    result: Result<String, FetchError>,
}

/// Launches a fixed set of independent fetches and joins them.
///
/// # Failure policy
/// The joiner waits for EVERY launched operation to finish, then reports
/// the first failure by launch order. Siblings are not cancelled; their
/// late results are simply discarded on a failed run. This keeps the
/// outcome independent of completion timing.
///
/// Ephemeral by design: one call launches, joins, and returns. Nothing is
/// retained between runs.
pub struct TaskJoiner {
    fetcher: Arc<dyn Fetcher>,
}

impl TaskJoiner {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Launch `n` fetches of the default URL at once and join them.
    ///
    /// All operations overlap: every task is spawned before any is awaited,
    /// so total wall-clock for `n` operations with delay `d` approximates
    /// `d`, not `n * d`. On success the results come back in launch order.
    pub async fn run_concurrent(&self, n: usize) -> Result<Vec<String>, JoinFailure> {
        self.run_urls(vec![VALID_URL.to_string(); n])
            .await
            .into_result()
    }

    /// Same fan-out/fan-in over caller-chosen URLs, keeping the full
    /// per-operation view.
    pub async fn run_urls(&self, urls: Vec<String>) -> JoinReport {
        let started_at = Utc::now();

        // fan-out: 全タスクを起動してから await する（起動と待機を分ける）
        let mut launched: Vec<(usize, FetchId, String, JoinHandle<_>)> =
            Vec::with_capacity(urls.len());
        for (index, url) in urls.into_iter().enumerate() {
            let id = FetchId::generate();
            let fetcher = Arc::clone(&self.fetcher);
            let u = url.clone();
            let handle = tokio::spawn(async move { fetcher.fetch(&u).await });
            debug!(%id, index, %url, "fetch launched");
            launched.push((index, id, url, handle));
        }

        // fan-in: 起動順に待つ。結果の並びは完了順ではなく起動順になる
        let mut operations = Vec::with_capacity(launched.len());
        for (index, id, url, handle) in launched {
            let result = match handle.await {
                Ok(result) => result,
                // The task died without reporting (panic/abort). Surface it
                // as an explicit error, never a crash of the joiner.
                Err(e) => Err(FetchError::TaskAborted(e.to_string())),
            };
            debug!(%id, index, ok = result.is_ok(), "fetch joined");
            operations.push(JoinedOp {
                index,
                id,
                url,
                result,
            });
        }

        JoinReport::from_ops(started_at, operations)
    }
}

/// Per-run summary view (serializable, for the console shell).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinReport {
    pub started_at: DateTime<Utc>,
    pub operations: Vec<OperationRecord>,
}

/// One launched operation as recorded in a [`JoinReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub index: usize,
    pub id: FetchId,
    pub url: String,
    pub outcome: OpOutcome,
}

/// Terminal outcome of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpOutcome {
    Success(String),
    Failure(FetchError),
}

/// Counts by outcome, in the shape the console shell prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCounts {
    pub launched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl JoinReport {
    fn from_ops(started_at: DateTime<Utc>, ops: Vec<JoinedOp>) -> Self {
        let operations = ops
            .into_iter()
            .map(|op| OperationRecord {
                index: op.index,
                id: op.id,
                url: op.url,
                outcome: match op.result {
                    Ok(data) => OpOutcome::Success(data),
                    Err(e) => OpOutcome::Failure(e),
                },
            })
            .collect();
        Self {
            started_at,
            operations,
        }
    }

    pub fn counts(&self) -> JoinCounts {
        let mut counts = JoinCounts {
            launched: self.operations.len(),
            ..JoinCounts::default()
        };
        for op in &self.operations {
            match op.outcome {
                OpOutcome::Success(_) => counts.succeeded += 1,
                OpOutcome::Failure(_) => counts.failed += 1,
            }
        }
        counts
    }

    /// Collapse the report into the caller-facing result: the full ordered
    /// output vector, or the first failure by launch order.
    ///
    /// Never a partial list: one failure fails the whole run.
    pub fn into_result(self) -> Result<Vec<String>, JoinFailure> {
        let mut out = Vec::with_capacity(self.operations.len());
        let mut first_failure: Option<JoinFailure> = None;

        for op in self.operations {
            match op.outcome {
                OpOutcome::Success(data) => out.push(data),
                OpOutcome::Failure(source) => {
                    if first_failure.is_none() {
                        first_failure = Some(JoinFailure {
                            index: op.index,
                            id: op.id,
                            source,
                        });
                    }
                }
            }
        }

        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::fetch::{FlakyFetcher, SimulatedFetcher};

    fn joiner(delay_ms: u64) -> TaskJoiner {
        TaskJoiner::new(Arc::new(SimulatedFetcher::new(Duration::from_millis(
            delay_ms,
        ))))
    }

    #[tokio::test]
    async fn all_success_returns_results_in_launch_order() {
        let results = joiner(10).run_concurrent(3).await.unwrap();
        assert_eq!(
            results,
            vec!["Fetched data", "Fetched data", "Fetched data"]
        );
    }

    #[tokio::test]
    async fn operations_overlap_instead_of_running_sequentially() {
        // 3 fetches at 200ms each: sequential would be ~600ms. Allow plenty
        // of scheduler slack but stay well under the sequential bound.
        let start = Instant::now();
        joiner(200).run_concurrent(3).await.unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(200));
        assert!(
            elapsed < Duration::from_millis(500),
            "expected overlapping execution, took {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn zero_operations_yield_empty_result() {
        let results = joiner(10).run_concurrent(0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn failing_operation_is_identified_by_launch_position() {
        let report = joiner(10)
            .run_urls(vec![
                VALID_URL.to_string(),
                "https://broken.url".to_string(),
                VALID_URL.to_string(),
            ])
            .await;

        let counts = report.counts();
        assert_eq!(counts.launched, 3);
        assert_eq!(counts.succeeded, 2);
        assert_eq!(counts.failed, 1);

        let failure = report.into_result().unwrap_err();
        assert_eq!(failure.index, 1);
        assert_eq!(
            failure.source,
            FetchError::BadUrl("https://broken.url".to_string())
        );
    }

    #[tokio::test]
    async fn first_failure_by_launch_order_wins() {
        // Every call fails, so the reported failure must be index 0 even if
        // another task happened to finish first.
        let joiner = TaskJoiner::new(Arc::new(FlakyFetcher::new(Duration::from_millis(10), 10)));
        let failure = joiner.run_concurrent(3).await.unwrap_err();

        assert_eq!(failure.index, 0);
        assert!(matches!(failure.source, FetchError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn outcome_serializes_with_screaming_tags() {
        // The console shell keys off "kind"; keep the wire shape stable.
        let report = joiner(10).run_urls(vec![VALID_URL.to_string()]).await;
        let value = serde_json::to_value(&report.operations[0].outcome).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "kind": "SUCCESS", "value": "Fetched data" })
        );
    }

    #[tokio::test]
    async fn failure_does_not_truncate_the_report() {
        // wait-for-all policy: the failing run still records every sibling.
        let report = joiner(10)
            .run_urls(vec![
                "https://broken.url".to_string(),
                VALID_URL.to_string(),
            ])
            .await;

        assert_eq!(report.operations.len(), 2);
        assert!(matches!(report.operations[1].outcome, OpOutcome::Success(_)));
    }
}
