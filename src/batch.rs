//! Concurrent batch deletion with error aggregation
//!
//! Fan out one task per identifier, join all of them, and collect every
//! failure into an [`AggregateError`]. A failed identifier never aborts its
//! siblings, and there is no cancellation or timeout path. The caller bounds
//! concurrency by chunking identifiers to the resource kind's batch size
//! before calling in.

use std::fmt;
use std::future::Future;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::report::{Entry, Reporter};

/// One or more failures collected from a batch operation.
///
/// Never constructed empty: an empty error set is `Ok(())`.
#[derive(Debug)]
pub struct AggregateError {
    errors: Vec<anyhow::Error>,
}

impl AggregateError {
    /// Fold a list of failures into a result: `Ok` when empty.
    pub fn from_errors(errors: Vec<anyhow::Error>) -> Result<(), AggregateError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AggregateError { errors })
        }
    }

    /// Number of underlying failures. Always at least one.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The collected failures.
    pub fn errors(&self) -> &[anyhow::Error] {
        &self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} deletion(s) failed", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error:#}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

/// Delete a batch of identifiers concurrently, one task per identifier.
///
/// Every attempt records an [`Entry`] with the reporter, success or failure,
/// before the join barrier releases. Returns the aggregate of all failures,
/// or `Ok` if every deletion succeeded. An empty batch succeeds immediately
/// without touching the provider.
pub async fn nuke_batch<F, Fut>(
    identifiers: &[String],
    resource_type: &'static str,
    reporter: &Reporter,
    delete_one: F,
) -> Result<(), AggregateError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    if identifiers.is_empty() {
        debug!(resource_type = %resource_type, "Empty batch, nothing to delete");
        return Ok(());
    }

    let tasks = identifiers.iter().map(|identifier| {
        let attempt = delete_one(identifier.clone());
        async move {
            let result = attempt.await;
            match &result {
                Ok(()) => {
                    debug!(resource_type = %resource_type, identifier = %identifier, "Deleted");
                    reporter.record(Entry::success(identifier, resource_type));
                }
                Err(error) => {
                    warn!(
                        resource_type = %resource_type,
                        identifier = %identifier,
                        error = ?error,
                        "Failed to delete"
                    );
                    reporter.record(Entry::failure(identifier, resource_type, error));
                }
            }
            result
        }
    });

    let errors: Vec<anyhow::Error> = join_all(tasks)
        .await
        .into_iter()
        .filter_map(Result::err)
        .collect();

    AggregateError::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls_and_records_nothing() {
        let reporter = Reporter::new();
        let calls = AtomicUsize::new(0);

        let result = nuke_batch(&[], "ssm-parameter", &reporter, |_name| {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(reporter.entries().is_empty());
    }

    #[tokio::test]
    async fn all_successes_record_one_entry_each() {
        let reporter = Reporter::new();
        let identifiers = ids(&["/app/a", "/app/b", "/app/c"]);

        let result = nuke_batch(&identifiers, "ssm-parameter", &reporter, |_name| async {
            Ok(())
        })
        .await;

        assert!(result.is_ok());
        let entries = reporter.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.error.is_none()));
    }

    #[tokio::test]
    async fn partial_failure_aggregates_exactly_the_failed_deletes() {
        let reporter = Reporter::new();
        let identifiers = ids(&["/app/a", "/app/b", "/app/c", "/app/d", "/app/e"]);
        let calls = AtomicUsize::new(0);

        let result = nuke_batch(&identifiers, "ssm-parameter", &reporter, |name| {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if name == "/app/b" || name == "/app/d" {
                    anyhow::bail!("delete failed for {name}");
                }
                Ok(())
            }
        })
        .await;

        let aggregate = result.unwrap_err();
        assert_eq!(aggregate.len(), 2);
        // No early abort: every identifier was attempted and recorded.
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        let entries = reporter.entries();
        assert_eq!(entries.len(), 5);
        assert_eq!(reporter.failure_count(), 2);
    }

    #[tokio::test]
    async fn access_denied_on_one_of_two_parameters() {
        let reporter = Reporter::new();
        let identifiers = ids(&["/app/db-pass", "/app/api-key"]);

        let result = nuke_batch(&identifiers, "ssm-parameter", &reporter, |name| async move {
            if name == "/app/db-pass" {
                anyhow::bail!("access denied");
            }
            Ok(())
        })
        .await;

        let aggregate = result.unwrap_err();
        assert_eq!(aggregate.len(), 1);
        assert!(aggregate.to_string().contains("access denied"));

        let entries = reporter.entries();
        assert_eq!(entries.len(), 2);
        let failed = entries.iter().find(|e| e.identifier == "/app/db-pass").unwrap();
        assert!(failed.error.as_deref().unwrap().contains("access denied"));
        let succeeded = entries.iter().find(|e| e.identifier == "/app/api-key").unwrap();
        assert!(succeeded.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn join_barrier_waits_for_the_slowest_task() {
        let reporter = Reporter::new();
        let identifiers = ids(&["/app/fast", "/app/slow"]);

        let result = nuke_batch(&identifiers, "ssm-parameter", &reporter, |name| async move {
            if name == "/app/slow" {
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            }
            Ok(())
        })
        .await;

        // The call only returns once every task, including the slow one,
        // has completed and recorded its outcome.
        assert!(result.is_ok());
        assert_eq!(reporter.entries().len(), 2);
    }

    #[test]
    fn aggregate_display_lists_every_failure() {
        let error = AggregateError::from_errors(vec![
            anyhow::anyhow!("first failure"),
            anyhow::anyhow!("second failure"),
        ])
        .unwrap_err();

        let rendered = error.to_string();
        assert!(rendered.starts_with("2 deletion(s) failed"));
        assert!(rendered.contains("first failure"));
        assert!(rendered.contains("second failure"));
        assert!(!error.is_empty());
    }

    #[test]
    fn no_errors_folds_to_ok() {
        assert!(AggregateError::from_errors(Vec::new()).is_ok());
    }
}
