//! Per-resource deletion outcomes and the run-end summary
//!
//! Every delete attempt, success or failure, produces exactly one [`Entry`].
//! The [`Reporter`] handle is cloned into each component rather than living in
//! a process-wide singleton; recording is fire-and-forget and safe for
//! concurrent callers.

use std::sync::{Arc, Mutex};

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use tracing::info;

/// Outcome of one delete attempt. Immutable once recorded.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Resource identifier (parameter name, target group ARN)
    pub identifier: String,
    /// Stable resource kind tag
    pub resource_type: &'static str,
    /// Rendered error, absent on success
    pub error: Option<String>,
}

impl Entry {
    /// Entry for a successful deletion
    pub fn success(identifier: &str, resource_type: &'static str) -> Self {
        Self {
            identifier: identifier.to_string(),
            resource_type,
            error: None,
        }
    }

    /// Entry for a failed deletion, capturing the full context chain
    pub fn failure(identifier: &str, resource_type: &'static str, error: &anyhow::Error) -> Self {
        Self {
            identifier: identifier.to_string(),
            resource_type,
            error: Some(format!("{error:#}")),
        }
    }
}

/// Append-only sink of deletion outcomes, shared across concurrent tasks.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome. Fire-and-forget.
    pub fn record(&self, entry: Entry) {
        self.lock().push(entry);
    }

    /// Snapshot of all recorded outcomes, in recording order.
    pub fn entries(&self) -> Vec<Entry> {
        self.lock().clone()
    }

    /// Number of recorded failures.
    pub fn failure_count(&self) -> usize {
        self.lock().iter().filter(|e| e.error.is_some()).count()
    }

    /// Print a summary table of every attempted deletion to stdout.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            info!("No resources were deleted");
            return;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Identifier", "Resource Type", "Status"]);

        for entry in &entries {
            let status = match &entry.error {
                None => "deleted".to_string(),
                Some(message) => format!("failed: {message}"),
            };
            table.add_row(vec![
                Cell::new(&entry.identifier),
                Cell::new(entry.resource_type),
                Cell::new(status),
            ]);
        }

        println!("{table}");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        // A panic while holding the guard poisons the lock; keep recording
        // outcomes from the surviving tasks rather than propagating.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let reporter = Reporter::new();
        reporter.record(Entry::success("/app/one", "ssm-parameter"));
        reporter.record(Entry::failure(
            "/app/two",
            "ssm-parameter",
            &anyhow::anyhow!("access denied"),
        ));

        let entries = reporter.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].identifier, "/app/one");
        assert!(entries[0].error.is_none());
        assert_eq!(entries[1].identifier, "/app/two");
        assert_eq!(entries[1].error.as_deref(), Some("access denied"));
        assert_eq!(reporter.failure_count(), 1);
    }

    #[test]
    fn failure_entry_renders_context_chain() {
        let error = anyhow::anyhow!("throttled").context("Failed to delete parameter /app/key");
        let entry = Entry::failure("/app/key", "ssm-parameter", &error);
        let message = entry.error.unwrap();
        assert!(message.contains("Failed to delete parameter /app/key"));
        assert!(message.contains("throttled"));
    }

    #[tokio::test]
    async fn concurrent_recording_keeps_every_entry() {
        let reporter = Reporter::new();
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let reporter = reporter.clone();
                tokio::spawn(async move {
                    reporter.record(Entry::success(&format!("/app/{i}"), "ssm-parameter"));
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(reporter.entries().len(), 32);
        assert_eq!(reporter.failure_count(), 0);
    }
}
