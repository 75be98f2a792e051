//! Drives every enabled resource kind through one sweep pass
//!
//! Per kind: list candidates, chunk to the kind's batch size, nuke each
//! chunk, accumulate a run report. Chunking is owned here; adapters assume
//! their input is already capped. A listing failure aborts that kind only,
//! and the remaining kinds still run.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::aws::ssm_parameter::{SsmParameters, SSM_PARAMETER};
use crate::aws::target_group::{TargetGroups, TARGET_GROUP};
use crate::aws::AwsContext;
use crate::config::SweepConfig;
use crate::report::Reporter;
use crate::resource::Resource;

/// Every resource kind this tool can sweep, in sweep order.
pub const ALL_RESOURCE_TYPES: &[&str] = &[SSM_PARAMETER, TARGET_GROUP];

/// Options for one sweep run.
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Resource kinds to sweep; empty means all of them
    pub resource_types: Vec<String>,
    /// Only sweep resources created or modified at or before this instant
    pub exclude_after: Option<DateTime<Utc>>,
    /// List candidates without deleting anything
    pub dry_run: bool,
}

impl SweepOptions {
    fn selected(&self, resource_name: &str) -> bool {
        self.resource_types.is_empty() || self.resource_types.iter().any(|t| t == resource_name)
    }
}

/// Tally of one sweep run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Candidates found across all swept kinds
    pub found: usize,
    /// Successful deletions
    pub deleted: usize,
    /// Failed deletions
    pub failed: usize,
    /// Candidates skipped by dry run
    pub skipped: usize,
    /// Resource kinds whose listing failed
    pub list_failures: usize,
}

impl SweepReport {
    /// True when nothing went wrong anywhere in the run.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.list_failures == 0
    }
}

/// Split identifiers into batches no larger than the kind's cap.
pub fn chunk_identifiers(
    identifiers: &[String],
    max_batch_size: usize,
) -> impl Iterator<Item = &[String]> {
    identifiers.chunks(max_batch_size.max(1))
}

/// Run one sweep across all enabled resource kinds.
pub async fn sweep(
    ctx: &AwsContext,
    config: &SweepConfig,
    opts: &SweepOptions,
    reporter: &Reporter,
) -> SweepReport {
    let resources = build_resources(ctx, config, opts, reporter);
    sweep_resources(&resources, opts).await
}

fn build_resources(
    ctx: &AwsContext,
    config: &SweepConfig,
    opts: &SweepOptions,
    reporter: &Reporter,
) -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(SsmParameters::from_context(
            ctx,
            config.ssm_parameter.clone(),
            opts.exclude_after,
            reporter.clone(),
        )),
        Box::new(TargetGroups::from_context(
            ctx,
            config.target_group.clone(),
            reporter.clone(),
        )),
    ]
}

/// Sweep a prepared set of resource adapters.
pub async fn sweep_resources(resources: &[Box<dyn Resource>], opts: &SweepOptions) -> SweepReport {
    let mut report = SweepReport::default();

    for resource in resources {
        let name = resource.resource_name();
        if !opts.selected(name) {
            debug!(resource_type = %name, "Resource type not selected, skipping");
            continue;
        }

        let identifiers = match resource.resource_identifiers().await {
            Ok(identifiers) => identifiers,
            Err(error) => {
                error!(resource_type = %name, error = ?error, "Failed to list resources");
                report.list_failures += 1;
                continue;
            }
        };

        info!(
            resource_type = %name,
            count = identifiers.len(),
            "Found sweep candidates"
        );
        report.found += identifiers.len();

        if opts.dry_run {
            for identifier in &identifiers {
                info!(resource_type = %name, identifier = %identifier, "[DRY RUN] Would delete");
            }
            report.skipped += identifiers.len();
            continue;
        }

        for chunk in chunk_identifiers(&identifiers, resource.max_batch_size()) {
            match resource.nuke(chunk).await {
                Ok(()) => report.deleted += chunk.len(),
                Err(aggregate) => {
                    report.deleted += chunk.len() - aggregate.len();
                    report.failed += aggregate.len();
                    error!(
                        resource_type = %name,
                        error = %aggregate,
                        "Batch deletion had failures"
                    );
                }
            }
        }
    }

    report
}
