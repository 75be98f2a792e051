//! ELBv2 target group sweep adapter

use async_trait::async_trait;
use aws_sdk_elasticloadbalancingv2::types::TargetGroup;
use tracing::{debug, warn};

use crate::aws::context::AwsContext;
use crate::aws::error::classify_anyhow_error;
use crate::batch::AggregateError;
use crate::filter::FilterRule;
use crate::report::{Entry, Reporter};
use crate::resource::Resource;

/// Resource kind tag for target groups
pub const TARGET_GROUP: &str = "target-group";

// Conservative cap to stay under the ELBv2 API throttle.
const MAX_BATCH_SIZE: usize = 49;

/// Sweep adapter for ELBv2 target groups.
///
/// Target group listing metadata carries no creation timestamp, so only the
/// name filter applies; identifiers are ARNs while the filter matches the
/// human-assigned group name.
pub struct TargetGroups {
    client: aws_sdk_elasticloadbalancingv2::Client,
    region: String,
    rule: FilterRule,
    reporter: Reporter,
}

impl TargetGroups {
    /// Create the adapter from a pre-loaded AWS context.
    pub fn from_context(ctx: &AwsContext, rule: FilterRule, reporter: Reporter) -> Self {
        Self {
            client: ctx.elbv2_client(),
            region: ctx.region().to_string(),
            rule,
            reporter,
        }
    }

    async fn delete_target_group(&self, arn: &str) -> anyhow::Result<()> {
        if let Err(e) = self
            .client
            .delete_target_group()
            .target_group_arn(arn)
            .send()
            .await
        {
            let error =
                anyhow::Error::from(e).context(format!("Failed to delete target group {arn}"));
            if classify_anyhow_error(&error).is_not_found() {
                debug!(target_group = %arn, "Target group already deleted");
                return Ok(());
            }
            return Err(error);
        }
        Ok(())
    }
}

/// Whether a listed target group is a sweep candidate under the given rule.
fn should_include_target_group(rule: &FilterRule, group: &TargetGroup) -> bool {
    match group.target_group_name() {
        Some(name) => rule.matches(name),
        None => false,
    }
}

#[async_trait]
impl Resource for TargetGroups {
    fn resource_name(&self) -> &'static str {
        TARGET_GROUP
    }

    async fn resource_identifiers(&self) -> anyhow::Result<Vec<String>> {
        use anyhow::Context as _;

        let mut arns = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .client
                .describe_target_groups()
                .set_marker(marker)
                .send()
                .await
                .context("Failed to describe target groups")?;

            for group in response.target_groups() {
                if should_include_target_group(&self.rule, group) {
                    if let Some(arn) = group.target_group_arn() {
                        arns.push(arn.to_string());
                    }
                }
            }

            marker = response.next_marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }

        debug!(count = arns.len(), region = %self.region, "Found target groups");
        Ok(arns)
    }

    fn max_batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }

    async fn nuke(&self, identifiers: &[String]) -> Result<(), AggregateError> {
        if identifiers.is_empty() {
            debug!(region = %self.region, "No target groups to nuke");
            return Ok(());
        }

        debug!(
            count = identifiers.len(),
            region = %self.region,
            "Deleting target groups"
        );

        // Each delete is already a single round trip, so the batch is walked
        // sequentially; a failed ARN never aborts the remaining deletions.
        let mut deleted = 0usize;
        let mut errors = Vec::new();

        for arn in identifiers {
            match self.delete_target_group(arn).await {
                Ok(()) => {
                    deleted += 1;
                    debug!(target_group = %arn, "Deleted target group");
                    self.reporter.record(Entry::success(arn, TARGET_GROUP));
                }
                Err(error) => {
                    warn!(target_group = %arn, error = ?error, "Failed to delete target group");
                    self.reporter.record(Entry::failure(arn, TARGET_GROUP, &error));
                    errors.push(error);
                }
            }
        }

        debug!(deleted, region = %self.region, "Target group deletion pass complete");
        AggregateError::from_errors(errors)
    }
}
