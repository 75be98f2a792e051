//! SSM parameter sweep adapter

use async_trait::async_trait;
use aws_sdk_ssm::types::ParameterMetadata;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::aws::context::AwsContext;
use crate::aws::error::classify_anyhow_error;
use crate::batch::{self, AggregateError};
use crate::filter::{self, FilterRule};
use crate::report::Reporter;
use crate::resource::Resource;

/// Resource kind tag for SSM parameters
pub const SSM_PARAMETER: &str = "ssm-parameter";

// There is no bulk-delete API for parameters, so a batch is deleted with one
// concurrent call per name. Conservative cap to stay under the SSM write
// throttle.
const MAX_BATCH_SIZE: usize = 20;

/// Sweep adapter for Systems Manager parameters.
///
/// Parameter metadata exposes a last-modified timestamp, so both the name
/// filter and the age cutoff apply.
pub struct SsmParameters {
    client: aws_sdk_ssm::Client,
    region: String,
    rule: FilterRule,
    exclude_after: Option<DateTime<Utc>>,
    reporter: Reporter,
}

impl SsmParameters {
    /// Create the adapter from a pre-loaded AWS context.
    pub fn from_context(
        ctx: &AwsContext,
        rule: FilterRule,
        exclude_after: Option<DateTime<Utc>>,
        reporter: Reporter,
    ) -> Self {
        Self {
            client: ctx.ssm_client(),
            region: ctx.region().to_string(),
            rule,
            exclude_after,
            reporter,
        }
    }

    async fn delete_parameter(&self, name: &str) -> anyhow::Result<()> {
        if let Err(e) = self.client.delete_parameter().name(name).send().await {
            let error =
                anyhow::Error::from(e).context(format!("Failed to delete parameter {name}"));
            if classify_anyhow_error(&error).is_not_found() {
                debug!(parameter = %name, "Parameter already deleted");
                return Ok(());
            }
            return Err(error);
        }
        Ok(())
    }
}

/// Whether a listed parameter is a sweep candidate under the given rule and
/// age cutoff.
fn should_include_parameter(
    rule: &FilterRule,
    exclude_after: Option<DateTime<Utc>>,
    param: &ParameterMetadata,
) -> bool {
    let Some(name) = param.name() else {
        return false;
    };
    rule.matches(name) && filter::within_cutoff(last_modified(param), exclude_after)
}

fn last_modified(param: &ParameterMetadata) -> Option<DateTime<Utc>> {
    param
        .last_modified_date()
        .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos()))
}

#[async_trait]
impl Resource for SsmParameters {
    fn resource_name(&self) -> &'static str {
        SSM_PARAMETER
    }

    async fn resource_identifiers(&self) -> anyhow::Result<Vec<String>> {
        use anyhow::Context as _;

        let mut names = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .describe_parameters()
                .set_next_token(next_token)
                .send()
                .await
                .context("Failed to describe parameters")?;

            for param in response.parameters() {
                if should_include_parameter(&self.rule, self.exclude_after, param) {
                    if let Some(name) = param.name() {
                        names.push(name.to_string());
                    }
                }
            }

            next_token = response.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        debug!(count = names.len(), region = %self.region, "Found SSM parameters");
        Ok(names)
    }

    fn max_batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }

    async fn nuke(&self, identifiers: &[String]) -> Result<(), AggregateError> {
        if identifiers.is_empty() {
            debug!(region = %self.region, "No SSM parameters to nuke");
            return Ok(());
        }

        debug!(
            count = identifiers.len(),
            region = %self.region,
            "Deleting SSM parameters"
        );

        let this = self;
        batch::nuke_batch(identifiers, SSM_PARAMETER, &self.reporter, |name| {
            async move { this.delete_parameter(&name).await }
        })
        .await
    }
}
