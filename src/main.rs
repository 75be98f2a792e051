//! aws-sweep: rule-based sweeping of leftover AWS resources
//!
//! Lists SSM parameters and ELBv2 target groups matching include/exclude
//! rules and an age cutoff, deletes them in bounded concurrent batches, and
//! prints a per-resource outcome summary.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use aws_sweep::aws::AwsContext;
use aws_sweep::config::SweepConfig;
use aws_sweep::orchestrator::{self, SweepOptions, ALL_RESOURCE_TYPES};
use aws_sweep::report::Reporter;

#[derive(Parser, Debug)]
#[command(name = "aws-sweep")]
#[command(about = "Rule-based sweeping of leftover AWS resources")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Delete matching resources and print a per-resource summary
    Sweep(SweepArgs),

    /// List what a sweep would delete, without deleting anything
    Plan(SweepArgs),
}

#[derive(clap::Args, Debug)]
struct SweepArgs {
    /// AWS region
    #[arg(long, default_value = "us-east-1")]
    region: String,

    /// AWS profile to use (overrides AWS_PROFILE env var)
    #[arg(long)]
    aws_profile: Option<String>,

    /// TOML file with include/exclude rules per resource type
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated resource types to sweep (default: all)
    #[arg(long)]
    resource_types: Option<String>,

    /// Only sweep resources last modified at least this many hours ago
    #[arg(long, conflicts_with = "exclude_after")]
    min_age: Option<i64>,

    /// Only sweep resources last modified at or before this RFC 3339 timestamp
    #[arg(long)]
    exclude_after: Option<String>,

    /// List what would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,
}

impl SweepArgs {
    fn parse_resource_types(&self) -> Result<Vec<String>> {
        let Some(raw) = &self.resource_types else {
            return Ok(Vec::new());
        };

        let types: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        for kind in &types {
            if !ALL_RESOURCE_TYPES.contains(&kind.as_str()) {
                bail!(
                    "Unknown resource type {kind:?} (expected one of: {})",
                    ALL_RESOURCE_TYPES.join(", ")
                );
            }
        }

        Ok(types)
    }

    fn exclude_after_cutoff(&self) -> Result<Option<DateTime<Utc>>> {
        if let Some(raw) = &self.exclude_after {
            let parsed = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid --exclude-after timestamp: {raw}"))?;
            return Ok(Some(parsed.with_timezone(&Utc)));
        }

        Ok(self.min_age.map(|hours| Utc::now() - Duration::hours(hours)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Sweep(sweep_args) => {
            let dry_run = sweep_args.dry_run;
            run(sweep_args, dry_run).await
        }
        Command::Plan(sweep_args) => run(sweep_args, true).await,
    }
}

async fn run(args: SweepArgs, dry_run: bool) -> Result<()> {
    let config = match &args.config {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::default(),
    };

    let opts = SweepOptions {
        resource_types: args.parse_resource_types()?,
        exclude_after: args.exclude_after_cutoff()?,
        dry_run,
    };

    if let Some(profile) = &args.aws_profile {
        info!(profile = %profile, "Using AWS profile");
    }
    info!(
        region = %args.region,
        resource_types = ?opts.resource_types,
        exclude_after = ?opts.exclude_after,
        dry_run = opts.dry_run,
        "Starting sweep"
    );

    let ctx = AwsContext::with_profile(&args.region, args.aws_profile.as_deref()).await;
    let reporter = Reporter::new();

    let report = orchestrator::sweep(&ctx, &config, &opts, &reporter).await;

    reporter.print_summary();
    info!(
        found = report.found,
        deleted = report.deleted,
        failed = report.failed,
        skipped = report.skipped,
        "Sweep complete"
    );

    if report.list_failures > 0 {
        bail!("Failed to list {} resource type(s)", report.list_failures);
    }
    if report.failed > 0 {
        bail!("{} deletion(s) failed; see the summary above", report.failed);
    }

    Ok(())
}
