//! AWS provider plumbing
//!
//! - context: shared SDK configuration and service client construction
//! - error: typed classification of AWS SDK errors
//! - ssm_parameter / target_group: one sweep adapter per resource kind

pub mod context;
pub mod error;
pub mod ssm_parameter;
pub mod target_group;

pub use context::AwsContext;
pub use error::{classify_anyhow_error, classify_aws_error, AwsError};
pub use ssm_parameter::SsmParameters;
pub use target_group::TargetGroups;
