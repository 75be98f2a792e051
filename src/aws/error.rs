//! AWS error classification and handling
//!
//! Provides typed errors for AWS SDK operations using the `.code()` method
//! instead of string matching on Debug format.

use thiserror::Error;

/// AWS error categories for sweep logic
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (safe to treat as already deleted)
    #[error("Resource not found: {resource_id}")]
    NotFound { resource_id: String },

    /// Rate limit exceeded (retryable with backoff)
    #[error("Rate limit exceeded")]
    Throttled,

    /// Resource has dependent objects (e.g. target group attached to a listener)
    #[error("Resource is in use")]
    ResourceInUse,

    /// Credentials lack permission for the operation
    #[error("Access denied")]
    AccessDenied,

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, AwsError::Throttled | AwsError::ResourceInUse)
    }

    /// Check if this is a permissions error
    pub fn is_access_denied(&self) -> bool {
        matches!(self, AwsError::AccessDenied)
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "ParameterNotFound",
    "TargetGroupNotFound",
    "LoadBalancerNotFound",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyUpdates",
];

/// Known AWS error codes for in-use resources
const IN_USE_CODES: &[&str] = &["ResourceInUse"];

/// Known AWS error codes for missing permissions
const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            resource_id: message,
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled,
        Some(c) if IN_USE_CODES.contains(&c) => AwsError::ResourceInUse,
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => AwsError::AccessDenied,
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an error from an anyhow::Error by extracting the AWS error code.
///
/// Walks the error chain using `ProvideErrorMetadata` to extract `.code()` and
/// `.message()` from any AWS SDK error. Falls back to string matching on the
/// Debug representation if no typed error is found.
pub fn classify_anyhow_error(error: &anyhow::Error) -> AwsError {
    use aws_sdk_ssm::error::ProvideErrorMetadata;

    // AWS SDK operation errors implement ProvideErrorMetadata directly, but
    // only concrete types can be downcast out of an anyhow chain.
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<aws_sdk_ssm::error::SdkError<
            aws_sdk_ssm::operation::delete_parameter::DeleteParameterError,
        >>() {
            let meta = ProvideErrorMetadata::meta(e);
            return classify_aws_error(meta.code(), meta.message());
        }
        if let Some(e) = cause.downcast_ref::<aws_sdk_ssm::error::SdkError<
            aws_sdk_ssm::operation::describe_parameters::DescribeParametersError,
        >>() {
            let meta = ProvideErrorMetadata::meta(e);
            return classify_aws_error(meta.code(), meta.message());
        }
        if let Some(e) = cause.downcast_ref::<aws_sdk_elasticloadbalancingv2::error::SdkError<
            aws_sdk_elasticloadbalancingv2::operation::delete_target_group::DeleteTargetGroupError,
        >>() {
            let meta = ProvideErrorMetadata::meta(e);
            return classify_aws_error(meta.code(), meta.message());
        }
        if let Some(e) = cause.downcast_ref::<aws_sdk_elasticloadbalancingv2::error::SdkError<
            aws_sdk_elasticloadbalancingv2::operation::describe_target_groups::DescribeTargetGroupsError,
        >>() {
            let meta = ProvideErrorMetadata::meta(e);
            return classify_aws_error(meta.code(), meta.message());
        }
    }

    // Fallback: extract error code from debug string representation
    let debug_str = format!("{:?}", error);
    if let Some(code) = extract_error_code(&debug_str) {
        return classify_aws_error(Some(&code), Some(&debug_str));
    }

    AwsError::Sdk {
        code: None,
        message: error.to_string(),
    }
}

/// All known AWS error codes for extraction from debug strings (flat list)
const ALL_KNOWN_CODES: &[&str] = &[
    // Not found
    "ParameterNotFound",
    "TargetGroupNotFound",
    "LoadBalancerNotFound",
    // Throttling
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "TooManyUpdates",
    // In use
    "ResourceInUse",
    // Permissions
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
];

/// Extract an AWS error code from a debug string representation
fn extract_error_code(debug_str: &str) -> Option<String> {
    for code in ALL_KNOWN_CODES {
        if debug_str.contains(code) {
            return Some((*code).to_string());
        }
    }

    // Try to extract any code from `code: Some("...")` pattern
    if let Some(start) = debug_str.find("code: Some(\"") {
        let rest = &debug_str[start + 12..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_aws_error(Some(code), Some("some message"));
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
        }
    }

    #[test]
    fn throttling_codes() {
        for code in THROTTLING_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(err.is_retryable(), "Expected retryable for code: {code}");
            assert!(matches!(err, AwsError::Throttled));
        }
    }

    #[test]
    fn in_use_is_retryable() {
        let err = classify_aws_error(Some("ResourceInUse"), Some("attached to listener"));
        assert!(err.is_retryable());
        assert!(matches!(err, AwsError::ResourceInUse));
    }

    #[test]
    fn access_denied_codes() {
        for code in ACCESS_DENIED_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(
                err.is_access_denied(),
                "Expected AccessDenied for code: {code}"
            );
        }
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_aws_error(Some("SomeNewError"), Some("details"));
        assert!(matches!(err, AwsError::Sdk { .. }));

        let err2 = classify_aws_error(None, Some("something failed"));
        assert!(matches!(err2, AwsError::Sdk { code: None, .. }));
    }

    #[test]
    fn extract_known_codes_from_debug_string() {
        for code in ALL_KNOWN_CODES {
            let debug_str = format!("SdkError {{ code: Some(\"{code}\"), message: \"fail\" }}");
            let extracted = extract_error_code(&debug_str);
            assert!(
                extracted.is_some(),
                "Failed to extract any code from string containing: {code}"
            );
        }
    }

    #[test]
    fn extract_code_from_code_field() {
        let debug_str = r#"SdkError { code: Some("SomeRandomCode"), message: "fail" }"#;
        assert_eq!(
            extract_error_code(debug_str).as_deref(),
            Some("SomeRandomCode")
        );
    }

    #[test]
    fn extract_none_from_unrelated_string() {
        assert!(extract_error_code("connection refused").is_none());
    }

    #[test]
    fn classify_plain_anyhow_error_falls_back_to_sdk() {
        let err = classify_anyhow_error(&anyhow::anyhow!("connection refused"));
        assert!(matches!(err, AwsError::Sdk { code: None, .. }));
    }

    #[test]
    fn classify_anyhow_error_reads_codes_from_context_chain() {
        // A wrapped error whose Debug output carries a known code, as SDK
        // errors do after context wrapping.
        let err = anyhow::anyhow!("ParameterNotFound: no such parameter")
            .context("Failed to delete parameter /app/key");
        assert!(classify_anyhow_error(&err).is_not_found());
    }
}
