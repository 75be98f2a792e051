//! Sweep rule configuration
//!
//! Rules live in a TOML file mapping resource kind to include/exclude name
//! patterns:
//!
//! ```toml
//! [ssm-parameter.include]
//! names_regex = "^/staging/"
//!
//! [ssm-parameter.exclude]
//! names_regex = "retain"
//!
//! [target-group.include]
//! names_regex = "^dev-"
//! ```
//!
//! Patterns are compiled here, at load time. A malformed pattern is a
//! configuration error surfaced to the caller immediately; the filter itself
//! never sees an uncompiled pattern.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::filter::FilterRule;

/// Compiled sweep rules, one [`FilterRule`] per resource kind.
///
/// The default configuration has no patterns: every resource of an enabled
/// kind is a candidate.
#[derive(Debug, Clone, Default)]
pub struct SweepConfig {
    pub ssm_parameter: FilterRule,
    pub target_group: FilterRule,
}

impl SweepConfig {
    /// Load and compile rules from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents)
    }

    /// Parse and compile rules from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(contents).context("Failed to parse config file")?;

        Ok(Self {
            ssm_parameter: raw.ssm_parameter.compile("ssm-parameter")?,
            target_group: raw.target_group.compile("target-group")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(rename = "ssm-parameter", default)]
    ssm_parameter: RawRules,
    #[serde(rename = "target-group", default)]
    target_group: RawRules,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRules {
    #[serde(default)]
    include: RawPattern,
    #[serde(default)]
    exclude: RawPattern,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPattern {
    names_regex: Option<String>,
}

impl RawRules {
    fn compile(&self, kind: &str) -> Result<FilterRule> {
        Ok(FilterRule {
            include: compile_pattern(self.include.names_regex.as_deref(), kind, "include")?,
            exclude: compile_pattern(self.exclude.names_regex.as_deref(), kind, "exclude")?,
        })
    }
}

fn compile_pattern(pattern: Option<&str>, kind: &str, rule: &str) -> Result<Option<Regex>> {
    pattern
        .map(|p| {
            Regex::new(p)
                .with_context(|| format!("Invalid {rule} pattern for {kind}: {p:?}"))
        })
        .transpose()
}
