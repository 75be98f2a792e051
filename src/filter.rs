//! Name and age predicates for selecting sweep candidates

use chrono::{DateTime, Utc};
use regex::Regex;

/// Compiled include/exclude rule pair for one resource kind.
///
/// Patterns are compiled at config load time; a `FilterRule` never fails at
/// match time.
#[derive(Debug, Clone, Default)]
pub struct FilterRule {
    /// Names must match this pattern to be included, when set
    pub include: Option<Regex>,
    /// Names matching this pattern are always excluded, when set
    pub exclude: Option<Regex>,
}

impl FilterRule {
    /// Check whether a resource name passes this rule.
    pub fn matches(&self, name: &str) -> bool {
        should_include(name, self.include.as_ref(), self.exclude.as_ref())
    }
}

/// Decide whether a resource name is a sweep candidate.
///
/// - Neither pattern set: everything is included.
/// - Include set: the name must match it.
/// - Exclude set and matching: excluded, regardless of the include result.
pub fn should_include(name: &str, include: Option<&Regex>, exclude: Option<&Regex>) -> bool {
    if let Some(exclude) = exclude {
        if exclude.is_match(name) {
            return false;
        }
    }

    match include {
        Some(include) => include.is_match(name),
        None => true,
    }
}

/// Age predicate for resource kinds whose listing metadata carries a
/// timestamp.
///
/// A resource is a candidate when its timestamp is not after the cutoff.
/// Kinds without a timestamp pass `None` and fall back to the name filter
/// alone, as does a run with no cutoff configured.
pub fn within_cutoff(
    timestamp: Option<DateTime<Utc>>,
    exclude_after: Option<DateTime<Utc>>,
) -> bool {
    match (timestamp, exclude_after) {
        (Some(timestamp), Some(cutoff)) => timestamp <= cutoff,
        _ => true,
    }
}
