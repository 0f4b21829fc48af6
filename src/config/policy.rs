//! Per-field comparison policies.
//!
//! A policy decides how a field's unmatched tokens are weighted before field
//! comparisons are merged for ranking. Free-text fields like street lines
//! often carry extra tokens on one side (floor numbers, care-of lines) that
//! should not sink an otherwise good candidate.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::compare::sequence::SequenceComparison;

/// How unmatched tokens are weighted for one field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Keep every unmatched token on both sides.
    #[default]
    RetainAll,
    /// Drop the query side's unmatched tokens.
    IgnoreLeft,
    /// Drop the candidate side's unmatched tokens.
    IgnoreRight,
    /// Drop whichever side has more unmatched tokens.
    IgnoreLarger,
}

impl UnmatchedPolicy {
    /// Apply this policy to a field-level comparison.
    pub fn apply(&self, comparison: &SequenceComparison) -> SequenceComparison {
        match self {
            UnmatchedPolicy::RetainAll => comparison.clone(),
            UnmatchedPolicy::IgnoreLeft => comparison.without_unmatched(true, false),
            UnmatchedPolicy::IgnoreRight => comparison.without_unmatched(false, true),
            UnmatchedPolicy::IgnoreLarger => {
                let left = comparison.unmatched_left().len();
                let right = comparison.unmatched_right().len();
                if left > right {
                    comparison.without_unmatched(true, false)
                } else if right > left {
                    comparison.without_unmatched(false, true)
                } else {
                    comparison.clone()
                }
            }
        }
    }
}

/// Field-keyed policy table with a `RetainAll` default.
#[derive(Clone, Debug, Default)]
pub struct FieldPolicies {
    policies: AHashMap<String, UnmatchedPolicy>,
}

impl FieldPolicies {
    /// Create an empty table; every field falls back to `RetainAll`.
    pub fn new() -> Self {
        FieldPolicies::default()
    }

    /// Builder-style policy registration for one field.
    pub fn with(mut self, field: &str, policy: UnmatchedPolicy) -> Self {
        self.policies.insert(field.to_string(), policy);
        self
    }

    /// Policy for a field.
    pub fn get(&self, field: &str) -> UnmatchedPolicy {
        self.policies.get(field).copied().unwrap_or_default()
    }
}
