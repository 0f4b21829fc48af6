//! Pairwise token comparison.
//!
//! [`TokenComparator::compare`] classifies how two token values relate
//! ([`Qualifier`]) and computes their Levenshtein edit distance. The
//! comparator memoizes results keyed by token-pair identity, because the same
//! token pair recurs across synonym permutations of the surrounding
//! sequences. The cache is private to one comparator instance and must not be
//! shared across concurrent comparisons.

use std::str::FromStr;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::analysis::token::{Token, TokenIdentity};
use crate::compare::levenshtein::levenshtein_distance;
use crate::error::{PostalignError, Result};

/// Classification of how two token values relate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    /// Identical values.
    Equal,
    /// One value is a literal prefix of the other.
    Prefix,
    /// One value is a literal suffix of the other.
    Suffix,
    /// Any other relation.
    Comp,
}

impl FromStr for Qualifier {
    type Err = PostalignError;

    /// Unknown qualifier text is an internal invariant violation, not
    /// something to normalize away.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "equal" => Ok(Qualifier::Equal),
            "prefix" => Ok(Qualifier::Prefix),
            "suffix" => Ok(Qualifier::Suffix),
            "comp" => Ok(Qualifier::Comp),
            other => Err(PostalignError::internal(format!(
                "unknown qualifier: {other}"
            ))),
        }
    }
}

/// The result of comparing two tokens.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenComparison {
    pub left: Token,
    pub right: Token,
    pub qualifier: Qualifier,
    pub edit_distance: usize,
}

impl TokenComparison {
    /// Character length of the longer of the two values.
    pub fn max_len(&self) -> usize {
        self.left.len().max(self.right.len())
    }

    /// Sum of the two token positions; low sums mean well-ordered matches.
    pub fn position_sum(&self) -> usize {
        self.left.position + self.right.position
    }

    /// Whether this comparison is good enough to pair its tokens: prefixes
    /// always qualify, everything else must stay within half the longer
    /// value's length in edits.
    pub fn is_acceptable(&self) -> bool {
        if self.qualifier == Qualifier::Prefix {
            return true;
        }
        let max_len = self.max_len();
        max_len > 0 && self.edit_distance * 2 <= max_len
    }
}

/// Pairwise token comparator with a per-instance memo cache.
#[derive(Debug, Default)]
pub struct TokenComparator {
    cache: AHashMap<(TokenIdentity, TokenIdentity), (Qualifier, usize)>,
}

impl TokenComparator {
    /// Create a new comparator with an empty cache.
    pub fn new() -> Self {
        TokenComparator {
            cache: AHashMap::new(),
        }
    }

    /// Compare two tokens. Accepts any two values, including differing
    /// scripts and lengths.
    pub fn compare(&mut self, left: &Token, right: &Token) -> TokenComparison {
        let key = (left.identity(), right.identity());
        let (qualifier, edit_distance) = match self.cache.get(&key) {
            Some(&cached) => cached,
            None => {
                let computed = classify(&left.text, &right.text);
                self.cache.insert(key, computed);
                computed
            }
        };

        TokenComparison {
            left: left.clone(),
            right: right.clone(),
            qualifier,
            edit_distance,
        }
    }

    /// Number of distinct token pairs memoized so far.
    pub fn cached_pairs(&self) -> usize {
        self.cache.len()
    }
}

fn classify(left: &str, right: &str) -> (Qualifier, usize) {
    if left == right {
        return (Qualifier::Equal, 0);
    }
    let edit_distance = levenshtein_distance(left, right);
    let qualifier = if left.starts_with(right) || right.starts_with(left) {
        Qualifier::Prefix
    } else if left.ends_with(right) || right.ends_with(left) {
        Qualifier::Suffix
    } else {
        Qualifier::Comp
    };
    (qualifier, edit_distance)
}
