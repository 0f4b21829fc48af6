//! Best-alignment comparison of two token sequences.
//!
//! [`SequenceComparator::compare`] evaluates every synonym permutation pair of
//! two [`Sequence`]s, aligns each pair greedily into one-to-one token
//! comparisons, and returns the minimum under the six-criterion ranking
//! order. Lower is better throughout: the ordering prefers more equal tokens,
//! fewer unmatched tokens, longer consecutive equal runs, less aggregate edit
//! distance, then more prefix and suffix matches.

use std::cmp::{Ordering, Reverse};

use ahash::AHashSet;

use crate::analysis::sequence::Sequence;
use crate::analysis::token::Token;
use crate::compare::token::{Qualifier, TokenComparator, TokenComparison};

/// Default threshold for [`SequenceComparison::is_potential_match`].
pub const POTENTIAL_MATCH_THRESHOLD: f64 = 0.5;

/// The flattened result of aligning two sequences: accepted one-to-one token
/// comparisons plus the tokens of either side that found no partner.
#[derive(Clone, Debug, Default)]
pub struct SequenceComparison {
    comparisons: Vec<TokenComparison>,
    unmatched_left: Vec<Token>,
    unmatched_right: Vec<Token>,
    /// Start index of each merged field segment within `comparisons`. Run
    /// metrics never cross a segment boundary: positions restart per field,
    /// so a run continuing across fields would be an accident of numbering.
    segments: Vec<usize>,
    metrics: Metrics,
}

/// Derived metrics defining the ranking order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Metrics {
    equal_count: usize,
    unmatched_count: usize,
    longest_equal_run: usize,
    runs_at_longest: usize,
    edit_distance: usize,
    prefix_count: usize,
    suffix_count: usize,
}

impl Metrics {
    fn of(comparisons: &[TokenComparison], segments: &[usize], unmatched: usize) -> Self {
        let mut metrics = Metrics {
            unmatched_count: unmatched,
            ..Metrics::default()
        };
        for c in comparisons {
            metrics.edit_distance += c.edit_distance;
            match c.qualifier {
                Qualifier::Equal => metrics.equal_count += 1,
                Qualifier::Prefix => metrics.prefix_count += 1,
                Qualifier::Suffix => metrics.suffix_count += 1,
                Qualifier::Comp => {}
            }
        }

        // Longest run of equal comparisons at consecutive left positions,
        // and how many runs reach that length. The run state resets at every
        // segment boundary so a run can never continue from one merged field
        // into the next.
        let mut bounds = segments.to_vec();
        bounds.push(comparisons.len());
        let mut finished_runs: Vec<usize> = Vec::new();
        for pair in bounds.windows(2) {
            let mut run = 0usize;
            let mut prev_position: Option<usize> = None;
            for c in &comparisons[pair[0]..pair[1]] {
                let consecutive = c.qualifier == Qualifier::Equal
                    && prev_position.is_some_and(|p| c.left.position == p + 1);
                if c.qualifier == Qualifier::Equal {
                    if consecutive && run > 0 {
                        run += 1;
                    } else {
                        if run > 0 {
                            finished_runs.push(run);
                        }
                        run = 1;
                    }
                    prev_position = Some(c.left.position);
                } else {
                    if run > 0 {
                        finished_runs.push(run);
                    }
                    run = 0;
                    prev_position = None;
                }
            }
            if run > 0 {
                finished_runs.push(run);
            }
        }
        metrics.longest_equal_run = finished_runs.iter().copied().max().unwrap_or(0);
        metrics.runs_at_longest = finished_runs
            .iter()
            .filter(|&&r| r == metrics.longest_equal_run && r > 0)
            .count();

        metrics
    }

    /// Ascending = better. Strict weak order: ties on every criterion make
    /// two comparisons equivalent.
    #[allow(clippy::type_complexity)]
    fn rank(
        &self,
    ) -> (
        Reverse<usize>,
        usize,
        Reverse<usize>,
        Reverse<usize>,
        usize,
        Reverse<usize>,
        Reverse<usize>,
    ) {
        (
            Reverse(self.equal_count),
            self.unmatched_count,
            Reverse(self.longest_equal_run),
            Reverse(self.runs_at_longest),
            self.edit_distance,
            Reverse(self.prefix_count),
            Reverse(self.suffix_count),
        )
    }
}

impl SequenceComparison {
    fn new(
        comparisons: Vec<TokenComparison>,
        unmatched_left: Vec<Token>,
        unmatched_right: Vec<Token>,
    ) -> Self {
        Self::with_segments(comparisons, unmatched_left, unmatched_right, vec![0])
    }

    fn with_segments(
        comparisons: Vec<TokenComparison>,
        unmatched_left: Vec<Token>,
        unmatched_right: Vec<Token>,
        segments: Vec<usize>,
    ) -> Self {
        let metrics = Metrics::of(
            &comparisons,
            &segments,
            unmatched_left.len() + unmatched_right.len(),
        );
        SequenceComparison {
            comparisons,
            unmatched_left,
            unmatched_right,
            segments,
            metrics,
        }
    }

    /// The accepted one-to-one token comparisons, ordered by left position.
    pub fn comparisons(&self) -> &[TokenComparison] {
        &self.comparisons
    }

    /// Left-side tokens that found no partner.
    pub fn unmatched_left(&self) -> &[Token] {
        &self.unmatched_left
    }

    /// Right-side tokens that found no partner.
    pub fn unmatched_right(&self) -> &[Token] {
        &self.unmatched_right
    }

    /// Count of comparisons with qualifier `equal`.
    pub fn equal_count(&self) -> usize {
        self.metrics.equal_count
    }

    /// Total unmatched tokens across both sides.
    pub fn unmatched_count(&self) -> usize {
        self.metrics.unmatched_count
    }

    /// Aggregate edit distance across accepted comparisons.
    pub fn edit_distance(&self) -> usize {
        self.metrics.edit_distance
    }

    /// An exact match: zero aggregate edit distance and nothing unmatched.
    pub fn is_match(&self) -> bool {
        self.metrics.edit_distance == 0 && self.metrics.unmatched_count == 0
    }

    /// Whether this comparison clears `threshold` on both the token-count
    /// ratio and the length-weighted ratio.
    ///
    /// Token-count ratio: `2·matched / (2·matched + unmatched)`.
    /// Length-weighted ratio: matched character length (adjusted by edit
    /// distance) over matched + unmatched + edit-distance character length.
    pub fn is_potential_match(&self, threshold: f64) -> bool {
        let matched = self.comparisons.len();
        let unmatched = self.metrics.unmatched_count;

        let token_denominator = 2 * matched + unmatched;
        let token_ratio = if token_denominator == 0 {
            1.0
        } else {
            (2 * matched) as f64 / token_denominator as f64
        };
        if token_ratio < threshold {
            return false;
        }

        let matched_chars: usize = self.comparisons.iter().map(|c| c.max_len()).sum();
        let unmatched_chars: usize = self
            .unmatched_left
            .iter()
            .chain(&self.unmatched_right)
            .map(|t| t.len())
            .sum();
        let edits = self.metrics.edit_distance;
        let length_denominator = matched_chars + unmatched_chars + edits;
        let length_ratio = if length_denominator == 0 {
            1.0
        } else {
            matched_chars.saturating_sub(edits) as f64 / length_denominator as f64
        };
        length_ratio >= threshold
    }

    /// Combine two field-level comparisons (e.g. street + city) into one
    /// holistic comparison for multi-field ranking.
    pub fn merge(&self, other: &SequenceComparison) -> SequenceComparison {
        let mut comparisons = self.comparisons.clone();
        comparisons.extend(other.comparisons.iter().cloned());
        let mut unmatched_left = self.unmatched_left.clone();
        unmatched_left.extend(other.unmatched_left.iter().cloned());
        let mut unmatched_right = self.unmatched_right.clone();
        unmatched_right.extend(other.unmatched_right.iter().cloned());
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().map(|s| s + self.comparisons.len()));
        SequenceComparison::with_segments(comparisons, unmatched_left, unmatched_right, segments)
    }

    /// Drop the unmatched tokens of one side, per the field's comparison
    /// policy, and recompute metrics.
    pub(crate) fn without_unmatched(&self, drop_left: bool, drop_right: bool) -> Self {
        SequenceComparison::with_segments(
            self.comparisons.clone(),
            if drop_left {
                Vec::new()
            } else {
                self.unmatched_left.clone()
            },
            if drop_right {
                Vec::new()
            } else {
                self.unmatched_right.clone()
            },
            self.segments.clone(),
        )
    }

    /// Human-readable breakdown for diagnostics.
    pub fn summary(&self) -> String {
        let pairs: Vec<String> = self
            .comparisons
            .iter()
            .map(|c| {
                format!(
                    "{}~{} ({:?}, ed {})",
                    c.left.text, c.right.text, c.qualifier, c.edit_distance
                )
            })
            .collect();
        let unmatched: Vec<&str> = self
            .unmatched_left
            .iter()
            .chain(&self.unmatched_right)
            .map(|t| t.text.as_str())
            .collect();
        format!(
            "matched [{}] unmatched [{}] equal {} ed {}",
            pairs.join(", "),
            unmatched.join(", "),
            self.metrics.equal_count,
            self.metrics.edit_distance
        )
    }
}

impl PartialEq for SequenceComparison {
    fn eq(&self, other: &Self) -> bool {
        self.metrics.rank() == other.metrics.rank()
    }
}

impl Eq for SequenceComparison {}

impl PartialOrd for SequenceComparison {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SequenceComparison {
    /// The six-criterion strict weak order; ascending = better.
    fn cmp(&self, other: &Self) -> Ordering {
        self.metrics.rank().cmp(&other.metrics.rank())
    }
}

/// Aligns sequence permutations into [`SequenceComparison`]s.
///
/// One comparator instance serves one logical comparison task; its memo cache
/// is private and unsynchronized by design.
#[derive(Debug, Default)]
pub struct SequenceComparator {
    tokens: TokenComparator,
}

impl SequenceComparator {
    /// Create a new comparator with an empty memo cache.
    pub fn new() -> Self {
        SequenceComparator {
            tokens: TokenComparator::new(),
        }
    }

    /// Compare two sequences: the minimum alignment over the Cartesian
    /// product of their synonym permutations.
    pub fn compare(&mut self, left: &Sequence, right: &Sequence) -> SequenceComparison {
        // Right permutations are replayed once per left permutation, so they
        // are materialized up front; the count is bounded by the product of
        // per-slot branch counts.
        let right_perms: Vec<Vec<Token>> = right.permutations().collect();

        let mut best: Option<SequenceComparison> = None;
        for left_perm in left.permutations() {
            for right_perm in &right_perms {
                let aligned = self.align(&left_perm, right_perm);
                match &best {
                    Some(current) if *current <= aligned => {}
                    _ => best = Some(aligned),
                }
            }
        }
        best.unwrap_or_default()
    }

    /// Greedy one-to-one alignment of two concrete token arrays.
    fn align(&mut self, left: &[Token], right: &[Token]) -> SequenceComparison {
        let mut pending: Vec<TokenComparison> = Vec::with_capacity(left.len() * right.len());
        for l in left {
            for r in right {
                pending.push(self.tokens.compare(l, r));
            }
        }

        // Best candidates first: equal, then low edit distance, then prefix,
        // then suffix, tie-broken by ascending position sum.
        pending.sort_by_key(|c| {
            (
                c.qualifier != Qualifier::Equal,
                c.edit_distance,
                c.qualifier != Qualifier::Prefix,
                c.qualifier != Qualifier::Suffix,
                c.position_sum(),
            )
        });

        let mut accepted: Vec<TokenComparison> = Vec::new();
        while !pending.is_empty() {
            let candidate = pending.remove(0);
            // Whether accepted or rejected, both tokens leave the pool: a
            // rejected pairing still consumes its tokens' one shot.
            let left_id = candidate.left.identity();
            let right_id = candidate.right.identity();
            pending.retain(|c| c.left.identity() != left_id && c.right.identity() != right_id);
            if candidate.is_acceptable() {
                accepted.push(candidate);
            }
        }

        accepted.sort_by_key(|c| c.left.position);

        let unmatched_left = Self::unmatched(left, accepted.iter().map(|c| &c.left));
        let unmatched_right = Self::unmatched(right, accepted.iter().map(|c| &c.right));

        SequenceComparison::new(accepted, unmatched_left, unmatched_right)
    }

    /// Tokens of `side` not consumed by an accepted comparison. A position
    /// contributes at most one unmatched token: synonym siblings of a matched
    /// or already-reported position are dropped.
    fn unmatched<'a, I>(side: &[Token], matched: I) -> Vec<Token>
    where
        I: Iterator<Item = &'a Token>,
    {
        let mut matched_ids = AHashSet::new();
        let mut matched_positions = AHashSet::new();
        for token in matched {
            matched_ids.insert(token.identity());
            matched_positions.insert(token.position);
        }

        let mut reported_positions = AHashSet::new();
        side.iter()
            .filter(|t| {
                !matched_ids.contains(&t.identity())
                    && !matched_positions.contains(&t.position)
                    && reported_positions.insert(t.position)
            })
            .cloned()
            .collect()
    }
}
