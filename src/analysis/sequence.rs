//! Token sequences with synonym groups and permutation expansion.
//!
//! A [`Sequence`] is the ordered token representation of one address field's
//! value. Each slot is either a single [`Token`] or a [`SynonymGroup`] of
//! alternative branches occupying the same textual span (a branch may itself
//! be a multi-token phrase). [`Sequence::permutations`] expands the synonym
//! branches into concrete token arrays, one per branch combination.
//!
//! # Examples
//!
//! ```
//! use postalign::analysis::sequence::Sequence;
//!
//! let seq = Sequence::from_string("100 Main St");
//! assert_eq!(seq.len(), 3);
//!
//! let mut perms = seq.permutations();
//! let tokens = perms.next().unwrap();
//! let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, vec!["100", "main", "st"]);
//! assert!(perms.next().is_none());
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::normalizer::normalize;
use crate::analysis::token::Token;

/// Alternative tokens/phrases occupying one textual span.
///
/// Each branch is an ordered token array; a single-token branch is a plain
/// alternative, a multi-token branch is a phrase expansion sharing the span.
#[derive(Clone, Debug, PartialEq)]
pub struct SynonymGroup {
    branches: Vec<Vec<Token>>,
}

impl SynonymGroup {
    /// Create a group from non-empty branches.
    pub fn new(branches: Vec<Vec<Token>>) -> Self {
        debug_assert!(branches.iter().all(|b| !b.is_empty()));
        SynonymGroup { branches }
    }

    /// The alternative branches of this group.
    pub fn branches(&self) -> &[Vec<Token>] {
        &self.branches
    }

    /// Lowest start offset across branches.
    pub fn start_offset(&self) -> usize {
        self.branches
            .iter()
            .filter_map(|b| b.first())
            .map(|t| t.start_offset)
            .min()
            .unwrap_or(0)
    }

    /// Highest end offset across branches.
    pub fn end_offset(&self) -> usize {
        self.branches
            .iter()
            .filter_map(|b| b.last())
            .map(|t| t.end_offset)
            .max()
            .unwrap_or(0)
    }

    /// Lowest position across branches.
    pub fn position(&self) -> usize {
        self.branches
            .iter()
            .filter_map(|b| b.first())
            .map(|t| t.position)
            .min()
            .unwrap_or(0)
    }
}

/// One slot of a sequence: a literal token or a group of synonym branches.
#[derive(Clone, Debug, PartialEq)]
pub enum SequenceEntry {
    Single(Token),
    Synonyms(SynonymGroup),
}

impl SequenceEntry {
    /// Position of the slot in the token stream.
    pub fn position(&self) -> usize {
        match self {
            SequenceEntry::Single(t) => t.position,
            SequenceEntry::Synonyms(g) => g.position(),
        }
    }

    fn start_offset(&self) -> usize {
        match self {
            SequenceEntry::Single(t) => t.start_offset,
            SequenceEntry::Synonyms(g) => g.start_offset(),
        }
    }

    fn end_offset(&self) -> usize {
        match self {
            SequenceEntry::Single(t) => t.end_offset,
            SequenceEntry::Synonyms(g) => g.end_offset(),
        }
    }
}

/// Ordered token slots for one address field, plus the raw source string.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Sequence {
    entries: Vec<SequenceEntry>,
    source: String,
}

impl Sequence {
    /// Build a sequence by tokenizing raw text.
    ///
    /// Segmentation follows Unicode word-boundary rules (UAX #29). Segments
    /// without any alphanumeric character are dropped; surviving segments
    /// record their exact byte offsets against the original text, are
    /// classified NUM/ALPHANUM, and store their normalized value.
    pub fn from_string(text: &str) -> Self {
        let mut entries = Vec::new();
        let mut position = 0;
        let mut offset = 0;

        for word in text.split_word_bounds() {
            let start_offset = offset;
            offset += word.len();

            if !word.chars().any(|c| c.is_alphanumeric()) {
                continue;
            }
            let normalized = normalize(word);
            if normalized.is_empty() {
                continue;
            }

            entries.push(SequenceEntry::Single(Token::with_offsets(
                normalized,
                position,
                start_offset,
                start_offset + word.len(),
            )));
            position += 1;
        }

        Sequence {
            entries,
            source: text.to_string(),
        }
    }

    /// Build a sequence from tokens produced by an external analyzer or a
    /// term-vector response.
    ///
    /// Tokens whose offset ranges overlap (stemmed/synonym variants sharing
    /// one span) are folded into a single [`SynonymGroup`] slot. Within a
    /// group, tokens are threaded into branches by position: a token at the
    /// group's base position opens a new branch, any other token continues
    /// the branch expecting it (`position == previous position +
    /// position_length`). Multi-word branches therefore come out as ordered
    /// token arrays.
    pub fn from_analyzed<S: Into<String>>(source: S, mut tokens: Vec<Token>) -> Self {
        tokens.sort_by_key(|t| (t.start_offset, t.position, t.end_offset));

        let mut entries = Vec::new();
        let mut cluster: Vec<Token> = Vec::new();
        let mut cluster_end = 0;

        for token in tokens {
            if !cluster.is_empty() && token.start_offset < cluster_end {
                cluster_end = cluster_end.max(token.end_offset);
                cluster.push(token);
            } else {
                if !cluster.is_empty() {
                    entries.push(Self::entry_from_cluster(std::mem::take(&mut cluster)));
                }
                cluster_end = token.end_offset;
                cluster.push(token);
            }
        }
        if !cluster.is_empty() {
            entries.push(Self::entry_from_cluster(cluster));
        }

        Sequence {
            entries,
            source: source.into(),
        }
    }

    fn entry_from_cluster(mut cluster: Vec<Token>) -> SequenceEntry {
        if cluster.len() == 1 {
            return SequenceEntry::Single(cluster.pop().unwrap());
        }

        cluster.sort_by_key(|t| (t.position, t.start_offset));
        let base_position = cluster[0].position;

        let mut branches: Vec<Vec<Token>> = Vec::new();
        for token in cluster {
            if token.position == base_position {
                branches.push(vec![token]);
            } else if let Some(branch) = branches.iter_mut().find(|b| {
                let last = b.last().unwrap();
                last.position + last.position_length == token.position
            }) {
                branch.push(token);
            } else {
                // Orphan continuation; treat as its own alternative.
                branches.push(vec![token]);
            }
        }
        SequenceEntry::Synonyms(SynonymGroup::new(branches))
    }

    /// The raw source string this sequence was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The ordered slots of the sequence.
    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the sequence has no slots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of concrete token arrays `permutations()` will yield: the
    /// product of per-slot branch counts.
    pub fn permutation_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| match e {
                SequenceEntry::Single(_) => 1,
                SequenceEntry::Synonyms(g) => g.branches().len().max(1),
            })
            .product()
    }

    /// Lazily enumerate every concrete token array, one per synonym-branch
    /// combination. The enumeration is finite (bounded by
    /// [`permutation_count`](Self::permutation_count)), expanded on demand,
    /// and not restartable; the relative order of non-synonym tokens is
    /// preserved in every output.
    pub fn permutations(&self) -> Permutations<'_> {
        Permutations {
            sequence: self,
            indices: vec![0; self.entries.len()],
            exhausted: false,
        }
    }

    /// Re-anchor all offsets and positions against a sub-slice of the source.
    pub fn rebase(&mut self, base_offset: usize, base_position: usize) {
        for entry in &mut self.entries {
            match entry {
                SequenceEntry::Single(t) => t.rebase(base_offset, base_position),
                SequenceEntry::Synonyms(g) => {
                    for branch in &mut g.branches {
                        for t in branch {
                            t.rebase(base_offset, base_position);
                        }
                    }
                }
            }
        }
    }

    /// Offset-ordering invariant check: positions non-decreasing and offset
    /// ranges non-overlapping across distinct slots.
    pub fn is_well_formed(&self) -> bool {
        self.entries.windows(2).all(|w| {
            w[0].position() <= w[1].position() && w[0].end_offset() <= w[1].start_offset()
        })
    }
}

/// Odometer over synonym-branch indices; see [`Sequence::permutations`].
pub struct Permutations<'a> {
    sequence: &'a Sequence,
    indices: Vec<usize>,
    exhausted: bool,
}

impl Iterator for Permutations<'_> {
    type Item = Vec<Token>;

    fn next(&mut self) -> Option<Vec<Token>> {
        if self.exhausted {
            return None;
        }
        if self.sequence.entries.is_empty() {
            self.exhausted = true;
            return Some(Vec::new());
        }

        let mut tokens = Vec::new();
        for (entry, &index) in self.sequence.entries.iter().zip(&self.indices) {
            match entry {
                SequenceEntry::Single(t) => tokens.push(t.clone()),
                SequenceEntry::Synonyms(g) => tokens.extend(g.branches()[index].iter().cloned()),
            }
        }

        // Advance the odometer, rightmost slot fastest.
        self.exhausted = true;
        for (index, entry) in self.indices.iter_mut().zip(self.sequence.entries.iter()).rev() {
            let branch_count = match entry {
                SequenceEntry::Single(_) => 1,
                SequenceEntry::Synonyms(g) => g.branches().len(),
            };
            *index += 1;
            if *index < branch_count {
                self.exhausted = false;
                break;
            }
            *index = 0;
        }

        Some(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::TokenType;

    #[test]
    fn test_from_string_basic() {
        let seq = Sequence::from_string("100 Main St");
        assert_eq!(seq.len(), 3);
        assert!(seq.is_well_formed());

        let tokens: Vec<_> = seq.permutations().next().unwrap();
        assert_eq!(tokens[0].text, "100");
        assert_eq!(tokens[0].token_type, TokenType::Num);
        assert_eq!(tokens[1].text, "main");
        assert_eq!(tokens[1].token_type, TokenType::Alphanum);
        assert_eq!(tokens[2].text, "st");
    }

    #[test]
    fn test_from_string_drops_punctuation_runs() {
        let seq = Sequence::from_string("Main, St. -- (rear)");
        let texts: Vec<_> = seq
            .permutations()
            .next()
            .unwrap()
            .iter()
            .map(|t| t.text.clone())
            .collect();
        assert_eq!(texts, vec!["main", "st", "rear"]);
    }

    #[test]
    fn test_from_string_empty() {
        assert!(Sequence::from_string("").is_empty());
        assert!(Sequence::from_string("  ,. ").is_empty());
    }

    #[test]
    fn test_offsets_reproduce_original_substrings() {
        let original = "2 Elm Avenue, Runcorn Road";
        let seq = Sequence::from_string(original);
        for tokens in seq.permutations() {
            for token in tokens {
                let substring = &original[token.start_offset..token.end_offset];
                assert_eq!(normalize(substring), token.text);
            }
        }
    }

    #[test]
    fn test_from_analyzed_groups_overlapping_offsets() {
        // "saint" and "st" share the span [0, 5); "johns" follows.
        let tokens = vec![
            Token::with_offsets("saint", 0, 0, 5),
            Token::with_offsets("st", 0, 0, 5).with_token_type(TokenType::Synonym),
            Token::with_offsets("johns", 1, 6, 11),
        ];
        let seq = Sequence::from_analyzed("Saint Johns", tokens);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.permutation_count(), 2);

        let all: Vec<Vec<String>> = seq
            .permutations()
            .map(|p| p.iter().map(|t| t.text.clone()).collect())
            .collect();
        assert!(all.contains(&vec!["saint".to_string(), "johns".to_string()]));
        assert!(all.contains(&vec!["st".to_string(), "johns".to_string()]));
    }

    #[test]
    fn test_from_analyzed_multi_word_branch() {
        // "po box" as two tokens vs the single "pobox" spanning both
        // positions (position_length = 2).
        let tokens = vec![
            Token::with_offsets("po", 0, 0, 4),
            Token::with_offsets("pobox", 0, 0, 8)
                .with_position_length(2)
                .with_token_type(TokenType::Synonym),
            Token::with_offsets("box", 1, 5, 8),
            Token::with_offsets("20", 2, 9, 11),
        ];
        let seq = Sequence::from_analyzed("P.O. Box 20", tokens);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.permutation_count(), 2);

        let all: Vec<Vec<String>> = seq
            .permutations()
            .map(|p| p.iter().map(|t| t.text.clone()).collect())
            .collect();
        assert!(all.contains(&vec!["po".to_string(), "box".to_string(), "20".to_string()]));
        assert!(all.contains(&vec!["pobox".to_string(), "20".to_string()]));
    }

    #[test]
    fn test_permutations_cartesian_bound() {
        let tokens = vec![
            Token::with_offsets("a", 0, 0, 1),
            Token::with_offsets("b", 0, 0, 1).with_token_type(TokenType::Synonym),
            Token::with_offsets("c", 1, 2, 3),
            Token::with_offsets("d", 1, 2, 3).with_token_type(TokenType::Synonym),
            Token::with_offsets("e", 1, 2, 3).with_token_type(TokenType::Synonym),
        ];
        let seq = Sequence::from_analyzed("a c", tokens);
        assert_eq!(seq.permutation_count(), 6);
        assert_eq!(seq.permutations().count(), 6);
    }

    #[test]
    fn test_permutations_not_restartable() {
        let seq = Sequence::from_string("one two");
        let mut perms = seq.permutations();
        assert!(perms.next().is_some());
        assert!(perms.next().is_none());
        assert!(perms.next().is_none());
    }

    #[test]
    fn test_empty_sequence_yields_single_empty_permutation() {
        let seq = Sequence::from_string("");
        let perms: Vec<_> = seq.permutations().collect();
        assert_eq!(perms.len(), 1);
        assert!(perms[0].is_empty());
    }

    #[test]
    fn test_rebase() {
        let mut seq = Sequence::from_string("100 Main St");
        seq.rebase(4, 1);
        let tokens = seq.permutations().next().unwrap();
        assert_eq!(tokens[1].position, 0);
        assert_eq!(tokens[1].start_offset, 0);
    }
}
