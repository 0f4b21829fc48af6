//! Token- and sequence-level similarity comparison.
//!
//! The pairwise [`token::TokenComparator`] classifies how two token values
//! relate and measures their edit distance; the
//! [`sequence::SequenceComparator`] aligns whole sequences across synonym
//! permutations and ranks the alignments under a six-criterion total order.

pub mod levenshtein;
pub mod sequence;
pub mod token;

// Re-export commonly used types
pub use levenshtein::{levenshtein_distance, levenshtein_distance_threshold};
pub use sequence::{POTENTIAL_MATCH_THRESHOLD, SequenceComparator, SequenceComparison};
pub use token::{Qualifier, TokenComparator, TokenComparison};
