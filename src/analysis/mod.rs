//! Text analysis module for Postalign.
//!
//! Normalization, tokenization, and sequence building: raw address text goes
//! in, [`sequence::Sequence`]s with comparable offsets come out.

pub mod normalizer;
pub mod sequence;
pub mod token;

// Re-export commonly used types
pub use normalizer::normalize;
pub use sequence::{Permutations, Sequence, SequenceEntry, SynonymGroup};
pub use token::{Token, TokenIdentity, TokenType};
