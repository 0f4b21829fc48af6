//! Structural parsing of address lines into interpretations.

pub mod engine;
pub mod grammar;
pub mod interpretation;
pub mod preprocess;

pub use engine::AddressParser;
pub use grammar::{GrammarCaptures, GrammarFormat, GrammarSet};
pub use interpretation::Interpretation;
pub use preprocess::Preprocessor;
