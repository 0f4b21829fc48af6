//! # Postalign
//!
//! Postal address validation and correction: structural parsing of free-text
//! address lines plus similarity-based matching against reference records.
//!
//! ## Features
//!
//! - Country-grammar parsing of street lines into structured interpretations
//! - Unicode-aware normalization and tokenization with synonym support
//! - Token and sequence comparison with edit-distance qualifiers
//! - Six-criterion candidate ranking with per-field comparison policies
//! - Pluggable async retrieval backends

pub mod address;
pub mod analysis;
pub mod backend;
pub mod compare;
pub mod config;
pub mod error;
pub mod parser;
pub mod select;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
