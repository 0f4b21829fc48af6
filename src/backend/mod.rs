//! Retrieval backend abstraction.
//!
//! A [`SearchBackend`] hides the full-text engine that stores the reference
//! address records. It does three things for the selector: runs text through
//! a named analyzer (synonym expansion happens there), retrieves candidate
//! records for a query, and returns the stored per-field term vectors of
//! candidate documents. Methods take owned parameters and return boxed
//! futures so the trait stays object-safe behind an `Arc<dyn SearchBackend>`.

use std::collections::HashMap;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::analysis::sequence::Sequence;
use crate::analysis::token::{Token, TokenType};
use crate::error::Result;

/// Token type tag backends use to mark synonym-injected tokens.
pub const SYNONYM_TOKEN_TYPE: &str = "SYNONYM";

/// One token from a backend analyzer, in wire form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedToken {
    pub token: String,
    pub position: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    /// How many positions the token spans; backends routinely omit it for
    /// single-position tokens.
    #[serde(default = "default_position_length")]
    pub position_length: usize,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

fn default_position_length() -> usize {
    1
}

impl AnalyzedToken {
    /// Convert into an analysis [`Token`], carrying over offsets, span and
    /// the synonym marker.
    pub fn into_token(self) -> Token {
        let synonym = self.token_type.as_deref() == Some(SYNONYM_TOKEN_TYPE);
        let token =
            Token::with_offsets(self.token, self.position, self.start_offset, self.end_offset)
                .with_position_length(self.position_length.max(1));
        if synonym {
            token.with_token_type(TokenType::Synonym)
        } else {
            token
        }
    }
}

/// Build a [`Sequence`] from a backend token stream over its source text.
pub fn sequence_from_analyzed(source: &str, tokens: Vec<AnalyzedToken>) -> Sequence {
    Sequence::from_analyzed(
        source,
        tokens.into_iter().map(AnalyzedToken::into_token).collect(),
    )
}

/// Query for candidate reference records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuery {
    pub country_code: String,
    /// Field name to query text.
    pub fields: HashMap<String, String>,
    pub limit: usize,
}

/// One stored reference record returned by candidate retrieval, in backend
/// relevance order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub fields: HashMap<String, String>,
}

/// Stored per-field analyzed token streams for one document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TermVectorDoc {
    pub id: String,
    pub fields: HashMap<String, Vec<AnalyzedToken>>,
}

/// The retrieval side of candidate selection.
pub trait SearchBackend: Send + Sync {
    /// Run `text` through the named analyzer.
    fn analyze(&self, analyzer: String, text: String) -> BoxFuture<'_, Result<Vec<AnalyzedToken>>>;

    /// Retrieve candidate records for a query. An empty result is a valid
    /// answer, not an error.
    fn search(&self, query: CandidateQuery) -> BoxFuture<'_, Result<Vec<CandidateRecord>>>;

    /// Stored term vectors for the given documents, restricted to `fields`.
    fn term_vectors(
        &self,
        ids: Vec<String>,
        fields: Vec<String>,
    ) -> BoxFuture<'_, Result<Vec<TermVectorDoc>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_length_defaults_on_the_wire() {
        let json = r#"{"token":"main","position":0,"start_offset":0,"end_offset":4}"#;
        let analyzed: AnalyzedToken = serde_json::from_str(json).unwrap();
        assert_eq!(analyzed.position_length, 1);
        assert_eq!(analyzed.token_type, None);
    }

    #[test]
    fn test_synonym_tag_carries_over() {
        let json = r#"{"token":"st","position":1,"start_offset":5,"end_offset":11,"position_length":1,"type":"SYNONYM"}"#;
        let analyzed: AnalyzedToken = serde_json::from_str(json).unwrap();
        let token = analyzed.into_token();
        assert_eq!(token.token_type, TokenType::Synonym);
        assert_eq!(token.start_offset, 5);
        assert_eq!(token.end_offset, 11);
    }

    #[test]
    fn test_zero_position_length_clamped() {
        let analyzed = AnalyzedToken {
            token: "main".to_string(),
            position: 0,
            start_offset: 0,
            end_offset: 4,
            position_length: 0,
            token_type: None,
        };
        assert_eq!(analyzed.into_token().position_length, 1);
    }

    #[test]
    fn test_sequence_from_analyzed_groups_synonyms() {
        let tokens = vec![
            AnalyzedToken {
                token: "saint".to_string(),
                position: 0,
                start_offset: 0,
                end_offset: 5,
                position_length: 1,
                token_type: None,
            },
            AnalyzedToken {
                token: "st".to_string(),
                position: 0,
                start_offset: 0,
                end_offset: 5,
                position_length: 1,
                token_type: Some(SYNONYM_TOKEN_TYPE.to_string()),
            },
            AnalyzedToken {
                token: "johns".to_string(),
                position: 1,
                start_offset: 6,
                end_offset: 11,
                position_length: 1,
                token_type: None,
            },
        ];
        let sequence = sequence_from_analyzed("Saint Johns", tokens);
        assert_eq!(sequence.permutation_count(), 2);
    }
}
