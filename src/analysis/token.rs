//! Token types for address text analysis.
//!
//! A [`Token`] is the fundamental unit that flows out of tokenization and
//! through comparison. It carries the normalized text, byte offsets against
//! the *original* (pre-normalization) source string, a stream position, and a
//! `position_length` so multi-word synonym branches can span several
//! positions.
//!
//! # Examples
//!
//! ```
//! use postalign::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("main", 1, 4, 8);
//! assert_eq!(token.text, "main");
//! assert_eq!(token.start_offset, 4);
//! assert_eq!(token.end_offset, 8);
//! assert_eq!(token.token_type, TokenType::Alphanum);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token type classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// The token parses entirely as a number.
    Num,
    /// Any other word token.
    Alphanum,
    /// A token injected by synonym expansion rather than found in the text.
    Synonym,
}

/// A single analyzed token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// The normalized text content of the token.
    pub text: String,

    /// The position of the token in the token stream (0-based).
    pub position: usize,

    /// Byte offset where this token starts in the original text.
    pub start_offset: usize,

    /// Byte offset where this token ends in the original text.
    pub end_offset: usize,

    /// How many positions this token spans (default 1). A multi-word synonym
    /// replaced by a single token spans the positions of the words it covers.
    pub position_length: usize,

    /// Content classification.
    pub token_type: TokenType,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        let text = text.into();
        let token_type = classify(&text);
        Token {
            text,
            position,
            start_offset: 0,
            end_offset: 0,
            position_length: 1,
            token_type,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        let text = text.into();
        let token_type = classify(&text);
        Token {
            text,
            position,
            start_offset,
            end_offset,
            position_length: 1,
            token_type,
        }
    }

    /// Set the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    /// Set the position length.
    pub fn with_position_length(mut self, length: usize) -> Self {
        self.position_length = length;
        self
    }

    /// Character length of the token text.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Re-anchor this token against a sub-slice of the original text that
    /// starts `base_offset` bytes and `base_position` positions in. Used when
    /// a sub-sequence is cut out of a longer line and compared on its own.
    pub fn rebase(&mut self, base_offset: usize, base_position: usize) {
        self.start_offset = self.start_offset.saturating_sub(base_offset);
        self.end_offset = self.end_offset.saturating_sub(base_offset);
        self.position = self.position.saturating_sub(base_position);
    }

    /// Stable identity for memo-cache keys and one-to-one pairing: two tokens
    /// are the same slot occupant iff value, offsets and position all agree.
    pub fn identity(&self) -> TokenIdentity {
        TokenIdentity {
            text: self.text.clone(),
            start_offset: self.start_offset,
            end_offset: self.end_offset,
            position: self.position,
        }
    }
}

/// Value+offset+position identity of a token.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TokenIdentity {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub position: usize,
}

/// NUM if the text parses entirely as a number, otherwise ALPHANUM.
fn classify(text: &str) -> TokenType {
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        TokenType::Num
    } else {
        TokenType::Alphanum
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
