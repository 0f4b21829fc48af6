//! Deterministic text folding for address comparison.
//!
//! [`normalize`] collapses the cosmetic variation that postal data is full of
//! (diacritics, ligatures, case, stray punctuation) so that token values can
//! be compared literally. The fold is pure and idempotent:
//! `normalize(normalize(s)) == normalize(s)` for every input.
//!
//! # Examples
//!
//! ```
//! use postalign::analysis::normalizer::normalize;
//!
//! assert_eq!(normalize("Œuvre-Straße  12,"), "oeuvre-strasse 12");
//! assert_eq!(normalize("CAFÉ"), "cafe");
//! ```

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Punctuation stripped outright during folding. Hyphens, slashes and `#`
/// survive because address grammars assign meaning to them.
const STRIPPED_PUNCTUATION: &[char] = &['.', ',', ';', ':', '\'', '"', '!', '?', '(', ')', '[', ']'];

/// Normalize a piece of address text for comparison.
///
/// Applied folds, in order: ligature expansion, script-specific letter
/// canonicalization (Arabic letter forms), NFD decomposition with combining
/// marks dropped, transliteration of letters NFD leaves intact (ø, đ, ß, ...),
/// lowercasing, punctuation stripping, and whitespace collapsing.
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());

    for c in text.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match fold_char(c) {
            CharFold::Keep(c) => {
                for lower in c.to_lowercase() {
                    folded.push(lower);
                }
            }
            CharFold::Expand(s) => folded.push_str(s),
            CharFold::Drop => {}
        }
    }

    // Collapse runs of whitespace and trim the edges in one pass.
    let mut out = String::with_capacity(folded.len());
    for word in folded.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

enum CharFold {
    Keep(char),
    Expand(&'static str),
    Drop,
}

/// Table-driven per-character fold: ligatures, Arabic letter-form
/// canonicalization, and transliterations of letters that survive NFD.
fn fold_char(c: char) -> CharFold {
    let expanded = match c {
        // Latin ligatures.
        'Æ' | 'æ' => "ae",
        'Œ' | 'œ' => "oe",
        'ß' | 'ẞ' => "ss",
        'Ĳ' | 'ĳ' => "ij",
        'ﬀ' => "ff",
        'ﬁ' => "fi",
        'ﬂ' => "fl",
        'ﬃ' => "ffi",
        'ﬄ' => "ffl",
        'ﬅ' | 'ﬆ' => "st",
        // Letters NFD does not decompose.
        'Ø' | 'ø' => "o",
        'Đ' | 'đ' | 'Ð' | 'ð' => "d",
        'Ł' | 'ł' => "l",
        'Þ' | 'þ' => "th",
        'Ħ' | 'ħ' => "h",
        // Arabic letter-form canonicalization: alef variants, Farsi/Urdu
        // shapes of kaf and yeh, final yeh.
        'أ' | 'إ' | 'آ' | 'ٱ' => "ا",
        'ک' => "ك",
        'ی' | 'ى' => "ي",
        'ة' => "ه",
        _ => {
            if STRIPPED_PUNCTUATION.contains(&c) {
                return CharFold::Drop;
            }
            return CharFold::Keep(c);
        }
    };
    CharFold::Expand(expanded)
}
