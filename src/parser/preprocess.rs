//! Input-line preprocessing for the structural parser.
//!
//! Builds the ordered, de-duplicated set of line variants a parse attempt
//! runs over, and isolates PO-box references before grammar matching.

use lazy_static::lazy_static;
use regex::Regex;

use crate::address::Address;
use crate::analysis::normalizer::normalize;
use crate::config::words::WordTables;

lazy_static! {
    /// PO-box reference: a marker (`post office`, `p.o.`, `postal box`, or a
    /// bare `box`) followed by digits.
    static ref PO_BOX: Regex =
        Regex::new(r"(?i)\b(?:(?:post\s*office|p\.?\s*o\.?|postal)\s*(?:box)?|box)\s*[#:]?\s*(\d+)\b")
            .unwrap();

    /// US-style zip, optionally with a +4 extension.
    static ref ZIP_US: Regex = Regex::new(r"\b\d{5}(?:-\d{4})?\b").unwrap();

    /// GB-style postcode.
    static ref ZIP_GB: Regex =
        Regex::new(r"(?i)\b[A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2}\b").unwrap();
}

/// Builds parse-input variants for one address.
pub struct Preprocessor<'a> {
    words: &'a WordTables,
    suffix_slice: bool,
}

impl<'a> Preprocessor<'a> {
    /// Create a preprocessor over the given word tables. `suffix_slice`
    /// enables the locale-specific variant that cuts the line right after the
    /// last recognized street-suffix token.
    pub fn new(words: &'a WordTables, suffix_slice: bool) -> Self {
        Preprocessor {
            words,
            suffix_slice,
        }
    }

    /// The ordered, de-duplicated input-line variants for an address:
    /// address1 alone; address2 alone; their concatenation; address1 with
    /// known city/province/country words stripped; the same further stripped
    /// of a recognized zip; and optionally address1 sliced after the last
    /// street-suffix token (with a following directional kept).
    pub fn line_variants(&self, address: &Address) -> Vec<String> {
        let mut variants: Vec<String> = Vec::new();
        let mut push = |variant: String| {
            let trimmed = variant.trim().to_string();
            if !trimmed.is_empty() && !variants.contains(&trimmed) {
                variants.push(trimmed);
            }
        };

        let address1 = address.address1();
        let address2 = address.address2();

        if let Some(line) = address1 {
            push(line.to_string());
        }
        if let Some(line) = address2 {
            push(line.to_string());
        }
        if let (Some(a1), Some(a2)) = (address1, address2) {
            push(format!("{a1} {a2}"));
        }
        if let Some(line) = address1 {
            let stripped = self.strip_known_words(line, address);
            push(stripped.clone());
            push(strip_zip(&stripped));
            if self.suffix_slice {
                if let Some(sliced) = self.slice_after_street_suffix(line) {
                    push(sliced);
                }
            }
        }

        variants
    }

    /// Remove words matching the address's own city/province/country values
    /// or a known country name.
    fn strip_known_words(&self, line: &str, address: &Address) -> String {
        let mut known: Vec<String> = Vec::new();
        for value in [
            address.city(),
            address.province_code(),
            address.country_code(),
        ]
        .into_iter()
        .flatten()
        {
            for word in value.split_whitespace() {
                known.push(normalize(word));
            }
        }
        known.extend(self.words.country_names().iter().map(|n| normalize(n)));

        line.split_whitespace()
            .filter(|word| !known.contains(&normalize(word)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Cut the line immediately after the last recognized street-suffix
    /// token, keeping a directional that follows it.
    fn slice_after_street_suffix(&self, line: &str) -> Option<String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let last_suffix = tokens
            .iter()
            .rposition(|t| self.words.is_street_suffix(&normalize(t)))?;

        let mut end = last_suffix;
        if let Some(next) = tokens.get(last_suffix + 1) {
            if self.words.is_directional(&normalize(next)) {
                end += 1;
            }
        }
        if end + 1 == tokens.len() {
            return None;
        }
        Some(tokens[..=end].join(" "))
    }
}

/// Isolate a PO-box reference. Returns the box number, if any, and the line
/// with the matched span removed.
pub fn isolate_po_box(line: &str) -> (Option<String>, String) {
    match PO_BOX.captures(line) {
        Some(caps) => {
            let number = caps.get(1).map(|m| m.as_str().to_string());
            let full = caps.get(0).unwrap();
            let mut remainder = String::with_capacity(line.len());
            remainder.push_str(&line[..full.start()]);
            remainder.push(' ');
            remainder.push_str(&line[full.end()..]);
            (number, remainder.split_whitespace().collect::<Vec<_>>().join(" "))
        }
        None => (None, line.trim().to_string()),
    }
}

/// Remove the first recognized zip/postcode from the line.
pub fn strip_zip(line: &str) -> String {
    for pattern in [&*ZIP_US, &*ZIP_GB] {
        if let Some(m) = pattern.find(line) {
            let mut out = String::with_capacity(line.len());
            out.push_str(&line[..m.start()]);
            out.push(' ');
            out.push_str(&line[m.end()..]);
            return out.split_whitespace().collect::<Vec<_>>().join(" ");
        }
    }
    line.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preprocessor(words: &WordTables, suffix_slice: bool) -> Preprocessor<'_> {
        Preprocessor::new(words, suffix_slice)
    }

    #[test]
    fn test_po_box_isolation() {
        let (po_box, rest) = isolate_po_box("Rue de la Senne 32 box 20");
        assert_eq!(po_box.as_deref(), Some("20"));
        assert_eq!(rest, "Rue de la Senne 32");

        let (po_box, rest) = isolate_po_box("P.O. Box 123");
        assert_eq!(po_box.as_deref(), Some("123"));
        assert_eq!(rest, "");

        let (po_box, rest) = isolate_po_box("Post Office Box 7, Springfield");
        assert_eq!(po_box.as_deref(), Some("7"));
        assert_eq!(rest, ", Springfield");

        let (po_box, rest) = isolate_po_box("100 Main St");
        assert_eq!(po_box, None);
        assert_eq!(rest, "100 Main St");
    }

    #[test]
    fn test_strip_zip() {
        assert_eq!(strip_zip("100 Main St 94105"), "100 Main St");
        assert_eq!(strip_zip("100 Main St 94105-1234"), "100 Main St");
        assert_eq!(strip_zip("2 Elm Avenue B12 8QX"), "2 Elm Avenue");
        assert_eq!(strip_zip("100 Main St"), "100 Main St");
    }

    #[test]
    fn test_line_variants_order_and_dedup() {
        let words = WordTables::english();
        let address = Address::new()
            .with_address1("100 Main St")
            .with_address2("Rear Unit")
            .with_city("Springfield");

        let variants = preprocessor(&words, false).line_variants(&address);
        assert_eq!(
            variants,
            vec![
                "100 Main St".to_string(),
                "Rear Unit".to_string(),
                "100 Main St Rear Unit".to_string(),
            ]
        );
    }

    #[test]
    fn test_line_variants_strip_city_and_zip() {
        let words = WordTables::english();
        let address = Address::new()
            .with_address1("100 Main St Springfield 94105")
            .with_city("Springfield");

        let variants = preprocessor(&words, false).line_variants(&address);
        assert!(variants.contains(&"100 Main St Springfield 94105".to_string()));
        assert!(variants.contains(&"100 Main St 94105".to_string()));
        assert!(variants.contains(&"100 Main St".to_string()));
    }

    #[test]
    fn test_suffix_slice_variant() {
        let words = WordTables::english();
        let address = Address::new().with_address1("100 Main St Apt 4");

        let variants = preprocessor(&words, true).line_variants(&address);
        assert!(variants.contains(&"100 Main St".to_string()));

        // A directional right after the suffix stays attached.
        let address = Address::new().with_address1("100 Main St W Apt 4");
        let variants = preprocessor(&words, true).line_variants(&address);
        assert!(variants.contains(&"100 Main St W".to_string()));
    }

    #[test]
    fn test_suffix_slice_noop_when_suffix_is_last() {
        let words = WordTables::english();
        let address = Address::new().with_address1("100 Main St");
        let variants = preprocessor(&words, true).line_variants(&address);
        assert_eq!(variants, vec!["100 Main St".to_string()]);
    }
}
