//! Known-word tables for address parsing.
//!
//! Street suffixes, secondary-unit designators, directionals, PO-box markers
//! and ordinal suffixes, consulted by the preprocessor and the plausibility
//! filter. Built once per country rule set and treated as immutable.

use ahash::AHashSet;

/// Known-word tables for one locale.
#[derive(Debug, Clone)]
pub struct WordTables {
    street_suffixes: AHashSet<&'static str>,
    unit_designators: AHashSet<&'static str>,
    directionals: AHashSet<&'static str>,
    po_box_markers: AHashSet<&'static str>,
    ordinal_suffixes: &'static [&'static str],
    country_names: &'static [&'static str],
}

impl WordTables {
    /// The builtin English-locale tables used by every builtin country rule
    /// set. All entries are stored normalized (lowercase, no punctuation).
    pub fn english() -> Self {
        WordTables {
            street_suffixes: [
                "st", "street", "ave", "avenue", "blvd", "boulevard", "rd", "road", "dr", "drive",
                "ln", "lane", "ct", "court", "pl", "place", "ter", "terrace", "way", "hwy",
                "highway", "pkwy", "parkway", "cir", "circle", "sq", "square", "aly", "alley",
                "cres", "crescent", "close", "gardens", "grove", "walk",
            ]
            .into_iter()
            .collect(),
            unit_designators: [
                "apt", "apartment", "suite", "ste", "unit", "bldg", "building", "fl", "floor",
                "rm", "room", "dept", "department", "ph", "penthouse", "lot", "trlr", "trailer",
                "no", "number", "#",
            ]
            .into_iter()
            .collect(),
            directionals: [
                "n", "north", "s", "south", "e", "east", "w", "west", "ne", "northeast", "nw",
                "northwest", "se", "southeast", "sw", "southwest",
            ]
            .into_iter()
            .collect(),
            po_box_markers: ["po", "pobox", "box", "postal"].into_iter().collect(),
            ordinal_suffixes: &["st", "nd", "rd", "th"],
            country_names: &[
                "usa",
                "united states",
                "united states of america",
                "us",
                "canada",
                "united kingdom",
                "uk",
                "great britain",
                "england",
                "scotland",
                "wales",
                "australia",
                "new zealand",
                "belgium",
                "belgique",
                "france",
                "nederland",
                "netherlands",
            ],
        }
    }

    /// Check a normalized word against the street-suffix table.
    pub fn is_street_suffix(&self, word: &str) -> bool {
        self.street_suffixes.contains(word)
    }

    /// Check a normalized word against the secondary-unit designator table.
    pub fn is_unit_designator(&self, word: &str) -> bool {
        self.unit_designators.contains(word)
    }

    /// Check a normalized word against the directional table.
    pub fn is_directional(&self, word: &str) -> bool {
        self.directionals.contains(word)
    }

    /// Check a normalized word against the PO-box marker table.
    pub fn is_po_box_marker(&self, word: &str) -> bool {
        self.po_box_markers.contains(word)
    }

    /// Whether a value is a number wearing an ordinal suffix ("45th").
    pub fn has_ordinal_suffix(&self, value: &str) -> bool {
        let lower = value.to_lowercase();
        self.ordinal_suffixes.iter().any(|suffix| {
            lower
                .strip_suffix(suffix)
                .is_some_and(|stem| !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit()))
        })
    }

    /// Known country names, normalized.
    pub fn country_names(&self) -> &[&'static str] {
        self.country_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_street_suffixes() {
        let words = WordTables::english();
        assert!(words.is_street_suffix("st"));
        assert!(words.is_street_suffix("avenue"));
        assert!(!words.is_street_suffix("elm"));
    }

    #[test]
    fn test_unit_designators() {
        let words = WordTables::english();
        assert!(words.is_unit_designator("apt"));
        assert!(words.is_unit_designator("suite"));
        assert!(!words.is_unit_designator("main"));
    }

    #[test]
    fn test_ordinal_suffixes() {
        let words = WordTables::english();
        assert!(words.has_ordinal_suffix("45th"));
        assert!(words.has_ordinal_suffix("1st"));
        assert!(words.has_ordinal_suffix("2ND"));
        assert!(!words.has_ordinal_suffix("th"));
        assert!(!words.has_ordinal_suffix("45"));
        assert!(!words.has_ordinal_suffix("main"));
    }
}
