//! The structural address parser.
//!
//! [`AddressParser::parse`] turns an address's free-text street lines into
//! zero or more [`Interpretation`]s. Unparseable input is a valid outcome:
//! the parser returns an empty list and never errors for it; the only error
//! path is a missing or unsupported country code, which is a configuration
//! failure. Ambiguity is preserved deliberately, since disambiguation belongs
//! to candidate ranking, not to the parser.

use std::sync::Arc;

use tracing::debug;

use crate::address::Address;
use crate::analysis::normalizer::normalize;
use crate::config::{CountryRegistry, CountryRules};
use crate::error::Result;
use crate::parser::grammar::{GrammarCaptures, GrammarFormat};
use crate::parser::interpretation::Interpretation;
use crate::parser::preprocess::{Preprocessor, isolate_po_box};

/// Grammar-driven structural parser over a country registry.
pub struct AddressParser {
    registry: Arc<CountryRegistry>,
}

impl AddressParser {
    /// Create a parser over the given registry.
    pub fn new(registry: Arc<CountryRegistry>) -> Self {
        AddressParser { registry }
    }

    /// Parse an address's street lines into structured interpretations.
    ///
    /// Returns `Ok(vec![])` when nothing parses; errs only on configuration
    /// problems (missing/unknown country code).
    pub fn parse(&self, address: &Address) -> Result<Vec<Interpretation>> {
        let rules = self.registry.get(address.country_code())?;

        let mut interpretations = if rules.options.split_locality {
            self.parse_with_locality_split(address, rules)
        } else {
            self.parse_flat(address, rules)
        };

        dedup_in_place(&mut interpretations);
        debug!(
            country = rules.code,
            count = interpretations.len(),
            "address parsed"
        );
        Ok(interpretations)
    }

    /// Parse each preprocessed line variant against the country's formats.
    fn parse_flat(&self, address: &Address, rules: &CountryRules) -> Vec<Interpretation> {
        let preprocessor = Preprocessor::new(&rules.words, rules.options.suffix_slice_variant);
        let mut out = Vec::new();

        for variant in preprocessor.line_variants(address) {
            let (po_box, remainder) = isolate_po_box(&variant);
            let mut matched = false;

            if !remainder.is_empty() {
                for format in rules.grammar.formats() {
                    let Some(caps) = format.captures(&remainder) else {
                        continue;
                    };
                    if let Some(mut interpretation) =
                        self.build_interpretation(format, &caps, address, rules)
                    {
                        interpretation.po_box = po_box.clone();
                        matched = true;
                        out.push(interpretation);
                    }
                }
            }

            // A PO box with no parseable street part still names a
            // deliverable point.
            if let Some(number) = po_box {
                if !matched {
                    out.push(Interpretation::po_box_only(number));
                }
            }
        }

        out
    }

    /// GB-style parse: try every split of the line list into a street part
    /// and a locality part, re-parse the street part, and assign the
    /// locality lines to up to two hierarchy levels under the post town.
    fn parse_with_locality_split(
        &self,
        address: &Address,
        rules: &CountryRules,
    ) -> Vec<Interpretation> {
        let raw_lines = address.street_lines();
        if raw_lines.is_empty() {
            return Vec::new();
        }

        let mut po_box = None;
        let mut lines: Vec<String> = Vec::with_capacity(raw_lines.len());
        for line in raw_lines {
            let (found, remainder) = isolate_po_box(line);
            if found.is_some() {
                po_box = found;
            }
            if !remainder.is_empty() {
                lines.push(remainder);
            }
        }
        if lines.is_empty() {
            return match po_box {
                Some(number) => vec![Interpretation::po_box_only(number)],
                None => Vec::new(),
            };
        }

        let mut out = Vec::new();
        for split in 1..=lines.len() {
            let (street_part, locality_part) = lines.split_at(split);
            if street_part.len() > 2 || locality_part.len() > 2 {
                continue;
            }

            for format in rules.grammar.formats() {
                let Some(caps) = format.captures(&street_part[0]) else {
                    continue;
                };
                let Some(mut interpretation) =
                    self.build_interpretation(format, &caps, address, rules)
                else {
                    continue;
                };

                // A second street line demotes the first line's street to a
                // dependent street.
                if street_part.len() == 2 {
                    interpretation.dependent_street = interpretation.street.take();
                    interpretation.street = Some(clean_capture(&street_part[1]));
                }

                match locality_part {
                    [] => {}
                    [dependent] => {
                        interpretation.dependent_locality = Some(clean_capture(dependent));
                    }
                    [double_dependent, dependent] => {
                        interpretation.double_dependent_locality =
                            Some(clean_capture(double_dependent));
                        interpretation.dependent_locality = Some(clean_capture(dependent));
                    }
                    _ => continue,
                }

                interpretation.post_town = address.city().map(str::to_string);
                interpretation.po_box = po_box.clone();
                out.push(interpretation);
            }
        }

        if out.is_empty() {
            if let Some(number) = po_box {
                out.push(Interpretation::po_box_only(number));
            }
        }
        out
    }

    /// Apply the plausibility filter and build an interpretation from raw
    /// captures. Returns None when the match is implausible.
    fn build_interpretation(
        &self,
        format: &GrammarFormat,
        caps: &GrammarCaptures,
        address: &Address,
        rules: &CountryRules,
    ) -> Option<Interpretation> {
        if !self.plausible(format, caps, address, rules) {
            debug!(format = format.name(), "implausible grammar match dropped");
            return None;
        }

        Some(Interpretation {
            building_num: caps.building_num.as_deref().map(clean_capture),
            street: caps.street.as_deref().map(clean_capture),
            unit_type: caps.unit_type.as_deref().map(clean_capture),
            unit_num: caps.unit_num.as_deref().map(clean_capture),
            ..Interpretation::default()
        })
    }

    /// The plausibility filter. These rules are deliberate, fixture-backed
    /// heuristics; see the parser tests for the behavior they pin down.
    fn plausible(
        &self,
        format: &GrammarFormat,
        caps: &GrammarCaptures,
        address: &Address,
        rules: &CountryRules,
    ) -> bool {
        let words = &rules.words;

        // The captured street must literally appear in one of the original
        // street lines; variants that rearranged the text cannot invent one.
        if let Some(street) = &caps.street {
            let needle = street.to_lowercase();
            let appears = address
                .street_lines()
                .iter()
                .any(|line| line.to_lowercase().contains(&needle));
            if !appears {
                return false;
            }

            let street_words: Vec<String> =
                street.split_whitespace().map(|w| normalize(w)).collect();
            // A street made of nothing but PO-box markers is a mis-split
            // box reference.
            if !street_words.is_empty()
                && street_words.iter().all(|w| words.is_po_box_marker(w))
            {
                return false;
            }
            // A unit designator as the street's final word means the unit
            // capture stole the wrong tokens.
            if let Some(last) = street_words.last() {
                if words.is_unit_designator(last) {
                    return false;
                }
            }
        }

        if let Some(building_num) = &caps.building_num {
            let normalized = normalize(building_num);
            if words.is_po_box_marker(&normalized) || words.is_street_suffix(&normalized) {
                return false;
            }
        }

        if let Some(unit_type) = &caps.unit_type {
            let normalized = normalize(unit_type);
            // An explicit unit type must be a recognized secondary-unit
            // designator; a directional or street suffix here is a stray
            // token from the street.
            if !words.is_unit_designator(&normalized) {
                return false;
            }
        }

        if let Some(unit_num) = &caps.unit_num {
            let normalized = normalize(unit_num);
            if words.is_street_suffix(&normalized) || words.is_po_box_marker(&normalized) {
                return false;
            }
            if format.has_implicit_unit() {
                // "45th" after a street is an ordinal street name, not a
                // unit; a directional is street material too.
                if words.has_ordinal_suffix(unit_num) || words.is_directional(&normalized) {
                    return false;
                }
            }
        }

        true
    }
}

/// Strip surrounding whitespace and trailing punctuation from a capture.
fn clean_capture(value: &str) -> String {
    value
        .trim()
        .trim_end_matches(['.', ',', ';', ':'])
        .trim()
        .to_string()
}

fn dedup_in_place(interpretations: &mut Vec<Interpretation>) {
    let mut seen: Vec<Interpretation> = Vec::with_capacity(interpretations.len());
    interpretations.retain(|i| {
        if seen.contains(i) {
            false
        } else {
            seen.push(i.clone());
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountryRegistry;

    fn parser() -> AddressParser {
        AddressParser::new(Arc::new(CountryRegistry::builtin().unwrap()))
    }

    fn parse(address: &Address) -> Vec<Interpretation> {
        parser().parse(address).unwrap()
    }

    #[test]
    fn test_missing_country_code_is_an_error() {
        let address = Address::new().with_address1("100 Main St");
        assert!(parser().parse(&address).is_err());
    }

    #[test]
    fn test_unparseable_input_is_empty_not_error() {
        let address = Address::new().with_country_code("US");
        assert_eq!(parse(&address), Vec::new());

        let address = Address::new()
            .with_country_code("US")
            .with_address1("???");
        assert_eq!(parse(&address), Vec::new());
    }

    #[test]
    fn test_north_america_plain() {
        let address = Address::new()
            .with_country_code("US")
            .with_address1("100 Main St");
        let interpretations = parse(&address);
        assert!(interpretations.iter().any(|i| {
            i.building_num.as_deref() == Some("100")
                && i.street.as_deref() == Some("Main St")
                && i.unit_num.is_none()
        }));
    }

    #[test]
    fn test_north_america_slash_unit() {
        let address = Address::new()
            .with_country_code("US")
            .with_address1("5/100 Main St");
        let interpretations = parse(&address);
        assert!(interpretations.iter().any(|i| {
            i.unit_num.as_deref() == Some("5")
                && i.building_num.as_deref() == Some("100")
                && i.street.as_deref() == Some("Main St")
        }));
    }

    #[test]
    fn test_county_road_ambiguity_is_preserved() {
        let address = Address::new()
            .with_country_code("US")
            .with_address1("123 County Road 45");
        let interpretations = parse(&address);

        assert!(interpretations.iter().any(|i| {
            i.building_num.as_deref() == Some("123")
                && i.street.as_deref() == Some("County Road")
                && i.unit_num.as_deref() == Some("45")
        }));
        assert!(interpretations.iter().any(|i| {
            i.building_num.as_deref() == Some("123")
                && i.street.as_deref() == Some("County Road 45")
                && i.unit_num.is_none()
        }));
    }

    #[test]
    fn test_ordinal_street_is_not_a_unit() {
        let address = Address::new()
            .with_country_code("US")
            .with_address1("100 East 45th");
        let interpretations = parse(&address);
        assert!(
            !interpretations
                .iter()
                .any(|i| i.unit_num.as_deref() == Some("45th"))
        );
        assert!(
            interpretations
                .iter()
                .any(|i| i.street.as_deref() == Some("East 45th"))
        );
    }

    #[test]
    fn test_designated_unit() {
        let address = Address::new()
            .with_country_code("US")
            .with_address1("100 Main St Apt 4B");
        let interpretations = parse(&address);
        assert!(interpretations.iter().any(|i| {
            i.street.as_deref() == Some("Main St")
                && i.unit_type.as_deref() == Some("Apt")
                && i.unit_num.as_deref() == Some("4B")
        }));
        // The bare-unit reading would leave "Apt" dangling at the end of the
        // street; the filter drops it.
        assert!(
            !interpretations
                .iter()
                .any(|i| i.street.as_deref() == Some("Main St Apt"))
        );
    }

    #[test]
    fn test_unrecognized_designator_rejected() {
        let address = Address::new()
            .with_country_code("US")
            .with_address1("123 County Road 45");
        let interpretations = parse(&address);
        // "Road" must never be consumed as a unit type.
        assert!(
            !interpretations
                .iter()
                .any(|i| i.unit_type.as_deref() == Some("Road"))
        );
    }

    #[test]
    fn test_po_box_isolation_with_street() {
        let address = Address::new()
            .with_country_code("BE")
            .with_address1("Rue de la Senne 32 box 20");
        let interpretations = parse(&address);
        assert!(interpretations.iter().any(|i| {
            i.street.as_deref() == Some("Rue de la Senne")
                && i.building_num.as_deref() == Some("32")
                && i.po_box.as_deref() == Some("20")
        }));
    }

    #[test]
    fn test_po_box_only() {
        let address = Address::new()
            .with_country_code("US")
            .with_address1("P.O. Box 123");
        let interpretations = parse(&address);
        assert_eq!(interpretations, vec![Interpretation::po_box_only("123")]);
    }

    #[test]
    fn test_gb_locality_split() {
        let address = Address::new()
            .with_country_code("GB")
            .with_address1("2 Elm Avenue")
            .with_address2("Runcorn Road")
            .with_city("Birmingham");
        let interpretations = parse(&address);

        assert!(interpretations.iter().any(|i| {
            i.building_num.as_deref() == Some("2")
                && i.street.as_deref() == Some("Elm Avenue")
                && i.dependent_street.is_none()
                && i.dependent_locality.as_deref() == Some("Runcorn Road")
        }));
        assert!(interpretations.iter().any(|i| {
            i.building_num.as_deref() == Some("2")
                && i.dependent_street.as_deref() == Some("Elm Avenue")
                && i.street.as_deref() == Some("Runcorn Road")
                && i.dependent_locality.is_none()
        }));
    }

    #[test]
    fn test_gb_single_line() {
        let address = Address::new()
            .with_country_code("GB")
            .with_address1("2 Elm Avenue")
            .with_city("Birmingham");
        let interpretations = parse(&address);
        assert!(interpretations.iter().any(|i| {
            i.building_num.as_deref() == Some("2")
                && i.street.as_deref() == Some("Elm Avenue")
                && i.post_town.as_deref() == Some("Birmingham")
        }));
    }

    #[test]
    fn test_interpretations_are_deduplicated() {
        let address = Address::new()
            .with_country_code("US")
            .with_address1("100 Main St")
            .with_address2("100 Main St");
        let interpretations = parse(&address);
        let plain: Vec<_> = interpretations
            .iter()
            .filter(|i| i.street.as_deref() == Some("Main St") && i.unit_num.is_none())
            .collect();
        assert_eq!(plain.len(), 1);
    }
}
