//! Country configuration: grammars, word tables, and comparison policies.
//!
//! Everything here is loaded once, treated as immutable for the lifetime of
//! the process, and injected by reference into the parser and selector;
//! there is no ambient singleton.

pub mod policy;
pub mod words;

use std::sync::Arc;

use ahash::AHashMap;

use crate::error::{PostalignError, Result};
use crate::parser::grammar::GrammarSet;
use policy::{FieldPolicies, UnmatchedPolicy};
use words::WordTables;

/// Parse behavior toggles that are data, not code branches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// GB-style hierarchical locality splitting of the line list.
    pub split_locality: bool,
    /// Add the input variant sliced after the last street-suffix token.
    pub suffix_slice_variant: bool,
}

/// The full rule set for one country.
#[derive(Debug, Clone)]
pub struct CountryRules {
    pub code: &'static str,
    pub grammar: GrammarSet,
    pub words: Arc<WordTables>,
    pub policies: FieldPolicies,
    pub options: ParseOptions,
}

/// Immutable registry of per-country rules, keyed by ISO country code.
#[derive(Debug, Clone)]
pub struct CountryRegistry {
    rules: AHashMap<&'static str, Arc<CountryRules>>,
}

impl CountryRegistry {
    /// Build the builtin registry: North America (US, CA), Oceania (AU, NZ),
    /// Great Britain (GB), and street-first European locales (BE, FR, NL).
    pub fn builtin() -> Result<Self> {
        let words = Arc::new(WordTables::english());
        // Street lines routinely carry extra tokens on the candidate side
        // (suite lists, care-of lines); cities do not.
        let street_lenient = FieldPolicies::new().with("street", UnmatchedPolicy::IgnoreLarger);

        let mut rules: AHashMap<&'static str, Arc<CountryRules>> = AHashMap::new();
        let mut register = |codes: &[&'static str],
                            grammar: GrammarSet,
                            policies: FieldPolicies,
                            options: ParseOptions| {
            for &code in codes {
                rules.insert(
                    code,
                    Arc::new(CountryRules {
                        code,
                        grammar: grammar.clone(),
                        words: Arc::clone(&words),
                        policies: policies.clone(),
                        options,
                    }),
                );
            }
        };

        register(
            &["US", "CA"],
            GrammarSet::north_america()?,
            street_lenient.clone(),
            ParseOptions {
                split_locality: false,
                suffix_slice_variant: true,
            },
        );
        register(
            &["AU", "NZ"],
            GrammarSet::oceania()?,
            street_lenient.clone(),
            ParseOptions::default(),
        );
        register(
            &["GB"],
            GrammarSet::great_britain()?,
            street_lenient.clone(),
            ParseOptions {
                split_locality: true,
                suffix_slice_variant: false,
            },
        );
        register(
            &["BE", "FR", "NL"],
            GrammarSet::street_first()?,
            street_lenient,
            ParseOptions::default(),
        );

        Ok(CountryRegistry { rules })
    }

    /// Look up the rules for a country code. A missing or blank code is a
    /// configuration error and fails fast: every grammar and policy selection
    /// is keyed by country, and silently defaulting would corrupt matching.
    pub fn get(&self, country_code: Option<&str>) -> Result<&CountryRules> {
        let code = country_code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| PostalignError::config("country code is required"))?;
        self.rules
            .get(code.to_uppercase().as_str())
            .map(Arc::as_ref)
            .ok_or_else(|| PostalignError::config(format!("unsupported country code: {code}")))
    }

    /// The registered country codes.
    pub fn codes(&self) -> Vec<&'static str> {
        let mut codes: Vec<_> = self.rules.keys().copied().collect();
        codes.sort_unstable();
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = CountryRegistry::builtin().unwrap();
        assert!(registry.codes().contains(&"US"));
        assert!(registry.codes().contains(&"GB"));
        assert!(registry.get(Some("us")).is_ok());
        assert!(registry.get(Some("GB")).unwrap().options.split_locality);
    }

    #[test]
    fn test_missing_country_code_fails_fast() {
        let registry = CountryRegistry::builtin().unwrap();
        assert!(matches!(
            registry.get(None),
            Err(PostalignError::Config(_))
        ));
        assert!(matches!(
            registry.get(Some("  ")),
            Err(PostalignError::Config(_))
        ));
        assert!(matches!(
            registry.get(Some("ZZ")),
            Err(PostalignError::Config(_))
        ));
    }
}
