//! Country grammar formats for structural address parsing.
//!
//! A grammar is data, not code: an ordered list of precompiled regex
//! templates with named captures, composed from shared fragments
//! (building-number, street, unit-type, unit-number). Country variation is a
//! different format list, not a different code path. All formats are compiled
//! once when the country registry is built and shared read-only afterwards.

use regex::Regex;

use crate::error::{PostalignError, Result};

/// Shared capture fragments. `street` comes in a lazy and a greedy flavor so
/// a format can either leave room for trailing unit captures or swallow the
/// rest of the line.
const BUILDING_NUM: &str = r"(?P<building_num>\d+[a-z]?)";
const STREET: &str = r"(?P<street>\S.*?)";
const STREET_GREEDY: &str = r"(?P<street>\S.*)";
const UNIT_TYPE: &str = r"(?P<unit_type>[a-z]+)\.?";
const UNIT_NUM: &str = r"(?P<unit_num>[a-z]?\d+[a-z]?)";
const UNIT_NUM_BARE: &str = r"(?P<unit_num>\d+[a-z]{0,2})";

/// One compiled grammar format.
#[derive(Debug, Clone)]
pub struct GrammarFormat {
    name: &'static str,
    regex: Regex,
    /// Whether the unit capture arrived without an explicit designator
    /// (hash/dash/slash/bare forms), which makes the plausibility heuristics
    /// stricter.
    implicit_unit: bool,
}

/// Raw captures pulled from one format match, before plausibility filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrammarCaptures {
    pub building_num: Option<String>,
    pub street: Option<String>,
    pub unit_type: Option<String>,
    pub unit_num: Option<String>,
}

impl GrammarFormat {
    fn compile(name: &'static str, template: &str, implicit_unit: bool) -> Result<Self> {
        let pattern = format!(r"(?i)^\s*{template}\s*$");
        let regex = Regex::new(&pattern).map_err(|e| {
            PostalignError::config(format!("grammar format {name} failed to compile: {e}"))
        })?;
        Ok(GrammarFormat {
            name,
            regex,
            implicit_unit,
        })
    }

    /// The format's name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the unit capture lacks an explicit designator.
    pub fn has_implicit_unit(&self) -> bool {
        self.implicit_unit
    }

    /// Try this format against a line.
    pub fn captures(&self, line: &str) -> Option<GrammarCaptures> {
        let caps = self.regex.captures(line)?;
        let get = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Some(GrammarCaptures {
            building_num: get("building_num"),
            street: get("street"),
            unit_type: get("unit_type"),
            unit_num: get("unit_num"),
        })
    }
}

/// An ordered list of grammar formats for one country.
#[derive(Debug, Clone)]
pub struct GrammarSet {
    formats: Vec<GrammarFormat>,
}

impl GrammarSet {
    /// The ordered formats.
    pub fn formats(&self) -> &[GrammarFormat] {
        &self.formats
    }

    /// The North-America set: seven variants composed from the two base
    /// templates (building+street and building+street+unit), adding
    /// unit-after-hash, unit-after-dash, leading-unit, trailing-bare-unit and
    /// slash-unit forms.
    pub fn north_america() -> Result<Self> {
        let formats = vec![
            GrammarFormat::compile(
                "unit_dash",
                &format!(r"{UNIT_NUM}\s*-\s*{BUILDING_NUM}\s+{STREET_GREEDY}"),
                true,
            )?,
            GrammarFormat::compile(
                "unit_slash",
                &format!(r"{UNIT_NUM}\s*/\s*{BUILDING_NUM}\s+{STREET_GREEDY}"),
                true,
            )?,
            GrammarFormat::compile(
                "leading_unit",
                &format!(r"{UNIT_TYPE}\s*{UNIT_NUM}\s+{BUILDING_NUM}\s+{STREET_GREEDY}"),
                false,
            )?,
            GrammarFormat::compile(
                "designated_unit",
                &format!(r"{BUILDING_NUM}\s+{STREET}[\s,]+{UNIT_TYPE}\s*{UNIT_NUM}"),
                false,
            )?,
            GrammarFormat::compile(
                "unit_hash",
                &format!(r"{BUILDING_NUM}\s+{STREET}\s*#\s*{UNIT_NUM}"),
                true,
            )?,
            GrammarFormat::compile(
                "bare_unit",
                &format!(r"{BUILDING_NUM}\s+{STREET}\s+{UNIT_NUM_BARE}"),
                true,
            )?,
            GrammarFormat::compile(
                "building_street",
                &format!(r"{BUILDING_NUM}\s+{STREET_GREEDY}"),
                false,
            )?,
        ];
        Ok(GrammarSet { formats })
    }

    /// The Oceania set: a single permissive `unit/building street` form with
    /// an optional unit.
    pub fn oceania() -> Result<Self> {
        let formats = vec![GrammarFormat::compile(
            "oceania",
            &format!(r"(?:{UNIT_NUM}\s*/\s*)?{BUILDING_NUM}\s+{STREET_GREEDY}"),
            true,
        )?];
        Ok(GrammarSet { formats })
    }

    /// Street-before-number lines ("Rue de la Senne 32"), with the
    /// number-first base as a fallback.
    pub fn street_first() -> Result<Self> {
        let formats = vec![
            GrammarFormat::compile(
                "street_building",
                &format!(r"{STREET}[\s,]+{BUILDING_NUM}"),
                false,
            )?,
            GrammarFormat::compile(
                "building_street",
                &format!(r"{BUILDING_NUM}\s+{STREET_GREEDY}"),
                false,
            )?,
        ];
        Ok(GrammarSet { formats })
    }

    /// The GB set: the number-first base forms; locality splitting is layered
    /// on top by the parser.
    pub fn great_britain() -> Result<Self> {
        let formats = vec![
            GrammarFormat::compile(
                "designated_unit",
                &format!(r"{BUILDING_NUM}\s+{STREET}[\s,]+{UNIT_TYPE}\s*{UNIT_NUM}"),
                false,
            )?,
            GrammarFormat::compile(
                "building_street",
                &format!(r"{BUILDING_NUM}\s+{STREET_GREEDY}"),
                false,
            )?,
            GrammarFormat::compile("street_only", STREET_GREEDY, false)?,
        ];
        Ok(GrammarSet { formats })
    }
}
