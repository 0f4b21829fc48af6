//! Structured interpretations of parsed address lines.

use serde::{Deserialize, Serialize};

/// One structural parse of an address's street lines.
///
/// Every field is an explicit optional constructed only from validated
/// grammar captures; an absent field means "not determined", never an empty
/// string. A parse legitimately produces several plausible interpretations,
/// and disambiguation is deferred to candidate ranking.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interpretation {
    pub building_num: Option<String>,
    pub dependent_street: Option<String>,
    pub street: Option<String>,
    pub unit_type: Option<String>,
    pub unit_num: Option<String>,
    pub po_box: Option<String>,
    pub double_dependent_locality: Option<String>,
    pub dependent_locality: Option<String>,
    pub post_town: Option<String>,
    pub county: Option<String>,
    pub province_code: Option<String>,
    pub country_code: Option<String>,
    pub zip: Option<String>,
}

impl Interpretation {
    /// An interpretation with no determined fields.
    pub fn new() -> Self {
        Interpretation::default()
    }

    /// An interpretation carrying only an isolated PO-box number.
    pub fn po_box_only<S: Into<String>>(po_box: S) -> Self {
        Interpretation {
            po_box: Some(po_box.into()),
            ..Interpretation::default()
        }
    }

    /// Whether no field was determined.
    pub fn is_empty(&self) -> bool {
        *self == Interpretation::default()
    }

    /// Whether any street-level field was determined.
    pub fn has_street_fields(&self) -> bool {
        self.building_num.is_some()
            || self.street.is_some()
            || self.dependent_street.is_some()
            || self.unit_num.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_not_determined() {
        let interpretation = Interpretation::new();
        assert!(interpretation.is_empty());
        assert_eq!(interpretation.street, None);
    }

    #[test]
    fn test_po_box_only() {
        let interpretation = Interpretation::po_box_only("20");
        assert!(!interpretation.is_empty());
        assert!(!interpretation.has_street_fields());
        assert_eq!(interpretation.po_box.as_deref(), Some("20"));
    }
}
