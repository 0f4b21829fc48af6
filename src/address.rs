//! The address input value object.

use serde::{Deserialize, Serialize};

/// A free-form postal address as submitted for validation.
///
/// Every field is optional; a blank or whitespace-only string is treated the
/// same as an absent field. `address1`/`address2` carry the unstructured
/// street lines that the structural parser works on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province_code: Option<String>,
    pub country_code: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
}

impl Address {
    /// Create an empty address.
    pub fn new() -> Self {
        Address::default()
    }

    /// Builder-style setter for `address1`.
    pub fn with_address1<S: Into<String>>(mut self, value: S) -> Self {
        self.address1 = Some(value.into());
        self
    }

    /// Builder-style setter for `address2`.
    pub fn with_address2<S: Into<String>>(mut self, value: S) -> Self {
        self.address2 = Some(value.into());
        self
    }

    /// Builder-style setter for `city`.
    pub fn with_city<S: Into<String>>(mut self, value: S) -> Self {
        self.city = Some(value.into());
        self
    }

    /// Builder-style setter for `province_code`.
    pub fn with_province_code<S: Into<String>>(mut self, value: S) -> Self {
        self.province_code = Some(value.into());
        self
    }

    /// Builder-style setter for `country_code`.
    pub fn with_country_code<S: Into<String>>(mut self, value: S) -> Self {
        self.country_code = Some(value.into());
        self
    }

    /// Builder-style setter for `zip`.
    pub fn with_zip<S: Into<String>>(mut self, value: S) -> Self {
        self.zip = Some(value.into());
        self
    }

    /// `address1` with blank values folded to `None`.
    pub fn address1(&self) -> Option<&str> {
        non_blank(self.address1.as_deref())
    }

    /// `address2` with blank values folded to `None`.
    pub fn address2(&self) -> Option<&str> {
        non_blank(self.address2.as_deref())
    }

    /// `city` with blank values folded to `None`.
    pub fn city(&self) -> Option<&str> {
        non_blank(self.city.as_deref())
    }

    /// `province_code` with blank values folded to `None`.
    pub fn province_code(&self) -> Option<&str> {
        non_blank(self.province_code.as_deref())
    }

    /// `country_code` with blank values folded to `None`.
    pub fn country_code(&self) -> Option<&str> {
        non_blank(self.country_code.as_deref())
    }

    /// `zip` with blank values folded to `None`.
    pub fn zip(&self) -> Option<&str> {
        non_blank(self.zip.as_deref())
    }

    /// The street lines present on this address, in order.
    pub fn street_lines(&self) -> Vec<&str> {
        [self.address1(), self.address2()]
            .into_iter()
            .flatten()
            .collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_fold_to_none() {
        let address = Address::new().with_address1("  ").with_city("Boston");
        assert_eq!(address.address1(), None);
        assert_eq!(address.city(), Some("Boston"));
    }

    #[test]
    fn test_street_lines() {
        let address = Address::new()
            .with_address1("2 Elm Avenue")
            .with_address2("Runcorn Road");
        assert_eq!(address.street_lines(), vec!["2 Elm Avenue", "Runcorn Road"]);

        let address = Address::new().with_address2("Runcorn Road");
        assert_eq!(address.street_lines(), vec!["Runcorn Road"]);
    }
}
