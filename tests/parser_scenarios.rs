//! Integration tests for end-to-end structural parsing.

use std::sync::Arc;

use postalign::address::Address;
use postalign::config::CountryRegistry;
use postalign::error::Result;
use postalign::parser::{AddressParser, Interpretation};

fn parser() -> AddressParser {
    AddressParser::new(Arc::new(CountryRegistry::builtin().unwrap()))
}

fn parse(address: &Address) -> Vec<Interpretation> {
    parser().parse(address).unwrap()
}

#[test]
fn test_us_plain_street() -> Result<()> {
    let address = Address::new()
        .with_country_code("US")
        .with_address1("100 Main St")
        .with_city("Springfield")
        .with_zip("94105");

    let interpretations = parser().parse(&address)?;
    assert!(interpretations.iter().any(|i| {
        i.building_num.as_deref() == Some("100")
            && i.street.as_deref() == Some("Main St")
            && i.unit_type.is_none()
            && i.unit_num.is_none()
    }));
    Ok(())
}

#[test]
fn test_us_slash_unit() -> Result<()> {
    let address = Address::new()
        .with_country_code("US")
        .with_address1("5/100 Main St");

    let interpretations = parser().parse(&address)?;
    assert!(interpretations.iter().any(|i| {
        i.unit_num.as_deref() == Some("5")
            && i.building_num.as_deref() == Some("100")
            && i.street.as_deref() == Some("Main St")
    }));
    Ok(())
}

#[test]
fn test_us_designated_unit_on_second_line() -> Result<()> {
    let address = Address::new()
        .with_country_code("US")
        .with_address1("100 Main St")
        .with_address2("Apt 4B");

    let interpretations = parser().parse(&address)?;
    // The concatenated variant recovers the unit from the second line.
    assert!(interpretations.iter().any(|i| {
        i.building_num.as_deref() == Some("100")
            && i.street.as_deref() == Some("Main St")
            && i.unit_type.as_deref() == Some("Apt")
            && i.unit_num.as_deref() == Some("4B")
    }));
    Ok(())
}

#[test]
fn test_county_road_keeps_both_readings() {
    let address = Address::new()
        .with_country_code("US")
        .with_address1("123 County Road 45");

    let interpretations = parse(&address);
    let streets: Vec<&str> = interpretations
        .iter()
        .filter_map(|i| i.street.as_deref())
        .collect();
    assert!(streets.contains(&"County Road"));
    assert!(streets.contains(&"County Road 45"));
    // "Road" is a street suffix, never a unit designator.
    assert!(interpretations.iter().all(|i| i.unit_type.is_none()));
}

#[test]
fn test_gb_two_interpretations() {
    let address = Address::new()
        .with_country_code("GB")
        .with_address1("2 Elm Avenue")
        .with_address2("Runcorn Road")
        .with_city("Birmingham");

    let interpretations = parse(&address);

    // Reading one: second line is a dependent locality.
    assert!(interpretations.iter().any(|i| {
        i.building_num.as_deref() == Some("2")
            && i.street.as_deref() == Some("Elm Avenue")
            && i.dependent_locality.as_deref() == Some("Runcorn Road")
            && i.post_town.as_deref() == Some("Birmingham")
    }));
    // Reading two: second line is the street, first line a dependent street.
    assert!(interpretations.iter().any(|i| {
        i.building_num.as_deref() == Some("2")
            && i.dependent_street.as_deref() == Some("Elm Avenue")
            && i.street.as_deref() == Some("Runcorn Road")
    }));
}

#[test]
fn test_belgian_po_box_line() {
    let address = Address::new()
        .with_country_code("BE")
        .with_address1("Rue de la Senne 32 box 20")
        .with_city("Brussels");

    let interpretations = parse(&address);
    assert!(interpretations.iter().any(|i| {
        i.street.as_deref() == Some("Rue de la Senne")
            && i.building_num.as_deref() == Some("32")
            && i.po_box.as_deref() == Some("20")
    }));
}

#[test]
fn test_po_box_only_address() {
    let address = Address::new()
        .with_country_code("US")
        .with_address1("PO Box 7");

    let interpretations = parse(&address);
    assert_eq!(interpretations, vec![Interpretation::po_box_only("7")]);
    assert!(!interpretations[0].has_street_fields());
}

#[test]
fn test_australian_unit_slash() {
    let address = Address::new()
        .with_country_code("AU")
        .with_address1("5/100 George St");

    let interpretations = parse(&address);
    assert!(interpretations.iter().any(|i| {
        i.unit_num.as_deref() == Some("5")
            && i.building_num.as_deref() == Some("100")
            && i.street.as_deref() == Some("George St")
    }));
}

#[test]
fn test_unknown_country_is_config_error() {
    let address = Address::new()
        .with_country_code("ZZ")
        .with_address1("100 Main St");
    assert!(parser().parse(&address).is_err());
}

#[test]
fn test_unparseable_lines_yield_no_interpretations() -> Result<()> {
    let address = Address::new()
        .with_country_code("US")
        .with_address1("!!! ???");
    assert!(parser().parse(&address)?.is_empty());
    Ok(())
}
