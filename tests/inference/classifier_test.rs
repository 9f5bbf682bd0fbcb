//! Integration tests for column classification.
//!
//! Pins the decision table: primary-key detection before lookup detection,
//! phantom demotion only under authoritative metadata, warnings on the
//! uncertain cases.

use periscope::inference::{classify_columns, ColumnDescriptor, ColumnKind};
use periscope::metadata::{EntityMetadata, LookupAttribute};

fn initiative() -> EntityMetadata {
    EntityMetadata {
        logical_name: "pum_initiative".to_string(),
        primary_id_attribute: "pum_initiativeid".to_string(),
        primary_name_attribute: "pum_name".to_string(),
        collection_name: "pum_initiatives".to_string(),
        display_name: Some("Initiative".to_string()),
    }
}

fn columns(names: &[&str]) -> Vec<ColumnDescriptor> {
    names.iter().map(|n| ColumnDescriptor::named(*n)).collect()
}

#[test]
fn test_initiative_column_set_classification() {
    // The observed real-world failure mode: the primary key surfaced twice,
    // once plain and once behind lookup decoration.
    let cols = columns(&[
        "pum_initiativeid",
        "_pum_initiativeid_value",
        "_pum_portfolio_value",
        "pum_name",
    ]);
    let result = classify_columns(&cols, &initiative(), None);

    assert_eq!(result[0].kind, ColumnKind::PrimaryKey);
    assert!(result[0].is_primary_key);
    assert!(result[0].warning.is_none());

    assert_eq!(result[1].kind, ColumnKind::PrimaryKey);
    assert!(result[1].is_primary_key);
    assert!(result[1].warning.is_some(), "decorated primary key must carry a warning");

    assert_eq!(result[2].kind, ColumnKind::Lookup);
    assert_eq!(result[2].inferred_field_name, "pum_portfolio");

    assert_eq!(result[3].kind, ColumnKind::Attribute);
}

#[test]
fn test_primary_key_wins_regardless_of_decoration() {
    // Property: a column whose inferred name equals the owner's primary id
    // attribute classifies PrimaryKey whether or not it is decorated.
    for spelling in ["pum_initiativeid", "_pum_initiativeid_value"] {
        let result = classify_columns(&columns(&[spelling]), &initiative(), None);
        assert_eq!(result[0].kind, ColumnKind::PrimaryKey, "spelling: {spelling}");
        assert!(result[0].is_primary_key);
    }
}

#[test]
fn test_is_primary_key_false_for_everything_else() {
    let cols = columns(&["pum_name", "_pum_portfolio_value", "statuscode"]);
    for classification in classify_columns(&cols, &initiative(), None) {
        assert!(!classification.is_primary_key, "{}", classification.column_name);
    }
}

#[test]
fn test_phantom_requires_authoritative_metadata() {
    let cols = columns(&["_pum_mystery_value"]);

    // Pattern stage alone: decorated and not the primary key means lookup.
    let without = classify_columns(&cols, &initiative(), None);
    assert_eq!(without[0].kind, ColumnKind::Lookup);

    // Metadata that disclaims the attribute demotes it to phantom.
    let attrs = vec![LookupAttribute::new(
        "pum_portfolio",
        vec!["pum_portfolio".to_string()],
    )];
    let with = classify_columns(&cols, &initiative(), Some(&attrs));
    assert_eq!(with[0].kind, ColumnKind::Phantom);
    assert!(with[0].warning.is_some());
}

#[test]
fn test_inferred_field_name_unchanged_when_undecorated() {
    let result = classify_columns(&columns(&["statuscode"]), &initiative(), None);
    assert_eq!(result[0].inferred_field_name, "statuscode");
}
