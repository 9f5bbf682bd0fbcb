//! Shared string inflection utilities.
//!
//! Pluralization and singularization for entity/collection name matching.
//! Uses the `inflector` crate with additional handling for irregular plurals
//! that show up in business-application schemas.

use inflector::Inflector;

/// Irregular plurals that inflector doesn't handle well for entity names.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("status", "statuses"),
    ("campus", "campuses"),
    ("analysis", "analyses"),
    ("criterion", "criteria"),
    ("index", "indices"),
    ("matrix", "matrices"),
];

/// Pluralize a word, handling irregulars first then falling back to inflector.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *singular || lower == *plural {
            return (*plural).to_string();
        }
    }

    word.to_plural()
}

/// Singularize a word, handling irregulars first then falling back to inflector.
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *plural || lower == *singular {
            return (*singular).to_string();
        }
    }

    word.to_singular()
}
