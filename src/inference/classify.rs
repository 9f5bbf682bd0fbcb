//! Column classification.
//!
//! Given the raw columns of one entity, classify each as primary key,
//! lookup, plain attribute, or phantom. Primary-key detection runs before
//! generic lookup detection: a decorated column whose inferred name is the
//! owner's primary key is an identifier that merely looks like a lookup, and
//! letting it through as a relationship was an observed failure mode.

use serde::Serialize;

use crate::metadata::{EntityMetadata, LookupAttribute};

/// Wire-level lookup decoration: `_{attribute}_value`.
const DECORATION_PREFIX: &str = "_";
const DECORATION_SUFFIX: &str = "_value";

/// A raw column descriptor as surfaced by the hosting dataset abstraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Wire-level column name.
    pub name: String,
    /// Declared data type, when the host surfaces one.
    pub data_type: Option<String>,
}

impl ColumnDescriptor {
    /// Descriptor with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
        }
    }
}

/// What a column is, once classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    /// The owning entity's unique identifier.
    PrimaryKey,
    /// A foreign-key reference to another entity's record.
    Lookup,
    /// A plain data attribute.
    Attribute,
    /// Decoration-shaped, but its inferred name matches no known lookup
    /// attribute and is not the primary key. Surfaced, never silently dropped.
    Phantom,
}

/// Classification result for one raw column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnClassification {
    /// Wire-level column name as it appeared.
    pub column_name: String,
    /// Name with lookup decoration stripped (unchanged when undecorated).
    pub inferred_field_name: String,
    pub kind: ColumnKind,
    /// True exactly when the inferred name equals the owner's primary id
    /// attribute.
    pub is_primary_key: bool,
    /// Set when classification is uncertain.
    pub warning: Option<String>,
}

/// Strip wire-level lookup decoration: `_foo_value` → `foo`.
///
/// Returns `None` when the name is not decoration-shaped.
pub fn strip_lookup_decoration(name: &str) -> Option<&str> {
    let inner = name
        .strip_prefix(DECORATION_PREFIX)?
        .strip_suffix(DECORATION_SUFFIX)?;
    if inner.is_empty() {
        return None;
    }
    Some(inner)
}

/// Wrap an attribute logical name in lookup decoration: `foo` → `_foo_value`.
pub fn decorate_lookup(attribute: &str) -> String {
    format!("{DECORATION_PREFIX}{attribute}{DECORATION_SUFFIX}")
}

/// Classify the raw columns of one entity.
///
/// `lookup_attrs` is the authoritative lookup-attribute list for the owner
/// when one is available. With it, decorated columns it disclaims demote to
/// [`ColumnKind::Phantom`]; without it, decoration alone decides and the
/// pattern stage stands on its own.
pub fn classify_columns(
    columns: &[ColumnDescriptor],
    owner: &EntityMetadata,
    lookup_attrs: Option<&[LookupAttribute]>,
) -> Vec<ColumnClassification> {
    columns
        .iter()
        .map(|column| classify_column(column, owner, lookup_attrs))
        .collect()
}

fn classify_column(
    column: &ColumnDescriptor,
    owner: &EntityMetadata,
    lookup_attrs: Option<&[LookupAttribute]>,
) -> ColumnClassification {
    let stripped = strip_lookup_decoration(&column.name);
    let inferred_field_name = stripped.unwrap_or(&column.name).to_string();

    // Primary-key detection must run before lookup detection: a decorated
    // primary key is a phantom lookup, not a relationship.
    if inferred_field_name == owner.primary_id_attribute {
        let warning = stripped.map(|_| {
            format!(
                "'{}' carries lookup decoration but resolves to the primary key of '{}'; \
                 treating it as an identifier, not a relationship",
                column.name, owner.logical_name
            )
        });
        return ColumnClassification {
            column_name: column.name.clone(),
            inferred_field_name,
            kind: ColumnKind::PrimaryKey,
            is_primary_key: true,
            warning,
        };
    }

    if stripped.is_some() {
        // Authoritative metadata can disclaim a decorated column outright.
        if let Some(attrs) = lookup_attrs {
            if !attrs.iter().any(|a| a.logical_name == inferred_field_name) {
                return ColumnClassification {
                    column_name: column.name.clone(),
                    inferred_field_name: inferred_field_name.clone(),
                    kind: ColumnKind::Phantom,
                    is_primary_key: false,
                    warning: Some(format!(
                        "'{}' is decoration-shaped but '{}' matches no lookup attribute on '{}'",
                        column.name, inferred_field_name, owner.logical_name
                    )),
                };
            }
        }
        return ColumnClassification {
            column_name: column.name.clone(),
            inferred_field_name,
            kind: ColumnKind::Lookup,
            is_primary_key: false,
            warning: None,
        };
    }

    ColumnClassification {
        column_name: column.name.clone(),
        inferred_field_name,
        kind: ColumnKind::Attribute,
        is_primary_key: false,
        warning: None,
    }
}
