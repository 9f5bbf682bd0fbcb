//! Metadata value objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::MetadataError;
use crate::inference::decorate_lookup;

/// Schema descriptor for one remote entity type.
///
/// All fields are populated once a fetch succeeds; a definition body missing
/// any required field is a fetch failure, not a valid empty state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Logical (singular) entity name, e.g. `pum_initiative`.
    pub logical_name: String,
    /// Attribute holding the record's unique identifier.
    pub primary_id_attribute: String,
    /// Attribute holding the record's display name.
    pub primary_name_attribute: String,
    /// Pluralized route segment for record queries.
    pub collection_name: String,
    /// Localized display name, when the service provides one.
    pub display_name: Option<String>,
}

impl EntityMetadata {
    /// Parse an entity definition body.
    ///
    /// Fails when any of the four required fields is missing or empty.
    pub fn from_definition(body: &Value, requested: &str) -> Result<Self, MetadataError> {
        let logical_name = required_field(body, "LogicalName", requested)?;
        let primary_id_attribute = required_field(body, "PrimaryIdAttribute", requested)?;
        let primary_name_attribute = required_field(body, "PrimaryNameAttribute", requested)?;
        let collection_name = required_field(body, "LogicalCollectionName", requested)?;

        Ok(Self {
            logical_name,
            primary_id_attribute,
            primary_name_attribute,
            collection_name,
            display_name: localized_label(body.get("DisplayName")),
        })
    }
}

/// Descriptor for one foreign-key-like attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupAttribute {
    /// Logical attribute name, e.g. `pum_portfolio`.
    pub logical_name: String,
    /// Wire-level column name: the logical name behind lookup decoration.
    pub data_field_name: String,
    /// Candidate parent entity logical names, in declared order. Empty means
    /// the lookup is polymorphic with an open target set.
    pub targets: Vec<String>,
    /// Localized display name, when the service provides one.
    pub display_name: Option<String>,
}

impl LookupAttribute {
    /// Build a lookup attribute descriptor.
    pub fn new(logical_name: impl Into<String>, targets: Vec<String>) -> Self {
        let logical_name = logical_name.into();
        let data_field_name = decorate_lookup(&logical_name);
        Self {
            logical_name,
            data_field_name,
            targets,
            display_name: None,
        }
    }

    /// Parse a lookup attribute metadata body.
    pub fn from_attribute_body(body: &Value, requested: &str) -> Result<Self, MetadataError> {
        let logical_name = required_field(body, "LogicalName", requested)?;
        let targets = body
            .get("Targets")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let mut attribute = Self::new(logical_name, targets);
        attribute.display_name = localized_label(body.get("DisplayName"));
        Ok(attribute)
    }

    /// Whether more than one parent entity type is possible.
    pub fn is_polymorphic(&self) -> bool {
        self.targets.len() != 1
    }
}

fn required_field(body: &Value, key: &'static str, requested: &str) -> Result<String, MetadataError> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| MetadataError::Malformed {
            entity: requested.to_string(),
            missing: key,
        })
}

/// Display names arrive as a localized label envelope; unwrap the user label.
fn localized_label(value: Option<&Value>) -> Option<String> {
    value?
        .get("UserLocalizedLabel")?
        .get("Label")?
        .as_str()
        .map(str::to_string)
}
