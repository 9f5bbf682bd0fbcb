//! Record normalization.
//!
//! Converts raw remote-API records into the canonical shape the hosted
//! component framework expects: an entity reference (type, id, display
//! name), the resolved primary field name, and a field map where lookup
//! columns carry both the raw id and the referenced display name.
//!
//! Display-name resolution is strict by default: a record that should be
//! nameable but isn't raises a [`NormalizeError::NameResolution`] with full
//! debug context instead of being masked with a placeholder. Degrading to
//! the placeholder is an explicit caller decision.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::{formatted_value, is_annotation_key, RawRecord};
use crate::inference::strip_lookup_decoration;
use crate::metadata::EntityMetadata;

/// Display-name stand-in for the explicit degrade path. Never substituted
/// silently.
pub const PLACEHOLDER_NAME: &str = "Unnamed Record";

/// Naming conventions tried when metadata does not settle the display name.
const NAME_CONVENTIONS: &[&str] = &["name", "fullname", "subject"];

/// Result type for normalization.
type NormalizeResult<T> = Result<T, NormalizeError>;

/// Errors raised while normalizing records.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The primary display value could not be located on a record the
    /// caller expects to be nameable. Carries everything needed to see the
    /// true cause.
    #[error(
        "no display name found on '{entity}' record {record_id:?}: primary name attribute \
         {primary_name_attribute:?}, tried {attempted:?}, record keys {record_keys:?}"
    )]
    NameResolution {
        entity: String,
        record_id: Option<String>,
        primary_name_attribute: Option<String>,
        attempted: Vec<String>,
        record_keys: Vec<String>,
    },

    /// The record id attribute was missing or not a usable scalar.
    #[error("no record id found on '{entity}' record: tried {attempted:?}, record keys {record_keys:?}")]
    MissingRecordId {
        entity: String,
        attempted: Vec<String>,
        record_keys: Vec<String>,
    },
}

/// What to do when a record has no locatable display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Raise [`NormalizeError::NameResolution`].
    #[default]
    Strict,
    /// Log the failure with full context, then substitute the placeholder.
    /// Only for callers that have decided to degrade rather than abort.
    DegradeToPlaceholder,
}

/// Canonical {type, id, display name} triple identifying a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityReference {
    pub entity_type_name: String,
    pub record_id: String,
    pub primary_name: String,
}

/// A normalized field value. Lookup columns keep the raw id together with
/// the referenced record's display name when the wire record resolves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldValue {
    /// A plain attribute value (string, number, boolean, null, or nested).
    Scalar(Value),
    /// A foreign-key reference.
    Lookup {
        id: String,
        /// Referenced display name, when resolvable from annotations.
        name: Option<String>,
    },
}

/// Canonical record shape consumed by the hosted component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub entity_reference: EntityReference,
    /// The field that supplied the display name.
    pub primary_field_name: String,
    /// Logical attribute name → value.
    pub fields: BTreeMap<String, FieldValue>,
}

/// Normalizer for one entity's records.
pub struct RecordNormalizer {
    entity: String,
    metadata: Option<EntityMetadata>,
    policy: NamePolicy,
}

impl RecordNormalizer {
    /// Normalizer backed by fetched metadata.
    pub fn new(entity: impl Into<String>, metadata: Option<EntityMetadata>) -> Self {
        Self {
            entity: entity.into(),
            metadata,
            policy: NamePolicy::default(),
        }
    }

    /// Override the display-name failure policy.
    pub fn with_policy(mut self, policy: NamePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Normalize a batch of raw records, keyed by record id.
    ///
    /// Fails on the first record whose id or display name cannot be
    /// resolved; a caller that wants partial output filters its input first.
    pub fn normalize(&self, records: &[RawRecord]) -> NormalizeResult<BTreeMap<String, NormalizedRecord>> {
        let mut normalized = BTreeMap::new();
        for record in records {
            let entry = self.normalize_one(record)?;
            normalized.insert(entry.entity_reference.record_id.clone(), entry);
        }
        debug!(entity = %self.entity, count = normalized.len(), "normalized record batch");
        Ok(normalized)
    }

    /// Normalize a single raw record.
    pub fn normalize_one(&self, record: &RawRecord) -> NormalizeResult<NormalizedRecord> {
        let record_id = self.resolve_record_id(record)?;
        let (primary_name, primary_field_name) = self.resolve_primary_name(record, &record_id)?;

        let primary_id_attribute = self
            .metadata
            .as_ref()
            .map(|m| m.primary_id_attribute.clone())
            .unwrap_or_else(|| format!("{}id", self.entity));

        let mut fields = BTreeMap::new();
        for (key, value) in record {
            if is_annotation_key(key) {
                continue;
            }
            match strip_lookup_decoration(key) {
                Some(attribute) if attribute == primary_id_attribute => {
                    // A decorated primary key is an identifier, not a lookup
                    // field; the id is already on the entity reference.
                    debug!(entity = %self.entity, column = key, "skipping decorated primary key column");
                }
                Some(attribute) => match scalar_to_string(value) {
                    Some(id) => {
                        let name = formatted_value(record, key).map(str::to_string);
                        fields.insert(attribute.to_string(), FieldValue::Lookup { id, name });
                    }
                    // A null lookup means the record references nothing.
                    None => {
                        fields.insert(attribute.to_string(), FieldValue::Scalar(Value::Null));
                    }
                },
                None => {
                    fields.insert(key.clone(), FieldValue::Scalar(value.clone()));
                }
            }
        }

        Ok(NormalizedRecord {
            entity_reference: EntityReference {
                entity_type_name: self.entity.clone(),
                record_id,
                primary_name,
            },
            primary_field_name,
            fields,
        })
    }

    fn resolve_record_id(&self, record: &RawRecord) -> NormalizeResult<String> {
        let mut attempted = Vec::new();

        if let Some(metadata) = &self.metadata {
            attempted.push(metadata.primary_id_attribute.clone());
        } else {
            // Convention: the id attribute is the logical name with an `id`
            // suffix.
            attempted.push(format!("{}id", self.entity));
        }

        for attribute in &attempted {
            if let Some(id) = record.get(attribute).and_then(scalar_to_string) {
                return Ok(id);
            }
        }

        Err(NormalizeError::MissingRecordId {
            entity: self.entity.clone(),
            attempted,
            record_keys: record.keys().cloned().collect(),
        })
    }

    /// Resolve the display name and the field that supplied it.
    ///
    /// Order: the metadata-declared primary name attribute, then common
    /// naming conventions, then the publisher-prefixed `name` form. Failure
    /// is raised (or explicitly degraded), never silently papered over.
    fn resolve_primary_name(
        &self,
        record: &RawRecord,
        record_id: &str,
    ) -> NormalizeResult<(String, String)> {
        let declared = self
            .metadata
            .as_ref()
            .map(|m| m.primary_name_attribute.clone());

        let mut attempted = Vec::new();
        if let Some(declared) = &declared {
            attempted.push(declared.clone());
        }
        for convention in NAME_CONVENTIONS {
            attempted.push((*convention).to_string());
        }
        if let Some(prefixed) = publisher_prefixed_name(&self.entity) {
            attempted.push(prefixed);
        }

        for attribute in &attempted {
            if let Some(name) = record
                .get(attribute)
                .and_then(Value::as_str)
                .filter(|v| !v.is_empty())
            {
                return Ok((name.to_string(), attribute.clone()));
            }
        }

        let error = NormalizeError::NameResolution {
            entity: self.entity.clone(),
            record_id: Some(record_id.to_string()),
            primary_name_attribute: declared.clone(),
            attempted: attempted.clone(),
            record_keys: record.keys().cloned().collect(),
        };

        match self.policy {
            NamePolicy::Strict => Err(error),
            NamePolicy::DegradeToPlaceholder => {
                warn!(error = %error, "degrading to placeholder display name");
                let field = declared.unwrap_or_else(|| "name".to_string());
                Ok((PLACEHOLDER_NAME.to_string(), field))
            }
        }
    }
}

/// Render a JSON scalar as a record id string. Objects and arrays are not
/// usable ids.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The publisher-prefixed `name` convention: `pum_initiative` → `pum_name`.
fn publisher_prefixed_name(entity: &str) -> Option<String> {
    let prefix = entity.split('_').next()?;
    if prefix.is_empty() || prefix == entity {
        return None;
    }
    Some(format!("{prefix}_name"))
}
