//! Relationship discovery.
//!
//! Consumes classified columns plus live record samples and assembles the
//! directed relationship edges (child entity, lookup column, parent
//! candidates) that drive the list-of-children navigation UI. Parent
//! resolution prefers metadata-declared targets and falls back to a
//! name-pattern guess; a column that resolves to nothing is reported with
//! empty targets and a warning rather than an invented parent.

use std::collections::BTreeSet;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use super::classify::{classify_columns, ColumnClassification, ColumnDescriptor, ColumnKind};
use crate::metadata::{LookupAttribute, MetadataProvider, MetadataResult};
use crate::records::{is_annotation_key, RawRecord};

/// Resolved parent candidates for one lookup column.
///
/// The variant is the provenance: declared targets are metadata-backed,
/// inferred targets come from the name-pattern fallback. "Declared an open
/// target set" and "metadata unavailable" are deliberately distinct states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParentTargets {
    /// Metadata-declared candidates, in declared order. More than one means
    /// the lookup is polymorphic.
    Declared(Vec<String>),
    /// Metadata-backed, but the target set is open (polymorphic lookup with
    /// no declared candidates).
    DeclaredOpen,
    /// Best-effort guess from the column name pattern.
    Inferred(String),
    /// No metadata and no usable pattern; the edge carries a warning.
    Unresolved,
}

impl ParentTargets {
    /// The best-guess parent entity, when one exists.
    pub fn best_guess(&self) -> Option<&str> {
        match self {
            Self::Declared(targets) => targets.first().map(String::as_str),
            Self::Inferred(target) => Some(target),
            Self::DeclaredOpen | Self::Unresolved => None,
        }
    }

    /// All candidate parent entities.
    pub fn candidates(&self) -> Vec<&str> {
        match self {
            Self::Declared(targets) => targets.iter().map(String::as_str).collect(),
            Self::Inferred(target) => vec![target.as_str()],
            Self::DeclaredOpen | Self::Unresolved => Vec::new(),
        }
    }

    /// Whether the candidates came from authoritative metadata.
    pub fn is_metadata_backed(&self) -> bool {
        matches!(self, Self::Declared(_) | Self::DeclaredOpen)
    }

    /// Whether more than one parent entity type is possible.
    pub fn is_polymorphic(&self) -> bool {
        matches!(self, Self::DeclaredOpen) || matches!(self, Self::Declared(t) if t.len() > 1)
    }
}

/// One directed relationship edge: child entity → parent via a lookup column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredRelationship {
    /// The entity whose records carry the lookup column.
    pub child_entity: String,
    /// Raw wire-level column name the edge was detected from.
    pub lookup_column: String,
    /// Logical attribute name behind the decoration.
    pub attribute: String,
    /// Parent candidates with provenance.
    pub targets: ParentTargets,
    /// Set when resolution was uncertain or failed.
    pub warning: Option<String>,
}

impl DiscoveredRelationship {
    /// The best-guess parent entity, when one exists.
    pub fn parent_entity(&self) -> Option<&str> {
        self.targets.best_guess()
    }
}

/// Discover relationship edges from a record sample.
///
/// The column set is the union of keys across the sample, so sparse records
/// (a column present on some rows only) are tolerated. Columns classified
/// PrimaryKey or Phantom never produce an edge. Output is deduplicated by
/// `(child_entity, lookup_column)` and ordered by column name.
///
/// Fails only when the owner entity's own metadata cannot be fetched;
/// per-column resolution failures are warnings on the edge.
pub async fn discover_relationships(
    records: &[RawRecord],
    entity: &str,
    provider: &dyn MetadataProvider,
) -> MetadataResult<Vec<DiscoveredRelationship>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    // Union of keys across the sample; annotation keys are query shaping,
    // not columns.
    let column_names: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.keys())
        .map(String::as_str)
        .filter(|key| !is_annotation_key(key))
        .collect();

    let columns: Vec<ColumnDescriptor> = column_names
        .iter()
        .map(|name| ColumnDescriptor::named(*name))
        .collect();

    let owner = provider.entity_metadata(entity).await?;
    let classified = classify_columns(&columns, &owner, None);

    for classification in &classified {
        if let Some(warning) = &classification.warning {
            warn!(entity, column = %classification.column_name, "{warning}");
        }
    }

    let lookups: Vec<&ColumnClassification> = classified
        .iter()
        .filter(|c| c.kind == ColumnKind::Lookup)
        .collect();

    // Resolve every lookup column's attribute metadata; the cache coalesces
    // the underlying fetches.
    let resolutions = join_all(
        lookups
            .iter()
            .map(|c| provider.lookup_attribute(entity, &c.inferred_field_name)),
    )
    .await;

    let mut edges = Vec::with_capacity(lookups.len());
    for (classification, resolution) in lookups.iter().zip(resolutions) {
        let edge = resolve_edge(entity, classification, resolution);
        if edge.kind == ColumnKind::Phantom {
            // Metadata disclaimed the column after classification.
            warn!(entity, column = %edge.relationship.lookup_column,
                "decorated column disclaimed by metadata, excluded from relationships");
            continue;
        }
        edges.push(edge.relationship);
    }

    debug!(entity, edges = edges.len(), sample = records.len(), "relationship discovery complete");
    Ok(edges)
}

struct ResolvedEdge {
    relationship: DiscoveredRelationship,
    kind: ColumnKind,
}

fn resolve_edge(
    entity: &str,
    classification: &ColumnClassification,
    resolution: MetadataResult<Option<LookupAttribute>>,
) -> ResolvedEdge {
    let attribute = classification.inferred_field_name.clone();

    let (targets, warning, kind) = match resolution {
        // Metadata-backed targets.
        Ok(Some(lookup)) if !lookup.targets.is_empty() => {
            (ParentTargets::Declared(lookup.targets), None, ColumnKind::Lookup)
        }
        // Metadata-backed, open target set.
        Ok(Some(_)) => (
            ParentTargets::DeclaredOpen,
            Some(format!(
                "'{}' is a polymorphic lookup with an open target set; no single parent applies",
                classification.column_name
            )),
            ColumnKind::Lookup,
        ),
        // Metadata authoritatively says this is not a lookup.
        Ok(None) => (ParentTargets::Unresolved, None, ColumnKind::Phantom),
        // Metadata unavailable: fall back to the name pattern.
        Err(err) => match guess_parent_entity(&attribute) {
            Some(guess) => {
                debug!(entity, attribute = %attribute, error = %err,
                    "lookup metadata unavailable, using name-pattern guess");
                (ParentTargets::Inferred(guess), None, ColumnKind::Lookup)
            }
            None => (
                ParentTargets::Unresolved,
                Some(format!(
                    "no parent entity could be resolved for '{}': lookup metadata unavailable \
                     ({err}) and the column name matches no pattern",
                    classification.column_name
                )),
                ColumnKind::Lookup,
            ),
        },
    };

    ResolvedEdge {
        relationship: DiscoveredRelationship {
            child_entity: entity.to_string(),
            lookup_column: classification.column_name.clone(),
            attribute,
            targets,
            warning,
        },
        kind,
    }
}

/// Name-pattern fallback: strip known identifier suffixes from the attribute
/// logical name. Lookup attributes are conventionally named after their
/// target entity, optionally with an `id` suffix.
fn guess_parent_entity(attribute: &str) -> Option<String> {
    let base = attribute
        .strip_suffix("_id")
        .or_else(|| attribute.strip_suffix("id"))
        .unwrap_or(attribute);
    if base.is_empty() || base == "_" {
        return None;
    }
    Some(base.trim_end_matches('_').to_string())
}
