//! Raw record handling and normalization.
//!
//! Records arrive from the data service as dynamic JSON objects with no
//! fixed schema; callers must tolerate unknown and extra columns, so the
//! wire shape stays a string-keyed map of JSON values rather than a
//! statically typed struct.

mod normalize;

pub use normalize::{
    EntityReference, FieldValue, NamePolicy, NormalizeError, NormalizedRecord, RecordNormalizer,
    PLACEHOLDER_NAME,
};

/// A raw record as returned by the remote API.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Annotation suffix carrying a field's formatted display value.
pub const FORMATTED_VALUE_ANNOTATION: &str = "@OData.Community.Display.V1.FormattedValue";

/// Whether a record key is an OData annotation rather than a column.
pub fn is_annotation_key(key: &str) -> bool {
    key.contains('@')
}

/// The formatted display value annotated onto `column`, when present.
pub fn formatted_value<'a>(record: &'a RawRecord, column: &str) -> Option<&'a str> {
    record
        .get(&format!("{column}{FORMATTED_VALUE_ANNOTATION}"))
        .and_then(serde_json::Value::as_str)
}
