//! Resolved field metadata and per-instance value snapshots.

use crate::naming::to_db_name;
use crate::relation::Relationship;
use crate::tag::TagSettings;
use crate::value::Value;

/// Resolved metadata for a single field of a record shape.
///
/// A field is exactly one of: ignored, relationship-bearing, or a normal
/// scalar. Embedded fields never appear themselves; their sub-fields take
/// their place with prefixed name paths.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMeta {
    /// Declared field name.
    pub name: String,
    /// Database column name.
    pub db_name: String,
    /// Name path from the record root, tracing through embedded records.
    /// For a top-level field this is just `[name]`.
    pub names: Vec<String>,
    /// Parsed annotations.
    pub tags: TagSettings,
    /// Excluded from querying; still recorded so row decoding can skip it.
    pub is_ignored: bool,
    /// Part of the primary key.
    pub is_primary_key: bool,
    /// The database assigns this column a value when none is provided.
    pub has_default_value: bool,
    /// Backed by a type with its own driver-value decode capability.
    pub is_scanner: bool,
    /// Plain column-backed scalar.
    pub is_normal: bool,
    /// Referenced as the foreign side of a belongs_to relationship.
    pub is_foreign_key: bool,
    /// Relationship metadata, present only when inference resolved at
    /// least one foreign-key pair.
    pub relationship: Option<Relationship>,
}

impl FieldMeta {
    /// Create a fresh, unclassified field for the given declared name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            db_name: String::new(),
            names: vec![name.to_string()],
            tags: TagSettings::default(),
            is_ignored: false,
            is_primary_key: false,
            has_default_value: false,
            is_scanner: false,
            is_normal: false,
            is_foreign_key: false,
            relationship: None,
        }
    }

    /// Does `column` refer to this field?
    ///
    /// Matches the declared name, the column name, or the snake-case
    /// transform of `column`, so `UserID`, `user_id` and a field named
    /// `user_id` all find each other.
    pub fn matches_column(&self, column: &str) -> bool {
        self.name == column || self.db_name == column || self.db_name == to_db_name(column)
    }
}

/// Find a field among `fields` referred to by `column`.
///
/// Lookup is silent; relationship inference treats a miss as "no match"
/// rather than an error.
pub fn find_field<'a>(column: &str, fields: &'a [FieldMeta]) -> Option<&'a FieldMeta> {
    fields.iter().find(|f| f.matches_column(column))
}

/// A field's metadata paired with its current value on a specific record
/// instance. Recomputed per call, never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    /// The resolved field.
    pub meta: FieldMeta,
    /// The instance's current value; `Value::Null` for fields without a
    /// scalar backing (relationships).
    pub value: Value,
    /// Zero/empty detection for the value.
    pub is_blank: bool,
}
