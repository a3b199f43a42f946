//! The `Record` trait and static field declarations.
//!
//! Records describe themselves statically instead of being reflected at
//! runtime: the `#[derive(Record)]` macro (or a hand-written impl) supplies
//! an ordered list of [`FieldDecl`]s, a type name for naming conventions,
//! an optional custom table name, and a value snapshot used when a record
//! instance serves as an equality filter.

use crate::error::Result;
use crate::schema::ModelSchema;
use crate::value::Value;
use std::sync::Arc;

/// Resolves the schema of a related record type.
///
/// Stored as a plain function pointer inside [`FieldKind`] so that field
/// declarations stay `'static` data while relationship inference can still
/// reach the target shape on demand.
pub type SchemaFn = fn() -> Result<Arc<ModelSchema>>;

/// Path of field names from the record root to a value, tracing through
/// embedded records.
pub type FieldPath = Vec<&'static str>;

/// The shape of a declared field, fixed at declaration time.
///
/// Classification happens once, here, rather than as a dynamic type check
/// repeated on every access.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Plain column-backed value.
    Scalar,
    /// Time-valued field; treated as a normal scalar column.
    Time,
    /// A type with its own driver-value decode capability ([`ScanValue`]).
    /// Treated as a normal scalar column; annotations declared on the
    /// scanner's shape are merged up onto the field.
    Scanner {
        /// Annotation strings declared on the scanner's underlying shape.
        nested_tags: &'static [&'static str],
    },
    /// Nested record flattened into the owner.
    Embedded {
        /// Schema of the embedded record type.
        target: SchemaFn,
    },
    /// Nested record; a has_one or belongs_to relationship is inferred.
    Nested {
        /// Schema of the related record type.
        target: SchemaFn,
    },
    /// Collection of records; a has_many or many_to_many relationship is
    /// inferred.
    Collection {
        /// Schema of the element record type.
        target: SchemaFn,
    },
}

/// A single field declaration: name, raw annotation string, and shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldDecl {
    /// Declared field name.
    pub name: &'static str,
    /// Raw annotation string, parsed by the resolver
    /// (e.g. `"primary_key;column:uid"`).
    pub tag: &'static str,
    /// Field shape.
    pub kind: FieldKind,
}

/// A record type that maps to a relational table.
pub trait Record: Send + Sync + 'static {
    /// The record type's name, input to naming conventions.
    const MODEL_NAME: &'static str;

    /// Field declarations in declaration order.
    fn declared_fields() -> &'static [FieldDecl];

    /// Custom table name capability.
    ///
    /// Returning `Some` overrides the derived (snake-cased, pluralized)
    /// default. A per-session table override on the query scope takes
    /// precedence over both.
    fn table_name() -> Option<&'static str> {
        None
    }

    /// Snapshot of the instance's scalar field values, keyed by name path.
    ///
    /// Embedded records contribute their sub-fields with prefixed paths;
    /// relationship fields contribute nothing.
    fn record_values(&self) -> Vec<(FieldPath, Value)>;
}

/// Decode-from-driver-value capability.
///
/// Field types implementing this are classified as scanner-backed columns:
/// stored and queried as a single scalar even when structurally composite.
pub trait ScanValue: Sized {
    /// Decode from a driver-native value.
    fn from_driver(value: &Value) -> Result<Self>;

    /// Encode to a driver-native value.
    fn to_value(&self) -> Value;
}
