//! modelmap - record-to-table metadata resolution and condition-to-SQL
//! compilation.
//!
//! modelmap maps Rust structs to relational tables and compiles
//! high-level query conditions into dialect-correct, parameter-bound SQL
//! fragments:
//!
//! - Schema resolution from static field declarations, cached per shape
//! - Foreign-key relationship inference (has_one, has_many, belongs_to,
//!   many_to_many, polymorphic) from naming conventions with annotation
//!   overrides
//! - Condition compilation for raw SQL, key/value maps, primary keys, and
//!   whole record instances, every literal routed through a positional
//!   parameter binder
//!
//! # Quick Start
//!
//! ```ignore
//! use modelmap::{Condition, Postgres, Record, Scope};
//!
//! #[derive(Record)]
//! struct User {
//!     #[record(primary_key)]
//!     id: i64,
//!     name: String,
//!     emails: Vec<Email>,
//! }
//!
//! #[derive(Record)]
//! struct Email {
//!     #[record(primary_key)]
//!     id: i64,
//!     user_id: i64,
//!     email: String,
//! }
//!
//! let mut scope = Scope::<User>::new(&Postgres)
//!     .filter(Condition::sql("name=?", ["gernest"]));
//! let clause = scope.where_sql()?;   // ` WHERE (name=$1)`
//! let params = scope.into_vars();    // [Value::Text("gernest")]
//! # Ok::<(), modelmap::Error>(())
//! ```
//!
//! Executing the resulting SQL belongs to a driver layer outside this
//! crate; modelmap only emits fragment strings plus their parameter list.

// Re-export all public types from sub-crates
pub use modelmap_core::{
    Dialect, Error, FieldDecl, FieldKind, FieldMeta, FieldPath, FieldSnapshot, ModelSchema, Mysql,
    Postgres, Record, RelationKind, Relationship, Result, ScanValue, SchemaFn, Sqlite,
    TagSettings, Value, fields_of, has_column, pluralize, primary_key_column, quote, resolve,
    set_singular_table, table_name, to_db_name,
};

pub use modelmap_macros::Record;

pub use modelmap_query::{
    Arg, Binder, Condition, Scope, SqlExpr, condition_sql, negated_condition_sql,
};

/// Convenience imports for typical use.
pub mod prelude {
    pub use crate::{
        Arg, Condition, Dialect, Error, Postgres, Record, Result, Scope, SqlExpr, Value, resolve,
    };
}
