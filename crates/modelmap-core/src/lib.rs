//! Core types and schema resolution for modelmap.
//!
//! This crate provides the foundational abstractions for mapping record
//! types to relational tables:
//!
//! - `Record` trait and static field declarations
//! - Schema resolution with a process-wide metadata cache
//! - Foreign-key relationship inference from naming conventions
//! - The `Dialect` facade consumed by the condition compiler

pub mod dialect;
pub mod error;
pub mod field;
pub mod naming;
pub mod record;
pub mod relation;
pub mod schema;
pub mod tag;
pub mod value;

pub use dialect::{Dialect, Mysql, Postgres, Sqlite, quote};
pub use error::{Error, Result};
pub use field::{FieldMeta, FieldSnapshot, find_field};
pub use naming::{pluralize, set_singular_table, to_db_name};
pub use record::{FieldDecl, FieldKind, FieldPath, Record, ScanValue, SchemaFn};
pub use relation::{RelationKind, Relationship};
pub use schema::{
    ModelSchema, fields_of, has_column, primary_key_column, resolve, table_name,
};
pub use tag::TagSettings;
pub use value::Value;
