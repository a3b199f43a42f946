//! Condition-to-SQL compilation for modelmap.
//!
//! `modelmap-query` is the **query construction layer**. It turns
//! heterogeneous condition inputs — raw SQL with placeholders, key/value
//! maps, primary-key scalars and collections, whole record instances —
//! into quoted, parameter-bound SQL fragments consistent with a pluggable
//! dialect.
//!
//! # Role In The Architecture
//!
//! - **Conditions**: the accepted shapes and their constructors.
//! - **Binder**: the ordered bound value list; positions are placeholder
//!   identities.
//! - **Compiler**: per-shape fragment compilation, positive and negated.
//! - **Scope**: one query-building session owning its conditions, binder,
//!   and table-name override.
//!
//! Schema metadata comes from `modelmap-core`; executing the resulting
//! SQL belongs to a driver layer outside this crate.

pub mod binder;
pub mod compiler;
pub mod condition;
pub mod scope;

pub use binder::Binder;
pub use compiler::{condition_sql, negated_condition_sql};
pub use condition::{Arg, Condition, SqlExpr};
pub use scope::Scope;
