//! Compilation of conditions into boolean SQL fragments.
//!
//! Every literal routes through the session's `Binder`; the returned
//! fragments are parenthesized and safe to conjoin. An empty collection
//! condition compiles to the empty fragment in both polarities — callers
//! must treat it as "no restriction", not as always-false. The negated
//! form shares this behavior deliberately: `NOT IN ()` would be vacuously
//! true in SQL, and the empty fragment preserves that, at the cost of
//! surprisingly broad queries when an empty list sneaks in.

use crate::binder::Binder;
use crate::condition::{Arg, Condition};
use modelmap_core::{ModelSchema, Result, Value};

/// Compile a condition into a positive SQL fragment.
pub fn condition_sql(
    schema: &ModelSchema,
    quoted_table: &str,
    condition: &Condition,
    binder: &mut Binder,
) -> Result<String> {
    compile(schema, quoted_table, condition, binder, false)
}

/// Compile a condition into its negated SQL fragment.
///
/// Equality becomes `<>`, `IS NULL` becomes `IS NOT NULL`, membership
/// becomes `NOT IN`; raw SQL is wrapped as `NOT (...)`.
pub fn negated_condition_sql(
    schema: &ModelSchema,
    quoted_table: &str,
    condition: &Condition,
    binder: &mut Binder,
) -> Result<String> {
    compile(schema, quoted_table, condition, binder, true)
}

fn compile(
    schema: &ModelSchema,
    quoted_table: &str,
    condition: &Condition,
    binder: &mut Binder,
    negate: bool,
) -> Result<String> {
    let eq_op = if negate { "<>" } else { "=" };
    let in_op = if negate { "NOT IN" } else { "IN" };
    let null_op = if negate { "IS NOT NULL" } else { "IS NULL" };

    let sql = match condition {
        Condition::Sql { sql, args } => {
            let expanded = binder.expand(sql, args);
            if negate {
                format!("NOT ({expanded})")
            } else {
                format!("({expanded})")
            }
        }

        Condition::Map(entries) => {
            let mut clauses = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                clauses.push(column_clause(
                    quoted_table,
                    key,
                    value,
                    eq_op,
                    null_op,
                    binder,
                ));
            }
            clauses.join(" AND ")
        }

        Condition::Column { column, value } => match value {
            Arg::List(values) if values.is_empty() => String::new(),
            Arg::List(values) => {
                let quoted = binder.quote(column);
                let run = binder.add_arg(&Arg::List(values.clone()));
                format!("({quoted_table}.{quoted} {in_op} ({run}))")
            }
            Arg::Value(v) => column_clause(quoted_table, column, v, eq_op, null_op, binder),
            Arg::Expr(expr) => {
                let quoted = binder.quote(column);
                let expanded = binder.add_expr(expr);
                format!("({quoted_table}.{quoted} {eq_op} {expanded})")
            }
        },

        Condition::PrimaryKey(value) => {
            let pk = binder.quote(schema.primary_key_column()?);
            let token = binder.add(value.clone());
            format!("({quoted_table}.{pk} {eq_op} {token})")
        }

        Condition::PrimaryKeys(values) => {
            if values.is_empty() {
                return Ok(String::new());
            }
            let pk = binder.quote(schema.primary_key_column()?);
            let run = binder.add_arg(&Arg::List(values.clone()));
            format!("({quoted_table}.{pk} {in_op} ({run}))")
        }

        Condition::Fields(fields) => {
            let mut clauses = Vec::with_capacity(fields.len());
            for (column, value) in fields {
                clauses.push(column_clause(
                    quoted_table,
                    column,
                    value,
                    eq_op,
                    null_op,
                    binder,
                ));
            }
            clauses.join(" AND ")
        }
    };

    tracing::trace!(model = schema.model_name, fragment = %sql, "compiled condition");
    Ok(sql)
}

fn column_clause(
    quoted_table: &str,
    column: &str,
    value: &Value,
    eq_op: &str,
    null_op: &str,
    binder: &mut Binder,
) -> String {
    let quoted = binder.quote(column);
    if value.is_null() {
        format!("({quoted_table}.{quoted} {null_op})")
    } else {
        let token = binder.add(value.clone());
        format!("({quoted_table}.{quoted} {eq_op} {token})")
    }
}
