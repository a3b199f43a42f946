//! Condition shapes accepted by the compiler.

use modelmap_core::{Record, Result, Value, fields_of};
use std::collections::BTreeMap;

/// A raw SQL fragment with `?` placeholders and positional arguments.
///
/// Arguments may themselves be expressions; they expand recursively when
/// the fragment is bound.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlExpr {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Positional arguments, one per `?`.
    pub args: Vec<Arg>,
}

impl SqlExpr {
    /// Create an expression from SQL text and arguments.
    pub fn new(sql: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        Self {
            sql: sql.into(),
            args: args.into_iter().collect(),
        }
    }
}

/// A positional argument to a raw SQL condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A single literal, bound as one placeholder.
    Value(Value),
    /// A collection, expanded to a comma-joined placeholder run
    /// (supports `IN (?)`-style patterns).
    List(Vec<Value>),
    /// A nested expression, expanded recursively.
    Expr(Box<SqlExpr>),
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Value(Value::from(v))
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Value(Value::from(v))
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Value(Value::from(v))
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Value(Value::from(v))
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Value(Value::from(v))
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Value(Value::from(v))
    }
}

impl From<Vec<Value>> for Arg {
    fn from(v: Vec<Value>) -> Self {
        Arg::List(v)
    }
}

impl From<Vec<&str>> for Arg {
    fn from(v: Vec<&str>) -> Self {
        Arg::List(v.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<String>> for Arg {
    fn from(v: Vec<String>) -> Self {
        Arg::List(v.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<i32>> for Arg {
    fn from(v: Vec<i32>) -> Self {
        Arg::List(v.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<i64>> for Arg {
    fn from(v: Vec<i64>) -> Self {
        Arg::List(v.into_iter().map(Value::from).collect())
    }
}

impl From<SqlExpr> for Arg {
    fn from(v: SqlExpr) -> Self {
        Arg::Expr(Box::new(v))
    }
}

/// A condition to compile into a boolean SQL fragment.
///
/// Each shape has its own compilation rule; see the compiler module. An
/// empty primary-key collection compiles to the empty fragment ("no
/// restriction"), in both the positive and the negated form.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Raw SQL with `?` placeholders plus positional arguments.
    Sql {
        /// SQL text.
        sql: String,
        /// Positional arguments.
        args: Vec<Arg>,
    },
    /// Column/value pairs, conjoined with AND in key order.
    /// `Value::Null` is the null sentinel and compiles to `IS NULL`.
    Map(BTreeMap<String, Value>),
    /// A single column compared to a value or a collection.
    Column {
        /// Column name.
        column: String,
        /// Value; a list compiles to membership.
        value: Arg,
    },
    /// A scalar compared against the primary key column.
    PrimaryKey(Value),
    /// A collection of primary-key values; empty means no restriction.
    PrimaryKeys(Vec<Value>),
    /// Equality clauses captured from a record instance: column/value
    /// pairs of its non-blank, non-ignored fields in declaration order.
    Fields(Vec<(String, Value)>),
}

impl Condition {
    /// Raw SQL condition with `?` placeholders.
    pub fn sql<A: Into<Arg>>(sql: impl Into<String>, args: impl IntoIterator<Item = A>) -> Self {
        Condition::Sql {
            sql: sql.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Column/value mapping condition. Iteration order is sorted by key,
    /// so output is reproducible.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Condition::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Single-column condition; a list value compiles to membership.
    pub fn column(column: impl Into<String>, value: impl Into<Arg>) -> Self {
        Condition::Column {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Scalar primary-key condition.
    pub fn primary_key(value: impl Into<Value>) -> Self {
        Condition::PrimaryKey(value.into())
    }

    /// Primary-key collection condition.
    pub fn primary_keys<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Condition::PrimaryKeys(values.into_iter().map(Into::into).collect())
    }

    /// Use a record instance as an equality filter: every non-blank,
    /// non-ignored normal field becomes a clause, in declaration order.
    pub fn record<T: Record>(value: &T) -> Result<Self> {
        let snapshots = fields_of(value)?;
        let fields = snapshots
            .into_iter()
            .filter(|s| s.meta.is_normal && !s.meta.is_ignored && !s.is_blank)
            .map(|s| (s.meta.db_name.clone(), s.value))
            .collect();
        Ok(Condition::Fields(fields))
    }
}
