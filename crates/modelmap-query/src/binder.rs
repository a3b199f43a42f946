//! The bound parameter list for a query-building session.

use crate::condition::{Arg, SqlExpr};
use modelmap_core::{Dialect, Value, quote};

/// Ordered, append-only sink of literal values.
///
/// A value's 1-based position is its positional parameter identity; the
/// list is never reordered or deduplicated. Each session owns exactly one
/// binder and must not share it.
pub struct Binder<'d> {
    dialect: &'d dyn Dialect,
    vars: Vec<Value>,
}

impl<'d> Binder<'d> {
    /// Create an empty binder for the given dialect.
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            vars: Vec::new(),
        }
    }

    /// The dialect this binder renders placeholders for.
    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Quote an identifier (dotted names segment-by-segment).
    pub fn quote(&self, name: &str) -> String {
        quote(self.dialect, name)
    }

    /// Append one literal and return its placeholder token.
    ///
    /// The token reflects the sink's size at the time of the call, which
    /// keeps positions correct across independently compiled fragments.
    pub fn add(&mut self, value: Value) -> String {
        self.vars.push(value);
        self.dialect.placeholder(self.vars.len())
    }

    /// Bind an argument: a single value, a comma-joined placeholder run
    /// for a list, or a recursively expanded expression.
    pub fn add_arg(&mut self, arg: &Arg) -> String {
        match arg {
            Arg::Value(v) => self.add(v.clone()),
            Arg::List(values) => values
                .iter()
                .map(|v| self.add(v.clone()))
                .collect::<Vec<_>>()
                .join(","),
            Arg::Expr(expr) => self.add_expr(expr),
        }
    }

    /// Expand a raw SQL expression, replacing each `?` left to right with
    /// the binding of the next argument. Extra `?` with no argument are
    /// left in place.
    pub fn add_expr(&mut self, expr: &SqlExpr) -> String {
        self.expand(&expr.sql, &expr.args)
    }

    /// Expand `sql`, binding `args` into its `?` placeholders.
    pub fn expand(&mut self, sql: &str, args: &[Arg]) -> String {
        let mut out = sql.to_string();
        let mut cursor = 0;
        for arg in args {
            let Some(found) = out[cursor..].find('?') else {
                break;
            };
            let at = cursor + found;
            let token = self.add_arg(arg);
            out.replace_range(at..=at, &token);
            cursor = at + token.len();
        }
        out
    }

    /// The accumulated parameters, in binding order.
    pub fn vars(&self) -> &[Value] {
        &self.vars
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// True when nothing has been bound yet.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Consume the binder, yielding the parameter list.
    pub fn into_vars(self) -> Vec<Value> {
        self.vars
    }
}

impl std::fmt::Debug for Binder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder").field("vars", &self.vars).finish()
    }
}
