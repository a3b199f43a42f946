//! Per-session query scope: condition lists plus the bound value list.

use crate::binder::Binder;
use crate::compiler::{condition_sql, negated_condition_sql};
use crate::condition::Condition;
use modelmap_core::{Dialect, Record, Result, Value, quote, resolve};
use std::marker::PhantomData;

/// A query-building session for one record type.
///
/// Owns the evolving condition lists and the bound value list. A scope
/// belongs to exactly one caller; compilation mutates the binder, so the
/// scope is not re-entrant.
pub struct Scope<'d, M: Record> {
    binder: Binder<'d>,
    where_conditions: Vec<Condition>,
    not_conditions: Vec<Condition>,
    table: Option<String>,
    group: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    _model: PhantomData<M>,
}

impl<'d, M: Record> Scope<'d, M> {
    /// Create a scope compiling for the given dialect.
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            binder: Binder::new(dialect),
            where_conditions: Vec::new(),
            not_conditions: Vec::new(),
            table: None,
            group: None,
            limit: None,
            offset: None,
            _model: PhantomData,
        }
    }

    /// Override the table name for this session.
    ///
    /// Takes precedence over both the record type's custom table name and
    /// the derived default.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    /// Add a condition, conjoined with AND.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.where_conditions.push(condition);
        self
    }

    /// Add a negated condition, conjoined with AND.
    pub fn not(mut self, condition: Condition) -> Self {
        self.not_conditions.push(condition);
        self
    }

    /// The dialect this scope compiles for.
    pub fn dialect(&self) -> &'d dyn Dialect {
        self.binder.dialect()
    }

    /// Append a parameter and return its placeholder token.
    pub fn add_param(&mut self, value: impl Into<Value>) -> String {
        self.binder.add(value.into())
    }

    /// The effective table name: session override first, then the record
    /// type's custom or derived name.
    pub fn table_name(&self) -> Result<String> {
        if let Some(table) = &self.table {
            return Ok(table.clone());
        }
        resolve::<M>().map(|s| s.default_table_name.clone())
    }

    /// The quoted effective table name.
    ///
    /// A session override containing a space (e.g. an aliased name) is
    /// returned as-is, unquoted.
    pub fn quoted_table_name(&self) -> Result<String> {
        if let Some(table) = &self.table {
            if table.contains(' ') {
                return Ok(table.clone());
            }
            return Ok(quote(self.binder.dialect(), table));
        }
        let schema = resolve::<M>()?;
        Ok(quote(self.binder.dialect(), &schema.default_table_name))
    }

    /// Compile one condition into a positive fragment against this
    /// session's binder. Prior fragments are unaffected by a failure.
    pub fn compile_where(&mut self, condition: &Condition) -> Result<String> {
        let schema = resolve::<M>()?;
        let quoted_table = self.quoted_table_name()?;
        condition_sql(&schema, &quoted_table, condition, &mut self.binder)
    }

    /// Compile one condition into its negated fragment.
    pub fn compile_not(&mut self, condition: &Condition) -> Result<String> {
        let schema = resolve::<M>()?;
        let quoted_table = self.quoted_table_name()?;
        negated_condition_sql(&schema, &quoted_table, condition, &mut self.binder)
    }

    /// Compile every accumulated condition into a combined ` WHERE ...`
    /// clause, or the empty string when nothing restricts the query.
    ///
    /// Empty fragments (empty collections) are skipped rather than
    /// conjoined.
    pub fn where_sql(&mut self) -> Result<String> {
        let schema = resolve::<M>()?;
        let quoted_table = self.quoted_table_name()?;

        let mut parts = Vec::new();
        for condition in &self.where_conditions {
            let fragment = condition_sql(&schema, &quoted_table, condition, &mut self.binder)?;
            if !fragment.is_empty() {
                parts.push(fragment);
            }
        }
        for condition in &self.not_conditions {
            let fragment =
                negated_condition_sql(&schema, &quoted_table, condition, &mut self.binder)?;
            if !fragment.is_empty() {
                parts.push(fragment);
            }
        }

        if parts.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!(" WHERE {}", parts.join(" AND ")))
        }
    }

    /// Group results by a column expression.
    pub fn group(mut self, column: impl Into<String>) -> Self {
        self.group = Some(column.into());
        self
    }

    /// Restrict the number of rows returned.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skip the first `n` rows.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// The ` GROUP BY ...` clause, or the empty string.
    pub fn group_sql(&self) -> String {
        match &self.group {
            Some(group) => format!(" GROUP BY {group}"),
            None => String::new(),
        }
    }

    /// The ` LIMIT n OFFSET m` clause (either part optional), or the
    /// empty string.
    pub fn limit_and_offset_sql(&self) -> String {
        let mut sql = String::new();
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        sql
    }

    /// The parameters bound so far, in order.
    pub fn vars(&self) -> &[Value] {
        self.binder.vars()
    }

    /// Consume the scope, yielding the bound parameter list.
    pub fn into_vars(self) -> Vec<Value> {
        self.binder.into_vars()
    }
}
