//! SQL dialect facade.
//!
//! The resolver and condition compiler consume dialects through this
//! narrow contract: identifier quoting and positional-placeholder syntax.
//! Everything else about a dialect lives with the driver layer.

/// Dialect contract consumed by the condition compiler.
pub trait Dialect: Send + Sync {
    /// Quote a single bare identifier per dialect rules.
    ///
    /// Implementations must escape embedded quote characters so the
    /// result is safe for any input string.
    fn quote_identifier(&self, name: &str) -> String;

    /// Placeholder token for the given 1-based parameter position.
    fn placeholder(&self, position: usize) -> String;
}

/// Quote an identifier, handling dotted names.
///
/// `one.two` is quoted segment-by-segment and rejoined with `.`, so a
/// table-qualified column becomes `"one"."two"`.
pub fn quote(dialect: &dyn Dialect, name: &str) -> String {
    if name.contains('.') {
        name.split('.')
            .map(|segment| dialect.quote_identifier(segment))
            .collect::<Vec<_>>()
            .join(".")
    } else {
        dialect.quote_identifier(name)
    }
}

/// PostgreSQL-style dialect: ANSI double-quoting, `$N` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn placeholder(&self, position: usize) -> String {
        format!("${position}")
    }
}

/// SQLite-style dialect: ANSI double-quoting, `?N` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn placeholder(&self, position: usize) -> String {
        format!("?{position}")
    }
}

/// MySQL-style dialect: backtick quoting, bare `?` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mysql;

impl Dialect for Mysql {
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn placeholder(&self, _position: usize) -> String {
        "?".to_string()
    }
}
