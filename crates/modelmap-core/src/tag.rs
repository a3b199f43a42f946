//! Per-field annotation parsing.
//!
//! Annotations are declarative strings attached to field declarations,
//! using `key:value;key` syntax, e.g. `"primary_key;column:user_name"`.
//! Keys are case-insensitive; they are normalized to upper case when the
//! string is parsed.

use std::collections::HashMap;

/// Annotation key marking a field as excluded from querying.
pub const IGNORE: &str = "-";
/// Annotation key marking a primary key field.
pub const PRIMARY_KEY: &str = "PRIMARY_KEY";
/// Annotation key marking a database-assigned default value.
pub const DEFAULT: &str = "DEFAULT";
/// Annotation key marking an auto-incremented column.
pub const AUTO_INCREMENT: &str = "AUTO_INCREMENT";
/// Annotation key overriding the column name.
pub const COLUMN: &str = "COLUMN";
/// Annotation key forcing embedded flattening of a nested record field.
pub const EMBEDDED: &str = "EMBEDDED";
/// Annotation key prefixing the column names of embedded sub-fields.
pub const EMBEDDED_PREFIX: &str = "EMBEDDED_PREFIX";
/// Annotation key declaring a many-to-many join table.
pub const MANY2MANY: &str = "MANY2MANY";
/// Annotation key overriding foreign-key columns (comma-separated).
pub const FOREIGN_KEY: &str = "FOREIGN_KEY";
/// Annotation key overriding association foreign-key columns.
pub const ASSOCIATION_FOREIGN_KEY: &str = "ASSOCIATION_FOREIGN_KEY";
/// Annotation key declaring polymorphic ownership under a label.
pub const POLYMORPHIC: &str = "POLYMORPHIC";
/// Annotation key overriding the stored polymorphic value.
pub const POLYMORPHIC_VALUE: &str = "POLYMORPHIC_VALUE";

/// Parsed per-field annotations, keyed case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSettings {
    settings: HashMap<String, String>,
}

impl TagSettings {
    /// Parse an annotation string.
    ///
    /// Entries are separated by `;`; an entry is either a bare flag
    /// (`primary_key`) or a `key:value` pair. Empty entries are skipped,
    /// so a trailing `;` is harmless.
    pub fn parse(tag: &str) -> Self {
        let mut settings = HashMap::new();
        for entry in tag.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            match entry.split_once(':') {
                Some((key, value)) => {
                    settings.insert(key.trim().to_uppercase(), value.trim().to_string());
                }
                None => {
                    settings.insert(entry.to_uppercase(), String::new());
                }
            }
        }
        Self { settings }
    }

    /// Check whether a key is present (flag or valued).
    pub fn has(&self, key: &str) -> bool {
        self.settings.contains_key(&key.to_uppercase())
    }

    /// Get the value for a key. A bare flag returns `None` from
    /// [`TagSettings::get`] even though [`TagSettings::has`] is true.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings
            .get(&key.to_uppercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Get a comma-separated value as a list of trimmed entries.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Merge another annotation set into this one, overwriting on
    /// conflict. Used to lift annotations declared on a scanner-backed
    /// shape up onto the field that carries it.
    pub fn merge(&mut self, other: TagSettings) {
        for (key, value) in other.settings {
            self.settings.insert(key, value);
        }
    }

    /// Number of parsed entries.
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// True when no annotations were declared.
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}
