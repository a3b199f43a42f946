//! Naming conventions: column-name derivation and table pluralization.

use std::sync::atomic::{AtomicBool, Ordering};

static SINGULAR_TABLE: AtomicBool = AtomicBool::new(false);

/// Switch table naming to singular mode process-wide.
///
/// Must be configured before the first schema resolution: table names are
/// baked into cached schemas and never recomputed.
pub fn set_singular_table(on: bool) {
    SINGULAR_TABLE.store(on, Ordering::Relaxed);
}

/// Whether singular table naming is active.
pub fn singular_table() -> bool {
    SINGULAR_TABLE.load(Ordering::Relaxed)
}

/// Convert a type or field name to its database form.
///
/// Camel-case boundaries become underscores and the result is lowered:
/// `UserID` -> `user_id`, `HTTPStatus` -> `http_status`. Snake-case input
/// passes through unchanged, so the transform is idempotent.
pub fn to_db_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_ascii_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = i > 0
                && chars[i - 1].is_ascii_uppercase()
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev_lower || next_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Derive the default table name for a type name.
///
/// Pure form of the naming rule applied by the schema resolver: snake-case
/// the type name and pluralize unless singular mode is requested.
pub fn table_name_of(type_name: &str, singular: bool) -> String {
    let name = to_db_name(type_name);
    if singular { name } else { pluralize(&name) }
}

/// Pluralize an English noun with the rules table names actually hit.
pub fn pluralize(name: &str) -> String {
    match name {
        "person" => return "people".to_string(),
        "child" => return "children".to_string(),
        "man" => return "men".to_string(),
        "woman" => return "women".to_string(),
        _ => {}
    }

    if name.ends_with('s')
        || name.ends_with('x')
        || name.ends_with('z')
        || name.ends_with("ch")
        || name.ends_with("sh")
    {
        return format!("{name}es");
    }
    if let Some(stem) = name.strip_suffix('y') {
        let penultimate = stem.chars().last();
        if penultimate.is_some_and(|c| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')) {
            return format!("{stem}ies");
        }
    }
    format!("{name}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_name_snake_cases_camel_boundaries() {
        assert_eq!(to_db_name("User"), "user");
        assert_eq!(to_db_name("UserID"), "user_id");
        assert_eq!(to_db_name("CreatedAt"), "created_at");
        assert_eq!(to_db_name("HTTPStatus"), "http_status");
        assert_eq!(to_db_name("ID"), "id");
    }

    #[test]
    fn db_name_is_idempotent_on_snake_input() {
        assert_eq!(to_db_name("user_id"), "user_id");
        assert_eq!(to_db_name("email"), "email");
    }

    #[test]
    fn pluralize_basic_rules() {
        assert_eq!(pluralize("user"), "users");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("toy"), "toys");
        assert_eq!(pluralize("person"), "people");
    }

    #[test]
    fn table_name_respects_singular_mode() {
        assert_eq!(table_name_of("CreditCard", false), "credit_cards");
        assert_eq!(table_name_of("CreditCard", true), "credit_card");
    }
}
