//! Schema resolution and the process-wide metadata cache.
//!
//! Resolution is a two-pass algorithm. Pass 1 walks the record's declared
//! fields in order, parsing annotations, flattening embedded records, and
//! recording relationship fields as pending. Pass 2 runs relationship
//! inference for the pending fields with full sibling visibility. Only the
//! completed schema is published to the cache; a failed resolution caches
//! nothing.
//!
//! The cache is shared, cross-session state keyed by `TypeId`. Racing
//! first-time resolutions of the same shape produce value-equal schemas;
//! the first publish wins and losers adopt it.

use crate::error::{Error, Result};
use crate::field::{FieldMeta, FieldSnapshot, find_field};
use crate::naming::{singular_table, table_name_of, to_db_name};
use crate::record::{FieldKind, Record, SchemaFn};
use crate::relation::{self, PendingRelation};
use crate::tag::{self, TagSettings};
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

/// Resolved schema description of a record shape.
///
/// Exactly one exists per distinct shape for the lifetime of the process;
/// it is immutable once published to the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    /// The record type's name.
    pub model_name: &'static str,
    /// Derived or custom table name.
    pub default_table_name: String,
    /// Resolved fields, declaration order; embedded sub-fields appear in
    /// place of their embedding field.
    pub fields: Vec<FieldMeta>,
    /// Indexes into `fields` of the primary key fields.
    pub primary_keys: Vec<usize>,
}

impl ModelSchema {
    /// Iterate the primary key fields.
    pub fn primary_fields(&self) -> impl Iterator<Item = &FieldMeta> {
        self.primary_keys.iter().map(|&i| &self.fields[i])
    }

    /// Look up a field by name, column name, or snake-case transform.
    pub fn field_by_name(&self, name: &str) -> Result<&FieldMeta> {
        find_field(name, &self.fields).ok_or_else(|| Error::FieldNotFound {
            model: self.model_name,
            field: name.to_string(),
        })
    }

    /// The single primary key field.
    ///
    /// With a composite key this is the field named `id`; a shape with no
    /// primary key at all fails with `NoPrimaryKey`.
    pub fn primary_key_field(&self) -> Result<&FieldMeta> {
        if self.primary_keys.is_empty() {
            return Err(Error::NoPrimaryKey {
                model: self.model_name,
            });
        }
        if self.primary_keys.len() > 1 {
            return self.field_by_name("id");
        }
        Ok(&self.fields[self.primary_keys[0]])
    }

    /// Column name of the primary key field.
    pub fn primary_key_column(&self) -> Result<&str> {
        self.primary_key_field().map(|f| f.db_name.as_str())
    }

    /// Whether the shape has a queryable column of this name.
    pub fn has_column(&self, column: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.is_normal && (f.name == column || f.db_name == column))
    }
}

/// Primary key column for a field list that is still being resolved.
pub(crate) fn primary_key_column_of(
    model: &'static str,
    fields: &[FieldMeta],
    primary_keys: &[usize],
) -> Result<String> {
    if primary_keys.is_empty() {
        return Err(Error::NoPrimaryKey { model });
    }
    if primary_keys.len() > 1 {
        return find_field("id", fields)
            .map(|f| f.db_name.clone())
            .ok_or_else(|| Error::FieldNotFound {
                model,
                field: "id".to_string(),
            });
    }
    Ok(fields[primary_keys[0]].db_name.clone())
}

static SCHEMAS: LazyLock<RwLock<HashMap<TypeId, Arc<ModelSchema>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

thread_local! {
    // Pass-1 skeletons of shapes currently being resolved on this thread.
    // Serves sibling data to mutually recursive relationship targets
    // without publishing anything partial.
    static RESOLVING: RefCell<HashMap<TypeId, Arc<ModelSchema>>> = RefCell::new(HashMap::new());
}

/// Resolve the schema of a record type.
///
/// Cached per shape: repeat calls return the same `Arc` without further
/// work. Errors abort the resolution entirely and cache nothing.
pub fn resolve<T: Record>() -> Result<Arc<ModelSchema>> {
    let key = TypeId::of::<T>();
    if let Some(schema) = SCHEMAS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(Arc::clone(schema));
    }
    if let Some(skeleton) = RESOLVING.with(|r| r.borrow().get(&key).cloned()) {
        return Ok(skeleton);
    }

    tracing::debug!(model = T::MODEL_NAME, "resolving record schema");

    let default_table_name = T::table_name()
        .map_or_else(|| table_name_of(T::MODEL_NAME, singular_table()), str::to_string);

    let mut fields: Vec<FieldMeta> = Vec::new();
    let mut primary_keys: Vec<usize> = Vec::new();
    let mut pending: Vec<PendingRelation> = Vec::new();

    for decl in T::declared_fields() {
        let mut tags = TagSettings::parse(decl.tag);

        if tags.has(tag::IGNORE) {
            // Excluded from querying, but recorded so row decoding can
            // still skip past it by name.
            let mut meta = FieldMeta::new(decl.name);
            meta.is_ignored = true;
            meta.db_name = tags
                .get(tag::COLUMN)
                .map_or_else(|| to_db_name(decl.name), str::to_string);
            meta.tags = tags;
            fields.push(meta);
            continue;
        }

        if let FieldKind::Embedded { target } = decl.kind {
            embed(decl.name, &tags, target, &mut fields, &mut primary_keys)?;
            continue;
        }
        if let FieldKind::Nested { target } = decl.kind {
            if tags.has(tag::EMBEDDED) {
                embed(decl.name, &tags, target, &mut fields, &mut primary_keys)?;
                continue;
            }
        }

        let mut meta = FieldMeta::new(decl.name);
        if tags.has(tag::PRIMARY_KEY) {
            meta.is_primary_key = true;
        }
        if tags.has(tag::DEFAULT) {
            meta.has_default_value = true;
        }
        if tags.has(tag::AUTO_INCREMENT) && !meta.is_primary_key {
            meta.has_default_value = true;
        }

        match decl.kind {
            FieldKind::Scalar | FieldKind::Time => meta.is_normal = true,
            FieldKind::Scanner { nested_tags } => {
                meta.is_scanner = true;
                meta.is_normal = true;
                for nested in nested_tags {
                    tags.merge(TagSettings::parse(nested));
                }
            }
            FieldKind::Nested { target } => pending.push(PendingRelation {
                field_index: fields.len(),
                is_collection: false,
                target,
            }),
            FieldKind::Collection { target } => pending.push(PendingRelation {
                field_index: fields.len(),
                is_collection: true,
                target,
            }),
            FieldKind::Embedded { .. } => unreachable!("embedded fields are flattened above"),
        }

        meta.db_name = tags
            .get(tag::COLUMN)
            .map_or_else(|| to_db_name(decl.name), str::to_string);
        meta.tags = tags;
        if meta.is_primary_key {
            primary_keys.push(fields.len());
        }
        fields.push(meta);
    }

    if primary_keys.is_empty() {
        if let Some(idx) = fields
            .iter()
            .position(|f| !f.is_ignored && f.matches_column("id"))
        {
            fields[idx].is_primary_key = true;
            primary_keys.push(idx);
        }
    }

    let skeleton = Arc::new(ModelSchema {
        model_name: T::MODEL_NAME,
        default_table_name: default_table_name.clone(),
        fields: fields.clone(),
        primary_keys: primary_keys.clone(),
    });
    RESOLVING.with(|r| r.borrow_mut().insert(key, skeleton));

    let inferred: Result<()> = pending.iter().try_for_each(|p| {
        relation::infer(
            &mut fields,
            &primary_keys,
            T::MODEL_NAME,
            &default_table_name,
            p,
        )
    });
    RESOLVING.with(|r| {
        r.borrow_mut().remove(&key);
    });
    inferred?;

    let schema = Arc::new(ModelSchema {
        model_name: T::MODEL_NAME,
        default_table_name,
        fields,
        primary_keys,
    });
    let mut cache = SCHEMAS.write().unwrap_or_else(PoisonError::into_inner);
    let winner = cache.entry(key).or_insert(schema);
    Ok(Arc::clone(winner))
}

/// Flatten an embedded record's fields into the owner, prefixing name
/// paths (and optionally column names) and promoting sub primary keys.
fn embed(
    name: &'static str,
    tags: &TagSettings,
    target: SchemaFn,
    fields: &mut Vec<FieldMeta>,
    primary_keys: &mut Vec<usize>,
) -> Result<()> {
    let sub = target()?;
    let prefix = tags.get(tag::EMBEDDED_PREFIX);
    for subfield in &sub.fields {
        let mut f = subfield.clone();
        f.names.insert(0, name.to_string());
        if let Some(p) = prefix {
            f.db_name = format!("{p}{}", f.db_name);
        }
        if f.is_primary_key {
            primary_keys.push(fields.len());
        }
        fields.push(f);
    }
    Ok(())
}

/// Snapshot the fields of a record instance.
///
/// Pairs each resolved field with the instance's current value and blank
/// flag; relationship fields snapshot as blank `Null`.
pub fn fields_of<T: Record>(record: &T) -> Result<Vec<FieldSnapshot>> {
    let schema = resolve::<T>()?;
    let values = record.record_values();
    let mut out = Vec::with_capacity(schema.fields.len());
    for meta in &schema.fields {
        let value = values
            .iter()
            .find(|(path, _)| {
                meta.names
                    .iter()
                    .map(String::as_str)
                    .eq(path.iter().copied())
            })
            .map_or(crate::value::Value::Null, |(_, v)| v.clone());
        let is_blank = value.is_blank();
        out.push(FieldSnapshot {
            meta: meta.clone(),
            value,
            is_blank,
        });
    }
    Ok(out)
}

/// The table name a record type maps to (custom or derived).
pub fn table_name<T: Record>() -> Result<String> {
    resolve::<T>().map(|s| s.default_table_name.clone())
}

/// Column name of a record type's primary key.
pub fn primary_key_column<T: Record>() -> Result<String> {
    let schema = resolve::<T>()?;
    schema.primary_key_column().map(str::to_string)
}

/// Whether a record type has a queryable column of this name.
pub fn has_column<T: Record>(column: &str) -> bool {
    resolve::<T>().map(|s| s.has_column(column)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldDecl, FieldPath};
    use crate::value::Value;

    struct Profile {
        id: i64,
        street: String,
    }

    impl Record for Profile {
        const MODEL_NAME: &'static str = "Profile";

        fn declared_fields() -> &'static [FieldDecl] {
            static FIELDS: &[FieldDecl] = &[
                FieldDecl {
                    name: "id",
                    tag: "primary_key",
                    kind: FieldKind::Scalar,
                },
                FieldDecl {
                    name: "street",
                    tag: "",
                    kind: FieldKind::Scalar,
                },
            ];
            FIELDS
        }

        fn record_values(&self) -> Vec<(FieldPath, Value)> {
            vec![
                (vec!["id"], Value::from(self.id)),
                (vec!["street"], Value::from(self.street.clone())),
            ]
        }
    }

    struct Account {
        id: i64,
        email: String,
        profile: Profile,
        secret: String,
    }

    impl Record for Account {
        const MODEL_NAME: &'static str = "Account";

        fn declared_fields() -> &'static [FieldDecl] {
            static FIELDS: &[FieldDecl] = &[
                FieldDecl {
                    name: "id",
                    tag: "primary_key",
                    kind: FieldKind::Scalar,
                },
                FieldDecl {
                    name: "email",
                    tag: "column:email_address",
                    kind: FieldKind::Scalar,
                },
                FieldDecl {
                    name: "profile",
                    tag: "embedded;embedded_prefix:profile_",
                    kind: FieldKind::Embedded {
                        target: resolve::<Profile>,
                    },
                },
                FieldDecl {
                    name: "secret",
                    tag: "-",
                    kind: FieldKind::Scalar,
                },
            ];
            FIELDS
        }

        fn record_values(&self) -> Vec<(FieldPath, Value)> {
            let mut values = vec![
                (vec!["id"], Value::from(self.id)),
                (vec!["email"], Value::from(self.email.clone())),
            ];
            values.extend(self.profile.record_values().into_iter().map(|(mut p, v)| {
                p.insert(0, "profile");
                (p, v)
            }));
            values.push((vec!["secret"], Value::from(self.secret.clone())));
            values
        }
    }

    struct Unkeyed {
        note: String,
    }

    impl Record for Unkeyed {
        const MODEL_NAME: &'static str = "Unkeyed";

        fn declared_fields() -> &'static [FieldDecl] {
            static FIELDS: &[FieldDecl] = &[FieldDecl {
                name: "note",
                tag: "",
                kind: FieldKind::Scalar,
            }];
            FIELDS
        }

        fn record_values(&self) -> Vec<(FieldPath, Value)> {
            vec![(vec!["note"], Value::from(self.note.clone()))]
        }
    }

    #[test]
    fn repeated_resolution_returns_the_cached_schema() {
        let first = resolve::<Profile>().unwrap();
        let second = resolve::<Profile>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn concurrent_resolutions_converge() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| resolve::<Account>().unwrap()))
            .collect();
        let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for pair in schemas.windows(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }

    #[test]
    fn table_name_is_snake_cased_and_pluralized() {
        let schema = resolve::<Profile>().unwrap();
        assert_eq!(schema.default_table_name, "profiles");
    }

    #[test]
    fn embedding_flattens_with_prefixed_name_paths() {
        let schema = resolve::<Account>().unwrap();
        let names: Vec<_> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "id", "street", "secret"]);

        let street = &schema.fields[3];
        assert_eq!(street.names, vec!["profile", "street"]);
        assert_eq!(street.db_name, "profile_street");
    }

    #[test]
    fn embedded_primary_keys_are_promoted() {
        let schema = resolve::<Account>().unwrap();
        // Account's own id plus Profile's embedded id.
        assert_eq!(schema.primary_keys.len(), 2);
        // Composite key resolves through the `id` field.
        assert_eq!(schema.primary_key_column().unwrap(), "id");
    }

    #[test]
    fn column_override_is_honored() {
        let schema = resolve::<Account>().unwrap();
        assert_eq!(schema.fields[1].db_name, "email_address");
        assert!(schema.has_column("email_address"));
        assert!(schema.has_column("email"));
    }

    #[test]
    fn ignored_fields_are_recorded_but_not_queryable() {
        let schema = resolve::<Account>().unwrap();
        let secret = schema.fields.last().unwrap();
        assert!(secret.is_ignored);
        assert!(!secret.is_normal);
        assert!(!schema.has_column("secret"));
    }

    struct Wallet {
        id: i64,
        balance: i64,
    }

    impl Record for Wallet {
        const MODEL_NAME: &'static str = "Wallet";

        fn declared_fields() -> &'static [FieldDecl] {
            static FIELDS: &[FieldDecl] = &[
                FieldDecl {
                    name: "id",
                    tag: "primary_key",
                    kind: FieldKind::Scalar,
                },
                FieldDecl {
                    name: "balance",
                    tag: "",
                    kind: FieldKind::Scanner {
                        nested_tags: &["column:balance_cents"],
                    },
                },
            ];
            FIELDS
        }

        fn record_values(&self) -> Vec<(FieldPath, Value)> {
            vec![
                (vec!["id"], Value::from(self.id)),
                (vec!["balance"], Value::from(self.balance)),
            ]
        }
    }

    #[test]
    fn scanner_nested_annotations_merge_upward() {
        let schema = resolve::<Wallet>().unwrap();
        let balance = schema.field_by_name("balance").unwrap();
        assert!(balance.is_scanner);
        assert!(balance.is_normal);
        assert_eq!(balance.db_name, "balance_cents");
    }

    #[test]
    fn missing_primary_key_fails_lookup_only() {
        let schema = resolve::<Unkeyed>().unwrap();
        assert_eq!(
            schema.primary_key_field().unwrap_err(),
            Error::NoPrimaryKey { model: "Unkeyed" }
        );
    }

    #[test]
    fn snapshots_pair_fields_with_values() {
        let account = Account {
            id: 7,
            email: "a@b.c".to_string(),
            profile: Profile {
                id: 0,
                street: "Main".to_string(),
            },
            secret: String::new(),
        };
        let snaps = fields_of(&account).unwrap();
        assert_eq!(snaps.len(), 5);
        assert_eq!(snaps[0].value, Value::BigInt(7));
        assert!(!snaps[0].is_blank);
        // Embedded street resolves through the name path.
        assert_eq!(snaps[3].value, Value::Text("Main".to_string()));
        // Blank detection: zero id and empty secret.
        assert!(snaps[2].is_blank);
        assert!(snaps[4].is_blank);
    }
}
