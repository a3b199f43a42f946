//! Foreign-key relationship inference.
//!
//! Relationships are derived from naming conventions, with explicit
//! annotation overrides taking precedence. Inference runs as the second
//! pass of schema resolution, once the owning shape's full field list
//! exists, because conventions consult sibling primary keys.
//!
//! Conventional keys are derived in column space: owner type `User` with
//! primary key `id` yields the candidate column `user_id` on the target
//! shape. Explicit overrides match by field name, column name, or the
//! snake-case transform of either.

use crate::error::{Error, Result};
use crate::field::{FieldMeta, find_field};
use crate::naming::to_db_name;
use crate::record::SchemaFn;
use crate::schema::primary_key_column_of;
use crate::tag;

/// The kind of an inferred relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Owner holds the "one"; the target carries the foreign key.
    HasOne,
    /// Owner holds the "one"; many targets carry the foreign key.
    HasMany,
    /// Owner carries the foreign key referencing the target's primary key.
    BelongsTo,
    /// Both sides referenced through a join table.
    ManyToMany,
}

impl RelationKind {
    /// Conventional lowercase name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            RelationKind::HasOne => "has_one",
            RelationKind::HasMany => "has_many",
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::ManyToMany => "many_to_many",
        }
    }
}

/// Resolved relationship metadata attached to a field.
///
/// Foreign names are the columns on the owned/"many" side; association
/// names are the columns on the owning side whose values they reference.
/// For many-to-many, the db-name lists carry the join-table column names.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Relationship kind.
    pub kind: RelationKind,
    /// Field names on the foreign side.
    pub foreign_field_names: Vec<String>,
    /// Column names on the foreign side.
    pub foreign_db_names: Vec<String>,
    /// Field names on the association (owning) side.
    pub association_foreign_field_names: Vec<String>,
    /// Column names on the association (owning) side.
    pub association_foreign_db_names: Vec<String>,
    /// Join table name, from the many2many annotation.
    pub join_table: Option<String>,
    /// Field on the target storing the owner label (polymorphic).
    pub polymorphic_type: Option<String>,
    /// Column on the target storing the owner label (polymorphic).
    pub polymorphic_db_name: Option<String>,
    /// Value stored in the polymorphic type column for this owner.
    pub polymorphic_value: Option<String>,
}

impl Relationship {
    fn new(kind: RelationKind) -> Self {
        Self {
            kind,
            foreign_field_names: Vec::new(),
            foreign_db_names: Vec::new(),
            association_foreign_field_names: Vec::new(),
            association_foreign_db_names: Vec::new(),
            join_table: None,
            polymorphic_type: None,
            polymorphic_db_name: None,
            polymorphic_value: None,
        }
    }
}

/// A relationship field recorded during pass 1, resolved in pass 2.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingRelation {
    /// Index of the field in the owner's resolved field list.
    pub field_index: usize,
    /// Collection-valued (has_many / many_to_many) vs. nested record
    /// (has_one / belongs_to).
    pub is_collection: bool,
    /// Schema of the related record type.
    pub target: SchemaFn,
}

/// Resolve one pending relationship field against its siblings.
///
/// On success the field either carries a `Relationship` or has degraded to
/// a normal scalar; errors abort the owning schema resolution.
pub(crate) fn infer(
    fields: &mut [FieldMeta],
    primary_keys: &[usize],
    model_name: &'static str,
    table_name: &str,
    pending: &PendingRelation,
) -> Result<()> {
    let target = (pending.target)()?;
    let idx = pending.field_index;
    let field_name = fields[idx].name.clone();
    let tags = fields[idx].tags.clone();
    let tag_fks = tags.get_list(tag::FOREIGN_KEY);
    let tag_afks = tags.get_list(tag::ASSOCIATION_FOREIGN_KEY);
    let owner_primary: Vec<(String, String)> = primary_keys
        .iter()
        .map(|&i| (fields[i].name.clone(), fields[i].db_name.clone()))
        .collect();

    if pending.is_collection {
        if let Some(join_table) = tags.get(tag::MANY2MANY) {
            let mut rel = Relationship::new(RelationKind::ManyToMany);
            rel.join_table = Some(join_table.to_string());

            let mut fks = tag_fks;
            if fks.is_empty() {
                fks = owner_primary.iter().map(|(_, db)| db.clone()).collect();
            }
            for fk in &fks {
                if let Some(f) = find_field(fk, fields) {
                    rel.foreign_field_names.push(f.db_name.clone());
                    rel.foreign_db_names
                        .push(format!("{}_{}", to_db_name(model_name), f.db_name));
                }
            }

            let mut afks = tag_afks;
            if afks.is_empty() {
                afks = target.primary_fields().map(|f| f.db_name.clone()).collect();
            }
            for name in &afks {
                let f = target.field_by_name(name)?;
                rel.association_foreign_field_names.push(f.db_name.clone());
                rel.association_foreign_db_names
                    .push(format!("{}_{}", to_db_name(target.model_name), f.db_name));
            }

            attach(fields, idx, rel);
            return Ok(());
        }

        // has_many: target carries `<owner>_<pk>`-style columns.
        let mut rel = Relationship::new(RelationKind::HasMany);
        let mut assoc_type = model_name.to_string();
        apply_polymorphic(&mut rel, &mut assoc_type, &tags, &target.fields, table_name);

        let fallback = || primary_key_column_of(model_name, fields, primary_keys);
        let (fks, afks) = derive_key_pairs(
            model_name,
            &field_name,
            &tag_fks,
            &tag_afks,
            &assoc_type,
            fields,
            &owner_primary,
            &fallback,
        )?;

        for (fk, afk) in fks.iter().zip(afks.iter()) {
            if let Some(foreign) = find_field(fk, &target.fields) {
                if let Some(assoc) = find_field(afk, fields) {
                    rel.association_foreign_field_names.push(assoc.name.clone());
                    rel.association_foreign_db_names.push(assoc.db_name.clone());
                    rel.foreign_field_names.push(foreign.name.clone());
                    rel.foreign_db_names.push(foreign.db_name.clone());
                }
            }
        }
        attach(fields, idx, rel);
        return Ok(());
    }

    // Nested record: try has_one first, fall back to belongs_to. The
    // polymorphic substitution survives into the fallback.
    let mut rel = Relationship::new(RelationKind::HasOne);
    let mut assoc_type = model_name.to_string();
    apply_polymorphic(&mut rel, &mut assoc_type, &tags, &target.fields, table_name);

    {
        let fallback = || primary_key_column_of(model_name, fields, primary_keys);
        let (fks, afks) = derive_key_pairs(
            model_name,
            &field_name,
            &tag_fks,
            &tag_afks,
            &assoc_type,
            fields,
            &owner_primary,
            &fallback,
        )?;

        for (fk, afk) in fks.iter().zip(afks.iter()) {
            if let Some(foreign) = find_field(fk, &target.fields) {
                if let Some(assoc) = find_field(afk, fields) {
                    rel.association_foreign_field_names.push(assoc.name.clone());
                    rel.association_foreign_db_names.push(assoc.db_name.clone());
                    rel.foreign_field_names.push(foreign.name.clone());
                    rel.foreign_db_names.push(foreign.db_name.clone());
                }
            }
        }
    }

    if !rel.foreign_field_names.is_empty() {
        attach(fields, idx, rel);
        return Ok(());
    }

    // belongs_to: the owner carries `<field>_<pk>` referencing the target.
    rel.kind = RelationKind::BelongsTo;
    let target_primary: Vec<(String, String)> = target
        .primary_fields()
        .map(|f| (f.name.clone(), f.db_name.clone()))
        .collect();
    let fallback = || target.primary_key_column().map(str::to_string);
    let (fks, afks) = derive_key_pairs(
        model_name,
        &field_name,
        &tag_fks,
        &tag_afks,
        &field_name,
        &target.fields,
        &target_primary,
        &fallback,
    )?;

    let mut owner_fk_indices = Vec::new();
    for (fk, afk) in fks.iter().zip(afks.iter()) {
        if let Some(fi) = fields.iter().position(|f| f.matches_column(fk)) {
            if let Some(assoc) = find_field(afk, &target.fields) {
                rel.association_foreign_field_names.push(assoc.name.clone());
                rel.association_foreign_db_names.push(assoc.db_name.clone());
                rel.foreign_field_names.push(fields[fi].name.clone());
                rel.foreign_db_names.push(fields[fi].db_name.clone());
                owner_fk_indices.push(fi);
            }
        }
    }
    if !rel.foreign_field_names.is_empty() {
        for fi in owner_fk_indices {
            fields[fi].is_foreign_key = true;
        }
    }
    attach(fields, idx, rel);
    Ok(())
}

/// Attach the relationship if at least one pair resolved; otherwise the
/// field degrades to a plain scalar, silently.
fn attach(fields: &mut [FieldMeta], idx: usize, rel: Relationship) {
    if rel.foreign_db_names.is_empty() {
        fields[idx].is_normal = true;
    } else {
        tracing::debug!(
            field = %fields[idx].name,
            kind = rel.kind.as_str(),
            "attached relationship"
        );
        fields[idx].relationship = Some(rel);
    }
}

/// Polymorphic ownership: a `polymorphic:Label` annotation redirects the
/// association type to the label when the target shape carries a
/// `<Label>Type` column. The stored value defaults to the owner's table
/// name unless overridden.
fn apply_polymorphic(
    rel: &mut Relationship,
    assoc_type: &mut String,
    tags: &tag::TagSettings,
    target_fields: &[FieldMeta],
    table_name: &str,
) {
    let Some(label) = tags.get(tag::POLYMORPHIC) else {
        return;
    };
    if let Some(ptype) = find_field(&format!("{label}Type"), target_fields) {
        *assoc_type = label.to_string();
        rel.polymorphic_type = Some(ptype.name.clone());
        rel.polymorphic_db_name = Some(ptype.db_name.clone());
        rel.polymorphic_value = Some(
            tags.get(tag::POLYMORPHIC_VALUE)
                .unwrap_or(table_name)
                .to_string(),
        );
    }
}

/// Derive the foreign-key / association-key column pairing.
///
/// The derivation is symmetric: either side may be declared explicitly and
/// the other is generated from it. With neither declared, one pair per
/// association-side primary key is generated as `<prefix>_<key>`. With
/// only foreign keys declared, association keys are recovered by stripping
/// the prefix; a single unmatched foreign key falls back to the
/// association side's primary key column. Explicit lists of mismatched
/// lengths fail fast.
#[allow(clippy::too_many_arguments)]
fn derive_key_pairs(
    model: &'static str,
    field_name: &str,
    tag_fks: &[String],
    tag_afks: &[String],
    prefix: &str,
    assoc_fields: &[FieldMeta],
    assoc_primary: &[(String, String)],
    fallback_pk: &dyn Fn() -> Result<String>,
) -> Result<(Vec<String>, Vec<String>)> {
    let prefix_snake = format!("{}_", to_db_name(prefix));

    if tag_fks.is_empty() {
        let mut fks = Vec::new();
        let mut afks = Vec::new();
        if tag_afks.is_empty() {
            for (name, _) in assoc_primary {
                fks.push(format!("{prefix_snake}{name}"));
                afks.push(name.clone());
            }
        } else {
            for afk in tag_afks {
                if let Some(f) = find_field(afk, assoc_fields) {
                    fks.push(format!("{}{}", prefix_snake, f.name));
                    afks.push(f.name.clone());
                }
            }
        }
        return Ok((fks, afks));
    }

    if tag_afks.is_empty() {
        let mut afks = Vec::new();
        for fk in tag_fks {
            let normalized = to_db_name(fk);
            if let Some(stripped) = normalized.strip_prefix(&prefix_snake) {
                if find_field(stripped, assoc_fields).is_some() {
                    afks.push(stripped.to_string());
                }
            }
        }
        if afks.is_empty() && tag_fks.len() == 1 {
            afks.push(fallback_pk()?);
        }
        return Ok((tag_fks.to_vec(), afks));
    }

    if tag_fks.len() != tag_afks.len() {
        return Err(Error::InvalidRelationship {
            model,
            field: field_name.to_string(),
            message: "foreign keys should have same length".to_string(),
        });
    }
    Ok((tag_fks.to_vec(), tag_afks.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> FieldMeta {
        let mut f = FieldMeta::new(name);
        f.db_name = to_db_name(name);
        f.is_normal = true;
        f
    }

    fn no_fallback() -> Result<String> {
        Err(Error::NoPrimaryKey { model: "Test" })
    }

    #[test]
    fn derives_conventional_pair_from_primary_keys() {
        let assoc_fields = vec![field("id"), field("name")];
        let primary = vec![("id".to_string(), "id".to_string())];
        let (fks, afks) = derive_key_pairs(
            "User",
            "emails",
            &[],
            &[],
            "User",
            &assoc_fields,
            &primary,
            &no_fallback,
        )
        .unwrap();
        assert_eq!(fks, vec!["user_id"]);
        assert_eq!(afks, vec!["id"]);
    }

    #[test]
    fn recovers_association_keys_by_stripping_prefix() {
        let assoc_fields = vec![field("id")];
        let (fks, afks) = derive_key_pairs(
            "User",
            "emails",
            &["UserID".to_string()],
            &[],
            "User",
            &assoc_fields,
            &[],
            &no_fallback,
        )
        .unwrap();
        assert_eq!(fks, vec!["UserID"]);
        assert_eq!(afks, vec!["id"]);
    }

    #[test]
    fn single_unmatched_foreign_key_falls_back_to_primary() {
        let (fks, afks) = derive_key_pairs(
            "User",
            "emails",
            &["owner_ref".to_string()],
            &[],
            "User",
            &[],
            &[],
            &(|| Ok("id".to_string())),
        )
        .unwrap();
        assert_eq!(fks, vec!["owner_ref"]);
        assert_eq!(afks, vec!["id"]);
    }

    #[test]
    fn mismatched_explicit_lists_fail_fast() {
        let err = derive_key_pairs(
            "User",
            "emails",
            &["a".to_string(), "b".to_string()],
            &["x".to_string()],
            "User",
            &[],
            &[],
            &no_fallback,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRelationship { .. }));
    }

    #[test]
    fn explicit_lists_of_equal_length_pass_through() {
        let (fks, afks) = derive_key_pairs(
            "User",
            "emails",
            &["a".to_string()],
            &["x".to_string()],
            "User",
            &[],
            &[],
            &no_fallback,
        )
        .unwrap();
        assert_eq!(fks, vec!["a"]);
        assert_eq!(afks, vec!["x"]);
    }
}
