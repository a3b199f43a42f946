//! Relationship inference from naming conventions and overrides.

use modelmap::{RelationKind, Record, resolve};

#[derive(Record)]
struct Email {
    #[record(primary_key)]
    id: i64,
    user_id: i64,
    email: String,
}

#[derive(Record)]
struct CreditCard {
    id: i64,
    number: String,
    user_id: i64,
}

#[derive(Record)]
struct Address {
    id: i64,
    street: String,
}

#[derive(Record)]
struct Language {
    id: i64,
    name: String,
}

#[derive(Record)]
struct Toy {
    id: i64,
    name: String,
    owner_id: i64,
    owner_type: String,
}

#[derive(Record)]
struct User {
    id: i64,
    name: String,
    emails: Vec<Email>,
    credit_card: CreditCard,
    billing_address: Address,
    billing_address_id: i64,
    #[record(many2many = "user_languages")]
    languages: Vec<Language>,
    #[record(polymorphic = "Owner")]
    toys: Vec<Toy>,
}

fn relationship_of<'a>(
    schema: &'a modelmap::ModelSchema,
    field: &str,
) -> &'a modelmap::Relationship {
    schema
        .field_by_name(field)
        .unwrap()
        .relationship
        .as_ref()
        .unwrap_or_else(|| panic!("no relationship on {field}"))
}

#[test]
fn collection_of_records_infers_has_many() {
    let schema = resolve::<User>().unwrap();
    let rel = relationship_of(&schema, "emails");
    assert_eq!(rel.kind, RelationKind::HasMany);
    assert_eq!(rel.foreign_db_names, vec!["user_id"]);
    assert_eq!(rel.association_foreign_db_names, vec!["id"]);
}

#[test]
fn nested_record_with_target_foreign_key_infers_has_one() {
    let schema = resolve::<User>().unwrap();
    let rel = relationship_of(&schema, "credit_card");
    assert_eq!(rel.kind, RelationKind::HasOne);
    assert_eq!(rel.foreign_db_names, vec!["user_id"]);
    assert_eq!(rel.association_foreign_db_names, vec!["id"]);
}

#[test]
fn nested_record_with_owner_foreign_key_infers_belongs_to() {
    let schema = resolve::<User>().unwrap();
    let rel = relationship_of(&schema, "billing_address");
    assert_eq!(rel.kind, RelationKind::BelongsTo);
    assert_eq!(rel.foreign_db_names, vec!["billing_address_id"]);
    assert_eq!(rel.association_foreign_db_names, vec!["id"]);

    // The owner-side column is flagged as the foreign key.
    let fk = schema.field_by_name("billing_address_id").unwrap();
    assert!(fk.is_foreign_key);
}

#[test]
fn many_to_many_derives_join_table_columns() {
    let schema = resolve::<User>().unwrap();
    let rel = relationship_of(&schema, "languages");
    assert_eq!(rel.kind, RelationKind::ManyToMany);
    assert_eq!(rel.join_table.as_deref(), Some("user_languages"));
    assert_eq!(rel.foreign_db_names, vec!["user_id"]);
    assert_eq!(rel.association_foreign_db_names, vec!["language_id"]);
    assert_eq!(rel.foreign_field_names, vec!["id"]);
    assert_eq!(rel.association_foreign_field_names, vec!["id"]);
}

#[test]
fn polymorphic_collection_targets_label_columns() {
    let schema = resolve::<User>().unwrap();
    let rel = relationship_of(&schema, "toys");
    assert_eq!(rel.kind, RelationKind::HasMany);
    assert_eq!(rel.foreign_db_names, vec!["owner_id"]);
    assert_eq!(rel.polymorphic_db_name.as_deref(), Some("owner_type"));
    // Defaults to the owner's table name when not overridden.
    assert_eq!(rel.polymorphic_value.as_deref(), Some("users"));
}

// Explicit override matching: the declared foreign key is matched by its
// snake-case transform.
#[derive(Record)]
struct Post {
    #[record(primary_key)]
    id: i64,
    author_id: i64,
    title: String,
}

#[derive(Record)]
struct Author {
    #[record(primary_key)]
    id: i64,
    name: String,
    #[record(foreign_key = "AuthorID")]
    posts: Vec<Post>,
}

#[test]
fn explicit_foreign_key_override_is_honored() {
    let schema = resolve::<Author>().unwrap();
    let rel = relationship_of(&schema, "posts");
    assert_eq!(rel.kind, RelationKind::HasMany);
    assert_eq!(rel.foreign_db_names, vec!["author_id"]);
    assert_eq!(rel.association_foreign_db_names, vec!["id"]);
}

// A collection whose target shape carries no matching foreign key
// degrades to a plain scalar, silently.
#[derive(Record)]
struct Tagging {
    #[record(primary_key)]
    id: i64,
    label: String,
}

#[derive(Record)]
struct Board {
    #[record(primary_key)]
    id: i64,
    taggings: Vec<Tagging>,
}

#[test]
fn unmatched_collection_degrades_to_scalar() {
    let schema = resolve::<Board>().unwrap();
    let field = schema.field_by_name("taggings").unwrap();
    assert!(field.relationship.is_none());
    assert!(field.is_normal);
}

// Mismatched override list lengths abort resolution.
#[derive(Record)]
struct Item {
    #[record(primary_key)]
    id: i64,
}

#[derive(Record)]
struct Cart {
    #[record(primary_key)]
    id: i64,
    #[record(foreign_key = "a,b", association_foreign_key = "x")]
    items: Vec<Item>,
}

#[test]
fn mismatched_override_lengths_fail_resolution() {
    let err = resolve::<Cart>().unwrap_err();
    assert!(matches!(err, modelmap::Error::InvalidRelationship { .. }));
    // Nothing partial was cached; resolution fails the same way again.
    assert!(resolve::<Cart>().is_err());
}

// Mutually recursive shapes resolve through the in-progress skeleton.
#[derive(Record)]
struct Parent {
    #[record(primary_key)]
    id: i64,
    children: Vec<Child>,
}

#[derive(Record)]
struct Child {
    #[record(primary_key)]
    id: i64,
    parent_id: i64,
    parent: Parent,
}

#[test]
fn mutual_recursion_resolves_both_sides() {
    let parent = resolve::<Parent>().unwrap();
    let rel = relationship_of(&parent, "children");
    assert_eq!(rel.kind, RelationKind::HasMany);
    assert_eq!(rel.foreign_db_names, vec!["parent_id"]);

    let child = resolve::<Child>().unwrap();
    let rel = relationship_of(&child, "parent");
    assert_eq!(rel.kind, RelationKind::BelongsTo);
    assert_eq!(rel.foreign_db_names, vec!["parent_id"]);
}
