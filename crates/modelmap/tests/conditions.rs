//! Condition compilation against a Postgres-style dialect.

use modelmap::{Condition, Postgres, Record, Scope, Value};

#[derive(Record)]
struct User {
    #[record(primary_key)]
    id: i64,
    age: i64,
    name: String,
}

#[derive(Record)]
struct Note {
    id: i64,
    body: String,
}

#[test]
fn plain_sql_condition() {
    let mut scope = Scope::<User>::new(&Postgres);
    let sql = scope
        .compile_where(&Condition::sql("name=?", ["gernest"]))
        .unwrap();
    assert_eq!(sql, "(name=$1)");
    assert_eq!(scope.vars(), &[Value::Text("gernest".to_string())]);
}

#[test]
fn sequential_conditions_share_one_parameter_list() {
    let mut scope = Scope::<User>::new(&Postgres);

    let sql = scope
        .compile_where(&Condition::sql("name=?", ["gernest"]))
        .unwrap();
    assert_eq!(sql, "(name=$1)");

    // IN: a list argument expands to a placeholder run.
    let sql = scope
        .compile_where(&Condition::sql(
            "name in (?)",
            [vec!["jinzhu", "jinzhu 2"]],
        ))
        .unwrap();
    assert_eq!(sql, "(name in ($2,$3))");

    // LIKE
    let sql = scope
        .compile_where(&Condition::sql("name LIKE ?", ["%jin%"]))
        .unwrap();
    assert_eq!(sql, "(name LIKE $4)");

    // AND with several placeholders
    let sql = scope
        .compile_where(&Condition::sql(
            "name = ? AND age >= ?",
            [Value::from("jinzhu"), Value::from(22_i64)],
        ))
        .unwrap();
    assert_eq!(sql, "(name = $5 AND age >= $6)");

    assert_eq!(scope.vars().len(), 6);
}

#[test]
fn map_condition_orders_keys_deterministically() {
    let mut scope = Scope::<User>::new(&Postgres);
    let sql = scope
        .compile_where(&Condition::map([
            ("name", Value::from("jinzhu")),
            ("age", Value::from(20_i64)),
        ]))
        .unwrap();
    assert_eq!(
        sql,
        "(\"users\".\"age\" = $1) AND (\"users\".\"name\" = $2)"
    );
}

#[test]
fn map_condition_null_compiles_to_is_null() {
    let mut scope = Scope::<User>::new(&Postgres);
    let sql = scope
        .compile_where(&Condition::map([
            ("name", Value::from("jinzhu")),
            ("age", Value::Null),
        ]))
        .unwrap();
    assert!(sql.contains("(\"users\".\"age\" IS NULL)"), "got {sql}");
    // Only the non-null entry binds a parameter.
    assert_eq!(scope.vars(), &[Value::Text("jinzhu".to_string())]);
}

#[test]
fn scalar_primary_key_condition() {
    let mut scope = Scope::<User>::new(&Postgres);
    let sql = scope.compile_where(&Condition::primary_key(10_i64)).unwrap();
    assert_eq!(sql, "(\"users\".\"id\" = $1)");
}

#[test]
fn primary_key_collection_condition() {
    let mut scope = Scope::<User>::new(&Postgres);
    let sql = scope
        .compile_where(&Condition::primary_keys([20_i64, 21, 22]))
        .unwrap();
    assert_eq!(sql, "(\"users\".\"id\" IN ($1,$2,$3))");
}

#[test]
fn empty_primary_key_collection_is_no_restriction() {
    let mut scope = Scope::<User>::new(&Postgres);
    let cond = Condition::primary_keys(Vec::<i64>::new());
    assert_eq!(scope.compile_where(&cond).unwrap(), "");
    assert_eq!(scope.compile_not(&cond).unwrap(), "");
    assert!(scope.vars().is_empty());
}

#[test]
fn record_condition_uses_non_blank_fields_in_declaration_order() {
    let mut scope = Scope::<User>::new(&Postgres);
    let user = User {
        id: 0,
        age: 20,
        name: "jinzhu".to_string(),
    };
    let sql = scope
        .compile_where(&Condition::record(&user).unwrap())
        .unwrap();
    assert_eq!(sql, "(\"users\".\"age\" = $1) AND (\"users\".\"name\" = $2)");
    assert_eq!(
        scope.vars(),
        &[Value::BigInt(20), Value::Text("jinzhu".to_string())]
    );
}

#[test]
fn negated_column_condition() {
    let mut scope = Scope::<User>::new(&Postgres);
    let sql = scope
        .compile_not(&Condition::column("name", "gernest"))
        .unwrap();
    assert_eq!(sql, "(\"users\".\"name\" <> $1)");
}

#[test]
fn negated_membership_condition() {
    let mut scope = Scope::<User>::new(&Postgres);
    let sql = scope
        .compile_not(&Condition::column("name", vec!["jinzhu", "jinzhu 2"]))
        .unwrap();
    assert_eq!(sql, "(\"users\".\"name\" NOT IN ($1,$2))");
}

#[test]
fn negated_primary_key_collection() {
    let mut scope = Scope::<User>::new(&Postgres);
    let sql = scope
        .compile_not(&Condition::primary_keys([1_i64, 2, 3]))
        .unwrap();
    assert_eq!(sql, "(\"users\".\"id\" NOT IN ($1,$2,$3))");
}

#[test]
fn negated_map_null_compiles_to_is_not_null() {
    let mut scope = Scope::<User>::new(&Postgres);
    let sql = scope
        .compile_not(&Condition::map([("age", Value::Null)]))
        .unwrap();
    assert_eq!(sql, "(\"users\".\"age\" IS NOT NULL)");
}

#[test]
fn record_condition_with_only_blank_fields_is_empty() {
    let mut scope = Scope::<User>::new(&Postgres);
    let user = User {
        id: 0,
        age: 0,
        name: String::new(),
    };
    let cond = Condition::record(&user).unwrap();
    assert_eq!(scope.compile_where(&cond).unwrap(), "");
    assert_eq!(scope.compile_not(&cond).unwrap(), "");
}

#[test]
fn combined_where_clause() {
    let mut scope = Scope::<User>::new(&Postgres)
        .filter(Condition::sql("name=?", ["gernest"]))
        .filter(Condition::primary_keys(Vec::<i64>::new()))
        .not(Condition::column("name", vec!["spam"]));
    let sql = scope.where_sql().unwrap();
    assert_eq!(
        sql,
        " WHERE (name=$1) AND (\"users\".\"name\" NOT IN ($2))"
    );
    assert_eq!(scope.vars().len(), 2);
}

#[test]
fn no_conditions_compile_to_no_clause() {
    let mut scope = Scope::<Note>::new(&Postgres);
    assert_eq!(scope.where_sql().unwrap(), "");
}

#[test]
fn append_parameter_returns_positional_tokens() {
    let mut scope = Scope::<User>::new(&Postgres);
    assert_eq!(scope.add_param(1_i64), "$1");
    assert_eq!(scope.add_param("two"), "$2");
    assert_eq!(
        scope.vars(),
        &[Value::BigInt(1), Value::Text("two".to_string())]
    );
}

#[test]
fn session_table_override_applies_to_fragments() {
    let mut scope = Scope::<User>::new(&Postgres).table("admins");
    let sql = scope.compile_where(&Condition::primary_key(1_i64)).unwrap();
    assert_eq!(sql, "(\"admins\".\"id\" = $1)");
}
