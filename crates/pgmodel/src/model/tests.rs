use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

use crate::error::{ModelForm, OrmError};
use crate::types::ColumnType;
use crate::{Column, Model, ModelSchema, Value, values};

crate::model! {
    struct User in "users" {
        id: Column::keyed("_id")
            .column_type(ColumnType::Uuid)
            .default_with(|| Uuid::new_v4().into())
            .primary_key(),
        name: Column::new().default_value("test"),
        email: Column::new(),
    }
}

crate::model! {
    struct Post {
        id: Column::new().primary_key(),
        title: Column::new(),
    }
}

crate::model! {
    struct Named {
        id: Column::keyed("_id").primary_key(),
        name: Column::new(),
    }
}

crate::model! {
    struct Person extends Named {
        name: Column::keyed("full_name"),
        age: Column::new(),
    }
}

static CALLS: AtomicUsize = AtomicUsize::new(0);

crate::model! {
    struct Counted {
        seq: Column::new().default_with(|| {
            Value::from(CALLS.fetch_add(1, Ordering::SeqCst) as i64 + 100)
        }),
    }
}

#[test]
fn test_column_names_and_table() {
    let schema = User::schema();
    assert_eq!(schema.tablename(), "users");
    assert_eq!(schema.column_names(), vec!["_id", "name", "email"]);
    assert_eq!(schema.primary_keys(), vec!["_id"]);
}

#[test]
fn test_default_tablename() {
    assert_eq!(Post::schema().tablename(), "posts");
    assert_eq!(Post::schema().column_names(), vec!["id", "title"]);
}

#[test]
fn test_attr_name_for_column() {
    let schema = User::schema();
    assert_eq!(schema.attr_name_for_column("_id").unwrap(), "id");
    assert_eq!(schema.attr_name_for_column("id").unwrap(), "id");
    assert_eq!(schema.attr_name_for_column("name").unwrap(), "name");
    assert!(schema.attr_name_for_column("nope").unwrap_err().is_column_not_found());
}

#[test]
fn test_ensured_column_name() {
    let schema = User::schema();
    assert_eq!(schema.ensured_column_name("id").unwrap(), "_id");
    assert_eq!(schema.ensured_column_name("_id").unwrap(), "_id");
    assert!(matches!(
        schema.ensured_column_name("missing"),
        Err(OrmError::ColumnNotFound(ref n)) if n == "missing"
    ));
}

#[test]
fn test_key_and_attr_share_a_slot() {
    let by_key = User::from_values(values! { "_id" => 123, "name" => "a" });
    let by_attr = User::from_values(values! { "id" => 456 });

    assert_eq!(by_key.get("id").unwrap(), &Value::Int(123));
    assert_eq!(by_key.get("_id").unwrap(), &Value::Int(123));
    assert_eq!(by_attr.get("_id").unwrap(), &Value::Int(456));

    let mut user = by_attr.clone();
    user.set("_id", Value::Int(789));
    assert_eq!(user.get("id").unwrap(), &Value::Int(789));
}

#[test]
fn test_default_is_materialized_once() {
    let user = User::new();
    let first = user.get("id").unwrap().clone();
    let second = user.get("id").unwrap().clone();
    assert!(first.as_uuid().is_some());
    assert_eq!(first, second);

    assert_eq!(user.get("name").unwrap(), &Value::from("test"));
    assert_eq!(user.get("email").unwrap(), &Value::Null);
}

#[test]
fn test_factory_runs_per_instance_not_per_read() {
    let a = Counted::new();
    let b = Counted::new();
    let before = CALLS.load(Ordering::SeqCst);

    let a1 = a.get("seq").unwrap().clone();
    let a2 = a.get("seq").unwrap().clone();
    let b1 = b.get("seq").unwrap().clone();

    assert_eq!(a1, a2);
    assert_ne!(a1, b1);
    assert_eq!(CALLS.load(Ordering::SeqCst) - before, 2);
}

#[test]
fn test_explicit_null_is_kept() {
    let user = User::new().with("name", Value::Null);
    assert_eq!(user.get("name").unwrap(), &Value::Null);
}

#[test]
fn test_column_descriptor_get_set() {
    let schema = User::schema();
    let col = schema.column("email").unwrap();
    let mut user = User::new();

    assert!(!user.slots().is_filled(2));
    assert_eq!(col.get(&user), &Value::Null);
    assert!(user.slots().is_filled(2));

    col.set(&mut user, Value::from("x@example.com"));
    assert_eq!(col.get(&user), &Value::from("x@example.com"));
}

#[test]
fn test_inherited_columns_follow_own_and_are_shadowed() {
    let schema = Person::schema();
    assert_eq!(schema.column_names(), vec!["full_name", "age", "_id"]);
    assert_eq!(schema.primary_keys(), vec!["_id"]);
    assert_eq!(schema.tablename(), "persons");

    // the base keeps its own declaration
    assert_eq!(Named::schema().column_names(), vec!["_id", "name"]);
}

#[test]
fn test_unknown_names_become_extras() {
    let user = User::new().with("_id", 1).with("nickname", "bob");
    assert_eq!(user.get("nickname").unwrap(), &Value::from("bob"));
    assert!(user.get("missing").unwrap_err().is_column_not_found());
}

#[test]
fn test_describe() {
    let user = User::new()
        .with("id", 123)
        .with("email", "mail@example.com")
        .with("nickname", "bob");
    assert_eq!(
        user.to_string(),
        "User(id=123, name='test', email='mail@example.com', nickname='bob')"
    );
}

#[test]
fn test_validate() {
    assert!(User::schema().validate(ModelForm::Class).is_ok());

    let empty = ModelSchema::builder("Empty").build();
    let err = empty.validate(ModelForm::Instance).unwrap_err();
    assert!(matches!(
        err,
        OrmError::InvalidModel { form: ModelForm::Instance, ref model, .. } if model == "Empty"
    ));

    let dup = ModelSchema::builder("Dup")
        .column("a", Column::keyed("x"))
        .column("b", Column::keyed("x"))
        .build();
    assert!(dup.validate(ModelForm::Class).unwrap_err().is_invalid_model());

    let blank = ModelSchema::builder("Blank")
        .table("")
        .column("a", Column::new())
        .build();
    assert!(blank.validate(ModelForm::Class).is_err());
}

#[test]
fn test_redeclared_column_replaces_in_place() {
    let schema = ModelSchema::builder("Thing")
        .column("a", Column::new())
        .column("b", Column::new())
        .column("a", Column::keyed("aa"))
        .build();
    assert_eq!(schema.column_names(), vec!["aa", "b"]);
}
