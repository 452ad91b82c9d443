mod common;

use common::{MockClient, MockProvider, User, user_row};
use futures_util::future::join_all;
use pgmodel::{AsyncModel, Column, Model, OrmError, OrmResult, Value, values};

fn saved_user() -> User {
    User::from_values(values! {
        "id" => 123,
        "name" => "name",
        "email" => "mail@example.com",
    })
}

#[tokio::test]
async fn save_updates_existing_row() -> OrmResult<()> {
    let db = MockProvider::new(MockClient::default().with_statuses(["UPDATE 1"]));
    saved_user().save(&db).await?;

    let calls = db.client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        "UPDATE users SET (_id, name, email) = ($1, $2, $3)\nWHERE users._id = $4"
    );
    assert_eq!(
        calls[0].1,
        vec![
            Value::Int(123),
            Value::from("name"),
            Value::from("mail@example.com"),
            Value::Int(123),
        ]
    );
    assert_eq!(db.acquired(), 1);
    Ok(())
}

#[tokio::test]
async fn save_inserts_when_nothing_was_updated() -> OrmResult<()> {
    let db = MockProvider::new(MockClient::default().with_statuses(["UPDATE 0", "INSERT 0 1"]));
    saved_user().save(&db).await?;

    assert_eq!(
        db.client.sql(),
        vec![
            "UPDATE users SET (_id, name, email) = ($1, $2, $3)\nWHERE users._id = $4".to_string(),
            "INSERT INTO users (_id, name, email) VALUES ($1, $2, $3)".to_string(),
        ]
    );
    assert_eq!(
        db.client.calls()[1].1,
        vec![Value::Int(123), Value::from("name"), Value::from("mail@example.com")]
    );
    Ok(())
}

#[tokio::test]
async fn save_reports_failed_insert() {
    let db = MockProvider::new(MockClient::default().with_statuses(["UPDATE 0", "INSERT 0 0"]));
    let err = saved_user().save(&db).await.unwrap_err();
    assert!(err.is_execution_failure());
    assert_eq!(
        err.to_string(),
        "Execution failure: Failed to insert or update: \
         User(id=123, name='name', email='mail@example.com')"
    );
}

#[tokio::test]
async fn save_new_instance_keeps_generated_key() -> OrmResult<()> {
    let db = MockProvider::new(MockClient::default().with_statuses(["UPDATE 0", "INSERT 0 1"]));
    let user = User::new().with("name", "alice");
    user.save(&db).await?;

    let calls = db.client.calls();
    let id = user.get("id")?.clone();
    assert!(id.as_uuid().is_some());
    // both statements bound the same generated id
    assert_eq!(calls[0].1[3], id);
    assert_eq!(calls[1].1[0], id);
    Ok(())
}

#[tokio::test]
async fn delete_by_primary_key() -> OrmResult<()> {
    let db = MockProvider::new(MockClient::default().with_statuses(["DELETE 1"]));
    saved_user().delete(&db).await?;

    let calls = db.client.calls();
    assert_eq!(calls[0].0, "DELETE FROM users\nWHERE users._id = $1");
    assert_eq!(calls[0].1, vec![Value::Int(123)]);
    Ok(())
}

#[tokio::test]
async fn delete_without_affected_rows_fails() {
    let db = MockProvider::new(MockClient::default().with_statuses(["DELETE 0"]));
    let err = saved_user().delete(&db).await.unwrap_err();
    assert!(matches!(
        err,
        OrmError::ExecutionFailure(ref msg) if msg.starts_with("Failed to delete: User(id=123")
    ));
}

#[tokio::test]
async fn delete_without_primary_key_is_refused() {
    pgmodel::model! {
        struct Note in "notes" {
            body: Column::new(),
        }
    }

    let db = MockProvider::new(MockClient::default());
    let err = Note::new().with("body", "x").delete(&db).await.unwrap_err();
    assert!(err.is_incomplete());
    assert_eq!(db.acquired(), 0);
}

#[tokio::test]
async fn get_records_without_filters() -> OrmResult<()> {
    let db = MockProvider::new(MockClient::default().with_rows(vec![
        user_row(1, "a", None),
        user_row(2, "b", Some("b@example.com")),
    ]));
    let records = User::get_records(&db, values! {}).await?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("email"), Some(&Value::from("b@example.com")));
    let calls = db.client.calls();
    assert_eq!(calls[0].0, "SELECT users._id, users.name, users.email\nFROM users");
    assert!(calls[0].1.is_empty());
    Ok(())
}

#[tokio::test]
async fn get_models_with_filters() -> OrmResult<()> {
    let db = MockProvider::new(MockClient::default().with_rows(vec![user_row(7, "bob", None)]));
    let users = User::get_models(&db, values! { "name" => "bob" }).await?;

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].get("id")?, &Value::Int(7));
    assert_eq!(users[0].get("_id")?, &Value::Int(7));
    // a fetched NULL stays NULL instead of picking up the default
    assert_eq!(users[0].get("email")?, &Value::Null);

    let calls = db.client.calls();
    assert_eq!(
        calls[0].0,
        "SELECT users._id, users.name, users.email\nFROM users\nWHERE users.name = $1"
    );
    assert_eq!(calls[0].1, vec![Value::from("bob")]);
    Ok(())
}

#[tokio::test]
async fn get_one_model() -> OrmResult<()> {
    let db = MockProvider::new(
        MockClient::default()
            .with_rows(vec![user_row(1, "a", None), user_row(2, "b", None)])
            .with_rows(vec![]),
    );

    let first = User::get_one_model(&db, values! { "id" => 1 }).await?;
    assert_eq!(first.map(|u| u.describe()).as_deref(), Some("User(id=1, name='a', email=NULL)"));

    let missing = User::get_one_record(&db, values! { "id" => 3 }).await?;
    assert!(missing.is_none());
    Ok(())
}

#[tokio::test]
async fn get_rejects_unknown_filter_before_acquiring() {
    let db = MockProvider::new(MockClient::default());
    let err = User::get_records(&db, values! { "nope" => 1 })
        .await
        .unwrap_err();
    assert!(err.is_disallowed_column());
    assert_eq!(db.acquired(), 0);
}

#[tokio::test]
async fn execute_raw_sql() -> OrmResult<()> {
    let db = MockProvider::new(MockClient::default());
    let status = User::execute(&db, "UPDATE users SET name = $1", &[Value::from("x")]).await?;
    assert_eq!(status, "UPDATE 1");
    Ok(())
}

#[tokio::test]
async fn concurrent_operations_each_acquire() -> OrmResult<()> {
    let db = MockProvider::new(MockClient::default());
    let users: Vec<User> = (1..=4)
        .map(|i| User::from_values(values! { "id" => i, "name" => format!("user{i}") }))
        .collect();

    let results = join_all(users.iter().map(|u| u.save(&db))).await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(db.acquired(), 4);
    assert_eq!(db.client.calls().len(), 4);
    Ok(())
}
