mod common;

use common::{MockClient, MockProvider};
use pgmodel::types::ColumnType;
use pgmodel::{
    Column, Model, OrmResult, create_table, drop_table, model, truncate_table,
};

model! {
    struct Account in "accounts" {
        id: Column::keyed("_id").column_type(ColumnType::BigSerial).primary_key(),
        owner: Column::new().column_type(ColumnType::String(Some(40))),
        balance: Column::new().column_type(ColumnType::Money),
    }
}

#[tokio::test]
async fn table_helpers_run_their_ddl() -> OrmResult<()> {
    let db = MockProvider::new(MockClient::default());

    create_table(&db, Account::schema()).await?;
    truncate_table(&db, Account::schema(), true).await?;
    let status = drop_table(&db, Account::class(), false).await?;
    assert_eq!(status, "DROP 1");

    assert_eq!(
        db.client.sql(),
        vec![
            "CREATE TABLE IF NOT EXISTS accounts \
             (_id serial8 PRIMARY KEY, owner varchar(40), balance money)"
                .to_string(),
            "TRUNCATE TABLE accounts CASCADE".to_string(),
            "DROP TABLE IF EXISTS accounts".to_string(),
        ]
    );
    assert_eq!(db.acquired(), 3);
    Ok(())
}

#[tokio::test]
async fn table_helpers_reject_untyped_columns_before_acquiring() {
    let db = MockProvider::new(MockClient::default());
    let err = create_table(&db, common::User::schema()).await.unwrap_err();
    assert!(matches!(err, pgmodel::OrmError::MissingColumnType(ref key) if key == "_id"));
    assert_eq!(db.acquired(), 0);
}
