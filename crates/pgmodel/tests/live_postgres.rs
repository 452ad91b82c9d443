//! Round trips against a real database. Skipped unless `DATABASE_URL` is set.

use pgmodel::types::ColumnType;
use pgmodel::{
    AsyncModel, Column, ConnectionConfig, ConnectionManager, ConnectionProvider, GenericClient,
    Interval, Model, OrmResult, Value, create_table, drop_table, model, values,
};

model! {
    struct LiveUser in "pgmodel_live_users" {
        id: Column::keyed("_id")
            .column_type(ColumnType::Uuid)
            .default_with(|| uuid::Uuid::new_v4().into())
            .primary_key(),
        name: Column::new().column_type(ColumnType::String(Some(100))),
        visits: Column::new().column_type(ColumnType::BigInteger).default_value(0),
    }
}

fn database_url(test: &str) -> Option<String> {
    dotenvy::dotenv().ok();
    match std::env::var("DATABASE_URL") {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            None
        }
    }
}

async fn model_round_trip<P: ConnectionProvider>(db: &P) -> OrmResult<()> {
    drop_table(db, LiveUser::schema(), true).await?;
    create_table(db, LiveUser::schema()).await?;

    let user = LiveUser::new().with("name", "alice");
    user.save(db).await?;

    let found = LiveUser::get_one_model(db, values! { "name" => "alice" })
        .await?
        .expect("saved user is found");
    assert_eq!(found.get("id")?, user.get("id")?);
    assert_eq!(found.get("visits")?, &Value::Int(0));

    // second save takes the UPDATE path
    let found = found.with("visits", 3);
    found.save(db).await?;
    let records = LiveUser::get_records(db, values! {}).await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("visits"), Some(&Value::Int(3)));

    found.delete(db).await?;
    assert!(found.delete(db).await.unwrap_err().is_execution_failure());
    assert!(LiveUser::get_models(db, values! {}).await?.is_empty());

    drop_table(db, LiveUser::schema(), false).await?;
    Ok(())
}

// One test so the two providers never share the table concurrently.
#[tokio::test]
async fn live_round_trips() -> OrmResult<()> {
    let Some(url) = database_url("live_round_trips") else {
        return Ok(());
    };

    let db = ConnectionManager::new(ConnectionConfig::new(url.as_str()).with_keep_alive(true));
    model_round_trip(&db).await?;
    let conn = db.acquire().await?;
    assert_eq!(conn.execute("SELECT 1", &[]).await?, "SELECT 1");

    // only the first row is decoded; the second has too many dimensions
    let sql = "SELECT a FROM (VALUES (ARRAY[1, 2]), (ARRAY[[1, 2], [3, 4]])) AS t(a)";
    let first = conn.fetch_one(sql, &[]).await?.expect("one row");
    assert_eq!(
        first.get("a"),
        Some(&Value::Array(vec![Value::Int(1), Value::Int(2)]))
    );
    assert!(conn.fetch(sql, &[]).await.is_err());

    let typed = conn
        .fetch_one(
            "SELECT 12.50::numeric AS n, '1 day'::interval AS i, point(1, 2) AS p",
            &[],
        )
        .await?
        .expect("one row");
    assert_eq!(typed.get("i"), Some(&Value::Interval(Interval::new(0, 1, 0))));
    assert!(matches!(typed.get("p"), Some(Value::Bytes(raw)) if raw.len() == 16));
    #[cfg(feature = "rust_decimal")]
    assert_eq!(typed.get("n").map(Value::to_string).as_deref(), Some("12.50"));
    drop(conn);
    db.close().await;

    #[cfg(feature = "pool")]
    {
        let pool = pgmodel::PoolManager::new(ConnectionConfig::new(url).with_max_pool_size(2));
        model_round_trip(&pool).await?;
        pool.close();
    }
    Ok(())
}
