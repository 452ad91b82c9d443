//! Table DDL for model types.

use crate::client::GenericClient;
use crate::connection::ConnectionProvider;
use crate::error::OrmResult;
use crate::model::IntoModelRef;

/// `CREATE TABLE IF NOT EXISTS` with one definition per column. Every
/// column needs a type.
pub fn create_table_sql<'a>(model: impl IntoModelRef<'a>) -> OrmResult<String> {
    let model = model.into_model_ref();
    model.validate()?;
    let schema = model.schema();
    let defs = schema
        .columns()
        .iter()
        .map(|c| c.column().pg_column_string())
        .collect::<OrmResult<Vec<_>>>()?;
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        schema.tablename(),
        defs.join(", ")
    ))
}

pub fn drop_table_sql<'a>(model: impl IntoModelRef<'a>, cascade: bool) -> OrmResult<String> {
    table_command("DROP TABLE IF EXISTS", model, cascade)
}

pub fn truncate_table_sql<'a>(model: impl IntoModelRef<'a>, cascade: bool) -> OrmResult<String> {
    table_command("TRUNCATE TABLE", model, cascade)
}

fn table_command<'a>(
    command: &str,
    model: impl IntoModelRef<'a>,
    cascade: bool,
) -> OrmResult<String> {
    let model = model.into_model_ref();
    model.validate()?;
    let mut sql = format!("{command} {}", model.schema().tablename());
    if cascade {
        sql.push_str(" CASCADE");
    }
    Ok(sql)
}

/// Create the model's table if it does not exist.
pub async fn create_table<'a, P: ConnectionProvider>(
    db: &P,
    model: impl IntoModelRef<'a>,
) -> OrmResult<String> {
    let sql = create_table_sql(model)?;
    run(db, &sql).await
}

pub async fn drop_table<'a, P: ConnectionProvider>(
    db: &P,
    model: impl IntoModelRef<'a>,
    cascade: bool,
) -> OrmResult<String> {
    let sql = drop_table_sql(model, cascade)?;
    run(db, &sql).await
}

/// Empty the model's table, keeping its definition.
pub async fn truncate_table<'a, P: ConnectionProvider>(
    db: &P,
    model: impl IntoModelRef<'a>,
    cascade: bool,
) -> OrmResult<String> {
    let sql = truncate_table_sql(model, cascade)?;
    run(db, &sql).await
}

async fn run<P: ConnectionProvider>(db: &P, sql: &str) -> OrmResult<String> {
    let conn = db.acquire().await?;
    conn.execute(sql, &[]).await
}
