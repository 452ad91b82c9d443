//! Client trait used to run built statements.

use std::future::poll_fn;
use std::pin::pin;
use std::sync::Arc;

use futures_core::Stream;
use tokio_postgres::RowStream;
use tokio_postgres::types::ToSql;

use crate::error::OrmResult;
use crate::record::Record;
use crate::value::Value;

const MAX_LOGGED_SQL: usize = 200;

/// Anything statements can run on: a client, a transaction or a pooled
/// connection.
///
/// `execute` reports a PostgreSQL-style command status such as `INSERT 0 1`
/// or `UPDATE 0`; `fetch` decodes every row into a [`Record`].
pub trait GenericClient: Send + Sync {
    /// Run a statement and return its command status.
    fn execute(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<String>> + Send;

    /// Run a query and return every row.
    fn fetch(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Record>>> + Send;

    /// Run a query and return the first row, if any.
    fn fetch_one(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Option<Record>>> + Send {
        async move { Ok(self.fetch(sql, args).await?.into_iter().next()) }
    }
}

/// The SQL operation a statement performs, from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    /// DDL or anything else.
    Other,
}

impl QueryType {
    pub fn from_sql(sql: &str) -> Self {
        match leading_keyword(sql).as_deref() {
            Some("SELECT") => QueryType::Select,
            Some("INSERT") => QueryType::Insert,
            Some("UPDATE") => QueryType::Update,
            Some("DELETE") => QueryType::Delete,
            _ => QueryType::Other,
        }
    }
}

fn leading_keyword(sql: &str) -> Option<String> {
    sql.split_whitespace().next().map(|w| {
        w.trim_end_matches(|c: char| !c.is_ascii_alphanumeric())
            .to_ascii_uppercase()
    })
}

/// Command status for a statement that affected `rows` rows, in the form
/// PostgreSQL reports it.
pub fn command_status(sql: &str, rows: u64) -> String {
    match QueryType::from_sql(sql) {
        QueryType::Insert => format!("INSERT 0 {rows}"),
        QueryType::Update => format!("UPDATE {rows}"),
        QueryType::Delete => format!("DELETE {rows}"),
        QueryType::Select => format!("SELECT {rows}"),
        QueryType::Other => match leading_keyword(sql) {
            Some(word) => format!("{word} {rows}"),
            None => rows.to_string(),
        },
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn log_sql(sql: &str, param_count: usize) {
    let shown = if sql.len() > MAX_LOGGED_SQL {
        format!("{}...", truncate_sql_bytes(sql, MAX_LOGGED_SQL))
    } else {
        sql.to_string()
    };
    tracing::debug!(
        target: "pgmodel.sql",
        query_type = ?QueryType::from_sql(sql),
        param_count,
        sql = %shown,
    );
}

fn params_ref(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// Decode only the first row of a result stream; the rest are dropped
/// unread.
async fn first_record(stream: RowStream) -> OrmResult<Option<Record>> {
    let mut stream = pin!(stream);
    match poll_fn(|cx| stream.as_mut().poll_next(cx)).await {
        Some(row) => Record::from_row(&row?).map(Some),
        None => Ok(None),
    }
}

impl GenericClient for tokio_postgres::Client {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<String> {
        log_sql(sql, args.len());
        let params = params_ref(args);
        let rows = tokio_postgres::Client::execute(self, sql, &params).await?;
        Ok(command_status(sql, rows))
    }

    async fn fetch(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Record>> {
        log_sql(sql, args.len());
        let params = params_ref(args);
        let rows = tokio_postgres::Client::query(self, sql, &params).await?;
        rows.iter().map(Record::from_row).collect()
    }

    async fn fetch_one(&self, sql: &str, args: &[Value]) -> OrmResult<Option<Record>> {
        log_sql(sql, args.len());
        let stream = tokio_postgres::Client::query_raw(self, sql, args.iter()).await?;
        first_record(stream).await
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<String> {
        log_sql(sql, args.len());
        let params = params_ref(args);
        let rows = tokio_postgres::Transaction::execute(self, sql, &params).await?;
        Ok(command_status(sql, rows))
    }

    async fn fetch(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Record>> {
        log_sql(sql, args.len());
        let params = params_ref(args);
        let rows = tokio_postgres::Transaction::query(self, sql, &params).await?;
        rows.iter().map(Record::from_row).collect()
    }

    async fn fetch_one(&self, sql: &str, args: &[Value]) -> OrmResult<Option<Record>> {
        log_sql(sql, args.len());
        let stream = tokio_postgres::Transaction::query_raw(self, sql, args.iter()).await?;
        first_record(stream).await
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<String> {
        GenericClient::execute(&**self, sql, args).await
    }

    async fn fetch(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Record>> {
        GenericClient::fetch(&**self, sql, args).await
    }

    async fn fetch_one(&self, sql: &str, args: &[Value]) -> OrmResult<Option<Record>> {
        GenericClient::fetch_one(&**self, sql, args).await
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::ClientWrapper {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<String> {
        GenericClient::execute(&**self, sql, args).await
    }

    async fn fetch(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Record>> {
        GenericClient::fetch(&**self, sql, args).await
    }

    async fn fetch_one(&self, sql: &str, args: &[Value]) -> OrmResult<Option<Record>> {
        GenericClient::fetch_one(&**self, sql, args).await
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Transaction<'_> {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<String> {
        GenericClient::execute(&**self, sql, args).await
    }

    async fn fetch(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Record>> {
        GenericClient::fetch(&**self, sql, args).await
    }

    async fn fetch_one(&self, sql: &str, args: &[Value]) -> OrmResult<Option<Record>> {
        GenericClient::fetch_one(&**self, sql, args).await
    }
}

// ===== Reference implementations =====

impl<C: GenericClient> GenericClient for &C {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<String> {
        (*self).execute(sql, args).await
    }

    async fn fetch(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Record>> {
        (*self).fetch(sql, args).await
    }

    async fn fetch_one(&self, sql: &str, args: &[Value]) -> OrmResult<Option<Record>> {
        (*self).fetch_one(sql, args).await
    }
}

impl<C: GenericClient> GenericClient for Arc<C> {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<String> {
        (**self).execute(sql, args).await
    }

    async fn fetch(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Record>> {
        (**self).fetch(sql, args).await
    }

    async fn fetch_one(&self, sql: &str, args: &[Value]) -> OrmResult<Option<Record>> {
        (**self).fetch_one(sql, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_from_sql() {
        assert_eq!(QueryType::from_sql("SELECT 1"), QueryType::Select);
        assert_eq!(QueryType::from_sql("  insert into t (a) VALUES ($1)"), QueryType::Insert);
        assert_eq!(QueryType::from_sql("UPDATE t SET (a) = ($1)"), QueryType::Update);
        assert_eq!(QueryType::from_sql("DELETE FROM t"), QueryType::Delete);
        assert_eq!(QueryType::from_sql("CREATE TABLE t ()"), QueryType::Other);
        assert_eq!(QueryType::from_sql(""), QueryType::Other);
    }

    #[test]
    fn test_command_status() {
        assert_eq!(command_status("INSERT INTO t (a) VALUES ($1)", 1), "INSERT 0 1");
        assert_eq!(command_status("UPDATE t SET (a) = ($1)\nWHERE t.a = $2", 0), "UPDATE 0");
        assert_eq!(command_status("DELETE FROM t", 3), "DELETE 3");
        assert_eq!(command_status("SELECT t.a\nFROM t", 2), "SELECT 2");
        assert_eq!(command_status("CREATE TABLE IF NOT EXISTS t (a text)", 0), "CREATE 0");
        assert_eq!(command_status("truncate table t", 0), "TRUNCATE 0");
    }

    #[test]
    fn test_truncate_sql_bytes_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("abc", 10), "abc");
        assert_eq!(truncate_sql_bytes("abcdef", 3), "abc");
        // 'é' is two bytes; cutting inside it backs off
        assert_eq!(truncate_sql_bytes("aé", 2), "a");
    }
}
