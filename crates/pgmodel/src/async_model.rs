//! Persistence operations for models.
//!
//! Every operation acquires one connection from the given
//! [`ConnectionProvider`] and releases it before returning.
//!
//! ```ignore
//! use pgmodel::{AsyncModel, Model, PoolManager, values};
//!
//! let db = PoolManager::from_env();
//! let user = User::new().with("name", "alice");
//! user.save(&db).await?;
//!
//! let found: Option<User> = User::get_one_model(&db, values! { "name" => "alice" }).await?;
//! ```

use std::future::Future;

use crate::client::GenericClient;
use crate::connection::ConnectionProvider;
use crate::error::{OrmError, OrmResult};
use crate::model::Model;
use crate::record::Record;
use crate::statement::{self, BuiltQuery, ClauseKind};
use crate::value::{Value, ValueMap};

/// Database operations available on every [`Model`].
pub trait AsyncModel: Model + Sized {
    /// Update the row matching this instance's primary keys, inserting it
    /// when no row matched.
    fn save<P: ConnectionProvider>(&self, db: &P) -> impl Future<Output = OrmResult<()>> + Send {
        async move {
            let update = statement::update(self, ValueMap::new())?.query()?;
            let conn = db.acquire().await?;
            let mut status = conn.execute(&update.sql, &update.args).await?;

            if status == "UPDATE 0" {
                tracing::debug!(
                    target: "pgmodel.statement",
                    table = self.model_schema().tablename(),
                    "no row updated, inserting"
                );
                let insert = statement::insert(self, ValueMap::new())?.query()?;
                status = conn.execute(&insert.sql, &insert.args).await?;
            }

            if !status.ends_with('1') {
                return Err(OrmError::ExecutionFailure(format!(
                    "Failed to insert or update: {}",
                    self.describe()
                )));
            }
            Ok(())
        }
    }

    /// Delete the row matching this instance's primary keys.
    fn delete<P: ConnectionProvider>(&self, db: &P) -> impl Future<Output = OrmResult<()>> + Send {
        async move {
            let stmt = statement::delete(self, ValueMap::new())?;
            // never run an unqualified DELETE for a single instance
            if stmt.values().clause(ClauseKind::Where).is_none() {
                return Err(OrmError::incomplete(format!(
                    "no primary key values to delete {}",
                    self.describe()
                )));
            }
            let query = stmt.query()?;
            let status = Self::execute(db, &query.sql, &query.args).await?;
            if !status.ends_with('1') {
                return Err(OrmError::ExecutionFailure(format!(
                    "Failed to delete: {}",
                    self.describe()
                )));
            }
            Ok(())
        }
    }

    /// Rows of this model's table, filtered by `filters` when non-empty.
    fn get_records<P: ConnectionProvider>(
        db: &P,
        filters: ValueMap,
    ) -> impl Future<Output = OrmResult<Vec<Record>>> + Send {
        async move {
            let query = select_query::<Self>(filters)?;
            let conn = db.acquire().await?;
            conn.fetch(&query.sql, &query.args).await
        }
    }

    /// Like [`get_records`](AsyncModel::get_records), hydrated into instances.
    fn get_models<P: ConnectionProvider>(
        db: &P,
        filters: ValueMap,
    ) -> impl Future<Output = OrmResult<Vec<Self>>> + Send {
        async move {
            let records = Self::get_records(db, filters).await?;
            Ok(records.iter().map(Self::from_record).collect())
        }
    }

    /// The first matching row, if any.
    fn get_one_record<P: ConnectionProvider>(
        db: &P,
        filters: ValueMap,
    ) -> impl Future<Output = OrmResult<Option<Record>>> + Send {
        async move {
            let query = select_query::<Self>(filters)?;
            let conn = db.acquire().await?;
            conn.fetch_one(&query.sql, &query.args).await
        }
    }

    fn get_one_model<P: ConnectionProvider>(
        db: &P,
        filters: ValueMap,
    ) -> impl Future<Output = OrmResult<Option<Self>>> + Send {
        async move {
            let record = Self::get_one_record(db, filters).await?;
            Ok(record.as_ref().map(Self::from_record))
        }
    }

    /// Run raw SQL on a freshly acquired connection and return its status.
    fn execute<P: ConnectionProvider>(
        db: &P,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = OrmResult<String>> + Send {
        async move {
            let conn = db.acquire().await?;
            conn.execute(sql, args).await
        }
    }
}

impl<M: Model> AsyncModel for M {}

fn select_query<M: Model>(filters: ValueMap) -> OrmResult<BuiltQuery> {
    let stmt = statement::select(M::schema())?;
    let stmt = if filters.is_empty() {
        stmt
    } else {
        stmt.r#where(filters)?
    };
    stmt.query()
}
