//! Statement building.
//!
//! A [`Statement`] turns a model (type or instance) and optional keyword
//! values into PostgreSQL text with `$n` placeholders plus the ordered
//! arguments for them.
//!
//! ```ignore
//! use pgmodel::{delete, insert, values, Model};
//!
//! let q = delete(User::schema(), values! { "id" => 123 })?;
//! assert_eq!(q.query_string()?, "DELETE FROM users\nWHERE users._id = $1");
//!
//! let q = insert(&user, values! {})?;
//! conn.execute(&q.query()?.sql, &q.query_args()).await?;
//! ```
//!
//! UPDATE and DELETE chain a WHERE clause over the primary keys on their
//! own. Replacing a WHERE clause later reuses the placeholder numbers of the
//! one it replaces.

mod builder;
mod values;

pub use builder::{Statement, WhereOptions};
pub use values::{
    BuiltQuery, ClauseKind, Fragment, PlaceholderCounter, StatementKind, StatementValues,
};

use crate::error::OrmResult;
use crate::model::IntoModelRef;
use crate::value::ValueMap;

/// `SELECT` every column of the model, with its FROM clause.
pub fn select<'a>(model: impl IntoModelRef<'a>) -> OrmResult<Statement<'a>> {
    Statement::new(model)?.select()
}

/// `INSERT` the instance's values, or `kwargs` when bound to a type.
pub fn insert<'a>(model: impl IntoModelRef<'a>, kwargs: ValueMap) -> OrmResult<Statement<'a>> {
    Statement::new(model)?.insert(kwargs)
}

/// `UPDATE` every column, qualified by the primary keys.
pub fn update<'a>(model: impl IntoModelRef<'a>, kwargs: ValueMap) -> OrmResult<Statement<'a>> {
    Statement::new(model)?.update(kwargs)
}

/// `DELETE`, qualified by the primary keys from the instance or `kwargs`
/// when possible.
pub fn delete<'a>(model: impl IntoModelRef<'a>, kwargs: ValueMap) -> OrmResult<Statement<'a>> {
    Statement::new(model)?.with_kwargs(kwargs).delete()
}
