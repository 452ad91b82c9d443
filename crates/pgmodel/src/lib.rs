//! # pgmodel
//!
//! Declarative PostgreSQL models with a parameterized statement builder.
//!
//! Models declare their columns once; statements are built from either the
//! model type or an instance, and come out as SQL text with `$n` placeholders
//! plus the ordered arguments for them.
//!
//! ```ignore
//! use pgmodel::prelude::*;
//!
//! pgmodel::model! {
//!     pub struct User in "users" {
//!         id: Column::keyed("_id").default_with(|| uuid::Uuid::new_v4().into()).primary_key(),
//!         name: Column::new().default_value("test"),
//!         email: Column::new(),
//!     }
//! }
//!
//! let stmt = select(User::schema())?.r#where(values! { "name" => "alice" })?;
//! assert_eq!(
//!     stmt.query_string()?,
//!     "SELECT users._id, users.name, users.email\nFROM users\nWHERE users.name = $1",
//! );
//!
//! // Persistence through any ConnectionProvider
//! let db = PoolManager::from_env();
//! User::new().with("name", "alice").save(&db).await?;
//! let users: Vec<User> = User::get_models(&db, values! {}).await?;
//! ```

pub mod async_model;
pub mod client;
pub mod column;
pub mod config;
pub mod connection;
pub mod error;
pub mod model;
pub mod prelude;
pub mod record;
pub mod statement;
pub mod table;
pub mod types;
pub mod value;

pub use async_model::AsyncModel;
pub use client::{GenericClient, QueryType};
pub use column::{Column, ColumnDefault, DefaultFn};
pub use config::{ConnectionConfig, StatementConfig};
pub use connection::{ConnectionManager, ConnectionProvider};
pub use error::{ModelForm, OrmError, OrmResult};
pub use model::{
    FieldSlots, IntoModelRef, Model, ModelColumn, ModelRef, ModelSchema, ModelSchemaBuilder,
};
pub use record::Record;
pub use statement::{
    BuiltQuery, Statement, StatementKind, WhereOptions, delete, insert, select, update,
};
pub use table::{
    create_table, create_table_sql, drop_table, drop_table_sql, truncate_table,
    truncate_table_sql,
};
pub use types::ColumnType;
pub use value::{Interval, TimeTz, Value, ValueMap};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use connection::PoolManager;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config, create_pool_with_manager_config};
