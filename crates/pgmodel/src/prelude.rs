//! Common imports for model code.
//!
//! ```ignore
//! use pgmodel::prelude::*;
//! ```

pub use crate::{
    AsyncModel, Column, ColumnType, ConnectionConfig, ConnectionManager, ConnectionProvider,
    GenericClient, Model, OrmError, OrmResult, Record, Statement, Value, ValueMap, delete,
    insert, select, update, values,
};

#[cfg(feature = "pool")]
pub use crate::{PoolManager, create_pool};
