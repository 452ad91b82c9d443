//! PostgreSQL column type tags.
//!
//! These only feed DDL generation (`CREATE TABLE ...`); statement values are
//! bound through [`Value`](crate::Value) regardless of the declared tag.

mod column_type;

pub use column_type::ColumnType;
