//! Column descriptors.
//!
//! A [`Column`] describes one mapped model field: its database key, an
//! optional type tag for DDL, a default, and whether it is part of the
//! primary key. Descriptors are registered on a [`ModelSchema`](crate::ModelSchema),
//! which resolves unset keys to the attribute name.

use std::fmt;
use std::sync::Arc;

use crate::error::{OrmError, OrmResult};
use crate::types::ColumnType;
use crate::value::Value;

/// Zero-argument default factory.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// How a column produces its value when none has been set.
#[derive(Clone, Default)]
pub enum ColumnDefault {
    /// Reads as NULL.
    #[default]
    None,
    /// A literal value.
    Value(Value),
    /// Computed by calling the factory.
    Factory(DefaultFn),
}

impl ColumnDefault {
    /// Produce the default value. Factories are invoked on every call; callers
    /// cache the result per instance.
    pub fn resolve(&self) -> Value {
        match self {
            ColumnDefault::None => Value::Null,
            ColumnDefault::Value(v) => v.clone(),
            ColumnDefault::Factory(f) => f(),
        }
    }
}

impl fmt::Debug for ColumnDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnDefault::None => f.write_str("NULL"),
            ColumnDefault::Value(v) => f.write_str(&v.repr()),
            ColumnDefault::Factory(_) => f.write_str("<fn>"),
        }
    }
}

/// A column descriptor.
///
/// ```ignore
/// use pgmodel::{Column, ColumnType};
///
/// let id = Column::keyed("_id")
///     .column_type(ColumnType::Uuid)
///     .default_with(|| uuid::Uuid::new_v4().into())
///     .primary_key();
/// ```
#[derive(Clone, Default)]
pub struct Column {
    key: Option<String>,
    column_type: Option<ColumnType>,
    default: ColumnDefault,
    primary_key: bool,
}

impl Column {
    pub fn new() -> Self {
        Self::default()
    }

    /// A column whose database key differs from its attribute name.
    pub fn keyed(key: impl Into<String>) -> Self {
        Self::new().key(key)
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = ColumnDefault::Value(value.into());
        self
    }

    pub fn default_with<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = ColumnDefault::Factory(Arc::new(factory));
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn get_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn get_type(&self) -> Option<&ColumnType> {
        self.column_type.as_ref()
    }

    pub fn get_default(&self) -> &ColumnDefault {
        &self.default
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Fill in the key if none was declared.
    pub(crate) fn ensure_key(&mut self, attr: &str) {
        if self.key.is_none() {
            self.key = Some(attr.to_string());
        }
    }

    /// Render `"<key> <type>[ PRIMARY KEY]"` for `CREATE TABLE`.
    pub fn pg_column_string(&self) -> OrmResult<String> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| OrmError::incomplete("column key is not set"))?;
        let ty = self
            .column_type
            .as_ref()
            .ok_or_else(|| OrmError::MissingColumnType(key.to_string()))?;
        let mut out = format!("{key} {ty}");
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        Ok(out)
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key.as_deref().map_or("None".to_string(), |k| format!("'{k}'"));
        let ty = self
            .column_type
            .as_ref()
            .map_or("None".to_string(), ColumnType::pg_type_string);
        write!(
            f,
            "Column(key={key}, default={:?}, primary_key={}, type={ty})",
            self.default, self.primary_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pg_column_string_renders_primary_key() {
        let col = Column::keyed("_id").column_type(ColumnType::Uuid).primary_key();
        assert_eq!(col.pg_column_string().unwrap(), "_id uuid PRIMARY KEY");

        let col = Column::keyed("name").column_type(ColumnType::String(Some(40)));
        assert_eq!(col.pg_column_string().unwrap(), "name varchar(40)");
    }

    #[test]
    fn pg_column_string_requires_type() {
        let err = Column::keyed("email").pg_column_string().unwrap_err();
        assert!(matches!(err, OrmError::MissingColumnType(ref k) if k == "email"));
    }

    #[test]
    fn factory_default_runs_on_resolve() {
        let col = Column::new().default_with(|| Value::from(7));
        assert_eq!(col.get_default().resolve(), Value::Int(7));
        assert_eq!(Column::new().get_default().resolve(), Value::Null);
    }

    #[test]
    fn debug_output() {
        let col = Column::keyed("_id")
            .default_value("x")
            .column_type(ColumnType::Uuid)
            .primary_key();
        assert_eq!(
            format!("{col:?}"),
            "Column(key='_id', default='x', primary_key=true, type=uuid)"
        );
    }
}
