//! Model registry and instances.
//!
//! A model type owns one [`ModelSchema`], built once from its declared and
//! inherited [`Column`]s. Instances keep their values in [`FieldSlots`]; each
//! slot materializes its column default on first read and caches it.
//!
//! ```ignore
//! use pgmodel::{model, Column, ColumnType, Model, Value};
//!
//! model! {
//!     pub struct User in "users" {
//!         id: Column::keyed("_id")
//!             .column_type(ColumnType::Uuid)
//!             .default_with(|| uuid::Uuid::new_v4().into())
//!             .primary_key(),
//!         name: Column::new().default_value("test"),
//!         email: Column::new(),
//!     }
//! }
//!
//! let user = User::new().with("_id", 123);
//! assert_eq!(user.get("id")?, &Value::Int(123));
//! assert_eq!(User::schema().column_names(), vec!["_id", "name", "email"]);
//! ```

use std::fmt;
use std::sync::OnceLock;

use crate::column::Column;
use crate::error::{ModelForm, OrmError, OrmResult};
use crate::record::Record;
use crate::value::{Value, ValueMap};

static NULL: Value = Value::Null;

/// A column registered on a model type.
#[derive(Debug, Clone)]
pub struct ModelColumn {
    attr: String,
    key: String,
    column: Column,
    index: usize,
}

impl ModelColumn {
    /// The attribute name the column was declared under.
    pub fn attr(&self) -> &str {
        &self.attr
    }

    /// The database column name.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn is_primary_key(&self) -> bool {
        self.column.is_primary_key()
    }

    /// Read this column's value from an instance.
    ///
    /// The first read of an unset slot stores the column default; later reads
    /// return the stored value.
    pub fn get<'a, M: Model + ?Sized>(&self, instance: &'a M) -> &'a Value {
        match instance.slots().slot(self.index) {
            Some(slot) => slot.get_or_init(|| self.column.get_default().resolve()),
            None => &NULL,
        }
    }

    /// Store a value on an instance, bypassing the default.
    pub fn set<M: Model + ?Sized>(&self, instance: &mut M, value: Value) {
        instance.slots_mut().store(self.index, value);
    }
}

/// Per-instance value storage: one lazily filled slot per column plus any
/// extra, non-column attributes.
#[derive(Debug, Clone)]
pub struct FieldSlots {
    slots: Vec<OnceLock<Value>>,
    extras: Vec<(String, Value)>,
}

impl FieldSlots {
    /// Empty slots sized for `schema`.
    pub fn for_schema(schema: &ModelSchema) -> Self {
        Self {
            slots: (0..schema.columns.len()).map(|_| OnceLock::new()).collect(),
            extras: Vec::new(),
        }
    }

    fn slot(&self, index: usize) -> Option<&OnceLock<Value>> {
        self.slots.get(index)
    }

    fn store(&mut self, index: usize, value: Value) {
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, OnceLock::new);
        }
        self.slots[index] = OnceLock::from(value);
    }

    /// Whether the slot holds a value (set explicitly or materialized).
    pub fn is_filled(&self, index: usize) -> bool {
        self.slot(index).is_some_and(|s| s.get().is_some())
    }

    pub fn extra(&self, name: &str) -> Option<&Value> {
        self.extras.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn extras(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extras.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn set_extra(&mut self, name: &str, value: Value) {
        match self.extras.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = value,
            None => self.extras.push((name.to_string(), value)),
        }
    }
}

/// Column metadata for one model type.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    type_name: String,
    table: String,
    columns: Vec<ModelColumn>,
}

impl ModelSchema {
    pub fn builder(type_name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder {
            type_name: type_name.into(),
            table: None,
            own: Vec::new(),
            inherited: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn tablename(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ModelColumn] {
        &self.columns
    }

    /// Database keys in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(ModelColumn::key).collect()
    }

    /// Keys of the primary-key columns, in declaration order.
    pub fn primary_keys(&self) -> Vec<&str> {
        self.primary_key_columns().map(ModelColumn::key).collect()
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ModelColumn> {
        self.columns.iter().filter(|c| c.is_primary_key())
    }

    /// Look up a column by attribute name.
    pub fn column(&self, attr: &str) -> Option<&ModelColumn> {
        self.columns.iter().find(|c| c.attr == attr)
    }

    /// Attribute name for a database key (or an attribute name, returned as is).
    pub fn attr_name_for_column(&self, name: &str) -> OrmResult<&str> {
        self.columns
            .iter()
            .find(|c| c.key == name || c.attr == name)
            .map(|c| c.attr.as_str())
            .ok_or_else(|| OrmError::ColumnNotFound(name.to_string()))
    }

    /// Database key for an attribute name (or a key, returned as is).
    pub fn ensured_column_name(&self, name: &str) -> OrmResult<&str> {
        self.columns
            .iter()
            .find(|c| c.key == name || c.attr == name)
            .map(|c| c.key.as_str())
            .ok_or_else(|| OrmError::ColumnNotFound(name.to_string()))
    }

    /// Check the schema can back statements: a table name, at least one
    /// column, unique keys.
    pub fn validate(&self, form: ModelForm) -> OrmResult<()> {
        if self.table.trim().is_empty() {
            return Err(OrmError::invalid_model(form, &self.type_name, "table name is empty"));
        }
        if self.columns.is_empty() {
            return Err(OrmError::invalid_model(form, &self.type_name, "no columns declared"));
        }
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.key == col.key) {
                return Err(OrmError::invalid_model(
                    form,
                    &self.type_name,
                    format!("duplicate column key '{}'", col.key),
                ));
            }
        }
        Ok(())
    }
}

/// Builds a [`ModelSchema`]. Own columns come first, in declaration order,
/// followed by inherited columns the type does not redeclare.
pub struct ModelSchemaBuilder {
    type_name: String,
    table: Option<String>,
    own: Vec<(String, Column)>,
    inherited: Vec<(String, Column)>,
}

impl ModelSchemaBuilder {
    /// Override the table name (default: lowercased type name + `s`).
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Declare a column. Redeclaring an attribute replaces it in place.
    pub fn column(mut self, attr: impl Into<String>, column: Column) -> Self {
        let attr = attr.into();
        match self.own.iter_mut().find(|(a, _)| *a == attr) {
            Some((_, slot)) => *slot = column,
            None => self.own.push((attr, column)),
        }
        self
    }

    /// Copy in the columns of a base schema. The first base to provide an
    /// attribute wins.
    pub fn inherit(mut self, base: &ModelSchema) -> Self {
        for col in &base.columns {
            if !self.inherited.iter().any(|(a, _)| *a == col.attr) {
                self.inherited.push((col.attr.clone(), col.column.clone()));
            }
        }
        self
    }

    pub fn build(self) -> ModelSchema {
        let ModelSchemaBuilder {
            type_name,
            table,
            own,
            inherited,
        } = self;

        let shadowed = |attr: &str| own.iter().any(|(a, _)| a == attr);
        let inherited: Vec<_> = inherited.into_iter().filter(|(a, _)| !shadowed(a)).collect();

        let columns = own
            .into_iter()
            .chain(inherited)
            .enumerate()
            .map(|(index, (attr, mut column))| {
                column.ensure_key(&attr);
                let key = column.get_key().unwrap_or(&attr).to_string();
                ModelColumn {
                    attr,
                    key,
                    column,
                    index,
                }
            })
            .collect();

        let table = table.unwrap_or_else(|| format!("{}s", type_name.to_lowercase()));
        ModelSchema {
            type_name,
            table,
            columns,
        }
    }
}

/// A model type: a schema plus per-instance field slots.
///
/// Usually implemented through [`model!`](crate::model!).
pub trait Model: Send + Sync {
    /// The type's schema.
    fn schema() -> &'static ModelSchema
    where
        Self: Sized;

    /// The schema of this instance's type.
    fn model_schema(&self) -> &'static ModelSchema;

    fn slots(&self) -> &FieldSlots;

    fn slots_mut(&mut self) -> &mut FieldSlots;

    fn from_slots(slots: FieldSlots) -> Self
    where
        Self: Sized;

    /// A fresh instance with every field unset.
    fn new() -> Self
    where
        Self: Sized,
    {
        Self::from_slots(FieldSlots::for_schema(Self::schema()))
    }

    /// Build an instance from names that may be attribute names or keys.
    fn from_values(values: ValueMap) -> Self
    where
        Self: Sized,
    {
        let mut model = Self::new();
        for (name, value) in values {
            model.set(&name, value);
        }
        model
    }

    /// Hydrate an instance from a fetched row.
    fn from_record(record: &Record) -> Self
    where
        Self: Sized,
    {
        let mut model = Self::new();
        for (name, value) in record.iter() {
            model.set(name, value.clone());
        }
        model
    }

    /// Bind this type (not an instance) to a statement.
    fn class() -> ModelRef<'static>
    where
        Self: Sized,
    {
        ModelRef::Class(Self::schema())
    }

    /// Read a field by attribute name or key.
    fn get(&self, name: &str) -> OrmResult<&Value> {
        let schema = self.model_schema();
        let attr = schema.attr_name_for_column(name).unwrap_or(name);
        if let Some(col) = schema.column(attr) {
            return Ok(col.get(self));
        }
        self.slots()
            .extra(attr)
            .ok_or_else(|| OrmError::ColumnNotFound(name.to_string()))
    }

    /// Set a field by attribute name or key. Unknown names are kept as extra
    /// attributes.
    fn set(&mut self, name: &str, value: Value) {
        let schema = self.model_schema();
        let attr = schema.attr_name_for_column(name).unwrap_or(name);
        match schema.column(attr) {
            Some(col) => col.set(self, value),
            None => self.slots_mut().set_extra(attr, value),
        }
    }

    /// Builder-style [`Model::set`].
    fn with(mut self, name: &str, value: impl Into<Value>) -> Self
    where
        Self: Sized,
    {
        self.set(name, value.into());
        self
    }

    /// Column values in column order.
    fn values(&self) -> Vec<Value> {
        self.model_schema()
            .columns()
            .iter()
            .map(|c| c.get(self).clone())
            .collect()
    }

    /// `Type(attr=value, ...)`, text values quoted.
    fn describe(&self) -> String {
        let schema = self.model_schema();
        let mut parts: Vec<String> = schema
            .columns()
            .iter()
            .map(|c| format!("{}={}", c.attr(), c.get(self).repr()))
            .collect();
        parts.extend(
            self.slots()
                .extras()
                .filter(|(k, _)| !k.starts_with('_'))
                .map(|(k, v)| format!("{k}={}", v.repr())),
        );
        format!("{}({})", schema.type_name(), parts.join(", "))
    }
}

/// A model bound to a statement: either the type or one instance.
#[derive(Clone, Copy)]
pub enum ModelRef<'a> {
    Class(&'static ModelSchema),
    Instance(&'a dyn Model),
}

impl<'a> ModelRef<'a> {
    pub fn schema(&self) -> &'static ModelSchema {
        match self {
            ModelRef::Class(schema) => schema,
            ModelRef::Instance(model) => model.model_schema(),
        }
    }

    pub fn instance(&self) -> Option<&'a dyn Model> {
        match self {
            ModelRef::Class(_) => None,
            ModelRef::Instance(model) => Some(*model),
        }
    }

    pub fn form(&self) -> ModelForm {
        match self {
            ModelRef::Class(_) => ModelForm::Class,
            ModelRef::Instance(_) => ModelForm::Instance,
        }
    }

    pub fn validate(&self) -> OrmResult<()> {
        self.schema().validate(self.form())
    }
}

impl fmt::Debug for ModelRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelRef::Class(schema) => f.write_str(schema.type_name()),
            ModelRef::Instance(model) => f.write_str(&model.describe()),
        }
    }
}

/// Convert an input into a [`ModelRef`].
pub trait IntoModelRef<'a> {
    fn into_model_ref(self) -> ModelRef<'a>;
}

impl<'a> IntoModelRef<'a> for ModelRef<'a> {
    fn into_model_ref(self) -> ModelRef<'a> {
        self
    }
}

impl<'a> IntoModelRef<'a> for &'static ModelSchema {
    fn into_model_ref(self) -> ModelRef<'a> {
        ModelRef::Class(self)
    }
}

impl<'a, M: Model> IntoModelRef<'a> for &'a M {
    fn into_model_ref(self) -> ModelRef<'a> {
        ModelRef::Instance(self)
    }
}

impl<'a> IntoModelRef<'a> for &'a dyn Model {
    fn into_model_ref(self) -> ModelRef<'a> {
        ModelRef::Instance(self)
    }
}

/// Declare a model type.
///
/// The optional `in "<table>"` overrides the table name and `extends` copies
/// columns from other model types that the body does not redeclare.
///
/// ```ignore
/// pgmodel::model! {
///     pub struct Admin in "admins" extends User {
///         level: Column::new().default_value(1),
///     }
/// }
/// ```
#[macro_export]
macro_rules! model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(in $table:literal)? $(extends $($base:ty),+)? {
            $($attr:ident : $column:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            slots: $crate::FieldSlots,
        }

        impl $crate::Model for $name {
            fn schema() -> &'static $crate::ModelSchema {
                static SCHEMA: ::std::sync::OnceLock<$crate::ModelSchema> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::ModelSchema::builder(stringify!($name))
                        $(.table($table))?
                        $($(.inherit(<$base as $crate::Model>::schema()))+)?
                        $(.column(stringify!($attr), $column))*
                        .build()
                })
            }

            fn model_schema(&self) -> &'static $crate::ModelSchema {
                <Self as $crate::Model>::schema()
            }

            fn slots(&self) -> &$crate::FieldSlots {
                &self.slots
            }

            fn slots_mut(&mut self) -> &mut $crate::FieldSlots {
                &mut self.slots
            }

            fn from_slots(slots: $crate::FieldSlots) -> Self {
                Self { slots }
            }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                <Self as $crate::Model>::new()
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&$crate::Model::describe(self))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&$crate::Model::describe(self))
            }
        }
    };
}

#[cfg(test)]
mod tests;
