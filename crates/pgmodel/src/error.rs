//! Error types for pgmodel

use std::fmt;

use thiserror::Error;

use crate::statement::StatementKind;

/// Result type alias for pgmodel operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Whether an invalid model was handed over as a type or as an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelForm {
    Class,
    Instance,
}

impl fmt::Display for ModelForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelForm::Class => f.write_str("class"),
            ModelForm::Instance => f.write_str("instance"),
        }
    }
}

/// Error types for model, statement and database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// The bound model does not satisfy the model contract
    #[error("Invalid model {form} '{model}': {reason}")]
    InvalidModel {
        form: ModelForm,
        model: String,
        reason: String,
    },

    /// No statement or clause content could be derived
    #[error("Incomplete statement: {0}")]
    IncompleteStatement(String),

    /// A filter key resolved to a column outside of the permitted set
    #[error("Column '{column}' is not allowed in a WHERE clause for '{table}'")]
    DisallowedColumn { table: String, column: String },

    /// A second, different statement kind was set on one builder
    #[error("Statement conflict: {current} statement already set, cannot set {attempted}")]
    StatementConflict {
        current: StatementKind,
        attempted: StatementKind,
    },

    /// The database reported no affected rows for a save/delete
    #[error("Execution failure: {0}")]
    ExecutionFailure(String),

    /// Neither a key nor an attribute name matched
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// DDL rendering of a column without a type tag
    #[error("Column '{0}' has no type set")]
    MissingColumnType(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an incomplete statement error
    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::IncompleteStatement(message.into())
    }

    /// Create an invalid model error
    pub fn invalid_model(
        form: ModelForm,
        model: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidModel {
            form,
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is an incomplete statement error
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::IncompleteStatement(_))
    }

    /// Check if this is a disallowed column error
    pub fn is_disallowed_column(&self) -> bool {
        matches!(self, Self::DisallowedColumn { .. })
    }

    /// Check if this is an execution failure
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, Self::ExecutionFailure(_))
    }

    /// Check if this is a column lookup failure
    pub fn is_column_not_found(&self) -> bool {
        matches!(self, Self::ColumnNotFound(_))
    }

    /// Check if this is an invalid model error
    pub fn is_invalid_model(&self) -> bool {
        matches!(self, Self::InvalidModel { .. })
    }

    /// Check if this is a statement conflict
    pub fn is_statement_conflict(&self) -> bool {
        matches!(self, Self::StatementConflict { .. })
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
