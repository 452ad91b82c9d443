use std::fmt;

use crate::client::GenericClient;
use crate::config::StatementConfig;
use crate::error::{OrmError, OrmResult};
use crate::model::{IntoModelRef, ModelRef, ModelSchema};
use crate::record::Record;
use crate::value::{Value, ValueMap};

use super::values::{
    BuiltQuery, ClauseKind, Fragment, PlaceholderCounter, StatementKind, StatementValues,
};

/// Options for [`Statement::where_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WhereOptions {
    /// Check keys against the primary keys instead of all columns, skipping
    /// (rather than rejecting) keys outside that set.
    pub primary_keys: bool,
    /// Leave the statement unchanged when no WHERE clause can be built.
    pub safe_call: bool,
}

impl WhereOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to primary keys, non-strict.
    pub fn primary_keys() -> Self {
        Self {
            primary_keys: true,
            safe_call: false,
        }
    }

    pub fn safe(mut self) -> Self {
        self.safe_call = true;
        self
    }
}

/// Builds one parameterized statement for a model.
///
/// Each builder holds at most one statement (SELECT, INSERT, UPDATE or
/// DELETE) plus its FROM/WHERE clauses. Methods consume and return the
/// builder so calls chain:
///
/// ```ignore
/// let stmt = pgmodel::select(User::schema())?.r#where(values! { "name" => "alice" })?;
/// assert_eq!(
///     stmt.query_string()?,
///     "SELECT users._id, users.name, users.email\nFROM users\nWHERE users.name = $1",
/// );
/// ```
#[derive(Clone)]
pub struct Statement<'a> {
    model: Option<ModelRef<'a>>,
    kwargs: ValueMap,
    counter: PlaceholderCounter,
    values: StatementValues,
    config: StatementConfig,
}

impl<'a> Statement<'a> {
    /// Bind a model type or instance. Fails if the schema cannot back statements.
    pub fn new(model: impl IntoModelRef<'a>) -> OrmResult<Self> {
        let model = model.into_model_ref();
        model.validate()?;
        Ok(Self::with_model(Some(model)))
    }

    /// A builder with no model; every statement operation fails on it.
    pub fn unbound() -> Self {
        Self::with_model(None)
    }

    fn with_model(model: Option<ModelRef<'a>>) -> Self {
        let config = StatementConfig::default();
        Self {
            model,
            kwargs: ValueMap::new(),
            counter: PlaceholderCounter::new(config.placeholder_start),
            values: StatementValues::new(),
            config,
        }
    }

    /// Replace the configuration. Call before adding any statement, as it
    /// restarts placeholder numbering.
    pub fn with_config(mut self, config: StatementConfig) -> Self {
        self.counter = PlaceholderCounter::new(config.placeholder_start);
        self.config = config;
        self
    }

    /// Merge values into the bound keyword values.
    pub fn with_kwargs(mut self, kwargs: ValueMap) -> Self {
        self.kwargs.extend_from(kwargs);
        self
    }

    pub fn model(&self) -> Option<ModelRef<'a>> {
        self.model
    }

    pub fn kwargs(&self) -> &ValueMap {
        &self.kwargs
    }

    pub fn values(&self) -> &StatementValues {
        &self.values
    }

    pub fn counter(&self) -> PlaceholderCounter {
        self.counter
    }

    fn bound(&self) -> OrmResult<ModelRef<'a>> {
        self.model
            .ok_or_else(|| OrmError::incomplete("no model bound to statement"))
    }

    /// Set the FROM clause to the model's table.
    pub fn from_table(mut self) -> OrmResult<Self> {
        let schema = self.bound()?.schema();
        self.values.set_clause(
            ClauseKind::From,
            Fragment::text(format!("FROM {}", schema.tablename())),
        );
        Ok(self)
    }

    /// `SELECT table.col, ...` over every column, followed by its FROM clause.
    pub fn select(mut self) -> OrmResult<Self> {
        let schema = self.bound()?.schema();
        let text = format!("SELECT {}", column_string(schema, true));
        self.values
            .set_statement(StatementKind::Select, Fragment::text(text))?;
        self.from_table()
    }

    /// `INSERT INTO table (cols) VALUES ($n, ...)`, one placeholder per column.
    pub fn insert(mut self, kwargs: ValueMap) -> OrmResult<Self> {
        self.kwargs.extend_from(kwargs);
        let schema = self.bound()?.schema();
        let args = self.resolve_args()?;
        let (marks, first) = self.placeholders(args.len());
        let text = format!(
            "INSERT INTO {} ({}) VALUES ({marks})",
            schema.tablename(),
            column_string(schema, false)
        );
        self.values.set_statement(
            StatementKind::Insert,
            Fragment::with_args(text, args, first),
        )?;
        Ok(self)
    }

    /// `UPDATE table SET (cols) = ($n, ...)`, followed by a WHERE over the
    /// primary keys.
    pub fn update(mut self, kwargs: ValueMap) -> OrmResult<Self> {
        self.kwargs.extend_from(kwargs);
        let schema = self.bound()?.schema();
        let args = self.resolve_args()?;
        let (marks, first) = self.placeholders(args.len());
        let text = format!(
            "UPDATE {} SET ({}) = ({marks})",
            schema.tablename(),
            column_string(schema, false)
        );
        self.values.set_statement(
            StatementKind::Update,
            Fragment::with_args(text, args, first),
        )?;
        self.where_with(WhereOptions::primary_keys(), ValueMap::new())
    }

    /// `DELETE FROM table`, followed by a WHERE over the primary keys when
    /// one can be built. Without it the statement stays unqualified.
    pub fn delete(mut self) -> OrmResult<Self> {
        let schema = self.bound()?.schema();
        self.values.set_statement(
            StatementKind::Delete,
            Fragment::text(format!("DELETE FROM {}", schema.tablename())),
        )?;
        self.where_with(WhereOptions::primary_keys().safe(), ValueMap::new())
    }

    /// Add (or replace) the WHERE clause, checking every key against the
    /// model's columns.
    pub fn r#where(self, kwargs: ValueMap) -> OrmResult<Self> {
        self.where_with(WhereOptions::new(), kwargs)
    }

    /// Add (or replace) the WHERE clause.
    ///
    /// Non-empty `kwargs` replace the bound keyword values. With no keyword
    /// values at all, an instance's primary keys are used. A replaced WHERE
    /// clause hands its placeholder numbers to the new one.
    pub fn where_with(mut self, options: WhereOptions, kwargs: ValueMap) -> OrmResult<Self> {
        if let Some(start) = self
            .values
            .clause(ClauseKind::Where)
            .and_then(|f| f.first_placeholder)
        {
            self.counter.reset(start);
        }
        if !kwargs.is_empty() {
            self.kwargs = kwargs;
        }

        match self.parse_where(options.primary_keys) {
            Ok((fragment, counter)) => {
                self.counter = counter;
                self.values.set_clause(ClauseKind::Where, fragment);
                Ok(self)
            }
            Err(err) if options.safe_call && (err.is_incomplete() || err.is_disallowed_column()) => {
                tracing::trace!(target: "pgmodel.statement", error = %err, "no WHERE clause added");
                Ok(self)
            }
            Err(err) => Err(err),
        }
    }

    fn parse_where(&self, primary_keys: bool) -> OrmResult<(Fragment, PlaceholderCounter)> {
        let model = self.bound()?;
        let schema = model.schema();
        let mut pairs: Vec<(&str, Value)> = Vec::new();

        if !self.kwargs.is_empty() {
            let (allowed, strict) = if primary_keys {
                (schema.primary_keys(), false)
            } else {
                (schema.column_names(), true)
            };
            for (name, value) in self.kwargs.iter() {
                let key = schema.ensured_column_name(name).unwrap_or(name);
                if !allowed.iter().any(|k| *k == key) {
                    if strict {
                        return Err(OrmError::DisallowedColumn {
                            table: schema.tablename().to_string(),
                            column: key.to_string(),
                        });
                    }
                    continue;
                }
                if !value.is_truthy() && !self.config.keep_falsy_filters {
                    continue;
                }
                pairs.push((key, value.clone()));
            }
        } else if let Some(instance) = model.instance() {
            for col in schema.primary_key_columns() {
                pairs.push((col.key(), col.get(instance).clone()));
            }
        }

        if pairs.is_empty() {
            return Err(OrmError::incomplete(format!(
                "no values to build a WHERE clause for '{}'",
                schema.tablename()
            )));
        }

        let mut counter = self.counter;
        let first = counter.peek();
        let table = schema.tablename();
        let mut conditions = Vec::with_capacity(pairs.len());
        let mut args = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            conditions.push(format!("{table}.{key} = ${}", counter.next_placeholder()));
            args.push(value);
        }
        let text = format!("WHERE {}", conditions.join(" AND "));
        Ok((Fragment::with_args(text, args, Some(first)), counter))
    }

    /// Values for every column: the bound instance's, else the keyword
    /// values (matched by key, then attribute name; missing ones are NULL).
    fn resolve_args(&self) -> OrmResult<Vec<Value>> {
        let model = self.bound()?;
        if let Some(instance) = model.instance() {
            return Ok(instance.values());
        }

        let schema = model.schema();
        if self.kwargs.is_empty() {
            return Err(OrmError::incomplete(format!(
                "no instance or values to bind for '{}'",
                schema.tablename()
            )));
        }

        let mut matched = 0;
        let args: Vec<Value> = schema
            .columns()
            .iter()
            .map(|col| {
                match self.kwargs.get(col.key()).or_else(|| self.kwargs.get(col.attr())) {
                    Some(v) => {
                        matched += 1;
                        v.clone()
                    }
                    None => Value::Null,
                }
            })
            .collect();
        if matched == 0 {
            return Err(OrmError::incomplete(format!(
                "none of the given values match a column of '{}'",
                schema.tablename()
            )));
        }
        Ok(args)
    }

    fn placeholders(&mut self, count: usize) -> (String, Option<usize>) {
        let first = (count > 0).then(|| self.counter.peek());
        let marks: Vec<String> = (0..count)
            .map(|_| format!("${}", self.counter.next_placeholder()))
            .collect();
        (marks.join(", "), first)
    }

    /// The full SQL text.
    pub fn query_string(&self) -> OrmResult<String> {
        self.values.query_string(&self.config.separator)
    }

    /// Arguments in placeholder order.
    pub fn query_args(&self) -> Vec<Value> {
        self.values.query_args()
    }

    pub fn query(&self) -> OrmResult<BuiltQuery> {
        self.values.query(&self.config.separator)
    }

    /// The SQL text followed by every argument.
    pub fn flatten(&self) -> OrmResult<Vec<Value>> {
        Ok(self.query()?.flatten())
    }

    /// Execute and return the command status (e.g. `UPDATE 1`).
    pub async fn execute(&self, conn: &impl GenericClient) -> OrmResult<String> {
        let query = self.query()?;
        conn.execute(&query.sql, &query.args).await
    }

    pub async fn fetch(&self, conn: &impl GenericClient) -> OrmResult<Vec<Record>> {
        let query = self.query()?;
        conn.fetch(&query.sql, &query.args).await
    }

    pub async fn fetch_one(&self, conn: &impl GenericClient) -> OrmResult<Option<Record>> {
        let query = self.query()?;
        conn.fetch_one(&query.sql, &query.args).await
    }
}

fn column_string(schema: &ModelSchema, qualified: bool) -> String {
    let table = schema.tablename();
    schema
        .columns()
        .iter()
        .map(|c| {
            if qualified {
                format!("{table}.{}", c.key())
            } else {
                c.key().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.query_string() {
            Ok(sql) => f.write_str(&sql),
            Err(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("statement", &self.query_string().unwrap_or_default())
            .field("args", &self.query_args())
            .field("model", &self.model)
            .finish()
    }
}
