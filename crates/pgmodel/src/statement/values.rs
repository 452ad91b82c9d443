//! Statement value store: one statement fragment, its clauses and the
//! placeholder counter that numbers their arguments.

use std::fmt;

use tokio_postgres::types::ToSql;

use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// The kinds of statement a builder can hold. Only one per builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        })
    }
}

/// Clauses that follow the statement, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    From,
    Where,
}

impl ClauseKind {
    fn index(self) -> usize {
        match self {
            ClauseKind::From => 0,
            ClauseKind::Where => 1,
        }
    }
}

/// A piece of SQL text with the values for its placeholders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub text: String,
    pub args: Vec<Value>,
    /// The first `$n` this fragment consumed, if it binds anything.
    pub first_placeholder: Option<usize>,
}

impl Fragment {
    /// A fragment without placeholders.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_args(text: impl Into<String>, args: Vec<Value>, first_placeholder: Option<usize>) -> Self {
        Self {
            text: text.into(),
            args,
            first_placeholder,
        }
    }
}

/// Placeholder number generator for `$n` markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderCounter {
    next: usize,
}

impl PlaceholderCounter {
    pub fn new(start: usize) -> Self {
        Self { next: start }
    }

    /// Take the next placeholder number.
    pub fn next_placeholder(&mut self) -> usize {
        let n = self.next;
        self.next += 1;
        n
    }

    /// The number the next call will hand out.
    pub fn peek(&self) -> usize {
        self.next
    }

    /// Resume numbering at `start`.
    pub fn reset(&mut self, start: usize) {
        self.next = start;
    }
}

impl Default for PlaceholderCounter {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Holds one statement and its clauses for a single builder.
#[derive(Debug, Clone, Default)]
pub struct StatementValues {
    statement: Option<(StatementKind, Fragment)>,
    clauses: [Option<Fragment>; 2],
}

impl StatementValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the statement. Empty text is ignored; a different kind than the
    /// one already held is a conflict, the same kind replaces it.
    pub fn set_statement(&mut self, kind: StatementKind, fragment: Fragment) -> OrmResult<()> {
        if fragment.text.is_empty() {
            return Ok(());
        }
        if let Some((current, _)) = &self.statement {
            if *current != kind {
                return Err(OrmError::StatementConflict {
                    current: *current,
                    attempted: kind,
                });
            }
        }
        self.statement = Some((kind, fragment));
        Ok(())
    }

    /// Record a clause, replacing any previous one of the same kind.
    pub fn set_clause(&mut self, kind: ClauseKind, fragment: Fragment) {
        if fragment.text.is_empty() {
            return;
        }
        self.clauses[kind.index()] = Some(fragment);
    }

    pub fn statement_kind(&self) -> Option<StatementKind> {
        self.statement.as_ref().map(|(kind, _)| *kind)
    }

    pub fn statement(&self) -> Option<&Fragment> {
        self.statement.as_ref().map(|(_, fragment)| fragment)
    }

    pub fn clause(&self, kind: ClauseKind) -> Option<&Fragment> {
        self.clauses[kind.index()].as_ref()
    }

    fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.statement()
            .into_iter()
            .chain(self.clauses.iter().flatten())
    }

    /// Statement text followed by each present clause, joined by `separator`.
    pub fn query_string(&self, separator: &str) -> OrmResult<String> {
        if self.statement.is_none() {
            return Err(OrmError::incomplete("no statement set"));
        }
        let parts: Vec<&str> = self.fragments().map(|f| f.text.as_str()).collect();
        Ok(parts.join(separator))
    }

    /// Statement args, then FROM args, then WHERE args.
    pub fn query_args(&self) -> Vec<Value> {
        self.fragments().flat_map(|f| f.args.iter().cloned()).collect()
    }

    pub fn query(&self, separator: &str) -> OrmResult<BuiltQuery> {
        Ok(BuiltQuery {
            sql: self.query_string(separator)?,
            args: self.query_args(),
        })
    }
}

/// SQL text with its ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<Value>,
}

impl BuiltQuery {
    /// Arguments as driver parameters.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }

    /// The SQL text followed by every argument.
    pub fn flatten(&self) -> Vec<Value> {
        std::iter::once(Value::Text(self.sql.clone()))
            .chain(self.args.iter().cloned())
            .collect()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

impl fmt::Display for BuiltQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
