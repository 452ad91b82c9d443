//! Recording client and provider shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pgmodel::client::command_status;
use pgmodel::{Column, ConnectionProvider, GenericClient, OrmResult, Record, Value};

pgmodel::model! {
    pub struct User in "users" {
        id: Column::keyed("_id").default_with(|| uuid::Uuid::new_v4().into()).primary_key(),
        name: Column::new().default_value("test"),
        email: Column::new(),
    }
}

/// One recorded call: SQL text and its arguments.
pub type Call = (String, Vec<Value>);

/// Records every statement and answers from queued statuses and row sets.
///
/// With nothing queued, `execute` reports one affected row and `fetch`
/// returns no rows.
#[derive(Default)]
pub struct MockClient {
    calls: Mutex<Vec<Call>>,
    statuses: Mutex<VecDeque<String>>,
    rows: Mutex<VecDeque<Vec<Record>>>,
}

impl MockClient {
    pub fn with_statuses<'a>(self, statuses: impl IntoIterator<Item = &'a str>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .extend(statuses.into_iter().map(String::from));
        self
    }

    pub fn with_rows(self, rows: Vec<Record>) -> Self {
        self.rows.lock().unwrap().push_back(rows);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sql(&self) -> Vec<String> {
        self.calls().into_iter().map(|(sql, _)| sql).collect()
    }

    fn record(&self, sql: &str, args: &[Value]) {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), args.to_vec()));
    }
}

impl GenericClient for MockClient {
    async fn execute(&self, sql: &str, args: &[Value]) -> OrmResult<String> {
        self.record(sql, args);
        let queued = self.statuses.lock().unwrap().pop_front();
        Ok(queued.unwrap_or_else(|| command_status(sql, 1)))
    }

    async fn fetch(&self, sql: &str, args: &[Value]) -> OrmResult<Vec<Record>> {
        self.record(sql, args);
        Ok(self.rows.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Hands out the same [`MockClient`] and counts acquisitions.
pub struct MockProvider {
    pub client: Arc<MockClient>,
    acquired: AtomicUsize,
}

impl MockProvider {
    pub fn new(client: MockClient) -> Self {
        Self {
            client: Arc::new(client),
            acquired: AtomicUsize::new(0),
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

impl ConnectionProvider for MockProvider {
    type Connection = Arc<MockClient>;

    async fn acquire(&self) -> OrmResult<Arc<MockClient>> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.client))
    }
}

pub fn user_row(id: i64, name: &str, email: Option<&str>) -> Record {
    Record::new()
        .with("_id", id)
        .with("name", name)
        .with("email", email)
}
