//! Scripted driver for unit tests

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::traits::{Driver, DriverError, DriverResult, ResultSet};
use crate::value::Value;

/// A driver call as seen by [`MockDriver`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Prepare(String),
    Execute(u32, Vec<Value>),
    Query(String),
}

/// Records every call and replays queued results.
///
/// Prepared statements are numbered from 1. `execute` and `query` share one
/// response queue; an empty queue yields an empty result.
#[derive(Debug, Default)]
pub(crate) struct MockDriver {
    calls: Vec<Call>,
    responses: VecDeque<DriverResult<ResultSet>>,
    prepare_errors: VecDeque<DriverError>,
    statements: u32,
    insert_id: Option<u64>,
    closed: bool,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, set: ResultSet) -> Self {
        self.responses.push_back(Ok(set));
        self
    }

    /// Queue a failure for the next `execute` or `query`.
    pub fn fail_query(mut self, err: DriverError) -> Self {
        self.responses.push_back(Err(err));
        self
    }

    pub fn fail_prepare(mut self, err: DriverError) -> Self {
        self.prepare_errors.push_back(err);
        self
    }

    pub fn with_insert_id(mut self, id: u64) -> Self {
        self.insert_id = Some(id);
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn prepare_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Prepare(_)))
            .count()
    }

    fn next_response(&mut self) -> DriverResult<ResultSet> {
        if self.closed {
            return Err(DriverError::NotConnected);
        }
        self.responses.pop_front().unwrap_or_else(|| Ok(ResultSet::default()))
    }
}

#[async_trait]
impl Driver for MockDriver {
    type Statement = u32;

    async fn prepare(&mut self, sql: &str) -> DriverResult<u32> {
        if self.closed {
            return Err(DriverError::NotConnected);
        }
        self.calls.push(Call::Prepare(sql.to_string()));
        if let Some(err) = self.prepare_errors.pop_front() {
            return Err(err);
        }
        self.statements += 1;
        Ok(self.statements)
    }

    async fn execute(&mut self, stmt: &u32, params: Vec<Value>) -> DriverResult<ResultSet> {
        self.calls.push(Call::Execute(*stmt, params));
        self.next_response()
    }

    async fn query(&mut self, sql: &str) -> DriverResult<ResultSet> {
        self.calls.push(Call::Query(sql.to_string()));
        self.next_response()
    }

    fn last_insert_id(&self) -> Option<u64> {
        self.insert_id
    }

    fn is_connected(&self) -> bool {
        !self.closed
    }
}
