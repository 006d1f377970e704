//! Driver trait for the SQL link underneath a connection

use crate::value::Value;
use async_trait::async_trait;
use thiserror::Error;

/// Result type alias for driver calls
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Native error information reported by a driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// SQLSTATE plus optional vendor code and message
    #[error("[{state}] {}", .message.as_deref().unwrap_or("no message"))]
    Native {
        state: String,
        code: Option<u16>,
        message: Option<String>,
    },

    /// The driver failed without reporting any error information
    #[error("Cannot get error info")]
    NoInfo,

    /// The link has been closed
    #[error("Database not connected")]
    NotConnected,
}

impl DriverError {
    /// Server-style error with SQLSTATE, vendor code and message.
    pub fn server(state: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        DriverError::Native {
            state: state.into(),
            code: Some(code),
            message: Some(message.into()),
        }
    }
}

/// Fully read result of one statement execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names, empty when the statement produced no rows
    pub columns: Vec<String>,
    /// Row values in column order
    pub rows: Vec<Vec<Value>>,
    /// Rows affected as reported by the server
    pub affected_rows: u64,
}

impl ResultSet {
    /// Result of a statement that returns rows.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            affected_rows: 0,
        }
    }

    /// Result of a statement that only changes rows.
    pub fn affected(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            ..Self::default()
        }
    }
}

/// An open link to the database server.
///
/// A [`Connection`](crate::Connection) owns exactly one driver and calls it
/// one statement at a time.
#[async_trait]
pub trait Driver: Send {
    /// Prepared statement handle; cheap to clone.
    type Statement: Clone + Send + Sync;

    /// Compile a statement for repeated execution.
    async fn prepare(&mut self, sql: &str) -> DriverResult<Self::Statement>;

    /// Execute a prepared statement with positional parameters.
    async fn execute(
        &mut self,
        stmt: &Self::Statement,
        params: Vec<Value>,
    ) -> DriverResult<ResultSet>;

    /// Run a statement once without preparing it.
    async fn query(&mut self, sql: &str) -> DriverResult<ResultSet>;

    /// Identifier generated by the most recent insert on this link.
    fn last_insert_id(&self) -> Option<u64>;

    /// Whether the link is still open.
    fn is_connected(&self) -> bool {
        true
    }
}
