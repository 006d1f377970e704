//! MySQL driver over a single mysql_async connection

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Params, Row as MySqlAsyncRow, Statement};

use crate::traits::{Driver, DriverError, DriverResult, ResultSet};
use crate::value::Value;

use super::row::result_set;
use super::types::to_mysql_value;

/// A [`Driver`] backed by one `mysql_async::Conn`.
///
/// Prepared statements are `mysql_async::Statement` handles, which are
/// cheap to clone and stay valid for the life of the connection.
pub struct MySqlDriver {
    conn: Option<Conn>,
}

impl MySqlDriver {
    pub fn new(conn: Conn) -> Self {
        Self { conn: Some(conn) }
    }

    /// Get a reference to the underlying mysql_async connection.
    pub fn inner(&self) -> Option<&Conn> {
        self.conn.as_ref()
    }

    /// Close the link. Later calls report "not connected".
    pub async fn disconnect(&mut self) -> DriverResult<()> {
        match self.conn.take() {
            Some(conn) => conn.disconnect().await.map_err(DriverError::from),
            None => Ok(()),
        }
    }

    fn conn(&mut self) -> DriverResult<&mut Conn> {
        self.conn.as_mut().ok_or(DriverError::NotConnected)
    }
}

#[async_trait]
impl Driver for MySqlDriver {
    type Statement = Statement;

    async fn prepare(&mut self, sql: &str) -> DriverResult<Statement> {
        let conn = self.conn()?;
        Ok(conn.prep(sql).await?)
    }

    async fn execute(&mut self, stmt: &Statement, params: Vec<Value>) -> DriverResult<ResultSet> {
        let conn = self.conn()?;
        let params = if params.is_empty() {
            Params::Empty
        } else {
            Params::Positional(params.iter().map(to_mysql_value).collect())
        };
        let rows: Vec<MySqlAsyncRow> = conn.exec(stmt.clone(), params).await?;
        Ok(result_set(rows, conn.affected_rows()))
    }

    async fn query(&mut self, sql: &str) -> DriverResult<ResultSet> {
        let conn = self.conn()?;
        let rows: Vec<MySqlAsyncRow> = conn.query(sql).await?;
        Ok(result_set(rows, conn.affected_rows()))
    }

    fn last_insert_id(&self) -> Option<u64> {
        self.conn.as_ref().and_then(Conn::last_insert_id)
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }
}

impl From<mysql_async::Error> for DriverError {
    fn from(err: mysql_async::Error) -> Self {
        match err {
            mysql_async::Error::Server(e) => DriverError::Native {
                state: e.state,
                code: Some(e.code),
                message: Some(e.message),
            },
            other => DriverError::Native {
                state: "HY000".to_string(),
                code: None,
                message: Some(other.to_string()),
            },
        }
    }
}
