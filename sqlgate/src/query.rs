//! Query builder for sqlgate

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::mode::{QueryMode, ResultKind};
use crate::row::Row;
use crate::traits::{Driver, FromRow, FromValue, ToValue};
use crate::value::Value;

/// A query builder that supports fluent parameter binding.
///
/// # Example
///
/// ```ignore
/// use sqlgate::Query;
///
/// let user: Option<User> = Query::new("SELECT * FROM users WHERE id = ?")
///     .bind(id)
///     .cached()
///     .fetch_optional(&mut conn)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    sql: String,
    params: Vec<Value>,
    cache: bool,
    numbered: bool,
}

impl Query {
    /// Create a new query with the given SQL.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            cache: false,
            numbered: false,
        }
    }

    /// Bind a single value to the query.
    ///
    /// Values are bound in order, replacing `?` placeholders.
    pub fn bind<T: ToValue>(mut self, value: T) -> Self {
        self.params.push(value.to_value());
        self
    }

    /// Bind multiple values to the query.
    pub fn bind_all<T: ToValue>(mut self, values: &[T]) -> Self {
        for value in values {
            self.params.push(value.to_value());
        }
        self
    }

    pub fn bind_values(mut self, values: Vec<Value>) -> Self {
        self.params.extend(values);
        self
    }

    /// Keep the prepared statement for later calls with the same SQL.
    pub fn cached(mut self) -> Self {
        self.cache = true;
        self
    }

    /// Return rows as positional sequences.
    pub fn numbered(mut self) -> Self {
        self.numbered = true;
        self
    }

    /// Get the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the bound parameters.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Take ownership of the parameters.
    pub fn into_params(self) -> Vec<Value> {
        self.params
    }

    fn mode(&self, kind: ResultKind) -> QueryMode {
        QueryMode {
            kind,
            numbered: self.numbered,
            cache: self.cache,
        }
    }

    /// Execute the query and return the number of affected rows.
    pub async fn execute<D: Driver>(self, conn: &mut Connection<D>) -> Result<u64> {
        let mode = self.mode(ResultKind::RowCount);
        let out = conn.execute(&self.sql, self.params, mode).await?;
        Ok(out.into_row_count().unwrap_or(0))
    }

    /// Execute the query and return the generated insert id.
    pub async fn insert_id<D: Driver>(self, conn: &mut Connection<D>) -> Result<u64> {
        let mode = self.mode(ResultKind::InsertId);
        let out = conn.execute(&self.sql, self.params, mode).await?;
        Ok(out.into_insert_id().unwrap_or(0))
    }

    /// Fetch all matching rows untyped.
    pub async fn fetch_rows<D: Driver>(self, conn: &mut Connection<D>) -> Result<Vec<Row>> {
        let mode = self.mode(ResultKind::ManyRows);
        let out = conn.execute(&self.sql, self.params, mode).await?;
        Ok(out.into_rows())
    }

    /// Fetch the first row untyped.
    pub async fn fetch_row<D: Driver>(self, conn: &mut Connection<D>) -> Result<Option<Row>> {
        let mode = self.mode(ResultKind::SingleRow);
        let out = conn.execute(&self.sql, self.params, mode).await?;
        Ok(out.into_row())
    }

    /// Fetch all matching rows.
    pub async fn fetch_all<T: FromRow, D: Driver>(self, conn: &mut Connection<D>) -> Result<Vec<T>> {
        let rows = self.fetch_rows(conn).await?;
        rows.iter()
            .map(T::from_row)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| conn.fail(e))
    }

    /// Fetch a single optional row.
    pub async fn fetch_optional<T: FromRow, D: Driver>(
        self,
        conn: &mut Connection<D>,
    ) -> Result<Option<T>> {
        match self.fetch_row(conn).await? {
            Some(row) => T::from_row(&row).map(Some).map_err(|e| conn.fail(e)),
            None => Ok(None),
        }
    }

    /// Fetch exactly one row.
    pub async fn fetch_one<T: FromRow, D: Driver>(self, conn: &mut Connection<D>) -> Result<T> {
        match self.fetch_optional(conn).await? {
            Some(row) => Ok(row),
            None => Err(conn.fail(Error::NoRows)),
        }
    }

    /// Fetch a scalar value (first column of first row).
    pub async fn fetch_scalar<T: FromValue, D: Driver>(self, conn: &mut Connection<D>) -> Result<T> {
        let mode = self.mode(ResultKind::SingleScalar);
        let out = conn.execute(&self.sql, self.params, mode).await?;
        match out.into_scalar() {
            Some(value) => T::from_value(value).map_err(|e| conn.fail(e)),
            None => Err(conn.fail(Error::NoRows)),
        }
    }
}
