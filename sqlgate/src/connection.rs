//! Connection handle and query executor

use tracing::{debug, warn};

use crate::batch::{BatchInsert, InsertLimits, InsertTarget};
use crate::cache::StatementCache;
use crate::error::{Error, ErrorState, Result};
use crate::guard;
use crate::mode::{QueryMode, ResultKind};
use crate::query::Query;
use crate::quote::quote_name;
use crate::row::Row;
use crate::shape::{shape, Output};
use crate::traits::{Driver, DriverError, FromRow, FromValue, ResultSet, ToRow};
use crate::value::Value;

const PREPARE_FAILED: &str = "Unable to prepare statement";
const RUN_FAILED: &str = "Unable to run query";

/// A single database connection.
///
/// Owns the driver link, a prepared statement cache and the error state of
/// the most recent operation. Every operation takes `&mut self`, so one
/// connection runs one statement at a time.
///
/// # Example
///
/// ```ignore
/// use sqlgate::{Connection, Value};
///
/// let mut conn = sqlgate::mysql::connect(&settings).await?;
/// let users = conn.query("SELECT * FROM users WHERE active = ?", vec![Value::Bool(true)]).await?;
/// let total: i64 = conn
///     .fetch_scalar("SELECT COUNT(*) FROM users", vec![])
///     .await?;
/// ```
pub struct Connection<D: Driver> {
    driver: D,
    read_only: bool,
    cache: StatementCache<D::Statement>,
    state: ErrorState,
    limits: InsertLimits,
}

impl<D: Driver> Connection<D> {
    /// Wrap an open driver link.
    pub fn new(driver: D) -> Self {
        Self::with_limits(driver, InsertLimits::default())
    }

    pub fn with_limits(driver: D, limits: InsertLimits) -> Self {
        Self {
            driver,
            read_only: false,
            cache: StatementCache::new(),
            state: ErrorState::default(),
            limits,
        }
    }

    /// Restrict this connection to `SELECT`, `SHOW`, `USE` and `SET NAMES`.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_connected(&self) -> bool {
        self.driver.is_connected()
    }

    /// Error recorded by the most recent operation.
    pub fn error_state(&self) -> &ErrorState {
        &self.state
    }

    pub fn clear_errors(&mut self) {
        self.state.clear();
    }

    pub fn statement_cache(&self) -> &StatementCache<D::Statement> {
        &self.cache
    }

    pub fn insert_limits(&self) -> InsertLimits {
        self.limits
    }

    pub fn set_insert_limits(&mut self, limits: InsertLimits) {
        self.limits = limits;
    }

    /// Id generated by the most recent insert on this link.
    pub fn last_insert_id(&self) -> Option<u64> {
        self.driver.last_insert_id()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Run `sql` with positional `params` and shape the result per `mode`.
    pub async fn execute(
        &mut self,
        sql: &str,
        params: Vec<Value>,
        mode: impl Into<QueryMode>,
    ) -> Result<Output> {
        self.state.clear();
        self.run(sql, params, mode.into()).await
    }

    /// Same as [`execute`](Self::execute) with a bit-encoded mode
    /// (see [`mode::raw`](crate::mode::raw)).
    pub async fn execute_raw(&mut self, sql: &str, params: Vec<Value>, bits: u32) -> Result<Output> {
        self.state.clear();
        let mode = QueryMode::from_bits(bits).map_err(|e| self.fail(e))?;
        self.run(sql, params, mode).await
    }

    pub(crate) async fn run(&mut self, sql: &str, params: Vec<Value>, mode: QueryMode) -> Result<Output> {
        let set = self.dispatch(sql, params, mode.cache).await?;
        let driver = &self.driver;
        Ok(shape(mode, set, || driver.last_insert_id()))
    }

    async fn dispatch(&mut self, sql: &str, params: Vec<Value>, cache: bool) -> Result<ResultSet> {
        if self.read_only && !guard::allows(sql) {
            warn!(sql, "statement rejected on read-only connection");
            return Err(self.fail(Error::ReadOnly));
        }

        if let Some(stmt) = self.cache.get(sql) {
            debug!(sql, "statement cache hit");
            return match self.driver.execute(&stmt, params).await {
                Ok(set) => Ok(set),
                Err(e) => Err(self.driver_failure(e, RUN_FAILED)),
            };
        }

        if cache || !params.is_empty() {
            debug!(sql, cache, "preparing statement");
            let stmt = match self.driver.prepare(sql).await {
                Ok(stmt) => stmt,
                Err(e) => return Err(self.driver_failure(e, PREPARE_FAILED)),
            };
            if cache {
                self.cache.insert(sql, stmt.clone());
            }
            return match self.driver.execute(&stmt, params).await {
                Ok(set) => Ok(set),
                Err(e) => Err(self.driver_failure(e, RUN_FAILED)),
            };
        }

        debug!(sql, "running one-shot query");
        match self.driver.query(sql).await {
            Ok(set) => Ok(set),
            Err(e) => Err(self.driver_failure(e, RUN_FAILED)),
        }
    }

    fn driver_failure(&mut self, err: DriverError, fallback: &str) -> Error {
        warn!(error = %err, "driver call failed");
        match Error::from_driver(err) {
            Some(err) => self.fail(err),
            None => self.fail(Error::Unavailable(fallback.to_string())),
        }
    }

    /// Record `err` in the error state and hand it back.
    pub(crate) fn fail(&mut self, err: Error) -> Error {
        self.state.record(&err);
        err
    }

    /// All rows as named records.
    pub async fn query(&mut self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>> {
        let out = self.execute(sql, params, ResultKind::ManyRows).await?;
        Ok(out.into_rows())
    }

    /// All rows as positional sequences.
    pub async fn query_numbered(&mut self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>> {
        let out = self
            .execute(sql, params, QueryMode::new(ResultKind::ManyRows).numbered())
            .await?;
        Ok(out.into_rows())
    }

    /// First row, or `None` when the query returned nothing.
    pub async fn query_row(&mut self, sql: &str, params: Vec<Value>) -> Result<Option<Row>> {
        let out = self.execute(sql, params, ResultKind::SingleRow).await?;
        Ok(out.into_row())
    }

    /// First column of the first row, or `None` when the query returned nothing.
    pub async fn query_scalar(&mut self, sql: &str, params: Vec<Value>) -> Result<Option<Value>> {
        let out = self.execute(sql, params, ResultKind::SingleScalar).await?;
        Ok(out.into_scalar())
    }

    /// Number of rows affected.
    pub async fn exec(&mut self, sql: &str, params: Vec<Value>) -> Result<u64> {
        let out = self.execute(sql, params, ResultKind::RowCount).await?;
        Ok(out.into_row_count().unwrap_or(0))
    }

    /// Id generated by the statement, 0 if none.
    pub async fn exec_insert_id(&mut self, sql: &str, params: Vec<Value>) -> Result<u64> {
        let out = self.execute(sql, params, ResultKind::InsertId).await?;
        Ok(out.into_insert_id().unwrap_or(0))
    }

    pub async fn fetch_all<T: FromRow>(&mut self, sql: &str, params: Vec<Value>) -> Result<Vec<T>> {
        Query::new(sql).bind_values(params).fetch_all(self).await
    }

    pub async fn fetch_optional<T: FromRow>(
        &mut self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Option<T>> {
        Query::new(sql).bind_values(params).fetch_optional(self).await
    }

    pub async fn fetch_one<T: FromRow>(&mut self, sql: &str, params: Vec<Value>) -> Result<T> {
        Query::new(sql).bind_values(params).fetch_one(self).await
    }

    pub async fn fetch_scalar<T: FromValue>(&mut self, sql: &str, params: Vec<Value>) -> Result<T> {
        Query::new(sql).bind_values(params).fetch_scalar(self).await
    }

    /// Insert rows in as few statements as the insert limits allow.
    ///
    /// Returns rows inserted, or the last insert id for specs that ask for it.
    pub async fn insert(&mut self, target: InsertTarget) -> Result<u64> {
        self.state.clear();
        let batch = BatchInsert::new(target).map_err(|e| self.fail(e))?;
        batch.run(self).await
    }

    pub async fn insert_rows(&mut self, table: &str, rows: Vec<Row>) -> Result<u64> {
        self.insert(InsertTarget::simple(table, rows)).await
    }

    pub async fn insert_entities<T: ToRow>(&mut self, table: &str, entities: &[T]) -> Result<u64> {
        self.state.clear();
        let batch = BatchInsert::from_entities(table, entities).map_err(|e| self.fail(e))?;
        batch.run(self).await
    }

    /// Switch the default database.
    pub async fn use_database(&mut self, database: &str) -> Result<()> {
        self.exec(&format!("USE {}", quote_name(database)), Vec::new())
            .await
            .map(|_| ())
    }

    /// Set the client character set.
    pub async fn set_preferred_encoding(&mut self, encoding: &str) -> Result<()> {
        self.exec(&format!("SET NAMES {}", quote_name(encoding)), Vec::new())
            .await
            .map(|_| ())
    }

    /// Whether `table` exists in the current database.
    pub async fn table_exists(&mut self, table: &str) -> Result<bool> {
        let count = self
            .query_scalar(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema=DATABASE() AND table_name=?",
                vec![Value::from(table)],
            )
            .await?;
        Ok(is_one(count))
    }

    /// Whether `table` has a column named `column` in the current database.
    pub async fn column_exists(&mut self, table: &str, column: &str) -> Result<bool> {
        let count = self
            .query_scalar(
                "SELECT COUNT(*) FROM information_schema.columns \
                 WHERE table_schema=DATABASE() AND table_name=? AND column_name=?",
                vec![Value::from(table), Value::from(column)],
            )
            .await?;
        Ok(is_one(count))
    }
}

fn is_one(count: Option<Value>) -> bool {
    count.and_then(|v| i64::from_value(v).ok()) == Some(1)
}
