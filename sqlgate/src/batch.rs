//! Batched multi-row inserts

use std::collections::HashMap;

use tracing::debug;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::mode::{QueryMode, ResultKind};
use crate::quote::{quote_list, quote_name, quote_name_list};
use crate::row::Row;
use crate::traits::{Driver, ToRow};
use crate::value::Value;

/// Default cap on value tuples per INSERT statement.
pub const DEFAULT_MAX_ROWS: usize = 2000;

/// Default cap on INSERT statement length in bytes.
pub const DEFAULT_MAX_STATEMENT_LEN: usize = 300_000;

/// Size bounds for the statements a batch insert emits.
///
/// A statement is flushed as soon as either bound is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertLimits {
    pub max_rows: usize,
    pub max_statement_len: usize,
}

impl Default for InsertLimits {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            max_statement_len: DEFAULT_MAX_STATEMENT_LEN,
        }
    }
}

/// What a successful insert returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertResult {
    /// Total rows inserted across all statements
    #[default]
    AffectedCount,
    /// Insert id reported after the last statement
    LastId,
}

/// Structured insert request.
///
/// `row` and `rows` are mutually exclusive; setting both is reported when
/// the insert runs.
///
/// # Example
///
/// ```ignore
/// let spec = InsertSpec::new("users")
///     .fields(["id", "name"])
///     .rows(vec![Row::positional([1.into(), "a".into()])]);
/// let inserted = conn.insert(spec.into()).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertSpec {
    table: Option<String>,
    rows: Option<Vec<Row>>,
    fields: Option<Vec<String>>,
    result: InsertResult,
    error: Option<String>,
}

impl InsertSpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    /// Insert exactly one row.
    pub fn row(mut self, row: Row) -> Self {
        if self.rows.is_some() {
            self.fail("query->row conflicts");
        } else {
            self.rows = Some(vec![row]);
        }
        self
    }

    /// Insert every row in `rows`.
    pub fn rows(mut self, rows: Vec<Row>) -> Self {
        if self.rows.is_some() {
            self.fail("query->rows conflicts");
        } else {
            self.rows = Some(rows);
        }
        self
    }

    /// Explicit column order. Named rows are reordered to match it.
    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        self.fields = (!fields.is_empty()).then_some(fields);
        self
    }

    pub fn result(mut self, result: InsertResult) -> Self {
        self.result = result;
        self
    }

    /// Parse a loosely-typed spec object with the keys `table`, `row`,
    /// `rows`, `fields` and `result` (`"count"` or `"id"`).
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let obj = json
            .as_object()
            .ok_or_else(|| Error::InsertBuild("Insert spec must be an object".to_string()))?;

        let mut spec = InsertSpec::default();
        for (key, value) in obj {
            match key.as_str() {
                "table" => {
                    let table = value
                        .as_str()
                        .ok_or_else(|| build_error("Bad value for query->table"))?;
                    spec.table = Some(table.to_string());
                }
                "row" => {
                    if spec.rows.is_some() {
                        return Err(build_error("query->row conflicts"));
                    }
                    if !(value.is_object() || value.is_array()) {
                        return Err(build_error("bad value in query->row"));
                    }
                    spec.rows = Some(vec![row_from_json(value, 0)?]);
                }
                "rows" => {
                    if spec.rows.is_some() {
                        return Err(build_error("query->rows conflicts"));
                    }
                    let items = value
                        .as_array()
                        .ok_or_else(|| build_error("bad value in query->rows"))?;
                    let rows = items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| row_from_json(item, i))
                        .collect::<Result<Vec<_>>>()?;
                    spec.rows = Some(rows);
                }
                "fields" => {
                    let fields = value
                        .as_array()
                        .filter(|items| !items.is_empty())
                        .and_then(|items| {
                            items
                                .iter()
                                .map(|f| f.as_str().map(str::to_string))
                                .collect::<Option<Vec<_>>>()
                        })
                        .ok_or_else(|| build_error("bad value in query->fields"))?;
                    spec.fields = Some(fields);
                }
                "result" => {
                    spec.result = match value.as_str() {
                        Some("id") => InsertResult::LastId,
                        Some("count") => InsertResult::AffectedCount,
                        _ => return Err(build_error("bad value in query->result")),
                    };
                }
                other => return Err(Error::InsertBuild(format!("Unknown insert entry {}", other))),
            }
        }
        Ok(spec)
    }

    fn fail(&mut self, msg: &str) {
        if self.error.is_none() {
            self.error = Some(msg.to_string());
        }
    }
}

fn build_error(msg: &str) -> Error {
    Error::InsertBuild(msg.to_string())
}

fn row_from_json(value: &serde_json::Value, index: usize) -> Result<Row> {
    Row::from_json(value.clone()).map_err(|_| Error::InsertBuild(format!("Bad type in row {}", index)))
}

/// Input accepted by [`Connection::insert`].
#[derive(Debug, Clone, PartialEq)]
pub enum InsertTarget {
    /// Bare table name plus rows; fields come from the first row.
    Simple { table: String, rows: Vec<Row> },
    /// Full spec with optional field order and result type.
    Spec(InsertSpec),
}

impl InsertTarget {
    pub fn simple(table: impl Into<String>, rows: Vec<Row>) -> Self {
        InsertTarget::Simple {
            table: table.into(),
            rows,
        }
    }

    pub fn single(table: impl Into<String>, row: Row) -> Self {
        InsertTarget::simple(table, vec![row])
    }
}

impl From<InsertSpec> for InsertTarget {
    fn from(spec: InsertSpec) -> Self {
        InsertTarget::Spec(spec)
    }
}

/// A validated insert: fixed field order and one value tuple per row.
///
/// This generates multi-row `INSERT ... VALUES (..),(..)` statements bounded
/// by [`InsertLimits`], executed one after another on the same connection.
/// Statements are not wrapped in a transaction; when a later statement fails,
/// earlier ones stay applied.
///
/// # Example
///
/// ```ignore
/// use sqlgate::{BatchInsert, InsertTarget, Row};
///
/// let rows = vec![
///     Row::named([("id", 1.into()), ("name", "a".into())]),
///     Row::named([("id", 2.into()), ("name", "b".into())]),
/// ];
/// let inserted = BatchInsert::new(InsertTarget::simple("users", rows))?
///     .execute(&mut conn)
///     .await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BatchInsert {
    table: String,
    fields: Vec<String>,
    tuples: Vec<Vec<Value>>,
    result: InsertResult,
}

impl BatchInsert {
    /// Validate `target` and normalize every row to the field order.
    pub fn new(target: InsertTarget) -> Result<Self> {
        let (table, rows, fields, result) = match target {
            InsertTarget::Simple { table, rows } => {
                (Some(table), Some(rows), None, InsertResult::AffectedCount)
            }
            InsertTarget::Spec(spec) => {
                if let Some(err) = spec.error {
                    return Err(Error::InsertBuild(err));
                }
                (spec.table, spec.rows, spec.fields, spec.result)
            }
        };

        let (Some(table), Some(rows)) = (table.filter(|t| !t.is_empty()), rows) else {
            return Err(build_error("Missing query information"));
        };

        let Some(first) = rows.first() else {
            return Ok(Self {
                table,
                fields: fields.unwrap_or_default(),
                tuples: Vec::new(),
                result,
            });
        };

        let fields = match fields {
            Some(fields) => fields,
            None => first
                .keys()
                .map(|keys| keys.map(str::to_string).collect())
                .unwrap_or_default(),
        };
        let width = if fields.is_empty() {
            first.len()
        } else {
            fields.len()
        };
        let tuples = normalize(rows, &fields, width)?;

        Ok(Self {
            table,
            fields,
            tuples,
            result,
        })
    }

    /// Insert entities whose columns come from their [`ToRow`] impl.
    pub fn from_entities<T: ToRow>(table: &str, entities: &[T]) -> Result<Self> {
        let spec = InsertSpec::new(table)
            .fields(T::insert_column_names().iter().copied())
            .rows(entities.iter().map(ToRow::to_row).collect());
        Self::new(spec.into())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column list; empty when positional rows were given without one.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// `INSERT INTO <table> [(<fields>)] VALUES `, shared by every statement.
    pub fn prefix(&self) -> String {
        let mut stmt = format!("INSERT INTO {} ", quote_name(&self.table));
        if !self.fields.is_empty() {
            stmt.push('(');
            stmt.push_str(&quote_name_list(&self.fields));
            stmt.push_str(") ");
        }
        stmt.push_str("VALUES ");
        stmt
    }

    /// Statements this insert emits under `limits`, built lazily.
    pub fn batches(&self, limits: InsertLimits) -> Batches<'_> {
        Batches {
            prefix: self.prefix(),
            tuples: self.tuples.iter(),
            limits,
        }
    }

    /// Run the insert on `conn`.
    ///
    /// Returns the number of rows inserted, or the last insert id when the
    /// spec asked for [`InsertResult::LastId`]. When a statement after the
    /// first fails, the error carries the rows already applied
    /// ([`Error::rows_committed`]).
    pub async fn execute<D: Driver>(&self, conn: &mut Connection<D>) -> Result<u64> {
        conn.clear_errors();
        self.run(conn).await
    }

    pub(crate) async fn run<D: Driver>(&self, conn: &mut Connection<D>) -> Result<u64> {
        if self.tuples.is_empty() {
            return Ok(0);
        }

        let mode = QueryMode::new(ResultKind::RowCount);
        let mut inserted: u64 = 0;
        for batch in self.batches(conn.insert_limits()) {
            debug!(
                table = %self.table,
                rows = batch.rows,
                bytes = batch.sql.len(),
                "flushing insert batch"
            );
            let affected = match conn.run(&batch.sql, Vec::new(), mode).await {
                Ok(out) => out.into_row_count().unwrap_or(0),
                Err(source) if inserted > 0 => {
                    return Err(Error::FlushFailed {
                        source: Box::new(source),
                        inserted,
                    });
                }
                Err(err) => return Err(err),
            };
            if affected != batch.rows as u64 {
                return Err(conn.fail(Error::PartialInsert {
                    affected,
                    attempted: batch.rows,
                    inserted,
                }));
            }
            inserted += affected;
        }

        match self.result {
            InsertResult::AffectedCount => Ok(inserted),
            InsertResult::LastId => Ok(conn.last_insert_id().unwrap_or(0)),
        }
    }
}

fn normalize(rows: Vec<Row>, fields: &[String], width: usize) -> Result<Vec<Vec<Value>>> {
    let positions: HashMap<&str, usize> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f.as_str(), i))
        .collect();

    let mut tuples = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        if row.is_empty() {
            return Err(Error::InsertBuild(format!("Empty row at {}", i)));
        }
        let tuple = match row {
            Row::Positional(values) => values,
            Row::Named(_) if fields.is_empty() => {
                return Err(Error::InsertBuild(format!("Bad type in row {}", i)));
            }
            Row::Named(record) => {
                if record.len() != width {
                    return Err(Error::InsertBuild(format!("Bad length in row {}", i)));
                }
                let mut slots: Vec<Option<Value>> = vec![None; width];
                for (key, value) in record {
                    let Some(&pos) = positions.get(key.as_str()) else {
                        return Err(Error::InsertBuild(format!("Bad length in row {}", i)));
                    };
                    slots[pos] = Some(value);
                }
                // record keys are unique, so equal length means every slot is filled
                slots.into_iter().flatten().collect()
            }
        };
        if tuple.len() != width {
            return Err(Error::InsertBuild(format!("Bad length in row {}", i)));
        }
        tuples.push(tuple);
    }
    Ok(tuples)
}

/// One INSERT statement and the number of tuples it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub sql: String,
    pub rows: usize,
}

/// Iterator over the statements of a [`BatchInsert`].
pub struct Batches<'a> {
    prefix: String,
    tuples: std::slice::Iter<'a, Vec<Value>>,
    limits: InsertLimits,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let mut sql = self.prefix.clone();
        let mut len = self.prefix.len() + 2;
        let mut rows = 0;

        for tuple in self.tuples.by_ref() {
            let vals = quote_list(tuple);
            len += vals.len() + 3;
            if rows > 0 {
                sql.push(',');
            }
            sql.push('(');
            sql.push_str(&vals);
            sql.push(')');
            rows += 1;

            if rows >= self.limits.max_rows || len >= self.limits.max_statement_len {
                break;
            }
        }

        (rows > 0).then_some(Batch { sql, rows })
    }
}
