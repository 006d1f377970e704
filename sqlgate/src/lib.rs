//! sqlgate - MySQL statement gateway
//!
//! A thin execution layer over `mysql_async`: one explicit connection handle
//! with a prepared statement cache, result shaping, a read-only guard and
//! batched multi-row inserts.
//!
//! # Features
//!
//! - **Result Shaping**: affected count, scalar, row, rows or insert id per call
//! - **Statement Cache**: prepare once, reuse by exact SQL text
//! - **Read-Only Mode**: only reads and session setup reach the server
//! - **Batch Insert**: rows packed into size-bounded `INSERT ... VALUES` statements
//! - **Derive Macros**: `#[derive(FromRow, ToRow)]` for mapping structs to rows
//!
//! # Example
//!
//! ```ignore
//! use sqlgate::{FromRow, Query, Settings, ToRow};
//!
//! #[derive(FromRow, ToRow)]
//! pub struct User {
//!     #[sqlgate(skip_insert)]
//!     pub id: i64,
//!     pub username: String,
//!     pub email: String,
//! }
//!
//! async fn run(settings: &Settings) -> sqlgate::Result<()> {
//!     let mut conn = sqlgate::mysql::connect(settings).await?;
//!
//!     let user: Option<User> = Query::new("SELECT * FROM users WHERE id = ?")
//!         .bind(1)
//!         .fetch_optional(&mut conn)
//!         .await?;
//!
//!     let new_users = vec![User { id: 0, username: "bo".into(), email: "bo@x".into() }];
//!     conn.insert_entities("users", &new_users).await?;
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod guard;
pub mod mode;
pub mod mysql;
pub mod query;
pub mod quote;
pub mod row;
pub mod shape;
pub mod traits;
pub mod value;

#[cfg(test)]
mod mock;

// Re-export the derive macros
pub use sqlgate_derive::{FromRow, ToRow};

// Re-export main types
pub use batch::{BatchInsert, InsertLimits, InsertResult, InsertSpec, InsertTarget};
pub use config::Settings;
pub use connection::Connection;
pub use error::{Error, ErrorState, Result};
pub use mode::{QueryMode, ResultKind};
pub use mysql::{MySqlConnection, MySqlDriver};
pub use query::Query;
pub use row::{Record, Row};
pub use shape::Output;
pub use traits::{Driver, DriverError, DriverResult, FromRow, FromValue, ResultSet, ToRow, ToValue};
pub use value::Value;
