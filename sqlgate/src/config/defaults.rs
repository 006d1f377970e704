//! Default configuration values - single source of truth

/// Default server host
pub const HOST: &str = "localhost";

/// Default MySQL port
pub const PORT: u16 = 3306;

/// Connections start writable
pub const READ_ONLY: bool = false;

/// Session time zone applied after connecting (UTC)
pub const TIME_ZONE: &str = "+00:00";

/// Default cap on value tuples per INSERT statement
pub const MAX_INSERT_ROWS: usize = crate::batch::DEFAULT_MAX_ROWS;

/// Default cap on INSERT statement length in bytes
pub const MAX_INSERT_STATEMENT_LEN: usize = crate::batch::DEFAULT_MAX_STATEMENT_LEN;
