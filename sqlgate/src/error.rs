//! Error types for sqlgate

use thiserror::Error;

use crate::traits::DriverError;

/// Result type alias for sqlgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes recorded in [`ErrorState`].
///
/// Positive codes other than these come straight from the server.
pub mod codes {
    /// No error recorded.
    pub const NONE: i32 = 0;
    /// Rejected by the application layer (read-only guard, conversions, generic failures).
    pub const APPLICATION: i32 = -1;
    /// Insert could not be built or did not insert every row.
    pub const INSERT_BUILD: i32 = 71;
    /// Result kind not recognized.
    pub const UNKNOWN_QUERY_TYPE: i32 = 72;
    /// Driver could not supply error information.
    pub const ERROR_INFO_UNAVAILABLE: i32 = 73;
    /// Connection or driver-level failure without a vendor code.
    pub const CONNECTION: i32 = 79;
}

/// Errors that can occur during database operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Statement rejected because the connection is read-only
    #[error("Illegal query for read-only database")]
    ReadOnly,

    /// Malformed insert input
    #[error("{0}")]
    InsertBuild(String),

    /// A flush inserted fewer rows than it sent
    #[error("Only inserted {affected} of {attempted} rows")]
    PartialInsert {
        /// Rows the driver reported for the failing statement
        affected: u64,
        /// Tuples sent in the failing statement
        attempted: usize,
        /// Rows inserted by earlier statements of the same call
        inserted: u64,
    },

    /// A later flush of a batch insert failed after earlier flushes were applied
    #[error("{source}")]
    FlushFailed {
        /// The failure of the flush itself
        source: Box<Error>,
        /// Rows inserted by earlier statements of the same call
        inserted: u64,
    },

    /// Raw result kind not recognized
    #[error("Unknown query type {0}")]
    UnknownQueryType(u32),

    /// Server or driver reported an error
    #[error("{message}")]
    Driver { code: i32, message: String },

    /// The call failed but no usable error information was reported
    #[error("{0}")]
    Unavailable(String),

    /// Connection could not be opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Type conversion error
    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion {
        expected: &'static str,
        actual: String,
    },

    /// Column not found in row
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Null value for non-optional field
    #[error("Unexpected null value for column: {0}")]
    UnexpectedNull(String),

    /// A query expected to return a row returned none
    #[error("Expected one row, found none")]
    NoRows,
}

impl Error {
    /// The numeric code this error records in [`ErrorState`].
    pub fn code(&self) -> i32 {
        match self {
            Error::InsertBuild(_) | Error::PartialInsert { .. } => codes::INSERT_BUILD,
            Error::UnknownQueryType(_) => codes::UNKNOWN_QUERY_TYPE,
            Error::Driver { code, .. } => *code,
            Error::FlushFailed { source, .. } => source.code(),
            Error::Connection(_) => codes::CONNECTION,
            Error::ReadOnly
            | Error::Unavailable(_)
            | Error::Config(_)
            | Error::TypeConversion { .. }
            | Error::ColumnNotFound(_)
            | Error::UnexpectedNull(_)
            | Error::NoRows => codes::APPLICATION,
        }
    }

    /// Rows already committed by a batch insert that stopped early.
    pub fn rows_committed(&self) -> Option<u64> {
        match self {
            Error::PartialInsert { inserted, .. } | Error::FlushFailed { inserted, .. } => {
                Some(*inserted)
            }
            _ => None,
        }
    }

    /// Map native driver error info to an error.
    ///
    /// Returns `None` for "no error" and warning-class SQLSTATEs.
    pub fn from_driver(err: DriverError) -> Option<Error> {
        match err {
            DriverError::Native {
                state,
                code,
                message,
            } => {
                if is_non_fatal_state(&state) {
                    return None;
                }
                Some(match code {
                    Some(code) => Error::Driver {
                        code: i32::from(code),
                        message: message.unwrap_or_else(|| format!("DB Error {}", code)),
                    },
                    None => Error::Driver {
                        code: codes::CONNECTION,
                        message: message.unwrap_or(state),
                    },
                })
            }
            DriverError::NoInfo => Some(Error::Driver {
                code: codes::ERROR_INFO_UNAVAILABLE,
                message: "Cannot get error info".to_string(),
            }),
            DriverError::NotConnected => Some(Error::Driver {
                code: codes::ERROR_INFO_UNAVAILABLE,
                message: "Database not connected".to_string(),
            }),
        }
    }
}

fn is_non_fatal_state(state: &str) -> bool {
    state == "00000" || state.starts_with("01")
}

/// Last error recorded on a connection.
///
/// Cleared at the start of every public operation; the first failure of an
/// operation wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorState {
    code: i32,
    message: Option<String>,
}

impl ErrorState {
    /// `0` when no error, `-1` for application rejections, otherwise a mapped or server code.
    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.code != codes::NONE
    }

    pub fn clear(&mut self) {
        self.code = codes::NONE;
        self.message = None;
    }

    /// Record `err` unless an error is already recorded.
    pub fn record(&mut self, err: &Error) {
        if self.is_error() {
            return;
        }
        self.code = err.code();
        self.message = Some(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(state: &str, code: Option<u16>, message: Option<&str>) -> DriverError {
        DriverError::Native {
            state: state.to_string(),
            code,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_server_error_keeps_vendor_code() {
        let err = Error::from_driver(native("42S02", Some(1146), Some("Table 't' doesn't exist")))
            .unwrap();
        assert_eq!(err.code(), 1146);
        assert_eq!(err.to_string(), "Table 't' doesn't exist");
    }

    #[test]
    fn test_missing_message_gets_default() {
        let err = Error::from_driver(native("42000", Some(1064), None)).unwrap();
        assert_eq!(err.to_string(), "DB Error 1064");
    }

    #[test]
    fn test_missing_vendor_code_maps_to_connection_code() {
        let err = Error::from_driver(native("HY000", None, None)).unwrap();
        assert_eq!(err.code(), codes::CONNECTION);
        assert_eq!(err.to_string(), "HY000");
    }

    #[test]
    fn test_warnings_are_not_fatal() {
        assert!(Error::from_driver(native("00000", None, None)).is_none());
        assert!(Error::from_driver(native("01000", Some(1265), Some("truncated"))).is_none());
    }

    #[test]
    fn test_unavailable_info() {
        let err = Error::from_driver(DriverError::NotConnected).unwrap();
        assert_eq!(err.code(), codes::ERROR_INFO_UNAVAILABLE);
        assert_eq!(err.to_string(), "Database not connected");
        let err = Error::from_driver(DriverError::NoInfo).unwrap();
        assert_eq!(err.to_string(), "Cannot get error info");
    }

    #[test]
    fn test_flush_failure_keeps_source_code() {
        let err = Error::FlushFailed {
            source: Box::new(Error::Driver {
                code: 1062,
                message: "Duplicate entry".into(),
            }),
            inserted: 4,
        };
        assert_eq!(err.code(), 1062);
        assert_eq!(err.to_string(), "Duplicate entry");
        assert_eq!(err.rows_committed(), Some(4));
        assert_eq!(Error::ReadOnly.rows_committed(), None);
    }

    #[test]
    fn test_first_failure_wins() {
        let mut state = ErrorState::default();
        assert!(!state.is_error());
        state.record(&Error::ReadOnly);
        state.record(&Error::InsertBuild("later".into()));
        assert_eq!(state.code(), -1);
        assert_eq!(state.message(), Some("Illegal query for read-only database"));
        state.clear();
        assert_eq!(state.code(), 0);
        assert!(state.message().is_none());
    }
}
