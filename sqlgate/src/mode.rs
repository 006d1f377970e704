//! Result kinds and query flags

use crate::error::{Error, Result};

/// Bit-encoded query modes, for callers that pass a single integer.
///
/// The low byte selects the [`ResultKind`]; `NUMBERED` and `CACHE` are flags.
pub mod raw {
    pub const ROW_COUNT: u32 = 1;
    pub const SINGLE: u32 = 2;
    pub const ROW: u32 = 3;
    pub const INSERT_ID: u32 = 5;
    pub const ROWS: u32 = 6;
    pub const TYPE_MASK: u32 = 0x00ff;
    pub const NUMBERED: u32 = 0x1000;
    pub const CACHE: u32 = 0x2000;
}

/// Shape of the value a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResultKind {
    /// Number of rows affected
    RowCount,
    /// First column of the first row
    SingleScalar,
    /// First row
    SingleRow,
    /// Every row
    #[default]
    ManyRows,
    /// Id generated by the most recent insert
    InsertId,
}

/// Result kind plus the `numbered` and `cache` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct QueryMode {
    pub kind: ResultKind,
    /// Rows as positional sequences instead of named records
    pub numbered: bool,
    /// Prepare and cache the statement even without parameters
    pub cache: bool,
}

impl QueryMode {
    pub const fn new(kind: ResultKind) -> Self {
        Self {
            kind,
            numbered: false,
            cache: false,
        }
    }

    pub const fn numbered(mut self) -> Self {
        self.numbered = true;
        self
    }

    pub const fn cached(mut self) -> Self {
        self.cache = true;
        self
    }

    /// Decode a bit-encoded mode.
    pub fn from_bits(bits: u32) -> Result<Self> {
        let kind = match bits & raw::TYPE_MASK {
            raw::ROW_COUNT => ResultKind::RowCount,
            raw::SINGLE => ResultKind::SingleScalar,
            raw::ROW => ResultKind::SingleRow,
            raw::INSERT_ID => ResultKind::InsertId,
            raw::ROWS => ResultKind::ManyRows,
            _ => return Err(Error::UnknownQueryType(bits)),
        };
        Ok(Self {
            kind,
            numbered: bits & raw::NUMBERED != 0,
            cache: bits & raw::CACHE != 0,
        })
    }

    pub fn bits(&self) -> u32 {
        let kind = match self.kind {
            ResultKind::RowCount => raw::ROW_COUNT,
            ResultKind::SingleScalar => raw::SINGLE,
            ResultKind::SingleRow => raw::ROW,
            ResultKind::InsertId => raw::INSERT_ID,
            ResultKind::ManyRows => raw::ROWS,
        };
        let mut bits = kind;
        if self.numbered {
            bits |= raw::NUMBERED;
        }
        if self.cache {
            bits |= raw::CACHE;
        }
        bits
    }
}

impl From<ResultKind> for QueryMode {
    fn from(kind: ResultKind) -> Self {
        QueryMode::new(kind)
    }
}

impl TryFrom<u32> for QueryMode {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self> {
        QueryMode::from_bits(bits)
    }
}
