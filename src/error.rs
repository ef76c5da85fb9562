//! Error types for ingest, store access and rendering

use thiserror::Error;

use crate::model::ColumnType;

/// A raw field that could not be converted to its column type during ingest.
///
/// These are collected rather than raised so a bulk read can continue past
/// malformed lines.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {reason} (row: {})", .row.join(","))]
pub struct ConversionError {
    /// 1-based line in the source, counting the header as line 1
    pub line: usize,
    /// The offending raw row, exactly as read
    pub row: Vec<String>,
    /// Column whose field failed, if the failure is tied to one
    pub column: Option<String>,
    /// Human readable reason
    pub reason: String,
}

impl ConversionError {
    pub fn new(line: usize, row: Vec<String>, reason: impl Into<String>) -> Self {
        Self {
            line,
            row,
            column: None,
            reason: reason.into(),
        }
    }

    pub fn for_column(
        line: usize,
        row: Vec<String>,
        column: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            line,
            row,
            column: Some(column.into()),
            reason: reason.into(),
        }
    }
}

/// Errors returned by tabula operations
#[derive(Debug, Error)]
pub enum Error {
    // Schema mismatches
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("header has {header} columns but {types} column types were given")]
    HeaderMismatch { header: usize, types: usize },

    #[error("record is missing column '{0}'")]
    MissingColumn(String),

    #[error("record has column '{0}' which is not in the schema")]
    UnknownColumn(String),

    #[error("column '{column}' expects {expected}, got '{value}'")]
    IncompatibleValue {
        column: String,
        expected: ColumnType,
        value: String,
    },

    #[error("row {row} has no field '{column}'")]
    MissingField { row: usize, column: String },

    #[error("columns have unequal lengths ({0:?})")]
    RaggedColumns(Vec<usize>),

    // Access
    #[error("index {index} out of bounds for store of {len} rows")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid range {start}..{end}")]
    InvalidRange { start: usize, end: usize },

    // Arithmetic
    #[error("sum of column '{column}' overflows")]
    Overflow { column: String },

    // Configuration
    #[error("unknown output format '{0}' (expected text, csv or html)")]
    UnknownFormat(String),

    #[error("unknown column type '{0}' (expected str, int or float)")]
    UnknownColumnType(String),

    #[error("unknown layout '{0}' (expected columns or rows)")]
    UnknownLayout(String),

    // Input
    #[error("input has no header row")]
    MissingHeader,

    #[error("invalid date '{0}' (expected MM/DD/YYYY)")]
    InvalidDate(String),

    #[error("cannot sell {requested} shares of {name}, only {held} held")]
    InsufficientShares {
        name: String,
        held: i64,
        requested: i64,
    },

    #[error("cannot sell a negative number of shares ({requested}) of {name}")]
    NegativeShares { name: String, requested: i64 },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors where a record or column list disagrees with a schema
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            Error::DuplicateColumn(_)
                | Error::HeaderMismatch { .. }
                | Error::MissingColumn(_)
                | Error::UnknownColumn(_)
                | Error::IncompatibleValue { .. }
                | Error::MissingField { .. }
                | Error::RaggedColumns(_)
        )
    }

    /// True for errors raised while selecting formats, types or layouts
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnknownFormat(_) | Error::UnknownColumnType(_) | Error::UnknownLayout(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
