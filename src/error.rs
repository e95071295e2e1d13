//! Error taxonomy for carrier adapters.
//!
//! Extraction errors (`ReaderConstruction`, `Read`, `DateParse`, `FieldParse`)
//! abort the current batch. `AccountMismatch` is only ever collected by
//! validation and handed back to the caller as data.

use thiserror::Error;

pub type Result<T, E = AdapterError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to create reader: {0}")]
    ReaderConstruction(String),

    #[error("failed to read records: {0}")]
    Read(String),

    #[error("header {column:?}: invalid date {value:?}")]
    DateParse { column: String, value: String },

    #[error("parse {column}: {source}")]
    FieldParse {
        column: String,
        #[source]
        source: FieldParseCause,
    },

    #[error("account number mismatch: in bill={found}, given={expected}")]
    AccountMismatch { expected: String, found: String },
}

#[derive(Debug, Error)]
pub enum FieldParseCause {
    #[error("invalid float {value:?}: {source}")]
    Float {
        value: String,
        source: std::num::ParseFloatError,
    },
    #[error("invalid integer {value:?}: {source}")]
    Integer {
        value: String,
        source: std::num::ParseIntError,
    },
}

impl AdapterError {
    /// Column that produced the error, when the error came from a row cell.
    pub fn column(&self) -> Option<&str> {
        match self {
            AdapterError::DateParse { column, .. } | AdapterError::FieldParse { column, .. } => {
                Some(column)
            }
            _ => None,
        }
    }
}

impl From<csv::Error> for AdapterError {
    fn from(err: csv::Error) -> Self {
        AdapterError::Read(err.to_string())
    }
}
