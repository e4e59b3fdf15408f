//! Error types for the scoring pipeline

use crate::convert::ColumnType;
use std::fmt;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the scoring pipeline
///
/// Every variant is terminal for the invocation that produced it; nothing in
/// the crate retries internally.
#[derive(Debug)]
pub enum Error {
    /// A value or schema field uses a kind outside the seven supported primitives
    UnsupportedType { field: String, kind: String },
    /// A value's runtime kind disagrees with the column type declared for its field
    TypeMismatch {
        field: String,
        expected: ColumnType,
        actual: String,
    },
    /// A schema field has no value in the record being converted
    MissingField(String),
    /// A response column cannot be read as its declared type
    UnreadableColumn { field: String, reason: String },
    /// A batch handed to extraction does not hold exactly one row
    RowCount { rows: usize },
    /// Remote schema store fetch failed
    Fetch {
        path: String,
        source: object_store::Error,
    },
    /// Schema cache backend failure
    Cache(String),
    /// Codec failed to decode a payload
    Decode(String),
    /// Codec failed to encode a record
    Encode(String),
    /// Scoring exchange failed to open, write, or read
    Exchange(String),
    /// A network call exceeded its deadline
    Timeout { operation: &'static str },
    /// Arrow-related errors
    Arrow(arrow::error::ArrowError),
    /// Configuration errors
    Config(String),
    /// Internal error
    Internal(String),
}

impl Error {
    /// Stable short label used as a metric attribute.
    pub fn class(&self) -> &'static str {
        match self {
            Error::UnsupportedType { .. } => "unsupported_type",
            Error::TypeMismatch { .. } => "type_mismatch",
            Error::MissingField(_) => "missing_field",
            Error::UnreadableColumn { .. } => "unreadable_column",
            Error::RowCount { .. } => "row_count",
            Error::Fetch { .. } => "fetch",
            Error::Cache(_) => "cache",
            Error::Decode(_) => "decode",
            Error::Encode(_) => "encode",
            Error::Exchange(_) => "exchange",
            Error::Timeout { .. } => "timeout",
            Error::Arrow(_) => "arrow",
            Error::Config(_) => "config",
            Error::Internal(_) => "internal",
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Fetch { source, .. } => Some(source),
            Error::Arrow(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedType { field, kind } => {
                write!(f, "Unsupported type for field '{}': {}", field, kind)
            }
            Error::TypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Type mismatch for field '{}': expected {}, got {}",
                field, expected, actual
            ),
            Error::MissingField(field) => write!(f, "Missing value for field '{}'", field),
            Error::UnreadableColumn { field, reason } => {
                write!(f, "Unreadable column '{}': {}", field, reason)
            }
            Error::RowCount { rows } => {
                write!(f, "Expected a single-row batch, got {} rows", rows)
            }
            Error::Fetch { path, source } => {
                write!(f, "Schema fetch failed for '{}': {}", path, source)
            }
            Error::Cache(msg) => write!(f, "Cache error: {}", msg),
            Error::Decode(msg) => write!(f, "Decode error: {}", msg),
            Error::Encode(msg) => write!(f, "Encode error: {}", msg),
            Error::Exchange(msg) => write!(f, "Exchange error: {}", msg),
            Error::Timeout { operation } => write!(f, "Operation timed out: {}", operation),
            Error::Arrow(e) => write!(f, "Arrow error: {}", e),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<arrow::error::ArrowError> for Error {
    fn from(e: arrow::error::ArrowError) -> Self {
        Error::Arrow(e)
    }
}

impl From<apache_avro::Error> for Error {
    fn from(e: apache_avro::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        Error::Exchange(format!("{}: {}", status.code(), status.message()))
    }
}

impl From<arrow_flight::error::FlightError> for Error {
    fn from(e: arrow_flight::error::FlightError) -> Self {
        Error::Exchange(e.to_string())
    }
}
