//! Dynamic value → column type mapping

use crate::record::Value;
use crate::{Error, Result};

use arrow_schema::DataType;
use std::fmt;

/// Column type tag for the seven supported primitive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Boolean,
    Binary,
    Float32,
    Float64,
    Int32,
    Int64,
    Utf8,
}

impl ColumnType {
    pub const ALL: [ColumnType; 7] = [
        ColumnType::Boolean,
        ColumnType::Binary,
        ColumnType::Float32,
        ColumnType::Float64,
        ColumnType::Int32,
        ColumnType::Int64,
        ColumnType::Utf8,
    ];

    /// Arrow data type used for columns of this kind
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnType::Boolean => DataType::Boolean,
            ColumnType::Binary => DataType::Binary,
            ColumnType::Float32 => DataType::Float32,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Int32 => DataType::Int32,
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Utf8 => DataType::Utf8,
        }
    }

    /// Reverse of [`ColumnType::data_type`]; `None` for any other Arrow type
    pub fn from_data_type(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::Boolean => Some(ColumnType::Boolean),
            DataType::Binary => Some(ColumnType::Binary),
            DataType::Float32 => Some(ColumnType::Float32),
            DataType::Float64 => Some(ColumnType::Float64),
            DataType::Int32 => Some(ColumnType::Int32),
            DataType::Int64 => Some(ColumnType::Int64),
            DataType::Utf8 => Some(ColumnType::Utf8),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Binary => "binary",
            ColumnType::Float32 => "float32",
            ColumnType::Float64 => "float64",
            ColumnType::Int32 => "int32",
            ColumnType::Int64 => "int64",
            ColumnType::Utf8 => "utf8",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column type for a field's value.
///
/// Fails with [`Error::UnsupportedType`] naming `field` when the value is not
/// one of the seven primitives.
pub fn map_type(field: &str, value: &Value) -> Result<ColumnType> {
    match value {
        Value::Boolean(_) => Ok(ColumnType::Boolean),
        Value::Binary(_) => Ok(ColumnType::Binary),
        Value::Float32(_) => Ok(ColumnType::Float32),
        Value::Float64(_) => Ok(ColumnType::Float64),
        Value::Int32(_) => Ok(ColumnType::Int32),
        Value::Int64(_) => Ok(ColumnType::Int64),
        Value::Utf8(_) => Ok(ColumnType::Utf8),
        Value::Unsupported(kind) => Err(Error::UnsupportedType {
            field: field.to_string(),
            kind: kind.clone(),
        }),
    }
}
