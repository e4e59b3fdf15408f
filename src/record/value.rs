//! Scalar values held by a [`Record`](super::Record)

use serde::Serialize;

/// One scalar field value
///
/// The seven primitive variants are the only kinds that can be converted to
/// a typed column. Anything else a codec produces lands in
/// [`Value::Unsupported`], carrying the name of the source kind so that the
/// type mapper can reject it with a useful message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Binary(Vec<u8>),
    Float32(f32),
    Float64(f64),
    Int32(i32),
    Int64(i64),
    Utf8(String),
    /// Value of a kind with no column mapping (null, list, map, nested record, ...)
    Unsupported(String),
}

impl Value {
    /// Short name of the runtime kind
    pub fn kind(&self) -> &str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Binary(_) => "binary",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Utf8(_) => "utf8",
            Value::Unsupported(kind) => kind,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(v.to_vec())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}
