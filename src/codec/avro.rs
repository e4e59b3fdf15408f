//! Avro binary codec

use super::Codec;
use crate::record::{Record, Value};
use crate::{Error, Result};

use apache_avro::types::Value as AvroValue;
use apache_avro::Schema;

/// Avro single-datum codec (no container framing)
#[derive(Debug, Clone, Copy, Default)]
pub struct AvroCodec;

impl AvroCodec {
    pub fn new() -> Self {
        Self
    }

    /// Parse schema text, validating that the top level is a record
    pub fn parse_schema(schema: &str) -> Result<Schema> {
        let parsed = Schema::parse_str(schema)
            .map_err(|e| Error::Decode(format!("invalid Avro schema: {e}")))?;
        match parsed {
            Schema::Record(_) => Ok(parsed),
            _ => Err(Error::Decode(
                "Avro schema must have a record at the top level".to_string(),
            )),
        }
    }
}

impl Codec for AvroCodec {
    fn decode(&self, schema: &str, payload: &[u8]) -> Result<Record> {
        let schema = Self::parse_schema(schema)?;
        let mut reader = payload;
        let datum = apache_avro::from_avro_datum(&schema, &mut reader, None)?;

        match datum {
            AvroValue::Record(fields) => Ok(fields
                .into_iter()
                .map(|(name, value)| (name, from_avro(value)))
                .collect()),
            other => Err(Error::Decode(format!(
                "expected a record datum, got {}",
                avro_kind(&other)
            ))),
        }
    }

    fn encode(&self, schema: &str, record: &Record) -> Result<Vec<u8>> {
        let schema = Self::parse_schema(schema).map_err(|e| Error::Encode(e.to_string()))?;

        let fields = record
            .iter()
            .map(|(name, value)| Ok((name.to_string(), to_avro(name, value)?)))
            .collect::<Result<Vec<_>>>()?;

        // Resolution fills schema defaults and wraps union branches.
        let datum = AvroValue::Record(fields)
            .resolve(&schema)
            .map_err(|e| Error::Encode(e.to_string()))?;
        apache_avro::to_avro_datum(&schema, datum).map_err(|e| Error::Encode(e.to_string()))
    }
}

fn from_avro(value: AvroValue) -> Value {
    match value {
        AvroValue::Boolean(b) => Value::Boolean(b),
        AvroValue::Bytes(b) | AvroValue::Fixed(_, b) => Value::Binary(b),
        AvroValue::Float(f) => Value::Float32(f),
        AvroValue::Double(d) => Value::Float64(d),
        AvroValue::Int(i) => Value::Int32(i),
        AvroValue::Long(l) => Value::Int64(l),
        AvroValue::String(s) | AvroValue::Enum(_, s) => Value::Utf8(s),
        AvroValue::Union(_, inner) => from_avro(*inner),
        other => Value::Unsupported(avro_kind(&other).to_string()),
    }
}

fn to_avro(name: &str, value: &Value) -> Result<AvroValue> {
    Ok(match value {
        Value::Boolean(b) => AvroValue::Boolean(*b),
        Value::Binary(b) => AvroValue::Bytes(b.clone()),
        Value::Float32(f) => AvroValue::Float(*f),
        Value::Float64(d) => AvroValue::Double(*d),
        Value::Int32(i) => AvroValue::Int(*i),
        Value::Int64(l) => AvroValue::Long(*l),
        Value::Utf8(s) => AvroValue::String(s.clone()),
        Value::Unsupported(kind) => {
            return Err(Error::UnsupportedType {
                field: name.to_string(),
                kind: kind.clone(),
            })
        }
    })
}

fn avro_kind(value: &AvroValue) -> &'static str {
    match value {
        AvroValue::Null => "null",
        AvroValue::Boolean(_) => "boolean",
        AvroValue::Int(_) => "int",
        AvroValue::Long(_) => "long",
        AvroValue::Float(_) => "float",
        AvroValue::Double(_) => "double",
        AvroValue::Bytes(_) => "bytes",
        AvroValue::String(_) => "string",
        AvroValue::Fixed(..) => "fixed",
        AvroValue::Enum(..) => "enum",
        AvroValue::Union(..) => "union",
        AvroValue::Array(_) => "array",
        AvroValue::Map(_) => "map",
        AvroValue::Record(_) => "record",
        AvroValue::Date(_) => "date",
        AvroValue::Decimal(_) => "decimal",
        AvroValue::Uuid(_) => "uuid",
        AvroValue::Duration(_) => "duration",
        _ => "logical",
    }
}
