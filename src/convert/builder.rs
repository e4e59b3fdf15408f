//! Record → single-row RecordBatch

use super::mapper::{map_type, ColumnType};
use crate::record::{Record, Value};
use crate::{Error, Result};

use arrow_array::{
    ArrayRef, BinaryArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    RecordBatch, RecordBatchOptions, StringArray,
};
use arrow_schema::{Field, Schema, SchemaRef};
use std::sync::Arc;

/// Infer the batch schema from a record's runtime value types.
///
/// Fields appear in the record's iteration (name) order and are non-nullable.
/// The first unmappable value rejects the whole record.
pub fn infer_schema(record: &Record) -> Result<SchemaRef> {
    let fields = record
        .iter()
        .map(|(name, value)| {
            let column_type = map_type(name, value)?;
            Ok(Field::new(name, column_type.data_type(), false))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Arc::new(Schema::new(fields)))
}

/// Build a single-row batch for `record` laid out by `schema`.
///
/// `schema` may come from [`infer_schema`] or be supplied by the caller, e.g.
/// reused across events of the same type. Each field's value must be of the
/// exact kind its column declares; record fields absent from the schema are
/// not carried over.
pub fn build_batch(schema: SchemaRef, record: &Record) -> Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let name = field.name();
        let column_type =
            ColumnType::from_data_type(field.data_type()).ok_or_else(|| Error::UnsupportedType {
                field: name.clone(),
                kind: field.data_type().to_string(),
            })?;
        let value = record
            .get(name)
            .ok_or_else(|| Error::MissingField(name.clone()))?;

        columns.push(single_value_column(name, column_type, value)?);
    }

    // An explicit row count keeps a field-less record at one row
    let options = RecordBatchOptions::new().with_row_count(Some(1));
    Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
}

/// Infer the schema of `record` and build its single-row batch.
///
/// The schema travels with the batch (`batch.schema()`).
pub fn record_to_batch(record: &Record) -> Result<RecordBatch> {
    let schema = infer_schema(record)?;
    build_batch(schema, record)
}

fn single_value_column(name: &str, column_type: ColumnType, value: &Value) -> Result<ArrayRef> {
    let column: ArrayRef = match (column_type, value) {
        (ColumnType::Boolean, Value::Boolean(v)) => Arc::new(BooleanArray::from(vec![*v])),
        (ColumnType::Binary, Value::Binary(v)) => {
            Arc::new(BinaryArray::from_vec(vec![v.as_slice()]))
        }
        (ColumnType::Float32, Value::Float32(v)) => Arc::new(Float32Array::from(vec![*v])),
        (ColumnType::Float64, Value::Float64(v)) => Arc::new(Float64Array::from(vec![*v])),
        (ColumnType::Int32, Value::Int32(v)) => Arc::new(Int32Array::from(vec![*v])),
        (ColumnType::Int64, Value::Int64(v)) => Arc::new(Int64Array::from(vec![*v])),
        (ColumnType::Utf8, Value::Utf8(v)) => Arc::new(StringArray::from(vec![v.as_str()])),
        (expected, actual) => {
            return Err(Error::TypeMismatch {
                field: name.to_string(),
                expected,
                actual: actual.kind().to_string(),
            })
        }
    };
    Ok(column)
}
