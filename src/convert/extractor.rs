//! Single-row RecordBatch → Record

use super::mapper::ColumnType;
use crate::record::{Record, Value};
use crate::{Error, Result};

use arrow_array::{
    Array, ArrayRef, BinaryArray, BooleanArray, Float32Array, Float64Array, Int32Array,
    Int64Array, RecordBatch, StringArray,
};
use arrow_schema::Schema;

/// Read the single row of `batch` into a record.
///
/// Fails with [`Error::RowCount`] unless the batch holds exactly one row.
pub fn batch_to_record(batch: &RecordBatch) -> Result<Record> {
    if batch.num_rows() != 1 {
        return Err(Error::RowCount {
            rows: batch.num_rows(),
        });
    }
    extract_columns(batch.schema_ref(), batch.columns())
}

/// Read row 0 of each column as the type its schema field declares.
///
/// `columns` are paired with `schema` fields by position. A column whose
/// runtime representation does not match the declared type is reported as
/// [`Error::UnreadableColumn`]; a declared type outside the seven supported
/// kinds as [`Error::UnsupportedType`]. Field names must be unique.
pub fn extract_columns(schema: &Schema, columns: &[ArrayRef]) -> Result<Record> {
    if schema.fields().len() != columns.len() {
        return Err(Error::UnreadableColumn {
            field: "*".to_string(),
            reason: format!(
                "schema declares {} fields but {} columns were received",
                schema.fields().len(),
                columns.len()
            ),
        });
    }

    let mut record = Record::new();
    for (field, column) in schema.fields().iter().zip(columns) {
        let name = field.name();
        let column_type =
            ColumnType::from_data_type(field.data_type()).ok_or_else(|| Error::UnsupportedType {
                field: name.clone(),
                kind: field.data_type().to_string(),
            })?;

        if column.len() != 1 {
            return Err(Error::RowCount { rows: column.len() });
        }
        if column.is_null(0) {
            return Err(Error::UnreadableColumn {
                field: name.clone(),
                reason: "row 0 is null".to_string(),
            });
        }

        let value = read_value(name, column_type, column.as_ref())?;
        if record.insert(name.clone(), value).is_some() {
            return Err(Error::UnreadableColumn {
                field: name.clone(),
                reason: "duplicate field".to_string(),
            });
        }
    }
    Ok(record)
}

fn read_value(name: &str, column_type: ColumnType, column: &dyn Array) -> Result<Value> {
    let any = column.as_any();
    let value = match column_type {
        ColumnType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|c| Value::Boolean(c.value(0))),
        ColumnType::Binary => any
            .downcast_ref::<BinaryArray>()
            .map(|c| Value::Binary(c.value(0).to_vec())),
        ColumnType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|c| Value::Float32(c.value(0))),
        ColumnType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|c| Value::Float64(c.value(0))),
        ColumnType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|c| Value::Int32(c.value(0))),
        ColumnType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|c| Value::Int64(c.value(0))),
        ColumnType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|c| Value::Utf8(c.value(0).to_string())),
    };

    value.ok_or_else(|| Error::UnreadableColumn {
        field: name.to_string(),
        reason: format!(
            "declared {} but column holds {}",
            column_type,
            column.data_type()
        ),
    })
}
