//! Record ↔ Arrow conversion
//!
//! - [`map_type`] decides the column type of a dynamic value
//! - [`infer_schema`] / [`build_batch`] / [`record_to_batch`] turn one record
//!   into a single-row `RecordBatch`
//! - [`batch_to_record`] reads a single-row `RecordBatch` back into a record
//!
//! Both directions go through [`ColumnType`], so a type accepted on the way
//! out is always readable on the way back.

mod builder;
mod extractor;
mod mapper;

pub use builder::{build_batch, infer_schema, record_to_batch};
pub use extractor::{batch_to_record, extract_columns};
pub use mapper::{map_type, ColumnType};
