//! Schema-encoded payload codecs
//!
//! The pipeline treats the binary encoding as a black box: given the schema
//! text resolved for an event type, a [`Codec`] turns raw bytes into a
//! [`Record`](crate::record::Record) and back.

mod avro;

pub use avro::AvroCodec;

use crate::record::Record;
use crate::Result;

/// Binary codec keyed by schema text
pub trait Codec: Send + Sync {
    /// Decode one payload written with `schema`
    fn decode(&self, schema: &str, payload: &[u8]) -> Result<Record>;

    /// Encode `record` with `schema`
    fn encode(&self, schema: &str, record: &Record) -> Result<Vec<u8>>;
}
