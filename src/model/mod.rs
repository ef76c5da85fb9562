//! Data model for typed tabular data

mod record;
mod schema;
mod store;
mod value;

pub use record::{FieldAccess, Record};
pub use schema::{Column, ColumnType, Schema};
pub use store::{Ingest, IngestBuilder, Store};
pub use value::Value;
