//! tabula - typed tables from CSV data
//!
//! Loads delimited text into a [`Store`] with a typed schema, then prints any
//! sequence of records with named fields as a text, CSV or HTML table.

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod parser;
pub mod queries;

pub use config::{Config, Layout, OutputFormat};
pub use error::{ConversionError, Error, Result};
pub use model::{ColumnType, FieldAccess, Record, Schema, Store, Value};
pub use output::{print_table, render, TableFormatter};
