//! Parser layer: turn files into raw string rows and feed them to a store

mod csv;
mod dat;

use std::path::Path;

use crate::config::{Config, Layout};
use crate::error::{ConversionError, Result};
use crate::model::{ColumnType, Ingest};

pub use self::csv::{read_csv, read_csv_from, read_records, read_records_from, CsvParser};
pub use self::dat::{read_dat, read_dat_from, DatParser};

/// Trait for parsing tabular data files
pub trait Parser {
    /// Parse a file into a store, collecting rows that fail conversion
    fn parse(&self, path: &Path, config: &Config) -> Result<Ingest>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for choosing a parser by file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(CsvParser), Box::new(DatParser)],
        }
    }

    /// Get a parser for the given file path; unknown extensions are read as CSV
    pub fn get_parser(&self, path: &Path) -> &dyn Parser {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        self.parsers
            .iter()
            .find(|p| p.supports_extension(&ext))
            .map(|p| p.as_ref())
            .unwrap_or(&CsvParser)
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Ingest> {
        self.get_parser(path).parse(path, config)
    }
}

/// Load `config.path` with the parser matching its extension
pub fn load(config: &Config) -> Result<Ingest> {
    ParserFactory::new().parse(&config.path, config)
}

/// Shared arguments for the store-producing readers
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions<'a> {
    pub header: Option<&'a [String]>,
    pub types: Option<&'a [ColumnType]>,
    pub layout: Layout,
}

impl<'a> ReadOptions<'a> {
    pub fn from_config(config: &'a Config) -> Self {
        Self {
            header: config.header.as_deref(),
            types: config.types(),
            layout: config.layout,
        }
    }
}

impl Default for ReadOptions<'_> {
    fn default() -> Self {
        Self {
            header: None,
            types: None,
            layout: Layout::Columns,
        }
    }
}

/// Warn once about rows skipped by a typed record read
fn warn_skipped(errors: &[ConversionError]) {
    if !errors.is_empty() {
        let lines = errors
            .iter()
            .map(|e| e.line.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        tracing::warn!(
            count = errors.len(),
            lines = %lines,
            "Some rows could not be parsed and were skipped"
        );
    }
}
