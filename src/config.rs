//! Configuration handling for tabula

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::model::ColumnType;

/// Output format for rendered tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "html" => Ok(OutputFormat::Html),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Physical layout of a store's data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// One typed vector per column
    #[default]
    Columns,
    /// One vector of values per row
    Rows,
}

impl std::str::FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "columns" | "column" => Ok(Layout::Columns),
            "rows" | "row" => Ok(Layout::Rows),
            _ => Err(Error::UnknownLayout(s.to_string())),
        }
    }
}

/// Configuration for loading and printing a table
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Path to the input file
    pub path: PathBuf,
    /// Column names for headerless inputs; `None` takes them from the first line
    pub header: Option<Vec<String>>,
    /// Declared column types; `None` reads every column as a string
    pub column_types: Option<Vec<ColumnType>>,
    /// Columns to print, in order; empty prints the whole schema
    pub columns: Vec<String>,
    /// Output format
    pub output_format: OutputFormat,
    /// Physical layout of the loaded store
    pub layout: Layout,
}

impl Config {
    /// Create a new Config reading from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Supply column names for a file without a header line
    pub fn with_header(mut self, header: Vec<String>) -> Self {
        self.header = Some(header);
        self
    }

    /// Set the declared column types
    pub fn with_types(mut self, types: Vec<ColumnType>) -> Self {
        self.column_types = Some(types);
        self
    }

    /// Set the columns to print
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the store layout
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn types(&self) -> Option<&[ColumnType]> {
        self.column_types.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_keys() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        let err = "xml".parse::<OutputFormat>().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_layout_keys() {
        assert_eq!("rows".parse::<Layout>().unwrap(), Layout::Rows);
        assert_eq!("Columns".parse::<Layout>().unwrap(), Layout::Columns);
        assert!(matches!("grid".parse::<Layout>(), Err(Error::UnknownLayout(_))));
    }

    #[test]
    fn test_builder() {
        let config = Config::new("Data/portfolio.csv")
            .with_types(vec![ColumnType::Str, ColumnType::Int, ColumnType::Float])
            .with_layout(Layout::Rows)
            .with_output_format(OutputFormat::Html);
        assert_eq!(config.types().map(<[_]>::len), Some(3));
        assert_eq!(config.layout, Layout::Rows);
        assert!(config.columns.is_empty());
    }
}
