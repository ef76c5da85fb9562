//! CSV file parser

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, StringRecord};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{ConversionError, Error, Result};
use crate::model::{Ingest, IngestBuilder, Schema};

use super::{warn_skipped, Parser, ReadOptions};

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Ingest> {
        read_csv(path, ReadOptions::from_config(config))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "txt")
    }
}

/// Read a CSV file into a store. The first record is the header unless
/// `options.header` supplies the column names.
pub fn read_csv(path: &Path, options: ReadOptions<'_>) -> Result<Ingest> {
    debug!(path = %path.display(), "Reading CSV");
    let file = File::open(path)?;
    read_csv_from(BufReader::new(file), options)
}

/// Read CSV from any reader into a store
pub fn read_csv_from<R: Read>(reader: R, options: ReadOptions<'_>) -> Result<Ingest> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(options.header.is_none())
        .flexible(true)
        .from_reader(reader);

    let header: Vec<String> = match options.header {
        Some(header) => header.to_vec(),
        None => csv_reader.headers()?.iter().map(str::to_string).collect(),
    };
    if header.is_empty() {
        return Err(Error::MissingHeader);
    }

    let schema = Schema::from_header(&header, options.types)?;
    let mut builder = IngestBuilder::new(schema, options.layout);

    for (i, result) in csv_reader.byte_records().enumerate() {
        // Fallback when the reader has no position: +2 for 1-indexing and header
        let fallback = i + if options.header.is_some() { 1 } else { 2 };
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback);
                builder.push_error(ConversionError::new(line, Vec::new(), e.to_string()));
                continue;
            }
        };
        let line = raw.position().map(|p| p.line() as usize).unwrap_or(fallback);
        match StringRecord::from_byte_record(raw) {
            Ok(record) => builder.push_raw(line, record.iter().map(str::to_string).collect()),
            Err(e) => {
                let reason = e.utf8_error().to_string();
                let row = lossy_fields(&e.into_byte_record());
                builder.push_error(ConversionError::new(line, row, reason));
            }
        }
    }

    Ok(builder.finish())
}

/// Read a CSV file with a header into fixed-field records via serde.
///
/// Rows that fail to deserialize are skipped and returned alongside.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, Vec<ConversionError>)> {
    debug!(path = %path.display(), "Reading records");
    let file = File::open(path)?;
    read_records_from(BufReader::new(file))
}

/// Reader-based form of [`read_records`]
pub fn read_records_from<T, R>(reader: R) -> Result<(Vec<T>, Vec<ConversionError>)>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.byte_headers()?.clone();
    if headers.is_empty() {
        return Err(Error::MissingHeader);
    }

    let mut records = Vec::new();
    let mut errors = Vec::new();
    for (i, result) in csv_reader.byte_records().enumerate() {
        // +2 for 1-indexing and header
        let fallback = i + 2;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(fallback);
                errors.push(ConversionError::new(line, Vec::new(), e.to_string()));
                continue;
            }
        };
        let line = raw.position().map(|p| p.line() as usize).unwrap_or(fallback);
        match raw.deserialize::<T>(Some(&headers)) {
            Ok(record) => records.push(record),
            Err(e) => errors.push(ConversionError::new(line, lossy_fields(&raw), e.to_string())),
        }
    }

    warn_skipped(&errors);
    Ok((records, errors))
}

/// Fields of a raw record, with invalid UTF-8 replaced
fn lossy_fields(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}
