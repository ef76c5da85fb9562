//! Whitespace separated `.dat` files

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::error::{ConversionError, Error, Result};
use crate::model::{Ingest, IngestBuilder, Schema};

use super::{Parser, ReadOptions};

/// Parser for whitespace separated files such as `portfolio.dat`
pub struct DatParser;

impl Parser for DatParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Ingest> {
        read_dat(path, ReadOptions::from_config(config))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext.eq_ignore_ascii_case("dat")
    }
}

/// Read a whitespace separated file into a store.
///
/// Blank lines are skipped. Without `options.header` the first non-blank
/// line names the columns.
pub fn read_dat(path: &Path, options: ReadOptions<'_>) -> Result<Ingest> {
    debug!(path = %path.display(), "Reading whitespace separated file");
    let file = File::open(path)?;
    read_dat_from(BufReader::new(file), options)
}

/// Reader-based form of [`read_dat`]
pub fn read_dat_from<R: BufRead>(reader: R, options: ReadOptions<'_>) -> Result<Ingest> {
    let mut lines = Lines::new(reader);

    let header: Vec<String> = match options.header {
        Some(header) => header.to_vec(),
        None => match lines.next() {
            Some(line) => split_fields(line?.text()),
            None => return Err(Error::MissingHeader),
        },
    };

    let schema = Schema::from_header(&header, options.types)?;
    let mut builder = IngestBuilder::new(schema, options.layout);
    for line in lines {
        match line? {
            Line::Text(number, text) => builder.push_raw(number, split_fields(&text)),
            Line::Undecodable(number, text) => builder.push_error(ConversionError::new(
                number,
                split_fields(&text),
                "line is not valid UTF-8",
            )),
        }
    }
    Ok(builder.finish())
}

/// A non-blank input line with its 1-based number
enum Line {
    Text(usize, String),
    /// Invalid UTF-8, kept with replacement characters
    Undecodable(usize, String),
}

impl Line {
    fn text(&self) -> &str {
        match self {
            Line::Text(_, text) | Line::Undecodable(_, text) => text,
        }
    }
}

struct Lines<R> {
    reader: R,
    number: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            number: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.number += 1,
                Err(e) => return Some(Err(e)),
            }
            let line = match std::str::from_utf8(&self.buf) {
                Ok(text) => Line::Text(self.number, text.to_string()),
                Err(_) => Line::Undecodable(
                    self.number,
                    String::from_utf8_lossy(&self.buf).into_owned(),
                ),
            };
            if !line.text().trim().is_empty() {
                return Some(Ok(line));
            }
        }
    }
}

fn split_fields(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}
