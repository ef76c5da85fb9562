//! Table rendering through pluggable formatters

mod csv;
mod html;
mod text;

use std::io::Write;

use crate::config::OutputFormat;
use crate::error::{Error, Result};
use crate::model::FieldAccess;

pub use self::csv::CsvOutput;
pub use self::html::HtmlOutput;
pub use self::text::TextOutput;

/// Trait for table formatters
pub trait TableFormatter {
    /// Write the heading line(s) for `columns`
    fn headings(&self, columns: &[&str], widths: &[usize], writer: &mut dyn Write) -> Result<()>;

    /// Write one data row of already stringified values
    fn row(&self, values: &[String], widths: &[usize], writer: &mut dyn Write) -> Result<()>;

    /// Whether this formatter aligns on column widths. When false, `widths`
    /// passed to `headings` and `row` is empty.
    fn needs_widths(&self) -> bool {
        false
    }
}

/// Factory for creating table formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create a formatter for the given format
    pub fn create(format: OutputFormat) -> Box<dyn TableFormatter> {
        match format {
            OutputFormat::Text => Box::new(TextOutput),
            OutputFormat::Csv => Box::new(CsvOutput),
            OutputFormat::Html => Box::new(HtmlOutput),
        }
    }

    /// Create a formatter from a configuration key ("text", "csv" or "html")
    pub fn from_key(key: &str) -> Result<Box<dyn TableFormatter>> {
        Ok(Self::create(key.parse()?))
    }
}

/// Render `records` as a table of `columns`.
///
/// Every requested field is read before anything is written, so a record
/// missing a column fails the call with no output.
pub fn render<I, R, S>(
    records: I,
    columns: &[S],
    formatter: &dyn TableFormatter,
    writer: &mut dyn Write,
) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: FieldAccess,
    S: AsRef<str>,
{
    let columns: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
    let rows = stringify(records, &columns)?;
    let widths = if formatter.needs_widths() {
        column_widths(&columns, &rows)
    } else {
        Vec::new()
    };

    formatter.headings(&columns, &widths, writer)?;
    for row in &rows {
        formatter.row(row, &widths, writer)?;
    }
    Ok(())
}

/// Render into a string
pub fn render_to_string<I, R, S>(
    records: I,
    columns: &[S],
    formatter: &dyn TableFormatter,
) -> Result<String>
where
    I: IntoIterator<Item = R>,
    R: FieldAccess,
    S: AsRef<str>,
{
    let mut buf = Vec::new();
    render(records, columns, formatter, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Render to stdout
pub fn print_table<I, R, S>(records: I, columns: &[S], format: OutputFormat) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: FieldAccess,
    S: AsRef<str>,
{
    let formatter = OutputFactory::create(format);
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    render(records, columns, formatter.as_ref(), &mut handle)?;
    handle.flush()?;
    Ok(())
}

fn stringify<I, R>(records: I, columns: &[&str]) -> Result<Vec<Vec<String>>>
where
    I: IntoIterator<Item = R>,
    R: FieldAccess,
{
    records
        .into_iter()
        .enumerate()
        .map(|(row, record)| {
            columns
                .iter()
                .map(|&column| {
                    record
                        .field(column)
                        .map(|v| v.display().into_owned())
                        .ok_or_else(|| Error::MissingField {
                            row,
                            column: column.to_string(),
                        })
                })
                .collect()
        })
        .collect()
}

/// Widest value (or heading) per column, plus one for padding
fn column_widths(columns: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|s| s.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
                + 1
        })
        .collect()
}
