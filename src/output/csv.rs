//! Comma separated output

use std::io::Write;

use crate::error::Result;

use super::TableFormatter;

/// Comma-joined headings and values, no quoting
pub struct CsvOutput;

impl TableFormatter for CsvOutput {
    fn headings(&self, columns: &[&str], _widths: &[usize], writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "{}", columns.join(","))?;
        Ok(())
    }

    fn row(&self, values: &[String], _widths: &[usize], writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "{}", values.join(","))?;
        Ok(())
    }
}
