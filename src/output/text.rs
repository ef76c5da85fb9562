//! Fixed-width plain text tables

use std::io::Write;

use crate::error::Result;

use super::TableFormatter;

/// Right-aligned columns under a dashed rule
pub struct TextOutput;

impl TextOutput {
    fn write_line(&self, cells: &[&str], widths: &[usize], writer: &mut dyn Write) -> Result<()> {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, &width)| format!("{:>width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line)?;
        Ok(())
    }
}

impl TableFormatter for TextOutput {
    fn headings(&self, columns: &[&str], widths: &[usize], writer: &mut dyn Write) -> Result<()> {
        self.write_line(columns, widths, writer)?;
        let rule: String = widths.iter().map(|w| "-".repeat(w + 1)).collect();
        writeln!(writer, "{}", rule)?;
        Ok(())
    }

    fn row(&self, values: &[String], widths: &[usize], writer: &mut dyn Write) -> Result<()> {
        let cells: Vec<&str> = values.iter().map(String::as_str).collect();
        self.write_line(&cells, widths, writer)
    }

    fn needs_widths(&self) -> bool {
        true
    }
}
