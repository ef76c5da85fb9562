//! HTML table rows

use std::io::Write;

use crate::error::Result;

use super::TableFormatter;

/// One `<tr>` per line, `<th>` cells for headings and `<td>` for data
pub struct HtmlOutput;

impl HtmlOutput {
    fn write_row(&self, tag: &str, cells: &[&str], writer: &mut dyn Write) -> Result<()> {
        let cells = cells
            .iter()
            .map(|c| format!("<{tag}>{}</{tag}>", html_escape(c)))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "<tr> {} </tr>", cells)?;
        Ok(())
    }
}

impl TableFormatter for HtmlOutput {
    fn headings(&self, columns: &[&str], _widths: &[usize], writer: &mut dyn Write) -> Result<()> {
        self.write_row("th", columns, writer)
    }

    fn row(&self, values: &[String], _widths: &[usize], writer: &mut dyn Write) -> Result<()> {
        let cells: Vec<&str> = values.iter().map(String::as_str).collect();
        self.write_row("td", &cells, writer)
    }
}

fn html_escape(s: impl AsRef<str>) -> String {
    s.as_ref()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
