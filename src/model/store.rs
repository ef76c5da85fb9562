//! Tabular store: a schema plus its rows, held column-major or row-major

use std::ops::{Bound, RangeBounds};

use tracing::{debug, warn};

use crate::config::Layout;
use crate::error::{ConversionError, Error, Result};

use super::record::Record;
use super::schema::{ColumnType, Schema};
use super::value::Value;

/// Typed values of a single column
#[derive(Debug, Clone, PartialEq)]
enum ColumnData {
    Str(Vec<String>),
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl ColumnData {
    fn for_type(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Str => ColumnData::Str(Vec::new()),
            ColumnType::Int => ColumnData::Int(Vec::new()),
            ColumnType::Float => ColumnData::Float(Vec::new()),
        }
    }

    fn get(&self, index: usize) -> Value {
        match self {
            ColumnData::Str(v) => Value::Str(v[index].clone()),
            ColumnData::Int(v) => Value::Int(v[index]),
            ColumnData::Float(v) => Value::Float(v[index]),
        }
    }

    /// Values must already be coerced to the column's type
    fn push(&mut self, value: Value) {
        match (self, value) {
            (ColumnData::Str(v), Value::Str(s)) => v.push(s),
            (ColumnData::Int(v), Value::Int(i)) => v.push(i),
            (ColumnData::Float(v), Value::Float(f)) => v.push(f),
            (column, value) => unreachable!(
                "{} value pushed into {:?} column",
                value.column_type(),
                std::mem::discriminant(column)
            ),
        }
    }

    fn slice(&self, start: usize, end: usize) -> Self {
        match self {
            ColumnData::Str(v) => ColumnData::Str(v[start..end].to_vec()),
            ColumnData::Int(v) => ColumnData::Int(v[start..end].to_vec()),
            ColumnData::Float(v) => ColumnData::Float(v[start..end].to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Storage {
    Columns(Vec<ColumnData>),
    Rows(Vec<Vec<Value>>),
}

impl Storage {
    fn empty(schema: &Schema, layout: Layout) -> Self {
        match layout {
            Layout::Columns => Storage::Columns(
                schema
                    .columns()
                    .iter()
                    .map(|c| ColumnData::for_type(c.column_type))
                    .collect(),
            ),
            Layout::Rows => Storage::Rows(Vec::new()),
        }
    }

    fn push_row(&mut self, values: Vec<Value>) {
        match self {
            Storage::Columns(columns) => {
                for (column, value) in columns.iter_mut().zip(values) {
                    column.push(value);
                }
            }
            Storage::Rows(rows) => rows.push(values),
        }
    }
}

/// Homogeneous records over a fixed [`Schema`].
///
/// Records are materialized on demand by [`Store::get`]; the store itself
/// only keeps typed values in its chosen [`Layout`]. Every column always
/// holds exactly [`Store::len`] values.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    schema: Schema,
    storage: Storage,
    len: usize,
}

impl Store {
    /// Create an empty store
    pub fn new(schema: Schema, layout: Layout) -> Self {
        let storage = Storage::empty(&schema, layout);
        Self {
            schema,
            storage,
            len: 0,
        }
    }

    /// Bulk-build a store from raw string rows.
    ///
    /// Rows that fail conversion are skipped and returned in
    /// [`Ingest::errors`]; only a bad header or type list is fatal.
    pub fn from_rows<H, R>(
        header: &[H],
        rows: R,
        types: Option<&[ColumnType]>,
        layout: Layout,
    ) -> Result<Ingest>
    where
        H: AsRef<str>,
        R: IntoIterator<Item = Vec<String>>,
    {
        let schema = Schema::from_header(header, types)?;
        let mut builder = IngestBuilder::new(schema, layout);
        for (i, row) in rows.into_iter().enumerate() {
            // +2 for 1-indexing and header
            builder.push_raw(i + 2, row);
        }
        Ok(builder.finish())
    }

    /// Build a store from per-column value sequences, in schema order
    pub fn from_columns(schema: Schema, columns: Vec<Vec<Value>>, layout: Layout) -> Result<Self> {
        if columns.len() != schema.len() {
            return match schema.columns().get(columns.len()) {
                Some(missing) => Err(Error::MissingColumn(missing.name.clone())),
                None => Err(Error::RaggedColumns(columns.iter().map(Vec::len).collect())),
            };
        }
        let lengths: Vec<usize> = columns.iter().map(Vec::len).collect();
        if lengths.windows(2).any(|w| w[0] != w[1]) {
            return Err(Error::RaggedColumns(lengths));
        }

        let len = lengths.first().copied().unwrap_or(0);
        let mut rows: Vec<Vec<Value>> = (0..len).map(|_| Vec::with_capacity(schema.len())).collect();
        for (column, values) in schema.columns().iter().zip(columns) {
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(coerce(&column.name, column.column_type, value)?);
            }
        }

        let mut store = Store::new(schema, layout);
        for row in rows {
            store.push_values(row);
        }
        Ok(store)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.names().collect()
    }

    pub fn layout(&self) -> Layout {
        match self.storage {
            Storage::Columns(_) => Layout::Columns,
            Storage::Rows(_) => Layout::Rows,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn value_at(&self, row: usize, col: usize) -> Value {
        match &self.storage {
            Storage::Columns(columns) => columns[col].get(row),
            Storage::Rows(rows) => rows[row][col].clone(),
        }
    }

    /// Materialize one row as a record keyed by column name
    pub fn get(&self, index: usize) -> Result<Record> {
        if index >= self.len {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(self
            .schema
            .names()
            .enumerate()
            .map(|(col, name)| (name, self.value_at(index, col)))
            .collect())
    }

    /// Copy a range of rows into a new store with the same schema and layout.
    ///
    /// Bounds past the end are clamped, so `slice(a..b).len()` is
    /// `min(b, len) - a` or zero.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> Result<Store> {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => self.len,
        };
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        let end = end.min(self.len);
        let start = start.min(end);

        let storage = match &self.storage {
            Storage::Columns(columns) => {
                Storage::Columns(columns.iter().map(|c| c.slice(start, end)).collect())
            }
            Storage::Rows(rows) => Storage::Rows(rows[start..end].to_vec()),
        };
        Ok(Store {
            schema: self.schema.clone(),
            storage,
            len: end - start,
        })
    }

    /// Append one record. Every schema column must be present and
    /// compatible; on failure the store is left unchanged.
    pub fn append(&mut self, record: Record) -> Result<()> {
        if let Some(unknown) = record.keys().find(|k| self.schema.index_of(k).is_none()) {
            return Err(Error::UnknownColumn(unknown.to_string()));
        }
        let mut fields = record.into_inner();
        let mut values = Vec::with_capacity(self.schema.len());
        for column in self.schema.columns() {
            let value = fields
                .swap_remove(&column.name)
                .ok_or_else(|| Error::MissingColumn(column.name.clone()))?;
            values.push(coerce(&column.name, column.column_type, value)?);
        }
        self.push_values(values);
        Ok(())
    }

    /// Append records in order, stopping at the first one that fails.
    /// Returns how many were appended.
    pub fn extend<I: IntoIterator<Item = Record>>(&mut self, records: I) -> Result<usize> {
        let mut appended = 0;
        for record in records {
            self.append(record)?;
            appended += 1;
        }
        Ok(appended)
    }

    fn push_values(&mut self, values: Vec<Value>) {
        self.storage.push_row(values);
        self.len += 1;
    }

    /// Iterate over rows as records
    pub fn iter(&self) -> impl Iterator<Item = Record> + '_ {
        (0..self.len).map(move |row| {
            self.schema
                .names()
                .enumerate()
                .map(|(col, name)| (name, self.value_at(row, col)))
                .collect()
        })
    }

    /// Iterate over every value of one column
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = Value> + '_> {
        let col = self.schema.index_of(name)?;
        Some((0..self.len).map(move |row| self.value_at(row, col)))
    }

    /// Sum an int column
    pub fn sum_int(&self, name: &str) -> Result<i64> {
        let col = self.numeric_column(name, ColumnType::Int)?;
        (0..self.len)
            .filter_map(|row| self.value_at(row, col).as_int())
            .try_fold(0i64, i64::checked_add)
            .ok_or_else(|| Error::Overflow {
                column: name.to_string(),
            })
    }

    /// Sum an int or float column as floats
    pub fn sum_float(&self, name: &str) -> Result<f64> {
        let col = self.numeric_column(name, ColumnType::Float)?;
        Ok((0..self.len)
            .filter_map(|row| self.value_at(row, col).as_float())
            .sum())
    }

    fn numeric_column(&self, name: &str, expected: ColumnType) -> Result<usize> {
        let col = self
            .schema
            .index_of(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))?;
        let actual = self.schema.columns()[col].column_type;
        let compatible = match expected {
            ColumnType::Int => actual == ColumnType::Int,
            ColumnType::Float => actual != ColumnType::Str,
            ColumnType::Str => true,
        };
        if !compatible {
            return Err(Error::IncompatibleValue {
                column: name.to_string(),
                expected,
                value: format!("{} column", actual),
            });
        }
        Ok(col)
    }
}

fn coerce(column: &str, column_type: ColumnType, value: Value) -> Result<Value> {
    let shown = value.to_string();
    column_type
        .coerce(value)
        .ok_or_else(|| Error::IncompatibleValue {
            column: column.to_string(),
            expected: column_type,
            value: shown,
        })
}

/// Result of a lenient bulk read
#[derive(Debug)]
pub struct Ingest {
    /// Rows that converted cleanly
    pub store: Store,
    /// Rows that were skipped, in source order
    pub errors: Vec<ConversionError>,
}

impl Ingest {
    /// True if no rows were skipped
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_store(self) -> Store {
        self.store
    }
}

/// Incrementally converts raw rows into a store, collecting failures.
///
/// Used by [`Store::from_rows`] and by the file parsers, which know the
/// real source line numbers.
#[derive(Debug)]
pub struct IngestBuilder {
    store: Store,
    errors: Vec<ConversionError>,
}

impl IngestBuilder {
    pub fn new(schema: Schema, layout: Layout) -> Self {
        debug!(columns = schema.len(), ?layout, "Starting ingest");
        Self {
            store: Store::new(schema, layout),
            errors: Vec::new(),
        }
    }

    /// Convert and append one raw row, or record why it was skipped
    pub fn push_raw(&mut self, line: usize, row: Vec<String>) {
        let schema = &self.store.schema;
        if row.len() != schema.len() {
            let reason = format!("expected {} fields, found {}", schema.len(), row.len());
            self.push_error(ConversionError::new(line, row, reason));
            return;
        }

        let converted: std::result::Result<Vec<Value>, (String, String)> = schema
            .columns()
            .iter()
            .zip(&row)
            .map(|(column, raw)| {
                column
                    .column_type
                    .parse(raw)
                    .map_err(|reason| (column.name.clone(), reason))
            })
            .collect();
        match converted {
            Ok(values) => self.store.push_values(values),
            Err((column, reason)) => {
                self.push_error(ConversionError::for_column(line, row, column, reason))
            }
        }
    }

    /// Record a row that failed before conversion (e.g. a malformed CSV line)
    pub fn push_error(&mut self, error: ConversionError) {
        debug!(line = error.line, reason = %error.reason, "Skipping row");
        self.errors.push(error);
    }

    /// Finish the read, warning once about every skipped row
    pub fn finish(self) -> Ingest {
        if !self.errors.is_empty() {
            let lines = self
                .errors
                .iter()
                .map(|e| e.line.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            warn!(
                count = self.errors.len(),
                lines = %lines,
                "Some rows could not be parsed and were skipped"
            );
        }
        debug!(rows = self.store.len(), skipped = self.errors.len(), "Ingest complete");
        Ingest {
            store: self.store,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    const RIDE_TYPES: [ColumnType; 4] = [
        ColumnType::Str,
        ColumnType::Str,
        ColumnType::Str,
        ColumnType::Int,
    ];

    fn rides(layout: Layout) -> Store {
        Store::from_rows(
            &["route", "date", "daytype", "rides"],
            rows(&[
                &["22", "02/02/2011", "W", "1000"],
                &["22", "02/03/2011", "W", "1100"],
                &["3", "02/03/2011", "W", "700"],
            ]),
            Some(&RIDE_TYPES[..]),
            layout,
        )
        .unwrap()
        .into_store()
    }

    fn portfolio() -> Store {
        let schema = Schema::from_header(
            &["name", "shares", "price"],
            Some(&[ColumnType::Str, ColumnType::Int, ColumnType::Float][..]),
        )
        .unwrap();
        let mut store = Store::new(schema, Layout::Columns);
        store
            .append(Record::new().with("name", "AA").with("shares", 100).with("price", 32.2))
            .unwrap();
        store
    }

    #[test]
    fn test_sum_rides() {
        let ingest = Store::from_rows(
            &["route", "date", "daytype", "rides"],
            rows(&[
                &["22", "02/02/2011", "W", "1000"],
                &["22", "02/03/2011", "W", "1100"],
            ]),
            Some(&RIDE_TYPES[..]),
            Layout::Columns,
        )
        .unwrap();
        assert!(ingest.is_clean());
        assert_eq!(ingest.store.len(), 2);
        assert_eq!(ingest.store.sum_int("rides").unwrap(), 2100);
    }

    #[test]
    fn test_bad_rows_are_collected() {
        let ingest = Store::from_rows(
            &["route", "date", "daytype", "rides"],
            rows(&[
                &["22", "02/02/2011", "W", "1000"],
                &["22", "02/03/2011", "W", "lots"],
                &["22", "02/04/2011"],
                &["3", "02/04/2011", "A", "5"],
            ]),
            Some(&RIDE_TYPES[..]),
            Layout::Columns,
        )
        .unwrap();
        assert_eq!(ingest.store.len(), 2);
        assert_eq!(ingest.errors.len(), 2);
        assert_eq!(ingest.errors[0].line, 3);
        assert_eq!(ingest.errors[0].column.as_deref(), Some("rides"));
        assert_eq!(ingest.errors[0].row[3], "lots");
        assert_eq!(ingest.errors[1].line, 4);
        assert_eq!(ingest.errors[1].column, None);
    }

    #[test]
    fn test_untyped_ingest_reads_strings() {
        let store = Store::from_rows(&["a", "b"], rows(&[&["1", "x"]]), None, Layout::Rows)
            .unwrap()
            .into_store();
        assert_eq!(store.get(0).unwrap().get("a"), Some(&Value::Str("1".into())));
    }

    #[test]
    fn test_get_keys_match_schema() {
        for layout in [Layout::Columns, Layout::Rows] {
            let store = rides(layout);
            for i in 0..store.len() {
                let rec = store.get(i).unwrap();
                assert_eq!(rec.keys().collect::<Vec<_>>(), store.column_names());
            }
            assert_eq!(store.get(1).unwrap().get("rides"), Some(&Value::Int(1100)));
        }
    }

    #[test]
    fn test_get_out_of_bounds() {
        let store = rides(Layout::Columns);
        let err = store.get(3).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 3, len: 3 }));
    }

    #[test]
    fn test_slice_lengths() {
        let store = rides(Layout::Rows);
        for (a, b) in [(0, 0), (0, 2), (1, 3), (1, 10), (2, 5), (4, 9)] {
            let expected = b.min(store.len()).saturating_sub(a);
            assert_eq!(store.slice(a..b).unwrap().len(), expected, "{}..{}", a, b);
        }
        assert_eq!(store.slice(..).unwrap(), store);
        assert_eq!(store.slice(1..=1).unwrap().len(), 1);
    }

    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn test_slice_reversed_range() {
        let store = rides(Layout::Columns);
        assert!(matches!(
            store.slice(2..1),
            Err(Error::InvalidRange { start: 2, end: 1 })
        ));
    }

    #[test]
    fn test_slice_is_independent_copy() {
        let store = rides(Layout::Columns);
        let mut part = store.slice(0..1).unwrap();
        part.append(
            Record::new()
                .with("route", "9")
                .with("date", "01/01/2001")
                .with("daytype", "U")
                .with("rides", 5),
        )
        .unwrap();
        assert_eq!(part.len(), 2);
        assert_eq!(store.len(), 3);
        assert_eq!(part.schema(), store.schema());
        assert_eq!(part.get(1).unwrap().get("route"), Some(&Value::from("9")));
    }

    #[test]
    fn test_append_missing_column() {
        let mut store = portfolio();
        let err = store
            .append(Record::new().with("name", "IBM").with("shares", 50))
            .unwrap_err();
        assert!(matches!(&err, Error::MissingColumn(c) if c == "price"));
        assert!(err.is_schema_mismatch());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_append_unknown_and_incompatible() {
        let mut store = portfolio();
        let err = store
            .append(
                Record::new()
                    .with("name", "IBM")
                    .with("shares", 50)
                    .with("price", 91.1)
                    .with("sector", "tech"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnknownColumn(c) if c == "sector"));

        let err = store
            .append(Record::new().with("name", "IBM").with("shares", 50.5).with("price", 91.1))
            .unwrap_err();
        assert!(matches!(err, Error::IncompatibleValue { expected: ColumnType::Int, .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_append_coerces_compatible_values() {
        let mut store = portfolio();
        store
            .append(Record::new().with("price", 91).with("shares", "50").with("name", "IBM"))
            .unwrap();
        let rec = store.get(1).unwrap();
        assert_eq!(rec.get("shares"), Some(&Value::Int(50)));
        assert!(matches!(rec.get("price"), Some(Value::Float(p)) if *p == 91.0));
        assert_eq!(store.sum_float("price").unwrap(), 32.2 + 91.0);
    }

    #[test]
    fn test_extend_stops_at_first_failure() {
        let mut store = portfolio();
        let records = vec![
            Record::new().with("name", "CAT").with("shares", 150).with("price", 83.44),
            Record::new().with("name", "GE"),
            Record::new().with("name", "MSFT").with("shares", 200).with("price", 51.23),
        ];
        assert!(store.extend(records).is_err());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_from_columns() {
        let schema = Schema::from_header(
            &["name", "shares"],
            Some(&[ColumnType::Str, ColumnType::Int][..]),
        )
        .unwrap();
        let store = Store::from_columns(
            schema.clone(),
            vec![vec!["AA".into(), "IBM".into()], vec![100.into(), 50.into()]],
            Layout::Columns,
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.sum_int("shares").unwrap(), 150);

        let err = Store::from_columns(
            schema.clone(),
            vec![vec!["AA".into()], vec![100.into(), 50.into()]],
            Layout::Rows,
        )
        .unwrap_err();
        assert!(matches!(err, Error::RaggedColumns(_)));

        let err = Store::from_columns(schema, vec![vec!["AA".into()]], Layout::Rows).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(c) if c == "shares"));
    }

    #[test]
    fn test_sum_int_overflow() {
        let ingest = Store::from_rows(
            &["n"],
            rows(&[&["9223372036854775807"], &["1"]]),
            Some(&[ColumnType::Int][..]),
            Layout::Columns,
        )
        .unwrap();
        assert!(ingest.is_clean());
        let err = ingest.store.sum_int("n").unwrap_err();
        assert!(matches!(err, Error::Overflow { column } if column == "n"));
        assert_eq!(ingest.store.sum_float("n").unwrap(), 9223372036854775808.0);
    }

    #[test]
    fn test_sum_wrong_type() {
        let store = rides(Layout::Columns);
        assert!(store.sum_int("route").is_err());
        assert!(matches!(store.sum_int("nope"), Err(Error::MissingColumn(_))));
        assert_eq!(store.sum_float("rides").unwrap(), 2800.0);
    }

    #[test]
    fn test_layouts_agree() {
        let a: Vec<Record> = rides(Layout::Columns).iter().collect();
        let b: Vec<Record> = rides(Layout::Rows).iter().collect();
        assert_eq!(a, b);
        let routes: Vec<Value> = rides(Layout::Rows).column("route").unwrap().collect();
        assert_eq!(routes, vec![Value::from("22"), "22".into(), "3".into()]);
    }
}
