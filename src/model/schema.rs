//! Column metadata and declared value types

use std::str::FromStr;

use crate::error::{Error, Result};

use super::value::Value;

/// Declared value type of a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ColumnType {
    #[default]
    Str,
    Int,
    Float,
}

impl ColumnType {
    /// Convert a raw field into a value of this type
    pub fn parse(self, raw: &str) -> std::result::Result<Value, String> {
        match self {
            ColumnType::Str => Ok(Value::Str(raw.to_string())),
            ColumnType::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| format!("cannot parse '{}' as int: {}", raw, e)),
            ColumnType::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| format!("cannot parse '{}' as float: {}", raw, e)),
        }
    }

    /// Coerce an already typed value into this type.
    ///
    /// Widening int to float and rendering anything as a string are allowed,
    /// strings are parsed. Float never narrows to int.
    pub fn coerce(self, value: Value) -> Option<Value> {
        match (self, value) {
            (ColumnType::Str, Value::Str(s)) => Some(Value::Str(s)),
            (ColumnType::Str, other) => Some(Value::Str(other.to_string())),
            (ColumnType::Int, Value::Int(i)) => Some(Value::Int(i)),
            (ColumnType::Float, Value::Float(f)) => Some(Value::Float(f)),
            (ColumnType::Float, Value::Int(i)) => Some(Value::Float(i as f64)),
            (ty, Value::Str(s)) => ty.parse(&s).ok(),
            (ColumnType::Int, Value::Float(_)) => None,
        }
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "str" | "string" => Ok(ColumnType::Str),
            "int" | "integer" | "i64" => Ok(ColumnType::Int),
            "float" | "f64" => Ok(ColumnType::Float),
            _ => Err(Error::UnknownColumnType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Str => write!(f, "str"),
            ColumnType::Int => write!(f, "int"),
            ColumnType::Float => write!(f, "float"),
        }
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name (from header)
    pub name: String,
    /// Declared type of every value in the column
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered, uniquely named column definitions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Build a schema, rejecting duplicate column names
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(Error::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// Pair header names with column types; no types means every column is a string
    pub fn from_header<S: AsRef<str>>(header: &[S], types: Option<&[ColumnType]>) -> Result<Self> {
        let columns = match types {
            Some(types) => {
                if types.len() != header.len() {
                    return Err(Error::HeaderMismatch {
                        header: header.len(),
                        types: types.len(),
                    });
                }
                header
                    .iter()
                    .zip(types)
                    .map(|(name, &ty)| Column::new(name.as_ref(), ty))
                    .collect()
            }
            None => header
                .iter()
                .map(|name| Column::new(name.as_ref(), ColumnType::Str))
                .collect(),
        };
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Get column index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
