//! Stock portfolio records

use std::path::Path;

use serde::Deserialize;

use crate::config::Layout;
use crate::error::{ConversionError, Error, Result};
use crate::model::{ColumnType, FieldAccess, Record, Value};
use crate::parser::{read_dat, read_records, ReadOptions};

/// Column names of a portfolio, in file order
pub const PORTFOLIO_COLUMNS: [&str; 3] = ["name", "shares", "price"];

/// Column types of a portfolio, in file order
pub const PORTFOLIO_TYPES: [ColumnType; 3] = [ColumnType::Str, ColumnType::Int, ColumnType::Float];

/// A holding of one stock
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stock {
    pub name: String,
    pub shares: i64,
    pub price: f64,
}

impl Stock {
    pub fn new(name: impl Into<String>, shares: i64, price: f64) -> Self {
        Self {
            name: name.into(),
            shares,
            price,
        }
    }

    /// Value of the holding
    pub fn cost(&self) -> f64 {
        self.shares as f64 * self.price
    }

    /// Sell `nshares`, refusing to go below zero
    pub fn sell(&mut self, nshares: i64) -> Result<()> {
        if nshares < 0 {
            return Err(Error::NegativeShares {
                name: self.name.clone(),
                requested: nshares,
            });
        }
        if nshares > self.shares {
            return Err(Error::InsufficientShares {
                name: self.name.clone(),
                held: self.shares,
                requested: nshares,
            });
        }
        self.shares -= nshares;
        Ok(())
    }

    /// Convert a store record with `name`, `shares` and `price` fields
    pub fn from_record(record: &Record) -> Result<Self> {
        let get = |name: &str| {
            record
                .get(name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };
        let name = get("name")?.display().into_owned();
        let shares = get("shares")?;
        let price = get("price")?;
        Ok(Self {
            name,
            shares: shares.as_int().ok_or_else(|| Error::IncompatibleValue {
                column: "shares".to_string(),
                expected: ColumnType::Int,
                value: shares.to_string(),
            })?,
            price: price.as_float().ok_or_else(|| Error::IncompatibleValue {
                column: "price".to_string(),
                expected: ColumnType::Float,
                value: price.to_string(),
            })?,
        })
    }

    /// The stock as a record in portfolio column order
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("name", self.name.as_str())
            .with("shares", self.shares)
            .with("price", self.price)
    }
}

impl FieldAccess for Stock {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.as_str())),
            "shares" => Some(Value::Int(self.shares)),
            "price" => Some(Value::Float(self.price)),
            "cost" => Some(Value::Float(self.cost())),
            _ => None,
        }
    }
}

/// Read a portfolio CSV with a `name,shares,price` header (any column order).
/// Rows that do not parse are skipped and returned alongside.
pub fn read_portfolio(path: &Path) -> Result<(Vec<Stock>, Vec<ConversionError>)> {
    read_records(path)
}

/// Read a headerless, whitespace separated portfolio (`name shares price`)
pub fn read_portfolio_dat(path: &Path) -> Result<(Vec<Stock>, Vec<ConversionError>)> {
    let header: Vec<String> = PORTFOLIO_COLUMNS.iter().map(|s| s.to_string()).collect();
    let options = ReadOptions {
        header: Some(header.as_slice()),
        types: Some(&PORTFOLIO_TYPES[..]),
        layout: Layout::Rows,
    };
    let ingest = read_dat(path, options)?;
    let stocks = ingest
        .store
        .iter()
        .map(|r| Stock::from_record(&r))
        .collect::<Result<Vec<_>>>()?;
    Ok((stocks, ingest.errors))
}

/// Total value of all holdings
pub fn total_cost<'a, I>(stocks: I) -> f64
where
    I: IntoIterator<Item = &'a Stock>,
{
    stocks.into_iter().map(Stock::cost).sum()
}
