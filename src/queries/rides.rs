//! Bus ridership queries

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::model::{ColumnType, FieldAccess, Record, Value};

/// Date format used by the ridership data
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Parse a ridership date such as `02/02/2011`
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Daily ride count for one route
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RideRecord {
    pub route: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    pub daytype: String,
    pub rides: i64,
}

fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let s = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
}

impl RideRecord {
    /// Convert a store record with `route`, `date`, `daytype` and `rides` fields
    pub fn from_record(record: &Record) -> Result<Self> {
        let text = |name: &str| -> Result<String> {
            record
                .get(name)
                .map(|v| v.display().into_owned())
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };

        let raw_date = text("date")?;
        let date = parse_date(&raw_date).ok_or(Error::InvalidDate(raw_date))?;

        let rides = match record.get("rides") {
            Some(Value::Int(i)) => *i,
            Some(other) => other
                .display()
                .trim()
                .parse()
                .map_err(|_| Error::IncompatibleValue {
                    column: "rides".to_string(),
                    expected: ColumnType::Int,
                    value: other.to_string(),
                })?,
            None => return Err(Error::MissingColumn("rides".to_string())),
        };

        Ok(Self {
            route: text("route")?,
            date,
            daytype: text("daytype")?,
            rides,
        })
    }
}

impl FieldAccess for RideRecord {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "route" => Some(Value::from(self.route.as_str())),
            "date" => Some(Value::from(self.date.format(DATE_FORMAT).to_string())),
            "daytype" => Some(Value::from(self.daytype.as_str())),
            "rides" => Some(Value::Int(self.rides)),
            _ => None,
        }
    }
}

/// Number of distinct routes
pub fn route_count(records: &[RideRecord]) -> usize {
    records
        .iter()
        .map(|r| r.route.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn overflow() -> Error {
    Error::Overflow {
        column: "rides".to_string(),
    }
}

fn add_rides(total: &mut i64, rides: i64) -> Result<()> {
    *total = total.checked_add(rides).ok_or_else(overflow)?;
    Ok(())
}

/// Rides on `route` on `date`
pub fn people_on_route(records: &[RideRecord], route: &str, date: NaiveDate) -> Result<i64> {
    records
        .iter()
        .filter(|r| r.route == route && r.date == date)
        .try_fold(0i64, |total, r| total.checked_add(r.rides))
        .ok_or_else(overflow)
}

/// Total rides per route, ordered by route
pub fn rides_per_route(records: &[RideRecord]) -> Result<BTreeMap<String, i64>> {
    let mut totals = BTreeMap::new();
    for r in records {
        add_rides(totals.entry(r.route.clone()).or_insert(0), r.rides)?;
    }
    Ok(totals)
}

/// Total rides per route between `start` and `end`, inclusive.
/// Routes with no rides in range are still listed with zero.
pub fn rides_between(
    records: &[RideRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BTreeMap<String, i64>> {
    let mut totals = BTreeMap::new();
    for r in records {
        let rides = if (start..=end).contains(&r.date) {
            r.rides
        } else {
            0
        };
        add_rides(totals.entry(r.route.clone()).or_insert(0), rides)?;
    }
    Ok(totals)
}

/// The `n` routes whose ridership grew most from the `before` range to the
/// `after` range, largest first. Routes that did not grow are left out.
pub fn greatest_increase(
    records: &[RideRecord],
    before: (NaiveDate, NaiveDate),
    after: (NaiveDate, NaiveDate),
    n: usize,
) -> Result<Vec<(String, i64)>> {
    let first = rides_between(records, before.0, before.1)?;
    let second = rides_between(records, after.0, after.1)?;

    let mut deltas = Vec::new();
    for (route, rides) in second {
        let delta = rides
            .checked_sub(first.get(&route).copied().unwrap_or(0))
            .ok_or_else(overflow)?;
        if delta > 0 {
            deltas.push((route, delta));
        }
    }
    deltas.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    deltas.truncate(n);
    Ok(deltas)
}
