//! Float profile records and dataset row mapping

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::error::{HarnessError, Result};

/// Single cell decoded from the columnar dataset
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// One dataset row, keyed by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetRow {
    cells: HashMap<String, CellValue>,
}

impl DatasetRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style cell insertion
    pub fn with(mut self, column: impl Into<String>, value: CellValue) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    /// First non-null cell among `columns`
    fn first<'a>(&'a self, columns: &[&'a str]) -> Option<(&'a str, &'a CellValue)> {
        columns.iter().find_map(|name| match self.cells.get(*name) {
            None | Some(CellValue::Null) => None,
            Some(value) => Some((*name, value)),
        })
    }

    fn float(&self, columns: &[&str], default: f64) -> Result<f64> {
        match self.first(columns) {
            None => Ok(default),
            Some((_, CellValue::Float(v))) if v.is_nan() => Ok(default),
            Some((_, CellValue::Float(v))) => Ok(*v),
            Some((_, CellValue::Int(v))) => Ok(*v as f64),
            Some((column, other)) => Err(mismatch(column, "number", other)),
        }
    }

    fn int(&self, columns: &[&str]) -> Result<Option<i64>> {
        match self.first(columns) {
            None => Ok(None),
            Some((_, CellValue::Int(v))) => Ok(Some(*v)),
            Some((_, CellValue::Float(v))) if v.is_nan() => Ok(None),
            Some((_, CellValue::Float(v))) => Ok(Some(v.round() as i64)),
            Some((column, other)) => Err(mismatch(column, "integer", other)),
        }
    }

    fn timestamp(&self, columns: &[&str]) -> Option<DateTime<Utc>> {
        match self.first(columns)? {
            (_, CellValue::Timestamp(ts)) => Some(*ts),
            (_, CellValue::Text(text)) => parse_timestamp(text),
            _ => None,
        }
    }
}

fn mismatch(column: &str, expected: &str, found: &CellValue) -> HarnessError {
    HarnessError::Schema(format!(
        "column '{}' expected {}, found {:?}",
        column, expected, found
    ))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Float identifier used when the dataset has none
pub const DEFAULT_FLOAT_ID: &str = "DEMO_FLOAT";
const DEFAULT_TEMPERATURE: f64 = 20.0;
const DEFAULT_SALINITY: f64 = 35.0;

/// One float profile measurement as stored in `argo_profiles`
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub float_id: String,
    pub lat: f64,
    pub lon: f64,
    pub depth: i64,
    pub temperature: f64,
    pub salinity: f64,
    /// Calendar month, 1..=12
    pub month: u32,
    pub year: i32,
}

impl SampleRecord {
    /// Maps a dataset row, substituting defaults for absent fields
    ///
    /// Month and year come from explicit columns, then from a time column,
    /// then from `now`. A column that is present with an unusable type is a
    /// schema error.
    pub fn from_row(row: &DatasetRow, now: DateTime<Utc>) -> Result<Self> {
        let float_id = match row.first(&["float_id", "platform_number"]) {
            None => DEFAULT_FLOAT_ID.to_string(),
            Some((_, CellValue::Text(id))) => id.trim().to_string(),
            Some((_, CellValue::Int(id))) => id.to_string(),
            Some((column, other)) => return Err(mismatch(column, "identifier", other)),
        };

        let observed = row.timestamp(&["time", "timestamp", "date"]).unwrap_or(now);

        let month = match row.int(&["month"])? {
            Some(m) if (1..=12).contains(&m) => m as u32,
            Some(m) => {
                return Err(HarnessError::Schema(format!(
                    "column 'month' out of range: {}",
                    m
                )));
            }
            None => observed.month(),
        };
        let year = match row.int(&["year"])? {
            Some(y) => i32::try_from(y).map_err(|_| {
                HarnessError::Schema(format!("column 'year' out of range: {}", y))
            })?,
            None => observed.year(),
        };

        Ok(Self {
            float_id,
            lat: row.float(&["lat", "latitude"], 0.0)?,
            lon: row.float(&["lon", "longitude"], 0.0)?,
            depth: row.int(&["depth", "pres"])?.unwrap_or(0),
            temperature: row.float(&["temperature", "temp"], DEFAULT_TEMPERATURE)?,
            salinity: row.float(&["salinity", "psal"], DEFAULT_SALINITY)?,
            month,
            year,
        })
    }
}
