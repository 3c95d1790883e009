//! Columnar dataset sources

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;

use super::record::{CellValue, DatasetRow};
use crate::error::{HarnessError, Result};

/// Anything that yields dataset rows in file order
pub trait DatasetSource: Send + Sync {
    /// Human-readable origin, used in logs
    fn describe(&self) -> String;

    /// Reads at most `limit` rows, in order
    fn read_rows(&self, limit: usize) -> Result<Vec<DatasetRow>>;
}

/// A Parquet file of float profiles
#[derive(Debug, Clone)]
pub struct ParquetDataset {
    path: PathBuf,
}

impl ParquetDataset {
    /// Opens a dataset, failing if the path does not resolve to a file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(HarnessError::DatasetNotFound(path.display().to_string()));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&self) -> Result<SerializedFileReader<File>> {
        let file = File::open(&self.path)?;
        Ok(SerializedFileReader::new(file)?)
    }

    /// Total number of rows recorded in the file footer
    pub fn row_count(&self) -> Result<usize> {
        let rows = self.reader()?.metadata().file_metadata().num_rows();
        Ok(usize::try_from(rows).unwrap_or(0))
    }
}

impl DatasetSource for ParquetDataset {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_rows(&self, limit: usize) -> Result<Vec<DatasetRow>> {
        let reader = self.reader()?;
        let mut rows = Vec::with_capacity(limit);

        for row in reader.get_row_iter(None)?.take(limit) {
            let row = row?;
            let mut cells = DatasetRow::new();
            for (name, field) in row.get_column_iter() {
                cells.insert(name.clone(), cell_from_field(name, field)?);
            }
            rows.push(cells);
        }

        Ok(rows)
    }
}

fn cell_from_field(column: &str, field: &Field) -> Result<CellValue> {
    let cell = match field {
        Field::Null => CellValue::Null,
        Field::Bool(v) => CellValue::Int(i64::from(*v)),
        Field::Byte(v) => CellValue::Int(i64::from(*v)),
        Field::Short(v) => CellValue::Int(i64::from(*v)),
        Field::Int(v) => CellValue::Int(i64::from(*v)),
        Field::Long(v) => CellValue::Int(*v),
        Field::UByte(v) => CellValue::Int(i64::from(*v)),
        Field::UShort(v) => CellValue::Int(i64::from(*v)),
        Field::UInt(v) => CellValue::Int(i64::from(*v)),
        Field::ULong(v) => CellValue::Int(i64::try_from(*v).map_err(|_| {
            HarnessError::Schema(format!("column '{}' value {} exceeds i64", column, v))
        })?),
        Field::Float(v) => CellValue::Float(f64::from(*v)),
        Field::Double(v) => CellValue::Float(*v),
        Field::Str(v) => CellValue::Text(v.clone()),
        Field::TimestampMillis(ms) => DateTime::from_timestamp_millis(*ms)
            .map(CellValue::Timestamp)
            .unwrap_or(CellValue::Null),
        Field::TimestampMicros(us) => DateTime::from_timestamp_micros(*us)
            .map(CellValue::Timestamp)
            .unwrap_or(CellValue::Null),
        Field::Date(days) => DateTime::from_timestamp(i64::from(*days) * 86_400, 0)
            .map(CellValue::Timestamp)
            .unwrap_or(CellValue::Null),
        other => CellValue::Text(other.to_string()),
    };
    Ok(cell)
}

/// Rows already held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    rows: Vec<DatasetRow>,
}

impl InMemoryDataset {
    pub fn new(rows: Vec<DatasetRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl DatasetSource for InMemoryDataset {
    fn describe(&self) -> String {
        format!("in-memory ({} rows)", self.rows.len())
    }

    fn read_rows(&self, limit: usize) -> Result<Vec<DatasetRow>> {
        Ok(self.rows.iter().take(limit).cloned().collect())
    }
}
