//! Sample float data ingestion
//!
//! Reads a bounded window of rows from a columnar dataset and writes them to
//! the `argo_profiles` table in a single transaction. Either every row lands
//! or the table is left exactly as it was.

pub mod dataset;
pub mod loader;
pub mod record;

pub use dataset::{DatasetSource, InMemoryDataset, ParquetDataset};
pub use loader::{DEFAULT_ROW_CAP, LoadOutcome, SampleDataLoader};
pub use record::{CellValue, DatasetRow, SampleRecord};
