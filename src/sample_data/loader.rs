//! All-or-nothing bulk load of sample profiles into the relational store

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::{error, info, warn};

use super::dataset::{DatasetSource, ParquetDataset};
use super::record::SampleRecord;
use crate::error::{HarnessError, Result};
use crate::health::CheckResult;

/// Default number of rows loaded per invocation
pub const DEFAULT_ROW_CAP: usize = 100;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS argo_profiles (
    id INTEGER PRIMARY KEY,
    float_id TEXT NOT NULL,
    lat REAL NOT NULL,
    lon REAL NOT NULL,
    depth INTEGER NOT NULL,
    temperature REAL NOT NULL,
    salinity REAL NOT NULL,
    month INTEGER NOT NULL,
    year INTEGER NOT NULL
)";

const INSERT_PROFILE: &str = "INSERT INTO argo_profiles \
    (id, float_id, lat, lon, depth, temperature, salinity, month, year) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Result of one load invocation
///
/// `committed` is either 0 or equal to `attempted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub attempted: usize,
    pub committed: usize,
    pub error: Option<String>,
}

impl LoadOutcome {
    pub fn committed(count: usize) -> Self {
        Self {
            attempted: count,
            committed: count,
            error: None,
        }
    }

    pub fn failed(attempted: usize, error: impl ToString) -> Self {
        Self {
            attempted,
            committed: 0,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Converts the outcome into a summary row
    pub fn row(&self) -> CheckResult {
        match &self.error {
            None => CheckResult::pass(
                "load",
                "sample data",
                format!("{} rows committed", self.committed),
            ),
            Some(error) if self.attempted == 0 => {
                CheckResult::warn("load", "sample data", format!("not loaded: {}", error))
            }
            Some(error) => CheckResult::warn(
                "load",
                "sample data",
                format!("rolled back ({} attempted): {}", self.attempted, error),
            ),
        }
    }
}

/// Loads sample rows into `argo_profiles`, replacing its contents
///
/// The loader owns the table for the duration of a load. Each load runs in
/// its own transaction on a pooled connection that is released afterwards.
#[derive(Debug, Clone)]
pub struct SampleDataLoader {
    pool: SqlitePool,
}

impl SampleDataLoader {
    /// Connects to the store, creating the database file if needed
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        if let Some(parent) = options.get_filename().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the target table if it does not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Number of rows currently in the target table
    pub async fn row_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM argo_profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Loads the first `cap` rows of a Parquet dataset
    ///
    /// A path that does not resolve returns immediately without touching the
    /// store.
    pub async fn load(&self, dataset_path: &Path, cap: usize) -> LoadOutcome {
        match ParquetDataset::open(dataset_path) {
            Ok(dataset) => {
                if let Ok(total) = dataset.row_count() {
                    info!(path = %dataset_path.display(), total, cap, "reading sample dataset");
                }
                self.load_from(&dataset, cap).await
            }
            Err(e) => {
                warn!(path = %dataset_path.display(), "sample dataset not found");
                LoadOutcome::failed(0, e)
            }
        }
    }

    /// Replaces the table contents with the first `cap` rows of `source`
    pub async fn load_from(&self, source: &dyn DatasetSource, cap: usize) -> LoadOutcome {
        let mut tx = match self.pool.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                error!(error = %e, "could not open load transaction");
                return LoadOutcome::failed(0, HarnessError::from(e));
            }
        };

        let mut attempted = 0;
        match stage(&mut tx, source, cap, &mut attempted).await {
            Ok(()) => match tx.commit().await {
                Ok(()) => {
                    info!(source = %source.describe(), rows = attempted, "sample data committed");
                    LoadOutcome::committed(attempted)
                }
                Err(e) => {
                    error!(error = %e, "commit failed");
                    LoadOutcome::failed(attempted, HarnessError::from(e))
                }
            },
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    error!(error = %rollback, "rollback failed");
                }
                warn!(source = %source.describe(), error = %e, "sample load rolled back");
                LoadOutcome::failed(attempted, e)
            }
        }
    }

    /// Closes the pool, waiting for connections to be released
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Clears the table and stages the mapped rows inside `tx`
async fn stage(
    tx: &mut Transaction<'_, Sqlite>,
    source: &dyn DatasetSource,
    cap: usize,
    attempted: &mut usize,
) -> Result<()> {
    sqlx::query(CREATE_TABLE).execute(&mut **tx).await?;
    sqlx::query("DELETE FROM argo_profiles")
        .execute(&mut **tx)
        .await?;

    let rows = source.read_rows(cap)?;
    *attempted = rows.len();

    let now = Utc::now();
    for (index, row) in rows.iter().enumerate() {
        let record = SampleRecord::from_row(row, now)?;
        sqlx::query(INSERT_PROFILE)
            .bind((index + 1) as i64)
            .bind(&record.float_id)
            .bind(record.lat)
            .bind(record.lon)
            .bind(record.depth)
            .bind(record.temperature)
            .bind(record.salinity)
            .bind(record.month as i64)
            .bind(record.year as i64)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_rows_reflect_success_and_failure() {
        let ok = LoadOutcome::committed(100);
        assert!(ok.is_success());
        assert!(ok.row().status.is_ok());
        assert_eq!(ok.row().message, "100 rows committed");

        let failed = LoadOutcome::failed(0, "dataset not found: x");
        assert!(!failed.is_success());
        assert_eq!(failed.committed, 0);
        assert!(failed.row().message.starts_with("not loaded"));

        let rolled_back = LoadOutcome::failed(40, "database is locked");
        assert!(rolled_back.row().message.contains("rolled back (40 attempted)"));
    }
}
