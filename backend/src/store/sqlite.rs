//! SQLite IOU store
//!
//! Amounts are kept as TEXT so they round-trip exactly. SQLite's `AVG` works
//! on floating point, so the average selections load the live rows and
//! compare them against the exact total on every call.

use super::{IouStore, StoreError};
use crate::models::{select_by_average, AmountBand, Iou, IouId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT id, borrower, lender, amount, date_time FROM ious";

/// Row as stored in the `ious` table
#[derive(Debug, FromRow)]
struct IouRow {
    id: String,
    borrower: String,
    lender: String,
    amount: String,
    date_time: DateTime<Utc>,
}

impl TryFrom<IouRow> for Iou {
    type Error = StoreError;

    fn try_from(row: IouRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::Corrupt(format!("bad id {:?}: {}", row.id, e)))?;
        let amount = Decimal::from_str(&row.amount).map_err(|e| {
            StoreError::Corrupt(format!("bad amount {:?} for {}: {}", row.amount, id, e))
        })?;

        Ok(Iou {
            id,
            borrower: row.borrower,
            lender: row.lender,
            amount,
            date_time: row.date_time,
        })
    }
}

fn decode_rows(rows: Vec<IouRow>) -> Result<Vec<Iou>, StoreError> {
    rows.into_iter().map(Iou::try_from).collect()
}

/// Store backed by an SQLite connection pool
pub struct SqliteIouStore {
    pool: SqlitePool,
}

impl SqliteIouStore {
    /// Open (or create) the database and apply the schema
    ///
    /// # Arguments
    /// * `database_url` - File path, `sqlite:` URL, or `sqlite::memory:`
    ///
    /// # Returns
    /// * `Ok(SqliteIouStore)` if successful
    /// * `Err(StoreError::Setup)` if the connection or schema failed
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let in_memory = database_url.contains(":memory:");

        if let Some(parent) = database_file(database_url).and_then(|p| p.parent().map(PathBuf::from))
        {
            std::fs::create_dir_all(&parent).map_err(|e| {
                StoreError::Setup(format!(
                    "Failed to create db directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let connection_string = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite:{}", database_url)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| StoreError::Setup(format!("Invalid database path: {}", e)))?
            .create_if_missing(true);

        // Every in-memory connection is its own database, so keep exactly one alive.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Setup(format!("Failed to connect to database: {}", e)))?;

        info!("Connected to SQLite database at: {}", database_url);

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Apply the embedded schema
    async fn run_migrations(&self) -> Result<(), StoreError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_ious.sql");

        for statement in split_statements(migration_sql) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    StoreError::Setup(format!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<Iou>, StoreError> {
        let rows = sqlx::query_as::<_, IouRow>(&format!("{} ORDER BY rowid", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        decode_rows(rows)
    }

    /// Get the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Filesystem path behind a database URL, `None` for in-memory databases
fn database_file(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") {
        return None;
    }

    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Strip `--` comments and split a script into single statements
fn split_statements(sql: &str) -> Vec<String> {
    let mut cleaned_sql = String::new();
    for line in sql.lines() {
        let without_comments = match line.find("--") {
            Some(comment_pos) => &line[..comment_pos],
            None => line,
        };
        let trimmed = without_comments.trim();
        if trimmed.is_empty() {
            continue;
        }
        cleaned_sql.push_str(trimmed);
        cleaned_sql.push(' ');
    }

    cleaned_sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl IouStore for SqliteIouStore {
    async fn insert(&self, mut iou: Iou) -> Result<Iou, StoreError> {
        iou.id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO ious (id, borrower, lender, amount, date_time) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(iou.id.to_string())
        .bind(&iou.borrower)
        .bind(&iou.lender)
        .bind(iou.amount.to_string())
        .bind(iou.date_time)
        .execute(&self.pool)
        .await?;

        debug!("Inserted IOU: {}", iou.id);
        Ok(iou)
    }

    async fn find_by_id(&self, id: IouId) -> Result<Option<Iou>, StoreError> {
        let row = sqlx::query_as::<_, IouRow>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Iou::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Iou>, StoreError> {
        self.fetch_all().await
    }

    async fn find_by_borrower(&self, borrower: &str) -> Result<Vec<Iou>, StoreError> {
        let rows = sqlx::query_as::<_, IouRow>(&format!(
            "{} WHERE borrower = ? ORDER BY rowid",
            SELECT_COLUMNS
        ))
        .bind(borrower)
        .fetch_all(&self.pool)
        .await?;

        decode_rows(rows)
    }

    async fn find_above_average_amount(&self) -> Result<Vec<Iou>, StoreError> {
        Ok(select_by_average(self.fetch_all().await?, AmountBand::Above))
    }

    async fn find_at_or_below_average_amount(&self) -> Result<Vec<Iou>, StoreError> {
        Ok(select_by_average(
            self.fetch_all().await?,
            AmountBand::AtOrBelow,
        ))
    }

    async fn exists(&self, id: IouId) -> Result<bool, StoreError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM ious WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    async fn delete(&self, id: IouId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM ious WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        debug!("Deleted IOU: {} ({} rows)", id, result.rows_affected());
        Ok(result.rows_affected() > 0)
    }

    async fn replace(&self, id: IouId, mut iou: Iou) -> Result<Iou, StoreError> {
        iou.id = id;

        let result = sqlx::query(
            "UPDATE ious SET borrower = ?, lender = ?, amount = ?, date_time = ? WHERE id = ?",
        )
        .bind(&iou.borrower)
        .bind(&iou.lender)
        .bind(iou.amount.to_string())
        .bind(iou.date_time)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(id));
        }

        debug!("Replaced IOU: {}", id);
        Ok(iou)
    }
}
