//! # Batch Repository
//!
//! Append-only metadata, one row per successful print action. The print
//! flow only ever writes here; rows are read back for the batch report.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use sticker_core::BatchRecord;

/// Repository for print batch metadata.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    pool: SqlitePool,
}

impl BatchRepository {
    /// Creates a new BatchRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BatchRepository { pool }
    }

    /// Appends a batch record.
    pub async fn append(&self, record: &BatchRecord) -> DbResult<()> {
        debug!(
            id = %record.id,
            range_start = record.range_start,
            range_end = record.range_end,
            reprint = record.reprint,
            "Appending batch record"
        );

        sqlx::query(
            r#"
            INSERT INTO print_batches (
                id, range_start, range_end, datecode, reprint, printed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&record.id)
        .bind(record.range_start)
        .bind(record.range_end)
        .bind(&record.datecode)
        .bind(record.reprint)
        .bind(record.printed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the most recent batches, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<BatchRecord>> {
        let records = sqlx::query_as::<_, BatchRecord>(
            r#"
            SELECT id, range_start, range_end, datecode, reprint, printed_at
            FROM print_batches
            ORDER BY printed_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Counts batch records.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM print_batches")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
