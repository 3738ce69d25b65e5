//! # Serial Repository
//!
//! The printed serial history: one row per serial, never updated or deleted.
//!
//! ## Range Queries On Text
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  printed_serials.serial_number is TEXT, always 5 digits                │
//! │                                                                         │
//! │  WHERE serial_number BETWEEN '00103' AND '00110'                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  '00100' '00101' '00102' ['00103' '00104' '00105']                     │
//! │                            └──────── overlap ──────┘                    │
//! │                                                                         │
//! │  Fixed width makes text order equal numeric order, so BETWEEN and      │
//! │  MAX give numeric answers and the primary key index serves both.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use sticker_core::SerialNumber;

const TABLE: &str = "printed_serials";

/// Repository for printed serial operations.
#[derive(Debug, Clone)]
pub struct SerialRepository {
    pool: SqlitePool,
}

impl SerialRepository {
    /// Creates a new SerialRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SerialRepository { pool }
    }

    /// Returns every recorded serial in `first..=last`, in increasing order.
    ///
    /// An empty result means no overlap.
    pub async fn find_in_range(
        &self,
        first: SerialNumber,
        last: SerialNumber,
    ) -> DbResult<Vec<SerialNumber>> {
        debug!(first = %first, last = %last, "Looking up printed serials in range");

        let rows: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT serial_number
            FROM printed_serials
            WHERE serial_number BETWEEN ?1 AND ?2
            ORDER BY serial_number
            "#,
        )
        .bind(first.to_string())
        .bind(last.to_string())
        .fetch_all(&self.pool)
        .await?;

        let serials = rows
            .iter()
            .map(|raw| raw.parse::<SerialNumber>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::invalid_row(TABLE, e))?;

        debug!(count = serials.len(), "Overlap lookup complete");
        Ok(serials)
    }

    /// Returns the highest recorded serial, or `None` for an empty history.
    pub async fn max_serial(&self) -> DbResult<Option<SerialNumber>> {
        let max: Option<String> =
            sqlx::query_scalar("SELECT MAX(serial_number) FROM printed_serials")
                .fetch_one(&self.pool)
                .await?;

        max.map(|raw| raw.parse::<SerialNumber>())
            .transpose()
            .map_err(|e| DbError::invalid_row(TABLE, e))
    }

    /// Records printed serials, all or nothing.
    ///
    /// ## Transaction
    /// Every row is inserted inside one transaction. If any serial already
    /// exists the UNIQUE constraint fails, the transaction is rolled back and
    /// [`DbError::UniqueViolation`] names the colliding serial.
    ///
    /// Returns the number of rows inserted.
    pub async fn record(
        &self,
        serials: &[SerialNumber],
        printed_at: DateTime<Utc>,
    ) -> DbResult<u64> {
        if serials.is_empty() {
            return Ok(0);
        }

        debug!(
            count = serials.len(),
            first = %serials[0],
            "Recording printed serials"
        );

        let mut tx = self.pool.begin().await?;

        for serial in serials {
            let text = serial.to_string();
            sqlx::query(
                r#"
                INSERT INTO printed_serials (serial_number, printed_at)
                VALUES (?1, ?2)
                "#,
            )
            .bind(&text)
            .bind(printed_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => DbError::duplicate(field, text.clone()),
                other => other,
            })?;
        }

        tx.commit().await?;

        Ok(serials.len() as u64)
    }

    /// Counts recorded serials.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM printed_serials")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use chrono::Utc;
    use sticker_core::{SerialNumber, SerialRange};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn serial(index: u32) -> SerialNumber {
        SerialNumber::new(index).unwrap()
    }

    fn range(start: u32, end: u32) -> Vec<SerialNumber> {
        SerialRange::from_indices(start, end).unwrap().serials()
    }

    #[tokio::test]
    async fn test_empty_history() {
        let db = db().await;
        let repo = db.serials();

        assert_eq!(repo.max_serial().await.unwrap(), None);
        assert!(repo
            .find_in_range(serial(1), serial(500))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_and_find_overlap() {
        let db = db().await;
        let repo = db.serials();

        let inserted = repo.record(&range(100, 105), Utc::now()).await.unwrap();
        assert_eq!(inserted, 6);

        let overlap = repo.find_in_range(serial(103), serial(110)).await.unwrap();
        assert_eq!(overlap, vec![serial(103), serial(104), serial(105)]);

        let none = repo.find_in_range(serial(106), serial(110)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_max_is_numeric_across_digit_boundaries() {
        let db = db().await;
        let repo = db.serials();

        repo.record(&range(98, 101), Utc::now()).await.unwrap();
        repo.record(&range(9, 9), Utc::now()).await.unwrap();

        assert_eq!(repo.max_serial().await.unwrap(), Some(serial(101)));

        let overlap = repo.find_in_range(serial(99), serial(100)).await.unwrap();
        assert_eq!(overlap, vec![serial(99), serial(100)]);
    }

    #[tokio::test]
    async fn test_duplicate_rolls_back_whole_batch() {
        let db = db().await;
        let repo = db.serials();

        repo.record(&range(10, 12), Utc::now()).await.unwrap();

        // 13 and 14 are new but 12 collides, so nothing is written.
        let err = repo.record(&range(12, 14), Utc::now()).await.unwrap_err();
        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "00012"),
            other => panic!("expected unique violation, got {other:?}"),
        }

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.max_serial().await.unwrap(), Some(serial(12)));
    }

    #[tokio::test]
    async fn test_record_empty_is_noop() {
        let db = db().await;
        assert_eq!(db.serials().record(&[], Utc::now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_schema_rejects_unpadded_serials() {
        let db = db().await;

        let result = sqlx::query(
            "INSERT INTO printed_serials (serial_number, printed_at) VALUES ('42', '2025-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await;

        assert!(result.is_err());
    }
}
