//! # Print History Store
//!
//! The contract the orchestrator needs from the print history, and its
//! SQLite implementation on [`sticker_db::Database`].
//!
//! ## Contract
//! - `find_overlap(first, last)` returns every recorded serial in the
//!   inclusive range, in increasing order
//! - `max_serial()` is `None` only for an empty history
//! - `record_serials` is all or nothing; a collision is
//!   [`StoreError::Duplicate`]
//! - `append_batch` writes one metadata row

use std::future::Future;

use chrono::{DateTime, Utc};

use sticker_core::{BatchRecord, SerialNumber};
use sticker_db::Database;

use crate::error::StoreError;

/// Persisted print history.
pub trait PrintHistoryStore: Send + Sync {
    fn find_overlap(
        &self,
        first: SerialNumber,
        last: SerialNumber,
    ) -> impl Future<Output = Result<Vec<SerialNumber>, StoreError>> + Send;

    fn max_serial(&self) -> impl Future<Output = Result<Option<SerialNumber>, StoreError>> + Send;

    fn record_serials(
        &self,
        serials: &[SerialNumber],
        printed_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn append_batch(
        &self,
        record: &BatchRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl PrintHistoryStore for Database {
    async fn find_overlap(
        &self,
        first: SerialNumber,
        last: SerialNumber,
    ) -> Result<Vec<SerialNumber>, StoreError> {
        Ok(self.serials().find_in_range(first, last).await?)
    }

    async fn max_serial(&self) -> Result<Option<SerialNumber>, StoreError> {
        Ok(self.serials().max_serial().await?)
    }

    async fn record_serials(
        &self,
        serials: &[SerialNumber],
        printed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.serials().record(serials, printed_at).await?;
        Ok(())
    }

    async fn append_batch(&self, record: &BatchRecord) -> Result<(), StoreError> {
        Ok(self.batches().append(record).await?)
    }
}

// =============================================================================
// Test Support
// =============================================================================

/// In-memory store with switchable failures, for orchestrator tests.
#[cfg(test)]
pub(crate) mod memory {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        pub serials: Mutex<BTreeSet<SerialNumber>>,
        pub batches: Mutex<Vec<BatchRecord>>,
        pub fail_reads: AtomicBool,
        pub fail_record: AtomicBool,
        pub fail_batch: AtomicBool,
        /// Reads never complete.
        pub hang_reads: AtomicBool,
        /// Recorded by a concurrent request just before the next write.
        pub racing_serials: Mutex<Vec<SerialNumber>>,
    }

    impl MemoryStore {
        pub fn with_range(first: u32, last: u32) -> Self {
            let store = MemoryStore::default();
            store.serials.lock().unwrap().extend(
                (first..=last).map(|i| SerialNumber::new(i).unwrap()),
            );
            store
        }

        pub fn recorded(&self) -> Vec<SerialNumber> {
            self.serials.lock().unwrap().iter().copied().collect()
        }
    }

    impl PrintHistoryStore for MemoryStore {
        async fn find_overlap(
            &self,
            first: SerialNumber,
            last: SerialNumber,
        ) -> Result<Vec<SerialNumber>, StoreError> {
            if self.hang_reads.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("reads disabled".to_string()));
            }
            let serials = self.serials.lock().unwrap();
            Ok(serials.range(first..=last).copied().collect())
        }

        async fn max_serial(&self) -> Result<Option<SerialNumber>, StoreError> {
            if self.hang_reads.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("reads disabled".to_string()));
            }
            Ok(self.serials.lock().unwrap().last().copied())
        }

        async fn record_serials(
            &self,
            serials: &[SerialNumber],
            _printed_at: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            if self.fail_record.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("writes disabled".to_string()));
            }
            let mut stored = self.serials.lock().unwrap();
            stored.extend(self.racing_serials.lock().unwrap().drain(..));
            if let Some(dup) = serials.iter().find(|s| stored.contains(s)) {
                return Err(StoreError::Duplicate {
                    serial: dup.to_string(),
                });
            }
            stored.extend(serials.iter().copied());
            Ok(())
        }

        async fn append_batch(&self, record: &BatchRecord) -> Result<(), StoreError> {
            if self.fail_batch.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("batch table locked".to_string()));
            }
            self.batches.lock().unwrap().push(record.clone());
            Ok(())
        }
    }
}
