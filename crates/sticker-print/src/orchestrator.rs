//! # Print Orchestrator
//!
//! Runs one print action: validate, check history, print, record.
//!
//! ## Ordering
//! The external print call is the point of no return. Every check that can
//! refuse a request runs before it, and nothing is written to the history
//! until the print service confirms completion.
//!
//! ## Timeouts
//! Each store call is bounded by `store_timeout` and the print call by
//! `print_timeout`. A store timeout before printing aborts with nothing
//! printed; after printing it is a bookkeeping failure. Nothing is retried.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use sticker_core::sequence::check_sequence;
use sticker_core::validation::validate_range;
use sticker_core::{
    BatchLimits, BatchRecord, CoreError, Datecode, OverrideAuthorizer, PrintMode, PrintRequest,
    SerialRange, SerialSpan, DEFAULT_SERIAL_PREFIX,
};

use crate::error::{PrintError, PrintServiceError, StoreError};
use crate::printer::{PrintJob, PrintService};
use crate::store::PrintHistoryStore;

// =============================================================================
// Stages
// =============================================================================

/// Where a print action is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintStage {
    Validating,
    CheckingHistory,
    /// Skipped on override.
    CheckingSequence,
    Printing,
    RecordingHistory,
    RecordingMetadata,
    Done,
}

impl PrintStage {
    /// Whether the physical print has been attempted at this stage.
    pub fn past_point_of_no_return(&self) -> bool {
        matches!(
            self,
            PrintStage::Printing
                | PrintStage::RecordingHistory
                | PrintStage::RecordingMetadata
                | PrintStage::Done
        )
    }
}

impl fmt::Display for PrintStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrintStage::Validating => "validating",
            PrintStage::CheckingHistory => "checking_history",
            PrintStage::CheckingSequence => "checking_sequence",
            PrintStage::Printing => "printing",
            PrintStage::RecordingHistory => "recording_history",
            PrintStage::RecordingMetadata => "recording_metadata",
            PrintStage::Done => "done",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Fixed label prefix, e.g. `APBUAESA`.
    pub serial_prefix: String,

    /// Hard cap and soft threshold.
    pub limits: BatchLimits,

    /// Upper bound on the print service call.
    pub print_timeout: Duration,

    /// Upper bound on each print history call.
    pub store_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            serial_prefix: DEFAULT_SERIAL_PREFIX.to_string(),
            limits: BatchLimits::default(),
            print_timeout: Duration::from_secs(5),
            store_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// A completed print action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOutcome {
    pub range: SerialRange,
    pub datecode: Datecode,
    pub mode: PrintMode,

    /// First label as printed, e.g. `APBUAESA250300100`.
    pub first_label: String,

    /// Serials newly added to the history. Lower than the copy count on a
    /// reprint that covered already recorded serials.
    pub newly_recorded: u32,

    /// Set when the batch metadata could not be written.
    pub metadata_warning: Option<String>,
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Composes validation, history checks, printing and recording.
///
/// ## Example
/// ```rust,ignore
/// let orchestrator = PrintOrchestrator::new(db, client, authorizer, config);
/// let outcome = orchestrator.execute(&PrintRequest::range(100, 150)).await?;
/// println!("printed {}", outcome.range);
/// ```
#[derive(Debug)]
pub struct PrintOrchestrator<S, P> {
    store: S,
    printer: P,
    authorizer: OverrideAuthorizer,
    config: OrchestratorConfig,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl<S, P> PrintOrchestrator<S, P>
where
    S: PrintHistoryStore,
    P: PrintService,
{
    pub fn new(
        store: S,
        printer: P,
        authorizer: OverrideAuthorizer,
        config: OrchestratorConfig,
    ) -> Self {
        PrintOrchestrator {
            store,
            printer,
            authorizer,
            config,
            today: local_today,
        }
    }

    /// Replaces the clock used for automatic datecodes.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn printer(&self) -> &P {
        &self.printer
    }

    pub fn authorizer(&self) -> &OverrideAuthorizer {
        &self.authorizer
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Datecode for a print started now.
    pub fn current_datecode(&self) -> Datecode {
        Datecode::for_date((self.today)())
    }

    /// Runs one print action.
    ///
    /// ## Steps
    /// 1. Validate the range, the datecode and the override password; a
    ///    large batch needs `confirmed`
    /// 2. Look up recorded serials in the range; any hit aborts a normal
    ///    print as overridable
    /// 3. Normal prints only: the first serial may not skip past max + 1
    /// 4. Print; failure leaves the history untouched
    /// 5. Record the serials not already in history, all or nothing
    /// 6. Append batch metadata; failure only adds a warning
    pub async fn execute(&self, request: &PrintRequest) -> Result<PrintOutcome, PrintError> {
        let mode = request.mode();

        // ---------------------------------------------------------------------
        // Validating
        // ---------------------------------------------------------------------
        self.enter(PrintStage::Validating);

        let checked = validate_range(request.start_index, request.end_index, &self.config.limits)
            .map_err(|e| self.abort(CoreError::from(e)))?;
        let range = checked.range;

        let datecode = self
            .resolve_datecode(mode, request.datecode.as_deref())
            .map_err(|e| self.abort(e))?;

        if let Some(warning) = checked.warning {
            if !request.confirmed {
                return Err(self.abort(CoreError::ConfirmationRequired {
                    message: warning.to_string(),
                }));
            }
            debug!(%warning, "Large batch confirmed by operator");
        }

        if mode == PrintMode::Override {
            let password = request.password.as_deref().unwrap_or_default();
            if !self.authorizer.verify(password) {
                return Err(self.abort(CoreError::OverrideDenied));
            }
        }

        // ---------------------------------------------------------------------
        // CheckingHistory
        // ---------------------------------------------------------------------
        self.enter(PrintStage::CheckingHistory);

        let overlap = self
            .bounded("find_overlap", self.store.find_overlap(range.first(), range.last()))
            .await
            .map_err(PrintError::HistoryUnavailable)?;

        if let Some(span) = SerialSpan::covering(overlap.iter().copied()) {
            match mode {
                PrintMode::Normal => {
                    return Err(self.abort(CoreError::AlreadyPrinted {
                        first: span.min,
                        last: span.max,
                    }));
                }
                PrintMode::Override => {
                    info!(overlap = %span, "Override reprints recorded serials");
                }
            }
        }

        // ---------------------------------------------------------------------
        // CheckingSequence (normal only)
        // ---------------------------------------------------------------------
        if mode == PrintMode::Normal {
            self.enter(PrintStage::CheckingSequence);

            let max = self
                .bounded("max_serial", self.store.max_serial())
                .await
                .map_err(PrintError::HistoryUnavailable)?;

            check_sequence(max, range.first()).map_err(|e| self.abort(e))?;
        }

        // ---------------------------------------------------------------------
        // Printing
        // ---------------------------------------------------------------------
        self.enter(PrintStage::Printing);

        let job = PrintJob {
            serial_number: range.first().qualified(&self.config.serial_prefix, &datecode),
            copies: range.copies(),
        };

        match timeout(self.config.print_timeout, self.printer.print(&job)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, range = %range, "Print failed, history unchanged");
                return Err(PrintError::PrintFailed(e));
            }
            Err(_) => {
                warn!(range = %range, "Print timed out, history unchanged");
                return Err(PrintError::PrintFailed(PrintServiceError::Timeout {
                    after: self.config.print_timeout,
                }));
            }
        }

        // ---------------------------------------------------------------------
        // RecordingHistory
        // ---------------------------------------------------------------------
        self.enter(PrintStage::RecordingHistory);

        let already: BTreeSet<_> = overlap.into_iter().collect();
        let fresh: Vec<_> = range.iter().filter(|s| !already.contains(s)).collect();
        let printed_at = Utc::now();

        if let Err(source) = self
            .bounded("record_serials", self.store.record_serials(&fresh, printed_at))
            .await
        {
            error!(
                error = %source,
                range = %range,
                "Labels printed but serials not recorded"
            );
            return Err(PrintError::NotRecorded { range, source });
        }

        // ---------------------------------------------------------------------
        // RecordingMetadata
        // ---------------------------------------------------------------------
        self.enter(PrintStage::RecordingMetadata);

        let record = BatchRecord::new(range, &datecode, mode == PrintMode::Override, printed_at);
        let metadata_warning = match self
            .bounded("append_batch", self.store.append_batch(&record))
            .await
        {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, batch_id = %record.id, "Batch metadata not recorded");
                Some(format!("Labels printed and recorded, but batch details were not saved: {}", e))
            }
        };

        self.enter(PrintStage::Done);
        info!(
            range = %range,
            copies = range.copies(),
            datecode = %datecode,
            mode = ?mode,
            newly_recorded = fresh.len(),
            "Print complete"
        );

        Ok(PrintOutcome {
            range,
            first_label: job.serial_number,
            datecode,
            mode,
            newly_recorded: fresh.len() as u32,
            metadata_warning,
        })
    }

    /// Picks the datecode to print.
    ///
    /// Normal prints always use the current datecode. An override may carry
    /// the datecode of the run being reprinted; a blank one means current.
    fn resolve_datecode(
        &self,
        mode: PrintMode,
        supplied: Option<&str>,
    ) -> Result<Datecode, CoreError> {
        match (mode, supplied.map(str::trim).filter(|s| !s.is_empty())) {
            (PrintMode::Override, Some(code)) => Ok(Datecode::parse(code)?),
            _ => Ok(self.current_datecode()),
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        timeout(self.config.store_timeout, call)
            .await
            .unwrap_or(Err(StoreError::Timeout { operation }))
    }

    fn enter(&self, stage: PrintStage) {
        debug!(%stage, committed = stage.past_point_of_no_return(), "Print stage");
    }

    fn abort(&self, reason: CoreError) -> PrintError {
        info!(%reason, "Print aborted");
        PrintError::Rejected(reason)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use sticker_core::SerialNumber;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const PASSWORD: &str = "reprint-ok";

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    enum Behaviour {
        Complete,
        Reject,
        Hang,
    }

    struct FakePrinter {
        behaviour: Behaviour,
        jobs: Mutex<Vec<PrintJob>>,
        calls: AtomicUsize,
    }

    impl FakePrinter {
        fn new(behaviour: Behaviour) -> Self {
            FakePrinter {
                behaviour,
                jobs: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PrintService for FakePrinter {
        async fn print(&self, job: &PrintJob) -> Result<(), PrintServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Complete => {
                    self.jobs.lock().unwrap().push(job.clone());
                    Ok(())
                }
                Behaviour::Reject => Err(PrintServiceError::Rejected {
                    status: "Faulted".to_string(),
                }),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                }
            }
        }
    }

    fn jan_15_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn orchestrator(
        store: MemoryStore,
        printer: FakePrinter,
    ) -> PrintOrchestrator<MemoryStore, FakePrinter> {
        let config = OrchestratorConfig {
            print_timeout: Duration::from_millis(100),
            store_timeout: Duration::from_millis(100),
            ..OrchestratorConfig::default()
        };
        PrintOrchestrator::new(
            store,
            printer,
            OverrideAuthorizer::new(Some(PASSWORD.to_string())),
            config,
        )
        .with_clock(jan_15_2025)
    }

    fn serial(index: u32) -> SerialNumber {
        SerialNumber::new(index).unwrap()
    }

    fn reprint(start: i64, end: i64, password: &str) -> PrintRequest {
        PrintRequest {
            override_requested: true,
            password: Some(password.to_string()),
            ..PrintRequest::range(start, end)
        }
    }

    // -------------------------------------------------------------------------
    // Happy paths
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_first_print_on_empty_history() {
        let orch = orchestrator(MemoryStore::default(), FakePrinter::new(Behaviour::Complete));

        let outcome = orch.execute(&PrintRequest::range(1, 50)).await.unwrap();

        assert_eq!(outcome.range.copies(), 50);
        assert_eq!(outcome.first_label, "APBUAESA250300001");
        assert_eq!(outcome.newly_recorded, 50);
        assert!(outcome.metadata_warning.is_none());

        let jobs = orch.printer().jobs.lock().unwrap().clone();
        assert_eq!(
            jobs,
            vec![PrintJob {
                serial_number: "APBUAESA250300001".to_string(),
                copies: 50
            }]
        );
        assert_eq!(orch.store().recorded().len(), 50);

        let batches = orch.store().batches.lock().unwrap().clone();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].range_start, 1);
        assert_eq!(batches[0].range_end, 50);
        assert_eq!(batches[0].datecode, "2503");
        assert!(!batches[0].reprint);
    }

    #[tokio::test]
    async fn test_continuing_sequence() {
        let orch = orchestrator(MemoryStore::with_range(1, 50), FakePrinter::new(Behaviour::Complete));

        orch.execute(&PrintRequest::range(51, 60)).await.unwrap();
        assert_eq!(orch.store().recorded().last(), Some(&serial(60)));
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_invalid_ranges_touch_nothing() {
        let orch = orchestrator(MemoryStore::default(), FakePrinter::new(Behaviour::Complete));

        for request in [
            PrintRequest::range(100, 99),
            PrintRequest::range(100, 600),
            PrintRequest::range(0, 5),
            PrintRequest::default(),
        ] {
            let err = orch.execute(&request).await.unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Input);
        }

        assert_eq!(orch.printer().calls.load(Ordering::SeqCst), 0);
        assert!(orch.store().recorded().is_empty());
    }

    #[tokio::test]
    async fn test_large_batch_needs_confirmation() {
        let orch = orchestrator(MemoryStore::default(), FakePrinter::new(Behaviour::Complete));

        let err = orch.execute(&PrintRequest::range(1, 151)).await.unwrap_err();
        assert!(err.needs_confirmation());
        assert_eq!(orch.printer().calls.load(Ordering::SeqCst), 0);

        let confirmed = PrintRequest {
            confirmed: true,
            ..PrintRequest::range(1, 151)
        };
        let outcome = orch.execute(&confirmed).await.unwrap();
        assert_eq!(outcome.range.copies(), 151);
    }

    // -------------------------------------------------------------------------
    // Overlap and override
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_overlap_rejected_without_override() {
        let orch = orchestrator(MemoryStore::with_range(100, 105), FakePrinter::new(Behaviour::Complete));

        let err = orch.execute(&PrintRequest::range(103, 110)).await.unwrap_err();

        assert_eq!(err.to_string(), "Serials already printed: 00103 - 00105");
        assert!(err.overridable());
        assert_eq!(orch.printer().calls.load(Ordering::SeqCst), 0);
        assert_eq!(orch.store().recorded().len(), 6);
    }

    #[tokio::test]
    async fn test_override_reprints_and_records_only_new_serials() {
        let orch = orchestrator(MemoryStore::with_range(100, 105), FakePrinter::new(Behaviour::Complete));

        let outcome = orch.execute(&reprint(103, 110, PASSWORD)).await.unwrap();

        assert_eq!(outcome.mode, PrintMode::Override);
        assert_eq!(outcome.range.copies(), 8);
        assert_eq!(outcome.newly_recorded, 5);

        let recorded = orch.store().recorded();
        assert_eq!(recorded.first(), Some(&serial(100)));
        assert_eq!(recorded.last(), Some(&serial(110)));
        assert_eq!(recorded.len(), 11);

        let batches = orch.store().batches.lock().unwrap().clone();
        assert!(batches[0].reprint);
    }

    #[tokio::test]
    async fn test_override_with_wrong_password() {
        let orch = orchestrator(MemoryStore::with_range(100, 105), FakePrinter::new(Behaviour::Complete));

        let err = orch.execute(&reprint(103, 110, "guess")).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Authorization);

        let mut missing = reprint(103, 110, PASSWORD);
        missing.password = None;
        let err = orch.execute(&missing).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Authorization);

        assert_eq!(orch.printer().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_override_refused_when_no_secret_configured() {
        let orch = PrintOrchestrator::new(
            MemoryStore::with_range(100, 105),
            FakePrinter::new(Behaviour::Complete),
            OverrideAuthorizer::new(None),
            OrchestratorConfig::default(),
        );

        let err = orch.execute(&reprint(103, 110, "")).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_override_uses_operator_datecode() {
        let orch = orchestrator(MemoryStore::with_range(1, 10), FakePrinter::new(Behaviour::Complete));

        let request = PrintRequest {
            datecode: Some("2448".to_string()),
            ..reprint(1, 10, PASSWORD)
        };
        let outcome = orch.execute(&request).await.unwrap();

        assert_eq!(outcome.datecode.as_str(), "2448");
        assert_eq!(outcome.first_label, "APBUAESA244800001");
        assert_eq!(outcome.newly_recorded, 0);
    }

    #[tokio::test]
    async fn test_override_rejects_bad_datecode() {
        let orch = orchestrator(MemoryStore::default(), FakePrinter::new(Behaviour::Complete));

        let request = PrintRequest {
            datecode: Some("2599".to_string()),
            ..reprint(1, 10, PASSWORD)
        };
        let err = orch.execute(&request).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Input);
        assert_eq!(orch.printer().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_normal_print_ignores_supplied_datecode() {
        let orch = orchestrator(MemoryStore::default(), FakePrinter::new(Behaviour::Complete));

        let request = PrintRequest {
            datecode: Some("1901".to_string()),
            ..PrintRequest::range(1, 2)
        };
        let outcome = orch.execute(&request).await.unwrap();
        assert_eq!(outcome.datecode.as_str(), "2503");
    }

    // -------------------------------------------------------------------------
    // Sequence
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sequence_gap_rejected() {
        let orch = orchestrator(MemoryStore::with_range(1, 50), FakePrinter::new(Behaviour::Complete));

        let err = orch.execute(&PrintRequest::range(52, 60)).await.unwrap_err();
        assert!(err.to_string().starts_with("First index breaks sequence"));
        assert!(err.overridable());
        assert_eq!(orch.printer().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backward_start_without_overlap() {
        // History 00041..=00050 with a hole below: 00030..=00040 is not recorded.
        let orch = orchestrator(MemoryStore::with_range(41, 50), FakePrinter::new(Behaviour::Complete));

        orch.execute(&PrintRequest::range(30, 40)).await.unwrap();
        assert_eq!(orch.store().recorded().len(), 21);
    }

    #[tokio::test]
    async fn test_override_skips_sequence_guard() {
        let orch = orchestrator(MemoryStore::with_range(1, 50), FakePrinter::new(Behaviour::Complete));

        orch.execute(&reprint(60, 70, PASSWORD)).await.unwrap();
        assert_eq!(orch.store().recorded().last(), Some(&serial(70)));
    }

    // -------------------------------------------------------------------------
    // Failures
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_failed_print_writes_nothing() {
        let orch = orchestrator(MemoryStore::default(), FakePrinter::new(Behaviour::Reject));

        let err = orch.execute(&PrintRequest::range(1, 10)).await.unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::DependentService);
        assert!(!err.printed());
        assert!(orch.store().recorded().is_empty());
        assert!(orch.store().batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_print_timeout_writes_nothing() {
        let orch = orchestrator(MemoryStore::default(), FakePrinter::new(Behaviour::Hang));

        let err = orch.execute(&PrintRequest::range(1, 10)).await.unwrap_err();

        assert!(matches!(
            err,
            PrintError::PrintFailed(PrintServiceError::Timeout { .. })
        ));
        assert!(err.to_string().starts_with("Could not reach the print service"));
        assert!(orch.store().recorded().is_empty());
    }

    #[tokio::test]
    async fn test_history_unavailable_aborts_before_printing() {
        let store = MemoryStore::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        let orch = orchestrator(store, FakePrinter::new(Behaviour::Complete));

        let err = orch.execute(&PrintRequest::range(1, 10)).await.unwrap_err();

        assert!(matches!(err, PrintError::HistoryUnavailable(_)));
        assert_eq!(orch.printer().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hanging_history_times_out_before_printing() {
        let store = MemoryStore::default();
        store.hang_reads.store(true, Ordering::SeqCst);
        let orch = orchestrator(store, FakePrinter::new(Behaviour::Complete));

        let err = orch.execute(&PrintRequest::range(1, 10)).await.unwrap_err();

        assert!(matches!(
            err,
            PrintError::HistoryUnavailable(StoreError::Timeout {
                operation: "find_overlap"
            })
        ));
        assert_eq!(err.kind(), crate::ErrorKind::Storage);
        assert!(!err.printed());
        assert_eq!(orch.printer().calls.load(Ordering::SeqCst), 0);
        assert!(orch.store().recorded().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_record_of_same_serials_is_not_recorded() {
        let store = MemoryStore::with_range(1, 10);
        let orch = orchestrator(store, FakePrinter::new(Behaviour::Complete));
        // Another station prints 11..=15 while this one is printing.
        orch.store()
            .racing_serials
            .lock()
            .unwrap()
            .extend((11..=15).map(serial));

        let err = orch.execute(&PrintRequest::range(11, 20)).await.unwrap_err();

        assert!(matches!(
            &err,
            PrintError::NotRecorded {
                source: StoreError::Duplicate { serial },
                ..
            } if serial == "00011"
        ));
        assert_eq!(err.kind(), crate::ErrorKind::Bookkeeping);
        assert!(err.printed());
        assert!(err.to_string().contains("Serial 00011 is already recorded"));
        assert_eq!(orch.printer().jobs.lock().unwrap().len(), 1);
        // The losing batch writes nothing; only the winner's serials exist.
        assert_eq!(orch.store().recorded().last(), Some(&serial(15)));
        assert!(orch.store().batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_failure_reports_printed_labels() {
        let store = MemoryStore::default();
        store.fail_record.store(true, Ordering::SeqCst);
        let orch = orchestrator(store, FakePrinter::new(Behaviour::Complete));

        let err = orch.execute(&PrintRequest::range(1, 10)).await.unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::Bookkeeping);
        assert!(err.printed());
        assert!(err.to_string().contains("were printed but could not be recorded"));
        assert_eq!(orch.printer().calls.load(Ordering::SeqCst), 1);
        assert!(orch.store().batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_failure_is_a_warning() {
        let store = MemoryStore::default();
        store.fail_batch.store(true, Ordering::SeqCst);
        let orch = orchestrator(store, FakePrinter::new(Behaviour::Complete));

        let outcome = orch.execute(&PrintRequest::range(1, 10)).await.unwrap();

        assert!(outcome.metadata_warning.is_some());
        assert_eq!(orch.store().recorded().len(), 10);
    }

    #[test]
    fn test_point_of_no_return() {
        assert!(!PrintStage::CheckingSequence.past_point_of_no_return());
        assert!(PrintStage::Printing.past_point_of_no_return());
        assert_eq!(PrintStage::RecordingHistory.to_string(), "recording_history");
    }
}
