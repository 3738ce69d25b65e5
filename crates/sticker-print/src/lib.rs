//! # sticker-print: Print Orchestration for Sticker Line
//!
//! Runs one print action from request to recorded history.
//!
//! ## Stage Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PrintOrchestrator::execute                          │
//! │                                                                         │
//! │  Validating ──► CheckingHistory ──► CheckingSequence ──► Printing      │
//! │      │                │              (normal only)          │           │
//! │      │                │                   │                 │           │
//! │      ▼                ▼                   ▼                 ▼           │
//! │  ┌──────────────────────────────────────────────┐    ┌────────────┐    │
//! │  │ Aborted: nothing printed, nothing recorded   │    │  Failed    │    │
//! │  └──────────────────────────────────────────────┘    │  (service) │    │
//! │                                                      └────────────┘    │
//! │  Printing ──► RecordingHistory ──► RecordingMetadata ──► Done          │
//! │                     │                     │                             │
//! │                     ▼                     ▼                             │
//! │              Failed (printed,       Done + warning                     │
//! │              not recorded)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`] - `PrintHistoryStore` contract and its SQLite implementation
//! - [`printer`] - `PrintService` contract and the HTTP integration client
//! - [`orchestrator`] - `PrintOrchestrator`
//! - [`error`] - Store, print service and orchestration errors

pub mod error;
pub mod orchestrator;
pub mod printer;
pub mod store;

pub use error::{ErrorKind, PrintError, PrintServiceError, StoreError};
pub use orchestrator::{OrchestratorConfig, PrintOrchestrator, PrintOutcome, PrintStage};
pub use printer::{IntegrationClient, PrintJob, PrintService};
pub use store::PrintHistoryStore;
