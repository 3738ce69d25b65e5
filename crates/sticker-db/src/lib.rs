//! # sticker-db: Database Layer for Sticker Line
//!
//! This crate persists the print history in SQLite using sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sticker Line Data Flow                            │
//! │                                                                         │
//! │  PrintOrchestrator (sticker-print)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   sticker-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ SerialRepo    │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ BatchRepo     │    │   _schema    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │        printed_serials (UNIQUE serial_number), print_batches    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Serial history and batch metadata repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sticker_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stickers.db")).await?;
//!
//! let max = db.serials().max_serial().await?;
//! let recent = db.batches().list_recent(20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::batch::BatchRepository;
pub use repository::serial::SerialRepository;
