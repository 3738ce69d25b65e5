//! # Repository Module
//!
//! Database repository implementations for Sticker Line.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  PrintOrchestrator                                                     │
//! │       │                                                                 │
//! │       │  db.serials().find_in_range(first, last)                       │
//! │       ▼                                                                 │
//! │  SerialRepository                     BatchRepository                  │
//! │  ├── find_in_range(first, last)       ├── append(record)               │
//! │  ├── max_serial()                     └── list_recent(limit)           │
//! │  ├── record(serials, printed_at)                                       │
//! │  └── count()                                                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SerialRepository`](serial::SerialRepository) - Printed serial history
//! - [`BatchRepository`](batch::BatchRepository) - Print batch metadata

pub mod batch;
pub mod serial;
