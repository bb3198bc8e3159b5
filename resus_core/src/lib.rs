#![forbid(unsafe_code)]

//! Core domain model and business logic for the eResus arrest timer.
//!
//! This crate provides:
//! - Domain types (phases, events, checklists, drug categories)
//! - The arrest session state machine and CPR-cycle timing
//! - Drug eligibility policy
//! - Undo history and event log
//! - Persistence (live document, archive, device identity)

pub mod clock;
pub mod config;
pub mod dosage;
pub mod error;
pub mod event;
pub mod logging;
pub mod persistence;
pub mod policy;
pub mod session;
pub mod summary;
pub mod templates;
pub mod types;
pub mod undo;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, Settings};
pub use error::{Error, Result};
pub use event::{Event, EventLog};
pub use persistence::{load_device_id, ArrestDocument, FileGateway, MemoryGateway, PersistenceGateway};
pub use policy::DrugStatus;
pub use session::{ArrestEngine, Session};
pub use types::*;
