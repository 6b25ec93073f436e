//! # MRP Ledger
//!
//! 可持久化的物料預留帳本與預留引擎

pub mod engine;
pub mod ledger;
pub mod shared;
pub mod store;

// Re-export 主要類型
pub use engine::{ActiveReservations, ReservationEngine, ReservationOutcome, Selection};
pub use ledger::ReservationLedger;
pub use shared::SharedReservationEngine;
pub use store::{JsonFileStore, LedgerDocument, LedgerStore, MemoryStore};
