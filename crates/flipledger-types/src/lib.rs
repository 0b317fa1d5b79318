//! flipledger-types - Shared record types for flipledger
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no async runtime - just serde-serializable records as the
//! inventory application hands them over.
//!
//! Used by:
//! - flipledger-core (bucketing, milestones, trips)
//! - flipledger (CLI)

pub mod date;
pub mod expense;
pub mod item;

pub use date::{parse_record_date, DateParseError};
pub use expense::Expense;
pub use item::{InventoryItem, ItemStatus};
