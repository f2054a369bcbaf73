//! bwilcd Core Domain
//!
//! Plain data types for ILCD data stocks, process datasets and their
//! exchanges as served by ILCD-Network / SODA4LCA nodes.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{DatasetDetail, DatasetSummary, Direction, Exchange, SearchPage, Stock};
pub use values::{DatasetId, FlowId, InternalId, StockId};
