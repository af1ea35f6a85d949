//! Durable dataset store
//!
//! `dataset` holds the pure core: the persisted row type, merge/dedup,
//! the sort invariant, the row cap, and the CSV codec. `manager` owns the
//! files: the display partition, monthly archives, backups, retention,
//! and filename repair.

pub mod dataset;
mod manager;

pub use dataset::{ScreenRecord, CSV_HEADER};
pub use manager::{DatasetStore, PartitionData, PartitionInfo, StoreError, StoreStatistics};
