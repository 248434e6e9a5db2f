//! Storage engine for Strata.
//!
//! This crate provides:
//! - Raw append-only data files with positioned reads
//! - On-disk record tables with a buffered write path
//! - In-memory record tables
//! - A dual-phase scan stitching persisted and buffered records
//! - Block-nested-loop joins generic over table representation

mod disk;
mod file;
mod heap;
mod join;
mod memory;
mod scan;
#[cfg(test)]
mod testutil;

pub use disk::DiskTable;
pub use file::DataFile;
pub use heap::HeapStore;
pub use join::{
    bnl_join_into_disk, bnl_join_into_disk_by, bnl_join_into_memory, bnl_join_into_memory_by,
    tables_equal, Joinable,
};
pub use memory::MemoryTable;
pub use scan::{DiskTableScan, RecordSource, ScanPhase, ScanPosition};
