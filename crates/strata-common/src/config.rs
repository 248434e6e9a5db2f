//! Configuration structures for Strata tables.

use crate::record::PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration shared by every table backed by the same storage area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Size in bytes of one block. The write buffer flushes when a full
    /// block's worth of records has accumulated.
    pub page_size: usize,
    /// Directory in which temporary tables create their backing files.
    pub temp_dir: PathBuf,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            temp_dir: std::env::temp_dir(),
        }
    }
}

impl TableConfig {
    /// Number of records of the given size that fit in one block; also
    /// the write-buffer flush threshold.
    pub fn block_capacity(&self, record_size: usize) -> usize {
        self.page_size / record_size
    }
}
