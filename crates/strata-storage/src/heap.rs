//! Reserved store for variable-length payloads.
//!
//! Every persisted table carries a `heap` file next to its `rows` file.
//! Fixed-size records never touch it; it is reserved for columns that
//! will point into it once variable-length values are supported. Until
//! then this type is a thin pass-through over the raw file.

use crate::file::DataFile;
use std::path::Path;
use strata_common::Result;

/// Handle to a table's heap file.
#[derive(Debug)]
pub struct HeapStore {
    /// The heap data file.
    file: DataFile,
}

impl HeapStore {
    /// Opens or creates the heap file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            file: DataFile::open_rw(path)?,
        })
    }

    /// Returns the size of the heap file in bytes.
    pub fn size(&self) -> Result<u64> {
        self.file.size()
    }

    /// Reads raw bytes from the heap at `offset`. Returns the number of
    /// bytes actually read.
    pub fn read_raw(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.file.read_at(offset, buf)
    }

    /// Unlinks the heap file.
    pub(crate) fn remove(&self) -> Result<()> {
        self.file.remove()
    }
}
