//! In-memory record tables.

use crate::disk::DiskTable;
use crate::scan::RecordSource;
use strata_common::{Record, Result, StrataError};

/// An ordered record table held entirely in memory.
///
/// Records are kept in insertion order and never persisted. Iteration is
/// forward-only and restartable: every call to [`MemoryTable::iter`]
/// starts from the first record.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTable<R: Record> {
    /// The rows of this table, in insertion order.
    rows: Vec<R>,
}

impl<R: Record> MemoryTable<R> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Returns the number of records in this table.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Clears the table, removing all rows.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Inserts a new row at the end of the table.
    pub fn insert(&mut self, record: R) {
        self.rows.push(record);
    }

    /// Reads the record at `index`.
    pub fn read(&self, index: usize) -> Result<R> {
        self.rows
            .get(index)
            .copied()
            .ok_or(StrataError::IndexOutOfRange {
                index,
                size: self.rows.len(),
            })
    }

    /// Iterates over the records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    /// Returns the rows as a slice.
    pub fn as_slice(&self) -> &[R] {
        &self.rows
    }

    /// Produces a new in-memory table holding the records for which
    /// `filter` returns true, in original order.
    pub fn filter_into_memory<F>(&self, mut filter: F) -> MemoryTable<R>
    where
        F: FnMut(&R) -> bool,
    {
        let mut table = MemoryTable::new();
        for record in &self.rows {
            if filter(record) {
                table.insert(*record);
            }
        }
        table
    }

    /// Produces a fresh temporary on-disk table holding the records for
    /// which `filter` returns true, in original order.
    pub fn filter_into_disk<F>(&self, mut filter: F) -> Result<DiskTable<R>>
    where
        F: FnMut(&R) -> bool,
    {
        let mut table = DiskTable::create_temp()?;
        for record in &self.rows {
            if filter(record) {
                table.insert(*record)?;
            }
        }
        Ok(table)
    }

    /// Filters with `filter`, then transforms each surviving record with
    /// `map` into a new in-memory table.
    pub fn filter_map_into_memory<O, F, M>(&self, mut filter: F, mut map: M) -> MemoryTable<O>
    where
        O: Record,
        F: FnMut(&R) -> bool,
        M: FnMut(&R) -> O,
    {
        let mut table = MemoryTable::new();
        for record in &self.rows {
            if filter(record) {
                table.insert(map(record));
            }
        }
        table
    }

    /// Filters with `filter`, then transforms each surviving record with
    /// `map` into a fresh temporary on-disk table.
    pub fn filter_map_into_disk<O, F, M>(&self, mut filter: F, mut map: M) -> Result<DiskTable<O>>
    where
        O: Record,
        F: FnMut(&R) -> bool,
        M: FnMut(&R) -> O,
    {
        let mut table = DiskTable::create_temp()?;
        for record in &self.rows {
            if filter(record) {
                table.insert(map(record))?;
            }
        }
        Ok(table)
    }
}

impl<R: Record> Default for MemoryTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> From<Vec<R>> for MemoryTable<R> {
    fn from(rows: Vec<R>) -> Self {
        Self { rows }
    }
}

impl<R: Record> RecordSource<R> for MemoryTable<R> {
    fn scan_records(&self) -> impl Iterator<Item = Result<R>> + '_ {
        self.rows.iter().copied().map(Ok)
    }

    fn record_count(&self) -> Result<usize> {
        Ok(self.rows.len())
    }
}
