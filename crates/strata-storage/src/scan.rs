//! Sequential scans over on-disk tables.
//!
//! A scan reads the persisted rows file one block at a time and then
//! hands over to the table's live write buffer, yielding every record in
//! overall insertion order. The two-stage traversal is modeled as a
//! tagged state machine so the file-to-buffer handoff is an explicit,
//! testable edge.

use crate::disk::DiskTable;
use strata_common::{Record, Result, StrataError};

/// A source of records that can be scanned from the start any number of
/// times.
///
/// Implemented by both table representations, so algorithms written
/// against it (joins, equality) behave identically whether their inputs
/// live on disk or in memory.
pub trait RecordSource<R: Record> {
    /// Starts a fresh scan from the first record.
    fn scan_records(&self) -> impl Iterator<Item = Result<R>> + '_;

    /// Number of records currently in the source.
    fn record_count(&self) -> Result<usize>;
}

/// Which region of the table a scan is currently reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScanPhase {
    /// Reading blocks out of the persisted rows file.
    Persisted,
    /// Reading the live write buffer.
    Buffer,
    /// All records have been yielded.
    Done,
}

/// A totally ordered snapshot of a scan's progress.
///
/// Positions compare by `(phase, offset, index)`: two scans over the
/// same table order the same way the records they point at do, which
/// allows range-style algorithms and state-equality checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScanPosition {
    /// Region the scan is reading.
    pub phase: ScanPhase,
    /// File offset just past the current block (`Persisted` only).
    pub offset: u64,
    /// Index of the next record within the current block or buffer.
    pub index: usize,
}

enum ScanState<R> {
    /// Reading fixed-size blocks out of the rows file.
    Persisted {
        /// Offset at which the next block read starts.
        offset: u64,
        /// Decoded records of the current block.
        block: Vec<R>,
        /// Next record to yield within `block`.
        pos: usize,
    },
    /// Reading the table's write buffer as one terminal block.
    Buffer { pos: usize },
    /// Terminal state.
    Done,
}

/// Dual-phase iterator over a [`DiskTable`].
///
/// Holds a shared borrow of the table for its whole lifetime, so the
/// table cannot be mutated while a scan is live.
pub struct DiskTableScan<'a, R: Record> {
    table: &'a DiskTable<R>,
    state: ScanState<R>,
}

impl<'a, R: Record> DiskTableScan<'a, R> {
    pub(crate) fn new(table: &'a DiskTable<R>) -> Self {
        Self {
            table,
            state: ScanState::Persisted {
                offset: 0,
                block: Vec::new(),
                pos: 0,
            },
        }
    }

    /// Returns a snapshot of the scan's current position.
    pub fn position(&self) -> ScanPosition {
        match &self.state {
            ScanState::Persisted { offset, pos, .. } => ScanPosition {
                phase: ScanPhase::Persisted,
                offset: *offset,
                index: *pos,
            },
            ScanState::Buffer { pos } => ScanPosition {
                phase: ScanPhase::Buffer,
                offset: 0,
                index: *pos,
            },
            ScanState::Done => ScanPosition {
                phase: ScanPhase::Done,
                offset: 0,
                index: 0,
            },
        }
    }

    /// Reads and decodes one block of up to `capacity` records starting
    /// at `offset`. An empty result means the persisted region is
    /// exhausted.
    fn load_block(table: &DiskTable<R>, offset: u64) -> Result<Vec<R>> {
        let mut bytes = vec![0u8; table.capacity * R::SIZE];
        let n = table.rows.read_at(offset, &mut bytes)?;

        if n % R::SIZE != 0 {
            return Err(StrataError::TruncatedRecord {
                offset,
                remainder: n % R::SIZE,
                record_size: R::SIZE,
            });
        }

        Ok(bytes[..n].chunks_exact(R::SIZE).map(R::decode).collect())
    }
}

impl<R: Record> Iterator for DiskTableScan<'_, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, ScanState::Done) {
                ScanState::Persisted { offset, block, pos } => {
                    if pos < block.len() {
                        let record = block[pos];
                        self.state = ScanState::Persisted {
                            offset,
                            block,
                            pos: pos + 1,
                        };
                        return Some(Ok(record));
                    }

                    // Block exhausted; load the next one from the file.
                    match Self::load_block(self.table, offset) {
                        Ok(next) if !next.is_empty() => {
                            let advanced = offset + (next.len() * R::SIZE) as u64;
                            self.state = ScanState::Persisted {
                                offset: advanced,
                                block: next,
                                pos: 0,
                            };
                        }
                        Ok(_) if !self.table.buffer.is_empty() => {
                            // End of the persisted region: switch to the
                            // live write buffer.
                            self.state = ScanState::Buffer { pos: 0 };
                        }
                        // End of data; the state is already Done.
                        Ok(_) => return None,
                        Err(e) => return Some(Err(e)),
                    }
                }
                ScanState::Buffer { pos } => {
                    if pos < self.table.buffer.len() {
                        self.state = ScanState::Buffer { pos: pos + 1 };
                        return Some(Ok(self.table.buffer[pos]));
                    }
                    return None;
                }
                ScanState::Done => return None,
            }
        }
    }
}
