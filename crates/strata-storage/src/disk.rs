//! On-disk record tables with a buffered write path.
//!
//! A table appends fixed-size records through an in-memory write buffer
//! that holds at most one block. The buffer flushes when it fills and,
//! for persisted tables, on drop. Records are visible to reads and scans
//! the instant `insert` returns, flushed or not.

use crate::file::DataFile;
use crate::heap::HeapStore;
use crate::memory::MemoryTable;
use crate::scan::{DiskTableScan, RecordSource};
use bytes::BytesMut;
use std::path::{Path, PathBuf};
use strata_common::{Record, Result, StrataError, TableConfig};

/// A record table backed by an append-only rows file.
///
/// The table exclusively owns its file handle and write buffer; moving a
/// table transfers both, so a moved-from table can never be flushed or
/// read twice.
pub struct DiskTable<R: Record> {
    /// Root directory of the table; `None` for temporary tables.
    root_path: Option<PathBuf>,
    /// File containing the encoded rows of this table.
    pub(crate) rows: DataFile,
    /// Reserved variable-length payload store (persisted tables only).
    heap: Option<HeapStore>,
    /// Pending records not yet appended to the rows file.
    pub(crate) buffer: Vec<R>,
    /// Records per block; the write buffer flushes at this count.
    pub(crate) capacity: usize,
    /// Configuration this table was opened with.
    config: TableConfig,
    /// Temporary tables discard their contents on drop instead of
    /// flushing.
    temp: bool,
}

impl<R: Record> DiskTable<R> {
    /// Opens or creates a persisted table at `path` with the default
    /// configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, TableConfig::default())
    }

    /// Opens or creates a persisted table at `path`.
    ///
    /// The table occupies a root directory laid out as:
    /// - `rows`: encoded fixed-size records in insertion order
    /// - `heap`: reserved for variable-length payloads
    /// - `indexes/`: reserved for index files
    pub fn open_with(path: impl AsRef<Path>, config: TableConfig) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("indexes"))?;

        let rows = DataFile::open_rw(root.join("rows"))?;
        let heap = HeapStore::open(root.join("heap"))?;
        let capacity = config.block_capacity(R::SIZE).max(1);

        tracing::debug!(path = %root.display(), capacity, "opened table");

        Ok(Self {
            root_path: Some(root),
            rows,
            heap: Some(heap),
            buffer: Vec::with_capacity(capacity),
            capacity,
            config,
            temp: false,
        })
    }

    /// Creates a temporary table with the default configuration.
    pub fn create_temp() -> Result<Self> {
        Self::create_temp_with(TableConfig::default())
    }

    /// Creates a temporary table backed by a uniquely-named file in the
    /// configured temp directory. Its contents are discarded on drop.
    pub fn create_temp_with(config: TableConfig) -> Result<Self> {
        let rows = DataFile::create_temp(&config.temp_dir)?;
        let capacity = config.block_capacity(R::SIZE).max(1);

        Ok(Self {
            root_path: None,
            rows,
            heap: None,
            buffer: Vec::with_capacity(capacity),
            capacity,
            config,
            temp: true,
        })
    }

    /// Returns the root directory for persisted tables.
    pub fn root_path(&self) -> Option<&Path> {
        self.root_path.as_deref()
    }

    /// Returns true if this table discards its contents on drop.
    pub fn is_temp(&self) -> bool {
        self.temp
    }

    /// Returns the configuration this table was opened with.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Returns the reserved heap store of a persisted table.
    pub fn heap(&self) -> Option<&HeapStore> {
        self.heap.as_ref()
    }

    /// Number of records currently persisted in the rows file.
    pub(crate) fn persisted_count(&self) -> Result<usize> {
        Ok(self.rows.size()? as usize / R::SIZE)
    }

    /// Returns the number of records in this table, buffered or not.
    pub fn size(&self) -> Result<usize> {
        Ok(self.persisted_count()? + self.buffer.len())
    }

    /// Clears the table, removing all persisted and buffered rows.
    pub fn clear(&mut self) -> Result<()> {
        self.rows.clear()?;
        self.buffer.clear();
        Ok(())
    }

    /// Inserts a new row into the table.
    ///
    /// The record lands in the write buffer and becomes immediately
    /// visible; a full buffer is flushed to the rows file.
    pub fn insert(&mut self, record: R) -> Result<()> {
        self.buffer.push(record);
        if self.buffer.len() == self.capacity {
            self.flush_write_buffer()?;
        }
        Ok(())
    }

    /// Appends the buffered records to the rows file and empties the
    /// buffer.
    pub fn flush_write_buffer(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let mut block = BytesMut::zeroed(self.buffer.len() * R::SIZE);
        for (i, record) in self.buffer.iter().enumerate() {
            record.encode(&mut block[i * R::SIZE..(i + 1) * R::SIZE]);
        }

        self.rows.append(&block)?;
        tracing::trace!(records = self.buffer.len(), "flushed write buffer");
        self.buffer.clear();
        Ok(())
    }

    /// Reads the record at `index`.
    ///
    /// Indexes below the persisted count resolve to the rows file; the
    /// rest resolve to the write buffer.
    pub fn read(&self, index: usize) -> Result<R> {
        let persisted = self.persisted_count()?;

        if index < persisted {
            let offset = (index * R::SIZE) as u64;
            let mut buf = vec![0u8; R::SIZE];
            let n = self.rows.read_at(offset, &mut buf)?;
            if n != R::SIZE {
                return Err(StrataError::TruncatedRecord {
                    offset,
                    remainder: n,
                    record_size: R::SIZE,
                });
            }
            return Ok(R::decode(&buf));
        }

        self.buffer
            .get(index - persisted)
            .copied()
            .ok_or(StrataError::IndexOutOfRange {
                index,
                size: persisted + self.buffer.len(),
            })
    }

    /// Starts a sequential scan over all records: the persisted file in
    /// flush order, then the write buffer in insertion order.
    pub fn scan(&self) -> DiskTableScan<'_, R> {
        DiskTableScan::new(self)
    }

    /// Materializes the full logical contents, the persisted extent plus
    /// any records still in the write buffer, into an in-memory table.
    pub fn read_into_memory(&self) -> Result<MemoryTable<R>> {
        let mut table = MemoryTable::new();
        for record in self.scan() {
            table.insert(record?);
        }
        Ok(table)
    }

    /// Produces a new in-memory table holding the records for which
    /// `filter` returns true, in original order.
    pub fn filter_into_memory<F>(&self, mut filter: F) -> Result<MemoryTable<R>>
    where
        F: FnMut(&R) -> bool,
    {
        let mut table = MemoryTable::new();
        for record in self.scan() {
            let record = record?;
            if filter(&record) {
                table.insert(record);
            }
        }
        Ok(table)
    }

    /// Produces a fresh temporary on-disk table holding the records for
    /// which `filter` returns true, in original order.
    pub fn filter_into_disk<F>(&self, mut filter: F) -> Result<DiskTable<R>>
    where
        F: FnMut(&R) -> bool,
    {
        let mut table = DiskTable::create_temp_with(self.config.clone())?;
        for record in self.scan() {
            let record = record?;
            if filter(&record) {
                table.insert(record)?;
            }
        }
        Ok(table)
    }

    /// Filters with `filter`, then transforms each surviving record with
    /// `map` into a new in-memory table.
    pub fn filter_map_into_memory<O, F, M>(&self, mut filter: F, mut map: M) -> Result<MemoryTable<O>>
    where
        O: Record,
        F: FnMut(&R) -> bool,
        M: FnMut(&R) -> O,
    {
        let mut table = MemoryTable::new();
        for record in self.scan() {
            let record = record?;
            if filter(&record) {
                table.insert(map(&record));
            }
        }
        Ok(table)
    }

    /// Filters with `filter`, then transforms each surviving record with
    /// `map` into a fresh temporary on-disk table.
    pub fn filter_map_into_disk<O, F, M>(&self, mut filter: F, mut map: M) -> Result<DiskTable<O>>
    where
        O: Record,
        F: FnMut(&R) -> bool,
        M: FnMut(&R) -> O,
    {
        let mut table = DiskTable::create_temp_with(self.config.clone())?;
        for record in self.scan() {
            let record = record?;
            if filter(&record) {
                table.insert(map(&record))?;
            }
        }
        Ok(table)
    }

    /// Deletes the table's backing files and its root directory.
    ///
    /// Only valid for persisted tables; temporary tables return
    /// [`StrataError::NotPersistent`]. The table is consumed either way.
    pub fn remove(mut self) -> Result<()> {
        let root = match self.root_path.take() {
            Some(root) => root,
            None => return Err(StrataError::NotPersistent),
        };

        self.buffer.clear();
        self.rows.remove()?;
        if let Some(heap) = self.heap.take() {
            heap.remove()?;
        }

        let indexes = root.join("indexes");
        if indexes.is_dir() {
            std::fs::remove_dir(&indexes)?;
        }
        std::fs::remove_dir(&root)?;

        tracing::debug!(path = %root.display(), "removed table");
        Ok(())
    }

    /// Explicitly closes the table, surfacing disposal errors that
    /// `Drop` could only log.
    pub fn close(mut self) -> Result<()> {
        self.dispose()
    }

    /// Flushes (persisted) or discards (temporary) buffered content.
    fn dispose(&mut self) -> Result<()> {
        if self.temp {
            self.buffer.clear();
            self.rows.clear()
        } else {
            self.flush_write_buffer()
        }
    }
}

impl<R: Record> Drop for DiskTable<R> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            tracing::error!(error = %e, "table disposal failed");
        }
    }
}

impl<R: Record> RecordSource<R> for DiskTable<R> {
    fn scan_records(&self) -> impl Iterator<Item = Result<R>> + '_ {
        self.scan()
    }

    fn record_count(&self) -> Result<usize> {
        self.size()
    }
}
