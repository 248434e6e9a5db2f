//! Raw positioned-read / append-only file primitive.

use rand::Rng;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use strata_common::Result;

/// Length of the random suffix in temporary file names.
const TEMP_SUFFIX_LEN: usize = 6;

/// An open data file with positioned reads and end-of-file appends.
///
/// Each instance owns its handle and remembers its own path, so
/// diagnostics and existence checks never consult shared state.
#[derive(Debug)]
pub struct DataFile {
    /// The open file handle.
    file: File,
    /// Path the file was opened under.
    path: PathBuf,
}

impl DataFile {
    /// Opens a file in read/write mode, creating it if it does not exist.
    pub fn open_rw(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        tracing::debug!(path = %path.display(), "opened data file");
        Ok(Self { file, path })
    }

    /// Creates a read/write file with a randomized alphanumeric suffix
    /// inside `dir`.
    pub fn create_temp(dir: &Path) -> Result<Self> {
        let suffix: String = rand::rng()
            .sample_iter(rand::distr::Alphanumeric)
            .take(TEMP_SUFFIX_LEN)
            .map(char::from)
            .collect();

        Self::open_rw(dir.join(format!("strata-{suffix}")))
    }

    /// Returns the path this file was opened under.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the file still exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Returns the size of the file in bytes.
    pub fn size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Reads into `buf` starting at `offset`.
    ///
    /// Returns the number of bytes actually read; a count smaller than
    /// `buf.len()` (including zero) signals end of data, not an error.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            let n = self.file.read_at(&mut buf[total..], offset + total as u64)?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    /// Appends bytes at the current end of the file.
    pub fn append(&self, data: &[u8]) -> Result<()> {
        let end = self.size()?;
        self.file.write_all_at(data, end)?;
        Ok(())
    }

    /// Truncates the file to zero length.
    pub fn clear(&self) -> Result<()> {
        self.file.set_len(0)?;
        Ok(())
    }

    /// Unlinks the file from disk. The handle stays open until drop.
    pub fn remove(&self) -> Result<()> {
        std::fs::remove_file(&self.path)?;
        tracing::debug!(path = %self.path.display(), "removed data file");
        Ok(())
    }
}
