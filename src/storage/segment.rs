//! Segment
//!
//! A Table bound to the level file it exclusively owns.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::table::Table;

/// One level's log file plus its in-memory index
#[derive(Debug)]
pub struct Segment {
    /// Table over the level file
    table: Table<File>,
    /// Path of the `data` file
    path: PathBuf,
    /// fsync after every put and merge
    sync_writes: bool,
}

impl Segment {
    /// Name of the log file inside a level directory
    pub const DATA_FILENAME: &'static str = "data";

    /// Open or create the segment stored in `dir`
    ///
    /// On open:
    /// 1. Create the directory if it doesn't exist
    /// 2. Open/create `{dir}/data` for read + write
    /// 3. Replay the log to rebuild the index
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::DATA_FILENAME);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let table = Table::open(file)?;

        Ok(Self {
            table,
            path,
            sync_writes: false,
        })
    }

    /// Toggle fsync after writes
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Absorb `newer` into this segment, then wipe `newer`
    ///
    /// After this call `newer`'s file is zero bytes long and its index is empty;
    /// its records live on at shifted offsets inside `self`.
    pub fn merge(&mut self, newer: &mut Segment) -> Result<()> {
        self.table.merge(&mut newer.table)?;
        if self.sync_writes {
            self.table.log_mut().sync_data()?;
        }
        newer.truncate()
    }

    /// Release the file handle after syncing it
    pub fn close(self) -> Result<()> {
        let file = self.table.into_inner();
        file.sync_all()?;
        Ok(())
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.table.put(key, value)?;
        if self.sync_writes {
            self.table.log_mut().sync_data()?;
        }
        Ok(())
    }

    pub fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        self.table.get(key)
    }

    pub fn scan<F>(&mut self, from: &[u8], f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]),
    {
        self.table.scan(from, f)
    }

    pub fn scan_all<F>(&mut self, f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]),
    {
        self.table.scan_all(f)
    }

    pub fn walk<F>(&self, f: F)
    where
        F: FnMut(&[u8], u64),
    {
        self.table.walk(f)
    }

    /// Distinct keys in this level
    pub fn size(&self) -> u64 {
        self.table.size()
    }

    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.table.keys()
    }

    pub fn table(&self) -> &Table<File> {
        &self.table
    }

    /// Path of the backing `data` file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the backing file in bytes
    pub fn file_len(&mut self) -> Result<u64> {
        self.table.len_bytes()
    }

    /// Empty the file and start over with a fresh index
    fn truncate(&mut self) -> Result<()> {
        let file = self.table.log_mut();
        file.seek(SeekFrom::Start(0))?;
        file.set_len(0)?;
        if self.sync_writes {
            file.sync_data()?;
        }
        self.table.reset_index();
        Ok(())
    }
}
