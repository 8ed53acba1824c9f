//! Table
//!
//! An append-only record log paired with an in-memory ordered index over it.
//! The log can be anything seekable: a level file in production, a
//! `Cursor<Vec<u8>>` in tests.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use crate::error::{LsmError, Result};

use super::index::OrderedIndex;
use super::record;

/// Byte stream a table can keep its log in
///
/// Beyond read/write/seek the log must be able to shrink, so a failed append
/// can be cut back off.
pub trait LogStorage: Read + Write + Seek {
    /// Truncate or extend the log to exactly `len` bytes
    fn set_len(&mut self, len: u64) -> io::Result<()>;
}

impl LogStorage for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }
}

impl LogStorage for Cursor<Vec<u8>> {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length exceeds memory"))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

/// Append-only log + key → offset index
#[derive(Debug)]
pub struct Table<S> {
    /// Record log, only ever appended to
    log: S,
    /// key → offset of the latest record for that key in `log`
    index: OrderedIndex,
}

impl<S: LogStorage> Table<S> {
    /// Wrap a log with an empty index (the log is not read)
    pub fn new(log: S) -> Self {
        Self {
            log,
            index: OrderedIndex::new(),
        }
    }

    /// Wrap a log and rebuild the index by replaying it
    pub fn open(log: S) -> Result<Self> {
        let mut table = Self::new(log);
        table.load()?;
        Ok(table)
    }

    /// Replay the log from the start, indexing every record
    ///
    /// The last physical record for a key wins.
    pub fn load(&mut self) -> Result<()> {
        self.log.seek(SeekFrom::Start(0))?;
        while let Some(entry) = record::decode(&mut self.log)? {
            self.index.insert(&entry.key, entry.offset);
        }
        Ok(())
    }

    /// Append a record and point the index at it
    ///
    /// A write that fails partway is cut back to the previous end of the log,
    /// so a torn record never sits in front of later appends.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let offset = self.log.seek(SeekFrom::End(0))?;
        if let Err(e) = record::write_record(&mut self.log, key, value) {
            if let Err(rollback) = self.log.set_len(offset) {
                tracing::error!(offset, error = %rollback, "Failed to cut back torn append");
            }
            return Err(e);
        }
        self.index.insert(key, offset);
        Ok(())
    }

    /// Read the latest value for `key`
    ///
    /// Returns `Err(KeyNotFound)` when the index has no entry for the key.
    pub fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        let offset = self.index.search(key).ok_or(LsmError::KeyNotFound)?;
        self.read_at(offset).map(|entry| entry.value)
    }

    /// Emit `from`, then every record that physically follows it in the log
    ///
    /// Continuation is in write order, not key order.
    pub fn scan<F>(&mut self, from: &[u8], mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]),
    {
        let value = self.get(from)?;
        f(from, &value);
        self.drain_from_cursor(f)
    }

    /// Emit every record in the log, superseded ones included
    pub fn scan_all<F>(&mut self, f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]),
    {
        self.log.seek(SeekFrom::Start(0))?;
        self.drain_from_cursor(f)
    }

    /// Absorb `newer`: copy its log onto the end of ours and re-point its keys
    ///
    /// `newer` is left untouched; clearing it is up to the caller.
    pub fn merge<T: LogStorage>(&mut self, newer: &mut Table<T>) -> Result<()> {
        let base = self.log.seek(SeekFrom::End(0))?;
        newer.log.seek(SeekFrom::Start(0))?;
        io::copy(&mut newer.log, &mut self.log)?;

        for (key, offset) in newer.index.walk() {
            self.index.insert(key, base + offset);
        }
        Ok(())
    }

    /// Size of the log in bytes
    pub fn len_bytes(&mut self) -> Result<u64> {
        Ok(self.log.seek(SeekFrom::End(0))?)
    }

    fn read_at(&mut self, offset: u64) -> Result<record::Record> {
        self.log.seek(SeekFrom::Start(offset))?;
        record::decode(&mut self.log)?.ok_or_else(|| LsmError::MalformedRecord {
            offset,
            reason: "index points past end of log".to_string(),
        })
    }

    fn drain_from_cursor<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]),
    {
        while let Some(entry) = record::decode(&mut self.log)? {
            f(&entry.key, &entry.value);
        }
        Ok(())
    }
}

impl<S> Table<S> {
    /// Number of distinct keys reachable through the index
    pub fn size(&self) -> u64 {
        self.index.len() as u64
    }

    /// Indexed keys in ascending order
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.index.keys()
    }

    /// Visit `(key, offset)` pairs in ascending key order
    pub fn walk<F>(&self, mut f: F)
    where
        F: FnMut(&[u8], u64),
    {
        for (key, offset) in self.index.walk() {
            f(key, offset);
        }
    }

    pub fn index(&self) -> &OrderedIndex {
        &self.index
    }

    pub(crate) fn log_mut(&mut self) -> &mut S {
        &mut self.log
    }

    /// Forget every indexed key, leaving the log alone
    pub(crate) fn reset_index(&mut self) {
        self.index.clear();
    }

    pub fn into_inner(self) -> S {
        self.log
    }
}
