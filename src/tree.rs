//! Tree Module
//!
//! The multi-level LSM tree that coordinates every level.
//!
//! ## Responsibilities
//! - Route writes to level 0 and cascade compactions down the levels
//! - Resolve point lookups youngest → oldest (younger levels shadow older)
//! - Stream scans across levels
//! - Open/close every level's segment
//!
//! ## Level Capacities
//! ```text
//! L0  threshold
//! L1  threshold × growth_factor
//! L2  threshold × growth_factor²
//! ...
//! ```
//! After every put, each pair `(Li, Li+1)` is checked in ascending order; a
//! full `Li` is merged into `Li+1` and emptied.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::Config;
use crate::error::{LsmError, Result};
use crate::storage::Segment;

/// The LSM tree
///
/// ## Ownership Model: Single Owner
///
/// Every operation that touches a log takes `&mut self`: reads move the
/// shared file cursor too. Callers that need to share a tree across threads
/// put it behind one mutex (see the HTTP facade).
#[derive(Debug)]
pub struct Tree {
    /// Tree configuration
    config: Config,

    /// Levels, youngest (L0) first
    levels: Vec<Segment>,
}

impl Tree {
    /// Open or create a tree with the given config
    ///
    /// On startup:
    /// 1. Validate config
    /// 2. Create the data directory
    /// 3. Refuse to open if a level beyond `level_count` still holds records
    /// 4. Open `{data_dir}/{n}/data` for every level, replaying each log
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;
        Self::check_no_orphan_levels(&config)?;

        let mut levels = Vec::with_capacity(config.level_count);
        for n in 0..config.level_count {
            let dir = config.data_dir.join(n.to_string());
            let segment = Segment::open(&dir)?.with_sync_writes(config.sync_writes);
            levels.push(segment);
        }

        let sizes: Vec<u64> = levels.iter().map(Segment::size).collect();
        tracing::info!(
            data_dir = %config.data_dir.display(),
            levels = config.level_count,
            ?sizes,
            "Tree opened"
        );

        Ok(Self { config, levels })
    }

    /// Open with a threshold and directory (convenience method)
    ///
    /// Uses default config for everything else
    pub fn open_path(threshold: u64, path: &Path) -> Result<Self> {
        let config = Config::builder()
            .data_dir(path)
            .threshold(threshold)
            .build();
        Self::open(config)
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Append to level 0
    /// 2. For each adjacent pair, merge a full level into the next
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.levels[0].put(key, value)?;
        tracing::trace!(key_len = key.len(), value_len = value.len(), "put");

        for n in 0..self.levels.len() - 1 {
            if self.levels[n].size() >= self.level_capacity(n) {
                self.compact(n)?;
            }
        }

        Ok(())
    }

    /// Get a value by key
    ///
    /// Search order: L0, L1, ... first hit wins.
    pub fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        for level in self.levels.iter_mut() {
            match level.get(key) {
                Ok(value) => return Ok(value),
                Err(LsmError::KeyNotFound) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(LsmError::KeyNotFound)
    }

    /// Scan from `from` in write order
    ///
    /// `from` is looked up oldest level first. The level that holds it emits
    /// `from` and every record written after it in that level; each younger
    /// level is then emitted in full, oldest to youngest.
    pub fn scan<F>(&mut self, from: &[u8], mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]),
    {
        for n in (0..self.levels.len()).rev() {
            match self.levels[n].scan(from, &mut f) {
                Ok(()) => {
                    for younger in self.levels[..n].iter_mut().rev() {
                        younger.scan_all(&mut f)?;
                    }
                    return Ok(());
                }
                Err(LsmError::KeyNotFound) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(LsmError::KeyNotFound)
    }

    /// Emit every record of every level, oldest level first
    pub fn scan_all<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]),
    {
        for level in self.levels.iter_mut().rev() {
            level.scan_all(&mut f)?;
        }
        Ok(())
    }

    /// Sorted scan of every key `>= from`, each key once with its newest value
    ///
    /// Unlike [`Tree::scan`], `from` need not exist.
    pub fn scan_range<F>(&mut self, from: &[u8], mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]),
    {
        // key → youngest level holding it; younger levels overwrite older ones
        let mut owners: BTreeMap<Vec<u8>, usize> = BTreeMap::new();
        for (n, level) in self.levels.iter().enumerate().rev() {
            for (key, _) in level.table().index().walk_from(from) {
                owners.insert(key.to_vec(), n);
            }
        }

        for (key, n) in owners {
            let value = self.levels[n].get(&key)?;
            f(&key, &value);
        }
        Ok(())
    }

    /// Close every level, oldest last
    ///
    /// A failure does not stop the remaining levels from closing; the first
    /// one is returned.
    pub fn close(self) -> Result<()> {
        let mut first_err = None;
        for (n, level) in self.levels.into_iter().enumerate() {
            if let Err(e) = level.close() {
                tracing::warn!(level = n, error = %e, "Failed to close level");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Render every record as `key | value` lines in scan_all order
    pub fn dump(&mut self) -> Result<String> {
        let mut lines = Vec::new();
        self.scan_all(|key, value| {
            lines.push(format!(
                "{} | {}",
                String::from_utf8_lossy(key),
                String::from_utf8_lossy(value)
            ));
        })?;
        Ok(lines.join("\n"))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Capacity of level `n`: `threshold × growth_factor^n`
    pub fn level_capacity(&self, n: usize) -> u64 {
        let exp = u32::try_from(n).unwrap_or(u32::MAX);
        self.config
            .threshold
            .saturating_mul(self.config.growth_factor.saturating_pow(exp))
    }

    /// All levels, youngest first
    pub fn levels(&self) -> &[Segment] {
        &self.levels
    }

    pub fn level(&self, n: usize) -> Option<&Segment> {
        self.levels.get(n)
    }

    /// Sum of per-level key counts
    pub fn len(&self) -> u64 {
        self.levels.iter().map(Segment::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Fail if `{data_dir}/{n}/data` is non-empty for some `n >= level_count`
    ///
    /// Those records would be unreachable by every read and never compacted.
    fn check_no_orphan_levels(config: &Config) -> Result<()> {
        for entry in fs::read_dir(&config.data_dir)? {
            let entry = entry?;
            let rank = match entry.file_name().to_str().and_then(|n| n.parse::<usize>().ok()) {
                Some(rank) if rank >= config.level_count => rank,
                _ => continue,
            };

            let data = entry.path().join(Segment::DATA_FILENAME);
            let len = match fs::metadata(&data) {
                Ok(meta) => meta.len(),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if len > 0 {
                return Err(LsmError::Config(format!(
                    "level {} holds {} bytes at {} but only {} levels are configured",
                    rank,
                    len,
                    data.display(),
                    config.level_count
                )));
            }
        }
        Ok(())
    }

    /// Merge level `n` into level `n + 1`, leaving level `n` empty
    fn compact(&mut self, n: usize) -> Result<()> {
        let (younger, older) = self.levels.split_at_mut(n + 1);
        let source = &mut younger[n];
        let target = &mut older[0];

        let moved = source.size();
        target.merge(source)?;

        tracing::debug!(
            from = n,
            to = n + 1,
            moved,
            target_size = target.size(),
            "Compacted level"
        );
        Ok(())
    }
}
