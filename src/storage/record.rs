//! Record Codec
//!
//! Encodes and decodes single log records.
//!
//! ## Wire Format (little-endian, no framing beyond the length fields)
//! ```text
//! ┌──────────────┬───────────┬───────────────┬────────────────┬─────────────┐
//! │ KeyLen (i64) │ Key (var) │ Checksum (16) │ ValueLen (i64) │ Value (var) │
//! └──────────────┴───────────┴───────────────┴────────────────┴─────────────┘
//! ```
//!
//! The checksum is the XXH3-128 digest of the value bytes.

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

use xxhash_rust::xxh3::xxh3_128;

use crate::error::{LsmError, Result};

/// Size of the stored value digest
pub const CHECKSUM_SIZE: usize = 16;

/// Size of each length field
const LEN_SIZE: usize = 8;

/// A decoded log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub checksum: [u8; CHECKSUM_SIZE],
    /// Byte position where the record starts in its log
    pub offset: u64,
}

impl Record {
    /// Bytes this record occupies on disk
    pub fn encoded_len(&self) -> u64 {
        encoded_len(&self.key, &self.value)
    }
}

/// Digest of a value as stored in the record
pub fn checksum(value: &[u8]) -> [u8; CHECKSUM_SIZE] {
    xxh3_128(value).to_le_bytes()
}

/// Bytes a `(key, value)` record occupies on disk
pub fn encoded_len(key: &[u8], value: &[u8]) -> u64 {
    (2 * LEN_SIZE + CHECKSUM_SIZE + key.len() + value.len()) as u64
}

/// Encode a record into a fresh buffer
pub fn encode(key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(key, value) as usize);
    buf.extend_from_slice(&(key.len() as i64).to_le_bytes());
    buf.extend_from_slice(key);
    buf.extend_from_slice(&checksum(value));
    buf.extend_from_slice(&(value.len() as i64).to_le_bytes());
    buf.extend_from_slice(value);
    buf
}

/// Encode a record and write it in a single `write_all`
pub fn write_record<W: Write>(writer: &mut W, key: &[u8], value: &[u8]) -> Result<()> {
    writer.write_all(&encode(key, value))?;
    Ok(())
}

/// Decode the record at the stream's current position
///
/// Returns:
/// - `Ok(Some(record))`: a record whose checksum verified
/// - `Ok(None)`: end of stream before the first byte of a record
/// - `Err(CorruptedData)`: checksum mismatch, carries the key
/// - `Err(MalformedRecord)`: bad length field or stream ends mid-record
pub fn decode<R: Read + Seek>(reader: &mut R) -> Result<Option<Record>> {
    let offset = reader.seek(SeekFrom::Current(0))?;

    let key_len = match read_first_len(reader, offset)? {
        Some(len) => len,
        None => return Ok(None),
    };
    let key = read_exact_vec(reader, key_len, offset, "key")?;

    let mut stored = [0u8; CHECKSUM_SIZE];
    read_exact_or_torn(reader, &mut stored, offset, "checksum")?;

    let mut len_buf = [0u8; LEN_SIZE];
    read_exact_or_torn(reader, &mut len_buf, offset, "value length")?;
    let value_len = checked_len(i64::from_le_bytes(len_buf), offset, "value")?;
    let value = read_exact_vec(reader, value_len, offset, "value")?;

    if checksum(&value) != stored {
        return Err(LsmError::CorruptedData { key });
    }

    Ok(Some(Record {
        key,
        value,
        checksum: stored,
        offset,
    }))
}

/// Read the key length, distinguishing a clean end of stream from a torn header
fn read_first_len<R: Read>(reader: &mut R, offset: u64) -> Result<Option<u64>> {
    let mut buf = [0u8; LEN_SIZE];
    let mut filled = 0;
    while filled < LEN_SIZE {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Ok(None),
        LEN_SIZE => checked_len(i64::from_le_bytes(buf), offset, "key").map(Some),
        _ => Err(torn(offset, "key length")),
    }
}

fn checked_len(raw: i64, offset: u64, field: &str) -> Result<u64> {
    u64::try_from(raw).map_err(|_| LsmError::MalformedRecord {
        offset,
        reason: format!("negative {} length {}", field, raw),
    })
}

fn read_exact_or_torn<R: Read>(reader: &mut R, buf: &mut [u8], offset: u64, field: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => torn(offset, field),
        _ => LsmError::Io(e),
    })
}

/// Read `len` bytes without trusting `len` for the allocation up front
fn read_exact_vec<R: Read>(reader: &mut R, len: u64, offset: u64, field: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    Read::take(&mut *reader, len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(torn(offset, field));
    }
    Ok(buf)
}

fn torn(offset: u64, field: &str) -> LsmError {
    LsmError::MalformedRecord {
        offset,
        reason: format!("stream ended inside {}", field),
    }
}
