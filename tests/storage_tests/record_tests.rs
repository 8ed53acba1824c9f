//! Tests for the record codec
//!
//! These tests verify:
//! - Encode/decode of regular, empty and binary keys and values
//! - Offsets and end-of-stream detection
//! - Checksum mismatch → CorruptedData carrying the key
//! - Torn records → MalformedRecord

use std::io::{Cursor, Seek, SeekFrom};

use lsmkv::storage::record::{self, CHECKSUM_SIZE};
use lsmkv::LsmError;

// =============================================================================
// Helper Functions
// =============================================================================

fn decode_one(bytes: Vec<u8>) -> lsmkv::Result<Option<record::Record>> {
    let mut cursor = Cursor::new(bytes);
    record::decode(&mut cursor)
}

/// Byte range of the value inside an encoded record
fn value_range(key: &[u8], value: &[u8]) -> std::ops::Range<usize> {
    let start = 8 + key.len() + CHECKSUM_SIZE + 8;
    start..start + value.len()
}

// =============================================================================
// Encode/Decode Tests
// =============================================================================

#[test]
fn test_decode_returns_what_was_encoded() {
    let cases: [(&[u8], &[u8]); 4] = [
        (b"key", b"value"),
        (b"key", b""),
        (b"", b"value"),
        (b"\x00\xff\x10", b"\xde\xad\xbe\xef"),
    ];

    for (key, value) in cases {
        let decoded = decode_one(record::encode(key, value)).unwrap().unwrap();
        assert_eq!(decoded.key, key);
        assert_eq!(decoded.value, value);
        assert_eq!(decoded.offset, 0);
        assert_eq!(decoded.checksum, record::checksum(value));
    }
}

#[test]
fn test_decode_large_value() {
    let value = vec![7u8; 1024 * 1024];
    let decoded = decode_one(record::encode(b"big", &value)).unwrap().unwrap();

    assert_eq!(decoded.value.len(), value.len());
    assert_eq!(decoded.encoded_len(), record::encoded_len(b"big", &value));
}

#[test]
fn test_decode_sequential_records_tracks_offsets() {
    let mut log = Vec::new();
    record::write_record(&mut log, b"a", b"1").unwrap();
    record::write_record(&mut log, b"bb", b"22").unwrap();
    let second_offset = record::encoded_len(b"a", b"1");

    let mut cursor = Cursor::new(log);
    let first = record::decode(&mut cursor).unwrap().unwrap();
    let second = record::decode(&mut cursor).unwrap().unwrap();

    assert_eq!(first.offset, 0);
    assert_eq!(second.offset, second_offset);
    assert_eq!(second.key, b"bb");
    assert!(record::decode(&mut cursor).unwrap().is_none());
}

#[test]
fn test_decode_empty_stream_is_end() {
    assert!(decode_one(Vec::new()).unwrap().is_none());
}

#[test]
fn test_decode_at_end_of_stream_is_end() {
    let mut cursor = Cursor::new(record::encode(b"k", b"v"));
    cursor.seek(SeekFrom::End(0)).unwrap();

    assert!(record::decode(&mut cursor).unwrap().is_none());
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_any_flipped_value_bit_is_detected() {
    let key = b"key";
    let value = b"some value bytes";
    let encoded = record::encode(key, value);

    for pos in value_range(key, value) {
        for bit in 0..8 {
            let mut corrupted = encoded.clone();
            corrupted[pos] ^= 1 << bit;

            match decode_one(corrupted) {
                Err(LsmError::CorruptedData { key: k }) => assert_eq!(k, key),
                other => panic!("byte {} bit {}: expected CorruptedData, got {:?}", pos, bit, other),
            }
        }
    }
}

#[test]
fn test_flipped_checksum_is_detected() {
    let mut encoded = record::encode(b"key", b"value");
    encoded[8 + 3] ^= 0x01;

    assert!(matches!(
        decode_one(encoded),
        Err(LsmError::CorruptedData { .. })
    ));
}

#[test]
fn test_corrupted_data_error_names_key() {
    let err = LsmError::CorruptedData { key: b"user:42".to_vec() };
    assert!(err.to_string().contains("user:42"));
}

// =============================================================================
// Torn Record Tests
// =============================================================================

#[test]
fn test_truncated_record_is_malformed() {
    let encoded = record::encode(b"key", b"value");

    // Every proper prefix except the empty one is a torn record
    for len in 1..encoded.len() {
        let torn = encoded[..len].to_vec();
        match decode_one(torn) {
            Err(LsmError::MalformedRecord { offset, .. }) => assert_eq!(offset, 0),
            other => panic!("prefix {}: expected MalformedRecord, got {:?}", len, other),
        }
    }
}

#[test]
fn test_negative_value_length_is_malformed() {
    let key = b"k";
    let mut encoded = record::encode(key, b"v");
    let len_pos = 8 + key.len() + CHECKSUM_SIZE;
    encoded[len_pos..len_pos + 8].copy_from_slice(&(-5i64).to_le_bytes());

    assert!(matches!(
        decode_one(encoded),
        Err(LsmError::MalformedRecord { .. })
    ));
}

#[test]
fn test_huge_length_on_short_stream_is_malformed() {
    let mut encoded = record::encode(b"k", b"v");
    encoded[0..8].copy_from_slice(&i64::MAX.to_le_bytes());

    assert!(matches!(
        decode_one(encoded),
        Err(LsmError::MalformedRecord { .. })
    ));
}
