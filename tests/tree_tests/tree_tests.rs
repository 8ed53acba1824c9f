//! Tests for Tree lifecycle and point operations
//!
//! These tests verify:
//! - Open lays out one directory per level
//! - Put/get and missing keys
//! - Persistence across close/reopen
//! - Config validation
//! - Corruption surfaces through get

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};

use lsmkv::{Config, LsmError, Tree};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_tree(threshold: u64) -> (TempDir, Tree) {
    let temp_dir = TempDir::new().unwrap();
    let tree = Tree::open_path(threshold, temp_dir.path()).unwrap();
    (temp_dir, tree)
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_level_directories() {
    let (temp_dir, tree) = setup_tree(10);

    for n in 0..3 {
        assert!(temp_dir.path().join(n.to_string()).join("data").exists());
    }
    assert_eq!(tree.levels().len(), 3);
    assert!(tree.is_empty());
    assert_eq!(tree.data_dir(), temp_dir.path());
}

#[test]
fn test_open_creates_missing_parent_directory() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("nested").join("db");

    let tree = Tree::open_path(10, &nested).unwrap();

    assert!(nested.join("0").join("data").exists());
    tree.close().unwrap();
}

#[test]
fn test_open_rejects_invalid_config() {
    let temp_dir = TempDir::new().unwrap();

    let zero = Tree::open_path(0, temp_dir.path());
    assert!(matches!(zero, Err(LsmError::Config(_))));

    let config = Config::builder()
        .data_dir(temp_dir.path())
        .level_count(1)
        .build();
    assert!(matches!(Tree::open(config), Err(LsmError::Config(_))));
}

#[test]
fn test_open_rejects_fewer_levels_than_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut tree = Tree::open_path(2, temp_dir.path()).unwrap();
        for i in 0..25u8 {
            tree.put(&[b'a', i], b"v").unwrap();
        }
        assert_eq!(tree.level(2).unwrap().size(), 20);
        tree.close().unwrap();
    }

    let config = Config::builder()
        .data_dir(temp_dir.path())
        .threshold(2)
        .level_count(2)
        .build();
    assert!(matches!(Tree::open(config), Err(LsmError::Config(_))));

    // The full tree is still readable
    let mut tree = Tree::open_path(2, temp_dir.path()).unwrap();
    assert_eq!(tree.get(&[b'a', 0]).unwrap(), b"v");
}

#[test]
fn test_open_ignores_empty_extra_levels() {
    let temp_dir = TempDir::new().unwrap();
    {
        let config = Config::builder()
            .data_dir(temp_dir.path())
            .level_count(4)
            .build();
        let mut tree = Tree::open(config).unwrap();
        tree.put(b"k", b"v").unwrap();
        tree.close().unwrap();
    }

    // Level 3 exists but is empty; unrelated entries are skipped
    std::fs::create_dir_all(temp_dir.path().join("notes")).unwrap();
    let mut tree = Tree::open_path(10, temp_dir.path()).unwrap();
    assert_eq!(tree.levels().len(), 3);
    assert_eq!(tree.get(b"k").unwrap(), b"v");
}

// =============================================================================
// Put/Get Tests
// =============================================================================

#[test]
fn test_put_and_get() {
    let (_temp, mut tree) = setup_tree(10);

    tree.put(b"FOO", b"foo").unwrap();
    tree.put(b"BAR", b"bar").unwrap();

    assert_eq!(tree.get(b"FOO").unwrap(), b"foo");
    assert_eq!(tree.get(b"BAR").unwrap(), b"bar");
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_get_missing_key() {
    let (_temp, mut tree) = setup_tree(10);
    tree.put(b"present", b"yes").unwrap();

    let err = tree.get(b"absent").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_empty_key_and_value() {
    let (_temp, mut tree) = setup_tree(10);

    tree.put(b"", b"empty key").unwrap();
    tree.put(b"empty value", b"").unwrap();

    assert_eq!(tree.get(b"").unwrap(), b"empty key");
    assert_eq!(tree.get(b"empty value").unwrap(), b"");
}

#[test]
fn test_binary_keys_and_values() {
    let (_temp, mut tree) = setup_tree(2);
    let key = [0u8, 255, 10, 13];
    let value = [0xde, 0xad, 0xbe, 0xef, 0x00];

    tree.put(&key, &value).unwrap();
    tree.put(b"push", b"down").unwrap();

    assert_eq!(tree.get(&key).unwrap(), value);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut tree = Tree::open_path(3, temp_dir.path()).unwrap();
        for i in 0..20u32 {
            tree.put(format!("key{:02}", i).as_bytes(), format!("value{}", i).as_bytes())
                .unwrap();
        }
        tree.put(b"key05", b"rewritten").unwrap();
        tree.close().unwrap();
    }

    let mut tree = Tree::open_path(3, temp_dir.path()).unwrap();
    for i in 0..20u32 {
        let expected = if i == 5 {
            "rewritten".to_string()
        } else {
            format!("value{}", i)
        };
        assert_eq!(
            tree.get(format!("key{:02}", i).as_bytes()).unwrap(),
            expected.as_bytes()
        );
    }
    assert_eq!(tree.level(1).unwrap().size() + tree.level(0).unwrap().size(), tree.len());
}

#[test]
fn test_level_sizes_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let sizes_before: Vec<u64> = {
        let mut tree = Tree::open_path(2, temp_dir.path()).unwrap();
        for i in 0..25u8 {
            tree.put(&[b'a' + i], b"v").unwrap();
        }
        let sizes = tree.levels().iter().map(|l| l.size()).collect();
        tree.close().unwrap();
        sizes
    };

    let tree = Tree::open_path(2, temp_dir.path()).unwrap();
    let sizes_after: Vec<u64> = tree.levels().iter().map(|l| l.size()).collect();

    assert_eq!(sizes_before, vec![1, 4, 20]);
    assert_eq!(sizes_after, sizes_before);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_get_reports_corruption() {
    let (temp_dir, mut tree) = setup_tree(10);
    tree.put(b"key", b"value").unwrap();

    let mut file = OpenOptions::new()
        .write(true)
        .open(temp_dir.path().join("0").join("data"))
        .unwrap();
    file.seek(SeekFrom::End(-1)).unwrap();
    file.write_all(b"!").unwrap();
    file.sync_all().unwrap();

    match tree.get(b"key") {
        Err(LsmError::CorruptedData { key }) => assert_eq!(key, b"key"),
        other => panic!("expected CorruptedData, got {:?}", other),
    }
}

#[test]
fn test_reopen_reports_corruption() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut tree = Tree::open_path(10, temp_dir.path()).unwrap();
        tree.put(b"key", b"value").unwrap();
        tree.close().unwrap();
    }

    let mut file = OpenOptions::new()
        .write(true)
        .open(temp_dir.path().join("0").join("data"))
        .unwrap();
    file.seek(SeekFrom::End(-1)).unwrap();
    file.write_all(b"!").unwrap();
    file.sync_all().unwrap();

    assert!(matches!(
        Tree::open_path(10, temp_dir.path()),
        Err(LsmError::CorruptedData { .. })
    ));
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_empty_tree() {
    let (_temp, tree) = setup_tree(10);

    assert!(tree.close().is_ok());
}

#[test]
fn test_sync_writes_tree_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .threshold(2)
        .sync_writes(true)
        .build();

    let mut tree = Tree::open(config.clone()).unwrap();
    for i in 0..5u8 {
        tree.put(&[b'k', i], &[i]).unwrap();
    }
    tree.close().unwrap();

    let mut tree = Tree::open(config).unwrap();
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.get(&[b'k', 4]).unwrap(), vec![4u8]);
}
