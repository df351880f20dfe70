use super::*;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    city: String,
    name: String,
}

fn create_test_storage() -> (Storage, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = StorageConfig::new(dir.path(), "test");
    let storage = Storage::new(config).expect("Failed to open storage");
    (storage, dir)
}

fn sample_users() -> Vec<User> {
    vec![
        User {
            city: "Oslo".to_string(),
            name: "A".to_string(),
        },
        User {
            city: "Berlin".to_string(),
            name: "B".to_string(),
        },
    ]
}

fn solid_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255])))
}

#[test]
fn test_new_creates_folder() {
    let (storage, dir) = create_test_storage();

    assert!(storage.folder_path().is_dir());
    assert_eq!(storage.folder_path(), dir.path().join("test"));
}

#[test]
fn test_new_rejects_bad_config() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = StorageConfig::new(dir.path(), "");

    let result = Storage::new(config);
    assert!(matches!(result, Err(StorageError::Config(_))));
}

#[test]
fn test_save_and_load_hot() {
    let (storage, _dir) = create_test_storage();
    let users = sample_users();

    storage.save("users", &users).expect("Failed to save");

    let loaded: Vec<User> = storage.load("users").expect("Failed to load");
    assert_eq!(loaded, users);
}

#[test]
fn test_save_and_load_cold() {
    let (storage, _dir) = create_test_storage();
    let users = sample_users();

    storage.save("users", &users).expect("Failed to save");
    storage.clear_memory_cache();

    let loaded: Vec<User> = storage.load("users").expect("Failed to load");
    assert_eq!(loaded, users);
}

#[test]
fn test_memory_hit_skips_disk_entirely() {
    let (storage, _dir) = create_test_storage();

    storage.save("number", &7_i64).expect("Failed to save");

    // Pull the rug out from under the disk tier: a hot load must still
    // answer from memory without re-validating against the filesystem.
    fs::remove_dir_all(storage.folder_path()).expect("Failed to drop folder");

    let loaded: i64 = storage.load("number").expect("Hot load should succeed");
    assert_eq!(loaded, 7);

    storage.clear_memory_cache();
    let result: StorageResult<i64> = storage.load("number");
    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}

#[test]
fn test_load_populates_memory() {
    let (storage, _dir) = create_test_storage();

    storage.save("number", &7_i64).expect("Failed to save");
    storage.clear_memory_cache();

    let _: i64 = storage.load("number").expect("Failed to load");

    // The cold load repopulated the memory tier.
    fs::remove_dir_all(storage.folder_path()).expect("Failed to drop folder");
    let loaded: i64 = storage.load("number").expect("Should hit memory");
    assert_eq!(loaded, 7);
}

#[test]
fn test_load_missing_key() {
    let (storage, _dir) = create_test_storage();

    let result: StorageResult<i64> = storage.load("missing");
    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}

#[test]
fn test_save_overwrites() {
    let (storage, _dir) = create_test_storage();

    storage.save("key", &1_i64).expect("Failed to save");
    storage.save("key", &2_i64).expect("Failed to overwrite");

    let loaded: i64 = storage.load("key").expect("Failed to load");
    assert_eq!(loaded, 2);

    storage.clear_memory_cache();
    let loaded: i64 = storage.load("key").expect("Failed to load");
    assert_eq!(loaded, 2);

    assert_eq!(storage.files().expect("Failed to list").len(), 1);
}

#[test]
fn test_save_with_bincode_override() {
    let (storage, _dir) = create_test_storage();
    let users = sample_users();

    storage
        .save_with("users", &users, StructuredFormat::Bincode)
        .expect("Failed to save");
    storage.clear_memory_cache();

    // The envelope records the format; load needs no hint.
    let loaded: Vec<User> = storage.load("users").expect("Failed to load");
    assert_eq!(loaded, users);
}

#[test]
fn test_raw_roundtrip() {
    let (storage, _dir) = create_test_storage();
    let blob = vec![0_u8, 1, 2, 255];

    storage.save_raw("blob", &blob).expect("Failed to save");

    assert_eq!(storage.load_raw("blob").expect("Failed to load"), blob);

    storage.clear_memory_cache();
    assert_eq!(storage.load_raw("blob").expect("Failed to load"), blob);
}

#[test]
fn test_image_roundtrip_preserves_dimensions() {
    let (storage, _dir) = create_test_storage();
    let img = solid_image(100, 50);

    storage.save_image("image", &img).expect("Failed to save");
    storage.clear_memory_cache();

    let loaded = storage.load_image("image").expect("Failed to load");
    assert_eq!((loaded.width(), loaded.height()), (100, 50));
}

#[test]
fn test_image_jpeg_override() {
    let (storage, _dir) = create_test_storage();
    let img = solid_image(100, 100);

    storage
        .save_image_with("image", &img, ImageFormat::Jpeg { quality: 80 })
        .expect("Failed to save");
    storage.clear_memory_cache();

    let loaded = storage.load_image("image").expect("Failed to load");
    assert_eq!((loaded.width(), loaded.height()), (100, 100));
}

#[test]
fn test_category_mismatch_is_a_decoding_error() {
    let (storage, _dir) = create_test_storage();

    storage.save_raw("blob", b"not structured").expect("save");

    let result: StorageResult<String> = storage.load("blob");
    assert!(matches!(result, Err(StorageError::Decoding(_))));

    // Cold path agrees with the hot path.
    storage.clear_memory_cache();
    let result: StorageResult<String> = storage.load("blob");
    assert!(matches!(result, Err(StorageError::Decoding(_))));
}

#[test]
fn test_wrong_target_type_is_a_decoding_error() {
    let (storage, _dir) = create_test_storage();

    storage.save("users", &sample_users()).expect("save");
    storage.clear_memory_cache();

    let result: StorageResult<Vec<u64>> = storage.load("users");
    assert!(matches!(result, Err(StorageError::Decoding(_))));
}

#[test]
fn test_unknown_codec_kind() {
    let (storage, _dir) = create_test_storage();

    // Plant an entry whose envelope carries a kind byte from the future.
    let path = storage.folder_path().join("alien.stash");
    fs::write(&path, b"CS\x01\x63payload").expect("Failed to plant entry");

    let result: StorageResult<i64> = storage.load("alien");
    assert!(matches!(
        result,
        Err(StorageError::UnsupportedType { kind: 0x63 })
    ));
}

#[test]
fn test_invalid_key() {
    let (storage, _dir) = create_test_storage();

    let result = storage.save("", &1_i64);
    assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
}

#[test]
fn test_remove() {
    let (storage, _dir) = create_test_storage();

    storage.save("key", &1_i64).expect("Failed to save");
    storage.remove("key").expect("Failed to remove");

    assert!(!storage.exists("key"));
    let result: StorageResult<i64> = storage.load("key");
    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}

#[test]
fn test_remove_missing_key() {
    let (storage, _dir) = create_test_storage();

    let result = storage.remove("missing");
    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}

#[test]
fn test_remove_evicts_memory() {
    let (storage, _dir) = create_test_storage();

    storage.save("key", &1_i64).expect("Failed to save");
    storage.remove("key").expect("Failed to remove");

    // Re-plant the key on disk with a different value; a stale memory entry
    // would otherwise win.
    let bytes = codec::structured::encode(&2_i64, StructuredFormat::Json).expect("encode");
    fs::write(storage.folder_path().join("key.stash"), bytes).expect("plant");

    let loaded: i64 = storage.load("key").expect("Failed to load");
    assert_eq!(loaded, 2);
}

#[test]
fn test_exists_consults_disk_only() {
    let (storage, _dir) = create_test_storage();

    storage.save("key", &1_i64).expect("Failed to save");
    assert!(storage.exists("key"));

    // Memory still holds the value, but exists() must say no.
    fs::remove_file(storage.folder_path().join("key.stash")).expect("Failed to drop file");
    assert!(!storage.exists("key"));

    assert!(!storage.exists("never saved"));
}

#[test]
fn test_files_reports_entries() {
    let (storage, _dir) = create_test_storage();

    storage.save("one", &1_i64).expect("save");
    storage.save("two", &2_i64).expect("save");
    storage.save("three", &3_i64).expect("save");

    let files = storage.files().expect("Failed to list");
    assert_eq!(files.len(), 3);

    let mut names: Vec<String> = files.into_iter().map(|entry| entry.name).collect();
    names.sort();
    assert_eq!(names, ["one", "three", "two"]);
}

#[test]
fn test_entry_size_matches_codec_output() {
    let (storage, _dir) = create_test_storage();

    storage.save("three", &3_i64).expect("Failed to save");

    let expected = codec::structured::encode(&3_i64, StructuredFormat::Json)
        .expect("encode")
        .len() as u64;

    let files = storage.files().expect("Failed to list");
    assert_eq!(files[0].size, expected);
}

#[test]
fn test_folder_size_sums_entries() {
    let (storage, _dir) = create_test_storage();

    storage.save_raw("a", b"12").expect("save");
    storage.save_raw("b", b"3456").expect("save");

    let header = codec::HEADER_LEN as u64;
    assert_eq!(
        storage.folder_size().expect("Failed to size"),
        2 + 4 + 2 * header
    );
}

#[test]
fn test_is_empty() {
    let (storage, _dir) = create_test_storage();

    assert!(storage.is_empty().expect("Failed to check"));

    storage.save("key", &1_i64).expect("Failed to save");
    assert!(!storage.is_empty().expect("Failed to check"));
}

#[test]
fn test_remove_all() {
    let (storage, _dir) = create_test_storage();

    for key in ["one", "two", "three"] {
        storage.save(key, &1_i64).expect("Failed to save");
    }

    storage.remove_all().expect("Failed to clear");

    for key in ["one", "two", "three"] {
        assert!(!storage.exists(key));
    }
    assert!(storage.is_empty().expect("Failed to check"));

    // The instance stays usable.
    storage.save("fresh", &1_i64).expect("Failed to save");
    assert!(storage.exists("fresh"));
}

#[test]
fn test_remove_all_on_empty_storage() {
    let (storage, _dir) = create_test_storage();

    storage.remove_all().expect("First clear should succeed");
    storage.remove_all().expect("Second clear should succeed");

    assert!(storage.is_empty().expect("Failed to check"));
}

#[test]
fn test_capacity_enforced() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = StorageConfig {
        max_disk_bytes: Some(64),
        ..StorageConfig::new(dir.path(), "capped")
    };
    let storage = Storage::new(config).expect("Failed to open storage");

    storage.save_raw("a", &[0_u8; 32]).expect("Should fit");

    let result = storage.save_raw("b", &[0_u8; 60]);
    assert!(matches!(result, Err(StorageError::CapacityExceeded { .. })));

    // Nothing was written and the memory tier was not touched.
    assert!(!storage.exists("b"));
    assert!(matches!(
        storage.load_raw("b"),
        Err(StorageError::NotFound { .. })
    ));
}

#[test]
fn test_capacity_accounts_for_replaced_entry() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = StorageConfig {
        max_disk_bytes: Some(64),
        ..StorageConfig::new(dir.path(), "capped")
    };
    let storage = Storage::new(config).expect("Failed to open storage");

    storage.save_raw("a", &[0_u8; 50]).expect("Should fit");

    // Overwriting replaces the old bytes, so this still fits.
    storage.save_raw("a", &[0_u8; 55]).expect("Should replace");

    assert!(matches!(
        storage.save_raw("a", &[0_u8; 70]),
        Err(StorageError::CapacityExceeded { .. })
    ));
}

#[test]
fn test_concurrent_same_key() {
    let (storage, _dir) = create_test_storage();
    let storage = Arc::new(storage);

    storage.save("key", &0_i64).expect("Failed to seed");

    let mut threads = vec![];
    for i in 0..4_i64 {
        let storage = storage.clone();
        threads.push(std::thread::spawn(move || {
            for j in 0..50_i64 {
                storage.save("key", &(i * 100 + j)).expect("save");
                let value: i64 = storage.load("key").expect("load");
                // Some write always lands in between; the value is whatever
                // was saved last, never a torn read.
                assert!(value >= 0);
            }
        }));
    }

    for t in threads {
        t.join().expect("Thread panicked");
    }

    let final_value: i64 = storage.load("key").expect("load");
    assert!(final_value >= 0);
}

#[test]
fn test_concurrent_distinct_keys() {
    let (storage, _dir) = create_test_storage();
    let storage = Arc::new(storage);

    let mut threads = vec![];
    for i in 0..8 {
        let storage = storage.clone();
        threads.push(std::thread::spawn(move || {
            let key = format!("key {}", i);
            for j in 0..25_i64 {
                storage.save(&key, &j).expect("save");
                let value: i64 = storage.load(&key).expect("load");
                assert_eq!(value, j);
            }
        }));
    }

    for t in threads {
        t.join().expect("Thread panicked");
    }

    assert_eq!(storage.files().expect("list").len(), 8);
}

#[test]
fn test_remove_all_under_concurrent_saves() {
    let (storage, _dir) = create_test_storage();
    let storage = Arc::new(storage);

    let mut threads = vec![];
    for i in 0..4 {
        let storage = storage.clone();
        threads.push(std::thread::spawn(move || {
            for j in 0..25 {
                let key = format!("key {} {}", i, j);
                storage.save(&key, &j).expect("save");
            }
        }));
    }

    for _ in 0..5 {
        storage.remove_all().expect("clear");
    }

    for t in threads {
        t.join().expect("Thread panicked");
    }

    // Whatever survived, the folder and the listing agree and a final clear
    // leaves the storage empty.
    storage.remove_all().expect("final clear");
    assert!(storage.is_empty().expect("check"));
}

#[test]
fn test_debug_output() {
    let (storage, _dir) = create_test_storage();

    let debug_str = format!("{:?}", storage);
    assert!(debug_str.contains("Storage"));
    assert!(debug_str.contains("folder"));
}
