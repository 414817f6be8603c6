//! Tests for the Image codec
//!
//! These tests verify:
//! - Save/load round trips preserve every component
//! - Image size is determined by geometry and node count
//! - Truncated, extended or altered images are rejected
//! - Checksummed but inconsistent images are rejected
//! - Failed restores leave a freshly reset engine

use blockfs::config::{Config, MAX_INDEX_NODES};
use blockfs::engine::StorageEngine;
use blockfs::image::{self, ImageHeader, HEADER_SIZE, MAGIC, VERSION};
use blockfs::FsError;

// =============================================================================
// Helper Functions
// =============================================================================

/// 4-byte blocks, 8 blocks, 2 slots of at most 2 blocks
///
/// slot record = 100 + 4 + 4 + 2×4 + 2×4 = 124 bytes
fn tiny_config() -> Config {
    Config::builder()
        .block_size(4)
        .max_blocks(8)
        .max_files(2)
        .max_file_blocks(2)
        .hashmap_size(4)
        .max_index_nodes(4)
        .build()
}

const RECORD_SIZE: usize = 124;
const ACTIVE_COUNT_OFFSET: usize = HEADER_SIZE + 2 * RECORD_SIZE;
const BITMAP_OFFSET: usize = ACTIVE_COUNT_OFFSET + 4;
const NODE_COUNT_OFFSET: usize = BITMAP_OFFSET + 8 * 4;
const NODES_OFFSET: usize = NODE_COUNT_OFFSET + 4;

fn tiny_engine_with_file() -> StorageEngine {
    let mut engine = StorageEngine::new(tiny_config()).unwrap();
    engine.create("a", 3).unwrap();
    engine.write("a", 0, b"xyz").unwrap();
    engine
}

fn sample_engine() -> StorageEngine {
    let mut engine = StorageEngine::new(Config::default()).unwrap();
    engine.create("a.txt", 10).unwrap();
    engine.create("b.bin", 1500).unwrap();
    engine.create("c", 1).unwrap();
    engine.write("a.txt", 0, b"hello").unwrap();
    engine.write("b.bin", 1000, b"\0\x01\x02binary").unwrap();
    engine.write("c", 0, b"!").unwrap();
    engine
}

fn put_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Recompute the trailing checksum after a deliberate edit
fn reseal(bytes: &mut [u8]) {
    let body = bytes.len() - 4;
    let crc = crc32fast::hash(&bytes[..body]);
    bytes[body..].copy_from_slice(&crc.to_le_bytes());
}

fn assert_same_state(a: &StorageEngine, b: &StorageEngine) {
    assert_eq!(a.list(), b.list());
    assert_eq!(
        a.allocator().occupied().collect::<Vec<_>>(),
        b.allocator().occupied().collect::<Vec<_>>()
    );
    assert_eq!(a.index().buckets(), b.index().buckets());
    assert_eq!(a.index().nodes(), b.index().nodes());
    for info in a.list() {
        assert_eq!(
            a.read(&info.name, 0, info.size).unwrap(),
            b.read(&info.name, 0, info.size).unwrap()
        );
    }
}

fn assert_corrupt(bytes: &[u8]) {
    match StorageEngine::load(bytes) {
        Err(FsError::CorruptImage(_)) => {}
        other => panic!("expected CorruptImage, got {:?}", other.map(|e| e.file_count())),
    }
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_header_encodes_to_fixed_size() {
    let header = ImageHeader::for_config(&Config::default());
    let bytes = header.encode().unwrap();

    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(&bytes[..4], &MAGIC);
    assert_eq!(ImageHeader::decode(&bytes).unwrap(), header);
}

#[test]
fn test_header_round_trips_geometry() {
    let header = ImageHeader::for_config(&tiny_config());
    let config = ImageHeader::decode(&header.encode().unwrap())
        .unwrap()
        .to_config()
        .unwrap();

    assert!(config.same_geometry(&tiny_config()));
}

#[test]
fn test_header_rejects_bad_version() {
    let mut header = ImageHeader::for_config(&Config::default());
    header.version = VERSION + 1;

    assert!(matches!(
        ImageHeader::decode(&header.encode().unwrap()),
        Err(FsError::CorruptImage(_))
    ));
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_empty_engine() {
    let engine = StorageEngine::new(Config::default()).unwrap();

    let loaded = StorageEngine::load(&engine.save().unwrap()).unwrap();

    assert_eq!(loaded.file_count(), 0);
    assert_eq!(loaded.used_blocks(), 0);
    assert!(loaded.config().same_geometry(engine.config()));
}

#[test]
fn test_round_trip_with_files() {
    let engine = sample_engine();

    let loaded = StorageEngine::load(&engine.save().unwrap()).unwrap();

    assert_same_state(&engine, &loaded);
    assert_eq!(loaded.read("a.txt", 0, 5).unwrap(), b"hello");
    assert_eq!(loaded.read("b.bin", 1000, 9).unwrap(), b"\0\x01\x02binary");
}

#[test]
fn test_round_trip_after_deletes_keeps_vacant_nodes() {
    let mut engine = sample_engine();
    engine.delete("a.txt").unwrap();
    assert!(engine.index().nodes().iter().any(|n| n.is_vacant()));

    let loaded = StorageEngine::load(&engine.save().unwrap()).unwrap();

    assert_same_state(&engine, &loaded);
    assert_eq!(loaded.index().allocated(), 3);
    assert!(!loaded.contains("a.txt"));
    assert_eq!(loaded.read("c", 0, 1).unwrap(), b"!");
}

#[test]
fn test_round_trip_non_default_geometry() {
    let engine = tiny_engine_with_file();

    let loaded = StorageEngine::load(&engine.save().unwrap()).unwrap();

    assert!(loaded.config().same_geometry(&tiny_config()));
    assert_same_state(&engine, &loaded);
}

#[test]
fn test_loaded_engine_is_usable() {
    let mut loaded = StorageEngine::load(&sample_engine().save().unwrap()).unwrap();

    loaded.delete("a.txt").unwrap();
    loaded.create("d", 600).unwrap();
    loaded.write("d", 599, b"z").unwrap();

    assert_eq!(loaded.read("d", 599, 1).unwrap(), b"z");
    assert_eq!(loaded.read("c", 0, 1).unwrap(), b"!");
    loaded.verify_integrity().unwrap();
}

#[test]
fn test_save_is_deterministic() {
    let engine = sample_engine();

    let first = engine.save().unwrap();
    let second = engine.save().unwrap();
    let reloaded = StorageEngine::load(&first).unwrap().save().unwrap();

    assert_eq!(first, second);
    assert_eq!(first, reloaded);
}

#[test]
fn test_image_size_matches_layout() {
    let mut engine = StorageEngine::new(tiny_config()).unwrap();
    assert_eq!(engine.save().unwrap().len(), NODES_OFFSET + 4 * 4 + 4);
    assert_eq!(image::image_size(&tiny_config(), 0), Some(NODES_OFFSET + 4 * 4 + 4));

    engine.create("a", 3).unwrap();
    engine.create("b", 3).unwrap();
    engine.delete("a").unwrap();

    let bytes = engine.save().unwrap();
    assert_eq!(Some(bytes.len()), image::image_size(&tiny_config(), 2));
}

#[test]
fn test_image_section_offsets() {
    let engine = tiny_engine_with_file();
    let bytes = engine.save().unwrap();

    assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 1], b"a");
    assert_eq!(&bytes[ACTIVE_COUNT_OFFSET..ACTIVE_COUNT_OFFSET + 4], &1u32.to_le_bytes());
    assert_eq!(&bytes[BITMAP_OFFSET..BITMAP_OFFSET + 4], &1u32.to_le_bytes());
    assert_eq!(&bytes[BITMAP_OFFSET + 4..BITMAP_OFFSET + 8], &0u32.to_le_bytes());
    assert_eq!(&bytes[NODE_COUNT_OFFSET..NODE_COUNT_OFFSET + 4], &1u32.to_le_bytes());
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_reject_empty_and_short_input() {
    assert_corrupt(&[]);
    assert_corrupt(b"BFSI");
    assert_corrupt(&[0u8; HEADER_SIZE - 1]);
}

#[test]
fn test_reject_bad_magic() {
    let mut bytes = sample_engine().save().unwrap();
    bytes[0] = b'X';

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_truncated_image() {
    let bytes = sample_engine().save().unwrap();

    assert_corrupt(&bytes[..bytes.len() - 1]);
    assert_corrupt(&bytes[..HEADER_SIZE]);
    assert_corrupt(&bytes[..bytes.len() / 2]);
}

#[test]
fn test_reject_trailing_byte() {
    let mut bytes = sample_engine().save().unwrap();
    bytes.push(0);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_flipped_byte() {
    let clean = sample_engine().save().unwrap();

    for offset in [HEADER_SIZE, HEADER_SIZE + 200, clean.len() / 2, clean.len() - 10] {
        let mut bytes = clean.clone();
        bytes[offset] ^= 0x40;
        assert_corrupt(&bytes);
    }
}

#[test]
fn test_reject_invalid_geometry_in_header() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    // block_size field sits right after magic and version
    put_u32(&mut bytes, 6, 0);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_oversized_index_capacity_in_header() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    // max_index_nodes field
    put_u32(&mut bytes, 26, 0xFFFF_FFF0);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_large_index_capacity_loads_lazily() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    put_u32(&mut bytes, 26, MAX_INDEX_NODES as u32);
    reseal(&mut bytes);

    let loaded = StorageEngine::load(&bytes).unwrap();

    assert_eq!(loaded.index().capacity(), MAX_INDEX_NODES);
    assert_eq!(loaded.index().allocated(), 1);
    assert_eq!(loaded.read("a", 0, 3).unwrap(), b"xyz");
}

#[test]
fn test_reject_name_longer_than_declared_limit() {
    let mut engine = StorageEngine::new(tiny_config()).unwrap();
    engine.create("abcdef", 3).unwrap();
    let mut bytes = engine.save().unwrap();
    // max_name_len field
    put_u32(&mut bytes, 30, 3);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_name_at_declared_limit_loads() {
    let mut engine = StorageEngine::new(tiny_config()).unwrap();
    engine.create("abc", 3).unwrap();
    let mut bytes = engine.save().unwrap();
    put_u32(&mut bytes, 30, 3);
    reseal(&mut bytes);

    let loaded = StorageEngine::load(&bytes).unwrap();

    assert_eq!(loaded.config().max_name_len, 3);
    assert!(loaded.contains("abc"));
}

#[test]
fn test_reject_bitmap_entry_out_of_range() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    put_u32(&mut bytes, BITMAP_OFFSET, 2);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_used_block_without_owner() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    put_u32(&mut bytes, BITMAP_OFFSET + 4 * 7, 1);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_owned_block_marked_free() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    put_u32(&mut bytes, BITMAP_OFFSET, 0);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_active_count_over_live_records() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    put_u32(&mut bytes, ACTIVE_COUNT_OFFSET, 2);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_active_count_over_capacity() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    put_u32(&mut bytes, ACTIVE_COUNT_OFFSET, 3);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_size_block_count_mismatch() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    // 8 bytes need two 4-byte blocks; the record owns one
    put_u32(&mut bytes, HEADER_SIZE + 100, 8);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_data_in_inactive_slot() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    // Last data byte of slot 1
    bytes[HEADER_SIZE + 2 * RECORD_SIZE - 1] = 0xaa;
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_node_slot_out_of_range() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    put_u32(&mut bytes, NODES_OFFSET + 100, 1);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_node_count_over_capacity() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    put_u32(&mut bytes, NODE_COUNT_OFFSET, 5);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

#[test]
fn test_reject_self_linked_node() {
    let mut bytes = tiny_engine_with_file().save().unwrap();
    put_u32(&mut bytes, NODES_OFFSET + 104, 0);
    reseal(&mut bytes);

    assert_corrupt(&bytes);
}

// =============================================================================
// Restore Tests
// =============================================================================

#[test]
fn test_restore_replaces_state() {
    let source = sample_engine();
    let mut target = StorageEngine::new(Config::default()).unwrap();
    target.create("old", 10).unwrap();

    target.restore(&source.save().unwrap()).unwrap();

    assert_same_state(&source, &target);
    assert!(!target.contains("old"));
}

#[test]
fn test_restore_keeps_image_path() {
    let config = Config::builder().image_path("/tmp/custom.img").build();
    let mut target = StorageEngine::new(config).unwrap();

    target.restore(&sample_engine().save().unwrap()).unwrap();

    assert_eq!(target.config().image_path.to_str(), Some("/tmp/custom.img"));
}

#[test]
fn test_restore_geometry_mismatch_resets() {
    let mut target = sample_engine();
    let other = tiny_engine_with_file().save().unwrap();

    let err = target.restore(&other).unwrap_err();

    assert!(matches!(err, FsError::CorruptImage(_)));
    assert_eq!(target.file_count(), 0);
    assert_eq!(target.used_blocks(), 0);
    assert!(target.index().is_empty());
    assert!(target.config().same_geometry(&Config::default()));
}

#[test]
fn test_restore_garbage_resets_and_stays_usable() {
    let mut target = sample_engine();

    assert!(target.restore(b"definitely not an image").is_err());

    assert_eq!(target.file_count(), 0);
    target.create("fresh", 4).unwrap();
    assert_eq!(target.stat("fresh").unwrap().blocks, vec![0]);
    target.verify_integrity().unwrap();
}
