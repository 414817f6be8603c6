//! Tests for the Name Index
//!
//! These tests verify:
//! - Byte-sum hashing
//! - Insert / lookup / remove / update
//! - Collision chains
//! - Arena exhaustion and compaction
//! - Validation of decoded parts

use blockfs::index::{hash, IndexNode, NameIndex};
use blockfs::table::FileName;
use blockfs::FsError;

// =============================================================================
// Helper Functions
// =============================================================================

fn name(s: &str) -> FileName {
    FileName::new(s, 100).unwrap()
}

fn node(key: &str, slot: u32, next: Option<u32>) -> IndexNode {
    IndexNode {
        key: name(key),
        slot: Some(slot),
        next,
    }
}

// =============================================================================
// Hash Tests
// =============================================================================

#[test]
fn test_hash_is_byte_sum_modulo() {
    assert_eq!(hash(b"ab", 256), (97 + 98) % 256);
    assert_eq!(hash(b"a.txt", 256), (97 + 46 + 116 + 120 + 116) % 256);
    assert_eq!(hash(b"", 256), 0);
    assert_eq!(hash(b"ab", 7), 195 % 7);
}

#[test]
fn test_hash_anagrams_collide() {
    assert_eq!(hash(b"ab", 256), hash(b"ba", 256));
    assert_eq!(hash(b"file1", 256), hash(b"1elif", 256));
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_insert_and_lookup() {
    let mut index = NameIndex::new(256, 8);

    index.insert(name("a.txt"), 0).unwrap();
    index.insert(name("b.txt"), 1).unwrap();

    assert_eq!(index.lookup("a.txt"), Some(0));
    assert_eq!(index.lookup("b.txt"), Some(1));
    assert_eq!(index.len(), 2);
}

#[test]
fn test_lookup_missing() {
    let mut index = NameIndex::new(256, 8);
    index.insert(name("a.txt"), 0).unwrap();

    assert_eq!(index.lookup("missing"), None);
    assert_eq!(index.lookup(""), None);
}

#[test]
fn test_remove() {
    let mut index = NameIndex::new(256, 8);
    index.insert(name("a.txt"), 0).unwrap();

    assert!(index.remove("a.txt"));
    assert_eq!(index.lookup("a.txt"), None);
    assert!(index.is_empty());
}

#[test]
fn test_remove_missing_is_noop() {
    let mut index = NameIndex::new(256, 8);
    index.insert(name("a.txt"), 0).unwrap();

    assert!(!index.remove("nope"));

    assert_eq!(index.lookup("a.txt"), Some(0));
    assert_eq!(index.len(), 1);
    assert_eq!(index.allocated(), 1);
}

#[test]
fn test_update_slot() {
    let mut index = NameIndex::new(256, 8);
    index.insert(name("a.txt"), 3).unwrap();

    assert!(index.update("a.txt", 1));
    assert_eq!(index.lookup("a.txt"), Some(1));
    // No new node
    assert_eq!(index.allocated(), 1);

    assert!(!index.update("missing", 0));
}

// =============================================================================
// Collision Tests
// =============================================================================

#[test]
fn test_colliding_names_share_bucket() {
    let mut index = NameIndex::new(256, 8);
    index.insert(name("ab"), 0).unwrap();
    index.insert(name("ba"), 1).unwrap();

    let bucket = index.bucket_of(b"ab");
    assert_eq!(bucket, index.bucket_of(b"ba"));
    assert_eq!(index.chain_len(bucket), 2);

    assert_eq!(index.lookup("ab"), Some(0));
    assert_eq!(index.lookup("ba"), Some(1));
}

#[test]
fn test_insert_prepends_to_chain() {
    let mut index = NameIndex::new(1, 8);
    index.insert(name("first"), 0).unwrap();
    index.insert(name("second"), 1).unwrap();
    index.insert(name("third"), 2).unwrap();

    let order: Vec<String> = index.iter().map(|(n, _)| n.to_string()).collect();
    assert_eq!(order, vec!["third", "second", "first"]);
}

#[test]
fn test_remove_from_chain_head_middle_tail() {
    let mut index = NameIndex::new(1, 8);
    for (slot, n) in ["a", "b", "c", "d"].iter().enumerate() {
        index.insert(name(n), slot as u32).unwrap();
    }
    // Chain: d -> c -> b -> a

    assert!(index.remove("d")); // head
    assert!(index.remove("b")); // middle
    assert!(index.remove("a")); // tail

    assert_eq!(index.lookup("c"), Some(2));
    assert_eq!(index.chain_len(0), 1);
    assert_eq!(index.lookup("a"), None);
    assert_eq!(index.lookup("b"), None);
    assert_eq!(index.lookup("d"), None);
}

#[test]
fn test_colliding_names_removed_independently() {
    let mut index = NameIndex::new(256, 8);
    index.insert(name("ab"), 0).unwrap();
    index.insert(name("ba"), 1).unwrap();

    assert!(index.remove("ab"));
    assert_eq!(index.lookup("ba"), Some(1));

    index.insert(name("ab"), 2).unwrap();
    assert!(index.remove("ba"));
    assert_eq!(index.lookup("ab"), Some(2));
}

// =============================================================================
// Arena Tests
// =============================================================================

#[test]
fn test_index_full() {
    let mut index = NameIndex::new(16, 2);
    index.insert(name("a"), 0).unwrap();
    index.insert(name("b"), 1).unwrap();

    let err = index.insert(name("c"), 2).unwrap_err();

    assert!(matches!(err, FsError::IndexFull { capacity: 2 }));
    assert_eq!(index.lookup("c"), None);
    assert_eq!(index.len(), 2);
}

#[test]
fn test_removed_nodes_are_not_reused_until_compaction() {
    let mut index = NameIndex::new(16, 2);
    index.insert(name("a"), 0).unwrap();
    index.insert(name("b"), 1).unwrap();
    index.remove("a");

    assert_eq!(index.len(), 1);
    assert_eq!(index.allocated(), 2);
    assert!(index.is_exhausted());
    assert!(index.nodes().iter().any(|n| n.is_vacant()));
    assert!(matches!(
        index.insert(name("c"), 1),
        Err(FsError::IndexFull { .. })
    ));
}

#[test]
fn test_compact_reclaims_vacant_nodes() {
    let mut index = NameIndex::new(16, 2);
    index.insert(name("a"), 0).unwrap();
    index.insert(name("b"), 1).unwrap();
    index.remove("a");

    assert_eq!(index.compact(), 1);

    assert_eq!(index.allocated(), 1);
    assert_eq!(index.lookup("b"), Some(1));
    index.insert(name("c"), 0).unwrap();
    assert_eq!(index.lookup("c"), Some(0));
}

#[test]
fn test_compact_preserves_chain_order() {
    let mut index = NameIndex::new(1, 8);
    for (slot, n) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        index.insert(name(n), slot as u32).unwrap();
    }
    index.remove("b");
    index.remove("d");
    let before: Vec<(String, u32)> = index.iter().map(|(n, s)| (n.to_string(), s)).collect();

    index.compact();

    let after: Vec<(String, u32)> = index.iter().map(|(n, s)| (n.to_string(), s)).collect();
    assert_eq!(before, after);
    assert_eq!(index.allocated(), 3);
}

#[test]
fn test_compact_without_vacancies() {
    let mut index = NameIndex::new(4, 4);
    index.insert(name("a"), 0).unwrap();

    assert_eq!(index.compact(), 0);
    assert_eq!(index.lookup("a"), Some(0));
}

#[test]
fn test_reset() {
    let mut index = NameIndex::new(4, 4);
    index.insert(name("a"), 0).unwrap();
    index.insert(name("b"), 1).unwrap();

    index.reset();

    assert!(index.is_empty());
    assert_eq!(index.allocated(), 0);
    assert!(index.buckets().iter().all(|b| b.is_none()));
}

// =============================================================================
// from_parts Validation Tests
// =============================================================================

#[test]
fn test_from_parts_accepts_consistent_index() {
    let mut source = NameIndex::new(8, 4);
    source.insert(name("a"), 0).unwrap();
    source.insert(name("b"), 1).unwrap();
    source.remove("a");

    let rebuilt =
        NameIndex::from_parts(source.buckets().to_vec(), source.nodes().to_vec(), 4).unwrap();

    assert_eq!(rebuilt.lookup("b"), Some(1));
    assert_eq!(rebuilt.lookup("a"), None);
    assert_eq!(rebuilt.allocated(), 2);
}

#[test]
fn test_from_parts_rejects_cycle() {
    let bucket = hash(b"a", 1);
    let mut buckets = vec![None; 1];
    buckets[bucket] = Some(0);
    let nodes = vec![node("a", 0, Some(0))];

    let err = NameIndex::from_parts(buckets, nodes, 4).unwrap_err();
    assert!(matches!(err, FsError::CorruptImage(_)));
}

#[test]
fn test_from_parts_rejects_link_outside_arena() {
    let buckets = vec![Some(5)];
    let nodes = vec![node("a", 0, None)];

    assert!(matches!(
        NameIndex::from_parts(buckets, nodes, 8),
        Err(FsError::CorruptImage(_))
    ));
}

#[test]
fn test_from_parts_rejects_wrong_bucket() {
    // "a" hashes to 97 % 4 == 1, filed under bucket 0
    let buckets = vec![Some(0), None, None, None];
    let nodes = vec![node("a", 0, None)];

    assert!(matches!(
        NameIndex::from_parts(buckets, nodes, 8),
        Err(FsError::CorruptImage(_))
    ));
}

#[test]
fn test_from_parts_rejects_unreachable_live_node() {
    let buckets = vec![None; 4];
    let nodes = vec![node("a", 0, None)];

    assert!(matches!(
        NameIndex::from_parts(buckets, nodes, 8),
        Err(FsError::CorruptImage(_))
    ));
}

#[test]
fn test_from_parts_rejects_too_many_nodes() {
    let buckets = vec![None; 4];
    let nodes = vec![IndexNode::VACANT; 3];

    assert!(matches!(
        NameIndex::from_parts(buckets, nodes, 2),
        Err(FsError::CorruptImage(_))
    ));
}
