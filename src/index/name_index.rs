//! Name index
//!
//! Chained hash table over the node arena.

use crate::error::{FsError, Result};
use crate::table::FileName;

use super::arena::NodeArena;
use super::{hash, IndexNode};

/// Name → slot map with arena-backed chains
///
/// `insert` does not check for duplicates; the engine enforces unique
/// names before inserting.
#[derive(Debug, Clone)]
pub struct NameIndex {
    /// Head node of each bucket chain
    buckets: Vec<Option<u32>>,

    /// Backing node storage
    arena: NodeArena,
}

impl NameIndex {
    /// Create an empty index with `buckets` heads and room for `capacity` nodes
    pub fn new(buckets: usize, capacity: usize) -> Self {
        Self {
            buckets: vec![None; buckets],
            arena: NodeArena::new(capacity),
        }
    }

    /// Rebuild an index from decoded parts
    ///
    /// Fails with `CorruptImage` on any index outside the arena, a node in
    /// the wrong bucket, a shared or cyclic chain, or a reachable vacant node.
    pub fn from_parts(
        buckets: Vec<Option<u32>>,
        nodes: Vec<IndexNode>,
        capacity: usize,
    ) -> Result<Self> {
        if buckets.is_empty() {
            return Err(FsError::CorruptImage("index has no buckets".to_string()));
        }
        if nodes.len() > capacity {
            return Err(FsError::CorruptImage(format!(
                "index declares {} nodes, arena holds {}",
                nodes.len(),
                capacity
            )));
        }

        let in_range = |link: Option<u32>| link.map_or(true, |i| (i as usize) < nodes.len());

        for (i, node) in nodes.iter().enumerate() {
            if !in_range(node.next) {
                return Err(FsError::CorruptImage(format!(
                    "node {} links outside the arena",
                    i
                )));
            }
            if node.is_vacant() != node.key.is_empty()
                || (node.is_vacant() && node.next.is_some())
            {
                return Err(FsError::CorruptImage(format!("node {} is half vacant", i)));
            }
        }

        let mut seen = vec![false; nodes.len()];
        for (bucket, &head) in buckets.iter().enumerate() {
            if !in_range(head) {
                return Err(FsError::CorruptImage(format!(
                    "bucket {} points outside the arena",
                    bucket
                )));
            }

            let mut cursor = head;
            while let Some(i) = cursor {
                let i = i as usize;
                if seen[i] {
                    return Err(FsError::CorruptImage(format!(
                        "node {} reached twice (cycle or shared chain)",
                        i
                    )));
                }
                seen[i] = true;

                let node = &nodes[i];
                if node.is_vacant() {
                    return Err(FsError::CorruptImage(format!(
                        "vacant node {} is linked into bucket {}",
                        i, bucket
                    )));
                }
                if hash(node.key.as_bytes(), buckets.len()) != bucket {
                    return Err(FsError::CorruptImage(format!(
                        "node {} ({}) filed under bucket {}",
                        i, node.key, bucket
                    )));
                }
                cursor = node.next;
            }
        }

        if let Some(i) = (0..nodes.len()).find(|&i| !seen[i] && !nodes[i].is_vacant()) {
            return Err(FsError::CorruptImage(format!(
                "live node {} is not reachable from any bucket",
                i
            )));
        }

        let mut arena = NodeArena::new(capacity);
        arena.replace(nodes);
        Ok(Self { buckets, arena })
    }

    /// Prepend `(name, slot)` to its bucket chain
    pub fn insert(&mut self, name: FileName, slot: u32) -> Result<()> {
        let bucket = self.bucket_of(name.as_bytes());
        let node = IndexNode {
            key: name,
            slot: Some(slot),
            next: self.buckets[bucket],
        };

        let index = self.arena.alloc(node)?;
        self.buckets[bucket] = Some(index);
        Ok(())
    }

    /// Slot of the first node named `name`
    pub fn lookup(&self, name: &str) -> Option<u32> {
        let (_, index) = self.find(name.as_bytes())?;
        self.arena.get(index).and_then(|node| node.slot)
    }

    /// Unlink the first node named `name`
    ///
    /// Returns `false` (and changes nothing) when the name is absent.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some((prev, index)) = self.find(name.as_bytes()) else {
            return false;
        };

        let next = self.arena.get(index).and_then(|node| node.next);
        match prev {
            Some(prev) => {
                if let Some(prev_node) = self.arena.get_mut(prev) {
                    prev_node.next = next;
                }
            }
            None => {
                let bucket = self.bucket_of(name.as_bytes());
                self.buckets[bucket] = next;
            }
        }

        if let Some(node) = self.arena.get_mut(index) {
            *node = IndexNode::VACANT;
        }
        true
    }

    /// Point the existing node named `name` at `slot`
    ///
    /// Returns `false` when the name is absent.
    pub fn update(&mut self, name: &str, slot: u32) -> bool {
        let Some((_, index)) = self.find(name.as_bytes()) else {
            return false;
        };
        match self.arena.get_mut(index) {
            Some(node) => {
                node.slot = Some(slot);
                true
            }
            None => false,
        }
    }

    /// Drop vacant nodes and renumber the survivors
    ///
    /// Chain order is preserved. Returns the number of nodes reclaimed.
    pub fn compact(&mut self) -> usize {
        let reclaimed = self.arena.vacant_count();
        if reclaimed == 0 {
            return 0;
        }

        let mut nodes = Vec::with_capacity(self.arena.allocated() - reclaimed);
        for bucket in 0..self.buckets.len() {
            let mut cursor = self.buckets[bucket];
            let mut tail: Option<usize> = None;

            while let Some(old) = cursor {
                let Some(&node) = self.arena.get(old) else {
                    break;
                };
                let new_index = nodes.len();
                nodes.push(IndexNode { next: None, ..node });

                match tail {
                    Some(t) => nodes[t].next = Some(new_index as u32),
                    None => self.buckets[bucket] = Some(new_index as u32),
                }
                tail = Some(new_index);
                cursor = node.next;
            }
        }

        self.arena.replace(nodes);
        reclaimed
    }

    /// Forget every entry
    pub fn reset(&mut self) {
        self.buckets.iter_mut().for_each(|b| *b = None);
        self.arena.clear();
    }

    /// Live `(name, slot)` pairs in bucket-chain order
    pub fn iter(&self) -> impl Iterator<Item = (&FileName, u32)> + '_ {
        self.buckets.iter().flat_map(move |&head| {
            let mut cursor = head;
            std::iter::from_fn(move || {
                let node = self.arena.get(cursor?)?;
                cursor = node.next;
                Some((&node.key, node.slot?))
            })
        })
    }

    /// Walk `name`'s chain; returns `(previous node, matching node)`
    fn find(&self, name: &[u8]) -> Option<(Option<u32>, u32)> {
        let mut prev = None;
        let mut cursor = self.buckets[self.bucket_of(name)];

        while let Some(index) = cursor {
            let node = self.arena.get(index)?;
            if node.key.matches(name) {
                return Some((prev, index));
            }
            prev = Some(index);
            cursor = node.next;
        }
        None
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn bucket_of(&self, name: &[u8]) -> usize {
        hash(name, self.buckets.len())
    }

    /// Number of nodes in `bucket`'s chain
    pub fn chain_len(&self, bucket: usize) -> usize {
        let mut len = 0;
        let mut cursor = self.buckets.get(bucket).copied().flatten();
        while let Some(node) = cursor.and_then(|i| self.arena.get(i)) {
            len += 1;
            cursor = node.next;
        }
        len
    }

    pub fn buckets(&self) -> &[Option<u32>] {
        &self.buckets
    }

    pub fn nodes(&self) -> &[IndexNode] {
        self.arena.nodes()
    }

    /// Live entries
    pub fn len(&self) -> usize {
        self.arena.allocated() - self.arena.vacant_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nodes allocated since the last compaction (live and vacant)
    pub fn allocated(&self) -> usize {
        self.arena.allocated()
    }

    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub fn is_exhausted(&self) -> bool {
        self.arena.is_exhausted()
    }
}
