//! Node arena
//!
//! Fixed-capacity storage for index nodes, addressed by `u32`.

use crate::error::{FsError, Result};
use crate::table::FileName;

/// One entry of a bucket chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexNode {
    /// File name (empty for vacant nodes)
    pub key: FileName,

    /// File Table slot (`None` for vacant nodes)
    pub slot: Option<u32>,

    /// Next node in the same bucket
    pub next: Option<u32>,
}

impl IndexNode {
    pub const VACANT: IndexNode = IndexNode {
        key: FileName::EMPTY,
        slot: None,
        next: None,
    };

    pub fn is_vacant(&self) -> bool {
        self.slot.is_none()
    }
}

/// Preallocated node storage
///
/// `nodes.len()` is the number of nodes ever allocated since the last
/// compaction; indices below it stay valid until then.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena {
    nodes: Vec<IndexNode>,
    capacity: usize,
}

impl NodeArena {
    /// Empty arena bounded by `capacity`; storage grows as nodes are placed
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            capacity,
        }
    }

    /// Place `node` in the next unallocated position
    pub(crate) fn alloc(&mut self, node: IndexNode) -> Result<u32> {
        if self.is_exhausted() {
            return Err(FsError::IndexFull {
                capacity: self.capacity,
            });
        }
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        Ok(index)
    }

    pub(crate) fn get(&self, index: u32) -> Option<&IndexNode> {
        self.nodes.get(index as usize)
    }

    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut IndexNode> {
        self.nodes.get_mut(index as usize)
    }

    /// Swap in a rebuilt node list (compaction, image restore)
    pub(crate) fn replace(&mut self, nodes: Vec<IndexNode>) {
        self.nodes.clear();
        self.nodes.extend(nodes);
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    pub(crate) fn nodes(&self) -> &[IndexNode] {
        &self.nodes
    }

    pub(crate) fn allocated(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.nodes.len() >= self.capacity
    }

    pub(crate) fn vacant_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_vacant()).count()
    }
}
