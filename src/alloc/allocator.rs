//! Block allocator
//!
//! First-fit grants over a `BlockBitmap`.

use crate::error::{FsError, Result};

use super::BlockBitmap;

/// Grants and reclaims block indices
///
/// ## Policy
/// Scans from block 0 upward and takes the first `count` free indices.
/// Deterministic, so tests can predict exact block assignments.
#[derive(Debug, Clone)]
pub struct BlockAllocator {
    bitmap: BlockBitmap,
}

impl BlockAllocator {
    /// Create an allocator over `capacity` free blocks
    pub fn new(capacity: usize) -> Self {
        Self {
            bitmap: BlockBitmap::new(capacity),
        }
    }

    /// Grant `count` distinct free blocks, lowest index first
    ///
    /// Fails with `InsufficientSpace` when fewer than `count` blocks are
    /// free; nothing is marked in that case.
    pub fn allocate(&mut self, count: usize) -> Result<Vec<u32>> {
        let granted: Vec<u32> = self
            .bitmap
            .iter_free()
            .take(count)
            .map(|i| i as u32)
            .collect();

        if granted.len() < count {
            return Err(FsError::InsufficientSpace {
                requested: count,
                available: granted.len(),
            });
        }

        for &index in &granted {
            self.bitmap.set(index as usize);
        }

        Ok(granted)
    }

    /// Mark the given blocks free
    ///
    /// Already-free and out-of-range indices are left alone. Callers must
    /// never pass blocks still owned by another file.
    pub fn release(&mut self, indices: &[u32]) {
        for &index in indices {
            self.bitmap.clear(index as usize);
        }
    }

    /// Mark a single block occupied (used when restoring an image)
    pub fn mark_used(&mut self, index: u32) {
        self.bitmap.set(index as usize);
    }

    /// Free every block
    pub fn reset(&mut self) {
        self.bitmap.clear_all();
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn is_used(&self, index: u32) -> bool {
        self.bitmap.get(index as usize)
    }

    /// Total number of blocks in the pool
    pub fn capacity(&self) -> usize {
        self.bitmap.len()
    }

    pub fn used_count(&self) -> usize {
        self.bitmap.count_ones()
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.used_count()
    }

    /// Occupied block indices in ascending order
    pub fn occupied(&self) -> impl Iterator<Item = u32> + '_ {
        self.bitmap.iter_used().map(|i| i as u32)
    }

    pub fn bitmap(&self) -> &BlockBitmap {
        &self.bitmap
    }
}
