//! File records
//!
//! One table slot: name, declared size, owned blocks and the inline buffer.

use crate::error::{FsError, Result};

use super::FileName;

/// A single file slot
///
/// Invariant: `blocks.len() == ceil(size / block_size)` for active records;
/// vacant records have an empty name, zero size, no blocks and a zeroed
/// buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    name: FileName,
    size: usize,
    blocks: Vec<u32>,
    data: Vec<u8>,
}

impl FileRecord {
    /// Create a vacant record with room for `max_blocks` blocks of `block_size`
    pub fn vacant(max_blocks: usize, block_size: usize) -> Self {
        Self {
            name: FileName::EMPTY,
            size: 0,
            blocks: Vec::with_capacity(max_blocks),
            data: vec![0; max_blocks * block_size],
        }
    }

    /// Populate the record in place
    ///
    /// The caller guarantees `size` fits the buffer.
    pub(crate) fn fill(&mut self, name: FileName, size: usize, blocks: &[u32]) {
        self.name = name;
        self.size = size;
        self.blocks.clear();
        self.blocks.extend_from_slice(blocks);
    }

    /// Return the record to the vacant state
    pub(crate) fn clear(&mut self) {
        self.name = FileName::EMPTY;
        self.size = 0;
        self.blocks.clear();
        self.data.iter_mut().for_each(|b| *b = 0);
    }

    /// Copy `data` into the payload at `offset` (overwrite only)
    pub fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let end = self.check_range(offset, data.len())?;
        self.data[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Borrow `len` payload bytes starting at `offset`
    pub fn read_at(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = self.check_range(offset, len)?;
        Ok(&self.data[offset..end])
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<usize> {
        match offset.checked_add(len) {
            Some(end) if end <= self.size => Ok(end),
            _ => Err(FsError::OutOfBounds {
                offset,
                len,
                size: self.size,
            }),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &FileName {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn blocks(&self) -> &[u32] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The addressable payload (`size` bytes)
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// The whole inline buffer, including unused capacity
    pub fn buffer(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn is_vacant(&self) -> bool {
        self.name.is_empty()
    }
}
