//! File table
//!
//! Preallocated slots with swap-with-last deletion.

use crate::error::{FsError, Result};

use super::{FileName, FileRecord};

/// Fixed-capacity table of file records
///
/// ## Append Protocol
/// `stage()` fills slot `len` without making it active, so the caller can
/// finish dependent work (index insertion) and then `commit()` or
/// `discard_staged()`. Nothing else may touch the table in between.
#[derive(Debug, Clone)]
pub struct FileTable {
    slots: Vec<FileRecord>,
    len: usize,
}

impl FileTable {
    /// Create a table of `capacity` vacant slots
    pub fn new(capacity: usize, max_file_blocks: usize, block_size: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| FileRecord::vacant(max_file_blocks, block_size))
            .collect();

        Self { slots, len: 0 }
    }

    /// Fill the next free slot without activating it
    ///
    /// Returns the slot index the record will occupy once committed.
    pub fn stage(&mut self, name: FileName, size: usize, blocks: &[u32]) -> Result<usize> {
        if self.is_full() {
            return Err(FsError::TableFull {
                capacity: self.capacity(),
            });
        }

        let slot = self.len;
        self.slots[slot].fill(name, size, blocks);
        Ok(slot)
    }

    /// Activate the staged record
    pub fn commit(&mut self) -> usize {
        let slot = self.len;
        self.len += 1;
        slot
    }

    /// Throw away the staged record
    pub fn discard_staged(&mut self) {
        if let Some(record) = self.slots.get_mut(self.len) {
            record.clear();
        }
    }

    /// Remove the record at `slot` by moving the last active record into it
    ///
    /// Returns the name of the record that moved into `slot`, or `None` when
    /// `slot` was the last one. The caller must reindex that name.
    pub fn swap_remove(&mut self, slot: usize) -> Option<FileName> {
        if slot >= self.len {
            return None;
        }

        let last = self.len - 1;
        self.slots.swap(slot, last);
        self.slots[last].clear();
        self.len -= 1;

        if slot == last {
            None
        } else {
            Some(*self.slots[slot].name())
        }
    }

    /// Vacate every slot
    pub fn reset(&mut self) {
        for record in &mut self.slots[..self.len] {
            record.clear();
        }
        self.len = 0;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Active record at `slot`
    pub fn get(&self, slot: usize) -> Option<&FileRecord> {
        self.slots[..self.len].get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut FileRecord> {
        self.slots[..self.len].get_mut(slot)
    }

    /// Active records in slot order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &FileRecord)> {
        self.slots[..self.len].iter().enumerate()
    }

    /// Every slot, active or not
    pub fn slots(&self) -> &[FileRecord] {
        &self.slots
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> Option<&mut FileRecord> {
        self.slots.get_mut(slot)
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len.min(self.slots.len());
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.slots.len()
    }
}
