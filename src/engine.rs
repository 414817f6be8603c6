//! Engine Module
//!
//! The storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Validate every request before touching state
//! - Keep allocator, table and index mutually consistent
//! - Roll back partial work when a later step fails
//! - Reindex the record moved by swap-with-last deletion

use std::path::Path;

use crate::alloc::BlockAllocator;
use crate::config::Config;
use crate::error::{FsError, Result};
use crate::image;
use crate::index::NameIndex;
use crate::table::{FileName, FileRecord, FileTable};

/// Summary of one active file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: usize,
    pub block_count: usize,
    pub blocks: Vec<u32>,
}

impl From<&FileRecord> for FileInfo {
    fn from(record: &FileRecord) -> Self {
        Self {
            name: record.name().to_string(),
            size: record.size(),
            block_count: record.block_count(),
            blocks: record.blocks().to_vec(),
        }
    }
}

/// The block file store
///
/// ## Consistency Model
/// Every public operation either completes fully or leaves all three
/// components exactly as they were. There is no internal locking; wrap the
/// engine in `SharedEngine` to use it from several threads.
///
/// ## Create Path
/// 1. Reject on table capacity, name, size, duplicate
/// 2. Allocate blocks
/// 3. Stage record in slot `file_count`
/// 4. Insert into index (release blocks and discard record on failure)
/// 5. Commit
#[derive(Debug, Clone)]
pub struct StorageEngine {
    config: Config,
    allocator: BlockAllocator,
    table: FileTable,
    index: NameIndex,
}

impl StorageEngine {
    /// Build an empty engine with the given geometry
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            allocator: BlockAllocator::new(config.max_blocks),
            table: FileTable::new(config.max_files, config.max_file_blocks, config.block_size),
            index: NameIndex::new(config.hashmap_size, config.max_index_nodes),
            config,
        })
    }

    /// Assemble an engine from already-decoded components
    ///
    /// Runs `verify_integrity` so an inconsistent combination is rejected.
    pub(crate) fn from_parts(
        config: Config,
        allocator: BlockAllocator,
        table: FileTable,
        index: NameIndex,
    ) -> Result<Self> {
        let engine = Self {
            config,
            allocator,
            table,
            index,
        };
        engine.verify_integrity()?;
        Ok(engine)
    }

    // =========================================================================
    // File Operations
    // =========================================================================

    /// Create a file of `size` bytes
    pub fn create(&mut self, name: &str, size: usize) -> Result<()> {
        // Step 1: Validate before allocating anything
        if self.table.is_full() {
            return Err(FsError::TableFull {
                capacity: self.table.capacity(),
            });
        }

        let file_name = FileName::new(name, self.config.max_name_len)?;

        let max = self.config.max_file_size();
        if size == 0 || size > max {
            return Err(FsError::InvalidSize { size, max });
        }

        if self.index.lookup(name).is_some() {
            return Err(FsError::DuplicateName(name.to_string()));
        }

        // Step 2: Grant blocks (all-or-nothing)
        let blocks = self.allocator.allocate(self.config.blocks_for(size))?;

        // Step 3: Stage the record
        let slot = match self.table.stage(file_name, size, &blocks) {
            Ok(slot) => slot,
            Err(e) => {
                self.allocator.release(&blocks);
                return Err(e);
            }
        };

        // Step 4: Index it, reclaiming vacant nodes first if needed
        if self.index.is_exhausted() {
            self.index.compact();
        }
        if let Err(e) = self.index.insert(file_name, slot as u32) {
            self.table.discard_staged();
            self.allocator.release(&blocks);
            return Err(e);
        }

        // Step 5: Activate
        self.table.commit();
        Ok(())
    }

    /// Overwrite `data.len()` bytes of `name` starting at `offset`
    pub fn write(&mut self, name: &str, offset: usize, data: &[u8]) -> Result<()> {
        let slot = self.slot_of(name)?;
        self.table
            .get_mut(slot)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?
            .write_at(offset, data)
    }

    /// Borrow exactly `len` bytes of `name` starting at `offset`
    pub fn read(&self, name: &str, offset: usize, len: usize) -> Result<&[u8]> {
        self.record(name)?.read_at(offset, len)
    }

    /// Delete `name`, releasing its blocks
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let slot = self.slot_of(name)?;

        let record = self
            .table
            .get(slot)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        self.allocator.release(record.blocks());

        self.index.remove(name);

        // The last record now lives in `slot`; its index entry must follow
        if let Some(moved) = self.table.swap_remove(slot) {
            self.index.update(moved.as_str(), slot as u32);
        }

        Ok(())
    }

    /// Every active file, in slot order
    pub fn list(&self) -> Vec<FileInfo> {
        self.table.iter().map(|(_, record)| record.into()).collect()
    }

    /// Summary of a single file
    pub fn stat(&self, name: &str) -> Result<FileInfo> {
        self.record(name).map(FileInfo::from)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.lookup(name).is_some()
    }

    /// Drop every file and return to the freshly constructed state
    pub fn reset(&mut self) {
        self.allocator.reset();
        self.table.reset();
        self.index.reset();
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Serialize the whole engine into an image
    pub fn save(&self) -> Result<Vec<u8>> {
        image::encode(self)
    }

    /// Build a new engine from an image, using the geometry it records
    pub fn load(bytes: &[u8]) -> Result<Self> {
        image::decode(bytes)
    }

    /// Replace this engine's state with an image of the same geometry
    ///
    /// On failure the engine is left freshly reset, never half-loaded.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<()> {
        let restored = image::decode(bytes).and_then(|engine| {
            if engine.config.same_geometry(&self.config) {
                Ok(engine)
            } else {
                Err(FsError::CorruptImage(
                    "image geometry differs from engine configuration".to_string(),
                ))
            }
        });

        match restored {
            Ok(engine) => {
                let image_path = std::mem::take(&mut self.config.image_path);
                *self = engine;
                self.config.image_path = image_path;
                Ok(())
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Write an image to `path`
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        image::write_image(path, &self.save()?)
    }

    /// Build a new engine from the image file at `path`
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let bytes = image::read_image(path)?;
        let mut engine = Self::load(&bytes)?;
        engine.config.image_path = path.to_path_buf();
        Ok(engine)
    }

    /// Replace this engine's state with the image file at `path`
    ///
    /// An unreadable file leaves the engine untouched; an invalid image
    /// resets it, as with `restore`.
    pub fn restore_from_path(&mut self, path: &Path) -> Result<()> {
        let bytes = image::read_image(path)?;
        self.restore(&bytes)
    }

    // =========================================================================
    // Integrity
    // =========================================================================

    /// Check every cross-component invariant
    ///
    /// - each active record has a valid name and `ceil(size / B)` blocks
    /// - every owned block is in range, marked used, and owned once
    /// - the bitmap marks nothing else
    /// - the index maps exactly the active names to their current slots
    pub fn verify_integrity(&self) -> Result<()> {
        let corrupt = |msg: String| Err(FsError::CorruptImage(msg));
        let mut owner: Vec<Option<usize>> = vec![None; self.allocator.capacity()];
        let mut owned = 0usize;

        for (slot, record) in self.table.iter() {
            if record.is_vacant() {
                return corrupt(format!("active slot {} has no name", slot));
            }
            if record.size() == 0 || record.size() > self.config.max_file_size() {
                return corrupt(format!("slot {} has invalid size {}", slot, record.size()));
            }
            if record.block_count() != self.config.blocks_for(record.size()) {
                return corrupt(format!(
                    "slot {} owns {} blocks for {} bytes",
                    slot,
                    record.block_count(),
                    record.size()
                ));
            }

            for &block in record.blocks() {
                let Some(entry) = owner.get_mut(block as usize) else {
                    return corrupt(format!("slot {} owns out-of-range block {}", slot, block));
                };
                if let Some(other) = entry.replace(slot) {
                    return corrupt(format!("block {} owned by slots {} and {}", block, other, slot));
                }
                if !self.allocator.is_used(block) {
                    return corrupt(format!("block {} owned by slot {} but marked free", block, slot));
                }
                owned += 1;
            }

            match self.index.lookup(record.name().as_str()) {
                Some(indexed) if indexed as usize == slot => {}
                Some(indexed) => {
                    return corrupt(format!(
                        "index maps {} to slot {}, table has it at {}",
                        record.name(),
                        indexed,
                        slot
                    ))
                }
                None => return corrupt(format!("{} missing from index", record.name())),
            }
        }

        if owned != self.allocator.used_count() {
            return corrupt(format!(
                "bitmap marks {} blocks, files own {}",
                self.allocator.used_count(),
                owned
            ));
        }

        if self.index.len() != self.table.len() {
            return corrupt(format!(
                "index holds {} names for {} files",
                self.index.len(),
                self.table.len()
            ));
        }

        Ok(())
    }

    fn slot_of(&self, name: &str) -> Result<usize> {
        self.index
            .lookup(name)
            .map(|slot| slot as usize)
            .ok_or_else(|| FsError::NotFound(name.to_string()))
    }

    fn record(&self, name: &str) -> Result<&FileRecord> {
        let slot = self.slot_of(name)?;
        self.table
            .get(slot)
            .ok_or_else(|| FsError::NotFound(name.to_string()))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn file_count(&self) -> usize {
        self.table.len()
    }

    pub fn free_blocks(&self) -> usize {
        self.allocator.free_count()
    }

    pub fn used_blocks(&self) -> usize {
        self.allocator.used_count()
    }

    pub fn allocator(&self) -> &BlockAllocator {
        &self.allocator
    }

    pub fn table(&self) -> &FileTable {
        &self.table
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }
}
