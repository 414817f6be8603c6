//! Configuration for BlockFS
//!
//! Centralized geometry with the classic defaults: 100 blocks of 512 bytes,
//! 10 files of at most 10 blocks each, 256 hash buckets.

use std::path::PathBuf;

use crate::error::{FsError, Result};
use crate::table::NAME_FIELD_LEN;

/// Largest accepted index arena capacity
pub const MAX_INDEX_NODES: usize = 1 << 20;

/// Main configuration for a BlockFS engine
///
/// Every bound is fixed when the engine is constructed and never grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Block Pool
    // -------------------------------------------------------------------------
    /// Size of one simulated block in bytes
    pub block_size: usize,

    /// Number of blocks in the shared pool
    pub max_blocks: usize,

    // -------------------------------------------------------------------------
    // File Table
    // -------------------------------------------------------------------------
    /// Number of file slots
    pub max_files: usize,

    /// Largest number of blocks a single file may own
    /// (the inline buffer of each slot is `max_file_blocks * block_size`)
    pub max_file_blocks: usize,

    /// Longest accepted file name in bytes (at most `NAME_FIELD_LEN`)
    pub max_name_len: usize,

    // -------------------------------------------------------------------------
    // Name Index
    // -------------------------------------------------------------------------
    /// Number of hash buckets
    pub hashmap_size: usize,

    /// Capacity of the index node arena
    pub max_index_nodes: usize,

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------
    /// Default image file used by `SAVE`/`LOAD` without an argument
    pub image_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: 512,
            max_blocks: 100,
            max_files: 10,
            max_file_blocks: 10,
            max_name_len: NAME_FIELD_LEN,
            hashmap_size: 256,
            max_index_nodes: 64,
            image_path: PathBuf::from("./blockfs.img"),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Largest file size in bytes
    pub fn max_file_size(&self) -> usize {
        self.max_file_blocks * self.block_size
    }

    /// Number of blocks needed to hold `size` bytes
    pub fn blocks_for(&self, size: usize) -> usize {
        size.div_ceil(self.block_size)
    }

    /// Check that every bound is usable and fits the image's `u32` fields
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("block_size", self.block_size),
            ("max_blocks", self.max_blocks),
            ("max_files", self.max_files),
            ("max_file_blocks", self.max_file_blocks),
            ("max_name_len", self.max_name_len),
            ("hashmap_size", self.hashmap_size),
            ("max_index_nodes", self.max_index_nodes),
        ];

        for (name, value) in fields {
            if value == 0 {
                return Err(FsError::Config(format!("{} must be non-zero", name)));
            }
            // u32::MAX is reserved as the "none" marker in images
            if value >= u32::MAX as usize {
                return Err(FsError::Config(format!("{} too large: {}", name, value)));
            }
        }

        if self.max_name_len > NAME_FIELD_LEN {
            return Err(FsError::Config(format!(
                "max_name_len {} exceeds name field of {} bytes",
                self.max_name_len, NAME_FIELD_LEN
            )));
        }

        if self.max_file_blocks > self.max_blocks {
            return Err(FsError::Config(format!(
                "max_file_blocks {} exceeds max_blocks {}",
                self.max_file_blocks, self.max_blocks
            )));
        }

        if self.max_index_nodes > MAX_INDEX_NODES {
            return Err(FsError::Config(format!(
                "max_index_nodes {} exceeds limit of {}",
                self.max_index_nodes, MAX_INDEX_NODES
            )));
        }

        // File sizes are stored as u32 in images
        match self.block_size.checked_mul(self.max_file_blocks) {
            Some(max_size) if max_size < u32::MAX as usize => {}
            _ => {
                return Err(FsError::Config(format!(
                    "file size limit {} x {} bytes does not fit an image size field",
                    self.max_file_blocks, self.block_size
                )))
            }
        }

        Ok(())
    }

    /// True when both configs describe the same image layout
    pub fn same_geometry(&self, other: &Config) -> bool {
        self.block_size == other.block_size
            && self.max_blocks == other.max_blocks
            && self.max_files == other.max_files
            && self.max_file_blocks == other.max_file_blocks
            && self.max_name_len == other.max_name_len
            && self.hashmap_size == other.hashmap_size
            && self.max_index_nodes == other.max_index_nodes
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the block size (in bytes)
    pub fn block_size(mut self, bytes: usize) -> Self {
        self.config.block_size = bytes;
        self
    }

    /// Set the number of blocks in the pool
    pub fn max_blocks(mut self, count: usize) -> Self {
        self.config.max_blocks = count;
        self
    }

    /// Set the number of file slots
    pub fn max_files(mut self, count: usize) -> Self {
        self.config.max_files = count;
        self
    }

    /// Set the per-file block limit
    pub fn max_file_blocks(mut self, count: usize) -> Self {
        self.config.max_file_blocks = count;
        self
    }

    /// Set the longest accepted name (in bytes)
    pub fn max_name_len(mut self, len: usize) -> Self {
        self.config.max_name_len = len;
        self
    }

    /// Set the number of hash buckets
    pub fn hashmap_size(mut self, buckets: usize) -> Self {
        self.config.hashmap_size = buckets;
        self
    }

    /// Set the index arena capacity
    pub fn max_index_nodes(mut self, count: usize) -> Self {
        self.config.max_index_nodes = count;
        self
    }

    /// Set the default image path
    pub fn image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.image_path = path.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
