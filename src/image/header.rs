//! Image header
//!
//! Magic, version and the geometry the rest of the image is laid out with.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{FsError, Result};

/// Magic bytes identifying a BlockFS image
pub const MAGIC: [u8; 4] = *b"BFSI";

/// Current image format version
pub const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + 7 geometry fields × 4 = 34 bytes
pub const HEADER_SIZE: usize = 34;

/// Fixed-width image header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub block_size: u32,
    pub max_blocks: u32,
    pub max_files: u32,
    pub max_file_blocks: u32,
    pub hashmap_size: u32,
    pub max_index_nodes: u32,
    pub max_name_len: u32,
}

impl ImageHeader {
    /// Header describing `config`'s geometry
    pub fn for_config(config: &Config) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            block_size: config.block_size as u32,
            max_blocks: config.max_blocks as u32,
            max_files: config.max_files as u32,
            max_file_blocks: config.max_file_blocks as u32,
            hashmap_size: config.hashmap_size as u32,
            max_index_nodes: config.max_index_nodes as u32,
            max_name_len: config.max_name_len as u32,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Parse and check magic and version
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(FsError::CorruptImage(format!(
                "image of {} bytes is shorter than the {} byte header",
                bytes.len(),
                HEADER_SIZE
            )));
        }

        let header: ImageHeader = bincode::deserialize(&bytes[..HEADER_SIZE])
            .map_err(|e| FsError::CorruptImage(format!("unreadable header: {}", e)))?;

        if header.magic != MAGIC {
            return Err(FsError::CorruptImage(format!(
                "bad magic {:02x?}",
                header.magic
            )));
        }
        if header.version != VERSION {
            return Err(FsError::CorruptImage(format!(
                "unsupported image version {}",
                header.version
            )));
        }

        Ok(header)
    }

    /// Geometry as a validated `Config` (default image path)
    pub fn to_config(&self) -> Result<Config> {
        let config = Config::builder()
            .block_size(self.block_size as usize)
            .max_blocks(self.max_blocks as usize)
            .max_files(self.max_files as usize)
            .max_file_blocks(self.max_file_blocks as usize)
            .hashmap_size(self.hashmap_size as usize)
            .max_index_nodes(self.max_index_nodes as usize)
            .max_name_len(self.max_name_len as usize)
            .build();

        config
            .validate()
            .map_err(|e| FsError::CorruptImage(format!("invalid geometry: {}", e)))?;
        Ok(config)
    }
}
