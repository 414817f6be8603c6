//! Image Module
//!
//! Whole-engine snapshot format and file helpers.
//!
//! ## Image Format (little-endian)
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Header (34 bytes, bincode fixint)                           │
//! │   Magic "BFSI" (4) | Version u16 | 7 × u32 geometry         │
//! ├─────────────────────────────────────────────────────────────┤
//! │ File Table: max_files × record (vacant slots included)      │
//! │   Name [100] | Size u32 | BlockCount u32                    │
//! │   Blocks max_file_blocks × u32 | Data max_file_blocks × B   │
//! ├─────────────────────────────────────────────────────────────┤
//! │ ActiveFileCount u32                                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Bitmap: max_blocks × u32 (0 | 1)                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │ NodeCount u32                                               │
//! │ Nodes: NodeCount × { Name [100] | Slot u32 | Next u32 }     │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Buckets: hashmap_size × u32                                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │ CRC32 of everything above (4)                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `u32::MAX` encodes "none" for node slots, node links and bucket heads.

mod header;
mod codec;
mod file;

pub use header::{ImageHeader, HEADER_SIZE, MAGIC, VERSION};
pub use codec::{decode, encode, image_size};
pub use file::{read_image, write_image};

/// Wire marker for an absent index or link
pub(crate) const NONE_MARKER: u32 = u32::MAX;
