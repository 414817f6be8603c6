//! # BlockFS
//!
//! An in-memory block file store with:
//! - A fixed pool of simulated blocks tracked by an occupancy bitmap
//! - A fixed-capacity file table with inline data buffers
//! - A chained hash index over an arena of index-linked nodes
//! - Whole-engine binary images for save/load
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Shell (command interpreter)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one engine call per command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    StorageEngine                             │
//! │        (create / write / read / delete / list)               │
//! └──────┬──────────────────┬──────────────────┬────────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//! ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//! │  Allocator  │   │  File Table  │   │ Name Index  │
//! │  (bitmap)   │   │   (slots)    │   │   (arena)   │
//! └─────────────┘   └──────────────┘   └─────────────┘
//!                          │
//!                          ▼
//!                   ┌─────────────┐
//!                   │    Image    │
//!                   │ (save/load) │
//!                   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod alloc;
pub mod index;
pub mod table;
pub mod image;
pub mod engine;
pub mod shared;
pub mod shell;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FsError, Result};
pub use config::Config;
pub use engine::{FileInfo, StorageEngine};
pub use shared::SharedEngine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of BlockFS
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
