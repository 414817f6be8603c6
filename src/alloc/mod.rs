//! Block Allocator Module
//!
//! Owns the occupancy bitmap over the simulated block pool.
//!
//! ## Responsibilities
//! - Grant blocks first-fit, lowest index first
//! - All-or-nothing: a failed grant marks nothing
//! - Idempotent release
//!
//! ## Bitmap Layout
//! ```text
//! word 0                      word 1
//! ┌──────────────────────┐    ┌──────────────────────┐
//! │ bit 63 ... bit 1 bit0│    │ bit 127 ...   bit 64 │ ...
//! └──────────────────────┘    └──────────────────────┘
//! bit i set  <=>  block i owned by exactly one file
//! ```

mod bitmap;
mod allocator;

pub use bitmap::BlockBitmap;
pub use allocator::BlockAllocator;
