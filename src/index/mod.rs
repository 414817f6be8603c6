//! Name Index Module
//!
//! Maps file names to File Table slots.
//!
//! ## Responsibilities
//! - Chained hash table with a fixed number of buckets
//! - Nodes live in a preallocated arena and link by index
//! - Removed nodes stay vacant until the arena is compacted
//!
//! ## Structure
//! ```text
//! buckets                arena
//! ┌─────┐               ┌──────────────────────────────┐
//! │ 0 ──┼──────────────▶│ 2: "b.txt" slot 1 next ─┐     │
//! │ 1   │               │ 0: "a.txt" slot 0 next ∅◀─┘   │
//! │ ... │               │ 1: (vacant)                   │
//! └─────┘               └──────────────────────────────┘
//! ```
//!
//! ## Hash Function
//! Sum of the name's bytes modulo the bucket count. Collisions are common
//! and handled by the chains.

mod arena;
mod name_index;

pub use arena::IndexNode;
pub use name_index::NameIndex;

/// Bucket for `name` in a table of `buckets` heads
pub fn hash(name: &[u8], buckets: usize) -> usize {
    let sum = name.iter().fold(0usize, |acc, &b| acc.wrapping_add(b as usize));
    sum % buckets
}
