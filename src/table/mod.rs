//! File Table Module
//!
//! Fixed-capacity array of file records.
//!
//! ## Responsibilities
//! - Preallocate every slot (name field, block list, data buffer) up front
//! - Keep slots `[0, len)` populated and every other slot zeroed
//! - Delete by swap-with-last, reporting which record moved
//!
//! ## Slot Layout
//! ```text
//! ┌──────────────┬──────────┬──────────────────┬──────────────────────────┐
//! │ name (100)   │ size     │ blocks (≤ max)   │ data (max blocks × B)    │
//! └──────────────┴──────────┴──────────────────┴──────────────────────────┘
//! ```

mod name;
mod record;
mod file_table;

pub use name::FileName;
pub use record::FileRecord;
pub use file_table::FileTable;

/// Width of the inline name field in bytes
pub const NAME_FIELD_LEN: usize = 100;
