//! Inline file names
//!
//! Names live in a fixed-width, zero-padded field so neither table slots nor
//! index nodes allocate per name.

use std::fmt;

use crate::error::{FsError, Result};

use super::NAME_FIELD_LEN;

/// A validated file name stored inline
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileName {
    bytes: [u8; NAME_FIELD_LEN],
    len: u8,
}

impl FileName {
    /// The empty name, used by vacant slots and nodes
    pub const EMPTY: FileName = FileName {
        bytes: [0; NAME_FIELD_LEN],
        len: 0,
    };

    /// Validate and copy `name`
    ///
    /// Rejects empty names and names containing NUL, whitespace or control
    /// characters with `InvalidName`; names longer than `max_len` bytes with
    /// `NameTooLong`.
    pub fn new(name: &str, max_len: usize) -> Result<Self> {
        if name.is_empty() {
            return Err(FsError::InvalidName(name.to_string()));
        }

        let max = max_len.min(NAME_FIELD_LEN);
        if name.len() > max {
            return Err(FsError::NameTooLong {
                len: name.len(),
                max,
            });
        }

        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(FsError::InvalidName(name.to_string()));
        }

        let mut bytes = [0u8; NAME_FIELD_LEN];
        bytes[..name.len()].copy_from_slice(name.as_bytes());

        Ok(Self {
            bytes,
            len: name.len() as u8,
        })
    }

    /// Parse a zero-padded name field read from an image
    ///
    /// An all-zero field yields `FileName::EMPTY`. Returns `None` when the
    /// padding is not all zero or the name is not valid UTF-8.
    pub fn from_field(field: &[u8; NAME_FIELD_LEN]) -> Option<Self> {
        let len = field.iter().position(|&b| b == 0).unwrap_or(NAME_FIELD_LEN);

        if field[len..].iter().any(|&b| b != 0) {
            return None;
        }
        let name = std::str::from_utf8(&field[..len]).ok()?;
        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return None;
        }

        Some(Self {
            bytes: *field,
            len: len as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn as_str(&self) -> &str {
        // Both constructors only admit UTF-8
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// The full zero-padded field
    pub fn field(&self) -> &[u8; NAME_FIELD_LEN] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Compare against a raw name without constructing a `FileName`
    pub fn matches(&self, name: &[u8]) -> bool {
        self.as_bytes() == name
    }
}

impl Default for FileName {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileName({:?})", self.as_str())
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
