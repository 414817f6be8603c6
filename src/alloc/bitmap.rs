//! Block bitmap
//!
//! Packed occupancy flags, one bit per block.

const WORD_BITS: usize = 64;

/// Fixed-length occupancy bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBitmap {
    words: Vec<u64>,
    len: usize,
}

impl BlockBitmap {
    /// Create a bitmap of `len` free blocks
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Number of tracked blocks
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether block `index` is occupied (out of range reads as free)
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        let (word, bit) = Self::locate(index);
        self.words[word] & (1u64 << bit) != 0
    }

    /// Mark block `index` occupied. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize) {
        if index < self.len {
            let (word, bit) = Self::locate(index);
            self.words[word] |= 1u64 << bit;
        }
    }

    /// Mark block `index` free. Out-of-range indices are ignored.
    pub fn clear(&mut self, index: usize) {
        if index < self.len {
            let (word, bit) = Self::locate(index);
            self.words[word] &= !(1u64 << bit);
        }
    }

    /// Free every block
    pub fn clear_all(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Number of occupied blocks
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of free blocks in ascending order
    pub fn iter_free(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| !self.get(i))
    }

    /// Indices of occupied blocks in ascending order
    pub fn iter_used(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(w * WORD_BITS + bit)
            })
        })
    }

    fn locate(index: usize) -> (usize, usize) {
        (index / WORD_BITS, index % WORD_BITS)
    }
}
