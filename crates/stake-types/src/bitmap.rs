//! Fixed-capacity bitmap over transaction input/output indices.

use std::fmt;

use bitvec::prelude::*;
use zeroize::Zeroize;

use crate::{constants::MAX_SIGNABLE_INPUTS, BitmapError};

const BITMAP_BYTES: usize = MAX_SIGNABLE_INPUTS / 8;

/// Bitmap where bit `i` is set if index `i` is a member.
///
/// Capacity is fixed at [`IndexBitmap::CAPACITY`]. Every access is bounds
/// checked and an index past the capacity is an error, never a silent drop.
/// Bit order matches the host's bitvectors: bit `i % 8` of byte `i / 8`.
#[derive(Clone, PartialEq, Eq)]
pub struct IndexBitmap {
    bits: BitArray<[u8; BITMAP_BYTES], Lsb0>,
}

impl IndexBitmap {
    pub const CAPACITY: usize = MAX_SIGNABLE_INPUTS;

    pub fn new() -> Self {
        Self {
            bits: BitArray::new([0u8; BITMAP_BYTES]),
        }
    }

    /// Builds a bitmap with the given indices set.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Result<Self, BitmapError> {
        let mut bitmap = Self::new();
        for idx in indices {
            bitmap.set(idx, true)?;
        }
        Ok(bitmap)
    }

    /// Wraps raw host bitvector bytes.
    pub fn from_bytes(bytes: [u8; BITMAP_BYTES]) -> Self {
        Self {
            bits: BitArray::new(bytes),
        }
    }

    pub fn get(&self, idx: usize) -> Result<bool, BitmapError> {
        self.bits
            .get(idx)
            .map(|bit| *bit)
            .ok_or(BitmapError::IndexOutOfRange {
                index: idx,
                capacity: Self::CAPACITY,
            })
    }

    pub fn set(&mut self, idx: usize, value: bool) -> Result<(), BitmapError> {
        if idx >= Self::CAPACITY {
            return Err(BitmapError::IndexOutOfRange {
                index: idx,
                capacity: Self::CAPACITY,
            });
        }
        self.bits.set(idx, value);
        Ok(())
    }

    /// Set indices in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }
}

impl Default for IndexBitmap {
    fn default() -> Self {
        Self::new()
    }
}

impl Zeroize for IndexBitmap {
    fn zeroize(&mut self) {
        self.bits.as_raw_mut_slice().zeroize();
    }
}

impl fmt::Debug for IndexBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter_ones()).finish()
    }
}
