//! # Composition Bitmask
//!
//! A word-vector bitset where bit *i* is set when component type *i* is
//! present. The width follows the world's configured component capacity,
//! so the type ceiling is a sizing parameter rather than a fixed `u32`.
//!
//! Masks of different widths compare as if zero-padded, which keeps masks
//! built before and after a capacity change interchangeable.

use std::fmt;

const WORD_BITS: usize = 64;

/// Bitset summarising a set of component types.
#[derive(Clone, Default)]
pub struct BitMask {
    /// 64 component slots per word.
    words: Vec<u64>,
}

impl BitMask {
    /// Creates an empty mask.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Creates an empty mask with room for `bits` slots without reallocating.
    #[must_use]
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(WORD_BITS)],
        }
    }

    /// Sets the bit for slot `index`, growing the mask if needed.
    #[inline]
    pub fn set(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (index % WORD_BITS);
    }

    /// Clears the bit for slot `index`.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        if let Some(word) = self.words.get_mut(index / WORD_BITS) {
            *word &= !(1u64 << (index % WORD_BITS));
        }
    }

    /// Clears every bit, keeping the allocation.
    pub fn reset(&mut self) {
        for word in &mut self.words {
            *word = 0;
        }
    }

    /// Returns true if the bit for slot `index` is set.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        (self.word(index / WORD_BITS) >> (index % WORD_BITS)) & 1 == 1
    }

    /// Returns true if no bit is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of set bits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if every bit set in `other` is also set in `self`,
    /// i.e. `(self & other) == other`.
    #[must_use]
    pub fn contains_all(&self, other: &BitMask) -> bool {
        other
            .words
            .iter()
            .enumerate()
            .all(|(i, &w)| self.word(i) & w == w)
    }

    /// Returns true if `self` and `other` share at least one set bit.
    #[must_use]
    pub fn intersects(&self, other: &BitMask) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(&a, &b)| a & b != 0)
    }

    /// Iterates over the indices of set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(word_idx, &word)| {
            let mut remaining = word;
            std::iter::from_fn(move || {
                if remaining == 0 {
                    return None;
                }
                let bit = remaining.trailing_zeros() as usize;
                remaining &= remaining - 1;
                Some(word_idx * WORD_BITS + bit)
            })
        })
    }

    #[inline]
    fn word(&self, index: usize) -> u64 {
        self.words.get(index).copied().unwrap_or(0)
    }
}

impl PartialEq for BitMask {
    fn eq(&self, other: &Self) -> bool {
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| self.word(i) == other.word(i))
    }
}

impl Eq for BitMask {}

impl FromIterator<usize> for BitMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut mask = Self::new();
        for index in iter {
            mask.set(index);
        }
        mask
    }
}

impl fmt::Debug for BitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter_ones()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clear_contains() {
        let mut mask = BitMask::with_capacity(32);
        assert!(mask.is_empty());

        mask.set(5);
        mask.set(31);
        assert!(mask.contains(5));
        assert!(mask.contains(31));
        assert!(!mask.contains(6));
        assert_eq!(mask.count(), 2);

        mask.clear(5);
        assert!(!mask.contains(5));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn test_grows_past_first_word() {
        let mut mask = BitMask::new();
        mask.set(100);
        assert!(mask.contains(100));
        assert!(!mask.contains(36));
        assert_eq!(mask.iter_ones().collect::<Vec<_>>(), vec![100]);
    }

    #[test]
    fn test_equality_ignores_width() {
        let narrow: BitMask = [1, 3].into_iter().collect();
        let mut wide = BitMask::with_capacity(256);
        wide.set(1);
        wide.set(3);
        assert_eq!(narrow, wide);

        wide.set(200);
        assert_ne!(narrow, wide);
    }

    #[test]
    fn test_contains_all_and_intersects() {
        let bits: BitMask = [0, 1, 2].into_iter().collect();
        let required: BitMask = [0, 2].into_iter().collect();
        let other: BitMask = [3, 70].into_iter().collect();

        assert!(bits.contains_all(&required));
        assert!(!required.contains_all(&bits));
        assert!(bits.contains_all(&BitMask::new()));
        assert!(bits.intersects(&required));
        assert!(!bits.intersects(&other));
    }

    #[test]
    fn test_reset_keeps_width() {
        let mut mask: BitMask = [4, 65].into_iter().collect();
        mask.reset();
        assert!(mask.is_empty());
        assert_eq!(mask, BitMask::new());
    }
}
