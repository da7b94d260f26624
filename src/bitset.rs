//! Runtime-sized bit set for edge masks and fingerprints.
//!
//! Each bit corresponds to an edge sequence number. The graph-wide
//! satisfaction fingerprint, and the satisfied/unsatisfied masks of every
//! value class, are all `BitSet`s indexed the same way.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A simple bit set backed by a vector of u64 words.
///
/// The set grows as needed when inserting bits beyond the current capacity.
/// Equality and hashing ignore trailing zero words, so two sets with the same
/// members compare equal regardless of their capacity.
#[derive(Debug, Clone, Default)]
pub struct BitSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
}

impl BitSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates a new empty bit set with the given capacity (in bits).
    pub fn new(capacity: usize) -> Self {
        let num_words = capacity.div_ceil(Self::BITS_PER_WORD);
        Self {
            words: vec![0; num_words],
        }
    }

    /// Creates an empty bit set with no pre-allocated capacity.
    pub fn empty() -> Self {
        Self { words: Vec::new() }
    }

    /// Returns the number of set bits.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns the capacity in bits.
    pub fn capacity(&self) -> usize {
        self.words.len() * Self::BITS_PER_WORD
    }

    /// Gets the word index and bit position for a given bit index.
    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// Returns true if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        match self.words.get(word_idx) {
            Some(word) => word & (1u64 << bit_idx) != 0,
            None => false,
        }
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    pub fn insert(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);

        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }

        let mask = 1u64 << bit_idx;
        let was_clear = self.words[word_idx] & mask == 0;
        self.words[word_idx] |= mask;
        was_clear
    }

    /// Clears the bit at the given index. Returns true if the bit was previously set.
    pub fn remove(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);

        let Some(word) = self.words.get_mut(word_idx) else {
            return false;
        };
        let mask = 1u64 << bit_idx;
        let was_set = *word & mask != 0;
        *word &= !mask;
        was_set
    }

    /// Sets or clears the bit at the given index.
    pub fn set(&mut self, index: usize, value: bool) {
        if value {
            self.insert(index);
        } else {
            self.remove(index);
        }
    }

    /// Clears all bits.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// `self ∪= other`
    pub fn union_with(&mut self, other: &BitSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w |= o;
        }
    }

    /// `self \= other`
    pub fn difference_with(&mut self, other: &BitSet) {
        for (w, o) in self.words.iter_mut().zip(&other.words) {
            *w &= !o;
        }
    }

    /// Returns true if every bit of `self` is also set in `other`.
    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.words.iter().enumerate().all(|(k, &w)| {
            let o = other.words.get(k).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    /// Returns an iterator over all set bit indices.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Words without trailing zeros.
    fn significant_words(&self) -> &[u64] {
        let len = self.words.iter().rposition(|&w| w != 0).map_or(0, |k| k + 1);
        &self.words[..len]
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        self.significant_words() == other.significant_words()
    }
}

impl Eq for BitSet {}

impl Hash for BitSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_words().hash(state);
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut bs = BitSet::empty();
        bs.extend(iter);
        bs
    }
}

impl Extend<usize> for BitSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for index in iter {
            self.insert(index);
        }
    }
}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (k, index) in self.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "}}")
    }
}

/// Iterator over set bits in a BitSet.
pub struct BitSetIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn test_empty() {
        let bs = BitSet::empty();
        assert!(bs.is_empty());
        assert_eq!(bs.len(), 0);
        assert!(!bs.contains(0));
        assert!(!bs.contains(100));
    }

    #[test]
    fn test_insert_remove() {
        let mut bs = BitSet::new(100);
        assert!(bs.insert(42));
        assert!(!bs.insert(42));
        assert!(bs.contains(42));
        assert_eq!(bs.len(), 1);
        assert!(bs.remove(42));
        assert!(!bs.remove(42));
        assert!(bs.is_empty());
    }

    #[test]
    fn test_set() {
        let mut bs = BitSet::new(8);
        bs.set(3, true);
        assert!(bs.contains(3));
        bs.set(3, false);
        assert!(!bs.contains(3));
    }

    #[test]
    fn test_auto_grow() {
        let mut bs = BitSet::empty();
        bs.insert(1000);
        assert!(bs.contains(1000));
        assert!(bs.capacity() >= 1001);
    }

    #[test]
    fn test_iter() {
        let bs: BitSet = [5, 10, 3, 64, 65].into_iter().collect();
        let indices: Vec<_> = bs.iter().collect();
        assert_eq!(indices, vec![3, 5, 10, 64, 65]);
    }

    #[test]
    fn test_union_difference() {
        let mut a: BitSet = [0, 1].into_iter().collect();
        let b: BitSet = [1, 70].into_iter().collect();
        a.union_with(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![0, 1, 70]);
        let c: BitSet = [1].into_iter().collect();
        a.difference_with(&c);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![0, 70]);
    }

    #[test]
    fn test_subset() {
        let a: BitSet = [1, 2].into_iter().collect();
        let b: BitSet = [1, 2, 3].into_iter().collect();
        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));
        assert!(BitSet::empty().is_subset(&a));
    }

    #[test]
    fn test_eq_ignores_capacity() {
        let mut a = BitSet::new(256);
        a.insert(2);
        let b: BitSet = [2].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(BitSet::new(128), BitSet::empty());

        let mut seen = HashSet::new();
        seen.insert(a);
        assert!(seen.contains(&b));
    }

    #[test]
    fn test_display() {
        let bs: BitSet = [0, 2].into_iter().collect();
        assert_eq!(bs.to_string(), "{0, 2}");
        assert_eq!(BitSet::empty().to_string(), "{}");
    }
}
