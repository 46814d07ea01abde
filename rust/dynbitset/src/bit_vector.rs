//! A fixed-length vector of bits whose size is chosen at construction time.

use std::ops::{
    BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Shl, ShlAssign, Shr,
    ShrAssign,
};

/// A fixed-length bit vector with `[u64]` storage, set algebra, shifts and
/// forward bit scanning.
///
/// `BitVector` packs `len` logical bits into `len.div_ceil(64)` words owned
/// exclusively by the instance. The length is fixed for the lifetime of the
/// object; there is no growth or truncation after construction.
///
/// # Storage Format
///
/// Bits are stored in little-endian order within an array of `u64` words:
/// - Bit 0 is the least significant bit (LSB) of the first word
/// - Bit 63 is the most significant bit (MSB) of the first word
/// - Bit 64 is the LSB of the second word, and so on
///
/// Any bits beyond the vector's length in the final word are guaranteed to
/// be 0 after every whole-vector operation, so `count_ones()`, `any()` and
/// the scanning operations never observe positions outside `[0, len)`.
///
/// # Contract
///
/// Operations that combine two vectors (`&`, `|`, `^` and their assign
/// forms) panic when the operand lengths differ, in every build profile.
/// Single-bit operations (`set`, `reset`, `flip`, `set_value`, `contains`,
/// `find_next`) require `index < len`; the requirement is checked with
/// `debug_assert!` and is a documented precondition in release builds.
///
/// # Performance
///
/// - Individual bit access: O(1)
/// - Whole-vector operations (set algebra, shifts, counts): O(n/64)
/// - Scanning: O(set-bit-count + n/64) for a full enumeration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitVector {
    len: usize,
    words: Box<[u64]>,
}

impl BitVector {
    /// Creates a new bit vector with all bits set to 0.
    ///
    /// A length of zero is legal and allocates no storage.
    ///
    /// # Arguments
    ///
    /// * `len` - The number of bits in the vector
    pub fn empty(len: usize) -> BitVector {
        let count = len.div_ceil(64);
        BitVector {
            len,
            words: vec![0u64; count].into_boxed_slice(),
        }
    }

    /// Creates a new bit vector with all bits set to 1.
    ///
    /// # Arguments
    ///
    /// * `len` - The number of bits in the vector
    pub fn full(len: usize) -> BitVector {
        let count = len.div_ceil(64);
        let mut words = vec![u64::MAX; count].into_boxed_slice();
        Self::mask_tail(&mut words, len);
        BitVector { len, words }
    }

    /// Creates a new bit vector with bits set at the specified positions.
    ///
    /// # Arguments
    ///
    /// * `positions` - An iterator over bit indices to set to 1
    /// * `len` - The total number of bits in the vector
    ///
    /// # Panics
    ///
    /// Panics in debug builds if any position is `>= len`.
    pub fn from_positions(positions: impl Iterator<Item = usize>, len: usize) -> BitVector {
        let mut vec = BitVector::empty(len);
        for position in positions {
            vec.set(position);
        }
        vec
    }

    /// Creates a new bit vector from a slice of `u64` words in LSB order.
    ///
    /// The words are interpreted as raw bit storage: bit 0 is the LSB of the
    /// first word, bit 63 its MSB, bit 64 the LSB of the second word, and so
    /// on. Only the first `len.div_ceil(64)` words are consumed, and any bits
    /// beyond `len` are masked to 0.
    ///
    /// # Panics
    ///
    /// Panics if `len > words.len() * 64` (not enough words for `len` bits).
    pub fn from_lsb_words(words: &[u64], len: usize) -> BitVector {
        assert!(len <= words.len() * 64);
        let count = len.div_ceil(64);
        let mut bits = vec![0u64; count].into_boxed_slice();
        bits.copy_from_slice(&words[..count]);
        Self::mask_tail(&mut bits, len);
        BitVector { len, words: bits }
    }

    /// Creates a new bit vector from a slice of bytes in LSB order.
    ///
    /// The bytes are interpreted as raw bit storage: bit 0 is the LSB of the
    /// first byte, bit 7 its MSB, bit 8 the LSB of the second byte, and so
    /// on. Missing bytes are treated as zero; excess bytes are ignored.
    pub fn from_lsb_bytes(bytes: &[u8], len: usize) -> BitVector {
        let mut vec = BitVector::empty(len);
        let byte_len = len.div_ceil(8).min(bytes.len());
        if byte_len != 0 {
            bytemuck::cast_slice_mut::<u64, u8>(&mut vec.words)[..byte_len]
                .copy_from_slice(&bytes[..byte_len]);
        }
        Self::mask_tail(&mut vec.words, len);
        vec
    }

    /// Sets the bit at the given index to 1.
    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        self.words[word_index] |= 1u64 << bit_position;
    }

    /// Resets the bit at the given index to 0.
    #[inline]
    pub fn reset(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        self.words[word_index] &= !(1u64 << bit_position);
    }

    /// Flips the bit at the given index.
    #[inline]
    pub fn flip(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        self.words[word_index] ^= 1u64 << bit_position;
    }

    /// Sets the bit at the given index to the specified value.
    #[inline]
    pub fn set_value(&mut self, index: usize, value: bool) {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        let mask = 1u64 << bit_position;
        let word = &mut self.words[word_index];
        *word = (*word & !mask) | (mask & (-(value as i64) as u64));
    }

    /// Check if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        (self.words[word_index] & (1u64 << bit_position)) != 0
    }

    /// Clears all bits (sets all to 0).
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Sets all bits to 1.
    pub fn set_all(&mut self) {
        self.words.fill(u64::MAX);
        // Ensure the tail bits beyond len are properly masked
        let len = self.len;
        Self::mask_tail(&mut self.words, len);
    }

    /// Flips all bits in place (NOT operation).
    pub fn negate(&mut self) {
        for word in self.words.iter_mut() {
            *word = !*word;
        }
        // Complementing the tail word sets bits beyond len; mask them back
        let len = self.len;
        Self::mask_tail(&mut self.words, len);
    }

    /// Counts the number of set bits (1s) in the vector.
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }

    /// Counts the number of unset bits (0s) in the vector.
    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    /// Returns `true` if at least one bit is set.
    pub fn any(&self) -> bool {
        self.words.iter().any(|&word| word != 0)
    }

    /// Returns `true` if no bit is set.
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// Returns the position of the lowest-numbered set bit, or `None` if the
    /// vector is all-zero.
    pub fn find_first(&self) -> Option<usize> {
        for (word_index, &word) in self.words.iter().enumerate() {
            if word != 0 {
                return Some(word_index * 64 + word.trailing_zeros() as usize);
            }
        }
        None
    }

    /// Returns the position of the lowest-numbered set bit strictly greater
    /// than `index`, or `None` if no such bit exists.
    ///
    /// Starting from `find_first()` and repeatedly calling `find_next` with
    /// the previous result enumerates every set position in ascending order.
    pub fn find_next(&self, index: usize) -> Option<usize> {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let next = index + 1;
        if next >= self.len {
            return None;
        }
        let (word_index, bit_position) = Self::bit_position(next);
        // Remainder of the current word, with positions <= index masked off
        let word = self.words[word_index] & !((1u64 << bit_position) - 1);
        if word != 0 {
            return Some(word_index * 64 + word.trailing_zeros() as usize);
        }
        for (offset, &word) in self.words[word_index + 1..].iter().enumerate() {
            if word != 0 {
                return Some((word_index + 1 + offset) * 64 + word.trailing_zeros() as usize);
            }
        }
        None
    }

    /// Returns an iterator over the positions of set bits in the vector.
    ///
    /// The iterator yields the 0-based indices of all bits that are set to 1,
    /// in ascending order.
    pub fn iter(&self) -> SetBitsIter<'_> {
        SetBitsIter {
            words: self.words.iter(),
            current_word: 0,
            next_word_index: 0,
            base_index: 0,
            len: self.len,
        }
    }

    /// Returns the number of bits in the vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an immutable view of the underlying `u64` storage.
    ///
    /// The storage holds `len.div_ceil(64)` words in LSB order. Bits beyond
    /// the vector's length in the final word are guaranteed to be 0.
    #[inline]
    pub fn storage(&self) -> &[u64] {
        &self.words
    }

    /// Helper function that returns the word index and the bit position
    /// within that word for a given bit index in the vector.
    #[inline]
    fn bit_position(index: usize) -> (usize, usize) {
        let word_index = index / 64;
        let bit_position = index % 64;
        (word_index, bit_position)
    }

    /// Masks out any bits beyond the specified length in the storage.
    ///
    /// When `len` is not a multiple of 64 the final word has capacity for
    /// more bits than the vector logically holds; this zeroes those excess
    /// positions so counts and scans never see them.
    ///
    /// # Panics
    ///
    /// Panics if the storage size does not match `len.div_ceil(64)` words.
    #[inline]
    pub(crate) fn mask_tail(words: &mut [u64], len: usize) {
        let raw_len = words.len() * 64;
        assert!(raw_len >= len, "{raw_len} >= {len}");
        assert!(raw_len - len < 64, "{raw_len} - {len}");

        if len == 0 || words.is_empty() {
            return;
        }

        let partial = len % 64;
        // A word-aligned length leaves nothing to mask
        if partial == 0 {
            return;
        }

        let mask = (1u64 << partial) - 1;
        *words.last_mut().unwrap() &= mask;
    }

    /// Returns true if all bits beyond `len` in the last word are zero.
    #[inline]
    #[cfg(test)]
    pub(crate) fn is_tail_masked(words: &[u64], len: usize) -> bool {
        let raw_len = words.len() * 64;
        assert!(raw_len >= len, "{raw_len} >= {len}");
        assert!(raw_len - len < 64, "{raw_len} - {len}");

        if len == 0 || words.is_empty() {
            return true;
        }

        let partial = len % 64;
        if partial == 0 {
            return true;
        }

        let mask = (1u64 << partial) - 1;
        (words.last().unwrap() & !mask) == 0
    }

    /// Builds the left-shifted image of `self` in a fresh buffer.
    ///
    /// A shift by `k` splits into a whole-word displacement `k / 64` and a
    /// sub-word displacement `k % 64`. Each source word contributes its low
    /// part to the destination word at the same displaced index and, when the
    /// sub-word displacement is non-zero, carries its high `64 - rem` bits
    /// into the next destination word. Bits shifted past the end are
    /// discarded; a shift of `len` or more yields the all-zero vector.
    fn shifted_left(&self, shift: usize) -> BitVector {
        let mut result = BitVector::empty(self.len);
        if shift >= self.len {
            return result;
        }
        let block = shift / 64;
        let rem = shift % 64;
        let word_count = self.words.len();
        for i in block..word_count {
            let item = self.words[i - block];
            if rem == 0 {
                result.words[i] = item;
            } else {
                result.words[i] |= item << rem;
                if i + 1 < word_count {
                    result.words[i + 1] |= item >> (64 - rem);
                }
            }
        }
        Self::mask_tail(&mut result.words, self.len);
        result
    }

    /// Builds the right-shifted image of `self` in a fresh buffer.
    ///
    /// Mirror of [`Self::shifted_left`]: destination word `i` draws from
    /// source word `i + block`, taking its high part and, when the sub-word
    /// displacement is non-zero, carrying the low `64 - rem` bits of the
    /// source into destination word `i - 1`.
    fn shifted_right(&self, shift: usize) -> BitVector {
        let mut result = BitVector::empty(self.len);
        if shift >= self.len {
            return result;
        }
        let block = shift / 64;
        let rem = shift % 64;
        for i in (0..self.words.len() - block).rev() {
            let item = self.words[i + block];
            if rem == 0 {
                result.words[i] = item;
            } else {
                result.words[i] |= item >> rem;
                if i > 0 {
                    result.words[i - 1] |= item << (64 - rem);
                }
            }
        }
        Self::mask_tail(&mut result.words, self.len);
        result
    }
}

impl Shl<usize> for &BitVector {
    type Output = BitVector;

    fn shl(self, shift: usize) -> BitVector {
        self.shifted_left(shift)
    }
}

impl Shr<usize> for &BitVector {
    type Output = BitVector;

    fn shr(self, shift: usize) -> BitVector {
        self.shifted_right(shift)
    }
}

impl ShlAssign<usize> for BitVector {
    fn shl_assign(&mut self, shift: usize) {
        // Assemble the shifted image fully, then install it; the prior
        // buffer is released by the assignment.
        *self = self.shifted_left(shift);
    }
}

impl ShrAssign<usize> for BitVector {
    fn shr_assign(&mut self, shift: usize) {
        *self = self.shifted_right(shift);
    }
}

impl BitAnd<&BitVector> for &BitVector {
    type Output = BitVector;

    fn bitand(self, rhs: &BitVector) -> BitVector {
        assert_eq!(
            self.len, rhs.len,
            "Bit vectors must have the same length for bitwise AND: {} != {}",
            self.len, rhs.len
        );
        let mut result = BitVector::empty(self.len);
        for (res, (left, right)) in result
            .words
            .iter_mut()
            .zip(self.words.iter().zip(rhs.words.iter()))
        {
            *res = left & right;
        }
        result
    }
}

impl BitOr<&BitVector> for &BitVector {
    type Output = BitVector;

    fn bitor(self, rhs: &BitVector) -> BitVector {
        assert_eq!(
            self.len, rhs.len,
            "Bit vectors must have the same length for bitwise OR: {} != {}",
            self.len, rhs.len
        );
        let mut result = BitVector::empty(self.len);
        for (res, (left, right)) in result
            .words
            .iter_mut()
            .zip(self.words.iter().zip(rhs.words.iter()))
        {
            *res = left | right;
        }
        result
    }
}

impl BitXor<&BitVector> for &BitVector {
    type Output = BitVector;

    fn bitxor(self, rhs: &BitVector) -> BitVector {
        assert_eq!(
            self.len, rhs.len,
            "Bit vectors must have the same length for bitwise XOR: {} != {}",
            self.len, rhs.len
        );
        let mut result = BitVector::empty(self.len);
        for (res, (left, right)) in result
            .words
            .iter_mut()
            .zip(self.words.iter().zip(rhs.words.iter()))
        {
            *res = left ^ right;
        }
        result
    }
}

impl Not for &BitVector {
    type Output = BitVector;

    fn not(self) -> BitVector {
        let mut result = BitVector::empty(self.len);
        for (res, this) in result.words.iter_mut().zip(self.words.iter()) {
            *res = !*this;
        }
        BitVector::mask_tail(&mut result.words, self.len);
        result
    }
}

impl BitAndAssign<&BitVector> for BitVector {
    fn bitand_assign(&mut self, rhs: &BitVector) {
        assert_eq!(
            self.len, rhs.len,
            "Bit vectors must have the same length for bitwise AND-assign: {} != {}",
            self.len, rhs.len
        );
        for (l, r) in self.words.iter_mut().zip(rhs.words.iter()) {
            *l &= *r;
        }
    }
}

impl BitOrAssign<&BitVector> for BitVector {
    fn bitor_assign(&mut self, rhs: &BitVector) {
        assert_eq!(
            self.len, rhs.len,
            "Bit vectors must have the same length for bitwise OR-assign: {} != {}",
            self.len, rhs.len
        );
        for (l, r) in self.words.iter_mut().zip(rhs.words.iter()) {
            *l |= *r;
        }
    }
}

impl BitXorAssign<&BitVector> for BitVector {
    fn bitxor_assign(&mut self, rhs: &BitVector) {
        assert_eq!(
            self.len, rhs.len,
            "Bit vectors must have the same length for bitwise XOR-assign: {} != {}",
            self.len, rhs.len
        );
        for (l, r) in self.words.iter_mut().zip(rhs.words.iter()) {
            *l ^= *r;
        }
    }
}

/// An iterator over the positions of set bits in a `BitVector`.
///
/// This iterator yields the 0-based indices of all bits that are set to 1.
#[derive(Clone)]
pub struct SetBitsIter<'a> {
    words: std::slice::Iter<'a, u64>,
    current_word: u64,
    next_word_index: usize,
    base_index: usize,
    len: usize,
}

impl<'a> Iterator for SetBitsIter<'a> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // If the current word has set bits, find and return the next one
            if self.current_word != 0 {
                let bit_offset = self.current_word.trailing_zeros() as usize;
                let index = self.base_index + bit_offset;

                // Make sure we don't go beyond the vector's length
                if index >= self.len {
                    return None;
                }

                // Clear the least significant set bit for next iteration
                self.current_word &= self.current_word - 1;

                return Some(index);
            }

            // Move to the next word
            match self.words.next() {
                Some(&word) => {
                    self.current_word = word;
                    self.base_index = self.next_word_index * 64;
                    self.next_word_index += 1;
                }
                None => return None,
            }
        }
    }
}
