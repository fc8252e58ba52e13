use std::collections::VecDeque;

/// Count of positions at which `window` and `pattern` differ.
///
/// Both are compared bit for bit up to the length of the shorter.
pub fn hamming_distance<'a, I>(window: I, pattern: &[u8]) -> usize
where
    I: IntoIterator<Item = &'a u8>,
{
    window
        .into_iter()
        .zip(pattern)
        .filter(|(a, b)| (*a ^ *b) & 0x1 != 0)
        .count()
}

/// Distance of an inverted-polarity window from a pattern, given the forward distance.
#[inline]
pub(crate) fn inverted_distance(forward: usize, sync_len: usize) -> usize {
    sync_len - forward
}

/// Bounded history of the most recent bits from a stream, addressed by absolute stream
/// position.
#[derive(Debug, Clone, Default)]
pub(crate) struct History {
    bits: VecDeque<u8>,
    // Stream position of bits[0]
    first: u64,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        History {
            bits: VecDeque::with_capacity(capacity),
            first: 0,
        }
    }

    /// Stream position one past the newest bit, i.e., the number of bits ever pushed.
    pub fn position(&self) -> u64 {
        self.first + self.bits.len() as u64
    }

    pub fn push(&mut self, bit: u8) {
        self.bits.push_back(bit & 0x1);
    }

    /// True if all bits in `[start, start + len)` are still held.
    pub fn contains(&self, start: u64, len: usize) -> bool {
        start >= self.first && start + len as u64 <= self.position()
    }

    /// Bits in `[start, start + len)`.
    ///
    /// # Panics
    /// If the range is not held; callers check with [History::contains].
    pub fn range(&self, start: u64, len: usize) -> impl Iterator<Item = &u8> + '_ {
        assert!(self.contains(start, len), "history range not held");
        let offset = usize::try_from(start - self.first).unwrap_or(usize::MAX);
        self.bits.range(offset..offset + len)
    }

    /// Forward distance of the window starting at `start` from `pattern`.
    pub fn distance(&self, start: u64, pattern: &[u8]) -> usize {
        hamming_distance(self.range(start, pattern.len()), pattern)
    }

    /// Drop the oldest bits so that no more than `keep` remain.
    pub fn trim(&mut self, keep: usize) {
        while self.bits.len() > keep {
            self.bits.pop_front();
            self.first += 1;
        }
    }

    /// Forget all held bits; the position is unchanged.
    pub fn clear(&mut self) {
        self.first = self.position();
        self.bits.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.bits.len()
    }
}
