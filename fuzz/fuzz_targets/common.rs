// SPDX-License-Identifier: MIT OR Apache-2.0

/// Reads fixed-width values from fuzz input, yielding zeros once exhausted.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn next_u8(&mut self) -> u8 {
        let out = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos = self.pos.saturating_add(1);
        out
    }

    pub fn next_i16(&mut self) -> i16 {
        i16::from_le_bytes([self.next_u8(), self.next_u8()])
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }
}

/// Maps `seed` into `[lo, hi]`.
pub fn bounded(seed: u8, lo: usize, hi: usize) -> usize {
    lo + usize::from(seed) % (hi - lo + 1)
}
