/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Frequency selection.
//!
//! Data rides on a small pool of AC positions chosen from the channel's
//! quantization table: scanning from position 63 down to 1, a position
//! qualifies when its quantum leaves at least `n_levels` representable
//! levels, and at most `max_freqs` positions are kept in that descending
//! order. The heaviest-quantized (highest) frequencies come first, where
//! small coefficient rewrites are visually cheapest.
//!
//! When a seed is in play the pool is Fisher-Yates shuffled in place
//! before every MCU visit, so the positions written in one MCU depend on
//! the whole draw history up to that block.

use alloc::vec::Vec;

use crate::components::{QuantTable, DCT_BLOCK};
use crate::prng::PrnCache;

/// Frequencies carrying the density byte in the first active MCU.
pub(crate) const DENSITY_FREQS: usize = 4;
/// Bits per frequency for the density byte.
pub(crate) const DENSITY_BITS_PER_FREQ: usize = 2;
/// Levels needed so a density-byte frequency can hold 2 bits losslessly.
pub(crate) const DENSITY_LEVELS: u16 = 8;

/// Scan the quant table for usable AC positions.
///
/// Returns at most `max_freqs` zig-zag indices in descending order, each
/// with at least `n_levels` representable levels. The DC position is
/// never a candidate.
pub(crate) fn candidate_freqs(quant: &QuantTable, max_freqs: usize, n_levels: u16) -> Vec<usize> {
    let mut found = Vec::with_capacity(max_freqs);

    for pos in (1..DCT_BLOCK).rev() {
        if found.len() == max_freqs {
            break;
        }
        if quant.levels(pos) >= n_levels {
            found.push(pos);
        }
    }
    found
}

/// The in-place shuffled pool of candidate positions.
pub(crate) struct FreqPool {
    pool: Vec<usize>
}

impl FreqPool {
    pub(crate) fn new(candidates: &[usize]) -> FreqPool {
        FreqPool {
            pool: candidates.to_vec()
        }
    }

    /// Fisher-Yates the pool using the next draws from the cache.
    ///
    /// Consumes exactly `len - 1` draws.
    pub(crate) fn shuffle(&mut self, cache: &mut PrnCache) {
        for i in 1..self.pool.len() {
            let j = (cache.next() as usize) % (i + 1);
            if j != i {
                self.pool.swap(i, j);
            }
        }
    }

    /// Positions in their current order.
    pub(crate) fn positions(&self) -> &[usize] {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::QuantTable;

    #[test]
    fn scan_is_descending_and_filtered() {
        let mut values = [200_u16; DCT_BLOCK];
        // only a handful of positions leave >= 8 levels
        for pos in [3, 9, 17, 40, 61, 63] {
            values[pos] = 16;
        }
        values[0] = 16; // DC must never qualify
        let q = QuantTable::new(values);

        let found = candidate_freqs(&q, 6, 8);
        assert_eq!(found, [63, 61, 40, 17, 9, 3]);

        let capped = candidate_freqs(&q, 4, 8);
        assert_eq!(capped, [63, 61, 40, 17]);
    }

    #[test]
    fn scan_skips_dc_even_when_it_qualifies() {
        let values = [200_u16; DCT_BLOCK];
        let mut values = values;
        values[0] = 1;
        let q = QuantTable::new(values);
        assert!(candidate_freqs(&q, 6, 8).is_empty());
    }

    #[test]
    fn shuffle_is_reproducible() {
        let candidates = [63, 62, 61, 60, 59, 58];
        let mut a = FreqPool::new(&candidates);
        let mut b = FreqPool::new(&candidates);

        let mut cache1 = PrnCache::new(32, 0xABCD);
        let mut cache2 = PrnCache::new(32, 0xABCD);

        for _ in 0..4 {
            a.shuffle(&mut cache1);
            b.shuffle(&mut cache2);
            assert_eq!(a.positions(), b.positions());
        }
    }

    #[test]
    fn shuffle_keeps_the_same_positions() {
        let candidates = [63, 62, 61, 60, 59, 58];
        let mut pool = FreqPool::new(&candidates);
        let mut cache = PrnCache::new(32, 5);
        pool.shuffle(&mut cache);

        let mut sorted: alloc::vec::Vec<usize> = pool.positions().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, [58, 59, 60, 61, 62, 63]);
    }
}
