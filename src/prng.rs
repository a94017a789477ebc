/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The deterministic pseudo-random stream behind MCU and frequency
//! selection.
//!
//! Both sides of a transfer must consume bit-identical draw sequences, so
//! the generator is pinned down completely: a 48-bit linear congruential
//! generator with the `nrand48` constants, never a platform RNG. The
//! 48-bit state derives from the 32-bit shared seed as
//! `low = seed & 0xFFFF`, `mid = seed >> 16`, `high = low ^ mid`.
//!
//! Draws are served from a pre-generated ring ([`PrnCache`]) whose read
//! cursor is rewound at fixed checkpoints (before building a channel's
//! MCU map and before walking its MCUs), so the embedder and the
//! extractor read the same slice of the sequence no matter how many draws
//! either side happened to spend before the checkpoint.

use alloc::vec::Vec;

const MULTIPLIER: u64 = 0x5DEE_CE66D;
const INCREMENT: u64 = 0xB;
const STATE_MASK: u64 = (1 << 48) - 1;

/// The `nrand48` linear congruential generator.
pub(crate) struct Rand48 {
    state: u64
}

impl Rand48 {
    pub(crate) fn from_seed(seed: u32) -> Rand48 {
        let low = u64::from(seed & 0xFFFF);
        let mid = u64::from(seed >> 16);
        let high = low ^ mid;

        Rand48 {
            state: (high << 32) | (mid << 16) | low
        }
    }

    /// Advance the state and return the top 31 bits.
    pub(crate) fn next(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & STATE_MASK;

        (self.state >> 17) as u32
    }
}

/// A ring of pre-generated draws with a resettable read cursor.
pub(crate) struct PrnCache {
    draws:  Vec<u32>,
    cursor: usize
}

impl PrnCache {
    /// Pre-generate `size` draws from `seed`.
    pub(crate) fn new(size: usize, seed: u32) -> PrnCache {
        let mut gen = Rand48::from_seed(seed);
        let draws = (0..size.max(1)).map(|_| gen.next()).collect();

        PrnCache { draws, cursor: 0 }
    }

    /// Rewind the read cursor to the start of the ring.
    pub(crate) fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Next draw; wraps to the start when the ring is exhausted.
    pub(crate) fn next(&mut self) -> u32 {
        let k = if self.cursor >= self.draws.len() {
            0
        } else {
            self.cursor
        };
        self.cursor = k + 1;

        self.draws[k]
    }

    /// Current read position, for save/restore around a map rebuild.
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn seek(&mut self, cursor: usize) {
        self.cursor = cursor;
    }
}
