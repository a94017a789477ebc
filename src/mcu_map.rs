/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! MCU selection.
//!
//! A channel's MCUs are visited in natural order, but only a subset
//! carries data: `floor(density * count / 100)` of them. The subset is
//! described by a permutation of the MCU indices plus an active mask.
//!
//! Index 0 is special. The density itself travels in the frame, so the
//! extractor cannot know which MCUs are active until it has read the
//! first byte; MCU 0 is therefore pinned active on both sides and always
//! carries the frame's opening bits.

use alloc::vec;
use alloc::vec::Vec;

use crate::errors::StegErrors;
use crate::prng::PrnCache;

pub(crate) struct McuMap {
    active: Vec<bool>,
    in_use: usize
}

impl McuMap {
    /// Build the selection for `max_mcus` MCUs at a density in `[1,100]`.
    ///
    /// With seed 0 the order is the identity and every
    /// `floor(100/density)`-th MCU is active, spreading the load evenly.
    /// Otherwise the cache is rewound and indices `1..max_mcus` are
    /// Fisher-Yates permuted (index 0 never moves); the first
    /// `floor(density * max_mcus / 100)` slots of the permutation are
    /// switched on.
    pub(crate) fn build(
        max_mcus: usize, density: u32, seed: u32, cache: &mut PrnCache
    ) -> Result<McuMap, StegErrors> {
        let in_use = (max_mcus * density as usize) / 100;
        if in_use == 0 {
            return Err(StegErrors::McuMap("density selects no MCUs"));
        }

        let mut active = vec![true; max_mcus];

        if seed == 0 {
            if density < 100 {
                let stride = (100 / density) as usize;
                for (i, flag) in active.iter_mut().enumerate() {
                    *flag = i % stride == 0;
                }
            }
            return Ok(McuMap { active, in_use });
        }

        cache.reset();

        let mut order: Vec<u32> = (0..max_mcus as u32).collect();
        for flag in active.iter_mut().skip(1) {
            *flag = false;
        }
        for i in 1..max_mcus {
            let j = if i == 1 {
                1
            } else {
                (cache.next() as usize) % (i + 1)
            };
            // don't self-permute, and never displace the pinned index 0
            if j != i && j > 0 {
                order.swap(i, j);
            }
        }
        for k in 1..in_use {
            active[order[k] as usize] = true;
        }

        Ok(McuMap { active, in_use })
    }

    pub(crate) fn is_active(&self, index: usize) -> bool {
        self.active[index]
    }

    /// The number of MCUs the density asked for.
    pub(crate) fn in_use(&self) -> usize {
        self.in_use
    }
}
