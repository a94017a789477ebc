/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Capacity computation and payload partitioning.

use alloc::vec;
use alloc::vec::Vec;

use crate::bitstream::HDR_SIZE;
use crate::components::{CoefficientSource, Component};
use crate::ecc::{EccCodec, RsCodec};
use crate::errors::StegErrors;
use crate::frequency::{candidate_freqs, DENSITY_FREQS};
use crate::options::{EccMethod, StegOptions};

/// Frequencies actually written per MCU: a configured 0 means "every
/// candidate", anything else is capped by the candidate count.
pub(crate) fn effective_n_freqs(options: &StegOptions, candidate_count: usize) -> usize {
    if options.n_freqs() == 0 {
        candidate_count
    } else {
        options.n_freqs().min(candidate_count)
    }
}

/// Raw channel capacity in bits, prorated by a fixed density.
///
/// The MCU count is floored first, then multiplied by the per-MCU bit
/// rate, matching the count the selection map actually switches on.
pub(crate) fn image_capacity_bits(
    mcu_count: usize, n_freqs: usize, bits_per_freq: usize, density: i32
) -> usize {
    let mcus_used = if density > 0 && density < 100 {
        (mcu_count * density as usize) / 100
    } else {
        mcu_count
    };

    mcus_used * n_freqs * bits_per_freq
}

/// Message capacity of one channel in bytes.
///
/// Raw bit capacity, divided down to bytes, minus the 6 header bytes
/// when the header is embedded, then shrunk by the inner code's
/// overhead.
///
/// # Errors
/// - [`StegErrors::BadDimensions`] for degenerate geometry
/// - [`StegErrors::JpegSource`] when the channel or its quant table is
///   missing
/// - [`StegErrors::NotEnoughFrequencies`] when fewer than 4 positions
///   qualify
pub(crate) fn channel_capacity<S: CoefficientSource>(
    source: &S, component: Component, options: &StegOptions
) -> Result<usize, StegErrors> {
    let dims = source
        .dims(component)
        .ok_or(StegErrors::JpegSource("enabled channel missing from the source"))?;
    dims.validate()?;

    let quant = source
        .quant_table(component)
        .ok_or(StegErrors::JpegSource("missing quantization table"))?;

    let candidates = candidate_freqs(quant, options.max_freqs(), options.n_levels());
    if candidates.len() < DENSITY_FREQS {
        return Err(StegErrors::NotEnoughFrequencies(candidates.len()));
    }

    let n_freqs = effective_n_freqs(options, candidates.len());
    let bits = image_capacity_bits(
        dims.mcu_count(),
        n_freqs,
        options.bits_per_freq().max(1),
        options.mcu_density()
    );
    let mut bytes = bits / 8;

    if options.embed_header() {
        bytes = bytes.saturating_sub(HDR_SIZE);
    }
    if options.ecc_method() == EccMethod::RsCode {
        bytes = RsCodec::new(options.ecc_block_len())?.capacity(bytes);
    }
    Ok(bytes)
}

/// Message capacities of every enabled channel, in order.
pub(crate) fn channel_capacities<S: CoefficientSource>(
    source: &S, options: &StegOptions
) -> Result<Vec<usize>, StegErrors> {
    options
        .enabled_components()
        .map(|c| channel_capacity(source, c, options))
        .collect()
}

/// Split `len` payload bytes over channels proportionally to their
/// capacities; rounding slack lands on the first channel.
///
/// The caller guarantees `len` does not exceed the capacity total.
pub(crate) fn partition_payload(len: usize, capacities: &[usize]) -> Vec<usize> {
    let total: usize = capacities.iter().sum();
    if capacities.len() == 1 || total == 0 {
        let mut parts = vec![0; capacities.len()];
        if let Some(first) = parts.first_mut() {
            *first = len;
        }
        return parts;
    }

    let mut parts: Vec<usize> = capacities.iter().map(|&c| c * len / total).collect();
    let assigned: usize = parts.iter().sum();
    parts[0] += len - assigned;
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proration_by_density() {
        assert_eq!(image_capacity_bits(1000, 2, 1, 100), 2000);
        assert_eq!(image_capacity_bits(1000, 2, 1, 50), 1000);
        assert_eq!(image_capacity_bits(1000, 2, 1, -1), 2000);
        assert_eq!(image_capacity_bits(1000, 1, 2, 25), 500);
    }

    #[test]
    fn proration_floors_the_mcu_count_first() {
        // floor(40 * 67 / 100) = 26 MCUs, then 3 bits each; a combined
        // floor(40 * 67 * 3 / 100) would over-report 80 bits
        assert_eq!(image_capacity_bits(40, 3, 1, 67), 78);
        assert_eq!(image_capacity_bits(33, 2, 2, 10), 12);
    }

    #[test]
    fn ecc_overhead_applies_after_the_header() {
        use alloc::vec;

        use crate::components::{ChannelDims, MemCoefficients, QuantTable};

        // 1648 MCUs at one bit each = 206 raw bytes
        let mut mem = MemCoefficients::new();
        let dims = ChannelDims::new(103, 16, 1);
        mem.add_plane(
            Component::Y,
            dims,
            QuantTable::new([16; 64]),
            vec![[0_i16; 64]; dims.mcu_count()]
        )
        .unwrap();

        let options = StegOptions::new()
            .set_mcu_density(100)
            .set_ecc_method(EccMethod::RsCode);
        // 206 - 6 header bytes = one full 200-byte block of 168 data bytes
        assert_eq!(channel_capacity(&mem, Component::Y, &options).unwrap(), 168);
    }

    #[test]
    fn partition_is_exhaustive() {
        let caps = [1000, 500, 250];
        let parts = partition_payload(1400, &caps);
        assert_eq!(parts.iter().sum::<usize>(), 1400);
        assert_eq!(parts.len(), 3);
        // proportional within rounding
        assert!(parts[0] >= 799 && parts[0] <= 801);
    }

    #[test]
    fn single_channel_takes_everything() {
        assert_eq!(partition_payload(123, &[4096]), [123]);
    }

    #[test]
    fn full_load_fills_exactly() {
        let caps = [600, 300, 100];
        let parts = partition_payload(1000, &caps);
        assert_eq!(parts, [600, 300, 100]);
    }
}
