/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The embed engine.

use alloc::vec::Vec;

use crate::bitstream::{FrameStream, HDR_SIZE};
use crate::capacity::{
    channel_capacities, channel_capacity, effective_n_freqs, image_capacity_bits,
    partition_payload
};
use crate::components::{CoefficientSource, Component};
use crate::ecc::{EccCodec, RsCodec};
use crate::errors::StegErrors;
use crate::frequency::{
    candidate_freqs, FreqPool, DENSITY_BITS_PER_FREQ, DENSITY_FREQS, DENSITY_LEVELS
};
use crate::mcu_map::McuMap;
use crate::options::{EccMethod, StegOptions, MCU_DENSITY_AUTO};
use crate::prng::PrnCache;
use crate::worker::{insert_group, prepare_block};

/// Embeds a payload into the coefficients of a cover image.
///
/// The encoder borrows the coefficient source mutably for its lifetime;
/// after [`embed`](StegEncoder::embed) returns, the mutated planes are
/// ready to be handed back to a JPEG entropy encoder.
///
/// # Example
/// Embed a message into a synthetic one-channel cover:
///
/// ```
/// use stegdct::{
///     ChannelDims, Component, MemCoefficients, QuantTable, StegEncoder, StegOptions
/// };
///
/// let dims = ChannelDims::new(40, 40, 1);
/// let blocks = vec![[0_i16; 64]; dims.mcu_count()];
/// let mut cover = MemCoefficients::new();
/// cover
///     .add_plane(Component::Y, dims, QuantTable::new([16; 64]), blocks)
///     .unwrap();
///
/// let options = StegOptions::new().set_seed(0xBEEF);
/// let mut encoder = StegEncoder::new(&mut cover, options);
/// let n = encoder.embed(b"hidden in plain sight").unwrap();
/// assert_eq!(n, 21);
/// ```
pub struct StegEncoder<'a, S: CoefficientSource> {
    source:  &'a mut S,
    options: StegOptions
}

impl<'a, S: CoefficientSource> StegEncoder<'a, S> {
    /// Create an encoder over a coefficient source.
    pub fn new(source: &'a mut S, options: StegOptions) -> StegEncoder<'a, S> {
        StegEncoder { source, options }
    }

    /// The options this encoder was created with.
    pub const fn options(&self) -> &StegOptions {
        &self.options
    }

    /// Total message capacity in bytes across the enabled channels.
    ///
    /// # Errors
    /// See [`StegErrors`]; a missing channel or an unusable quant table
    /// is reported here rather than during embedding.
    pub fn capacity(&self) -> Result<usize, StegErrors> {
        Ok(channel_capacities(&*self.source, &self.options)?
            .iter()
            .sum())
    }

    /// Message capacity of a single channel in bytes.
    ///
    /// # Errors
    /// See [`StegErrors`].
    pub fn channel_capacity(&self, component: Component) -> Result<usize, StegErrors> {
        channel_capacity(&*self.source, component, &self.options)
    }

    /// Capacity with the inner code disregarded.
    ///
    /// # Errors
    /// See [`StegErrors`].
    pub fn raw_capacity(&self) -> Result<usize, StegErrors> {
        let plain = self.options.set_ecc_method(EccMethod::None);
        Ok(channel_capacities(&*self.source, &plain)?.iter().sum())
    }

    /// Embed `payload` into the cover, returning the number of payload
    /// bytes embedded.
    ///
    /// The payload is split across the enabled channels proportionally
    /// to their capacities; every channel carries an independent frame
    /// with its own density byte and checksum.
    ///
    /// # Errors
    /// - [`StegErrors::MessageOverflow`] when the payload exceeds the
    ///   total capacity
    /// - [`StegErrors::NotEnoughFrequencies`] when a quant table cannot
    ///   carry the frame
    /// - any capacity error from above
    pub fn embed(&mut self, payload: &[u8]) -> Result<usize, StegErrors> {
        let options = self.options;
        let components: Vec<Component> = options.enabled_components().collect();

        let capacities = channel_capacities(&*self.source, &options)?;
        let total: usize = capacities.iter().sum();
        if payload.len() > total {
            return Err(StegErrors::MessageOverflow(payload.len(), total));
        }
        let parts = partition_payload(payload.len(), &capacities);

        let cache_len: usize = components
            .iter()
            .filter_map(|&c| self.source.dims(c))
            .map(|d| d.mcu_count())
            .sum();
        let mut cache = PrnCache::new(cache_len, options.seed());

        trace!(
            "embedding {} bytes over {} channel(s), {} bytes of capacity",
            payload.len(),
            components.len(),
            total
        );

        let mut embedded = 0;
        let mut offset = 0;
        for (k, &component) in components.iter().enumerate() {
            let slice = &payload[offset..offset + parts[k]];
            embedded += embed_channel(self.source, &options, component, slice, &mut cache)?;
            offset += parts[k];
        }
        Ok(embedded)
    }
}

/// Pick the channel density: a configured value is taken as is, auto
/// sizes the density to the framed message with one point of margin.
fn pick_density(
    options: &StegOptions, msg_len: usize, mcu_count: usize, n_freqs: usize
) -> Result<u32, StegErrors> {
    match options.mcu_density() {
        MCU_DENSITY_AUTO => {
            if !options.embed_header() {
                // the extractor has no way to learn a computed density
                return Ok(100);
            }
            let available =
                image_capacity_bits(mcu_count, n_freqs, options.bits_per_freq().max(1), 100);
            let required = (msg_len + HDR_SIZE) * 8;
            if required > available {
                return Err(StegErrors::MessageOverflow(required / 8, available / 8));
            }

            let mut density = (100 * required).div_ceil(available).max(1);
            if density < 100 {
                density += 1;
            }
            Ok(density as u32)
        }
        d if (1..=100).contains(&d) => Ok(d as u32),
        _ => Err(StegErrors::Generic("mcu density out of range"))
    }
}

fn embed_channel<S: CoefficientSource>(
    source: &mut S, options: &StegOptions, component: Component, payload: &[u8],
    cache: &mut PrnCache
) -> Result<usize, StegErrors> {
    let dims = source
        .dims(component)
        .ok_or(StegErrors::JpegSource("enabled channel missing from the source"))?;
    dims.validate()?;
    let mcu_count = dims.mcu_count();

    let (candidates, dc_quant) = {
        let quant = source
            .quant_table(component)
            .ok_or(StegErrors::JpegSource("missing quantization table"))?;
        let candidates = candidate_freqs(quant, options.max_freqs(), options.n_levels());
        if candidates.len() < DENSITY_FREQS {
            return Err(StegErrors::NotEnoughFrequencies(candidates.len()));
        }
        if options.embed_header() {
            let strong = candidates
                .iter()
                .take(DENSITY_FREQS)
                .filter(|&&p| quant.levels(p) >= DENSITY_LEVELS)
                .count();
            if strong < DENSITY_FREQS {
                return Err(StegErrors::NotEnoughFrequencies(strong));
            }
        }
        (candidates, quant.value(0))
    };

    let n_freqs = effective_n_freqs(options, candidates.len());
    let bits_per_freq = options.bits_per_freq().max(1);

    let msg: Vec<u8> = match options.ecc_method() {
        EccMethod::RsCode => RsCodec::new(options.ecc_block_len())?.encode(payload)?,
        EccMethod::None => payload.to_vec()
    };

    let density = pick_density(options, msg.len(), mcu_count, n_freqs)?;
    trace!(
        "channel {component:?}: density {density}, {} candidates, {} bits per MCU",
        candidates.len(),
        n_freqs * bits_per_freq
    );

    let mut frame = FrameStream::for_message(&msg, density as u8, options.embed_header());
    frame.seal();

    let map = McuMap::build(mcu_count, density, options.seed(), cache)?;
    let mut pool = FreqPool::new(&candidates);
    cache.reset();

    let mut first = options.embed_header();
    let mut index = 0;

    'outer: for row in 0..dims.block_rows() {
        let blocks = source.block_row_mut(component, row);

        for block in blocks.iter_mut().take(dims.blocks_wide()) {
            if options.seed() != 0 {
                pool.shuffle(cache);
            }
            let mcu = index;
            index += 1;
            if !map.is_active(mcu) {
                continue;
            }

            prepare_block(block, options, dc_quant);
            if first {
                // the very first active MCU always carries the density
                // byte on a fixed 4x2 layout, whatever the general
                // packing is; the extractor reads it before it knows
                // n_freqs' worth of anything
                insert_group(
                    &mut frame,
                    block,
                    &pool.positions()[..DENSITY_FREQS],
                    DENSITY_BITS_PER_FREQ
                );
                first = false;
            } else {
                insert_group(&mut frame, block, &pool.positions()[..n_freqs], bits_per_freq);
            }

            if frame.complete() {
                break 'outer;
            }
        }
    }

    trace!(
        "channel {component:?}: {} message bytes in {} of {} MCUs",
        msg.len(),
        map.in_use(),
        mcu_count
    );
    Ok(payload.len())
}
