/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The extract engine.
//!
//! Extraction mirrors the embedding traversal exactly: the same candidate
//! frequencies, the same cache draws, the same MCU order. The one
//! asymmetry is the density: the extractor starts from a provisional
//! all-active map (index 0 is pinned on both sides), reads the density
//! byte out of the first MCU, then rebuilds the map with the real value
//! while keeping its place in the draw sequence.

use alloc::vec::Vec;

use crate::bitstream::FrameStream;
use crate::capacity::{channel_capacities, channel_capacity, effective_n_freqs};
use crate::components::{CoefficientSource, Component};
use crate::ecc::{EccCodec, RsCodec};
use crate::errors::StegErrors;
use crate::frequency::{candidate_freqs, FreqPool, DENSITY_BITS_PER_FREQ, DENSITY_FREQS};
use crate::mcu_map::McuMap;
use crate::options::{EccMethod, StegOptions, MCU_DENSITY_AUTO};
use crate::prng::PrnCache;
use crate::worker::extract_group;

/// Recovers a payload from the coefficients of a stego image.
///
/// Must be configured with the same options (seed included) that
/// embedded the payload; anything else fails at the header checksum.
pub struct StegDecoder<'a, S: CoefficientSource> {
    source:  &'a S,
    options: StegOptions
}

impl<'a, S: CoefficientSource> StegDecoder<'a, S> {
    /// Create a decoder over a coefficient source.
    pub fn new(source: &'a S, options: StegOptions) -> StegDecoder<'a, S> {
        StegDecoder { source, options }
    }

    /// The options this decoder was created with.
    pub const fn options(&self) -> &StegOptions {
        &self.options
    }

    /// Total message capacity in bytes across the enabled channels.
    ///
    /// # Errors
    /// See [`StegErrors`].
    pub fn capacity(&self) -> Result<usize, StegErrors> {
        Ok(channel_capacities(self.source, &self.options)?.iter().sum())
    }

    /// Message capacity of a single channel in bytes.
    ///
    /// # Errors
    /// See [`StegErrors`].
    pub fn channel_capacity(&self, component: Component) -> Result<usize, StegErrors> {
        channel_capacity(self.source, component, &self.options)
    }

    /// Capacity with the inner code disregarded.
    ///
    /// # Errors
    /// See [`StegErrors`].
    pub fn raw_capacity(&self) -> Result<usize, StegErrors> {
        let plain = self.options.set_ecc_method(EccMethod::None);
        Ok(channel_capacities(self.source, &plain)?.iter().sum())
    }

    /// Extract the payload, concatenating the recovered bytes of every
    /// enabled channel.
    ///
    /// # Errors
    /// - [`StegErrors::Checksum`] when a channel's header does not
    ///   authenticate (the usual outcome on a non-stego image or a wrong
    ///   seed)
    /// - [`StegErrors::NoMessage`] when a header decodes but its density
    ///   is out of range
    /// - [`StegErrors::MessageOverflow`] when a recovered length is
    ///   impossible for the image
    /// - [`StegErrors::Ecc`] when the inner code cannot repair the bytes
    pub fn extract(&self) -> Result<Vec<u8>, StegErrors> {
        let options = self.options;
        let components: Vec<Component> = options.enabled_components().collect();

        let cache_len: usize = components
            .iter()
            .filter_map(|&c| self.source.dims(c))
            .map(|d| d.mcu_count())
            .sum();
        let mut cache = PrnCache::new(cache_len, options.seed());

        let mut out = Vec::new();
        for &component in &components {
            let part = extract_channel(self.source, &options, component, &mut cache)?;
            trace!("channel {component:?}: recovered {} bytes", part.len());
            out.extend_from_slice(&part);
        }
        Ok(out)
    }

    /// Extract into a caller-supplied buffer, returning the number of
    /// bytes recovered.
    ///
    /// # Errors
    /// As [`extract`](StegDecoder::extract); additionally
    /// [`StegErrors::MessageOverflow`] when the buffer is too small, in
    /// which case the prefix that fits has been written.
    pub fn extract_into(&self, buf: &mut [u8]) -> Result<usize, StegErrors> {
        let data = self.extract()?;
        if buf.len() < data.len() {
            buf.copy_from_slice(&data[..buf.len()]);
            return Err(StegErrors::MessageOverflow(data.len(), buf.len()));
        }
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}

fn extract_channel<S: CoefficientSource>(
    source: &S, options: &StegOptions, component: Component, cache: &mut PrnCache
) -> Result<Vec<u8>, StegErrors> {
    let dims = source
        .dims(component)
        .ok_or(StegErrors::JpegSource("enabled channel missing from the source"))?;
    dims.validate()?;
    let mcu_count = dims.mcu_count();

    let quant = source
        .quant_table(component)
        .ok_or(StegErrors::JpegSource("missing quantization table"))?;
    let candidates = candidate_freqs(quant, options.max_freqs(), options.n_levels());
    if candidates.len() < DENSITY_FREQS {
        return Err(StegErrors::NotEnoughFrequencies(candidates.len()));
    }

    let n_freqs = effective_n_freqs(options, candidates.len());
    let bits_per_freq = options.bits_per_freq().max(1);
    let with_header = options.embed_header();

    // any legitimate encoded message fits in the raw byte budget
    let raw_bytes = (mcu_count * n_freqs * bits_per_freq) / 8;

    let mut frame = FrameStream::for_capacity(raw_bytes, with_header);
    let mut got_length = !with_header;

    let initial_density = if with_header {
        // provisional: every MCU active until the real density is known
        100
    } else {
        match options.mcu_density() {
            MCU_DENSITY_AUTO => 100,
            d if (1..=100).contains(&d) => d as u32,
            _ => return Err(StegErrors::Generic("mcu density out of range"))
        }
    };

    if !with_header {
        frame.set_density(initial_density as u8);
    }

    let mut map = McuMap::build(mcu_count, initial_density, options.seed(), cache)?;
    let mut pool = FreqPool::new(&candidates);
    cache.reset();

    let mut first = with_header;
    let mut index = 0;

    'outer: for row in 0..dims.block_rows() {
        let blocks = source.block_row(component, row);

        for block in blocks.iter().take(dims.blocks_wide()) {
            if options.seed() != 0 {
                pool.shuffle(cache);
            }
            let mcu = index;
            index += 1;
            if !map.is_active(mcu) {
                continue;
            }

            if first {
                extract_group(
                    &mut frame,
                    block,
                    &pool.positions()[..DENSITY_FREQS],
                    DENSITY_BITS_PER_FREQ
                );
                let density = frame.density();
                if density == 0 || density > 100 {
                    // the header cannot be coherent; reject like any
                    // other authentication failure
                    return Err(StegErrors::Checksum(
                        frame.stored_checksum(),
                        frame.computed_checksum()
                    ));
                }
                trace!("channel {component:?}: discovered density {density}");

                // rebuild with the real density; the build rewinds the
                // cache, so restore the traversal position afterwards
                let mark = cache.cursor();
                map = McuMap::build(mcu_count, u32::from(density), options.seed(), cache)?;
                cache.seek(mark);
                first = false;
            } else {
                extract_group(&mut frame, block, &pool.positions()[..n_freqs], bits_per_freq);
            }

            if !got_length && frame.got_length() {
                got_length = true;

                if !frame.validate_checksum() {
                    warn!(
                        "channel {component:?}: header checksum mismatch ({:#04x} vs {:#04x})",
                        frame.stored_checksum(),
                        frame.computed_checksum()
                    );
                    return Err(StegErrors::Checksum(
                        frame.stored_checksum(),
                        frame.computed_checksum()
                    ));
                }

                let msg_size = frame.msg_size() as usize;
                if msg_size == 0 {
                    return Ok(Vec::new());
                }
                if msg_size > raw_bytes {
                    return Err(StegErrors::MessageOverflow(msg_size, raw_bytes));
                }
                let density = frame.density();
                if !(1..=100).contains(&density) {
                    return Err(StegErrors::NoMessage);
                }
                frame.limit_to_message(msg_size);
            }

            if got_length && frame.complete() {
                break 'outer;
            }
        }
    }

    if with_header && !got_length {
        // the image could not even deliver the 48 header bits
        return Err(StegErrors::NoMessage);
    }

    let msg_size = frame.msg_size() as usize;
    let recovered = msg_size.min(raw_bytes);
    let data = frame.take_payload(recovered);

    if options.ecc_method() == EccMethod::RsCode {
        let codec = RsCodec::new(options.ecc_block_len())?;
        let usable = codec.block_length(recovered);
        if usable == 0 {
            return Err(StegErrors::Ecc("recovered stream shorter than one block"));
        }
        return codec.decode(&data, usable);
    }
    Ok(data)
}
