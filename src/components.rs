/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The coefficient data model and the provider seam.
//!
//! Everything in this crate operates on quantized DCT coefficients as
//! produced by a baseline JPEG entropy decoder: per channel, a sequence of
//! 8x8 blocks of signed 16-bit values in zig-zag position order, together
//! with the channel's quantization table and block geometry.
//!
//! The JPEG codec itself stays outside this crate; it is reached through
//! the [`CoefficientSource`] trait, which hands out per-row block slices
//! for the duration of one embed or extract call. [`MemCoefficients`] is a
//! simple in-memory implementation for callers that already materialized
//! the coefficient planes (and for the test-suite).

use alloc::vec::Vec;

use crate::errors::StegErrors;

/// Number of coefficients in one DCT block.
pub const DCT_BLOCK: usize = 64;

/// One 8x8 block of quantized DCT coefficients in zig-zag order.
///
/// Index 0 is the DC term; indices 1..64 are AC terms.
pub type CoeffBlock = [i16; DCT_BLOCK];

/// A color channel of the cover image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Component {
    /// Luminance
    Y,
    /// First chroma channel
    U,
    /// Second chroma channel
    V
}

impl Component {
    /// All channels, in their canonical order.
    pub const ALL: [Component; 3] = [Component::Y, Component::U, Component::V];

    /// Return the plane index of this channel.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Component::Y => 0,
            Component::U => 1,
            Component::V => 2
        }
    }
}

/// Block geometry of one channel.
///
/// A channel is `blocks_wide` blocks across; vertically it consists of
/// `blocks_tall` MCU rows of `v_samp_factor` block rows each, so the
/// total MCU count is `blocks_wide * blocks_tall * v_samp_factor`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelDims {
    blocks_wide:   usize,
    blocks_tall:   usize,
    v_samp_factor: usize
}

impl ChannelDims {
    /// Create a new channel geometry.
    #[must_use]
    pub const fn new(blocks_wide: usize, blocks_tall: usize, v_samp_factor: usize) -> ChannelDims {
        ChannelDims {
            blocks_wide,
            blocks_tall,
            v_samp_factor
        }
    }

    #[must_use]
    pub const fn blocks_wide(&self) -> usize {
        self.blocks_wide
    }

    #[must_use]
    pub const fn blocks_tall(&self) -> usize {
        self.blocks_tall
    }

    #[must_use]
    pub const fn v_samp_factor(&self) -> usize {
        self.v_samp_factor
    }

    /// Number of block rows in the plane.
    #[must_use]
    pub const fn block_rows(&self) -> usize {
        self.blocks_tall * self.v_samp_factor
    }

    /// Total number of MCUs in the channel.
    #[must_use]
    pub const fn mcu_count(&self) -> usize {
        self.blocks_wide * self.blocks_tall * self.v_samp_factor
    }

    pub(crate) fn validate(&self) -> Result<(), StegErrors> {
        if self.blocks_wide == 0 || self.blocks_tall == 0 || self.v_samp_factor == 0 {
            return Err(StegErrors::BadDimensions(
                self.blocks_wide,
                self.blocks_tall,
                self.v_samp_factor
            ));
        }
        Ok(())
    }
}

/// A 64-entry JPEG quantization table in zig-zag order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantTable {
    values: [u16; DCT_BLOCK]
}

impl QuantTable {
    /// Create a table from its raw quanta.
    #[must_use]
    pub const fn new(values: [u16; DCT_BLOCK]) -> QuantTable {
        QuantTable { values }
    }

    /// Raw quantum at a zig-zag position.
    #[must_use]
    pub const fn value(&self, pos: usize) -> u16 {
        self.values[pos]
    }

    /// Number of representable levels at a zig-zag position.
    ///
    /// A zero quantum is treated as leaving no usable levels.
    #[must_use]
    pub const fn levels(&self, pos: usize) -> u16 {
        if self.values[pos] == 0 {
            0
        } else {
            255 / self.values[pos]
        }
    }
}

/// Provider of quantized coefficient planes.
///
/// Implementations sit between this crate and a JPEG codec: after entropy
/// decoding, the codec's per-channel virtual block arrays are exposed here
/// row by row, mutated in place during embedding, and handed back to the
/// entropy encoder afterwards.
///
/// Row indices run over `dims.block_rows()`; each row slice must hold at
/// least `dims.blocks_wide()` blocks.
pub trait CoefficientSource {
    /// Geometry of a channel, or `None` if the image does not contain it.
    fn dims(&self, component: Component) -> Option<ChannelDims>;

    /// Quantization table in effect for a channel.
    fn quant_table(&self, component: Component) -> Option<&QuantTable>;

    /// Immutable access to one row of blocks.
    fn block_row(&self, component: Component, row: usize) -> &[CoeffBlock];

    /// Mutable access to one row of blocks.
    fn block_row_mut(&mut self, component: Component, row: usize) -> &mut [CoeffBlock];
}

struct Plane {
    component: Component,
    dims:      ChannelDims,
    quant:     QuantTable,
    blocks:    Vec<CoeffBlock>
}

/// An in-memory [`CoefficientSource`].
///
/// Holds fully materialized coefficient planes. Useful when the JPEG
/// codec in use hands over whole coefficient buffers, and for tests.
#[derive(Default)]
pub struct MemCoefficients {
    planes: Vec<Plane>
}

impl MemCoefficients {
    /// Create an empty provider with no planes.
    #[must_use]
    pub fn new() -> MemCoefficients {
        MemCoefficients { planes: Vec::new() }
    }

    /// Add a coefficient plane for a channel.
    ///
    /// `blocks` are stored row-major, `dims.blocks_wide()` blocks per row.
    ///
    /// # Errors
    /// Returns [`StegErrors::BadDimensions`] if the geometry is degenerate
    /// or `blocks` does not match it.
    pub fn add_plane(
        &mut self, component: Component, dims: ChannelDims, quant: QuantTable,
        blocks: Vec<CoeffBlock>
    ) -> Result<(), StegErrors> {
        dims.validate()?;
        if blocks.len() != dims.block_rows() * dims.blocks_wide() {
            return Err(StegErrors::BadDimensions(
                dims.blocks_wide(),
                dims.blocks_tall(),
                dims.v_samp_factor()
            ));
        }
        // last add wins when a channel is given twice
        self.planes.retain(|p| p.component != component);
        self.planes.push(Plane {
            component,
            dims,
            quant,
            blocks
        });
        Ok(())
    }

    fn plane(&self, component: Component) -> Option<&Plane> {
        self.planes.iter().find(|p| p.component == component)
    }

    /// The raw blocks of a channel, row-major.
    #[must_use]
    pub fn blocks(&self, component: Component) -> Option<&[CoeffBlock]> {
        self.plane(component).map(|p| p.blocks.as_slice())
    }
}

impl CoefficientSource for MemCoefficients {
    fn dims(&self, component: Component) -> Option<ChannelDims> {
        self.plane(component).map(|p| p.dims)
    }

    fn quant_table(&self, component: Component) -> Option<&QuantTable> {
        self.plane(component).map(|p| &p.quant)
    }

    fn block_row(&self, component: Component, row: usize) -> &[CoeffBlock] {
        let plane = self.plane(component).expect("channel not present");
        let wide = plane.dims.blocks_wide();
        &plane.blocks[row * wide..(row + 1) * wide]
    }

    fn block_row_mut(&mut self, component: Component, row: usize) -> &mut [CoeffBlock] {
        let plane = self
            .planes
            .iter_mut()
            .find(|p| p.component == component)
            .expect("channel not present");
        let wide = plane.dims.blocks_wide();
        &mut plane.blocks[row * wide..(row + 1) * wide]
    }
}
