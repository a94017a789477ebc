/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Least-significant-bit statistics and conditioning over a channel's AC
//! coefficients.
//!
//! These helpers do not take part in embedding or extraction; they exist
//! for inspecting covers and for flattening LSB statistics before a cover
//! is put to use.

use crate::components::{CoefficientSource, Component, DCT_BLOCK};
use crate::errors::StegErrors;

/// What to do with the LSB of one zig-zag position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum LsbAction {
    /// Leave the coefficient untouched
    #[default]
    Keep,
    /// Clear the LSB to 0
    Clear,
    /// Set the LSB to 1
    Set
}

/// Count zero and one LSBs over every AC coefficient of a channel.
///
/// Returns `[zeros, ones]`.
///
/// # Errors
/// [`StegErrors::JpegSource`] when the channel is missing.
pub fn lsb_counts<S: CoefficientSource>(
    source: &S, component: Component
) -> Result<[usize; 2], StegErrors> {
    let dims = source
        .dims(component)
        .ok_or(StegErrors::JpegSource("channel missing from the source"))?;
    dims.validate()?;

    let mut counts = [0_usize; 2];
    for row in 0..dims.block_rows() {
        for block in source.block_row(component, row).iter().take(dims.blocks_wide()) {
            for &coef in &block[1..] {
                counts[(coef & 1) as usize] += 1;
            }
        }
    }
    Ok(counts)
}

/// Apply a per-position LSB mask to every block of a channel.
///
/// The DC position of the mask is ignored. Returns the number of blocks
/// touched.
///
/// # Errors
/// [`StegErrors::JpegSource`] when the channel is missing.
pub fn set_lsbs<S: CoefficientSource>(
    source: &mut S, component: Component, mask: &[LsbAction; DCT_BLOCK]
) -> Result<usize, StegErrors> {
    let dims = source
        .dims(component)
        .ok_or(StegErrors::JpegSource("channel missing from the source"))?;
    dims.validate()?;

    let mut touched = 0;
    for row in 0..dims.block_rows() {
        let blocks = source.block_row_mut(component, row);
        for block in blocks.iter_mut().take(dims.blocks_wide()) {
            for (coef, action) in block.iter_mut().zip(mask.iter()).skip(1) {
                match action {
                    LsbAction::Keep => {}
                    LsbAction::Clear => *coef &= !1,
                    LsbAction::Set => *coef |= 1
                }
            }
            touched += 1;
        }
    }
    Ok(touched)
}
