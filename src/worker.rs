/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Per-MCU bit packing shared by the embed and extract engines.
//!
//! Bits are moved between the frame and a block in groups: one group per
//! selected frequency, `bits_per_freq` bits each, first bit taken as the
//! most significant of the group. A written coefficient is fully
//! overwritten with `XFORM(v) = 2*v - 2`, which balances the stored
//! values around zero; reading inverts it with `(c + 2) / 2`. These two
//! constants are part of the wire format.

use crate::bitstream::FrameStream;
use crate::components::CoeffBlock;
use crate::options::StegOptions;

const XFORM_FACTOR: i32 = 2;
const XFORM_OFFSET: i32 = -2;

#[inline]
pub(crate) fn xform(v: i32) -> i16 {
    (v * XFORM_FACTOR + XFORM_OFFSET) as i16
}

#[inline]
pub(crate) fn invxform(c: i16) -> i32 {
    (i32::from(c) - XFORM_OFFSET) / XFORM_FACTOR
}

/// Apply the configured side effects to a block about to carry data.
///
/// `set_dc` rewrites the DC term to a target average pixel value undoing
/// the level shift; `clear_ac` zeroes every AC position, including the
/// ones written right afterwards.
pub(crate) fn prepare_block(block: &mut CoeffBlock, options: &StegOptions, dc_quant: u16) {
    if options.set_dc() >= 0 {
        let dc = ((options.set_dc() - 128) * 8) / i32::from(dc_quant.max(1));
        block[0] = dc as i16;
    }
    if options.clear_ac() {
        for coef in block.iter_mut().skip(1) {
            *coef = 0;
        }
    }
}

/// Move bits from the frame into the block at the given positions.
///
/// A group that runs past the end of the frame is stored as all zero
/// bits; the extractor trims the tail through the length field.
pub(crate) fn insert_group(
    frame: &mut FrameStream, block: &mut CoeffBlock, positions: &[usize], bits_per_freq: usize
) -> usize {
    let mut moved = 0;

    for &pos in positions {
        let mut val: i32 = 0;
        let mut spent = false;

        for _ in 0..bits_per_freq {
            match frame.get_next_bit() {
                Some(bit) => {
                    val = (val << 1) | i32::from(bit);
                    moved += 1;
                }
                None => spent = true
            }
        }
        if spent {
            val = 0;
        }
        block[pos] = xform(val);
    }
    moved
}

/// Move bits from the block at the given positions into the frame.
///
/// Bits past the frame's current end are dropped.
pub(crate) fn extract_group(
    frame: &mut FrameStream, block: &CoeffBlock, positions: &[usize], bits_per_freq: usize
) -> usize {
    let mut moved = 0;

    for &pos in positions {
        let val = invxform(block[pos]);
        let mut mask = 1_i32 << (bits_per_freq - 1);

        for _ in 0..bits_per_freq {
            frame.set_next_bit(u8::from(val & mask != 0));
            mask >>= 1;
            moved += 1;
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::DCT_BLOCK;
    use crate::options::StegOptions;

    #[test]
    fn xform_is_invertible_over_two_bits() {
        for v in 0..4 {
            assert_eq!(invxform(xform(v)), v);
        }
        assert_eq!(xform(0), -2);
        assert_eq!(xform(3), 4);
    }

    #[test]
    fn group_round_trip() {
        let msg = [0b1011_0010_u8, 0xEE];
        let mut src = FrameStream::for_message(&msg, 100, false);
        let mut block = [0_i16; DCT_BLOCK];
        let positions = [63, 47, 21, 9];

        insert_group(&mut src, &mut block, &positions, 2);

        let mut dst = FrameStream::for_capacity(2, false);
        extract_group(&mut dst, &block, &positions, 2);
        extract_group(&mut dst, &block, &positions, 2); // past-end bits drop

        assert_eq!(dst.take_payload(1)[0], 0b1011_0010);
    }

    #[test]
    fn exhausted_stream_pads_with_zero_groups() {
        let msg = [0xFF_u8];
        let mut src = FrameStream::for_message(&msg, 100, false);
        let mut block = [99_i16; DCT_BLOCK];
        let positions = [10, 11, 12, 13, 14];

        // 8 bits fill four 2-bit groups; the fifth group pads to zero
        insert_group(&mut src, &mut block, &positions, 2);
        assert_eq!(block[13], xform(3));
        assert_eq!(block[14], xform(0));
    }

    #[test]
    fn clear_ac_spares_dc() {
        let mut block = [5_i16; DCT_BLOCK];
        let options = StegOptions::new().set_clear_ac(true);
        prepare_block(&mut block, &options, 16);
        assert_eq!(block[0], 5);
        assert!(block[1..].iter().all(|&c| c == 0));
    }

    #[test]
    fn set_dc_rewrites_the_dc_term() {
        let mut block = [0_i16; DCT_BLOCK];
        let options = StegOptions::new().set_set_dc(200);
        prepare_block(&mut block, &options, 16);
        assert_eq!(block[0], 36);
    }
}
