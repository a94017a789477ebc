/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible during embedding and extraction

use core::fmt::{Debug, Display, Formatter};

/// Possible errors arising while embedding a payload into, or recovering
/// one from, a set of quantized DCT coefficients
pub enum StegErrors {
    /// The coefficient provider could not deliver what was asked of it,
    /// e.g. a missing quantization table for an enabled channel
    JpegSource(&'static str),
    /// An unknown raw property id was passed to the dynamic property API
    NoSuchProperty(i32),
    /// A channel's block geometry is unusable
    ///
    /// Arguments are blocks wide, blocks tall and the vertical sampling
    /// factor as reported by the provider
    BadDimensions(usize, usize, usize),
    /// No recoverable message: the header decoded but its density field is
    /// out of range, or the caller handed an empty payload where one is
    /// required
    NoMessage,
    /// A payload or a recovered length does not fit
    ///
    /// # Arguments
    /// - 1st argument is the number of bytes requested
    /// - 2nd argument is the number of bytes available
    MessageOverflow(usize, usize),
    /// The MCU selection table could not be built
    McuMap(&'static str),
    /// The error-correcting code failed to encode or decode
    Ecc(&'static str),
    /// The embedded header checksum did not match
    ///
    /// # Arguments
    /// - 1st argument is the stored checksum byte
    /// - 2nd argument is the recomputed value
    Checksum(u8, u8),
    /// The quantization table does not expose enough usable positions
    ///
    /// The argument is the number of positions that qualified; at least 4
    /// are needed to carry the density byte
    NotEnoughFrequencies(usize),
    /// Generic message that does not need heap allocation
    Generic(&'static str)
}

impl Debug for StegErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            StegErrors::JpegSource(reason) => {
                writeln!(f, "Coefficient source failed: {reason}")
            }
            StegErrors::NoSuchProperty(id) => {
                writeln!(f, "No such property with raw id {id}")
            }
            StegErrors::BadDimensions(wide, tall, v_samp) => {
                writeln!(
                    f,
                    "Bad channel dimensions {wide}x{tall} blocks with vertical sampling {v_samp}"
                )
            }
            StegErrors::NoMessage => {
                writeln!(f, "No recoverable message")
            }
            StegErrors::MessageOverflow(wanted, available) => {
                writeln!(
                    f,
                    "Message of {wanted} bytes exceeds the {available} bytes available"
                )
            }
            StegErrors::McuMap(reason) => {
                writeln!(f, "Cannot build the MCU selection map: {reason}")
            }
            StegErrors::Ecc(reason) => {
                writeln!(f, "Error correction failed: {reason}")
            }
            StegErrors::Checksum(stored, computed) => {
                writeln!(
                    f,
                    "Header checksum mismatch, stored {stored:#04x} but computed {computed:#04x}"
                )
            }
            StegErrors::NotEnoughFrequencies(found) => {
                writeln!(
                    f,
                    "Only {found} usable frequency positions in the quant table, need at least 4"
                )
            }
            StegErrors::Generic(val) => {
                writeln!(f, "{val}")
            }
        }
    }
}

impl Display for StegErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl From<&'static str> for StegErrors {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StegErrors {}
