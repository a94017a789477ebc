/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! This crate hides byte payloads inside the quantized DCT coefficients
//! of baseline JPEG images and recovers them with a shared integer seed.
//!
//! # Overview
//!
//! The payload travels as a framed bitstream: a 6-byte header (an MCU
//! density byte, a 4-byte little-endian length, an XOR checksum) followed
//! by the payload bytes, optionally expanded by an inner Reed-Solomon
//! code. The frame is scattered over the image by a seeded pseudo-random
//! walk: a Fisher-Yates permutation picks which MCUs carry data, and a
//! per-MCU shuffle of the usable frequency pool picks which coefficients
//! inside each block are rewritten. Both ends derive identical walks from
//! the seed alone, so a stego image plus the seed is all the extractor
//! needs.
//!
//! The JPEG codec itself stays out of this crate: coefficients come and
//! go through the [`CoefficientSource`] trait, so any entropy
//! decoder/encoder pair able to expose its per-channel block arrays can
//! sit underneath.
//!
//! # Usage
//!
//! Add stegdct to the dependencies in the project Cargo.toml
//!
//! ```toml
//! [dependencies]
//! stegdct = "0.1"
//! ```
//!
//! # Examples
//!
//! ## Embed and recover a message
//!
//! ```
//! use stegdct::{
//!     ChannelDims, Component, MemCoefficients, QuantTable, StegDecoder, StegEncoder,
//!     StegOptions
//! };
//!
//! let dims = ChannelDims::new(64, 64, 1);
//! let blocks = vec![[0_i16; 64]; dims.mcu_count()];
//! let mut cover = MemCoefficients::new();
//! cover
//!     .add_plane(Component::Y, dims, QuantTable::new([16; 64]), blocks)
//!     .unwrap();
//!
//! let options = StegOptions::new().set_seed(0xC0FFEE);
//!
//! let mut encoder = StegEncoder::new(&mut cover, options);
//! encoder.embed(b"meet at dawn").unwrap();
//!
//! let decoder = StegDecoder::new(&cover, options);
//! assert_eq!(decoder.extract().unwrap(), b"meet at dawn");
//! ```
//!
//! ## Check capacity before embedding
//!
//! ```
//! # use stegdct::{ChannelDims, Component, MemCoefficients, QuantTable, StegEncoder, StegOptions};
//! # let dims = ChannelDims::new(64, 64, 1);
//! # let blocks = vec![[0_i16; 64]; dims.mcu_count()];
//! # let mut cover = MemCoefficients::new();
//! # cover.add_plane(Component::Y, dims, QuantTable::new([16; 64]), blocks).unwrap();
//! let options = StegOptions::new().set_n_freqs(2).set_bits_per_freq(2);
//! let encoder = StegEncoder::new(&mut cover, options);
//! println!("room for {} bytes", encoder.capacity().unwrap());
//! ```
//!
//! # Crate features
//! - `std` (default): `std::error::Error` for [`StegErrors`]. Disable
//!   for `no_std + alloc` builds.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(
    clippy::correctness,
    clippy::perf,
    clippy::pedantic,
    clippy::inline_always,
    clippy::missing_errors_doc,
    clippy::panic
)]
#![allow(
    clippy::needless_return,
    clippy::similar_names,
    clippy::inline_always,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

extern crate alloc;
#[macro_use]
extern crate log;

pub use crate::components::{
    ChannelDims, CoeffBlock, CoefficientSource, Component, MemCoefficients, QuantTable, DCT_BLOCK
};
pub use crate::decoder::StegDecoder;
pub use crate::ecc::{EccCodec, RsCodec, DEFAULT_ECC_BLOCK_LEN};
pub use crate::encoder::StegEncoder;
pub use crate::errors::StegErrors;
pub use crate::lsb::{lsb_counts, set_lsbs, LsbAction};
pub use crate::options::{
    EccMethod, Property, StegOptions, DEFAULT_N_LEVELS, MCU_DENSITY_AUTO
};

mod bitstream;
mod capacity;
mod components;
mod decoder;
mod ecc;
mod encoder;
pub mod errors;
mod frequency;
mod lsb;
mod mcu_map;
mod options;
mod prng;
mod worker;
