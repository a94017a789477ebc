/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The pluggable inner error-correcting code.
//!
//! The embedder treats error correction as a byte-level transform applied
//! before framing: the payload is encoded, the frame's length field then
//! carries the encoded length, and the extractor undoes the transform
//! after recovering the bytes. The transform itself lives behind
//! [`EccCodec`] so the underlying primitive stays replaceable.
//!
//! [`RsCodec`] is the Reed-Solomon implementation over the `reed-solomon`
//! crate. The payload is cut into blocks of `block_len` total bytes, each
//! holding `block_len - 32` data bytes plus 32 parity symbols, correcting
//! up to 16 corrupted bytes per block. A short tail block keeps its 32
//! parity symbols, so the encoded length always reveals the block
//! structure to the decoder.

use alloc::vec::Vec;

use reed_solomon::{Decoder, Encoder};

use crate::errors::StegErrors;

/// Parity symbols appended to every block.
pub(crate) const RS_PARITY: usize = 32;

/// Default total block length, parity included.
pub const DEFAULT_ECC_BLOCK_LEN: usize = 200;

/// A byte-level inner code: `decode(encode(m))` is `m`, with `encode`
/// inflating the payload by a deterministic, length-derivable overhead.
pub trait EccCodec {
    /// Encode a payload, returning the expanded byte stream.
    ///
    /// # Errors
    /// Returns [`StegErrors::Ecc`] when the payload cannot be encoded.
    fn encode(&self, msg: &[u8]) -> Result<Vec<u8>, StegErrors>;

    /// Decode `usable_len` bytes of an encoded stream back to plaintext.
    ///
    /// # Errors
    /// Returns [`StegErrors::Ecc`] when too much of the stream is
    /// corrupted to recover.
    fn decode(&self, data: &[u8], usable_len: usize) -> Result<Vec<u8>, StegErrors>;

    /// Trim a recovered stream length to the decodable boundary.
    ///
    /// Returns 0 when the length cannot belong to an encoded stream.
    fn block_length(&self, nbytes: usize) -> usize;

    /// Plaintext bytes that fit into `raw_bytes` of encoded space.
    fn capacity(&self, raw_bytes: usize) -> usize;
}

/// Reed-Solomon codec with 32 parity symbols per block.
pub struct RsCodec {
    block_len: usize
}

impl RsCodec {
    /// Create a codec with the given total block length.
    ///
    /// # Errors
    /// Returns [`StegErrors::Ecc`] unless `block_len` lies in `33..=255`
    /// (a block must hold at least one data byte next to its 32 parity
    /// symbols, and the field limits a block to 255 symbols).
    pub fn new(block_len: usize) -> Result<RsCodec, StegErrors> {
        if block_len <= RS_PARITY || block_len > 255 {
            return Err(StegErrors::Ecc("block length must be in 33..=255"));
        }
        Ok(RsCodec { block_len })
    }

    const fn data_len(&self) -> usize {
        self.block_len - RS_PARITY
    }
}

impl EccCodec for RsCodec {
    fn encode(&self, msg: &[u8]) -> Result<Vec<u8>, StegErrors> {
        let encoder = Encoder::new(RS_PARITY);
        let blocks = msg.len().div_ceil(self.data_len());
        let mut out = Vec::with_capacity(msg.len() + blocks * RS_PARITY);

        for chunk in msg.chunks(self.data_len()) {
            out.extend_from_slice(&encoder.encode(chunk));
        }
        Ok(out)
    }

    fn decode(&self, data: &[u8], usable_len: usize) -> Result<Vec<u8>, StegErrors> {
        if usable_len > data.len() {
            return Err(StegErrors::Ecc("usable length exceeds the recovered stream"));
        }
        let decoder = Decoder::new(RS_PARITY);
        let mut out = Vec::with_capacity(usable_len);

        for chunk in data[..usable_len].chunks(self.block_len) {
            if chunk.len() <= RS_PARITY {
                return Err(StegErrors::Ecc("trailing block shorter than its parity"));
            }
            let corrected = decoder
                .correct(chunk, None)
                .map_err(|_| StegErrors::Ecc("too many corrupted symbols in a block"))?;
            out.extend_from_slice(corrected.data());
        }
        Ok(out)
    }

    fn block_length(&self, nbytes: usize) -> usize {
        let tail = nbytes % self.block_len;
        if tail == 0 || tail > RS_PARITY {
            nbytes
        } else {
            // a tail that cannot hold parity is garbage, drop it
            nbytes - tail
        }
    }

    fn capacity(&self, raw_bytes: usize) -> usize {
        let full = raw_bytes / self.block_len;
        let tail = raw_bytes % self.block_len;

        full * self.data_len() + tail.saturating_sub(RS_PARITY)
    }
}
