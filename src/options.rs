/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Codec configuration
#![allow(clippy::zero_prefixed_literal)]

use crate::components::Component;
use crate::ecc::DEFAULT_ECC_BLOCK_LEN;
use crate::errors::StegErrors;

/// Sentinel density meaning "size the density to the payload".
pub const MCU_DENSITY_AUTO: i32 = -1;

/// Default minimum number of representable levels per usable frequency.
pub const DEFAULT_N_LEVELS: u16 = 8;

/// Inner error-correction methods.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EccMethod {
    /// No inner code; the payload is framed as-is
    None,
    /// Reed-Solomon blocks, see [`crate::RsCodec`]
    RsCode
}

/// Property ids for the dynamic accessors, mirroring the builder setters
/// one to one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Property {
    /// Output JPEG quality hint for the external encoder, `-1` keeps the
    /// source quality
    Quality,
    /// Legacy flag for header-less mode: the length is a shared secret
    EmbedLength,
    /// Inner code selection, see [`EccMethod`]
    EccMethod,
    /// Total Reed-Solomon block length in bytes
    EccBlockLen,
    /// The shared 32-bit seed; 0 disables randomization
    PrnSeed,
    /// Minimum quanta for a frequency to be usable
    NLevels,
    /// Frequencies written per MCU; 0 means every candidate
    NFreqs,
    /// Size of the candidate frequency pool
    MaxFreqs,
    /// Bits stored per selected frequency
    BitsPerFreq,
    /// Percentage of MCUs used, or -1 for auto
    McuDensity,
    /// Whether the self-describing header is embedded
    EmbedHeader,
    /// Whether the provider should expose unquantized coefficients
    Normalize,
    /// DC override for touched MCUs, -1 to leave DC alone
    SetDc,
    /// Zero all unwritten AC coefficients of touched MCUs
    ClearAc
}

impl Property {
    /// Look a property up by its raw integer id, the order of the
    /// variants above starting at 0.
    ///
    /// # Errors
    /// [`StegErrors::NoSuchProperty`] for ids outside the table.
    pub fn from_raw(id: i32) -> Result<Property, StegErrors> {
        use Property::*;
        const TABLE: [Property; 14] = [
            Quality,
            EmbedLength,
            EccMethod,
            EccBlockLen,
            PrnSeed,
            NLevels,
            NFreqs,
            MaxFreqs,
            BitsPerFreq,
            McuDensity,
            EmbedHeader,
            Normalize,
            SetDc,
            ClearAc
        ];
        usize::try_from(id)
            .ok()
            .and_then(|i| TABLE.get(i).copied())
            .ok_or(StegErrors::NoSuchProperty(id))
    }
}

/// Embedding and extraction tunables.
///
/// Everything that influences the traversal is here; the embedder and
/// the extractor must be handed identical options (and the same seed) or
/// the extractor will reject the frame at its checksum.
#[derive(Copy, Clone, Debug)]
pub struct StegOptions {
    /// Output quality hint for the external JPEG encoder.
    ///
    /// - Default value: -1 (preserve the source quality)
    quality:       i32,
    /// Legacy header-less-mode flag: message length travels out of band.
    ///
    /// - Default value: true
    embed_length:  bool,
    /// Inner code applied to the payload before framing.
    ///
    /// - Default value: [`EccMethod::None`]
    ecc_method:    EccMethod,
    /// Total Reed-Solomon block length.
    ///
    /// - Default value: 200
    ecc_block_len: usize,
    /// Shared seed driving MCU and frequency selection; 0 disables all
    /// randomization.
    ///
    /// - Default value: 0
    seed:          u32,
    /// Minimum representable levels for a frequency to qualify.
    ///
    /// - Default value: 8
    n_levels:      u16,
    /// Frequencies written per MCU; 0 selects every candidate.
    ///
    /// - Default value: 1
    n_freqs:       usize,
    /// Candidate pool size; at least 4 so the density byte fits.
    ///
    /// - Default value: 6
    max_freqs:     usize,
    /// Bits stored per written frequency.
    ///
    /// - Default value: 1
    bits_per_freq: usize,
    /// Percentage of MCUs carrying data, or [`MCU_DENSITY_AUTO`].
    ///
    /// - Default value: auto
    mcu_density:   i32,
    /// Embed the density/length/checksum header.
    ///
    /// - Default value: true
    embed_header:  bool,
    /// Ask the provider for unquantized DCT coefficients.
    ///
    /// - Default value: false
    normalize:     bool,
    /// When non-negative, force the DC term of touched MCUs to this
    /// average pixel value.
    ///
    /// - Default value: -1
    set_dc:        i32,
    /// Zero unwritten AC coefficients of touched MCUs.
    ///
    /// - Default value: false
    clear_ac:      bool,
    components:    [Option<Component>; 3]
}

impl Default for StegOptions {
    fn default() -> Self {
        StegOptions {
            quality:       -1,
            embed_length:  true,
            ecc_method:    EccMethod::None,
            ecc_block_len: DEFAULT_ECC_BLOCK_LEN,
            seed:          0,
            n_levels:      DEFAULT_N_LEVELS,
            n_freqs:       1,
            max_freqs:     6,
            bits_per_freq: 1,
            mcu_density:   MCU_DENSITY_AUTO,
            embed_header:  true,
            normalize:     false,
            set_dc:        -1,
            clear_ac:      false,
            components:    [Some(Component::Y), None, None]
        }
    }
}

impl StegOptions {
    /// Options with every default.
    #[must_use]
    pub fn new() -> StegOptions {
        StegOptions::default()
    }

    /// Options requesting at least `n_levels` quanta per frequency;
    /// 0 falls back to the default of 8.
    #[must_use]
    pub fn with_levels(n_levels: u16) -> StegOptions {
        let n_levels = if n_levels == 0 {
            DEFAULT_N_LEVELS
        } else {
            n_levels
        };
        StegOptions {
            n_levels,
            ..StegOptions::default()
        }
    }

    #[must_use]
    pub const fn quality(&self) -> i32 {
        self.quality
    }

    #[must_use]
    pub fn set_quality(mut self, quality: i32) -> StegOptions {
        self.quality = quality;
        self
    }

    #[must_use]
    pub const fn embed_length(&self) -> bool {
        self.embed_length
    }

    #[must_use]
    pub fn set_embed_length(mut self, yes: bool) -> StegOptions {
        self.embed_length = yes;
        self
    }

    #[must_use]
    pub const fn ecc_method(&self) -> EccMethod {
        self.ecc_method
    }

    #[must_use]
    pub fn set_ecc_method(mut self, method: EccMethod) -> StegOptions {
        self.ecc_method = method;
        self
    }

    #[must_use]
    pub const fn ecc_block_len(&self) -> usize {
        self.ecc_block_len
    }

    #[must_use]
    pub fn set_ecc_block_len(mut self, len: usize) -> StegOptions {
        self.ecc_block_len = len;
        self
    }

    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    #[must_use]
    pub fn set_seed(mut self, seed: u32) -> StegOptions {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn n_levels(&self) -> u16 {
        self.n_levels
    }

    #[must_use]
    pub fn set_n_levels(mut self, n_levels: u16) -> StegOptions {
        self.n_levels = n_levels;
        self
    }

    #[must_use]
    pub const fn n_freqs(&self) -> usize {
        self.n_freqs
    }

    #[must_use]
    pub fn set_n_freqs(mut self, n_freqs: usize) -> StegOptions {
        self.n_freqs = n_freqs;
        self
    }

    #[must_use]
    pub const fn max_freqs(&self) -> usize {
        self.max_freqs
    }

    #[must_use]
    pub fn set_max_freqs(mut self, max_freqs: usize) -> StegOptions {
        self.max_freqs = max_freqs;
        self
    }

    #[must_use]
    pub const fn bits_per_freq(&self) -> usize {
        self.bits_per_freq
    }

    #[must_use]
    pub fn set_bits_per_freq(mut self, bits: usize) -> StegOptions {
        self.bits_per_freq = bits;
        self
    }

    #[must_use]
    pub const fn mcu_density(&self) -> i32 {
        self.mcu_density
    }

    #[must_use]
    pub fn set_mcu_density(mut self, density: i32) -> StegOptions {
        self.mcu_density = density;
        self
    }

    #[must_use]
    pub const fn embed_header(&self) -> bool {
        self.embed_header
    }

    #[must_use]
    pub fn set_embed_header(mut self, yes: bool) -> StegOptions {
        self.embed_header = yes;
        self
    }

    #[must_use]
    pub const fn normalize(&self) -> bool {
        self.normalize
    }

    #[must_use]
    pub fn set_normalize(mut self, yes: bool) -> StegOptions {
        self.normalize = yes;
        self
    }

    #[must_use]
    pub const fn set_dc(&self) -> i32 {
        self.set_dc
    }

    #[must_use]
    pub fn set_set_dc(mut self, value: i32) -> StegOptions {
        self.set_dc = value;
        self
    }

    #[must_use]
    pub const fn clear_ac(&self) -> bool {
        self.clear_ac
    }

    #[must_use]
    pub fn set_clear_ac(mut self, yes: bool) -> StegOptions {
        self.clear_ac = yes;
        self
    }

    /// Select the channels used for embedding, in order.
    ///
    /// Duplicates are ignored; an empty list falls back to luminance
    /// only. At most three channels are kept.
    #[must_use]
    pub fn set_components(mut self, components: &[Component]) -> StegOptions {
        let mut picked = [None; 3];
        let mut n = 0;

        for &c in components {
            if n == picked.len() {
                break;
            }
            if !picked.contains(&Some(c)) {
                picked[n] = Some(c);
                n += 1;
            }
        }
        if n == 0 {
            picked[0] = Some(Component::Y);
        }
        self.components = picked;
        self
    }

    /// Iterate over the enabled channels in their configured order.
    pub fn enabled_components(&self) -> impl Iterator<Item = Component> {
        self.components.into_iter().flatten()
    }

    /// Read a property through its id.
    #[must_use]
    pub fn property(&self, prop: Property) -> i64 {
        match prop {
            Property::Quality => i64::from(self.quality),
            Property::EmbedLength => i64::from(self.embed_length),
            Property::EccMethod => match self.ecc_method {
                EccMethod::None => 0,
                EccMethod::RsCode => 1
            },
            Property::EccBlockLen => self.ecc_block_len as i64,
            Property::PrnSeed => i64::from(self.seed),
            Property::NLevels => i64::from(self.n_levels),
            Property::NFreqs => self.n_freqs as i64,
            Property::MaxFreqs => self.max_freqs as i64,
            Property::BitsPerFreq => self.bits_per_freq as i64,
            Property::McuDensity => i64::from(self.mcu_density),
            Property::EmbedHeader => i64::from(self.embed_header),
            Property::Normalize => i64::from(self.normalize),
            Property::SetDc => i64::from(self.set_dc),
            Property::ClearAc => i64::from(self.clear_ac)
        }
    }

    /// Set a property through its id, returning the stored value.
    ///
    /// Values are stored as given; range handling happens where the
    /// value is used, exactly as with the typed setters. An unknown ECC
    /// method id falls back to [`EccMethod::None`].
    pub fn set_property(&mut self, prop: Property, value: i64) -> i64 {
        match prop {
            Property::Quality => self.quality = value as i32,
            Property::EmbedLength => self.embed_length = value != 0,
            Property::EccMethod => {
                self.ecc_method = if value == 1 {
                    EccMethod::RsCode
                } else {
                    EccMethod::None
                };
            }
            Property::EccBlockLen => self.ecc_block_len = value as usize,
            Property::PrnSeed => self.seed = value as u32,
            Property::NLevels => self.n_levels = value as u16,
            Property::NFreqs => self.n_freqs = value as usize,
            Property::MaxFreqs => self.max_freqs = value as usize,
            Property::BitsPerFreq => self.bits_per_freq = value as usize,
            Property::McuDensity => self.mcu_density = value as i32,
            Property::EmbedHeader => self.embed_header = value != 0,
            Property::Normalize => self.normalize = value != 0,
            Property::SetDc => self.set_dc = value as i32,
            Property::ClearAc => self.clear_ac = value != 0
        }
        self.property(prop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_format() {
        let opts = StegOptions::new();
        assert_eq!(opts.n_levels(), 8);
        assert_eq!(opts.n_freqs(), 1);
        assert_eq!(opts.max_freqs(), 6);
        assert_eq!(opts.bits_per_freq(), 1);
        assert_eq!(opts.mcu_density(), MCU_DENSITY_AUTO);
        assert!(opts.embed_header());
        assert_eq!(opts.ecc_method(), EccMethod::None);
        let comps: alloc::vec::Vec<Component> = opts.enabled_components().collect();
        assert_eq!(comps, [Component::Y]);
    }

    #[test]
    fn duplicate_components_are_ignored() {
        let opts = StegOptions::new().set_components(&[
            Component::Y,
            Component::U,
            Component::Y,
            Component::V
        ]);
        let comps: alloc::vec::Vec<Component> = opts.enabled_components().collect();
        assert_eq!(comps, [Component::Y, Component::U, Component::V]);
    }

    #[test]
    fn property_round_trip() {
        let mut opts = StegOptions::new();
        assert_eq!(opts.set_property(Property::PrnSeed, 12345), 12345);
        assert_eq!(opts.property(Property::PrnSeed), 12345);
        assert_eq!(opts.set_property(Property::McuDensity, 55), 55);
        assert_eq!(opts.mcu_density(), 55);
        // out-of-table ECC methods collapse to none
        opts.set_property(Property::EccMethod, 9);
        assert_eq!(opts.ecc_method(), EccMethod::None);
    }

    #[test]
    fn unknown_raw_property_id() {
        assert!(Property::from_raw(3).is_ok());
        assert!(matches!(
            Property::from_raw(99),
            Err(StegErrors::NoSuchProperty(99))
        ));
        assert!(Property::from_raw(-1).is_err());
    }

    #[test]
    fn zero_levels_falls_back_to_default() {
        assert_eq!(StegOptions::with_levels(0).n_levels(), 8);
        assert_eq!(StegOptions::with_levels(12).n_levels(), 12);
    }
}
