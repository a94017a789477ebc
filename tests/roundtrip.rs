/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use nanorand::Rng;
use stegdct::{
    ChannelDims, CoefficientSource, Component, EccMethod, MemCoefficients, QuantTable,
    StegDecoder, StegEncoder, StegErrors, StegOptions
};

/// A synthetic cover: quant steps of 16 leave 15 levels at every AC
/// position, and the coefficients carry a deterministic non-flat pattern.
fn cover(wide: usize, tall: usize, v_samp: usize, components: &[Component]) -> MemCoefficients {
    let mut mem = MemCoefficients::new();
    let dims = ChannelDims::new(wide, tall, v_samp);

    for (n, &component) in components.iter().enumerate() {
        let blocks: Vec<[i16; 64]> = (0..dims.mcu_count())
            .map(|i| {
                let mut block = [0_i16; 64];
                for (j, coef) in block.iter_mut().enumerate() {
                    *coef = ((i * 31 + j * 7 + n * 13) % 11) as i16 - 5;
                }
                block
            })
            .collect();
        mem.add_plane(component, dims, QuantTable::new([16; 64]), blocks)
            .unwrap();
    }
    mem
}

/// ~12k MCUs of luminance, comfortably above every payload used here.
fn luma_cover() -> MemCoefficients {
    cover(128, 96, 1, &[Component::Y])
}

fn random_payload(len: usize, seed: u64) -> Vec<u8> {
    let mut payload = vec![0_u8; len];
    nanorand::WyRand::new_seed(seed).fill(&mut payload);
    payload
}

#[test]
fn hello_with_a_seed() {
    let mut image = luma_cover();
    let options = StegOptions::new().set_seed(12345).set_mcu_density(100);

    let embedded = StegEncoder::new(&mut image, options).embed(b"hello").unwrap();
    assert_eq!(embedded, 5);

    let recovered = StegDecoder::new(&image, options).extract().unwrap();
    assert_eq!(recovered, b"hello");
}

#[test]
fn unseeded_four_frequencies() {
    let mut image = luma_cover();
    let options = StegOptions::new()
        .set_seed(0)
        .set_n_freqs(4)
        .set_mcu_density(100);
    let payload = random_payload(1024, 0x00DE_FACE);

    StegEncoder::new(&mut image, options).embed(&payload).unwrap();

    let recovered = StegDecoder::new(&image, options).extract().unwrap();
    assert_eq!(recovered, payload);
}

#[test]
fn auto_density_picks_a_valid_density() {
    let mut image = luma_cover();
    let options = StegOptions::new().set_seed(7);
    assert_eq!(options.mcu_density(), stegdct::MCU_DENSITY_AUTO);
    let payload = random_payload(64, 0xA0A0);

    StegEncoder::new(&mut image, options).embed(&payload).unwrap();

    // the first MCU carries the density byte on the four leading pool
    // positions; with seed 7 its exact value is opaque here, but the
    // round trip proves the decoder accepted it as within [1,100]
    let recovered = StegDecoder::new(&image, options).extract().unwrap();
    assert_eq!(recovered, payload);
}

#[test]
fn reed_solomon_inner_code() {
    let mut image = luma_cover();
    let options = StegOptions::new()
        .set_seed(42)
        .set_mcu_density(50)
        .set_ecc_method(EccMethod::RsCode);
    let payload = random_payload(100, 0xEC0C);

    let embedded = StegEncoder::new(&mut image, options).embed(&payload).unwrap();
    assert_eq!(embedded, 100);

    let recovered = StegDecoder::new(&image, options).extract().unwrap();
    assert_eq!(recovered, payload);
}

#[test]
fn wrong_seed_is_rejected() {
    let mut image = luma_cover();
    let embed_options = StegOptions::new().set_seed(12345).set_mcu_density(100);
    StegEncoder::new(&mut image, embed_options)
        .embed(b"under the floorboards")
        .unwrap();

    let extract_options = StegOptions::new().set_seed(12346).set_mcu_density(100);
    let err = StegDecoder::new(&image, extract_options).extract().unwrap_err();
    assert!(matches!(
        err,
        StegErrors::Checksum(..) | StegErrors::NoMessage | StegErrors::MessageOverflow(..)
    ));
}

#[test]
fn header_bit_flip_fails_the_checksum() {
    let mut image = luma_cover();
    // seed 0, one frequency, full density: the frame occupies position 63
    // of consecutive blocks, header bits 8..48 in blocks 1..41
    let options = StegOptions::new().set_seed(0).set_mcu_density(100);
    StegEncoder::new(&mut image, options).embed(b"payload").unwrap();

    let row = image.block_row_mut(Component::Y, 0);
    // flip the length bit carried by block 5: stored values are -2 and 0
    row[5][63] = -2 - row[5][63];

    let err = StegDecoder::new(&image, options).extract().unwrap_err();
    assert!(matches!(err, StegErrors::Checksum(..)));
}

#[test]
fn three_channel_partition() {
    let comps = [Component::Y, Component::U, Component::V];
    let mut image = cover(64, 64, 1, &comps);
    let options = StegOptions::new()
        .set_seed(1)
        .set_mcu_density(100)
        .set_components(&comps);

    let total = StegEncoder::new(&mut image, options).capacity().unwrap();
    // 4096 MCUs per channel at one bit per MCU, minus the per-channel header
    assert_eq!(total, 3 * (4096 / 8 - 6));

    let payload = random_payload(total, 0x3CAB);
    let embedded = StegEncoder::new(&mut image, options).embed(&payload).unwrap();
    assert_eq!(embedded, payload.len());

    let recovered = StegDecoder::new(&image, options).extract().unwrap();
    assert_eq!(recovered, payload);
}

#[test]
fn chroma_subsampled_dimensions() {
    // luminance with a vertical sampling factor of 2, chroma at half height
    let mut image = MemCoefficients::new();
    let y_dims = ChannelDims::new(64, 32, 2);
    let u_dims = ChannelDims::new(64, 32, 1);
    for (component, dims) in [(Component::Y, y_dims), (Component::U, u_dims)] {
        let blocks = vec![[0_i16; 64]; dims.mcu_count()];
        image
            .add_plane(component, dims, QuantTable::new([16; 64]), blocks)
            .unwrap();
    }

    let options = StegOptions::new()
        .set_seed(99)
        .set_mcu_density(100)
        .set_components(&[Component::Y, Component::U]);
    let payload = random_payload(300, 0x5AB5);

    StegEncoder::new(&mut image, options).embed(&payload).unwrap();
    let recovered = StegDecoder::new(&image, options).extract().unwrap();
    assert_eq!(recovered, payload);
}

#[test]
fn overflowing_payload_is_refused() {
    let mut image = luma_cover();
    let options = StegOptions::new().set_seed(1).set_mcu_density(100);

    let capacity = StegEncoder::new(&mut image, options).capacity().unwrap();
    let payload = random_payload(capacity + 1, 0x0F10);

    let err = StegEncoder::new(&mut image, options).embed(&payload).unwrap_err();
    assert!(matches!(err, StegErrors::MessageOverflow(want, have) if want == capacity + 1 && have == capacity));
}

#[test]
fn empty_payload_round_trips() {
    let mut image = luma_cover();
    let options = StegOptions::new().set_seed(3).set_mcu_density(100);

    assert_eq!(StegEncoder::new(&mut image, options).embed(&[]).unwrap(), 0);
    assert_eq!(StegDecoder::new(&image, options).extract().unwrap(), Vec::<u8>::new());
}

#[test]
fn headerless_frames_round_trip_as_prefix() {
    let mut image = luma_cover();
    let options = StegOptions::new()
        .set_seed(5)
        .set_mcu_density(100)
        .set_embed_header(false);
    let payload = b"no header travels here";

    StegEncoder::new(&mut image, options).embed(payload).unwrap();

    // without a header the extractor returns the channel's whole budget;
    // the message length is the callers' shared secret
    let recovered = StegDecoder::new(&image, options).extract().unwrap();
    assert_eq!(recovered.len(), 128 * 96 / 8);
    assert_eq!(&recovered[..payload.len()], payload);
}

#[test]
fn two_bits_per_frequency() {
    let mut image = luma_cover();
    let options = StegOptions::new()
        .set_seed(31)
        .set_n_freqs(2)
        .set_bits_per_freq(2)
        .set_mcu_density(100);
    let payload = random_payload(2000, 0xB175);

    StegEncoder::new(&mut image, options).embed(&payload).unwrap();
    let recovered = StegDecoder::new(&image, options).extract().unwrap();
    assert_eq!(recovered, payload);
}

#[test]
fn clear_ac_and_dc_override_still_round_trip() {
    let mut image = luma_cover();
    let options = StegOptions::new()
        .set_seed(9)
        .set_mcu_density(100)
        .set_clear_ac(true)
        .set_set_dc(128);
    let payload = random_payload(256, 0xDC0A);

    StegEncoder::new(&mut image, options).embed(&payload).unwrap();

    // a dc target of 128 lands on zero after the level shift
    assert_eq!(image.blocks(Component::Y).unwrap()[0][0], 0);

    let recovered = StegDecoder::new(&image, options).extract().unwrap();
    assert_eq!(recovered, payload);
}

#[test]
fn extract_into_reports_short_buffers() {
    let mut image = luma_cover();
    let options = StegOptions::new().set_seed(11).set_mcu_density(100);
    StegEncoder::new(&mut image, options).embed(b"twelve bytes").unwrap();

    let decoder = StegDecoder::new(&image, options);

    let mut exact = [0_u8; 12];
    assert_eq!(decoder.extract_into(&mut exact).unwrap(), 12);
    assert_eq!(&exact, b"twelve bytes");

    let mut short = [0_u8; 6];
    let err = decoder.extract_into(&mut short).unwrap_err();
    assert!(matches!(err, StegErrors::MessageOverflow(12, 6)));
    assert_eq!(&short, b"twelve");
}
