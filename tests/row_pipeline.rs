//! End-to-end row pipeline: raw source bytes through `compose_row` into the
//! staging buffer, and staging rows through `writeback_row` into raw
//! destination bytes.

use blitline::{
    ArgbU16, BlitlineError, ColorEncoding, ColorParams, ColorRange, FrameInfo, LineBuffer,
    PixelFormat, PlaneLayout, Rect, SourceJob, Transform, WritebackJob, compose_row,
    writeback_row,
};

/// Sequential plane offsets with no padding, as a caller would map a
/// freshly allocated dumb buffer.
fn tight_layout(format: PixelFormat, width: u32, height: u32) -> (Vec<PlaneLayout>, usize) {
    let mut planes = Vec::with_capacity(format.plane_count());
    let mut offset = 0usize;
    for plane in 0..format.plane_count() {
        let pitch =
            (width as usize).div_ceil(format.plane_hsub(plane) as usize) * format.cpp(plane);
        let rows = (height as usize).div_ceil(format.plane_vsub(plane) as usize);
        planes.push(PlaneLayout { offset, pitch });
        offset += pitch * rows;
    }
    (planes, offset)
}

fn full_frame(format: PixelFormat, width: u32, height: u32) -> FrameInfo {
    let (planes, _) = tight_layout(format, width, height);
    FrameInfo::new(
        format,
        &planes,
        width,
        height,
        Rect::new(0, 0, (width as i32) << 16, (height as i32) << 16),
        Rect::new(0, 0, width as i32, height as i32),
        Transform::default(),
    )
    .unwrap()
}

fn bt601_limited() -> ColorParams {
    ColorParams {
        encoding: ColorEncoding::Bt601,
        range: ColorRange::Limited,
    }
}

fn convert(
    src_format: PixelFormat,
    src_bytes: &[u8],
    dst_format: PixelFormat,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let source = SourceJob::new(
        full_frame(src_format, width, height),
        src_bytes,
        bt601_limited(),
    )
    .unwrap();

    let (_, dst_len) = tight_layout(dst_format, width, height);
    let mut dst_bytes = vec![0u8; dst_len];
    let mut dst = WritebackJob::new(full_frame(dst_format, width, height), &mut dst_bytes).unwrap();

    let mut staging = LineBuffer::new(width as usize);
    for y in 0..height as i32 {
        compose_row(&mut staging, &source, y);
        writeback_row(&mut dst, &staging, y);
    }
    drop(dst);
    dst_bytes
}

#[test]
fn argb8888_roundtrips_exactly() {
    let bytes: Vec<u8> = (0u16..4 * 4 * 4).map(|v| (v * 7 % 256) as u8).collect();
    let out = convert(PixelFormat::Argb8888, &bytes, PixelFormat::Argb8888, 4, 4);
    assert_eq!(out, bytes);
}

#[test]
fn argb16161616_roundtrips_exactly() {
    let bytes: Vec<u8> = (0u32..2 * 2 * 8).map(|v| (v * 37 % 256) as u8).collect();
    let out = convert(
        PixelFormat::Argb16161616,
        &bytes,
        PixelFormat::Argb16161616,
        2,
        2,
    );
    assert_eq!(out, bytes);
}

#[test]
fn rgb565_roundtrips_exactly() {
    let words: [u16; 6] = [0x0000, 0xffff, 0x1234, 0xabcd, 0x07e0, 0xf81f];
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    let out = convert(PixelFormat::Rgb565, &bytes, PixelFormat::Rgb565, 6, 1);
    assert_eq!(out, bytes);
}

#[test]
fn xrgb8888_destination_discards_alpha() {
    // translucent red source pixel
    let bytes = [0x00u8, 0x00, 0xff, 0x40];
    let out = convert(PixelFormat::Argb8888, &bytes, PixelFormat::Xrgb8888, 1, 1);
    assert_eq!(out, [0x00, 0x00, 0xff, 0xff]);
}

#[test]
fn wide_xrgb16161616_converts_to_8888() {
    // 16-bit channels on exact 257 steps reduce losslessly
    let px = [200u16 * 257, 100 * 257, 50 * 257];
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&px[2].to_le_bytes()); // b
    bytes.extend_from_slice(&px[1].to_le_bytes()); // g
    bytes.extend_from_slice(&px[0].to_le_bytes()); // r
    bytes.extend_from_slice(&0u16.to_le_bytes()); // padding
    let out = convert(
        PixelFormat::Xrgb16161616,
        &bytes,
        PixelFormat::Xrgb8888,
        1,
        1,
    );
    assert_eq!(out, [50, 100, 200, 0xff]);
}

#[test]
fn nv12_constant_color_roundtrips_within_one_step() {
    let (width, height) = (4u32, 4u32);
    let color = ArgbU16::opaque(200 * 257, 100 * 257, 50 * 257);

    let (_, nv12_len) = tight_layout(PixelFormat::Nv12, width, height);
    let mut nv12 = vec![0u8; nv12_len];
    let mut dst = WritebackJob::new(full_frame(PixelFormat::Nv12, width, height), &mut nv12).unwrap();

    let mut staging = LineBuffer::new(width as usize);
    staging.pixels_mut().fill(color);
    for y in 0..height as i32 {
        writeback_row(&mut dst, &staging, y);
    }
    drop(dst);

    let source = SourceJob::new(
        full_frame(PixelFormat::Nv12, width, height),
        &nv12,
        bt601_limited(),
    )
    .unwrap();
    let want = color.to_rgba8();
    for y in 0..height as i32 {
        compose_row(&mut staging, &source, y);
        for px in staging.pixels() {
            let got = px.to_rgba8();
            for c in 0..3 {
                assert!(
                    got[c].abs_diff(want[c]) <= 1,
                    "row {y}: channel {c} expected ~{}, got {}",
                    want[c],
                    got[c]
                );
            }
            assert_eq!(got[3], 255);
        }
    }
}

#[test]
fn planar_and_semi_planar_sources_agree() {
    // the same 4:2:0 image laid out as NV12, NV21 and YUV420 decodes
    // identically
    let (width, height) = (4u32, 2u32);
    let luma = [0x20u8, 0x40, 0x60, 0x80, 0x90, 0xa0, 0xb0, 0xc0];
    let cb = [0x30u8, 0xd0];
    let cr = [0xe0u8, 0x50];

    let mut nv12 = Vec::new();
    nv12.extend_from_slice(&luma);
    nv12.extend_from_slice(&[cb[0], cr[0], cb[1], cr[1]]);

    let mut nv21 = Vec::new();
    nv21.extend_from_slice(&luma);
    nv21.extend_from_slice(&[cr[0], cb[0], cr[1], cb[1]]);

    let mut yuv420 = Vec::new();
    yuv420.extend_from_slice(&luma);
    yuv420.extend_from_slice(&cb);
    yuv420.extend_from_slice(&cr);

    let mut yvu420 = Vec::new();
    yvu420.extend_from_slice(&luma);
    yvu420.extend_from_slice(&cr);
    yvu420.extend_from_slice(&cb);

    let layouts = [
        (PixelFormat::Nv12, nv12),
        (PixelFormat::Nv21, nv21),
        (PixelFormat::Yuv420, yuv420),
        (PixelFormat::Yvu420, yvu420),
    ];

    let mut decoded: Vec<Vec<ArgbU16>> = Vec::new();
    for (format, bytes) in &layouts {
        let source =
            SourceJob::new(full_frame(*format, width, height), bytes, bt601_limited()).unwrap();
        let mut staging = LineBuffer::new(width as usize);
        let mut pixels = Vec::new();
        for y in 0..height as i32 {
            compose_row(&mut staging, &source, y);
            pixels.extend_from_slice(staging.pixels());
        }
        decoded.push(pixels);
    }

    for other in &decoded[1..] {
        assert_eq!(&decoded[0], other);
    }
}

#[test]
fn nv16_and_nv24_subsample_only_where_defined() {
    // 4:2:2 shares chroma horizontally but not vertically; 4:4:4 shares
    // nothing
    let (width, height) = (2u32, 2u32);
    let luma = [0x80u8; 4];

    let mut nv16 = luma.to_vec();
    nv16.extend_from_slice(&[0x30, 0xe0]); // row 0 chroma
    nv16.extend_from_slice(&[0xd0, 0x50]); // row 1 chroma
    let source = SourceJob::new(
        full_frame(PixelFormat::Nv16, width, height),
        &nv16,
        bt601_limited(),
    )
    .unwrap();
    let mut staging = LineBuffer::new(width as usize);
    compose_row(&mut staging, &source, 0);
    let row0 = staging.pixels().to_vec();
    compose_row(&mut staging, &source, 1);
    let row1 = staging.pixels().to_vec();
    assert_eq!(row0[0], row0[1], "422 shares chroma across the pair");
    assert_ne!(row0[0], row1[0], "422 does not share chroma across rows");

    let mut nv24 = luma.to_vec();
    nv24.extend_from_slice(&[0x30, 0xe0, 0xd0, 0x50]); // row 0: two distinct pairs
    nv24.extend_from_slice(&[0x30, 0xe0, 0xd0, 0x50]);
    let source = SourceJob::new(
        full_frame(PixelFormat::Nv24, width, height),
        &nv24,
        bt601_limited(),
    )
    .unwrap();
    compose_row(&mut staging, &source, 0);
    assert_ne!(staging.pixels()[0], staging.pixels()[1], "444 is not subsampled");
}

#[test]
fn writeback_truncates_at_staging_capacity() {
    let (width, height) = (8u32, 1u32);
    let mut bytes = vec![0u8; width as usize * 4];
    let mut dst =
        WritebackJob::new(full_frame(PixelFormat::Xrgb8888, width, height), &mut bytes).unwrap();

    let mut staging = LineBuffer::new(4);
    staging.pixels_mut().fill(ArgbU16::opaque(0xffff, 0xffff, 0xffff));
    writeback_row(&mut dst, &staging, 0);
    drop(dst);

    assert_eq!(&bytes[0..16], &[0xff; 16]);
    assert_eq!(&bytes[16..], &[0u8; 16], "pixels past the staging capacity stay untouched");
}

#[test]
fn odd_source_offset_keeps_chroma_phase() {
    // sampling a 2-wide window starting at x=1 must straddle two chroma
    // blocks
    let (width, height) = (4u32, 2u32);
    let (planes, _) = tight_layout(PixelFormat::Nv12, width, height);
    let info = FrameInfo::new(
        PixelFormat::Nv12,
        &planes,
        width,
        height,
        Rect::new(1 << 16, 0, 3 << 16, 2 << 16),
        Rect::new(0, 0, 2, 2),
        Transform::default(),
    )
    .unwrap();

    let mut bytes = vec![0x80u8; 8];
    bytes.extend_from_slice(&[0x30, 0xe0, 0xd0, 0x50]); // chroma blocks 0 and 1
    let source = SourceJob::new(info, &bytes, bt601_limited()).unwrap();

    let mut staging = LineBuffer::new(2);
    compose_row(&mut staging, &source, 0);
    assert_ne!(
        staging.pixels()[0],
        staging.pixels()[1],
        "x=1 and x=2 live in different chroma blocks"
    );
}

#[test]
fn unknown_encoding_composes_black_rows() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let (width, height) = (2u32, 2u32);
    let (_, len) = tight_layout(PixelFormat::Nv12, width, height);
    let bytes = vec![0x80u8; len];
    let source = SourceJob::new(
        full_frame(PixelFormat::Nv12, width, height),
        &bytes,
        ColorParams {
            encoding: ColorEncoding::Unknown,
            range: ColorRange::Full,
        },
    )
    .unwrap();

    let mut staging = LineBuffer::new(width as usize);
    for y in 0..height as i32 {
        compose_row(&mut staging, &source, y);
        for px in staging.pixels() {
            assert_eq!((px.a, px.r, px.g, px.b), (0xffff, 0, 0, 0));
        }
    }
}

#[test]
fn registry_misses_surface_before_any_row_work() {
    let (width, height) = (2u32, 2u32);
    let (_, len) = tight_layout(PixelFormat::Yvu444, width, height);
    let mut bytes = vec![0u8; len];
    match WritebackJob::new(full_frame(PixelFormat::Yvu444, width, height), &mut bytes) {
        Err(BlitlineError::UnsupportedFormat(f)) => assert_eq!(f, PixelFormat::Yvu444),
        other => panic!("expected unsupported-format error, got {:?}", other.map(|_| ())),
    }
}
