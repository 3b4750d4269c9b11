//! Per-format pixel encoders: normalized ARGB back to raw destination bytes.

use crate::color::argb_to_yuv;
use crate::fixed::Fixed;
use crate::frame::FrameInfo;
use crate::pixel::{ArgbU16, div_round_closest};

const RB_RATIO: Fixed = Fixed::from_int(65535).div(Fixed::from_int(31));
const G_RATIO: Fixed = Fixed::from_int(65535).div(Fixed::from_int(63));

/// Encoding strategy for one destination format.
///
/// Packed strategies write one pixel at a time through [`Encoder::write`];
/// `SemiPlanarYuv420` is row-granular because its chroma samples cover 2x2
/// pixel blocks (see [`write_semi_planar_yuv420_row`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoder {
    Argb8888,
    Xrgb8888,
    Argb16161616,
    Xrgb16161616,
    Rgb565,
    SemiPlanarYuv420,
}

impl Encoder {
    /// Write one pixel of a packed strategy. `dst` starts at the pixel's
    /// first byte and must span the format's bytes-per-pixel.
    pub(crate) fn write(self, dst: &mut [u8], px: &ArgbU16) {
        match self {
            // Same little-endian b, g, r[, a] order the decoders read;
            // channels reduce by round-to-nearest division.
            Encoder::Argb8888 => {
                dst[3] = div_round_closest(px.a, 257) as u8;
                dst[2] = div_round_closest(px.r, 257) as u8;
                dst[1] = div_round_closest(px.g, 257) as u8;
                dst[0] = div_round_closest(px.b, 257) as u8;
            }
            Encoder::Xrgb8888 => {
                dst[3] = 0xff;
                dst[2] = div_round_closest(px.r, 257) as u8;
                dst[1] = div_round_closest(px.g, 257) as u8;
                dst[0] = div_round_closest(px.b, 257) as u8;
            }
            Encoder::Argb16161616 => {
                dst[6..8].copy_from_slice(&px.a.to_le_bytes());
                dst[4..6].copy_from_slice(&px.r.to_le_bytes());
                dst[2..4].copy_from_slice(&px.g.to_le_bytes());
                dst[0..2].copy_from_slice(&px.b.to_le_bytes());
            }
            Encoder::Xrgb16161616 => {
                dst[6..8].copy_from_slice(&0xffffu16.to_le_bytes());
                dst[4..6].copy_from_slice(&px.r.to_le_bytes());
                dst[2..4].copy_from_slice(&px.g.to_le_bytes());
                dst[0..2].copy_from_slice(&px.b.to_le_bytes());
            }
            Encoder::Rgb565 => {
                let r = Fixed::from_int(i32::from(px.r)).div(RB_RATIO).to_int_round() as u16;
                let g = Fixed::from_int(i32::from(px.g)).div(G_RATIO).to_int_round() as u16;
                let b = Fixed::from_int(i32::from(px.b)).div(RB_RATIO).to_int_round() as u16;
                dst[0..2].copy_from_slice(&(r << 11 | g << 5 | b).to_le_bytes());
            }
            Encoder::SemiPlanarYuv420 => {
                debug_assert!(false, "row-granular strategy has no per-pixel path");
            }
        }
    }
}

/// Drain one staging row into an NV12 destination.
///
/// Luma is written at full resolution. One Cb/Cr pair is written per 2x2
/// block, sampled from the block's top-left pixel only: chroma is stored
/// when both absolute coordinates are even and skipped otherwise, so the
/// block is represented by a single sample rather than an average.
pub(crate) fn write_semi_planar_yuv420_row(
    info: &FrameInfo,
    data: &mut [u8],
    pixels: &[ArgbU16],
    y: i32,
) {
    let x_dst = info.dst().x1;
    let luma_start = info.plane_offset(0, x_dst, y);

    for (x, px) in pixels.iter().enumerate() {
        let (luma, cb, cr) = argb_to_yuv(px);
        data[luma_start + x] = luma;

        let x_abs = x_dst + x as i32;
        if x_abs % 2 == 0 && y % 2 == 0 {
            let chroma = info.plane_offset(1, x_abs, y);
            data[chroma] = cb;
            data[chroma + 1] = cr;
        }
    }
}
