//! YCbCr colorimetry: fixed-point conversion matrices for the supported
//! encoding standards, and the integer RGB->YCbCr path used when writing
//! planar destinations.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::fixed::Fixed;
use crate::pixel::{ArgbU16, div_round_closest};

/// YCbCr encoding standard carried per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorEncoding {
    #[default]
    Bt601,
    Bt709,
    Bt2020,
    /// An encoding tag this engine does not implement. Descriptors are
    /// populated from external property values, which can carry standards
    /// outside the supported set.
    Unknown,
}

/// Whether samples span the full byte range or the restricted studio range
/// (16-235 luma, 16-240 chroma).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRange {
    #[default]
    Limited,
    Full,
}

/// Encoding and range, carried per plane/frame rather than per pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColorParams {
    pub encoding: ColorEncoding,
    pub range: ColorRange,
}

type Matrix = [[Fixed; 3]; 3];

/// Matrix entry from a standard's defining ratio: `v` is the coefficient in
/// units of 1/10000, `r` the excursion the sample range is normalized by
/// (219/224 studio, 255 full). Pre-scaled by 2^16-1 so the multiply-
/// accumulate lands directly in the 16-bit channel range.
const fn coeff(v: i64, r: i32) -> Fixed {
    Fixed::from_fraction(v, 10000)
        .mul(Fixed::from_int(0xffff))
        .div(Fixed::from_int(r))
}

const BT601: Matrix = [
    [coeff(10000, 219), coeff(0, 224), coeff(14020, 224)],
    [coeff(10000, 219), coeff(-3441, 224), coeff(-7141, 224)],
    [coeff(10000, 219), coeff(17720, 224), coeff(0, 224)],
];
const BT601_FULL: Matrix = [
    [coeff(10000, 255), coeff(0, 255), coeff(14020, 255)],
    [coeff(10000, 255), coeff(-3441, 255), coeff(-7141, 255)],
    [coeff(10000, 255), coeff(17720, 255), coeff(0, 255)],
];
const BT709: Matrix = [
    [coeff(10000, 219), coeff(0, 224), coeff(15748, 224)],
    [coeff(10000, 219), coeff(-1873, 224), coeff(-4681, 224)],
    [coeff(10000, 219), coeff(18556, 224), coeff(0, 224)],
];
const BT709_FULL: Matrix = [
    [coeff(10000, 255), coeff(0, 255), coeff(15748, 255)],
    [coeff(10000, 255), coeff(-1873, 255), coeff(-4681, 255)],
    [coeff(10000, 255), coeff(18556, 255), coeff(0, 255)],
];
const BT2020: Matrix = [
    [coeff(10000, 219), coeff(0, 224), coeff(14746, 224)],
    [coeff(10000, 219), coeff(-1646, 224), coeff(-5714, 224)],
    [coeff(10000, 219), coeff(18814, 224), coeff(0, 224)],
];
const BT2020_FULL: Matrix = [
    [coeff(10000, 255), coeff(0, 255), coeff(14746, 255)],
    [coeff(10000, 255), coeff(-1646, 255), coeff(-5714, 255)],
    [coeff(10000, 255), coeff(18814, 255), coeff(0, 255)],
];

fn ycbcr_to_rgb(m: &Matrix, y: u8, cb: u8, cr: u8, y_offset: i32) -> (i32, i32, i32) {
    let y = Fixed::from_int(y as i32 - y_offset);
    let cb = Fixed::from_int(cb as i32 - 128);
    let cr = Fixed::from_int(cr as i32 - 128);

    let r = m[0][0].mul(y) + m[0][1].mul(cb) + m[0][2].mul(cr);
    let g = m[1][0].mul(y) + m[1][1].mul(cb) + m[1][2].mul(cr);
    let b = m[2][0].mul(y) + m[2][1].mul(cb) + m[2][2].mul(cr);

    (r.to_int(), g.to_int(), b.to_int())
}

fn clamp_channel(v: i32) -> u16 {
    v.clamp(0, 0xffff) as u16
}

/// Converts YCbCr samples to normalized ARGB for one (encoding, range) pair.
///
/// Owns the one-shot warning latch for unknown encodings: the first
/// conversion against an unknown standard logs a warning, every conversion
/// against it yields opaque black, and constructing a fresh converter resets
/// the latch. The latch is the only interior mutability in the engine, so a
/// converter can be shared across row workers.
#[derive(Debug)]
pub struct YuvConverter {
    params: ColorParams,
    unknown_warned: AtomicBool,
}

impl YuvConverter {
    pub fn new(params: ColorParams) -> Self {
        Self {
            params,
            unknown_warned: AtomicBool::new(false),
        }
    }

    pub fn params(&self) -> ColorParams {
        self.params
    }

    pub fn to_argb(&self, y: u8, cb: u8, cr: u8) -> ArgbU16 {
        let full = self.params.range == ColorRange::Full;
        let matrix = match (self.params.encoding, full) {
            (ColorEncoding::Bt601, false) => &BT601,
            (ColorEncoding::Bt601, true) => &BT601_FULL,
            (ColorEncoding::Bt709, false) => &BT709,
            (ColorEncoding::Bt709, true) => &BT709_FULL,
            (ColorEncoding::Bt2020, false) => &BT2020,
            (ColorEncoding::Bt2020, true) => &BT2020_FULL,
            (ColorEncoding::Unknown, _) => {
                if !self.unknown_warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!("unsupported color encoding, substituting black");
                }
                return ArgbU16::opaque(0, 0, 0);
            }
        };
        let y_offset = if full { 0 } else { 16 };
        let (r, g, b) = ycbcr_to_rgb(matrix, y, cb, cr, y_offset);

        // Out-of-gamut luma/chroma combinations land outside the channel
        // range; the clamp is part of the conversion contract.
        ArgbU16::opaque(clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }
}

/// Studio-range BT.601 RGB->YCbCr on 8-bit-reduced channels, used by the
/// planar write path.
pub fn argb_to_yuv(px: &ArgbU16) -> (u8, u8, u8) {
    let r = div_round_closest(px.r, 257) as i32;
    let g = div_round_closest(px.g, 257) as i32;
    let b = div_round_closest(px.b, 257) as i32;

    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let cb = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let cr = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;

    (y as u8, cb as u8, cr as u8)
}
