//! Per-format pixel decoders: raw source bytes to normalized ARGB.

use crate::color::YuvConverter;
use crate::fixed::Fixed;
use crate::format::ChromaOrder;
use crate::pixel::ArgbU16;

// Field scaling for the 5-6-5 layout: 65535/31 and 65535/63 map the packed
// field ranges onto the 16-bit channel range.
const RB_RATIO: Fixed = Fixed::from_int(65535).div(Fixed::from_int(31));
const G_RATIO: Fixed = Fixed::from_int(65535).div(Fixed::from_int(63));

/// Decoding strategy for one source format family.
///
/// Packed layouts get one variant each; YUV layouts share a variant per
/// plane arrangement, with the chroma ordering as data. Subsampling never
/// appears here: the addressing layer hands every strategy slices that
/// already point at the right samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoder {
    Argb8888,
    Xrgb8888,
    Argb16161616,
    Xrgb16161616,
    Rgb565,
    /// Luma in plane 0, interleaved chroma pair in plane 1.
    SemiPlanar(ChromaOrder),
    /// Luma in plane 0, one chroma channel in each of planes 1 and 2.
    Planar(ChromaOrder),
}

impl Decoder {
    /// Read one pixel. Each entry of `planes` starts at the pixel's first
    /// byte in that plane.
    pub(crate) fn read(self, planes: &[&[u8]], color: &YuvConverter) -> ArgbU16 {
        match self {
            // Packed RGB memory order is little-endian b, g, r[, a]; 257 is
            // the exact (2^16-1)/(2^8-1) widening ratio.
            Decoder::Argb8888 => {
                let p = planes[0];
                ArgbU16 {
                    a: u16::from(p[3]) * 257,
                    r: u16::from(p[2]) * 257,
                    g: u16::from(p[1]) * 257,
                    b: u16::from(p[0]) * 257,
                }
            }
            Decoder::Xrgb8888 => {
                let p = planes[0];
                ArgbU16::opaque(
                    u16::from(p[2]) * 257,
                    u16::from(p[1]) * 257,
                    u16::from(p[0]) * 257,
                )
            }
            Decoder::Argb16161616 => {
                let p = planes[0];
                ArgbU16 {
                    a: u16::from_le_bytes([p[6], p[7]]),
                    r: u16::from_le_bytes([p[4], p[5]]),
                    g: u16::from_le_bytes([p[2], p[3]]),
                    b: u16::from_le_bytes([p[0], p[1]]),
                }
            }
            Decoder::Xrgb16161616 => {
                let p = planes[0];
                ArgbU16::opaque(
                    u16::from_le_bytes([p[4], p[5]]),
                    u16::from_le_bytes([p[2], p[3]]),
                    u16::from_le_bytes([p[0], p[1]]),
                )
            }
            Decoder::Rgb565 => {
                let p = planes[0];
                let word = u16::from_le_bytes([p[0], p[1]]);
                let r = Fixed::from_int(i32::from((word >> 11) & 0x1f));
                let g = Fixed::from_int(i32::from((word >> 5) & 0x3f));
                let b = Fixed::from_int(i32::from(word & 0x1f));
                ArgbU16::opaque(
                    r.mul(RB_RATIO).to_int_round() as u16,
                    g.mul(G_RATIO).to_int_round() as u16,
                    b.mul(RB_RATIO).to_int_round() as u16,
                )
            }
            Decoder::SemiPlanar(order) => {
                let y = planes[0][0];
                let (cb, cr) = order.to_cb_cr(planes[1][0], planes[1][1]);
                color.to_argb(y, cb, cr)
            }
            Decoder::Planar(order) => {
                let y = planes[0][0];
                let (cb, cr) = order.to_cb_cr(planes[1][0], planes[2][0]);
                color.to_argb(y, cb, cr)
            }
        }
    }
}
