//! Pixel-format enumeration, per-format plane geometry, and the registry
//! that selects a conversion strategy for a format.

use std::{fmt, str::FromStr};

use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{BlitlineError, BlitlineResult};

/// Four-character format code, little-endian u32 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc([u8; 4]);

impl FourCc {
    /// Construct from raw bytes.
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Little-endian u32 encoding.
    pub const fn to_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Try to convert to a printable string.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.as_str() {
            write!(f, "{s}")
        } else {
            write!(f, "0x{:08x}", self.to_u32())
        }
    }
}

/// Which chroma channel a YUV layout stores first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaOrder {
    /// Cb before Cr (NV12-style, YUV-planar).
    UV,
    /// Cr before Cb (NV21-style, YVU-planar).
    VU,
}

impl ChromaOrder {
    /// Map two chroma samples in storage order to (Cb, Cr).
    pub(crate) const fn to_cb_cr(self, first: u8, second: u8) -> (u8, u8) {
        match self {
            ChromaOrder::UV => (first, second),
            ChromaOrder::VU => (second, first),
        }
    }
}

/// The closed set of pixel formats this engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Packed 32-bit, memory order b, g, r, a.
    Argb8888,
    /// Packed 32-bit, memory order b, g, r, x.
    Xrgb8888,
    /// Packed 64-bit, little-endian u16 channels in b, g, r, a order.
    Argb16161616,
    /// Packed 64-bit, little-endian u16 channels in b, g, r, x order.
    Xrgb16161616,
    /// Packed 16-bit 5-6-5, blue in the low bits of a little-endian word.
    Rgb565,
    /// Semi-planar 4:2:0, Cb/Cr interleaved.
    Nv12,
    /// Semi-planar 4:2:2, Cb/Cr interleaved.
    Nv16,
    /// Semi-planar 4:4:4, Cb/Cr interleaved.
    Nv24,
    /// Semi-planar 4:2:0, Cr/Cb interleaved.
    Nv21,
    /// Semi-planar 4:2:2, Cr/Cb interleaved.
    Nv61,
    /// Semi-planar 4:4:4, Cr/Cb interleaved.
    Nv42,
    /// Fully planar 4:2:0, plane order Y, Cb, Cr.
    Yuv420,
    /// Fully planar 4:2:2, plane order Y, Cb, Cr.
    Yuv422,
    /// Fully planar 4:4:4, plane order Y, Cb, Cr.
    Yuv444,
    /// Fully planar 4:2:0, plane order Y, Cr, Cb.
    Yvu420,
    /// Fully planar 4:2:2, plane order Y, Cr, Cb.
    Yvu422,
    /// Fully planar 4:4:4, plane order Y, Cr, Cb.
    Yvu444,
}

impl PixelFormat {
    /// Every format in registry order.
    pub const ALL: [PixelFormat; 17] = [
        PixelFormat::Argb8888,
        PixelFormat::Xrgb8888,
        PixelFormat::Argb16161616,
        PixelFormat::Xrgb16161616,
        PixelFormat::Rgb565,
        PixelFormat::Nv12,
        PixelFormat::Nv16,
        PixelFormat::Nv24,
        PixelFormat::Nv21,
        PixelFormat::Nv61,
        PixelFormat::Nv42,
        PixelFormat::Yuv420,
        PixelFormat::Yuv422,
        PixelFormat::Yuv444,
        PixelFormat::Yvu420,
        PixelFormat::Yvu422,
        PixelFormat::Yvu444,
    ];

    pub const fn fourcc(self) -> FourCc {
        FourCc::new(match self {
            PixelFormat::Argb8888 => *b"AR24",
            PixelFormat::Xrgb8888 => *b"XR24",
            PixelFormat::Argb16161616 => *b"AR48",
            PixelFormat::Xrgb16161616 => *b"XR48",
            PixelFormat::Rgb565 => *b"RG16",
            PixelFormat::Nv12 => *b"NV12",
            PixelFormat::Nv16 => *b"NV16",
            PixelFormat::Nv24 => *b"NV24",
            PixelFormat::Nv21 => *b"NV21",
            PixelFormat::Nv61 => *b"NV61",
            PixelFormat::Nv42 => *b"NV42",
            PixelFormat::Yuv420 => *b"YU12",
            PixelFormat::Yuv422 => *b"YU16",
            PixelFormat::Yuv444 => *b"YU24",
            PixelFormat::Yvu420 => *b"YV12",
            PixelFormat::Yvu422 => *b"YV16",
            PixelFormat::Yvu444 => *b"YV24",
        })
    }

    pub const fn plane_count(self) -> usize {
        match self {
            PixelFormat::Argb8888
            | PixelFormat::Xrgb8888
            | PixelFormat::Argb16161616
            | PixelFormat::Xrgb16161616
            | PixelFormat::Rgb565 => 1,
            PixelFormat::Nv12
            | PixelFormat::Nv16
            | PixelFormat::Nv24
            | PixelFormat::Nv21
            | PixelFormat::Nv61
            | PixelFormat::Nv42 => 2,
            PixelFormat::Yuv420
            | PixelFormat::Yuv422
            | PixelFormat::Yuv444
            | PixelFormat::Yvu420
            | PixelFormat::Yvu422
            | PixelFormat::Yvu444 => 3,
        }
    }

    /// Bytes per pixel (per chroma sample for subsampled planes).
    pub const fn cpp(self, plane: usize) -> usize {
        match self {
            PixelFormat::Argb8888 | PixelFormat::Xrgb8888 => 4,
            PixelFormat::Argb16161616 | PixelFormat::Xrgb16161616 => 8,
            PixelFormat::Rgb565 => 2,
            PixelFormat::Nv12
            | PixelFormat::Nv16
            | PixelFormat::Nv24
            | PixelFormat::Nv21
            | PixelFormat::Nv61
            | PixelFormat::Nv42 => {
                if plane == 0 { 1 } else { 2 }
            }
            PixelFormat::Yuv420
            | PixelFormat::Yuv422
            | PixelFormat::Yuv444
            | PixelFormat::Yvu420
            | PixelFormat::Yvu422
            | PixelFormat::Yvu444 => 1,
        }
    }

    /// Horizontal chroma subsampling factor.
    pub const fn hsub(self) -> u32 {
        match self {
            PixelFormat::Nv12
            | PixelFormat::Nv21
            | PixelFormat::Nv16
            | PixelFormat::Nv61
            | PixelFormat::Yuv420
            | PixelFormat::Yvu420
            | PixelFormat::Yuv422
            | PixelFormat::Yvu422 => 2,
            _ => 1,
        }
    }

    /// Vertical chroma subsampling factor.
    pub const fn vsub(self) -> u32 {
        match self {
            PixelFormat::Nv12
            | PixelFormat::Nv21
            | PixelFormat::Yuv420
            | PixelFormat::Yvu420 => 2,
            _ => 1,
        }
    }

    /// Subsampling applies to chroma planes only; luma and packed planes are
    /// always sampled 1:1.
    pub const fn plane_hsub(self, plane: usize) -> u32 {
        if plane == 0 { 1 } else { self.hsub() }
    }

    pub const fn plane_vsub(self, plane: usize) -> u32 {
        if plane == 0 { 1 } else { self.vsub() }
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Argb8888 | PixelFormat::Argb16161616)
    }

    pub const fn is_yuv(self) -> bool {
        self.plane_count() > 1
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fourcc().fmt(f)
    }
}

impl FromStr for PixelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        PixelFormat::ALL
            .into_iter()
            .find(|format| format.fourcc().as_str() == Some(upper.as_str()))
            .ok_or_else(|| format!("unknown pixel format '{s}'"))
    }
}

/// Select the decoding strategy for a source format.
///
/// The format set is closed, so today every format decodes; the fallible
/// signature is the registry contract shared with [`encoder_for`].
pub fn decoder_for(format: PixelFormat) -> BlitlineResult<Decoder> {
    Ok(match format {
        PixelFormat::Argb8888 => Decoder::Argb8888,
        PixelFormat::Xrgb8888 => Decoder::Xrgb8888,
        PixelFormat::Argb16161616 => Decoder::Argb16161616,
        PixelFormat::Xrgb16161616 => Decoder::Xrgb16161616,
        PixelFormat::Rgb565 => Decoder::Rgb565,
        PixelFormat::Nv12 | PixelFormat::Nv16 | PixelFormat::Nv24 => {
            Decoder::SemiPlanar(ChromaOrder::UV)
        }
        PixelFormat::Nv21 | PixelFormat::Nv61 | PixelFormat::Nv42 => {
            Decoder::SemiPlanar(ChromaOrder::VU)
        }
        PixelFormat::Yuv420 | PixelFormat::Yuv422 | PixelFormat::Yuv444 => {
            Decoder::Planar(ChromaOrder::UV)
        }
        PixelFormat::Yvu420 | PixelFormat::Yvu422 | PixelFormat::Yvu444 => {
            Decoder::Planar(ChromaOrder::VU)
        }
    })
}

/// Select the encoding strategy for a destination format.
///
/// Only the packed RGB set and NV12 can be written; every other format is a
/// registry miss the caller must reject before scheduling row work.
pub fn encoder_for(format: PixelFormat) -> BlitlineResult<Encoder> {
    match format {
        PixelFormat::Argb8888 => Ok(Encoder::Argb8888),
        PixelFormat::Xrgb8888 => Ok(Encoder::Xrgb8888),
        PixelFormat::Argb16161616 => Ok(Encoder::Argb16161616),
        PixelFormat::Xrgb16161616 => Ok(Encoder::Xrgb16161616),
        PixelFormat::Rgb565 => Ok(Encoder::Rgb565),
        PixelFormat::Nv12 => Ok(Encoder::SemiPlanarYuv420),
        _ => Err(BlitlineError::UnsupportedFormat(format)),
    }
}

/// One row of the supported-format table, serializable for tooling.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FormatDesc {
    pub fourcc: String,
    pub planes: usize,
    pub cpp: Vec<usize>,
    pub hsub: u32,
    pub vsub: u32,
    pub alpha: bool,
    pub decode: bool,
    pub encode: bool,
}

impl FormatDesc {
    pub fn of(format: PixelFormat) -> Self {
        Self {
            fourcc: format.fourcc().to_string(),
            planes: format.plane_count(),
            cpp: (0..format.plane_count()).map(|i| format.cpp(i)).collect(),
            hsub: format.hsub(),
            vsub: format.vsub(),
            alpha: format.has_alpha(),
            decode: decoder_for(format).is_ok(),
            encode: encoder_for(format).is_ok(),
        }
    }
}
