//! The row drivers: `compose_row` fills a staging line from a source plane,
//! `writeback_row` drains a staging line into a destination buffer.

use crate::color::{ColorParams, YuvConverter};
use crate::decode::Decoder;
use crate::encode::{Encoder, write_semi_planar_yuv420_row};
use crate::error::{BlitlineError, BlitlineResult};
use crate::format::{decoder_for, encoder_for};
use crate::frame::{FrameInfo, MAX_PLANES};
use crate::pixel::LineBuffer;

/// A source plane ready for composition: descriptor, mapped bytes, the
/// decoder picked by the registry and the colorimetry converter.
///
/// Shared by reference across row workers; the converter's warning latch is
/// the only interior mutability (see the crate docs on threading).
pub struct SourceJob<'a> {
    info: FrameInfo,
    data: &'a [u8],
    decoder: Decoder,
    color: YuvConverter,
}

impl<'a> SourceJob<'a> {
    pub fn new(info: FrameInfo, data: &'a [u8], params: ColorParams) -> BlitlineResult<Self> {
        let decoder = decoder_for(info.format())?;
        check_data_len(&info, data.len())?;
        Ok(Self {
            info,
            data,
            decoder,
            color: YuvConverter::new(params),
        })
    }

    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    pub fn color(&self) -> &YuvConverter {
        &self.color
    }
}

/// A destination ready for writeback: descriptor, mapped bytes and the
/// encoder picked by the registry.
pub struct WritebackJob<'a> {
    info: FrameInfo,
    data: &'a mut [u8],
    encoder: Encoder,
}

impl<'a> WritebackJob<'a> {
    pub fn new(info: FrameInfo, data: &'a mut [u8]) -> BlitlineResult<Self> {
        let encoder = encoder_for(info.format())?;
        check_data_len(&info, data.len())?;
        Ok(Self {
            info,
            data,
            encoder,
        })
    }

    pub fn info(&self) -> &FrameInfo {
        &self.info
    }
}

fn check_data_len(info: &FrameInfo, len: usize) -> BlitlineResult<()> {
    let needed = info.min_data_len();
    if len < needed {
        return Err(BlitlineError::geometry(format!(
            "mapped buffer is {len} bytes, plane layout requires at least {needed}"
        )));
    }
    Ok(())
}

/// Where in the staging row destination pixel `x` lands: reflect-X and
/// rotate-270 store the row right-to-left.
fn staging_x(info: &FrameInfo, limit: usize, x: usize) -> usize {
    if info.transform().flips_row() {
        limit - x - 1
    } else {
        x
    }
}

/// Compose one destination row from the source plane into `staging`.
///
/// `y` is the row's destination-space coordinate. At most
/// `min(destination width, staging capacity)` pixels are produced; a wider
/// destination is truncated, which bounds the per-row cost at the staging
/// capacity regardless of frame size.
///
/// The traversal strategy is picked once per row: rotation 0 walks the
/// source row linearly, rotation 90/270 resolves a source column pixel by
/// pixel (the source x advances with the destination row index).
pub fn compose_row(staging: &mut LineBuffer, source: &SourceJob<'_>, y: i32) {
    let limit = (source.info.dst().width().max(0) as usize).min(staging.len());
    if source.info.transform().swaps_xy() {
        compose_row_transposed(staging, source, y, limit);
    } else {
        compose_row_linear(staging, source, y, limit);
    }
}

fn compose_row_linear(staging: &mut LineBuffer, source: &SourceJob<'_>, y: i32, limit: usize) {
    let info = &source.info;
    let format = info.format();
    let n_planes = format.plane_count();
    let x_src = info.src().x1 >> 16;

    let mut offsets = [0usize; MAX_PLANES];
    for (plane, offset) in offsets.iter_mut().enumerate().take(n_planes) {
        *offset = info.packed_row_offset(plane, y);
    }

    let out = staging.pixels_mut();
    for x in 0..limit {
        let pos = staging_x(info, limit, x);
        let planes = plane_views(source.data, &offsets, n_planes);
        out[pos] = source.decoder.read(&planes[..n_planes], &source.color);

        for (plane, offset) in offsets.iter_mut().enumerate().take(n_planes) {
            // a chroma cursor only moves when the next destination pixel
            // crosses into the next subsampled sample
            let hsub = format.plane_hsub(plane) as i32;
            if (x_src + x as i32 + 1) % hsub == 0 {
                *offset += format.cpp(plane);
            }
        }
    }
}

fn compose_row_transposed(staging: &mut LineBuffer, source: &SourceJob<'_>, y: i32, limit: usize) {
    let info = &source.info;
    let n_planes = info.format().plane_count();
    let x_src = (info.src().x1 >> 16) + y;
    let y_src = info.src().y1 >> 16;

    let out = staging.pixels_mut();
    for x in 0..limit {
        let pos = staging_x(info, limit, x);
        let mut offsets = [0usize; MAX_PLANES];
        for (plane, offset) in offsets.iter_mut().enumerate().take(n_planes) {
            *offset = info.plane_offset(plane, x_src, y_src + x as i32);
        }
        let planes = plane_views(source.data, &offsets, n_planes);
        out[pos] = source.decoder.read(&planes[..n_planes], &source.color);
    }
}

fn plane_views<'d>(
    data: &'d [u8],
    offsets: &[usize; MAX_PLANES],
    n_planes: usize,
) -> [&'d [u8]; MAX_PLANES] {
    let mut views: [&[u8]; MAX_PLANES] = [&[]; MAX_PLANES];
    for (view, offset) in views.iter_mut().zip(offsets).take(n_planes) {
        *view = &data[*offset..];
    }
    views
}

/// Drain one staging row into the destination buffer.
///
/// `y` is the destination row. The limit rule matches [`compose_row`]. No
/// rotation is applied here: writeback always targets an unrotated linear
/// destination, any transform was resolved when the staging row was
/// produced.
pub fn writeback_row(job: &mut WritebackJob<'_>, staging: &LineBuffer, y: i32) {
    let info = &job.info;
    let limit = (info.dst().width().max(0) as usize).min(staging.len());
    let pixels = &staging.pixels()[..limit];

    match job.encoder {
        Encoder::SemiPlanarYuv420 => {
            write_semi_planar_yuv420_row(info, job.data, pixels, y);
        }
        packed => {
            let cpp = info.format().cpp(0);
            let mut offset = info.plane_offset(0, info.dst().x1, y);
            for px in pixels {
                packed.write(&mut job.data[offset..offset + cpp], px);
                offset += cpp;
            }
        }
    }
}
