//! Buffer descriptors: rectangles, geometric transforms, plane layouts and
//! the addressing layer that turns pixel coordinates into byte offsets.

use crate::error::{BlitlineError, BlitlineResult};
use crate::format::PixelFormat;

/// Upper bound on planes across the supported format set (fully planar YUV).
pub const MAX_PLANES: usize = 3;

/// Axis-aligned rectangle, half-open `[x1, x2) x [y1, y2)`.
///
/// Source rectangles carry 16.16 fixed-point pixel coordinates, matching the
/// display-pipeline convention; destination rectangles are whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub const fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub const fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Re-express this rectangle in the coordinate space a transformed plane
    /// is sampled from: the inverse of applying `transform` to a
    /// `width` x `height` area.
    pub fn rotate(mut self, width: i32, height: i32, transform: Transform) -> Rect {
        if transform.reflect_x {
            let (x1, x2) = (self.x1, self.x2);
            self.x1 = width - x2;
            self.x2 = width - x1;
        }
        if transform.reflect_y {
            let (y1, y2) = (self.y1, self.y2);
            self.y1 = height - y2;
            self.y2 = height - y1;
        }
        let tmp = self;
        match transform.rotation {
            Rotation::Deg0 => {}
            Rotation::Deg90 => {
                self.x1 = tmp.y1;
                self.x2 = tmp.y2;
                self.y1 = width - tmp.x2;
                self.y2 = width - tmp.x1;
            }
            Rotation::Deg180 => {
                self.x1 = width - tmp.x2;
                self.x2 = width - tmp.x1;
                self.y1 = height - tmp.y2;
                self.y2 = height - tmp.y1;
            }
            Rotation::Deg270 => {
                self.x1 = height - tmp.y2;
                self.x2 = height - tmp.y1;
                self.y1 = tmp.x1;
                self.y2 = tmp.x2;
            }
        }
        self
    }
}

/// Rotation in 90-degree steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// Geometric transform applied when sampling a source plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    pub rotation: Rotation,
    /// Mirror horizontally (left-right).
    pub reflect_x: bool,
    /// Mirror vertically (top-bottom).
    pub reflect_y: bool,
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        self.rotation == Rotation::Deg0 && !self.reflect_x && !self.reflect_y
    }

    /// Canonical form used by the row drivers: rotate-180 is the same
    /// operation as mirroring both axes, so only 0/90/270 survive.
    pub fn simplify(self) -> Self {
        match self.rotation {
            Rotation::Deg180 => Transform {
                rotation: Rotation::Deg0,
                reflect_x: !self.reflect_x,
                reflect_y: !self.reflect_y,
            },
            _ => self,
        }
    }

    /// Whether source rows are traversed as columns.
    pub(crate) fn swaps_xy(&self) -> bool {
        matches!(self.rotation, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Whether a composed row is stored right-to-left.
    pub(crate) fn flips_row(&self) -> bool {
        self.reflect_x || self.rotation == Rotation::Deg270
    }
}

/// Byte layout of one plane inside the mapped buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlaneLayout {
    /// Byte offset of the plane's first row.
    pub offset: usize,
    /// Row stride in bytes.
    pub pitch: usize,
}

/// Describes a rectangular image region within a multi-plane buffer.
///
/// Construction validates the plane layouts against the format geometry and
/// the buffer dimensions, so the addressing methods below cannot run out of
/// a well-formed descriptor's bounds. The mapped bytes themselves are not
/// held here; row routines take them as a separate slice.
#[derive(Clone, Debug)]
pub struct FrameInfo {
    format: PixelFormat,
    planes: Vec<PlaneLayout>,
    width: u32,
    height: u32,
    src: Rect,
    dst: Rect,
    rotated: Rect,
    transform: Transform,
}

impl FrameInfo {
    /// Build a descriptor.
    ///
    /// `width`/`height` are the buffer dimensions in pixels; `src` is the
    /// sampled rectangle in 16.16 fixed point, `dst` the composed rectangle
    /// in whole pixels. The transform is canonicalized (see
    /// [`Transform::simplify`]) and `dst` is re-expressed pre-rotation for
    /// the addressing layer.
    pub fn new(
        format: PixelFormat,
        planes: &[PlaneLayout],
        width: u32,
        height: u32,
        src: Rect,
        dst: Rect,
        transform: Transform,
    ) -> BlitlineResult<Self> {
        if width == 0 || height == 0 {
            return Err(BlitlineError::validation("buffer dimensions must be > 0"));
        }
        if planes.len() != format.plane_count() {
            return Err(BlitlineError::validation(format!(
                "format {} requires {} planes, got {}",
                format,
                format.plane_count(),
                planes.len()
            )));
        }
        for (i, plane) in planes.iter().enumerate() {
            let min_pitch = (width as usize).div_ceil(format.plane_hsub(i) as usize) * format.cpp(i);
            if plane.pitch < min_pitch {
                return Err(BlitlineError::validation(format!(
                    "plane {i} pitch {} is smaller than one row ({min_pitch} bytes)",
                    plane.pitch
                )));
            }
        }

        let src_w = src.width() >> 16;
        let src_h = src.height() >> 16;
        if (src.x1 >> 16) < 0
            || (src.y1 >> 16) < 0
            || ((src.x2 + 0xffff) >> 16) > width as i32
            || ((src.y2 + 0xffff) >> 16) > height as i32
        {
            return Err(BlitlineError::geometry(format!(
                "source rectangle exceeds the {width}x{height} buffer"
            )));
        }

        let transform = transform.simplify();
        let rotated = dst.rotate(dst.width(), dst.height(), transform);
        if rotated.width() != src_w || rotated.height() != src_h {
            return Err(BlitlineError::geometry(format!(
                "source extent {src_w}x{src_h} does not match destination extent {}x{} (scaling is not supported)",
                rotated.width(),
                rotated.height()
            )));
        }

        Ok(Self {
            format,
            planes: planes.to_vec(),
            width,
            height,
            src,
            dst,
            rotated,
            transform,
        })
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn src(&self) -> Rect {
        self.src
    }

    pub fn dst(&self) -> Rect {
        self.dst
    }

    /// The destination rectangle re-expressed in pre-rotation coordinates.
    pub fn rotated(&self) -> Rect {
        self.rotated
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn plane(&self, plane: usize) -> PlaneLayout {
        self.planes[plane]
    }

    /// Byte offset of the first channel of the sample at plane coordinates
    /// (`x`, `y`), not adjusted for subsampling.
    pub fn pixel_offset(&self, plane: usize, x: i32, y: i32) -> usize {
        debug_assert!(x >= 0 && y >= 0, "plane coordinates must be non-negative");
        let layout = self.planes[plane];
        layout.offset + y as usize * layout.pitch + x as usize * self.format.cpp(plane)
    }

    /// Byte offset of the sample covering image coordinates (`x`, `y`):
    /// chroma plane coordinates are floor-divided by the subsampling factors.
    pub fn plane_offset(&self, plane: usize, x: i32, y: i32) -> usize {
        debug_assert!(x >= 0 && y >= 0, "image coordinates must be non-negative");
        let x = x / self.format.plane_hsub(plane) as i32;
        let y = y / self.format.plane_vsub(plane) as i32;
        self.pixel_offset(plane, x, y)
    }

    /// Row start for the linear traversal: maps a destination-space row `y`
    /// onto the source rectangle.
    pub(crate) fn packed_row_offset(&self, plane: usize, y: i32) -> usize {
        let x_src = self.src.x1 >> 16;
        let y_src = y - self.rotated.y1 + (self.src.y1 >> 16);
        self.plane_offset(plane, x_src, y_src)
    }

    /// Smallest mapped-buffer length that covers every plane.
    pub(crate) fn min_data_len(&self) -> usize {
        let mut needed = 0usize;
        for (i, plane) in self.planes.iter().enumerate() {
            let rows = (self.height as usize).div_ceil(self.format.plane_vsub(i) as usize);
            needed = needed.max(plane.offset + rows * plane.pitch);
        }
        needed
    }
}
