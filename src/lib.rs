#![forbid(unsafe_code)]

//! Scanline pixel-format conversion and compositing-row engine.
//!
//! One row at a time: [`compose_row`] decodes pixels from a described source
//! buffer into a normalized 16-bit ARGB [`LineBuffer`], and
//! [`writeback_row`] re-encodes a staged row into a described destination
//! buffer. The registry ([`decoder_for`], [`encoder_for`]) selects the
//! conversion strategy per pixel format; everything above the row level
//! (frame scheduling, plane blending, buffer mapping) belongs to the caller.
//!
//! Row routines are pure functions over caller-supplied buffers and may run
//! concurrently on disjoint rows of disjoint staging buffers; sources are
//! shared read-only.

pub mod color;
pub mod compose;
pub mod decode;
pub mod encode;
pub mod error;
pub mod fixed;
pub mod format;
pub mod frame;
pub mod pixel;

pub use color::{ColorEncoding, ColorParams, ColorRange, YuvConverter, argb_to_yuv};
pub use compose::{SourceJob, WritebackJob, compose_row, writeback_row};
pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{BlitlineError, BlitlineResult};
pub use fixed::Fixed;
pub use format::{ChromaOrder, FormatDesc, FourCc, PixelFormat, decoder_for, encoder_for};
pub use frame::{FrameInfo, MAX_PLANES, PlaneLayout, Rect, Rotation, Transform};
pub use pixel::{ArgbU16, LineBuffer};
