use crate::format::PixelFormat;

/// Convenience result type used across blitline.
pub type BlitlineResult<T> = Result<T, BlitlineError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Row routines themselves are infallible; errors surface when descriptors
/// and jobs are constructed, or from the format registry.
#[derive(thiserror::Error, Debug)]
pub enum BlitlineError {
    /// Invalid caller-provided descriptor data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Rectangles or plane layouts that do not fit the mapped buffer.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Registry lookup found no conversion for this format.
    #[error("no conversion available for pixel format {0}")]
    UnsupportedFormat(PixelFormat),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BlitlineError {
    /// Build a [`BlitlineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BlitlineError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }
}
