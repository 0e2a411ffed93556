use thiserror::Error;

use crate::PixelFormat;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for tiling, conversion and enhancement operations
///
/// Every stage of the pipeline reports failures through this type; a
/// partially processed buffer is never returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Configuration rejected before any processing began
    ///
    /// Returned for a zero tile limit, a reduction percentage above 100
    /// or a negative contrast adjustment.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A stage received a buffer in a format it cannot process
    ///
    /// This indicates an orchestration bug upstream rather than bad user
    /// input.
    #[error("Pixel format mismatch: expected {expected:?}, got {actual:?}")]
    FormatMismatch {
        /// Format the stage requires
        expected: PixelFormat,
        /// Format it was given
        actual: PixelFormat,
    },

    /// Nothing to tile or to combine
    ///
    /// Returned for a zero-sized input image and for an empty tile list.
    #[error("Tile grid is empty")]
    EmptyGrid,

    /// The inference engine returned no usable result for a tile
    #[error("Inference failed for tile ({band}, {block}): {reason}")]
    InferenceFailed {
        /// Band index of the failing tile
        band: usize,
        /// Block index within the band
        block: usize,
        /// Human readable cause
        reason: String,
    },

    /// Two planes that must line up have different sizes
    #[error("Dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// Raw pixel storage does not satisfy the layout invariants
    #[error(
        "Invalid pixel buffer: {width}x{height} with stride {stride} needs {expected} bytes, got {actual}"
    )]
    InvalidBuffer {
        width: u32,
        height: u32,
        stride: u32,
        expected: usize,
        actual: usize,
    },

    /// A requested region does not fit inside the buffer
    #[error("Region {width}x{height} at ({x}, {y}) is outside a {bounds:?} buffer")]
    InvalidRegion {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        /// Dimensions (width, height) of the source buffer
        bounds: (u32, u32),
    },

    /// Tensor axes do not follow the `[1, 3, width, height]` layout
    #[error("Invalid tensor shape: expected {expected}, got {actual:?}")]
    InvalidTensorShape {
        expected: &'static str,
        actual: Vec<usize>,
    },
}
