use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuantizeError {
    #[error("image dimensions cannot be zero")]
    ZeroDimension,

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("palette size must be between 1 and 256, got {0}")]
    InvalidPaletteSize(u32),

    #[error("sample fraction must be at least 1, got {0}")]
    InvalidSampleFraction(u32),
}
