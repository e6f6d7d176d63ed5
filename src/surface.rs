//! Pixel sources the network trains on.
//!
//! The network samples pixels by `(x, y)` coordinate in the expanded 16-bit
//! channel range. Slice views over row-major 8-bit and 16-bit RGBA buffers
//! are provided; anything else can implement [`PixelSource`] directly.

use rgb::RGBA;

use crate::error::QuantizeError;

/// An indexable 2D surface of RGBA samples with 16 bits per channel.
pub trait PixelSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Sample at column `x`, row `y`. Both must be in bounds.
    fn sample(&self, x: usize, y: usize) -> RGBA<u16>;
}

/// Expand an 8-bit channel quadruple to 16 bits by byte replication
/// (`0xAB` becomes `0xABAB`), so 255 maps to 65535.
#[inline]
pub fn expand_rgba8(p: RGBA<u8>) -> RGBA<u16> {
    RGBA {
        r: u16::from(p.r) * 257,
        g: u16::from(p.g) * 257,
        b: u16::from(p.b) * 257,
        a: u16::from(p.a) * 257,
    }
}

fn check_dimensions(len: usize, width: usize, height: usize) -> Result<(), QuantizeError> {
    if width == 0 || height == 0 {
        return Err(QuantizeError::ZeroDimension);
    }
    if width.checked_mul(height) != Some(len) {
        return Err(QuantizeError::DimensionMismatch { len, width, height });
    }
    Ok(())
}

/// Row-major view over 8-bit RGBA pixels.
#[derive(Debug, Clone, Copy)]
pub struct ImgRgba8<'a> {
    pixels: &'a [RGBA<u8>],
    width: usize,
    height: usize,
}

impl<'a> ImgRgba8<'a> {
    pub fn new(pixels: &'a [RGBA<u8>], width: usize, height: usize) -> Result<Self, QuantizeError> {
        check_dimensions(pixels.len(), width, height)?;
        Ok(Self {
            pixels,
            width,
            height,
        })
    }
}

impl PixelSource for ImgRgba8<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn sample(&self, x: usize, y: usize) -> RGBA<u16> {
        expand_rgba8(self.pixels[y * self.width + x])
    }
}

/// Row-major view over 16-bit RGBA pixels.
#[derive(Debug, Clone, Copy)]
pub struct ImgRgba16<'a> {
    pixels: &'a [RGBA<u16>],
    width: usize,
    height: usize,
}

impl<'a> ImgRgba16<'a> {
    pub fn new(
        pixels: &'a [RGBA<u16>],
        width: usize,
        height: usize,
    ) -> Result<Self, QuantizeError> {
        check_dimensions(pixels.len(), width, height)?;
        Ok(Self {
            pixels,
            width,
            height,
        })
    }
}

impl PixelSource for ImgRgba16<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn sample(&self, x: usize, y: usize) -> RGBA<u16> {
        self.pixels[y * self.width + x]
    }
}
