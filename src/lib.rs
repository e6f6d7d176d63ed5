//! Palette quantization with a frequency-sensitive self-organizing map.
//!
//! A [`Network`] of N neurons learns the color distribution of an image in
//! one sequential pass over its pixels. The trained weights become a
//! [`Palette`] of N colors, sorted by green and indexed so that
//! nearest-color lookups only visit a narrow band of entries.
//!
//! ```
//! use neuquant::{QuantizeConfig, quantize};
//! use rgb::RGBA;
//!
//! let pixels = vec![RGBA::new(200u8, 30, 30, 255); 16];
//! let config = QuantizeConfig::new().palette_size(32).sample_fraction(1);
//! let result = quantize(&pixels, 4, 4, &config).unwrap();
//! assert_eq!(result.palette().len(), 32);
//! assert_eq!(result.indices().len(), 16);
//! ```
#![forbid(unsafe_code)]

extern crate alloc;

pub mod error;
pub mod network;
pub mod palette;
pub mod remap;
pub mod surface;

pub use error::QuantizeError;
pub use network::{Network, Neuron};
pub use palette::{Color, Palette};
pub use surface::{ImgRgba16, ImgRgba8, PixelSource};

use alloc::vec::Vec;

use rgb::RGBA;

/// Configuration for palette quantization.
#[derive(Debug, Clone)]
pub struct QuantizeConfig {
    /// Number of palette colors (1..=256). The learning schedule is tuned
    /// for 26..=256.
    pub palette_size: u32,
    /// Sampling density divisor (>= 1). Larger values decay the learning
    /// rate over fewer pixels.
    pub sample_fraction: u32,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        Self {
            palette_size: 256,
            sample_fraction: 10,
        }
    }
}

impl QuantizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn palette_size(mut self, n: u32) -> Self {
        self.palette_size = n;
        self
    }

    pub fn sample_fraction(mut self, f: u32) -> Self {
        self.sample_fraction = f;
        self
    }

    fn validate(&self) -> Result<(), QuantizeError> {
        if self.palette_size == 0 || self.palette_size > 256 {
            return Err(QuantizeError::InvalidPaletteSize(self.palette_size));
        }
        if self.sample_fraction == 0 {
            return Err(QuantizeError::InvalidSampleFraction(self.sample_fraction));
        }
        Ok(())
    }
}

/// Quantization result.
#[derive(Debug)]
pub struct QuantizeResult {
    palette: Palette,
    entries: Vec<RGBA<u8>>,
    indices: Vec<u8>,
}

impl QuantizeResult {
    /// 8-bit palette entries, ascending by green.
    pub fn palette(&self) -> &[RGBA<u8>] {
        &self.entries
    }

    /// Palette index of each pixel, row-major.
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn palette_len(&self) -> usize {
        self.entries.len()
    }

    /// The full-precision palette, for mapping further colors.
    pub fn network_palette(&self) -> &Palette {
        &self.palette
    }

    /// Alpha values suitable for a PNG tRNS chunk.
    ///
    /// Truncated after the last non-opaque entry. `None` if every entry is
    /// fully opaque.
    pub fn alpha_table(&self) -> Option<Vec<u8>> {
        let alphas: Vec<u8> = self.entries.iter().map(|e| e.a).collect();
        let last_non_opaque = alphas.iter().rposition(|&a| a != 255);
        last_non_opaque.map(|pos| alphas[..=pos].to_vec())
    }
}

/// Quantize an 8-bit RGBA image.
pub fn quantize(
    pixels: &[RGBA<u8>],
    width: usize,
    height: usize,
    config: &QuantizeConfig,
) -> Result<QuantizeResult, QuantizeError> {
    config.validate()?;
    let img = ImgRgba8::new(pixels, width, height)?;
    Ok(quantize_source(&img, config))
}

/// Quantize a 16-bit RGBA image.
pub fn quantize_rgba16(
    pixels: &[RGBA<u16>],
    width: usize,
    height: usize,
    config: &QuantizeConfig,
) -> Result<QuantizeResult, QuantizeError> {
    config.validate()?;
    let img = ImgRgba16::new(pixels, width, height)?;
    Ok(quantize_source(&img, config))
}

/// Train, build the palette, and remap `source`. `config` must be valid.
fn quantize_source<S: PixelSource>(source: &S, config: &QuantizeConfig) -> QuantizeResult {
    let mut network = Network::new(
        config.palette_size as usize,
        config.sample_fraction as usize,
    );
    network.learn(source);
    let palette = network.build_palette();
    let indices = remap::remap(source, &palette);
    let entries = palette.entries_rgba8();

    QuantizeResult {
        palette,
        entries,
        indices,
    }
}
