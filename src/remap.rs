use alloc::vec::Vec;

use crate::palette::Palette;
use crate::surface::PixelSource;

/// Map every pixel of `source` to its nearest palette index, row-major.
///
/// Runs of identical samples reuse the previous lookup.
///
/// # Panics
///
/// If the palette has more than 256 entries.
pub fn remap<S: PixelSource + ?Sized>(source: &S, palette: &Palette) -> Vec<u8> {
    assert!(
        palette.len() <= 256,
        "cannot map {} colors to 8-bit indices",
        palette.len()
    );

    let (width, height) = (source.width(), source.height());
    let mut indices = Vec::with_capacity(width * height);
    let mut prev = None;

    for y in 0..height {
        for x in 0..width {
            let sample = source.sample(x, y);
            let index = match prev {
                Some((color, index)) if color == sample => index,
                _ => palette.nearest(sample) as u8,
            };
            prev = Some((sample, index));
            indices.push(index);
        }
    }

    indices
}
