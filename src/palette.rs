use alloc::vec;
use alloc::vec::Vec;

use log::debug;
use rgb::RGBA;

use crate::network::Neuron;
use crate::surface::expand_rgba8;

/// Number of entries in the green-channel index, one per 16-bit value.
pub const INDEX_LEN: usize = 1 << 16;

/// Upper clamp for quantized channels.
const CHANNEL_MAX: f64 = i32::MAX as f64;

/// A quantized palette entry, channels on the 16-bit scale.
pub type Color = RGBA<u32>;

/// Trained palette, sorted by green, with a dense green index for
/// nearest-color lookup.
///
/// Immutable once built; lookups take `&self` and may run from any number
/// of threads.
#[derive(Debug, Clone)]
pub struct Palette {
    /// Entries ascending by green.
    colors: Vec<Color>,
    /// `index[v]` is the first position whose green is `>= v`, or the last
    /// position if no entry reaches `v`.
    index: Box<[usize]>,
}

impl Palette {
    /// Quantize neuron weights and build the sorted palette and its index.
    ///
    /// # Panics
    ///
    /// If `neurons` is empty.
    pub fn from_neurons(neurons: &[Neuron]) -> Self {
        assert!(!neurons.is_empty(), "palette needs at least one neuron");

        let mut colors: Vec<Color> = neurons
            .iter()
            .map(|n| RGBA {
                r: quantize_channel(n.r),
                g: quantize_channel(n.g),
                b: quantize_channel(n.b),
                a: quantize_channel(n.a),
            })
            .collect();
        let index = sort_and_index(&mut colors);

        debug!(
            "built palette of {} colors, green span {}..={}",
            colors.len(),
            colors[0].g,
            colors[colors.len() - 1].g
        );

        Self { colors, index }
    }

    /// Palette entries on the 16-bit scale, ascending by green.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Starting search position for green value `g`.
    pub fn index_entry(&self, g: u16) -> usize {
        self.index[usize::from(g)]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index of the entry nearest to `color` by squared Euclidean distance.
    ///
    /// Starts at the green index and walks up and down the palette. A
    /// direction stops once the green difference alone reaches the best
    /// distance so far; entries farther along only differ more in green.
    /// On ties the first candidate examined wins.
    pub fn nearest(&self, color: RGBA<u16>) -> usize {
        let query = RGBA {
            r: u32::from(color.r),
            g: u32::from(color.g),
            b: u32::from(color.b),
            a: u32::from(color.a),
        };
        let n = self.colors.len();

        let mut best_d = u64::MAX;
        let mut best = 0;
        let mut up = self.index[usize::from(color.g)];
        let mut down = up.checked_sub(1);

        while up < n || down.is_some() {
            if up < n {
                match bounded_distance(&self.colors[up], &query, best_d) {
                    Probe::Exhausted => up = n,
                    Probe::Better(d) => {
                        best_d = d;
                        best = up;
                        up += 1;
                    }
                    Probe::Worse => up += 1,
                }
            }
            if let Some(j) = down {
                match bounded_distance(&self.colors[j], &query, best_d) {
                    Probe::Exhausted => down = None,
                    Probe::Better(d) => {
                        best_d = d;
                        best = j;
                        down = j.checked_sub(1);
                    }
                    Probe::Worse => down = j.checked_sub(1),
                }
            }
        }

        best
    }

    /// [`Palette::nearest`] for an 8-bit color, expanded to 16 bits.
    pub fn nearest_rgba8(&self, color: RGBA<u8>) -> usize {
        self.nearest(expand_rgba8(color))
    }

    /// Linear scan over every entry. Same result as [`Palette::nearest`],
    /// up to ties.
    pub fn nearest_linear(&self, color: RGBA<u16>) -> usize {
        let mut best_d = u64::MAX;
        let mut best = 0;
        for (i, c) in self.colors.iter().enumerate() {
            let d = sq_diff(c.g, color.g.into())
                .saturating_add(sq_diff(c.b, color.b.into()))
                .saturating_add(sq_diff(c.r, color.r.into()))
                .saturating_add(sq_diff(c.a, color.a.into()));
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        best
    }

    /// Squared Euclidean distance from `color` to entry `index`.
    pub fn distance_sq(&self, color: RGBA<u16>, index: usize) -> u64 {
        let c = &self.colors[index];
        sq_diff(c.g, color.g.into())
            .saturating_add(sq_diff(c.b, color.b.into()))
            .saturating_add(sq_diff(c.r, color.r.into()))
            .saturating_add(sq_diff(c.a, color.a.into()))
    }

    /// Palette with 8 bits per channel (each channel shifted right by 8).
    pub fn entries_rgba8(&self) -> Vec<RGBA<u8>> {
        self.colors
            .iter()
            .map(|c| RGBA {
                r: narrow(c.r),
                g: narrow(c.g),
                b: narrow(c.b),
                a: narrow(c.a),
            })
            .collect()
    }
}

enum Probe {
    /// Green alone is no better than the best; stop this direction.
    Exhausted,
    Better(u64),
    Worse,
}

/// Accumulate green, blue, red, alpha, giving up as soon as the partial
/// sum reaches `best_d`.
#[inline]
fn bounded_distance(c: &Color, q: &Color, best_d: u64) -> Probe {
    let mut d = sq_diff(c.g, q.g);
    if d >= best_d {
        return Probe::Exhausted;
    }
    for (x, y) in [(c.b, q.b), (c.r, q.r), (c.a, q.a)] {
        d = d.saturating_add(sq_diff(x, y));
        if d >= best_d {
            return Probe::Worse;
        }
    }
    Probe::Better(d)
}

#[inline]
fn sq_diff(a: u32, b: u32) -> u64 {
    let d = u64::from(a.abs_diff(b));
    d * d
}

#[inline]
fn narrow(c: u32) -> u8 {
    u8::try_from(c >> 8).unwrap_or(u8::MAX)
}

/// Round half away from zero, clamp to `[0, 2^31 - 1]`.
fn quantize_channel(w: f64) -> u32 {
    w.round().clamp(0.0, CHANNEL_MAX) as u32
}

/// Selection-sort `colors` ascending by green and build the green index
/// in the same pass.
fn sort_and_index(colors: &mut [Color]) -> Box<[usize]> {
    let n = colors.len();
    let mut index = vec![0usize; INDEX_LEN];
    let mut previous = 0usize;
    let mut start = 0usize;

    for i in 0..n {
        let mut small_pos = i;
        let mut small_val = colors[i].g;
        for (j, c) in colors.iter().enumerate().skip(i + 1) {
            if c.g < small_val {
                small_pos = j;
                small_val = c.g;
            }
        }
        colors.swap(i, small_pos);

        let green = small_val as usize;
        if green != previous {
            fill(&mut index, previous, start);
            fill_range(&mut index, previous + 1, green + 1, i);
            previous = green;
            start = i;
        }
    }

    fill(&mut index, previous, start);
    fill_range(&mut index, previous + 1, INDEX_LEN, n - 1);
    index.into_boxed_slice()
}

#[inline]
fn fill(index: &mut [usize], at: usize, pos: usize) {
    if let Some(slot) = index.get_mut(at) {
        *slot = pos;
    }
}

#[inline]
fn fill_range(index: &mut [usize], from: usize, to: usize, pos: usize) {
    let to = to.min(index.len());
    if from < to {
        index[from..to].fill(pos);
    }
}
