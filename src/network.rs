//! The frequency-sensitive self-organizing map.
//!
//! A [`Network`] holds `palette_size` neurons, each a point in
//! (blue, green, red, alpha) space on the 16-bit channel scale. Training
//! walks every pixel of a [`PixelSource`] once: each sample picks a winner
//! through [`Network::contest`], then the winner and a shrinking
//! neighbourhood of index-adjacent neurons move toward the sample.
//!
//! The learning rate and radius decay on a fixed schedule of roughly
//! [`NCYCLES`] steps per image. No randomness is involved: the same input
//! always trains the same network.

use alloc::vec::Vec;

use log::{debug, trace};
use rgb::RGBA;

use crate::palette::Palette;
use crate::surface::PixelSource;

/// Number of learning-rate/radius decay steps over one image scan.
pub const NCYCLES: usize = 600;

/// Radius shrinks by 1/RADIUS_DEC of itself on every decay step.
const RADIUS_DEC: usize = 30;
/// Fixed-point scale of the radius, kept in integers so it floors the
/// same way on every step.
const RADIUS_BIAS: usize = 1 << 6;

/// Learning rate at the start of training, in 10-bit fixed point (1.0).
const INIT_ALPHA: f64 = (1 << 10) as f64;

const GAMMA: f64 = 1024.0;
const BETA: f64 = 1.0 / GAMMA;
const BETA_GAMMA: f64 = BETA * GAMMA;

/// One trainable weight vector. Channels are `f64` on the 16-bit scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neuron {
    pub b: f64,
    pub g: f64,
    pub r: f64,
    pub a: f64,
}

impl Neuron {
    pub const fn new(b: f64, g: f64, r: f64, a: f64) -> Self {
        Self { b, g, r, a }
    }

    /// Convert a 16-bit sample to the network's float domain.
    pub fn from_sample(p: RGBA<u16>) -> Self {
        Self {
            b: f64::from(p.b),
            g: f64::from(p.g),
            r: f64::from(p.r),
            a: f64::from(p.a),
        }
    }

    /// Move every channel toward `target` by the fraction `alpha`.
    #[inline]
    fn pull_toward(&mut self, target: &Neuron, alpha: f64) {
        self.b -= alpha * (self.b - target.b);
        self.g -= alpha * (self.g - target.g);
        self.r -= alpha * (self.r - target.r);
        self.a -= alpha * (self.a - target.a);
    }
}

/// Running minima of one contest: unbiased and bias-adjusted winners.
struct Contest {
    best_d: f64,
    best_pos: usize,
    best_bias_d: f64,
    best_bias_pos: usize,
}

impl Contest {
    fn new() -> Self {
        Self {
            best_d: f64::MAX,
            best_pos: 0,
            best_bias_d: f64::MAX,
            best_bias_pos: 0,
        }
    }
}

/// Competitive-learning network state.
///
/// Owns the neuron weights and the frequency/bias bookkeeping for its whole
/// lifetime. Consumed by [`Network::build_palette`].
#[derive(Debug, Clone)]
pub struct Network {
    neurons: Vec<Neuron>,
    freq: Vec<f64>,
    bias: Vec<f64>,
    sample_fraction: usize,
}

impl Network {
    /// Allocate a network of `palette_size` neurons on the grey diagonal
    /// `(i, i, i, 255)` with uniform frequency `1 / palette_size`.
    ///
    /// The decay schedule is tuned for sizes 26..=256; other sizes work but
    /// are not range-checked.
    ///
    /// # Panics
    ///
    /// If `palette_size` or `sample_fraction` is zero.
    pub fn new(palette_size: usize, sample_fraction: usize) -> Self {
        assert!(palette_size >= 1, "palette size must be at least 1");
        assert!(sample_fraction >= 1, "sample fraction must be at least 1");

        let neurons = (0..palette_size)
            .map(|i| {
                let v = i as f64;
                Neuron::new(v, v, v, 255.0)
            })
            .collect();
        let uniform = 1.0 / palette_size as f64;

        Self {
            neurons,
            freq: alloc::vec![uniform; palette_size],
            bias: alloc::vec![0.0; palette_size],
            sample_fraction,
        }
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.freq
    }

    pub fn biases(&self) -> &[f64] {
        &self.bias
    }

    /// Pick the neuron to move toward `sample` and update the
    /// frequency/bias bookkeeping of every neuron.
    ///
    /// The closest neuron by sum of absolute channel differences is
    /// rewarded; the neuron with the smallest `distance - bias` is returned.
    /// Frequent winners accumulate a bias penalty, so rarely used neurons
    /// eventually win samples they are farther from.
    pub fn contest(&mut self, sample: &Neuron) -> usize {
        self.select::<true>(sample)
    }

    /// `contest` with the blue+red early filter switched off.
    #[cfg(test)]
    pub(crate) fn contest_unpruned(&mut self, sample: &Neuron) -> usize {
        self.select::<false>(sample)
    }

    fn select<const PRUNE: bool>(&mut self, sample: &Neuron) -> usize {
        let mut c = Contest::new();

        for (i, n) in self.neurons.iter().enumerate() {
            let bias = self.bias[i];
            let mut dist = (n.b - sample.b).abs() + (n.r - sample.r).abs();
            // Blue+red alone already loses to both minima: skip green/alpha.
            if !PRUNE || dist < c.best_d || dist < c.best_bias_d + bias {
                dist += (n.g - sample.g).abs();
                dist += (n.a - sample.a).abs();
                if dist < c.best_d {
                    c.best_d = dist;
                    c.best_pos = i;
                }
                let bias_dist = dist - bias;
                if bias_dist < c.best_bias_d {
                    c.best_bias_d = bias_dist;
                    c.best_bias_pos = i;
                }
            }
            let f = &mut self.freq[i];
            *f -= BETA * *f;
            self.bias[i] += BETA_GAMMA * *f;
        }

        self.freq[c.best_pos] += BETA;
        self.bias[c.best_pos] -= BETA_GAMMA;
        c.best_bias_pos
    }

    /// Move neuron `i` toward `sample` by the fraction `alpha`.
    pub fn alter_single(&mut self, alpha: f64, i: usize, sample: &Neuron) {
        self.neurons[i].pull_toward(sample, alpha);
    }

    /// Move the neurons within `radius` index positions of `i` (excluding
    /// `i`) toward `sample`, by `alpha * (radius² - q²) / radius²` at
    /// distance `q`.
    pub fn alter_neighbours(&mut self, alpha: f64, radius: usize, i: usize, sample: &Neuron) {
        let rad_sq = (radius * radius) as f64;
        let n = self.neurons.len();

        for q in 1..radius {
            let q_sq = (q * q) as f64;
            let a = alpha * (rad_sq - q_sq) / rad_sq;
            let above = i + q;
            if above < n {
                self.neurons[above].pull_toward(sample, a);
            }
            if q <= i {
                self.neurons[i - q].pull_toward(sample, a);
            }
            if above >= n && q > i {
                break;
            }
        }
    }

    /// Train on every pixel of `source`.
    ///
    /// Pixels are visited column by column. Every `delta` pixels the
    /// learning rate decays by `1/alphadec` and the radius by `1/30`, where
    /// `delta = width * height / sample_fraction / NCYCLES` (at least 1).
    ///
    /// # Panics
    ///
    /// If `source` has a zero dimension.
    pub fn learn<S: PixelSource + ?Sized>(&mut self, source: &S) {
        let (width, height) = (source.width(), source.height());
        assert!(width > 0 && height > 0, "image dimensions cannot be zero");

        let mut schedule = Schedule::new(self.len(), self.sample_fraction, width, height);
        debug!(
            "training {} neurons on {width}x{height}: delta={}, alphadec={}, radius={}",
            self.len(),
            schedule.delta,
            schedule.alphadec,
            schedule.radius
        );

        for x in 0..width {
            for y in 0..height {
                let sample = Neuron::from_sample(source.sample(x, y));
                let winner = self.contest(&sample);

                let alpha = schedule.alpha / INIT_ALPHA;
                self.alter_single(alpha, winner, &sample);
                if schedule.radius > 0 {
                    self.alter_neighbours(alpha, schedule.radius, winner, &sample);
                }

                if x > 0 && y > 0 && (x * y) % schedule.delta == 0 {
                    schedule.decay();
                    trace!(
                        "decay at ({x}, {y}): alpha={:.3}, radius={}",
                        schedule.alpha,
                        schedule.radius
                    );
                }
            }
        }

        debug!(
            "training done: alpha={:.3}, radius={}",
            schedule.alpha, schedule.radius
        );
    }

    /// Quantize the trained weights into a sorted, indexed palette.
    pub fn build_palette(self) -> Palette {
        Palette::from_neurons(&self.neurons)
    }
}

/// Learning-rate and radius decay state for one training pass.
#[derive(Debug, Clone)]
struct Schedule {
    /// Fixed-point learning rate, starts at `INIT_ALPHA`.
    alpha: f64,
    alphadec: f64,
    /// Radius scaled by `RADIUS_BIAS`.
    bias_radius: usize,
    radius: usize,
    delta: usize,
}

impl Schedule {
    fn new(palette_size: usize, sample_fraction: usize, width: usize, height: usize) -> Self {
        let bias_radius = (palette_size / 8) * RADIUS_BIAS;
        let alphadec = ((30 << 8) + (sample_fraction - 1) / 3) as f64;
        let delta = (width * height / sample_fraction / NCYCLES).max(1);

        Self {
            alpha: INIT_ALPHA,
            alphadec,
            bias_radius,
            radius: working_radius(bias_radius),
            delta,
        }
    }

    fn decay(&mut self) {
        self.alpha -= self.alpha / self.alphadec;
        self.bias_radius -= self.bias_radius / RADIUS_DEC;
        self.radius = working_radius(self.bias_radius);
    }
}

/// Radius 1 only touches the winner itself, so it is switched off.
fn working_radius(bias_radius: usize) -> usize {
    let rad = bias_radius / RADIUS_BIAS;
    if rad <= 1 { 0 } else { rad }
}
