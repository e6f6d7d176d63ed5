//! Train a network on an image and print its palette with usage counts.
//!
//! Usage:
//!   cargo run --example palette_dump --release -- <image> [colors] [sample_fraction]

use neuquant::{ImgRgba8, Network};
use rgb::RGBA;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let input = args
        .get(1)
        .expect("usage: palette_dump <image> [colors] [sample_fraction]");
    let colors: usize = args.get(2).map_or(64, |s| s.parse().expect("colors must be a number"));
    let fraction: usize = args
        .get(3)
        .map_or(10, |s| s.parse().expect("sample_fraction must be a number"));

    let img = image::open(input).unwrap().to_rgba8();
    let (w, h) = (img.width() as usize, img.height() as usize);
    let pixels: Vec<RGBA<u8>> = img
        .pixels()
        .map(|p| RGBA::new(p.0[0], p.0[1], p.0[2], p.0[3]))
        .collect();
    let source = ImgRgba8::new(&pixels, w, h).unwrap();

    let mut network = Network::new(colors, fraction);
    network.learn(&source);
    let palette = network.build_palette();

    let mut usage = vec![0usize; palette.len()];
    for p in &pixels {
        usage[palette.nearest_rgba8(*p)] += 1;
    }

    for (i, (c, n)) in palette.entries_rgba8().iter().zip(&usage).enumerate() {
        println!(
            "{i:3}  #{:02x}{:02x}{:02x}{:02x}  {n:8} px ({:.2}%)",
            c.r,
            c.g,
            c.b,
            c.a,
            *n as f64 * 100.0 / pixels.len() as f64
        );
    }
}
