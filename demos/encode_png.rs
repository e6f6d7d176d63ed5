//! Quantize an image and encode it as an indexed PNG.
//!
//! Usage:
//!   cargo run --example encode_png --release -- <input.png> [output.png] [colors] [sample_fraction]

use neuquant::QuantizeConfig;
use rgb::RGBA;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let input = args
        .get(1)
        .expect("usage: encode_png <input.png> [output.png] [colors] [sample_fraction]");
    let output = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| input.replace(".png", "_nq.png").replace(".jpg", "_nq.png"));
    let colors: u32 = args.get(3).map_or(256, |s| s.parse().expect("colors must be a number"));
    let fraction: u32 = args
        .get(4)
        .map_or(10, |s| s.parse().expect("sample_fraction must be a number"));

    let img = image::open(input).unwrap().to_rgba8();
    let (w, h) = (img.width() as usize, img.height() as usize);
    let pixels: Vec<RGBA<u8>> = img
        .pixels()
        .map(|p| RGBA::new(p.0[0], p.0[1], p.0[2], p.0[3]))
        .collect();

    let config = QuantizeConfig::new()
        .palette_size(colors)
        .sample_fraction(fraction);
    let start = std::time::Instant::now();
    let result = neuquant::quantize(&pixels, w, h, &config).unwrap();
    let elapsed = start.elapsed();

    let file = std::fs::File::create(&output).unwrap();
    let buf = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(buf, w as u32, h as u32);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);

    let palette_flat: Vec<u8> = result
        .palette()
        .iter()
        .flat_map(|c| [c.r, c.g, c.b])
        .collect();
    encoder.set_palette(palette_flat);

    if let Some(trns) = result.alpha_table() {
        encoder.set_trns(trns);
    }

    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(result.indices()).unwrap();

    println!(
        "{input} ({w}x{h}) -> {output}: {} colors in {:.1} ms",
        result.palette_len(),
        elapsed.as_secs_f64() * 1000.0
    );
}
