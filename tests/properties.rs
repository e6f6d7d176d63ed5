//! Behavioral properties of a trained network and its palette.

use neuquant::surface::expand_rgba8;
use neuquant::{ImgRgba8, Network, Palette, QuantizeConfig};
use rgb::RGBA;

fn noisy_image(width: usize, height: usize) -> Vec<RGBA<u8>> {
    (0..(width * height) as u32)
        .map(|i| {
            let h = i.wrapping_mul(2654435761); // Knuth's multiplicative hash
            RGBA {
                r: (h >> 24) as u8,
                g: (h >> 16) as u8,
                b: (h >> 8) as u8,
                a: if h & 0x10 == 0 { 255 } else { (h >> 4) as u8 },
            }
        })
        .collect()
}

fn train(pixels: &[RGBA<u8>], width: usize, height: usize, size: usize, fraction: usize) -> Palette {
    let img = ImgRgba8::new(pixels, width, height).unwrap();
    let mut network = Network::new(size, fraction);
    network.learn(&img);
    network.build_palette()
}

#[test]
fn trained_palette_is_sorted_by_green() {
    let pixels = noisy_image(64, 48);
    let palette = train(&pixels, 64, 48, 256, 1);
    assert_eq!(palette.len(), 256);
    assert!(palette.colors().windows(2).all(|w| w[0].g <= w[1].g));
}

#[test]
fn indexed_lookup_matches_brute_force() {
    let pixels = noisy_image(50, 50);
    let palette = train(&pixels, 50, 50, 128, 3);

    for i in 0..4000u32 {
        let h = i.wrapping_mul(0x9E3779B9) ^ (i << 7);
        let q = RGBA::new(
            (h >> 16) as u16,
            h as u16,
            h.rotate_left(11) as u16,
            h.rotate_left(23) as u16,
        );
        let fast = palette.nearest(q);
        let slow = palette.nearest_linear(q);
        assert_eq!(
            palette.distance_sq(q, fast),
            palette.distance_sq(q, slow),
            "query {q:?}"
        );
    }

    // Every training pixel as a query too.
    for p in &pixels {
        let q = expand_rgba8(*p);
        assert_eq!(
            palette.distance_sq(q, palette.nearest(q)),
            palette.distance_sq(q, palette.nearest_linear(q))
        );
    }
}

#[test]
fn lookup_has_no_side_effects() {
    let pixels = noisy_image(20, 20);
    let palette = train(&pixels, 20, 20, 64, 1);
    let before = palette.colors().to_vec();

    let q = RGBA::new(30000, 12000, 500, 65535);
    let first = palette.nearest(q);
    for _ in 0..100 {
        assert_eq!(palette.nearest(q), first);
    }
    assert_eq!(palette.colors(), &before[..]);
}

#[test]
fn frequencies_sum_to_one_after_training() {
    let pixels = noisy_image(40, 40);
    let img = ImgRgba8::new(&pixels, 40, 40).unwrap();
    let mut network = Network::new(100, 1);
    network.learn(&img);
    let sum: f64 = network.frequencies().iter().sum();
    assert!((sum - 1.0).abs() < 1e-9, "frequency sum {sum}");
}

#[test]
fn solid_color_is_its_own_nearest_match() {
    for (w, h, color) in [
        (3, 5, RGBA::new(200u8, 100, 50, 255)),
        (16, 16, RGBA::new(10, 250, 128, 255)),
        (64, 40, RGBA::new(0, 0, 0, 0)),
    ] {
        let pixels = vec![color; w * h];
        let palette = train(&pixels, w, h, 32, 1);
        let entry = palette.entries_rgba8()[palette.nearest_rgba8(color)];
        for (got, want) in [
            (entry.r, color.r),
            (entry.g, color.g),
            (entry.b, color.b),
            (entry.a, color.a),
        ] {
            assert!(
                got.abs_diff(want) <= 1,
                "solid {color:?} matched {entry:?}"
            );
        }
    }
}

#[test]
fn four_saturated_colors_get_distinct_entries() {
    let red = RGBA::new(255u8, 0, 0, 255);
    let green = RGBA::new(0, 255, 0, 255);
    let blue = RGBA::new(0, 0, 255, 255);
    let black = RGBA::new(0, 0, 0, 255);
    let pixels = [red, green, blue, black];

    let config = QuantizeConfig::new().palette_size(16).sample_fraction(1);
    let result = neuquant::quantize(&pixels, 2, 2, &config).unwrap();
    assert_eq!(result.palette_len(), 16);

    let palette = result.network_palette();
    let mut found: Vec<usize> = pixels.iter().map(|&c| palette.nearest_rgba8(c)).collect();
    found.sort_unstable();
    found.dedup();
    assert_eq!(found.len(), 4, "colors collapsed: {found:?}");
}

#[test]
fn training_is_reproducible() {
    let pixels = noisy_image(37, 23);
    let config = QuantizeConfig::new().palette_size(200).sample_fraction(2);

    let a = neuquant::quantize(&pixels, 37, 23, &config).unwrap();
    let b = neuquant::quantize(&pixels, 37, 23, &config).unwrap();
    assert_eq!(a.palette(), b.palette());
    assert_eq!(a.indices(), b.indices());
    assert_eq!(a.network_palette().colors(), b.network_palette().colors());
}

#[test]
fn remap_agrees_with_lookup() {
    let pixels = noisy_image(24, 24);
    let config = QuantizeConfig::new().palette_size(64).sample_fraction(1);
    let result = neuquant::quantize(&pixels, 24, 24, &config).unwrap();
    let palette = result.network_palette();
    for (p, &idx) in pixels.iter().zip(result.indices()) {
        assert_eq!(palette.nearest_rgba8(*p), idx as usize);
    }
}
