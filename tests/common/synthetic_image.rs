use brox_flow::image::ImageF64;
use std::f64::consts::TAU;

/// Smooth two-frequency texture, periods 16 px along x and 13 px along y.
pub fn sinusoid(x: f64, y: f64) -> f64 {
    128.0 + 50.0 * (TAU * x / 16.0).sin() + 50.0 * (TAU * y / 13.0).sin()
}

/// Frame pair where the second frame is the first translated by `(dx, dy)`,
/// i.e. `I2(x, y) = I1(x - dx, y - dy)`; the true flow is `(dx, dy)`.
pub fn shifted_pair(width: usize, height: usize, dx: f64, dy: f64) -> (ImageF64, ImageF64) {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let i1 = ImageF64::from_fn(width, height, |x, y| sinusoid(x as f64, y as f64));
    let i2 = ImageF64::from_fn(width, height, |x, y| sinusoid(x as f64 - dx, y as f64 - dy));
    (i1, i2)
}

/// 8-bit quantisation of [`shifted_pair`], tightly packed.
pub fn shifted_pair_u8(width: usize, height: usize, dx: f64, dy: f64) -> (Vec<u8>, Vec<u8>) {
    let (i1, i2) = shifted_pair(width, height, dx, dy);
    let quantise = |img: &ImageF64| {
        img.data
            .iter()
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
            .collect::<Vec<u8>>()
    };
    (quantise(&i1), quantise(&i2))
}
