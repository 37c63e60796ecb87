//! Backward warping of an image by a flow field.
//!
//! Each output pixel samples the source at its own coordinates plus the
//! displacement, converted from full-resolution pixels to level pixels by
//! `scale`. Sampling is bilinear. Positions outside `[0, w-1] × [0, h-1]` are
//! transparent: the output keeps the source's own pixel there, so no
//! artificial zero intensity enters the data term at the image edges.
use crate::error::Result;
use crate::flow::FlowField;
use crate::image::grid::ensure_same_dims;
use crate::image::{ImageF64, ImageView};

/// Warp `image` by `flow`; returns the warped image and the number of
/// transparent (out-of-range) samples.
pub fn warp_bilinear(image: &ImageF64, flow: &FlowField, scale: f64) -> Result<(ImageF64, usize)> {
    ensure_same_dims("warp flow", image, flow)?;
    let (w, h) = (image.w, image.h);
    let mut out = image.clone();
    let mut transparent = 0usize;
    let max_x = w.saturating_sub(1) as f64;
    let max_y = h.saturating_sub(1) as f64;
    for y in 0..h {
        for (x, f) in flow.row(y).iter().enumerate() {
            let sx = x as f64 + f.x * scale;
            let sy = y as f64 + f.y * scale;
            match sample_bilinear(image, sx, sy, max_x, max_y) {
                Some(v) => out.set(x, y, v),
                None => transparent += 1,
            }
        }
    }
    Ok((out, transparent))
}

#[inline]
fn sample_bilinear(image: &ImageF64, sx: f64, sy: f64, max_x: f64, max_y: f64) -> Option<f64> {
    if !(0.0..=max_x).contains(&sx) || !(0.0..=max_y).contains(&sy) {
        return None;
    }
    let x0 = sx.floor() as usize;
    let y0 = sy.floor() as usize;
    let x1 = (x0 + 1).min(image.w - 1);
    let y1 = (y0 + 1).min(image.h - 1);
    let ax = sx - x0 as f64;
    let ay = sy - y0 as f64;
    let top = image.get(x0, y0) * (1.0 - ax) + image.get(x1, y0) * ax;
    let bottom = image.get(x0, y1) * (1.0 - ax) + image.get(x1, y1) * ax;
    Some(top * (1.0 - ay) + bottom * ay)
}
