//! Level geometry and resampling between pyramid resolutions.
//!
//! - Level `k` has scale `wrap_factor^k` relative to the input; its size is
//!   `round(dim · scale)` and its grid spacing `h = 1 / scale`.
//! - Resampling is separable. A shrinking axis averages the source cells
//!   covered by each destination cell (area weights); an enlarging axis
//!   interpolates linearly between pixel centres with clamped edges.
use crate::image::{Grid, ImageView, Pixel};

/// Size and spacing of one pyramid level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelGeometry {
    pub level: usize,
    pub width: usize,
    pub height: usize,
    /// Level resolution relative to full resolution (`wrap_factor^level`).
    pub scale: f64,
    /// Grid spacing in full-resolution pixels along x.
    pub hx: f64,
    /// Grid spacing in full-resolution pixels along y.
    pub hy: f64,
}

impl LevelGeometry {
    pub fn new(full_width: usize, full_height: usize, wrap_factor: f64, level: usize) -> Self {
        let scale = wrap_factor.powi(i32::try_from(level).unwrap_or(i32::MAX));
        let width = scaled_len(full_width, scale);
        let height = scaled_len(full_height, scale);
        Self {
            level,
            width,
            height,
            scale,
            hx: 1.0 / scale,
            hy: 1.0 / scale,
        }
    }

    /// Smallest side a level may have for derivatives and tensors to exist.
    pub const MIN_SIDE: usize = 2;

    pub fn is_degenerate(&self) -> bool {
        self.width < Self::MIN_SIDE || self.height < Self::MIN_SIDE
    }
}

fn scaled_len(len: usize, scale: f64) -> usize {
    (len as f64 * scale).round() as usize
}

/// One source contribution to a destination sample.
type Tap = (usize, f64);

/// Resample `src` to `w × h`.
pub fn resize<P: Pixel>(src: &Grid<P>, w: usize, h: usize) -> Grid<P> {
    if src.w == w && src.h == h {
        return src.clone();
    }
    if src.w == 0 || src.h == 0 || w == 0 || h == 0 {
        return Grid::new(w, h);
    }

    let x_taps = axis_taps(src.w, w);
    let mut horiz = Grid::new(w, src.h);
    for y in 0..src.h {
        let src_row = src.row(y);
        let start = horiz.idx(0, y);
        for (x, taps) in x_taps.iter().enumerate() {
            horiz.data[start + x] = weighted(taps, |i| src_row[i]);
        }
    }

    let y_taps = axis_taps(src.h, h);
    let mut out = Grid::new(w, h);
    for (y, taps) in y_taps.iter().enumerate() {
        for x in 0..w {
            let v = weighted(taps, |i| horiz.get(x, i));
            out.set(x, y, v);
        }
    }
    out
}

#[inline]
fn weighted<P: Pixel>(taps: &[Tap], sample: impl Fn(usize) -> P) -> P {
    taps.iter()
        .fold(P::zero(), |acc, &(i, wgt)| acc + sample(i) * wgt)
}

fn axis_taps(src_len: usize, dst_len: usize) -> Vec<Vec<Tap>> {
    if src_len == dst_len {
        return (0..dst_len).map(|i| vec![(i, 1.0)]).collect();
    }
    let ratio = src_len as f64 / dst_len as f64;
    if dst_len < src_len {
        (0..dst_len).map(|i| area_taps(i, ratio, src_len)).collect()
    } else {
        (0..dst_len).map(|i| linear_taps(i, ratio, src_len)).collect()
    }
}

fn area_taps(i: usize, ratio: f64, src_len: usize) -> Vec<Tap> {
    let start = i as f64 * ratio;
    let end = (start + ratio).min(src_len as f64);
    let first = start.floor() as usize;
    let last = (end.ceil() as usize).min(src_len);
    let mut taps = Vec::with_capacity(last - first);
    let mut total = 0.0;
    for s in first..last {
        let overlap = end.min((s + 1) as f64) - start.max(s as f64);
        if overlap > 1e-12 {
            taps.push((s, overlap));
            total += overlap;
        }
    }
    for tap in &mut taps {
        tap.1 /= total;
    }
    taps
}

fn linear_taps(i: usize, ratio: f64, src_len: usize) -> Vec<Tap> {
    let pos = (i as f64 + 0.5) * ratio - 0.5;
    if pos <= 0.0 {
        return vec![(0, 1.0)];
    }
    let max = (src_len - 1) as f64;
    if pos >= max {
        return vec![(src_len - 1, 1.0)];
    }
    let x0 = pos.floor() as usize;
    let frac = pos - x0 as f64;
    vec![(x0, 1.0 - frac), (x0 + 1, frac)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{Flow, FlowField};
    use crate::image::ImageF64;

    #[test]
    fn geometry_rounds_level_sizes() {
        let g = LevelGeometry::new(33, 20, 0.5, 2);
        assert_eq!((g.width, g.height), (8, 5));
        assert!((g.hx - 4.0).abs() < 1e-12);
        assert!(LevelGeometry::new(3, 3, 0.5, 2).is_degenerate());
    }

    #[test]
    fn area_downsample_averages_blocks() {
        let img = ImageF64::from_fn(4, 2, |x, y| (x + 4 * y) as f64);
        let out = resize(&img, 2, 1);
        // mean of {0,1,4,5} and {2,3,6,7}
        assert!((out.get(0, 0) - 2.5).abs() < 1e-12);
        assert!((out.get(1, 0) - 4.5).abs() < 1e-12);
    }

    #[test]
    fn constant_flow_survives_down_and_up() {
        let flow = FlowField::filled(32, 24, Flow::new(1.25, -0.5));
        let down = resize(&flow, 8, 6);
        let up = resize(&down, 32, 24);
        for f in &up.data {
            assert!((f - Flow::new(1.25, -0.5)).norm() < 1e-12);
        }
    }

    #[test]
    fn linear_ramp_is_preserved_away_from_edges() {
        let ramp = ImageF64::from_fn(32, 4, |x, _| x as f64);
        let down = resize(&ramp, 16, 4);
        let up = resize(&down, 32, 4);
        for x in 1..31 {
            let v = up.get(x, 2);
            assert!((v - x as f64).abs() < 1e-9, "x={x} got {v}");
        }
    }

    #[test]
    fn non_integer_ratio_keeps_weights_normalised() {
        let img = ImageF64::filled(10, 10, 3.0);
        let out = resize(&img, 7, 4);
        for &v in &out.data {
            assert!((v - 3.0).abs() < 1e-12);
        }
    }
}
