//! Motion tensors linearising the data term.
//!
//! A tensor holds the six distinct entries of a symmetric 3×3 matrix `J` so
//! that the linearised data residual at a pixel is
//! `[du dv 1] · J · [du dv 1]ᵀ`. Brightness constancy contributes the outer
//! product of `(Ix, Iy, It)`; gradient constancy contributes the outer
//! products of `(Ixx, Ixy, Ixt)` and `(Ixy, Iyy, Iyt)`.
//!
//! The [`TensorProvider`] trait is the seam for other derivative schemes.
//! [`DerivativeTensors`] uses central differences with replicate borders,
//! averages spatial derivatives of both frames and takes the temporal
//! derivative as `I2 − I1`; `(hx, hy)` express derivatives in
//! full-resolution units.
use crate::image::{Grid, ImageF64, ImageView, Pixel};
use nalgebra::Vector3;
use std::ops::{Add, Mul};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Entries `(J11, J22, J33, J21, J13, J23)` of the symmetric motion tensor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tensor {
    pub j11: f64,
    pub j22: f64,
    pub j33: f64,
    pub j21: f64,
    pub j13: f64,
    pub j23: f64,
}

impl Tensor {
    pub const fn new(j11: f64, j22: f64, j33: f64, j21: f64, j13: f64, j23: f64) -> Self {
        Self {
            j11,
            j22,
            j33,
            j21,
            j13,
            j23,
        }
    }

    /// `a · aᵀ`
    pub fn outer(a: &Vector3<f64>) -> Self {
        Self {
            j11: a.x * a.x,
            j22: a.y * a.y,
            j33: a.z * a.z,
            j21: a.x * a.y,
            j13: a.x * a.z,
            j23: a.y * a.z,
        }
    }

    /// Quadratic form `[du dv 1] · J · [du dv 1]ᵀ`.
    #[inline]
    pub fn residual(&self, du: f64, dv: f64) -> f64 {
        self.j11 * du * du
            + self.j22 * dv * dv
            + self.j33
            + 2.0 * self.j21 * du * dv
            + 2.0 * self.j13 * du
            + 2.0 * self.j23 * dv
    }

    /// Channel array in storage order.
    pub fn to_array(&self) -> [f64; 6] {
        [self.j11, self.j22, self.j33, self.j21, self.j13, self.j23]
    }
}

impl Add for Tensor {
    type Output = Tensor;

    fn add(self, o: Tensor) -> Tensor {
        Tensor::new(
            self.j11 + o.j11,
            self.j22 + o.j22,
            self.j33 + o.j33,
            self.j21 + o.j21,
            self.j13 + o.j13,
            self.j23 + o.j23,
        )
    }
}

impl Mul<f64> for Tensor {
    type Output = Tensor;

    fn mul(self, s: f64) -> Tensor {
        Tensor::new(
            self.j11 * s,
            self.j22 * s,
            self.j33 * s,
            self.j21 * s,
            self.j13 * s,
            self.j23 * s,
        )
    }
}

impl Pixel for Tensor {
    #[inline]
    fn zero() -> Self {
        Tensor::default()
    }
}

pub type TensorField = Grid<Tensor>;

/// Source of per-pixel brightness and gradient constancy tensors.
pub trait TensorProvider: Sync {
    /// Brightness-constancy tensor field for `i1 → i2` at spacing `(hx, hy)`.
    fn brightness(&self, i1: &ImageF64, i2: &ImageF64, hx: f64, hy: f64) -> TensorField;

    /// Gradient-constancy tensor field for `i1 → i2` at spacing `(hx, hy)`.
    fn gradient(&self, i1: &ImageF64, i2: &ImageF64, hx: f64, hy: f64) -> TensorField;

    /// `(1 − gamma) · brightness + gamma · gradient`
    fn blended(&self, i1: &ImageF64, i2: &ImageF64, hx: f64, hy: f64, gamma: f64) -> TensorField {
        let b = self.brightness(i1, i2, hx, hy);
        let g = self.gradient(i1, i2, hx, hy);
        let data = b
            .data
            .iter()
            .zip(&g.data)
            .map(|(&bt, &gt)| bt * (1.0 - gamma) + gt * gamma)
            .collect();
        Grid {
            w: b.w,
            h: b.h,
            stride: b.w,
            data,
        }
    }
}

/// Central-difference tensors with replicate borders.
#[derive(Clone, Copy, Debug, Default)]
pub struct DerivativeTensors;

impl TensorProvider for DerivativeTensors {
    fn brightness(&self, i1: &ImageF64, i2: &ImageF64, hx: f64, hy: f64) -> TensorField {
        let fx = average(&derivative_x(i1, hx), &derivative_x(i2, hx));
        let fy = average(&derivative_y(i1, hy), &derivative_y(i2, hy));
        let ft = difference(i2, i1);
        per_pixel(i1.w, i1.h, |i| {
            Tensor::outer(&Vector3::new(fx.data[i], fy.data[i], ft.data[i]))
        })
    }

    fn gradient(&self, i1: &ImageF64, i2: &ImageF64, hx: f64, hy: f64) -> TensorField {
        let (x1, y1) = (derivative_x(i1, hx), derivative_y(i1, hy));
        let (x2, y2) = (derivative_x(i2, hx), derivative_y(i2, hy));
        let fxx = average(&derivative_x(&x1, hx), &derivative_x(&x2, hx));
        let fyy = average(&derivative_y(&y1, hy), &derivative_y(&y2, hy));
        let fxy = average(&derivative_y(&x1, hy), &derivative_y(&x2, hy));
        let fxt = difference(&x2, &x1);
        let fyt = difference(&y2, &y1);
        per_pixel(i1.w, i1.h, |i| {
            let a = Vector3::new(fxx.data[i], fxy.data[i], fxt.data[i]);
            let b = Vector3::new(fxy.data[i], fyy.data[i], fyt.data[i]);
            Tensor::outer(&a) + Tensor::outer(&b)
        })
    }
}

/// Fill a `w × h` tensor grid from a per-index kernel; row-parallel when the
/// `parallel` feature is on.
fn per_pixel(w: usize, h: usize, f: impl Fn(usize) -> Tensor + Sync) -> TensorField {
    let mut out = TensorField::new(w, h);
    if w == 0 {
        return out;
    }
    #[cfg(feature = "parallel")]
    {
        out.data
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| row.iter_mut().enumerate().for_each(|(x, t)| *t = f(y * w + x)));
    }
    #[cfg(not(feature = "parallel"))]
    {
        for (i, t) in out.data.iter_mut().enumerate() {
            *t = f(i);
        }
    }
    out
}

/// `[-1, 0, 1] / (2h)` along x, replicate border.
pub fn derivative_x(img: &ImageF64, hx: f64) -> ImageF64 {
    let mut out = ImageF64::new(img.w, img.h);
    if img.w == 0 {
        return out;
    }
    let norm = 1.0 / (2.0 * hx);
    for y in 0..img.h {
        let row = img.row(y);
        let last = img.w - 1;
        for x in 0..img.w {
            let xm = x.saturating_sub(1);
            let xp = (x + 1).min(last);
            out.set(x, y, (row[xp] - row[xm]) * norm);
        }
    }
    out
}

/// `[-1, 0, 1]ᵀ / (2h)` along y, replicate border.
pub fn derivative_y(img: &ImageF64, hy: f64) -> ImageF64 {
    let mut out = ImageF64::new(img.w, img.h);
    if img.h == 0 {
        return out;
    }
    let norm = 1.0 / (2.0 * hy);
    let last = img.h - 1;
    for y in 0..img.h {
        let above = img.row(y.saturating_sub(1));
        let below = img.row((y + 1).min(last));
        for x in 0..img.w {
            out.set(x, y, (below[x] - above[x]) * norm);
        }
    }
    out
}

fn average(a: &ImageF64, b: &ImageF64) -> ImageF64 {
    zip_with(a, b, |a, b| 0.5 * (a + b))
}

fn difference(a: &ImageF64, b: &ImageF64) -> ImageF64 {
    zip_with(a, b, |a, b| a - b)
}

fn zip_with(a: &ImageF64, b: &ImageF64, f: impl Fn(f64, f64) -> f64) -> ImageF64 {
    Grid {
        w: a.w,
        h: a.h,
        stride: a.w,
        data: a.data.iter().zip(&b.data).map(|(&a, &b)| f(a, b)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(w: usize, h: usize, gx: f64, gy: f64, offset: f64) -> ImageF64 {
        ImageF64::from_fn(w, h, |x, y| gx * x as f64 + gy * y as f64 + offset)
    }

    #[test]
    fn residual_matches_squared_linearised_constancy() {
        let a = Vector3::new(2.0, -1.0, 0.5);
        let t = Tensor::outer(&a);
        let (du, dv) = (0.3, -0.7);
        let expected = (a.x * du + a.y * dv + a.z).powi(2);
        assert!((t.residual(du, dv) - expected).abs() < 1e-12);
    }

    #[test]
    fn brightness_tensor_of_plane_pair() {
        let i1 = plane(6, 6, 2.0, 1.0, 0.0);
        let i2 = plane(6, 6, 2.0, 1.0, 4.0);
        let t = DerivativeTensors.brightness(&i1, &i2, 1.0, 1.0).get(3, 3);
        assert_eq!(t.to_array(), [4.0, 1.0, 16.0, 2.0, 8.0, 4.0]);
    }

    #[test]
    fn spacing_scales_derivatives() {
        let i1 = plane(6, 6, 2.0, 0.0, 0.0);
        let t = DerivativeTensors.brightness(&i1, &i1, 2.0, 2.0).get(2, 2);
        assert!((t.j11 - 1.0).abs() < 1e-12);
        assert_eq!(t.j33, 0.0);
    }

    #[test]
    fn gradient_tensor_vanishes_on_planes() {
        let i1 = plane(6, 6, 2.0, 1.0, 0.0);
        let i2 = plane(6, 6, 2.0, 1.0, 4.0);
        let t = DerivativeTensors.gradient(&i1, &i2, 1.0, 1.0).get(3, 3);
        assert_eq!(t, Tensor::default());
    }

    #[test]
    fn blend_interpolates_between_terms() {
        let i1 = ImageF64::from_fn(8, 8, |x, y| ((x * x) as f64) + (y as f64));
        let i2 = ImageF64::from_fn(8, 8, |x, y| ((x * x) as f64) + 2.0 * (y as f64));
        let b = DerivativeTensors.brightness(&i1, &i2, 1.0, 1.0).get(4, 4);
        let g = DerivativeTensors.gradient(&i1, &i2, 1.0, 1.0).get(4, 4);
        let t = DerivativeTensors.blended(&i1, &i2, 1.0, 1.0, 0.25).get(4, 4);
        let expected = b * 0.75 + g * 0.25;
        for (a, e) in t.to_array().iter().zip(expected.to_array()) {
            assert!((a - e).abs() < 1e-12);
        }
    }
}
