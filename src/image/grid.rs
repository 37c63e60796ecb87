//! Owned 2D grid in row-major layout (stride == width).
//!
//! One container backs every per-pixel buffer of the solver: intensity
//! images (`f64`), flow fields (`Vector2<f64>`) and tensor fields. Provides
//! row access, a contiguous slice and the padding/cropping used around the
//! relaxation phase of each pyramid level.
use super::traits::{ImageView, ImageViewMut, Pixel};
use crate::error::{FlowError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Grid<P> {
    /// Grid width in cells
    pub w: usize,
    /// Grid height in cells
    pub h: usize,
    /// Number of cells between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<P>,
}

impl<P: Pixel> Grid<P> {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, P::zero())
    }

    /// Construct a buffer of size `w × h` with every cell set to `value`.
    pub fn filled(w: usize, h: usize, value: P) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![value; w * h],
        }
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(w: usize, h: usize, data: Vec<P>) -> Result<Self> {
        if data.len() != w * h {
            return Err(FlowError::SizeMismatch {
                what: "grid buffer",
                expected: (w, h),
                actual: (data.len(), 1),
            });
        }
        Ok(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> P) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the cell value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> P {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the cell value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: P) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Same-sized grid with `f` applied to every cell.
    pub fn map<Q: Pixel>(&self, f: impl Fn(P) -> Q) -> Grid<Q> {
        Grid {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: self.data.iter().map(|&c| f(c)).collect(),
        }
    }

    /// Cell-wise sum. Both grids must have identical dimensions.
    pub fn add_cells(&self, other: &Grid<P>) -> Result<Grid<P>> {
        ensure_same_dims("grid sum", self, other)?;
        Ok(Grid {
            w: self.w,
            h: self.h,
            stride: self.w,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| a + b)
                .collect(),
        })
    }

    /// Copy surrounded by a constant-zero ring `border` cells wide.
    pub fn padded(&self, border: usize) -> Grid<P> {
        let mut out = Grid::new(self.w + 2 * border, self.h + 2 * border);
        for y in 0..self.h {
            let start = out.idx(border, y + border);
            out.data[start..start + self.w].copy_from_slice(self.row(y));
        }
        out
    }

    /// Inverse of [`Grid::padded`]: drop a ring `border` cells wide.
    pub fn strip_border(&self, border: usize) -> Grid<P> {
        let w = self.w.saturating_sub(2 * border);
        let h = self.h.saturating_sub(2 * border);
        let mut out = Grid::new(w, h);
        for y in 0..h {
            let src = &self.row(y + border)[border..border + w];
            out.data[y * w..(y + 1) * w].copy_from_slice(src);
        }
        out
    }
}

impl Grid<f64> {
    /// Convert any scalar view (8/16-bit or float) into an owned `f64` image.
    ///
    /// Intensities keep their native scale; no normalisation is applied.
    pub fn from_view<V>(view: &V) -> Self
    where
        V: ImageView,
        V::Pixel: Into<f64>,
    {
        let (w, h) = view.dims();
        let mut out = Grid::new(w, h);
        for (y, src) in view.rows().enumerate() {
            let dst = out.row_mut(y);
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = s.into();
            }
        }
        out
    }
}

pub(crate) fn ensure_same_dims<A, B>(what: &'static str, a: &A, b: &B) -> Result<()>
where
    A: ImageView,
    B: ImageView,
{
    if a.dims() != b.dims() {
        return Err(FlowError::SizeMismatch {
            what,
            expected: a.dims(),
            actual: b.dims(),
        });
    }
    Ok(())
}

impl<P: Copy> ImageView for Grid<P> {
    type Pixel = P;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[P] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[P]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}

impl<P: Copy> ImageViewMut for Grid<P> {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [P] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }

    #[inline]
    fn as_mut_slice(&mut self) -> Option<&mut [P]> {
        if self.stride == self.w {
            Some(&mut self.data[..self.w * self.h])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_round_trips_through_strip() {
        let g = Grid::from_fn(3, 2, |x, y| (x + 10 * y) as f64);
        let p = g.padded(1);
        assert_eq!((p.w, p.h), (5, 4));
        assert_eq!(p.get(0, 0), 0.0);
        assert_eq!(p.get(4, 3), 0.0);
        assert_eq!(p.get(1, 1), 0.0);
        assert_eq!(p.get(3, 2), 12.0);
        assert_eq!(p.strip_border(1), g);
    }

    #[test]
    fn add_rejects_mismatched_grids() {
        let a = Grid::<f64>::new(4, 4);
        let b = Grid::<f64>::new(4, 3);
        assert!(matches!(a.add_cells(&b), Err(FlowError::SizeMismatch { .. })));
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Grid::<f64>::from_vec(2, 2, vec![0.0; 3]).is_err());
        let g = Grid::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(g.get(1, 1), 4.0);
    }
}
