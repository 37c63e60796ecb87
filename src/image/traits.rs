use std::ops::{Add, Mul};

use nalgebra::Vector2;

/// Read access to a row-major single-channel image.
pub trait ImageView {
    type Pixel: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn stride(&self) -> usize;

    fn row(&self, y: usize) -> &[Self::Pixel];

    fn rows(&self) -> Rows<'_, Self>
    where
        Self: Sized,
    {
        Rows { image: self, y: 0 }
    }

    fn is_contiguous(&self) -> bool {
        self.stride() == self.width()
    }

    fn as_slice(&self) -> Option<&[Self::Pixel]> {
        None
    }

    fn dims(&self) -> (usize, usize) {
        (self.width(), self.height())
    }
}

pub trait ImageViewMut: ImageView {
    fn row_mut(&mut self, y: usize) -> &mut [Self::Pixel];

    fn as_mut_slice(&mut self) -> Option<&mut [Self::Pixel]> {
        None
    }
}

pub struct Rows<'a, I: ?Sized + ImageView> {
    image: &'a I,
    y: usize,
}

impl<'a, I: ImageView> Iterator for Rows<'a, I> {
    type Item = &'a [I::Pixel];

    fn next(&mut self) -> Option<Self::Item> {
        if self.y >= self.image.height() {
            return None;
        }
        let y = self.y;
        self.y += 1;
        Some(self.image.row(y))
    }
}

/// Cell type stored in a [`Grid`](super::Grid).
///
/// Resampling, padding and blending only need a zero element plus linear
/// combination with real weights, so every cell type is a small vector space
/// over `f64`.
pub trait Pixel: Copy + Send + Sync + Add<Output = Self> + Mul<f64, Output = Self> {
    fn zero() -> Self;
}

impl Pixel for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }
}

impl Pixel for Vector2<f64> {
    #[inline]
    fn zero() -> Self {
        Vector2::zeros()
    }
}
