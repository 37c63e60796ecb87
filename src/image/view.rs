/// Borrowed single-channel view over caller-owned pixels of any depth.
#[derive(Clone, Debug)]
pub struct GrayView<'a, T> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // elements between rows
    pub data: &'a [T],
}

/// 8-bit grayscale view.
pub type ImageU8<'a> = GrayView<'a, u8>;
/// 16-bit grayscale view.
pub type ImageU16<'a> = GrayView<'a, u16>;

impl<'a, T: Copy> GrayView<'a, T> {
    /// Tightly packed view (`stride == w`).
    pub fn packed(w: usize, h: usize, data: &'a [T]) -> Self {
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[y * self.stride + x]
    }
}

impl<'a, T: Copy> crate::image::traits::ImageView for GrayView<'a, T> {
    type Pixel = T;

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
    fn row(&self, y: usize) -> &[T] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[T]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}
