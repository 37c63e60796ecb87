use crate::image::{ImageF64, ImageView, ImageViewMut};

/// Trait implemented by separable 1D filters used for pre-smoothing.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). The kernel is assumed to be
    /// symmetric around its centre, but the implementation does not rely on it.
    fn taps(&self) -> &[f64];
}

/// Sampled, normalised Gaussian.
///
/// The support follows the usual `round(8σ + 1) | 1` rule for floating-point
/// images, i.e. a radius of about `4σ`.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKernel {
    sigma: f64,
    taps: Vec<f64>,
}

impl GaussianKernel {
    /// Kernel for standard deviation `sigma`. `sigma <= 0` yields the identity.
    pub fn new(sigma: f64) -> Self {
        if sigma.is_nan() || sigma <= 0.0 {
            return Self {
                sigma: 0.0,
                taps: vec![1.0],
            };
        }
        let size = ((8.0 * sigma + 1.0).round() as usize) | 1;
        let radius = (size / 2) as isize;
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f64> = (-radius..=radius)
            .map(|k| (-((k * k) as f64) / denom).exp())
            .collect();
        let sum: f64 = taps.iter().sum();
        taps.iter_mut().for_each(|t| *t /= sum);
        Self { sigma, taps }
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn radius(&self) -> usize {
        self.taps.len() / 2
    }

    pub fn is_identity(&self) -> bool {
        self.taps.len() == 1
    }
}

impl SeparableFilter for GaussianKernel {
    #[inline]
    fn taps(&self) -> &[f64] {
        &self.taps
    }
}

/// Separable convolution with reflected borders (`cba|abc`).
pub fn apply(filter: &dyn SeparableFilter, inp: &ImageF64) -> ImageF64 {
    let taps = filter.taps();
    let (w, h) = (inp.w, inp.h);
    if taps.len() <= 1 || w == 0 || h == 0 {
        return inp.clone();
    }
    let radius = (taps.len() / 2) as isize;

    let mut tmp = ImageF64::new(w, h);
    for y in 0..h {
        let src = inp.row(y);
        let dst = tmp.row_mut(y);
        for (x, out) in dst.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, &tap) in taps.iter().enumerate() {
                let sx = reflect_index(x as isize + k as isize - radius, w);
                acc += tap * src[sx];
            }
            *out = acc;
        }
    }

    let mut out = ImageF64::new(w, h);
    for y in 0..h {
        let dst = out.row_mut(y);
        for (k, &tap) in taps.iter().enumerate() {
            let sy = reflect_index(y as isize + k as isize - radius, h);
            let src = tmp.row(sy);
            for (d, &s) in dst.iter_mut().zip(src) {
                *d += tap * s;
            }
        }
    }
    out
}

/// Gaussian pre-smoothing; `sigma <= 0` returns an unmodified copy.
pub fn gaussian_blur(inp: &ImageF64, sigma: f64) -> ImageF64 {
    apply(&GaussianKernel::new(sigma), inp)
}

/// Mirror an out-of-range index back into `[0, len)`; the edge sample is
/// repeated (`fedcba|abcdef|fedcba`).
fn reflect_index(mut idx: isize, len: usize) -> usize {
    let n = len as isize;
    if n == 1 {
        return 0;
    }
    loop {
        if idx < 0 {
            idx = -idx - 1;
        } else if idx >= n {
            idx = 2 * n - idx - 1;
        } else {
            return idx as usize;
        }
    }
}
