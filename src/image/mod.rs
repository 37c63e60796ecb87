pub mod grid;
pub mod io;
pub mod traits;
pub mod view;

pub use self::grid::Grid;
pub use self::traits::{ImageView, ImageViewMut, Pixel, Rows};
pub use self::view::{GrayView, ImageU16, ImageU8};

/// Owned floating-point intensity image.
pub type ImageF64 = Grid<f64>;
