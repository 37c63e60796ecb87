//! Grayscale image pyramid with a fractional per-level downsample ratio.
//!
//! Purpose
//! - Provide the coarse-to-fine resolutions visited by the flow estimator.
//!
//! Design
//! - The base image is smoothed once by the caller (pre-smoothing is not
//!   re-applied per level).
//! - Level `k` is the base resampled by `wrap_factor^k` with area averaging,
//!   so every level is derived directly from the base rather than from the
//!   previous level.
//! - Sizes and validation live in [`scaling::LevelGeometry`]; a level below
//!   2×2 is rejected before any level is built.
//!
//! Complexity
//! - Per level O(W·H); memory O(sum of levels), ~4/3 of the base for 0.5.

pub mod filters;
pub mod scaling;

use crate::error::{FlowError, Result};
use crate::image::ImageF64;
use scaling::{resize, LevelGeometry};

/// Deepest coarsest-level index accepted.
pub const MAX_LEVEL: usize = 256;

/// Options controlling pyramid construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PyramidOptions {
    /// Index of the coarsest level; the pyramid holds `max_level + 1` levels.
    pub max_level: usize,
    /// Per-level downsample ratio in `(0, 1]`.
    pub wrap_factor: f64,
}

impl PyramidOptions {
    pub fn new(max_level: usize, wrap_factor: f64) -> Self {
        Self {
            max_level,
            wrap_factor,
        }
    }

    /// Geometry of every level, finest first.
    pub fn geometries(
        &self,
        width: usize,
        height: usize,
    ) -> impl Iterator<Item = LevelGeometry> + Clone {
        let wrap_factor = self.wrap_factor;
        (0..=self.max_level).map(move |k| LevelGeometry::new(width, height, wrap_factor, k))
    }

    /// Reject pyramids deeper than [`MAX_LEVEL`] and inputs whose coarsest
    /// (or any) level would drop below 2×2. Nothing is collected before the
    /// first degenerate level is found.
    pub fn validate_for(&self, width: usize, height: usize) -> Result<Vec<LevelGeometry>> {
        if self.max_level > MAX_LEVEL {
            return Err(FlowError::invalid(
                "maxlevel",
                format!("at most {MAX_LEVEL} levels are supported, got {}", self.max_level),
            ));
        }
        let levels = self.geometries(width, height);
        if let Some(g) = levels.clone().find(|g| g.is_degenerate()) {
            return Err(FlowError::LevelTooSmall {
                level: g.level,
                width: g.width,
                height: g.height,
            });
        }
        Ok(levels.collect())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Pyramid {
    /// `levels[k]` has scale `wrap_factor^k`; index 0 is the base.
    pub levels: Vec<ImageF64>,
    pub geometry: Vec<LevelGeometry>,
}

impl Pyramid {
    /// Build all levels from an already smoothed base image.
    pub fn build(base: ImageF64, options: PyramidOptions) -> Result<Self> {
        let geometry = options.validate_for(base.w, base.h)?;
        let mut levels = Vec::with_capacity(geometry.len());
        for g in geometry.iter().skip(1) {
            levels.push(resize(&base, g.width, g.height));
        }
        levels.insert(0, base);
        Ok(Self { levels, geometry })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, k: usize) -> Option<(&ImageF64, &LevelGeometry)> {
        Some((self.levels.get(k)?, self.geometry.get(k)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageView;

    #[test]
    fn builds_levels_with_rounded_sizes() {
        let base = ImageF64::filled(32, 20, 7.0);
        let pyr = Pyramid::build(base, PyramidOptions::new(2, 0.5)).unwrap();
        assert_eq!(pyr.len(), 3);
        let dims: Vec<_> = pyr.levels.iter().map(|l| l.dims()).collect();
        assert_eq!(dims, vec![(32, 20), (16, 10), (8, 5)]);
        assert!((pyr.geometry[2].scale - 0.25).abs() < 1e-12);
        assert!(!pyr.is_empty());
        let (coarsest, g) = pyr.level(2).unwrap();
        assert_eq!((coarsest.w, coarsest.h), (g.width, g.height));
        assert!(pyr.level(3).is_none());
    }

    #[test]
    fn huge_depth_is_rejected_without_allocating() {
        match PyramidOptions::new(usize::MAX, 0.5).validate_for(32, 32) {
            Err(FlowError::InvalidParameter { name: "maxlevel", .. }) => {}
            other => panic!("unexpected result {other:?}"),
        }
        // Within the depth limit the first degenerate level is reported.
        match PyramidOptions::new(MAX_LEVEL, 0.5).validate_for(32, 32) {
            Err(FlowError::LevelTooSmall { level, .. }) => assert_eq!(level, 5),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn rejects_levels_below_two_by_two() {
        let base = ImageF64::new(8, 8);
        let err = Pyramid::build(base, PyramidOptions::new(3, 0.5)).unwrap_err();
        assert!(matches!(
            err,
            FlowError::LevelTooSmall {
                level: 3,
                width: 1,
                height: 1
            }
        ));
    }
}
