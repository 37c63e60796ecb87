use crate::pyramid::scaling::LevelGeometry;
use serde::Serialize;

/// What the estimator did at one pyramid level.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTrace {
    pub level: usize,
    pub width: usize,
    pub height: usize,
    pub scale: f64,
    pub hx: f64,
    pub hy: f64,
    /// Relaxation sweeps executed (always the configured budget).
    pub sweeps: usize,
    /// Denominators clamped across all sweeps of the level.
    pub clamped_denominators: usize,
    /// Warp samples that fell outside the image and kept the source pixel.
    pub transparent_samples: usize,
    /// Largest per-cell change during the last sweep.
    pub last_max_update: f64,
    pub mean_increment: [f64; 2],
    pub max_increment: f64,
    pub elapsed_ms: f64,
}

impl LevelTrace {
    pub fn new(geometry: &LevelGeometry) -> Self {
        Self {
            level: geometry.level,
            width: geometry.width,
            height: geometry.height,
            scale: geometry.scale,
            hx: geometry.hx,
            hy: geometry.hy,
            sweeps: 0,
            clamped_denominators: 0,
            transparent_samples: 0,
            last_max_update: 0.0,
            mean_increment: [0.0; 2],
            max_increment: 0.0,
            elapsed_ms: 0.0,
        }
    }
}
