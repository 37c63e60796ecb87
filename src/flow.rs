//! Flow-field types and summary statistics.
use crate::image::{Grid, ImageView};
use nalgebra::Vector2;
use serde::Serialize;

/// Per-pixel displacement `(du, dv)` in full-resolution pixels.
pub type Flow = Vector2<f64>;

/// Dense flow field, row = y, column = x.
pub type FlowField = Grid<Flow>;

/// Mean and standard deviation of a flow field over a rectangular region.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStats {
    pub mean: [f64; 2],
    pub std_dev: [f64; 2],
    pub max_magnitude: f64,
    pub samples: usize,
}

impl FlowStats {
    /// Statistics over the whole field.
    pub fn of(flow: &FlowField) -> Self {
        Self::of_region(flow, 0, 0, flow.w, flow.h)
    }

    /// Statistics over `[x0, x0+w) × [y0, y0+h)`, clipped to the field.
    pub fn of_region(flow: &FlowField, x0: usize, y0: usize, w: usize, h: usize) -> Self {
        let x1 = (x0 + w).min(flow.w);
        let y1 = (y0 + h).min(flow.h);
        let mut sum = Flow::zeros();
        let mut sum_sq = Flow::zeros();
        let mut max_magnitude = 0.0f64;
        let mut samples = 0usize;
        for y in y0.min(y1)..y1 {
            for f in &flow.row(y)[x0.min(x1)..x1] {
                sum += f;
                sum_sq += f.component_mul(f);
                max_magnitude = max_magnitude.max(f.norm());
                samples += 1;
            }
        }
        if samples == 0 {
            return Self {
                mean: [0.0; 2],
                std_dev: [0.0; 2],
                max_magnitude: 0.0,
                samples,
            };
        }
        let n = samples as f64;
        let mean = sum / n;
        let var = sum_sq / n - mean.component_mul(&mean);
        Self {
            mean: [mean.x, mean.y],
            std_dev: [var.x.max(0.0).sqrt(), var.y.max(0.0).sqrt()],
            max_magnitude,
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_stats_ignore_pixels_outside_region() {
        let mut flow = FlowField::filled(4, 4, Flow::new(1.0, -2.0));
        flow.set(0, 0, Flow::new(100.0, 100.0));
        let stats = FlowStats::of_region(&flow, 1, 1, 3, 3);
        assert_eq!(stats.samples, 9);
        assert!((stats.mean[0] - 1.0).abs() < 1e-12);
        assert!((stats.mean[1] + 2.0).abs() < 1e-12);
        assert!(stats.std_dev[0] < 1e-6 && stats.std_dev[1] < 1e-6);
    }

    #[test]
    fn empty_region_reports_zero_samples() {
        let flow = FlowField::new(3, 3);
        let stats = FlowStats::of_region(&flow, 5, 5, 2, 2);
        assert_eq!(stats.samples, 0);
        assert_eq!(stats.max_magnitude, 0.0);
    }
}
