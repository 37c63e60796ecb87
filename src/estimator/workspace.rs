//! Working buffers of a single pyramid level.
//!
//! A `LevelWorkspace` is built from the level images and the total flow
//! handed down from the coarser level, owns every padded buffer the
//! relaxation touches, and gives the updated total flow back when finished.
use crate::error::Result;
use crate::flow::{FlowField, FlowStats};
use crate::image::grid::ensure_same_dims;
use crate::image::ImageF64;
use crate::pyramid::scaling::LevelGeometry;
use crate::solver::{Relaxation, SweepStats};
use crate::tensor::{TensorField, TensorProvider};
use crate::warp::warp_bilinear;

/// Width of the zero ring around every level buffer.
pub const BORDER: usize = 1;

/// Summary of the sweeps run on one level.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RelaxSummary {
    pub sweeps: usize,
    pub clamped: usize,
    /// `max_update` of the final sweep.
    pub last_max_update: f64,
}

pub struct LevelWorkspace {
    geometry: LevelGeometry,
    tensor: TensorField,
    flow: FlowField,
    partial: FlowField,
}

impl LevelWorkspace {
    /// Warp `i2` towards `i1` by `flow`, compute the blended tensor and pad
    /// all buffers. Returns the workspace and the number of transparent warp
    /// samples.
    pub fn prepare<T: TensorProvider + ?Sized>(
        geometry: LevelGeometry,
        i1: &ImageF64,
        i2: &ImageF64,
        flow: FlowField,
        gamma: f64,
        tensors: &T,
    ) -> Result<(Self, usize)> {
        ensure_same_dims("level images", i1, i2)?;
        ensure_same_dims("level flow", i1, &flow)?;
        let (warped, transparent) = warp_bilinear(i2, &flow, geometry.scale)?;
        let tensor = tensors.blended(i1, &warped, geometry.hx, geometry.hy, gamma);
        ensure_same_dims("tensor field", i1, &tensor)?;

        let tensor = tensor.padded(BORDER);
        let flow = flow.padded(BORDER);
        let partial = FlowField::new(flow.w, flow.h);
        Ok((
            Self {
                geometry,
                tensor,
                flow,
                partial,
            },
            transparent,
        ))
    }

    pub fn geometry(&self) -> &LevelGeometry {
        &self.geometry
    }

    /// Run exactly `sweeps` relaxation sweeps on the increment.
    pub fn relax(&mut self, relaxation: &Relaxation, sweeps: usize) -> Result<RelaxSummary> {
        let mut summary = RelaxSummary::default();
        for _ in 0..sweeps {
            let SweepStats {
                clamped,
                max_update,
            } = relaxation.sweep(&self.tensor, &self.flow, &mut self.partial)?;
            summary.sweeps += 1;
            summary.clamped += clamped;
            summary.last_max_update = max_update;
        }
        if summary.clamped > 0 {
            log::warn!(
                "level {}: clamped {} relaxation denominators over {} sweeps",
                self.geometry.level,
                summary.clamped,
                summary.sweeps
            );
        }
        Ok(summary)
    }

    /// Statistics of the increment over the unpadded level.
    pub fn increment_stats(&self) -> FlowStats {
        FlowStats::of_region(
            &self.partial,
            BORDER,
            BORDER,
            self.geometry.width,
            self.geometry.height,
        )
    }

    /// `flow + increment` without the padding ring.
    pub fn finish(self) -> Result<FlowField> {
        Ok(self.flow.add_cells(&self.partial)?.strip_border(BORDER))
    }
}
