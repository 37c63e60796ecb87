//! Coarse-to-fine warping driver.
//!
//! ```no_run
//! use brox_flow::{FlowEstimator, FlowParams};
//! use brox_flow::image::ImageU8;
//!
//! # fn example(a: ImageU8, b: ImageU8) -> brox_flow::Result<()> {
//! let estimator = FlowEstimator::new(FlowParams::default())?;
//! let report = estimator.process(&a, &b)?;
//! println!("mean flow: {:?}", report.stats.mean);
//! # Ok(())
//! # }
//! ```

// Stages
// - Validate: input sizes, every level size and the optional initial flow,
//   all before any pixel is touched.
// - Presmooth: one Gaussian pass on both full-resolution frames.
// - Pyramid: resample both frames to every level.
// - Levels (coarse → fine): resize the running flow, warp frame 2, build the
//   motion tensor, run the fixed sweep budget, accumulate.

use super::params::FlowParams;
use super::workspace::LevelWorkspace;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{FlowReport, InputDescriptor, LevelTrace, TimingBreakdown};
use crate::error::{FlowError, Result};
use crate::flow::{FlowField, FlowStats};
use crate::image::grid::ensure_same_dims;
use crate::image::{ImageF64, ImageView};
use crate::pyramid::filters::gaussian_blur;
use crate::pyramid::scaling::resize;
use crate::pyramid::Pyramid;
use crate::tensor::{DerivativeTensors, TensorProvider};
use std::time::Instant;

/// Variational optical flow estimator.
///
/// Immutable after construction; one estimator may serve many frame pairs
/// from several threads.
#[derive(Clone, Debug)]
pub struct FlowEstimator<T: TensorProvider = DerivativeTensors> {
    params: FlowParams,
    tensors: T,
}

impl FlowEstimator<DerivativeTensors> {
    /// Validate `params` and build an estimator with central-difference
    /// tensors.
    pub fn new(params: FlowParams) -> Result<Self> {
        Self::with_tensor_provider(params, DerivativeTensors)
    }
}

impl<T: TensorProvider> FlowEstimator<T> {
    pub fn with_tensor_provider(params: FlowParams, tensors: T) -> Result<Self> {
        params.validate()?;
        Ok(Self { params, tensors })
    }

    pub fn params(&self) -> &FlowParams {
        &self.params
    }

    /// Flow from `i1` to `i2`, starting from zero.
    pub fn compute<V>(&self, i1: &V, i2: &V) -> Result<FlowField>
    where
        V: ImageView,
        V::Pixel: Into<f64>,
    {
        Ok(self.process_with_initial(i1, i2, None)?.flow)
    }

    /// Flow from `i1` to `i2`, refining `initial` (full-resolution pixels,
    /// input size).
    pub fn compute_with_initial<V>(&self, i1: &V, i2: &V, initial: &FlowField) -> Result<FlowField>
    where
        V: ImageView,
        V::Pixel: Into<f64>,
    {
        Ok(self.process_with_initial(i1, i2, Some(initial))?.flow)
    }

    /// Like [`compute`](Self::compute) but returns the full diagnostics.
    pub fn process<V>(&self, i1: &V, i2: &V) -> Result<FlowReport>
    where
        V: ImageView,
        V::Pixel: Into<f64>,
    {
        self.process_with_initial(i1, i2, None)
    }

    pub fn process_with_initial<V>(
        &self,
        i1: &V,
        i2: &V,
        initial: Option<&FlowField>,
    ) -> Result<FlowReport>
    where
        V: ImageView,
        V::Pixel: Into<f64>,
    {
        let total_start = Instant::now();
        ensure_same_dims("second image", i1, i2)?;
        let (w, h) = i1.dims();
        let options = self.params.pyramid_options();
        let geometries = options.validate_for(w, h)?;
        if let Some(flow) = initial {
            ensure_same_dims("initial flow", i1, flow)?;
        }

        let mut timings = TimingBreakdown::default();
        let sigma = self.params.sigma;
        let (s1, s2) = timings.measure("presmooth", || {
            (
                gaussian_blur(&ImageF64::from_view(i1), sigma),
                gaussian_blur(&ImageF64::from_view(i2), sigma),
            )
        });
        let (p1, p2) = timings.measure("pyramid", || {
            Ok::<_, FlowError>((Pyramid::build(s1, options)?, Pyramid::build(s2, options)?))
        })?;
        if let Some(coarsest) = geometries.last() {
            log::debug!(
                "pyramid: {} levels, coarsest {}x{}",
                p1.len(),
                coarsest.width,
                coarsest.height
            );
        }

        let mut flow = initial.cloned().unwrap_or_else(|| FlowField::new(w, h));
        let mut levels = Vec::with_capacity(p1.len());
        let frames = p1.levels.iter().zip(&p2.levels).zip(&p1.geometry);
        for (level, ((l1, l2), geometry)) in frames.enumerate().rev() {
            let level_start = Instant::now();
            let mut trace = LevelTrace::new(geometry);
            let running = resize(&flow, geometry.width, geometry.height);

            let (mut ws, transparent) = LevelWorkspace::prepare(
                *geometry,
                l1,
                l2,
                running,
                self.params.gamma,
                &self.tensors,
            )?;
            let relaxation = self.params.relaxation(geometry.hx, geometry.hy);
            let summary = ws.relax(&relaxation, self.params.max_iter)?;
            let increment = ws.increment_stats();
            flow = ws.finish()?;

            trace.sweeps = summary.sweeps;
            trace.clamped_denominators = summary.clamped;
            trace.transparent_samples = transparent;
            trace.last_max_update = summary.last_max_update;
            trace.mean_increment = increment.mean;
            trace.max_increment = increment.max_magnitude;
            trace.elapsed_ms = elapsed_ms(level_start);
            timings.push(format!("level {level}"), trace.elapsed_ms);
            log::debug!(
                "level {} {}x{}: {} sweeps, last update {:.3e}, mean increment ({:.4}, {:.4}), {:.2} ms",
                level,
                geometry.width,
                geometry.height,
                summary.sweeps,
                summary.last_max_update,
                increment.mean[0],
                increment.mean[1],
                trace.elapsed_ms
            );
            levels.push(trace);
        }

        let total_ms = elapsed_ms(total_start);
        timings.total_ms = total_ms;
        Ok(FlowReport {
            stats: FlowStats::of(&flow),
            input: InputDescriptor {
                width: w,
                height: h,
                pyramid_levels: p1.len(),
                used_initial_flow: initial.is_some(),
            },
            flow,
            levels,
            timings,
            total_ms,
        })
    }
}

/// One-shot convenience: validate `params`, then estimate the flow from `i1`
/// to `i2`.
pub fn compute_flow_field<V>(i1: &V, i2: &V, params: &FlowParams) -> Result<FlowField>
where
    V: ImageView,
    V::Pixel: Into<f64>,
{
    FlowEstimator::new(params.clone())?.compute(i1, i2)
}
