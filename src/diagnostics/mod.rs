//! Diagnostics returned alongside the flow field.
//!
//! `FlowReport` is the main entry point returned by
//! [`FlowEstimator::process`](crate::FlowEstimator::process): the field
//! itself, a per-level trace of the coarse-to-fine loop and stage timings.

pub mod level;
pub mod timing;

pub use level::LevelTrace;
pub use timing::{StageTiming, TimingBreakdown};

use crate::flow::{FlowField, FlowStats};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub pyramid_levels: usize,
    pub used_initial_flow: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowReport {
    #[serde(skip)]
    pub flow: FlowField,
    pub input: InputDescriptor,
    /// Coarsest level first, in processing order.
    pub levels: Vec<LevelTrace>,
    pub stats: FlowStats,
    pub timings: TimingBreakdown,
    pub total_ms: f64,
}

impl FlowReport {
    pub fn clamped_denominators(&self) -> usize {
        self.levels.iter().map(|l| l.clamped_denominators).sum()
    }
}
